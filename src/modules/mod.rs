// Module exports for pure logic
pub mod calendar;   // Month grid for the calendar panel
pub mod mail;       // IMAP inbox listing, SMTP send
pub mod navigation; // Address-bar input -> URL + where to open it
pub mod search;     // Search-engine templates
pub mod tabs;       // View container and lifecycle
