// Menta Browser library entry point.
// Exposes every module so main.rs stays a one-liner and the logic can be
// tested without launching a window.

use tauri::Manager;

pub mod commands;
pub mod error;
pub mod settings;
pub mod state;
pub mod webviews;

// Pure logic modules (no Tauri imports)
pub mod modules;

use settings::SettingsStore;
use state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        // Must come first: a second launch only focuses the running window
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            if let Some(win) = app.get_window(webviews::MAIN_WINDOW) {
                let _ = win.set_focus();
            }
        }))
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .plugin(tauri_plugin_clipboard_manager::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            let store = SettingsStore::in_dir(&data_dir);
            log::info!("[Settings] Using {:?}", store.path());

            app.manage(AppState::new(store));
            webviews::install_resize_handler(app.handle())?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::navigate,
            commands::search,
            commands::go_back,
            commands::go_forward,
            commands::reload_view,
            commands::copy_current_url,
            commands::list_views,
            commands::open_web_view,
            commands::open_panel,
            commands::focus_view,
            commands::close_view,
            commands::reorder_views,
            commands::get_settings,
            commands::save_settings,
            commands::reload_settings,
            commands::take_startup_warning,
            commands::open_settings_window,
            commands::load_inbox,
            commands::list_folders,
            commands::send_mail,
            commands::calendar_month,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
