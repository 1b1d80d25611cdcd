// Child webviews: one per web view in the container, stacked in the content
// area of the main window. Only the active one gets a non-zero size.

use tauri::webview::PageLoadEvent;
use tauri::{
    AppHandle, Emitter, Manager, PhysicalPosition, PhysicalSize, Position, Rect, Size, Webview,
    WebviewBuilder, WebviewUrl, Window,
};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::modules::tabs::{ViewId, ViewKind, ViewsSnapshot, BLANK_PAGE};
use crate::state::AppState;

pub const MAIN_WINDOW: &str = "main";
pub const VIEWS_CHANGED: &str = "views-changed";

// Chrome geometry in logical pixels; must match ui/style.css
pub const SIDEBAR_WIDTH: f64 = 50.0;
pub const TOOLBAR_HEIGHT: f64 = 44.0 + 36.0;

/// Where the active web view goes for a window of `size` at `scale`.
pub fn content_rect(size: PhysicalSize<u32>, scale: f64) -> (PhysicalPosition<i32>, PhysicalSize<u32>) {
    let left = (SIDEBAR_WIDTH * scale) as u32;
    let top = (TOOLBAR_HEIGHT * scale) as u32;
    let width = size.width.saturating_sub(left).max(100);
    let height = size.height.saturating_sub(top).max(100);
    (
        PhysicalPosition::new(left as i32, top as i32),
        PhysicalSize::new(width, height),
    )
}

fn main_window(app: &AppHandle) -> AppResult<Window> {
    app.get_window(MAIN_WINDOW)
        .ok_or_else(|| AppError::Shell("main window is gone".to_string()))
}

fn window_content_rect(window: &Window) -> AppResult<(PhysicalPosition<i32>, PhysicalSize<u32>)> {
    Ok(content_rect(window.inner_size()?, window.scale_factor()?))
}

/// Creates the child webview for a freshly opened web view.
pub fn create(app: &AppHandle, id: ViewId, url: &str) -> AppResult<()> {
    let window = main_window(app)?;
    let (position, size) = window_content_rect(&window)?;

    let (initial, parsed) = match Url::parse(url) {
        Ok(u) => (u, true),
        Err(_) => (
            Url::parse(BLANK_PAGE).map_err(|e| AppError::InvalidInput(e.to_string()))?,
            false,
        ),
    };

    let builder = WebviewBuilder::new(id.webview_label(), WebviewUrl::External(initial))
        .on_page_load(move |webview, payload| {
            if !matches!(payload.event(), PageLoadEvent::Finished) {
                return;
            }
            let app = webview.app_handle();
            let state = app.state::<AppState>();
            let snapshot = match state.views.lock() {
                Ok(mut views) => {
                    views.page_loaded(id, payload.url().as_str());
                    views.snapshot()
                }
                Err(_) => return,
            };
            let _ = app.emit(VIEWS_CHANGED, snapshot);
        });

    let webview = window.add_child(builder, position, size)?;
    if !parsed {
        load_raw(&webview, url)?;
    }

    log::info!("[Views] Created {} for {}", id.webview_label(), url);
    Ok(())
}

/// Points an existing web view at `url`.
pub fn load(app: &AppHandle, id: ViewId, url: &str) -> AppResult<()> {
    let Some(webview) = app.get_webview(&id.webview_label()) else {
        return Err(AppError::ViewNotFound(id));
    };
    match Url::parse(url) {
        Ok(u) => webview.navigate(u)?,
        Err(_) => load_raw(&webview, url)?,
    }
    Ok(())
}

// Input the url crate rejects still goes to the engine as typed; the page
// shows whatever error the engine produces.
fn load_raw(webview: &Webview, url: &str) -> AppResult<()> {
    let quoted = serde_json::to_string(url).map_err(|e| AppError::InvalidInput(e.to_string()))?;
    let script = format!("window.location.href = {};", quoted);
    webview.eval(&script)?;
    Ok(())
}

/// Runs a script in the webview of `id` if it is a live web view.
pub fn eval(app: &AppHandle, id: ViewId, script: &str) -> AppResult<()> {
    if let Some(webview) = app.get_webview(&id.webview_label()) {
        webview.eval(script)?;
    }
    Ok(())
}

pub fn destroy(app: &AppHandle, id: ViewId) -> AppResult<()> {
    if let Some(webview) = app.get_webview(&id.webview_label()) {
        webview.close()?;
        log::info!("[Views] Closed {}", id.webview_label());
    }
    Ok(())
}

/// Gives the active web view the content area and collapses the rest.
/// When a panel is active every web view is collapsed so the panel,
/// drawn by the main webview, shows through.
pub fn arrange(app: &AppHandle, snapshot: &ViewsSnapshot) -> AppResult<()> {
    let window = main_window(app)?;
    let (position, size) = window_content_rect(&window)?;

    for view in snapshot.views.iter().filter(|v| v.kind == ViewKind::Web) {
        let Some(webview) = app.get_webview(&view.id.webview_label()) else {
            continue;
        };
        let size = if snapshot.active == Some(view.id) {
            size
        } else {
            PhysicalSize::new(0, 0)
        };
        webview.set_bounds(Rect {
            position: Position::Physical(position),
            size: Size::Physical(size),
        })?;
    }
    Ok(())
}

/// Keeps the active web view filling the content area as the window resizes.
pub fn install_resize_handler(app: &AppHandle) -> AppResult<()> {
    let window = main_window(app)?;
    let handle = app.clone();
    window.on_window_event(move |event| {
        if let tauri::WindowEvent::Resized(_) = event {
            let state = handle.state::<AppState>();
            let snapshot = match state.views.lock() {
                Ok(views) => views.snapshot(),
                Err(_) => return,
            };
            if let Err(e) = arrange(&handle, &snapshot) {
                log::warn!("[Views] Resize failed: {}", e);
            }
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PhysicalSize::new(1200, 800), 1.0, (50, 80), (1150, 720))]
    #[case(PhysicalSize::new(2400, 1600), 2.0, (100, 160), (2300, 1440))]
    #[case(PhysicalSize::new(120, 90), 1.0, (50, 80), (100, 100))]
    fn test_content_rect(
        #[case] window: PhysicalSize<u32>,
        #[case] scale: f64,
        #[case] position: (i32, i32),
        #[case] size: (u32, u32),
    ) {
        let (p, s) = content_rect(window, scale);
        assert_eq!((p.x, p.y), position);
        assert_eq!((s.width, s.height), size);
    }
}
