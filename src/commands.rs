// Tauri commands invoked by the browser chrome (ui/).
//
// Pattern: decide under the lock, drop it, then touch webviews. Webview
// calls hop to the main thread and must never wait on a lock held here.

use tauri::{AppHandle, Emitter, Manager, State, WebviewUrl, WebviewWindowBuilder};
use tauri_plugin_clipboard_manager::ClipboardExt;
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use crate::error::{AppError, AppResult};
use crate::modules::calendar::{MonthStep, MonthView};
use crate::modules::mail::{self, Folder, ImapConfig, MessageSummary, OutgoingMessage, SmtpConfig};
use crate::modules::navigation::{self, NavigationAction};
use crate::modules::search;
use crate::modules::tabs::{CloseOutcome, ViewId, ViewKind, ViewsSnapshot, BLANK_PAGE};
use crate::settings::Settings;
use crate::state::AppState;
use crate::webviews::{self, VIEWS_CHANGED};

pub const SETTINGS_WINDOW: &str = "settings";
pub const SETTINGS_SAVED: &str = "settings-saved";

/// Re-lays out the child webviews and tells the chrome what changed.
fn sync_views(app: &AppHandle, state: &AppState) -> AppResult<ViewsSnapshot> {
    let snapshot = state.views.lock()?.snapshot();
    webviews::arrange(app, &snapshot)?;
    app.emit(VIEWS_CHANGED, &snapshot)?;
    Ok(snapshot)
}

/// Opens a web view and its webview together. If the webview cannot be
/// created the view is discarded, so the container never holds a web view
/// with nothing behind it.
fn open_web(app: &AppHandle, state: &AppState, url: String) -> AppResult<ViewsSnapshot> {
    let (id, previous) = {
        let mut views = state.views.lock()?;
        let previous = views.active().map(|v| v.id);
        (views.open_web(url.clone()), previous)
    };
    if let Err(e) = webviews::create(app, id, &url) {
        log::error!("[Views] Could not create webview for {}: {}", url, e);
        state.views.lock()?.discard(id, previous);
        if let Err(sync) = sync_views(app, state) {
            log::warn!("[Views] Re-sync after failed open: {}", sync);
        }
        return Err(e);
    }
    sync_views(app, state)
}

fn active_web_view(state: &AppState) -> AppResult<Option<(ViewId, Option<String>)>> {
    let views = state.views.lock()?;
    Ok(views
        .active()
        .filter(|v| v.kind == ViewKind::Web)
        .map(|v| (v.id, v.url.clone())))
}

// --- Navigation ---

/// Address-bar entry: a URL, a bare domain or a search query.
#[tauri::command]
pub async fn navigate(app: AppHandle, state: State<'_, AppState>, input: String) -> AppResult<ViewsSnapshot> {
    let settings = state.settings()?;
    let action = {
        let views = state.views.lock()?;
        navigation::dispatch(&input, views.active_kind(), &settings)
    };

    match action {
        None => Ok(state.views.lock()?.snapshot()),
        Some(NavigationAction::OpenView { url }) => open_web(&app, &state, url),
        Some(NavigationAction::NavigateInPlace { url }) => {
            let id = {
                let mut views = state.views.lock()?;
                let id = views.active().map(|v| v.id).ok_or_else(|| AppError::InvalidInput("no active view".to_string()))?;
                views.navigate(id, url.clone());
                id
            };
            log::info!("[Navigate] {} -> {}", id, url);
            webviews::load(&app, id, &url)?;
            sync_views(&app, &state)
        }
    }
}

/// Home-page search box: always searches, always in a new view.
#[tauri::command]
pub async fn search(app: AppHandle, state: State<'_, AppState>, query: String) -> AppResult<ViewsSnapshot> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(state.views.lock()?.snapshot());
    }
    let provider = state.settings()?.search_engine;
    open_web(&app, &state, search::resolve(&provider, query))
}

#[tauri::command]
pub async fn go_back(app: AppHandle, state: State<'_, AppState>) -> AppResult<()> {
    if let Some((id, _)) = active_web_view(&state)? {
        webviews::eval(&app, id, "window.history.back()")?;
    }
    Ok(())
}

#[tauri::command]
pub async fn go_forward(app: AppHandle, state: State<'_, AppState>) -> AppResult<()> {
    if let Some((id, _)) = active_web_view(&state)? {
        webviews::eval(&app, id, "window.history.forward()")?;
    }
    Ok(())
}

#[tauri::command]
pub async fn reload_view(app: AppHandle, state: State<'_, AppState>) -> AppResult<()> {
    if let Some((id, _)) = active_web_view(&state)? {
        webviews::eval(&app, id, "window.location.reload()")?;
    }
    Ok(())
}

#[tauri::command]
pub async fn copy_current_url(app: AppHandle, state: State<'_, AppState>) -> AppResult<Option<String>> {
    let url = active_web_view(&state)?.and_then(|(_, url)| url);
    if let Some(url) = &url {
        app.clipboard()
            .write_text(url.clone())
            .map_err(|e| AppError::Shell(e.to_string()))?;
    }
    Ok(url)
}

// --- Views ---

#[tauri::command]
pub async fn list_views(state: State<'_, AppState>) -> AppResult<ViewsSnapshot> {
    Ok(state.views.lock()?.snapshot())
}

#[tauri::command]
pub async fn open_web_view(app: AppHandle, state: State<'_, AppState>, url: Option<String>) -> AppResult<ViewsSnapshot> {
    open_web(&app, &state, url.unwrap_or_else(|| BLANK_PAGE.to_string()))
}

/// Sidebar buttons. Panels come back as the same view every time.
#[tauri::command]
pub async fn open_panel(app: AppHandle, state: State<'_, AppState>, kind: ViewKind) -> AppResult<ViewsSnapshot> {
    if kind == ViewKind::Web {
        return open_web_view(app, state, None).await;
    }
    state.views.lock()?.open(kind, None);
    sync_views(&app, &state)
}

#[tauri::command]
pub async fn focus_view(app: AppHandle, state: State<'_, AppState>, id: ViewId) -> AppResult<ViewsSnapshot> {
    if !state.views.lock()?.focus(id) {
        return Err(AppError::ViewNotFound(id));
    }
    sync_views(&app, &state)
}

#[tauri::command]
pub async fn close_view(app: AppHandle, state: State<'_, AppState>, id: ViewId) -> AppResult<ViewsSnapshot> {
    let outcome = state.views.lock()?.close(id);
    match outcome {
        CloseOutcome::Closed(view) => {
            if view.kind == ViewKind::Web {
                webviews::destroy(&app, id)?;
            }
        }
        CloseOutcome::RefusedLastView => log::info!("[Views] Refusing to close the last view {}", id),
        CloseOutcome::NotFound => return Err(AppError::ViewNotFound(id)),
    }
    sync_views(&app, &state)
}

/// Drag-and-drop in the tab strip.
#[tauri::command]
pub async fn reorder_views(app: AppHandle, state: State<'_, AppState>, order: Vec<ViewId>) -> AppResult<ViewsSnapshot> {
    let changed = state.views.lock()?.reorder(&order);
    if changed {
        sync_views(&app, &state)
    } else {
        log::debug!("[Views] Reorder changed nothing, skipping emit");
        Ok(state.views.lock()?.snapshot())
    }
}

// --- Settings ---

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> AppResult<Settings> {
    state.settings()
}

#[tauri::command]
pub async fn save_settings(app: AppHandle, state: State<'_, AppState>, settings: Settings) -> AppResult<()> {
    state.save_settings(settings)?;
    app.emit(SETTINGS_SAVED, ())?;
    Ok(())
}

#[tauri::command]
pub async fn reload_settings(state: State<'_, AppState>) -> AppResult<Settings> {
    state.reload_settings()
}

/// Problem found in the settings file at launch, reported once.
#[tauri::command]
pub async fn take_startup_warning(state: State<'_, AppState>) -> AppResult<Option<String>> {
    state.take_startup_warning()
}

#[tauri::command]
pub async fn open_settings_window(app: AppHandle) -> AppResult<()> {
    if let Some(win) = app.get_window(SETTINGS_WINDOW) {
        win.set_focus()?;
        return Ok(());
    }

    WebviewWindowBuilder::new(&app, SETTINGS_WINDOW, WebviewUrl::App("settings.html".into()))
        .title("Settings")
        .inner_size(400.0, 520.0)
        .resizable(true)
        .minimizable(false)
        .maximizable(false)
        .center()
        .focused(true)
        .build()?;
    Ok(())
}

// --- Mail ---

async fn run_blocking<T, F>(job: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, mail::MailError> + Send + 'static,
{
    tauri::async_runtime::spawn_blocking(job)
        .await
        .map_err(|e| AppError::Shell(e.to_string()))?
        .map_err(AppError::from)
}

#[tauri::command]
pub async fn load_inbox(state: State<'_, AppState>) -> AppResult<Vec<MessageSummary>> {
    let result = match ImapConfig::from_settings(&state.settings()?) {
        Ok(config) => run_blocking(move || mail::fetch_inbox(&config)).await,
        Err(e) => Err(AppError::from(e)),
    };
    if let Err(e) = &result {
        log::error!("[Mail] Loading inbox failed: {}", e);
    }
    result
}

/// Server folders, or the built-in list while no IMAP server is configured.
#[tauri::command]
pub async fn list_folders(state: State<'_, AppState>) -> AppResult<Vec<Folder>> {
    let config = match ImapConfig::from_settings(&state.settings()?) {
        Ok(config) => config,
        Err(_) => return Ok(mail::default_folders()),
    };
    run_blocking(move || mail::list_folders(&config)).await
}

#[tauri::command]
pub async fn send_mail(app: AppHandle, state: State<'_, AppState>, message: OutgoingMessage) -> AppResult<()> {
    let result = match SmtpConfig::from_settings(&state.settings()?) {
        Ok(config) => run_blocking(move || mail::send(&config, &message)).await,
        Err(e) => Err(AppError::from(e)),
    };

    if let Err(e) = &result {
        log::error!("[Mail] Send failed: {}", e);
        app.dialog()
            .message(format!("Could not send the email: {}", e))
            .title("Send failed")
            .kind(MessageDialogKind::Error)
            .show(|_| {});
    }
    result
}

// --- Calendar ---

/// The month `year`-`month` (or the current one), optionally stepped once.
#[tauri::command]
pub async fn calendar_month(year: Option<i32>, month: Option<u32>, step: Option<MonthStep>) -> AppResult<MonthView> {
    let today = chrono::Local::now().date_naive();
    let base = match (year, month) {
        (Some(year), Some(month)) => MonthView::new(year, month, today)?,
        _ => MonthView::containing(today),
    };
    Ok(base.step(step, today)?)
}
