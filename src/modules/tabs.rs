// Tab/view container - pure logic, no Tauri imports.
//
// Views live in an arena keyed by a never-reused `ViewId`; `order` holds the
// ids currently shown in the tab strip. Home, email and calendar are panels:
// one instance each, remembered in a keyed slot so reopening finds the same id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use url::Url;

pub const BLANK_PAGE: &str = "about:blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(u64);

impl ViewId {
    /// Label of the child webview rendering this view.
    pub fn webview_label(self) -> String {
        format!("view-{}", self.0)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ViewId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Home,
    Web,
    Email,
    Calendar,
}

impl ViewKind {
    pub fn is_panel(self) -> bool {
        !matches!(self, Self::Web)
    }

    fn default_title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Web => "New Tab",
            Self::Email => "Email",
            Self::Calendar => "Calendar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    Active,
    Inactive,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    pub title: String,
    /// Current page; only web views have one.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The view left the tab strip. Web views are dropped; panels are kept
    /// detached for reuse.
    Closed(View),
    /// It was the only view left, so nothing happened.
    RefusedLastView,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewsSnapshot {
    pub views: Vec<View>,
    pub active: Option<ViewId>,
}

#[derive(Debug, Default)]
struct PanelSlots {
    home: Option<ViewId>,
    email: Option<ViewId>,
    calendar: Option<ViewId>,
}

impl PanelSlots {
    fn slot(&mut self, kind: ViewKind) -> Option<&mut Option<ViewId>> {
        match kind {
            ViewKind::Home => Some(&mut self.home),
            ViewKind::Email => Some(&mut self.email),
            ViewKind::Calendar => Some(&mut self.calendar),
            ViewKind::Web => None,
        }
    }
}

#[derive(Debug)]
pub struct ViewContainer {
    next_id: u64,
    views: HashMap<ViewId, View>,
    order: Vec<ViewId>,
    panels: PanelSlots,
    active: Option<ViewId>,
}

impl Default for ViewContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewContainer {
    /// A container holding only the active home panel.
    pub fn new() -> Self {
        let mut container = Self {
            next_id: 1,
            views: HashMap::new(),
            order: Vec::new(),
            panels: PanelSlots::default(),
            active: None,
        };
        container.open(ViewKind::Home, None);
        container
    }

    /// Opens and activates a view of `kind`.
    ///
    /// Web views are always new (`url` defaults to a blank page). Panels are
    /// created once; later calls re-attach and activate the same view.
    pub fn open(&mut self, kind: ViewKind, url: Option<String>) -> ViewId {
        let id = match self.panels.slot(kind).and_then(|slot| *slot) {
            Some(existing) => existing,
            None => {
                let url = match kind {
                    ViewKind::Web => Some(url.unwrap_or_else(|| BLANK_PAGE.to_string())),
                    _ => None,
                };
                let id = self.allocate(kind, url);
                if let Some(slot) = self.panels.slot(kind) {
                    *slot = Some(id);
                }
                id
            }
        };

        if !self.order.contains(&id) {
            self.order.push(id);
        }
        self.active = Some(id);
        id
    }

    pub fn open_web(&mut self, url: impl Into<String>) -> ViewId {
        self.open(ViewKind::Web, Some(url.into()))
    }

    fn allocate(&mut self, kind: ViewKind, url: Option<String>) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.views.insert(
            id,
            View {
                id,
                kind,
                title: kind.default_title().to_string(),
                url,
            },
        );
        id
    }

    /// Activates an attached view. Returns false when `id` is not in the tab strip.
    pub fn focus(&mut self, id: ViewId) -> bool {
        if !self.order.contains(&id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Removes a view from the tab strip, refusing to empty the container.
    pub fn close(&mut self, id: ViewId) -> CloseOutcome {
        let Some(index) = self.order.iter().position(|v| *v == id) else {
            return CloseOutcome::NotFound;
        };
        if self.order.len() == 1 {
            return CloseOutcome::RefusedLastView;
        }

        self.order.remove(index);
        if self.active == Some(id) {
            let next = index.min(self.order.len() - 1);
            self.active = Some(self.order[next]);
        }

        let is_panel = self.views.get(&id).is_some_and(|v| v.kind.is_panel());
        let view = if is_panel {
            self.views.get(&id).cloned()
        } else {
            self.views.remove(&id)
        };
        match view {
            Some(view) => CloseOutcome::Closed(view),
            None => CloseOutcome::NotFound,
        }
    }

    /// Drops a web view that never got a webview and gives focus back to
    /// `previous` (or the last tab when `previous` is gone). Unlike `close`,
    /// this may leave the strip as it was before the view was opened.
    pub fn discard(&mut self, id: ViewId, previous: Option<ViewId>) -> bool {
        if !self.views.get(&id).is_some_and(|v| v.kind == ViewKind::Web) {
            return false;
        }
        self.views.remove(&id);
        self.order.retain(|v| *v != id);
        if self.active == Some(id) {
            self.active = previous
                .filter(|p| self.order.contains(p))
                .or_else(|| self.order.last().copied());
        }
        true
    }

    /// Points a web view at a new URL. Returns false for panels and unknown ids.
    pub fn navigate(&mut self, id: ViewId, url: impl Into<String>) -> bool {
        match self.views.get_mut(&id) {
            Some(view) if view.kind == ViewKind::Web => {
                view.url = Some(url.into());
                true
            }
            _ => false,
        }
    }

    /// Records a finished page load: the URL sticks and the tab is titled
    /// after the host (or the raw URL when it has none).
    pub fn page_loaded(&mut self, id: ViewId, url: &str) -> bool {
        if !self.navigate(id, url) {
            return false;
        }
        let title = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string());
        self.set_title(id, title)
    }

    pub fn set_title(&mut self, id: ViewId, title: impl Into<String>) -> bool {
        match self.views.get_mut(&id) {
            Some(view) => {
                view.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Reorders the tab strip.
    ///
    /// 1. Ids that are not attached are ignored
    /// 2. Attached ids missing from `new_order` keep their relative order
    ///    and go to the end, so nothing is lost to a stale request
    ///
    /// Returns true if the order changed.
    pub fn reorder(&mut self, new_order: &[ViewId]) -> bool {
        if self.order.is_empty() || new_order.is_empty() {
            return false;
        }

        let mut reordered: Vec<ViewId> = Vec::with_capacity(self.order.len());
        for id in new_order {
            if self.order.contains(id) && !reordered.contains(id) {
                reordered.push(*id);
            }
        }
        for id in &self.order {
            if !reordered.contains(id) {
                reordered.push(*id);
            }
        }

        let changed = reordered != self.order;
        self.order = reordered;
        changed
    }

    pub fn state(&self, id: ViewId) -> ViewState {
        if self.active == Some(id) {
            ViewState::Active
        } else if self.order.contains(&id) {
            ViewState::Inactive
        } else {
            ViewState::Closed
        }
    }

    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.get(&id)
    }

    pub fn active(&self) -> Option<&View> {
        self.active.and_then(|id| self.views.get(&id))
    }

    pub fn active_kind(&self) -> Option<ViewKind> {
        self.active().map(|v| v.kind)
    }

    /// Attached views in tab-strip order.
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.order.iter().filter_map(|id| self.views.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn snapshot(&self) -> ViewsSnapshot {
        ViewsSnapshot {
            views: self.views().cloned().collect(),
            active: self.active,
        }
    }
}
