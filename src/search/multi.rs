//! Debounced multi-select search controller
//!
//! Generalizes the single-select interaction to an unbounded selection.
//! The option pool is caller-owned: this controller filters locally over
//! whatever pool it currently has for instant feedback, and independently
//! asks the caller (debounced) to broaden the pool via `on_search`. The
//! caller also owns pagination: the controller only signals `on_load_more`
//! when the list is scrolled near its end.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;

use super::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use super::select::FieldAccessor;

/// Visible-result ceiling, applied client-side regardless of pool size.
const MAX_VISIBLE: usize = 50;

/// Scroll distance from the end (px) that triggers a load-more request.
const LOAD_MORE_THRESHOLD: f64 = 10.0;

type SearchCallback = Arc<dyn Fn(&str) + Send + Sync>;
type LoadMoreCallback = Arc<dyn Fn() + Send + Sync>;

/// Configuration for a [`MultiSelect`].
pub struct MultiConfig<T> {
    label: FieldAccessor<T>,
    subtitle: Option<FieldAccessor<T>>,
    identity: Arc<dyn Fn(&T) -> String + Send + Sync>,
    min_term_len: usize,
    debounce: Duration,
    on_search: Option<SearchCallback>,
    on_load_more: Option<LoadMoreCallback>,
}

impl<T> MultiConfig<T> {
    pub fn new(
        label: FieldAccessor<T>,
        identity: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            label,
            subtitle: None,
            identity: Arc::new(identity),
            min_term_len: 2,
            debounce: DEFAULT_DEBOUNCE,
            on_search: None,
            on_load_more: None,
        }
    }

    /// Secondary line matched by the local filter alongside the label.
    pub fn subtitle(mut self, accessor: FieldAccessor<T>) -> Self {
        self.subtitle = Some(accessor);
        self
    }

    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    /// Debounced request to broaden the option pool for a term.
    pub fn on_search(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_search = Some(Arc::new(f));
        self
    }

    /// Invoked when the list scrolls near its end and more pages exist.
    pub fn on_load_more(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_load_more = Some(Arc::new(f));
        self
    }
}

struct MultiState<T> {
    options: Vec<T>,
    selected_ids: Vec<String>,
    term: String,
    open: bool,
    /// Caller-owned pagination flags
    has_more: bool,
    loading: bool,
}

impl<T> Default for MultiState<T> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            selected_ids: Vec::new(),
            term: String::new(),
            open: false,
            has_more: false,
            loading: false,
        }
    }
}

/// Multi-select search controller over a caller-owned option pool.
pub struct MultiSelect<T> {
    config: MultiConfig<T>,
    state: Mutex<MultiState<T>>,
    debouncer: Debouncer,
}

impl<T> MultiSelect<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    pub fn new(config: MultiConfig<T>) -> Self {
        let debouncer = Debouncer::new(config.debounce);
        Self {
            config,
            state: Mutex::new(MultiState::default()),
            debouncer,
        }
    }

    /// Replace the option pool (caller fetched a fresh or broadened page).
    pub fn set_options(&self, options: Vec<T>) {
        self.lock_state().options = options;
    }

    /// Append a page to the pool (load-more result).
    pub fn extend_options(&self, options: Vec<T>) {
        self.lock_state().options.extend(options);
    }

    /// Handle a filter-input change. Local filtering takes effect
    /// immediately through [`visible`](Self::visible); the remote broaden
    /// request is debounced and gated on the minimum term length.
    pub fn on_input(&self, text: &str) {
        {
            let mut state = self.lock_state();
            state.term = text.to_string();
            state.open = true;
        }

        let term = text.trim().to_string();
        if term.chars().count() < self.config.min_term_len {
            self.debouncer.cancel();
            return;
        }

        if let Some(ref on_search) = self.config.on_search {
            let on_search = Arc::clone(on_search);
            self.debouncer.schedule(async move {
                on_search(&term);
            });
        }
    }

    /// Options matching the current term (label or subtitle,
    /// case-insensitive), capped at the visible ceiling.
    pub fn visible(&self) -> Vec<T> {
        let state = self.lock_state();
        let needle = state.term.trim().to_lowercase();

        state
            .options
            .iter()
            .filter(|option| {
                if needle.is_empty() {
                    return true;
                }
                let label = self.config.label.extract(option).to_lowercase();
                if label.contains(&needle) {
                    return true;
                }
                self.config
                    .subtitle
                    .as_ref()
                    .map(|s| s.extract(option).to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .take(MAX_VISIBLE)
            .cloned()
            .collect()
    }

    /// Toggle membership of an id. Selection order is the order of
    /// selection, never re-sorted.
    pub fn toggle(&self, id: &str) {
        let mut state = self.lock_state();
        if let Some(pos) = state.selected_ids.iter().position(|s| s == id) {
            state.selected_ids.remove(pos);
        } else {
            state.selected_ids.push(id.to_string());
        }
    }

    /// Remove one selection via its chip's close control. The rendering
    /// layer stops click propagation so this never toggles the dropdown.
    pub fn remove(&self, id: &str) {
        let mut state = self.lock_state();
        state.selected_ids.retain(|s| s != id);
    }

    /// Scroll notification from the rendering layer. Fires the caller's
    /// load-more exactly when the end is near, more pages exist, and no
    /// fetch is already in flight.
    pub fn on_scroll(&self, scroll_top: f64, viewport_height: f64, content_height: f64) {
        let should_load = {
            let state = self.lock_state();
            let remaining = content_height - (scroll_top + viewport_height);
            remaining <= LOAD_MORE_THRESHOLD && state.has_more && !state.loading
        };

        if should_load {
            if let Some(ref on_load_more) = self.config.on_load_more {
                on_load_more();
            }
        }
    }

    /// Caller-owned flag: whether more pages are available.
    pub fn set_has_more(&self, has_more: bool) {
        self.lock_state().has_more = has_more;
    }

    /// Caller-owned flag: whether a page fetch is in flight.
    pub fn set_loading(&self, loading: bool) {
        self.lock_state().loading = loading;
    }

    /// Outside click: close without altering the selection.
    pub fn close(&self) {
        self.lock_state().open = false;
    }

    pub fn open(&self) {
        self.lock_state().open = true;
    }

    pub fn is_open(&self) -> bool {
        self.lock_state().open
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.lock_state().selected_ids.clone()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.lock_state().selected_ids.iter().any(|s| s == id)
    }

    /// Label of one selected id, if it is still in the pool.
    pub fn label_for(&self, id: &str) -> Option<String> {
        let state = self.lock_state();
        state
            .options
            .iter()
            .find(|option| (self.config.identity)(option) == id)
            .map(|option| self.config.label.extract(option))
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, MultiState<T>> {
        self.state.lock().expect("multi state mutex poisoned")
    }
}
