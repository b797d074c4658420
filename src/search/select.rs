//! Debounced single-select remote search controller
//!
//! Drives the locate-and-pick-one-entity interaction: free-text input is
//! debounced into limit-20 remote searches, a picked result becomes the
//! selection, and typing over a selection clears it so a diverging string
//! can never silently retain a stale id. An externally supplied id with no
//! label yet is hydrated by a single fetch-by-id.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::client::LookupApi;

/// How to derive the display label from an entity: a named field of its
/// JSON form, or a formatting closure.
pub enum FieldAccessor<T> {
    Named(String),
    With(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

impl<T: Serialize> FieldAccessor<T> {
    pub fn field(name: impl Into<String>) -> Self {
        FieldAccessor::Named(name.into())
    }

    pub fn with(f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        FieldAccessor::With(Arc::new(f))
    }

    /// Extract the display string; a missing field yields an empty label.
    pub fn extract(&self, entity: &T) -> String {
        match self {
            FieldAccessor::Named(name) => serde_json::to_value(entity)
                .ok()
                .and_then(|v| v.get(name).cloned())
                .map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or_default(),
            FieldAccessor::With(f) => f(entity),
        }
    }
}

/// Lifecycle of one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Typing,
    Hydrating,
    Searching,
    ResultsShown,
    Selected,
}

type ChangeCallback = Arc<dyn Fn(Option<&str>) + Send + Sync>;
type SelectCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Configuration for a [`SearchSelect`], built with the teacher's usual
/// consuming-builder pattern.
pub struct SelectConfig<T> {
    endpoint: String,
    search_param: String,
    label: FieldAccessor<T>,
    identity: Arc<dyn Fn(&T) -> String + Send + Sync>,
    limit: usize,
    min_term_len: usize,
    extra_filter: Option<(String, String)>,
    debounce: Duration,
    on_change: Option<ChangeCallback>,
    on_select: Option<SelectCallback<T>>,
}

impl<T> SelectConfig<T> {
    pub fn new(
        endpoint: impl Into<String>,
        search_param: impl Into<String>,
        label: FieldAccessor<T>,
        identity: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            search_param: search_param.into(),
            label,
            identity: Arc::new(identity),
            limit: 20,
            min_term_len: 2,
            extra_filter: None,
            debounce: DEFAULT_DEBOUNCE,
            on_change: None,
            on_select: None,
        }
    }

    /// Constrain every search with one extra equality filter
    /// (e.g. only companies under this economic group).
    pub fn extra_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_filter = Some((key.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    /// Called with the selected identity, or `None` when the selection is
    /// cleared.
    pub fn on_change(mut self, f: impl Fn(Option<&str>) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// Cascade callback invoked with the full selected entity, used to
    /// populate dependent fields.
    pub fn on_select(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_select = Some(Arc::new(f));
        self
    }
}

struct SelectState<T> {
    text: String,
    selected_id: Option<String>,
    selected_label: Option<String>,
    results: Vec<T>,
    open: bool,
    phase: Phase,
}

impl<T> Default for SelectState<T> {
    fn default() -> Self {
        Self {
            text: String::new(),
            selected_id: None,
            selected_label: None,
            results: Vec::new(),
            open: false,
            phase: Phase::Empty,
        }
    }
}

/// Single-select remote search controller.
///
/// Constructed as an `Arc` because the debounced search task needs a handle
/// back into the controller. A response is applied whenever it arrives; a
/// slow earlier search that resolves after a faster later one overwrites it
/// (last-response-wins). The debounce restart is the only ordering guard.
pub struct SearchSelect<T> {
    api: Arc<dyn LookupApi>,
    config: SelectConfig<T>,
    state: Mutex<SelectState<T>>,
    debouncer: Debouncer,
}

impl<T> SearchSelect<T>
where
    T: DeserializeOwned + Serialize + Clone + Send + Sync + 'static,
{
    pub fn new(api: Arc<dyn LookupApi>, config: SelectConfig<T>) -> Arc<Self> {
        let debouncer = Debouncer::new(config.debounce);
        Arc::new(Self {
            api,
            config,
            state: Mutex::new(SelectState::default()),
            debouncer,
        })
    }

    /// Populate the display label for an externally supplied id (editing an
    /// existing record). Fetches the single entity; never opens the list.
    pub async fn hydrate(&self, id: &str) {
        {
            let mut state = self.lock_state();
            state.phase = Phase::Hydrating;
        }

        match self.api.fetch_one(&self.config.endpoint, id).await {
            Ok(value) => {
                let label = serde_json::from_value::<T>(value)
                    .ok()
                    .map(|entity| self.config.label.extract(&entity));

                let mut state = self.lock_state();
                state.selected_id = Some(id.to_string());
                state.selected_label = label.clone();
                state.text = label.unwrap_or_default();
                state.open = false;
                state.phase = Phase::Selected;
            }
            Err(e) => {
                log::warn!(
                    "Failed to hydrate {} id {}: {}",
                    self.config.endpoint,
                    id,
                    e
                );
                let mut state = self.lock_state();
                state.selected_id = Some(id.to_string());
                state.phase = Phase::Selected;
            }
        }
    }

    /// Handle a text-input change.
    pub fn on_input(self: &Arc<Self>, text: &str) {
        let mut cleared = false;
        {
            let mut state = self.lock_state();
            state.text = text.to_string();

            // A typed string that no longer matches the selected label must
            // not retain the stale id
            if state.selected_id.is_some() && state.selected_label.as_deref() != Some(text) {
                state.selected_id = None;
                state.selected_label = None;
                cleared = true;
            }

            let term = text.trim();
            if term.chars().count() < self.config.min_term_len {
                state.results.clear();
                state.open = false;
                state.phase = if state.text.is_empty() {
                    Phase::Empty
                } else {
                    Phase::Typing
                };
                drop(state);
                self.debouncer.cancel();
                if cleared {
                    self.emit_change(None);
                }
                return;
            }

            state.phase = Phase::Typing;
        }

        if cleared {
            self.emit_change(None);
        }

        let this = Arc::clone(self);
        let term = text.trim().to_string();
        self.debouncer.schedule(async move {
            this.run_search(term).await;
        });
    }

    /// Pick a result by list index. Returns the selected entity.
    pub fn select(&self, index: usize) -> Option<T> {
        let (entity, id) = {
            let mut state = self.lock_state();
            let entity = state.results.get(index)?.clone();
            let label = self.config.label.extract(&entity);
            let id = (self.config.identity)(&entity);

            state.text = label.clone();
            state.selected_id = Some(id.clone());
            state.selected_label = Some(label);
            state.results.clear();
            state.open = false;
            state.phase = Phase::Selected;
            (entity, id)
        };

        self.emit_change(Some(&id));
        if let Some(ref on_select) = self.config.on_select {
            on_select(&entity);
        }
        Some(entity)
    }

    /// Outside click: close the list without touching the selection.
    pub fn close(&self) {
        self.lock_state().open = false;
    }

    /// Explicit clear control: reset text, selection, and results.
    pub fn clear(&self) {
        self.debouncer.cancel();
        let had_selection = {
            let mut state = self.lock_state();
            let had = state.selected_id.is_some();
            *state = SelectState::default();
            had
        };
        if had_selection {
            self.emit_change(None);
        }
    }

    async fn run_search(&self, term: String) {
        self.lock_state().phase = Phase::Searching;

        let extra = self
            .config
            .extra_filter
            .as_ref()
            .map(|(k, v)| (k.as_str(), v.as_str()));

        let results = match self
            .api
            .search(
                &self.config.endpoint,
                &self.config.search_param,
                &term,
                self.config.limit,
                extra,
            )
            .await
        {
            Ok(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            Err(e) => {
                // Renders the same as an empty result set
                log::warn!("Search on {} failed: {}", self.config.endpoint, e);
                Vec::new()
            }
        };

        let mut state = self.lock_state();
        state.results = results;
        state.open = true;
        state.phase = Phase::ResultsShown;
    }

    fn emit_change(&self, id: Option<&str>) {
        if let Some(ref on_change) = self.config.on_change {
            on_change(id);
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SelectState<T>> {
        self.state.lock().expect("select state mutex poisoned")
    }

    // Read accessors for the rendering layer and tests

    pub fn text(&self) -> String {
        self.lock_state().text.clone()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.lock_state().selected_id.clone()
    }

    pub fn results(&self) -> Vec<T> {
        self.lock_state().results.clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock_state().open
    }

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }
}
