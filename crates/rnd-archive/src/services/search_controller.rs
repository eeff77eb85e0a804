//! Search Controller - Debounced, paginated browse page
//!
//! The controller owns the [`SearchState`] and runs as a single task that
//! multiplexes three sources: UI events, the debounce deadline for query
//! edits, and the one fetch that may be in flight.
//!
//! Phases: `Idle → Fetching → Idle`. While a fetch is running, any trigger
//! that would start another one is dropped rather than queued. Filter edits
//! (query text, tags, sort) still update the state so the next fetch picks
//! them up; a dropped "load more" leaves the page index untouched.
//!
//! Every change is published as a [`ResultsView`] on a watch channel.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::entities::{SearchPage, SearchState, DEFAULT_PAGE_SIZE};
use crate::domain::errors::ArchiveError;
use crate::domain::value_objects::SortKey;
use crate::ports::SearchApi;
use crate::services::debounce::{Debouncer, DEFAULT_SEARCH_DELAY};
use crate::services::format::result_count_label;
use crate::services::notifications::NotificationCenter;
use crate::services::render::{render_page, ResultsView, LOADING_MESSAGE};

/// Shown when a result page could not be loaded
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to load charts";

const EVENT_BUFFER: usize = 32;

/// User interactions on the browse page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// Load page 1 with the current filters (page open, manual retry)
    Refresh,
    /// The search box changed; debounced
    QueryInput(String),
    ToggleTag(String),
    SortChanged(SortKey),
    LoadMore,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Replaces the rendered list
    Fresh,
    /// Appends the next page
    Continuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching(FetchKind),
}

/// Controller settings
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub page_size: u32,
    pub search_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_delay: DEFAULT_SEARCH_DELAY,
        }
    }
}

type FetchFuture = Pin<Box<dyn Future<Output = Result<SearchPage, ArchiveError>> + Send>>;

struct InFlight {
    kind: FetchKind,
    future: FetchFuture,
}

pub struct SearchController {
    api: Arc<dyn SearchApi>,
    notifications: Arc<NotificationCenter>,
    state: SearchState,
    debounce: Debouncer,
    view: ResultsView,
    in_flight: Option<InFlight>,
    view_tx: watch::Sender<ResultsView>,
}

impl SearchController {
    pub fn new(
        api: Arc<dyn SearchApi>,
        notifications: Arc<NotificationCenter>,
        config: ControllerConfig,
    ) -> Self {
        let state = SearchState::new(config.page_size);
        let view = ResultsView {
            sort_key: state.sort_key.clone(),
            ..ResultsView::default()
        };
        let (view_tx, _) = watch::channel(view.clone());

        Self {
            api,
            notifications,
            state,
            debounce: Debouncer::new(config.search_delay),
            view,
            in_flight: None,
            view_tx,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }

    pub fn phase(&self) -> Phase {
        match &self.in_flight {
            Some(in_flight) => Phase::Fetching(in_flight.kind),
            None => Phase::Idle,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultsView> {
        self.view_tx.subscribe()
    }

    /// Apply one UI event
    pub fn handle_event(&mut self, event: SearchEvent) {
        debug!(event = ?event, phase = ?self.phase(), "Search event");

        match event {
            SearchEvent::Refresh => {
                self.request_fetch(FetchKind::Fresh);
            }
            SearchEvent::QueryInput(text) => {
                self.state.query_text = text;
                self.debounce.trigger();
            }
            SearchEvent::ToggleTag(tag) => {
                self.state.toggle_tag(&tag);
                self.request_fetch(FetchKind::Fresh);
            }
            SearchEvent::SortChanged(key) => {
                self.state.sort_key = key;
                self.request_fetch(FetchKind::Fresh);
            }
            SearchEvent::LoadMore => {
                if self.state.has_more() {
                    self.request_fetch(FetchKind::Continuation);
                } else {
                    debug!("No further pages; ignoring load more");
                }
            }
            SearchEvent::Reset => {
                self.debounce.cancel();
                self.state.reset();
                self.request_fetch(FetchKind::Fresh);
            }
        }

        self.publish();
    }

    /// Process events until the sender side is closed.
    ///
    /// After the channel closes, a pending debounced search and the running
    /// fetch are still completed. Returns the controller for inspection.
    pub async fn run(mut self, mut events: mpsc::Receiver<SearchEvent>) -> Self {
        let mut events_open = true;

        loop {
            if !events_open && self.in_flight.is_none() && !self.debounce.is_pending() {
                break;
            }

            let deadline = self.debounce.deadline();
            let fetching = self.in_flight.is_some();

            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event),
                    None => events_open = false,
                },
                _ = Debouncer::wait(deadline), if deadline.is_some() => {
                    if self.debounce.take_due(Instant::now()) {
                        self.request_fetch(FetchKind::Fresh);
                        self.publish();
                    }
                }
                (kind, result) = settle(&mut self.in_flight), if fetching => {
                    self.finish_fetch(kind, result);
                }
            }
        }

        debug!("Search controller stopped");
        self
    }

    /// Run the controller on its own task
    pub fn spawn(self) -> SearchHandle {
        let (events, rx) = mpsc::channel(EVENT_BUFFER);
        let view = self.subscribe();
        let task = tokio::spawn(self.run(rx));
        SearchHandle { events, view, task }
    }

    fn request_fetch(&mut self, kind: FetchKind) -> bool {
        if let Some(in_flight) = &self.in_flight {
            debug!(
                requested = ?kind,
                running = ?in_flight.kind,
                "Fetch already in flight; dropping trigger"
            );
            return false;
        }

        self.start_fetch(kind);
        true
    }

    fn start_fetch(&mut self, kind: FetchKind) {
        match kind {
            FetchKind::Fresh => self.state.page_index = 1,
            FetchKind::Continuation => self.state.page_index += 1,
        }
        self.state.is_fetch_in_flight = true;

        let query = self.state.to_query();
        debug!(
            q = %query.q,
            tags = ?query.tags,
            offset = query.offset,
            limit = query.limit,
            sort = %query.sort,
            "Fetching charts"
        );

        let api = Arc::clone(&self.api);
        let future: FetchFuture = Box::pin(async move { api.search(&query).await });
        self.in_flight = Some(InFlight { kind, future });
        self.view.loading = Some(LOADING_MESSAGE.to_string());
    }

    fn finish_fetch(&mut self, kind: FetchKind, result: Result<SearchPage, ArchiveError>) {
        self.in_flight = None;
        self.state.is_fetch_in_flight = false;
        self.view.loading = None;

        match result {
            Ok(page) => {
                self.state.total_result_count = page.total_count;
                let cards = render_page(&page.results);
                match kind {
                    FetchKind::Fresh => self.view.replace(cards),
                    FetchKind::Continuation => self.view.append(cards),
                }
                self.view.load_more_visible = self.state.has_more();
                self.view.result_count_label = Some(result_count_label(page.total_count));
                debug!(
                    total = page.total_count,
                    shown = self.view.card_count(),
                    "Charts rendered"
                );
            }
            Err(err) => {
                warn!(error = %err, kind = ?kind, "Loading charts failed");
                if kind == FetchKind::Continuation {
                    self.state.page_index = self.state.page_index.saturating_sub(1).max(1);
                }
                self.notifications.error(SEARCH_FAILED_MESSAGE);
            }
        }

        self.publish();
    }

    fn publish(&mut self) {
        self.view.query_text = self.state.query_text.clone();
        self.view.selected_tags = self.state.selected_tags.clone();
        self.view.sort_key = self.state.sort_key.clone();
        self.view_tx.send_replace(self.view.clone());
    }
}

async fn settle(in_flight: &mut Option<InFlight>) -> (FetchKind, Result<SearchPage, ArchiveError>) {
    match in_flight {
        Some(in_flight) => (in_flight.kind, in_flight.future.as_mut().await),
        None => std::future::pending().await,
    }
}

/// Handle to a spawned [`SearchController`]
pub struct SearchHandle {
    events: mpsc::Sender<SearchEvent>,
    view: watch::Receiver<ResultsView>,
    task: JoinHandle<SearchController>,
}

impl SearchHandle {
    pub async fn send(&self, event: SearchEvent) -> Result<(), ArchiveError> {
        self.events
            .send(event)
            .await
            .map_err(|e| ArchiveError::ControllerStopped(e.to_string()))
    }

    pub fn view(&self) -> watch::Receiver<ResultsView> {
        self.view.clone()
    }

    pub fn current_view(&self) -> ResultsView {
        self.view.borrow().clone()
    }

    /// Close the event channel and wait for outstanding work
    pub async fn shutdown(self) -> Result<SearchController, ArchiveError> {
        let SearchHandle { events, task, .. } = self;
        drop(events);
        task.await
            .map_err(|e| ArchiveError::ControllerStopped(e.to_string()))
    }
}
