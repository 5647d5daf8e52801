//! Fetch orchestration for the dashboard
//!
//! `DashboardSync` issues fetches through a [`FetchPort`], tags each request
//! with the selection it was issued for and applies completions through the
//! state machine. Completions may arrive in any order; a completion whose
//! selection no longer matches the current one is discarded.

use crate::error::CoreError;
use crate::event::{DashboardEvent, EventBus};
use crate::models::{ActivityResponse, BoardId, BoardsResponse, CacheInfoMap};
use crate::selection::parse_identifier;
use crate::state::{DashboardState, DashboardStateMachine, StateEvent};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Message stored in `error` when the boards fetch fails
pub const BOARDS_FETCH_ERROR: &str = "Failed to fetch boards data";

/// Backend operations the dashboard depends on
pub trait FetchPort: Send + Sync + 'static {
    fn fetch_boards(
        &self,
        ids: &[BoardId],
        force_refresh: bool,
    ) -> impl Future<Output = Result<BoardsResponse, CoreError>> + Send;

    /// Activity feed for `ids`, optionally restricted to events after `since`
    fn fetch_activities(
        &self,
        ids: &[BoardId],
        since: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<ActivityResponse, CoreError>> + Send;

    /// Clear one board's cache entry, or the whole cache when `None`
    fn clear_cache(
        &self,
        board_id: Option<&BoardId>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn get_cache_info(&self) -> impl Future<Output = Result<CacheInfoMap, CoreError>> + Send;

    fn health_check(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Identity of an issued request: its id and the selection it was made for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag {
    pub request_id: u64,
    pub selection: Vec<BoardId>,
}

#[derive(Debug)]
pub enum CompletionPayload {
    Boards(Result<BoardsResponse, CoreError>),
    Activities {
        result: Result<ActivityResponse, CoreError>,
        /// Appended to the existing timeline instead of replacing it
        incremental: bool,
    },
}

/// A finished fetch waiting to be applied
#[derive(Debug)]
pub struct Completion {
    pub tag: RequestTag,
    pub payload: CompletionPayload,
}

/// What happened to a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Applied,
    Failed,
    Discarded,
}

/// Orchestrates fetches and owns the state machine
pub struct DashboardSync<F: FetchPort> {
    machine: DashboardStateMachine,
    port: Arc<F>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    next_request: u64,
    /// Id of the most recently issued boards request (0: none yet)
    latest_boards_request: u64,
    /// Id of the most recently issued full activities request (0: none yet)
    latest_activities_request: u64,
    in_flight: usize,
    events: EventBus,
}

impl<F: FetchPort> DashboardSync<F> {
    pub fn new(machine: DashboardStateMachine, port: Arc<F>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            machine,
            port,
            tx,
            rx,
            next_request: 0,
            latest_boards_request: 0,
            latest_activities_request: 0,
            in_flight: 0,
            events: EventBus::default_capacity(),
        }
    }

    pub fn state(&self) -> Arc<DashboardState> {
        self.machine.state()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn port(&self) -> &F {
        &self.port
    }

    /// Number of issued requests whose completion has not been received yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply a state event. A selection change triggers a refresh of both
    /// fetches when the new selection is non-empty.
    pub fn dispatch(&mut self, event: StateEvent) -> Arc<DashboardState> {
        let before = self.machine.state();
        let after = self.machine.apply(event);

        if before.selected_board_ids != after.selected_board_ids {
            self.events.publish(DashboardEvent::SelectionChanged);
            if !after.selected_board_ids.is_empty() {
                self.request_refresh(false);
                return self.machine.state();
            }
        } else if *before != *after {
            self.events.publish(DashboardEvent::ViewChanged);
        }

        after
    }

    /// Parse raw input (id or board URL) and add it to the selection
    pub fn add_board_input(&mut self, raw: &str) -> Result<Arc<DashboardState>, CoreError> {
        let id = parse_identifier(raw)?;
        Ok(self.dispatch(StateEvent::BoardAdded(id)))
    }

    pub fn remove_board(&mut self, id: BoardId) -> Arc<DashboardState> {
        self.dispatch(StateEvent::BoardRemoved(id))
    }

    pub fn clear_boards(&mut self) -> Arc<DashboardState> {
        self.dispatch(StateEvent::SelectionCleared)
    }

    pub fn replace_selection(&mut self, ids: Vec<BoardId>) -> Arc<DashboardState> {
        self.dispatch(StateEvent::SelectionReplaced(ids))
    }

    fn issue_tag(&mut self) -> RequestTag {
        self.next_request += 1;
        RequestTag {
            request_id: self.next_request,
            selection: self.machine.state().selected_board_ids.to_vec(),
        }
    }

    /// Issue the boards fetch and a full activities fetch for the current
    /// selection. No-op on an empty selection.
    pub fn request_refresh(&mut self, force_refresh: bool) {
        if self.machine.state().selected_board_ids.is_empty() {
            debug!("Skipping refresh: no boards selected");
            return;
        }

        let boards_tag = self.issue_tag();
        self.latest_boards_request = boards_tag.request_id;
        self.machine.apply(StateEvent::LoadingStarted);
        self.spawn_boards(boards_tag, force_refresh);

        let activities_tag = self.issue_tag();
        self.latest_activities_request = activities_tag.request_id;
        self.spawn_activities(activities_tag, None, false);

        debug!(force_refresh, in_flight = self.in_flight, "Refresh issued");
    }

    /// Fetch only activity newer than the newest known record and merge it in
    pub fn request_activity_update(&mut self) {
        let state = self.machine.state();
        if state.selected_board_ids.is_empty() {
            debug!("Skipping activity update: no boards selected");
            return;
        }

        let since = state.activities.iter().map(|a| a.date).max();
        let tag = self.issue_tag();
        match since {
            Some(since) => self.spawn_activities(tag, Some(since), true),
            None => {
                self.latest_activities_request = tag.request_id;
                self.spawn_activities(tag, None, false);
            }
        }
    }

    fn spawn_boards(&mut self, tag: RequestTag, force_refresh: bool) {
        let port = Arc::clone(&self.port);
        let ids = tag.selection.clone();
        let fetch = async move { port.fetch_boards(&ids, force_refresh).await };

        self.spawn_fetch("Fetch boards", fetch, move |result| Completion {
            tag,
            payload: CompletionPayload::Boards(result),
        });
    }

    fn spawn_activities(&mut self, tag: RequestTag, since: Option<DateTime<Utc>>, incremental: bool) {
        let port = Arc::clone(&self.port);
        let ids = tag.selection.clone();
        let fetch = async move { port.fetch_activities(&ids, since).await };

        self.spawn_fetch("Fetch activities", fetch, move |result| Completion {
            tag,
            payload: CompletionPayload::Activities { result, incremental },
        });
    }

    /// Run `fetch` on its own task and always send a completion for it.
    /// A fetch task that panics or is cancelled completes as a network error.
    fn spawn_fetch<T, Fut, C>(&mut self, operation: &'static str, fetch: Fut, complete: C)
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
        C: FnOnce(Result<T, CoreError>) -> Completion + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = match tokio::spawn(fetch).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(operation, error = %e, "Fetch task aborted");
                    Err(CoreError::network(operation, format!("fetch task aborted: {e}")))
                }
            };
            let _ = tx.send(complete(result));
        });
    }

    /// Wait for the next completion. `None` when nothing is in flight.
    ///
    /// A received completion no longer counts as in flight, whether or not it
    /// is applied afterwards.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(completion)
    }

    /// Wait for every in-flight request and apply each completion
    pub async fn settle(&mut self) -> Vec<CompletionOutcome> {
        let mut outcomes = Vec::new();
        while let Some(completion) = self.next_completion().await {
            outcomes.push(self.apply_completion(completion));
        }
        outcomes
    }

    /// Apply one completion through the state machine
    pub fn apply_completion(&mut self, completion: Completion) -> CompletionOutcome {
        let Completion { tag, payload } = completion;

        let current = self.machine.state();
        if current.selected_board_ids.as_slice() != tag.selection.as_slice() {
            if matches!(payload, CompletionPayload::Boards(_))
                && tag.request_id == self.latest_boards_request
                && current.loading
            {
                self.machine.apply(StateEvent::LoadingFinished);
            }
            debug!(request_id = tag.request_id, "Discarding completion for a stale selection");
            self.events.publish(DashboardEvent::CompletionDiscarded {
                request_id: tag.request_id,
            });
            return CompletionOutcome::Discarded;
        }

        match payload {
            CompletionPayload::Boards(result) => self.apply_boards(tag, result),
            CompletionPayload::Activities {
                result,
                incremental,
            } => self.apply_activities(tag, result, incremental),
        }
    }

    fn apply_boards(
        &mut self,
        tag: RequestTag,
        result: Result<BoardsResponse, CoreError>,
    ) -> CompletionOutcome {
        if tag.request_id != self.latest_boards_request {
            debug!(request_id = tag.request_id, "Discarding superseded boards response");
            self.events.publish(DashboardEvent::CompletionDiscarded {
                request_id: tag.request_id,
            });
            return CompletionOutcome::Discarded;
        }

        match result {
            Ok(response) => {
                let from_cache = response.from_cache.unwrap_or(false);
                info!(
                    boards = response.boards.len(),
                    from_cache, "Boards fetch completed"
                );
                self.machine.apply(StateEvent::BoardsReplaced {
                    boards: response.boards,
                    cache_info: response.cache_info,
                    from_cache,
                });
                self.machine.apply(StateEvent::LoadingFinished);
                self.events.publish(DashboardEvent::BoardsUpdated { from_cache });
                CompletionOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "Boards fetch failed");
                self.machine
                    .apply(StateEvent::ErrorSet(Some(BOARDS_FETCH_ERROR.to_string())));
                self.machine.apply(StateEvent::LoadingFinished);
                self.events
                    .publish(DashboardEvent::FetchFailed(BOARDS_FETCH_ERROR.to_string()));
                CompletionOutcome::Failed
            }
        }
    }

    fn apply_activities(
        &mut self,
        tag: RequestTag,
        result: Result<ActivityResponse, CoreError>,
        incremental: bool,
    ) -> CompletionOutcome {
        if !incremental && tag.request_id != self.latest_activities_request {
            debug!(request_id = tag.request_id, "Discarding superseded activities response");
            self.events.publish(DashboardEvent::CompletionDiscarded {
                request_id: tag.request_id,
            });
            return CompletionOutcome::Discarded;
        }

        match result {
            Ok(response) => {
                info!(
                    activities = response.activities.len(),
                    incremental, "Activities fetch completed"
                );
                let event = if incremental {
                    StateEvent::ActivitiesAppended(response.activities)
                } else {
                    StateEvent::ActivitiesReplaced(response.activities)
                };
                self.machine.apply(event);
                self.events.publish(DashboardEvent::ActivitiesUpdated);
                CompletionOutcome::Applied
            }
            Err(e) => {
                // Best effort: the timeline keeps its previous content
                warn!(error = %e, "Failed to fetch activities");
                CompletionOutcome::Failed
            }
        }
    }

    /// Clear the backend cache, then drop the local cache info.
    /// On failure the state is left untouched.
    pub async fn clear_cache(&mut self, board_id: Option<BoardId>) -> Result<(), CoreError> {
        if let Err(e) = self.port.clear_cache(board_id.as_ref()).await {
            warn!(error = %e, "Failed to clear cache");
            return Err(e);
        }

        info!(board = ?board_id.as_ref().map(BoardId::as_str), "Cache cleared");
        self.machine.apply(StateEvent::CacheInfoCleared);
        self.events.publish(DashboardEvent::CacheCleared(board_id));
        Ok(())
    }

    /// Replace the local cache info with the backend's current view
    pub async fn refresh_cache_info(&mut self) -> Result<Arc<DashboardState>, CoreError> {
        let info = self.port.get_cache_info().await?;
        let state = self.machine.apply(StateEvent::CacheInfoUpdated(info));
        self.events.publish(DashboardEvent::CacheInfoUpdated);
        Ok(state)
    }

    pub async fn health_check(&self) -> Result<(), CoreError> {
        self.port.health_check().await
    }
}

impl<F: FetchPort> std::fmt::Debug for DashboardSync<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardSync")
            .field("next_request", &self.next_request)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}
