//! boardwatch-core - Core library for boardwatch
//!
//! Provides the dashboard state machine, board selection, cache
//! interpretation, activity aggregation and fetch orchestration for the
//! board dashboard.

pub mod activity;
pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod models;
pub mod persistence;
pub mod selection;
pub mod state;
pub mod sync;

pub use activity::ActivityView;
pub use cache::{CacheStatus, CacheSummary, Freshness};
pub use config::DashboardConfig;
pub use error::{CoreError, PersistenceError};
pub use event::{DashboardEvent, EventBus};
pub use http::HttpFetchPort;
pub use persistence::PersistenceAdapter;
pub use selection::BoardSelection;
pub use state::{DashboardState, DashboardStateMachine, StateEvent};
pub use sync::{CompletionOutcome, DashboardSync, FetchPort};
