//! Application state module

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::dispatch::service::DispatchService;

/// Global application state
#[derive(Clone)]
pub struct AppState<D: DispatchService> {
    /// The time the server started
    pub start_time: DateTime<Utc>,

    /// Dispatch service
    pub dispatcher: Arc<D>,
}

impl<D> AppState<D>
where
    D: DispatchService,
{
    /// Create a new application state
    pub fn new(dispatcher: D) -> Self {
        Self {
            start_time: Utc::now(),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl<D> fmt::Debug for AppState<D>
where
    D: DispatchService,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("start_time", &self.start_time)
            .field("dispatcher", &"DispatchService")
            .finish()
    }
}

#[cfg(test)]
use crate::domain::dispatch::service::MockDispatchService;

#[cfg(test)]
pub fn test_state(dispatcher: Option<MockDispatchService>) -> AppState<MockDispatchService> {
    let dispatcher = dispatcher
        .map(Arc::new)
        .unwrap_or_else(|| Arc::new(MockDispatchService::new()));

    AppState {
        start_time: Utc::now(),
        dispatcher,
    }
}
