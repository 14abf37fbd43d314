//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::config::Config;
use crate::web::protocol::HistorySummary;
use essay_writer_core::{EssayForm, EssayGenerator, EssayParagraph, HistoryStore};
use std::sync::{Arc, Mutex, PoisonError};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: EssayGenerator,
    /// Never held across an `.await`.
    history: Mutex<HistoryStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, generator: EssayGenerator, history: HistoryStore) -> Self {
        Self {
            config,
            generator,
            history: Mutex::new(history),
        }
    }

    /// Runs `f` with exclusive access to the history store.
    pub fn with_history<R>(&self, f: impl FnOnce(&mut HistoryStore) -> R) -> R {
        // Every store operation leaves it consistent, so a poisoned lock is still usable.
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut history)
    }

    pub fn history_summaries(&self) -> Vec<HistorySummary> {
        self.with_history(|history| history.entries().iter().map(HistorySummary::from).collect())
    }
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// The live form state of a single connection. Owned by that connection's loop.
#[derive(Debug, Default)]
pub struct SessionState {
    pub form: EssayForm,
    pub essay: Option<Vec<EssayParagraph>>,
    generation_in_flight: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the busy latch. Returns `false` if a generation is already running.
    pub fn try_begin_generation(&mut self) -> bool {
        if self.generation_in_flight {
            return false;
        }
        self.generation_in_flight = true;
        true
    }

    /// Releases the busy latch, whatever the outcome of the generation was.
    pub fn finish_generation(&mut self) {
        self.generation_in_flight = false;
    }

    pub fn is_generating(&self) -> bool {
        self.generation_in_flight
    }

    /// Replaces the form and the displayed essay with copies of a stored essay.
    pub fn load(&mut self, form: EssayForm, essay: Vec<EssayParagraph>) {
        self.form = form;
        self.essay = Some(essay);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_latch_allows_one_generation_at_a_time() {
        let mut session = SessionState::new();
        assert!(session.try_begin_generation());
        assert!(session.is_generating());
        assert!(!session.try_begin_generation());

        session.finish_generation();
        assert!(!session.is_generating());
        assert!(session.try_begin_generation());
    }
}
