//! Per-conversation session state.
//!
//! Each conversation owns exactly one [`SessionState`]; the store is the only
//! mutable state shared between orchestration runs. `Processing` is the
//! serialization discipline: while one document is in flight, further
//! document events for the same conversation are rejected at the gate, so
//! two runs can never race on a conversation's staged files.

use std::collections::HashMap;
use std::sync::Mutex;

/// Stable identifier of one chat conversation.
pub type ConversationId = i64;

/// Intake states for one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No interaction yet.
    #[default]
    Idle,
    /// Greeted and accepting a document.
    AwaitingFile,
    /// A document is in flight; further documents are rejected.
    Processing,
}

/// In-memory session table keyed by conversation id.
///
/// Sessions are created on first contact and live for the process lifetime.
/// The mutex is only held for map reads/writes, never across an await, so
/// conversations cannot block each other.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<ConversationId, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for a conversation; unknown conversations are `Idle`.
    pub fn state(&self, conversation: ConversationId) -> SessionState {
        let sessions = self.inner.lock().expect("session store poisoned");
        sessions.get(&conversation).copied().unwrap_or_default()
    }

    /// `/start` moves any state to `AwaitingFile`.
    pub fn set_awaiting(&self, conversation: ConversationId) {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        sessions.insert(conversation, SessionState::AwaitingFile);
        tracing::debug!(conversation, "session now awaiting file");
    }

    /// Atomically claim the conversation for one run.
    ///
    /// Succeeds only from `AwaitingFile`; a document arriving while `Idle`
    /// or `Processing` is rejected without any transition. The rejecting
    /// state is returned from the same locked read so callers can word the
    /// reminder without racing a concurrent completion.
    pub fn begin_processing(&self, conversation: ConversationId) -> Result<(), SessionState> {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        let state = sessions.entry(conversation).or_default();
        match *state {
            SessionState::AwaitingFile => {
                *state = SessionState::Processing;
                tracing::debug!(conversation, "session entered processing");
                Ok(())
            }
            rejecting @ (SessionState::Idle | SessionState::Processing) => Err(rejecting),
        }
    }

    /// Run epilogue: success or failure, the conversation goes back to
    /// `AwaitingFile` so it is never stuck in `Processing`.
    pub fn complete_run(&self, conversation: ConversationId) {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        sessions.insert(conversation, SessionState::AwaitingFile);
        tracing::debug!(conversation, "session run completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_conversations_are_idle() {
        let store = SessionStore::new();
        assert_eq!(store.state(1), SessionState::Idle);
    }

    #[test]
    fn start_moves_any_state_to_awaiting() {
        let store = SessionStore::new();

        store.set_awaiting(1);
        assert_eq!(store.state(1), SessionState::AwaitingFile);

        assert!(store.begin_processing(1).is_ok());
        store.set_awaiting(1);
        assert_eq!(store.state(1), SessionState::AwaitingFile);
    }

    #[test]
    fn document_only_accepted_while_awaiting() {
        let store = SessionStore::new();

        // Idle: rejected, no transition.
        assert_eq!(store.begin_processing(7), Err(SessionState::Idle));
        assert_eq!(store.state(7), SessionState::Idle);

        store.set_awaiting(7);
        assert_eq!(store.begin_processing(7), Ok(()));
        assert_eq!(store.state(7), SessionState::Processing);

        // Second document while processing: rejected, state untouched.
        assert_eq!(store.begin_processing(7), Err(SessionState::Processing));
        assert_eq!(store.state(7), SessionState::Processing);
    }

    #[test]
    fn rejection_reports_the_state_it_observed() {
        let store = SessionStore::new();

        // The rejecting state comes from the same locked read that refused
        // the claim, so the caller never re-reads a state that may have
        // moved on in the meantime.
        assert_eq!(store.begin_processing(5), Err(SessionState::Idle));

        store.set_awaiting(5);
        assert!(store.begin_processing(5).is_ok());
        assert_eq!(store.begin_processing(5), Err(SessionState::Processing));

        store.complete_run(5);
        assert!(store.begin_processing(5).is_ok());
    }

    #[test]
    fn completion_returns_to_awaiting() {
        let store = SessionStore::new();
        store.set_awaiting(3);
        assert!(store.begin_processing(3).is_ok());
        store.complete_run(3);
        assert_eq!(store.state(3), SessionState::AwaitingFile);

        // And the next document is accepted again.
        assert!(store.begin_processing(3).is_ok());
    }

    #[test]
    fn conversations_are_isolated() {
        let store = SessionStore::new();
        store.set_awaiting(1);
        store.set_awaiting(2);

        assert!(store.begin_processing(1).is_ok());
        assert_eq!(store.state(1), SessionState::Processing);
        assert_eq!(store.state(2), SessionState::AwaitingFile);
        assert!(store.begin_processing(2).is_ok());
    }
}
