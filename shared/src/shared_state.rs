//! Lock-guarded home of a process's single `GameState`.

use crate::game_state::GameState;
use parking_lot::Mutex;

/// Exclusive-access container for a `GameState`.
///
/// Every read copies the whole state out and every write runs to completion
/// under the same lock, so a reader never sees a paddle from one update next
/// to a ball from another. Callers share it through `Arc`.
#[derive(Debug, Default)]
pub struct SharedGameState {
    inner: Mutex<GameState>,
}

impl SharedGameState {
    pub fn new(state: GameState) -> Self {
        Self {
            inner: Mutex::new(state),
        }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> GameState {
        *self.inner.lock()
    }

    /// Runs `f` against the state while holding the lock and returns its result.
    pub fn update<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Overwrites the state wholesale.
    pub fn replace(&self, state: GameState) {
        *self.inner.lock() = state;
    }
}
