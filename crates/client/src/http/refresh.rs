//! Single-flight gate for token refreshes.
//!
//! The first request that needs a refresh becomes the leader and performs
//! it. Requests arriving while it is in flight become followers and wait
//! for the leader's outcome. Every follower is released exactly once, in
//! arrival order, and the gate is open again afterwards.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::error::RefreshFailure;

/// Result of one refresh attempt as seen by every waiting request.
pub type RefreshResult = Result<(), RefreshFailure>;

/// Shared refresh state: the in-flight flag and the waiter queue.
///
/// One gate is shared by every client built from the same factory.
#[derive(Debug, Default)]
pub struct RefreshGate {
    state: Mutex<GateState>,
}

#[derive(Debug, Default)]
struct GateState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshResult>>,
}

/// Role handed out by [`RefreshGate::acquire`].
#[derive(Debug)]
pub enum Ticket<'a> {
    /// No refresh was running; the holder must perform it.
    Leader(LeaderGuard<'a>),
    /// A refresh is running; wait for its outcome.
    Follower(Waiter),
}

impl RefreshGate {
    /// Empty gate with no refresh in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Become the leader of a new refresh, or join the running one.
    pub fn acquire(&self) -> Ticket<'_> {
        let mut state = self.lock();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            tracing::debug!(queued = state.waiters.len(), "Waiting for in-flight refresh");
            Ticket::Follower(Waiter { rx })
        } else {
            state.in_flight = true;
            Ticket::Leader(LeaderGuard {
                gate: self,
                released: false,
            })
        }
    }

    /// Whether a refresh is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.lock().in_flight
    }

    /// Number of requests waiting for the in-flight refresh.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.lock().waiters.len()
    }
}

/// Held by the request performing the refresh.
///
/// Dropping the guard without calling [`LeaderGuard::release`] releases
/// every waiter with [`RefreshFailure::Abandoned`].
#[derive(Debug)]
pub struct LeaderGuard<'a> {
    gate: &'a RefreshGate,
    released: bool,
}

impl LeaderGuard<'_> {
    /// Report the outcome to every waiter and reopen the gate.
    pub fn release(mut self, outcome: &RefreshResult) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: &RefreshResult) {
        if self.released {
            return;
        }
        self.released = true;

        let waiters = {
            let mut state = self.gate.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        tracing::debug!(
            released = waiters.len(),
            success = outcome.is_ok(),
            "Releasing refresh waiters"
        );
        for waiter in waiters {
            // A waiter whose request was dropped has nobody left to tell.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        self.finish(&Err(RefreshFailure::Abandoned));
    }
}

/// Held by a request queued behind an in-flight refresh.
#[derive(Debug)]
pub struct Waiter {
    rx: oneshot::Receiver<RefreshResult>,
}

impl Waiter {
    /// Wait for the leader's outcome.
    pub async fn wait(self) -> RefreshResult {
        self.rx.await.unwrap_or(Err(RefreshFailure::Abandoned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader(gate: &RefreshGate) -> LeaderGuard<'_> {
        match gate.acquire() {
            Ticket::Leader(guard) => guard,
            Ticket::Follower(_) => panic!("expected to lead"),
        }
    }

    fn follower(gate: &RefreshGate) -> Waiter {
        match gate.acquire() {
            Ticket::Follower(waiter) => waiter,
            Ticket::Leader(_) => panic!("expected to follow"),
        }
    }

    #[tokio::test]
    async fn test_followers_share_success() {
        let gate = RefreshGate::new();
        let guard = leader(&gate);
        let first = follower(&gate);
        let second = follower(&gate);
        assert!(gate.is_refreshing());
        assert_eq!(gate.queued(), 2);

        guard.release(&Ok(()));

        assert_eq!(first.wait().await, Ok(()));
        assert_eq!(second.wait().await, Ok(()));
        assert!(!gate.is_refreshing());
        assert_eq!(gate.queued(), 0);
    }

    #[tokio::test]
    async fn test_followers_share_failure() {
        let gate = RefreshGate::new();
        let guard = leader(&gate);
        let waiter = follower(&gate);

        let failure = RefreshFailure::Transport("connection reset".to_owned());
        guard.release(&Err(failure.clone()));

        assert_eq!(waiter.wait().await, Err(failure));
    }

    #[tokio::test]
    async fn test_dropped_leader_abandons_waiters() {
        let gate = RefreshGate::new();
        let guard = leader(&gate);
        let waiter = follower(&gate);

        drop(guard);

        assert_eq!(waiter.wait().await, Err(RefreshFailure::Abandoned));
        assert!(!gate.is_refreshing());
    }

    #[tokio::test]
    async fn test_gate_reopens_for_next_refresh() {
        let gate = RefreshGate::new();
        leader(&gate).release(&Ok(()));

        let guard = leader(&gate);
        let waiter = follower(&gate);
        guard.release(&Err(RefreshFailure::Abandoned));
        assert!(waiter.wait().await.is_err());
    }

    #[test]
    fn test_dropped_waiter_does_not_block_release() {
        let gate = RefreshGate::new();
        let guard = leader(&gate);
        drop(follower(&gate));
        guard.release(&Ok(()));
        assert!(!gate.is_refreshing());
    }
}
