//! Single-flight coordination for token refreshes.
//!
//! The gate is either idle or refreshing. The first caller that enters while
//! idle becomes the leader and receives a [`RefreshLease`]; everyone arriving
//! while the lease is alive is queued in arrival order and woken with the
//! leader's outcome when the lease is settled. A lease dropped without being
//! settled (the leader's future was cancelled) closes every waiter's channel
//! without an outcome, so each waiter can enter the gate again and take over.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

/// `Ok(Some(token))`: replay with this token.
/// `Ok(None)`: there was no session to refresh, the original 401 stands.
pub type RefreshOutcome = Result<Option<String>, RefreshFailure>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RefreshFailure(pub String);

impl RefreshFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

enum GateState {
    Idle,
    Refreshing {
        waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
    },
}

pub struct RefreshGate {
    state: Mutex<GateState>,
}

pub enum Ticket<'a> {
    Leader(RefreshLease<'a>),
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn enter(&self) -> Ticket<'_> {
        let mut state = self.lock();
        if let GateState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push_back(tx);
            return Ticket::Waiter(rx);
        }
        *state = GateState::Refreshing {
            waiters: VecDeque::new(),
        };
        Ticket::Leader(RefreshLease {
            gate: self,
            settled: false,
        })
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), GateState::Refreshing { .. })
    }

    pub fn waiting(&self) -> usize {
        match &*self.lock() {
            GateState::Idle => 0,
            GateState::Refreshing { waiters } => waiters.len(),
        }
    }

    fn take_waiters(&self) -> VecDeque<oneshot::Sender<RefreshOutcome>> {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, GateState::Idle) {
            GateState::Idle => VecDeque::new(),
            GateState::Refreshing { waiters } => waiters,
        }
    }

    /// Back to idle, then wake the queue front to back. Returns how many
    /// waiters were still listening.
    fn release(&self, outcome: RefreshOutcome) -> usize {
        self.take_waiters()
            .into_iter()
            .filter_map(|tx| tx.send(outcome.clone()).ok())
            .count()
    }
}

#[must_use = "a lease must be settled, dropping it sends waiters back to the gate"]
pub struct RefreshLease<'a> {
    gate: &'a RefreshGate,
    settled: bool,
}

impl RefreshLease<'_> {
    pub fn settle(mut self, outcome: RefreshOutcome) -> usize {
        self.settled = true;
        self.gate.release(outcome)
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            // senders dropped unsent: receivers see a closed channel
            drop(self.gate.take_waiters());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(gate: &RefreshGate) -> RefreshLease<'_> {
        match gate.enter() {
            Ticket::Leader(lease) => lease,
            Ticket::Waiter(_) => panic!("expected to lead the refresh"),
        }
    }

    fn wait(gate: &RefreshGate) -> oneshot::Receiver<RefreshOutcome> {
        match gate.enter() {
            Ticket::Waiter(rx) => rx,
            Ticket::Leader(_) => panic!("expected to queue behind the leader"),
        }
    }

    #[tokio::test]
    async fn one_leader_many_waiters() {
        let gate = RefreshGate::new();
        assert!(!gate.is_refreshing());

        let lease = lead(&gate);
        let waiters: Vec<_> = (0..3).map(|_| wait(&gate)).collect();
        assert!(gate.is_refreshing());
        assert_eq!(gate.waiting(), 3);

        assert_eq!(lease.settle(Ok(Some("fresh".into()))), 3);
        assert!(!gate.is_refreshing());

        for rx in waiters {
            assert_eq!(rx.await.unwrap(), Ok(Some("fresh".to_string())));
        }
    }

    #[tokio::test]
    async fn failure_rejects_everyone() {
        let gate = RefreshGate::new();
        let lease = lead(&gate);
        let first = wait(&gate);
        let second = wait(&gate);

        lease.settle(Err(RefreshFailure::new("refresh token revoked")));

        let expected = Err(RefreshFailure::new("refresh token revoked"));
        assert_eq!(first.await.unwrap(), expected);
        assert_eq!(second.await.unwrap(), expected);
    }

    #[tokio::test]
    async fn dropped_lease_closes_waiters_without_an_outcome() {
        let gate = RefreshGate::new();
        let lease = lead(&gate);
        let first = wait(&gate);
        let second = wait(&gate);
        drop(lease);

        assert!(first.await.is_err());
        assert!(!gate.is_refreshing());

        // a released waiter takes over the refresh, the other queues behind it
        let lease = lead(&gate);
        let requeued = wait(&gate);
        assert!(second.await.is_err());
        assert_eq!(lease.settle(Ok(Some("t".into()))), 1);
        assert_eq!(requeued.await.unwrap(), Ok(Some("t".to_string())));
    }

    #[test]
    fn gone_waiters_are_not_counted() {
        let gate = RefreshGate::new();
        let lease = lead(&gate);
        let kept = wait(&gate);
        drop(wait(&gate));

        assert_eq!(lease.settle(Ok(Some("t".into()))), 1);
        drop(kept);
    }
}
