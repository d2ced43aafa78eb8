//! Request lifecycle tracking for asynchronous remote operations.

use crate::error::{AppError, Result};
use std::future::Future;
use tokio::sync::mpsc;

/// Observable state of one tracked asynchronous call.
#[derive(Debug, Default)]
pub enum OperationState<T> {
    #[default]
    Idle,
    Pending,
    Succeeded(T),
    Failed(AppError),
}

impl<T> OperationState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, OperationState::Pending)
    }
}

/// Settle message from a spawned call.
struct Settled<T> {
    token: u64,
    outcome: Result<T>,
}

/// Wraps at most one in-flight asynchronous call and surfaces its terminal
/// outcome exactly once.
///
/// Each `start` bumps a generation token and replaces the settle channel, so
/// a stale call settling after a newer one has started is ignored: last call
/// wins, and handlers bind to the call rather than the tracker.
pub struct OperationTracker<T> {
    state: OperationState<T>,
    generation: u64,
    rx: Option<mpsc::UnboundedReceiver<Settled<T>>>,
}

impl<T: Send + 'static> OperationTracker<T> {
    pub fn new() -> Self {
        Self {
            state: OperationState::Idle,
            generation: 0,
            rx: None,
        }
    }

    /// Begin tracking a new call, discarding any prior observation.
    pub fn start<F>(&mut self, handle: &tokio::runtime::Handle, call: F)
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.generation += 1;
        let token = self.generation;
        let (tx, rx) = mpsc::unbounded_channel();
        self.rx = Some(rx);
        self.state = OperationState::Pending;

        handle.spawn(async move {
            let outcome = call.await;
            // The receiver is gone if a newer start() replaced this call.
            let _ = tx.send(Settled { token, outcome });
        });
    }

    /// Drain settle messages.
    ///
    /// Returns `true` exactly when the tracked call reached a terminal state
    /// during this poll; the caller then consumes it with [`take`].
    ///
    /// [`take`]: OperationTracker::take
    pub fn poll(&mut self) -> bool {
        loop {
            let Some(rx) = self.rx.as_mut() else {
                return false;
            };
            match rx.try_recv() {
                Ok(settled) => {
                    if settled.token != self.generation {
                        // Stale call; a newer start() owns this tracker.
                        continue;
                    }
                    self.rx = None;
                    self.state = match settled.outcome {
                        Ok(value) => OperationState::Succeeded(value),
                        Err(e) => OperationState::Failed(e),
                    };
                    return true;
                }
                Err(mpsc::error::TryRecvError::Empty) => return false,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    // The call task died without settling.
                    self.rx = None;
                    self.state =
                        OperationState::Failed(AppError::parse("operation task dropped before settling"));
                    return true;
                }
            }
        }
    }

    /// Move the terminal state out, leaving `Idle`.
    pub fn take(&mut self) -> OperationState<T> {
        std::mem::take(&mut self.state)
    }

    pub fn state(&self) -> &OperationState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }
}

impl<T: Send + 'static> Default for OperationTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Pump the tracker until it settles or the budget runs out.
    fn wait_settle<T: Send + 'static>(tracker: &mut OperationTracker<T>) -> bool {
        for _ in 0..400 {
            if tracker.poll() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_success_observed_exactly_once() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut tracker = OperationTracker::new();

        tracker.start(rt.handle(), async { Ok(42u32) });
        assert!(tracker.is_pending());
        assert!(wait_settle(&mut tracker));

        match tracker.take() {
            OperationState::Succeeded(v) => assert_eq!(v, 42),
            other => panic!("expected success, got {other:?}"),
        }

        // The outcome is gone after the first take and never re-settles.
        assert!(matches!(tracker.take(), OperationState::Idle));
        assert!(!tracker.poll());
    }

    #[test]
    fn test_failure_observed() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut tracker: OperationTracker<u32> = OperationTracker::new();

        tracker.start(rt.handle(), async { Err(AppError::remote("boom")) });
        assert!(wait_settle(&mut tracker));

        match tracker.take() {
            OperationState::Failed(e) => assert_eq!(e.user_message("fallback"), "boom"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_restart_ignores_stale_call() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (tx1, rx1) = oneshot::channel::<u32>();
        let (tx2, rx2) = oneshot::channel::<u32>();
        let mut tracker = OperationTracker::new();

        tracker.start(rt.handle(), async move { Ok(rx1.await.unwrap()) });
        tracker.start(rt.handle(), async move { Ok(rx2.await.unwrap()) });

        // The first call settles after being replaced; it must not surface.
        tx1.send(1).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert!(!tracker.poll());
        assert!(tracker.is_pending());

        tx2.send(2).unwrap();
        assert!(wait_settle(&mut tracker));
        match tracker.take() {
            OperationState::Succeeded(v) => assert_eq!(v, 2),
            other => panic!("expected second call's outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_restart_clears_previous_observation() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut tracker = OperationTracker::new();

        tracker.start(rt.handle(), async { Ok(1u32) });
        assert!(wait_settle(&mut tracker));
        assert!(matches!(tracker.state(), OperationState::Succeeded(_)));

        // Restarting without taking the result clears the old observation.
        tracker.start(rt.handle(), async { Ok(2u32) });
        assert!(tracker.is_pending());
        assert!(wait_settle(&mut tracker));
        match tracker.take() {
            OperationState::Succeeded(v) => assert_eq!(v, 2),
            other => panic!("expected fresh outcome, got {other:?}"),
        }
    }
}
