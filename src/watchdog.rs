//! Deadline watchdog for a move search.
//!
//! The search runs on the calling thread. A scoped timer thread waits for it
//! to finish; if the deadline passes first and the search has not flagged its
//! result as ready, the timer answers with a uniformly random empty point taken
//! from its own snapshot of the board. The timer never touches the board or
//! the search state. Whichever side claims the decision slot first answers;
//! the other is discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::board::{Board, Point};
use crate::constants::PASS;

/// Who produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Search,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub point: Point,
    pub source: DecisionSource,
}

pub struct Watchdog {
    deadline: Duration,
    seed: Option<u64>,
}

impl Watchdog {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            seed: None,
        }
    }

    /// Fix the seed used to pick the fallback move.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run `search` under the deadline and return the decision that won.
    pub fn run<F>(&self, board: &Board, search: F) -> Decision
    where
        F: FnOnce() -> Point,
    {
        self.run_with(board, search, |_| {})
    }

    /// Like [`Watchdog::run`], also calling `respond` exactly once, from
    /// whichever thread claims the decision, as soon as it is claimed.
    ///
    /// On a timeout `respond` fires at the deadline while the search is still
    /// running; the search result is then dropped.
    pub fn run_with<F, R>(&self, board: &Board, search: F, respond: R) -> Decision
    where
        F: FnOnce() -> Point,
        R: Fn(Decision) + Sync,
    {
        let empties = board.get_empty_points();
        let mut rng = match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        let ready = AtomicBool::new(false);
        let slot: Mutex<Option<Decision>> = Mutex::new(None);
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let deadline = self.deadline;

        let searched = thread::scope(|s| {
            let ready = &ready;
            let slot = &slot;
            let respond = &respond;

            s.spawn(move || {
                if let Ok(()) | Err(RecvTimeoutError::Disconnected) = done_rx.recv_timeout(deadline) {
                    return;
                }
                if ready.load(Ordering::Acquire) {
                    return;
                }
                let point = if empties.is_empty() {
                    PASS
                } else {
                    empties[rng.usize(..empties.len())]
                };
                let decision = Decision {
                    point,
                    source: DecisionSource::Fallback,
                };
                if claim(slot, decision) {
                    warn!(
                        deadline_ms = deadline.as_millis() as u64,
                        point, "search missed its deadline, answering with a random move"
                    );
                    respond(decision);
                }
            });

            let point = search();
            ready.store(true, Ordering::Release);
            let decision = Decision {
                point,
                source: DecisionSource::Search,
            };
            if claim(slot, decision) {
                respond(decision);
            }
            let _ = done_tx.send(());
            decision
        });

        slot.into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or(searched)
    }
}

/// Store `decision` if the slot is still empty. Returns whether it was stored.
fn claim(slot: &Mutex<Option<Decision>>, decision: Decision) -> bool {
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_some() {
        return false;
    }
    *guard = Some(decision);
    true
}
