use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Handed to a request when it starts. Only the holder of the current ticket
/// may write the request's outcome back into the slot.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    token: CancellationToken,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct Inner<T> {
    generation: u64,
    in_flight: Option<CancellationToken>,
    state: T,
}

/// A single logical request slot ("the current search", "the selected title").
///
/// Holds the observable state and the cancellation token of the one request
/// allowed to be active. Starting a request cancels the previous one and bumps
/// the generation; a request's result is applied only while its ticket is
/// still the current generation. Every transition happens under one lock, so
/// a stale result can never land after a newer request has started.
pub struct RequestSlot<T> {
    inner: Mutex<Inner<T>>,
    tx: watch::Sender<T>,
}

impl<T: Clone> RequestSlot<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial.clone());
        Self {
            inner: Mutex::new(Inner {
                generation: 0,
                in_flight: None,
                state: initial,
            }),
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &T) {
        self.tx.send_replace(state.clone());
    }

    /// Cancel the active request (if any) and start a new one.
    pub fn begin(&self, start: impl FnOnce(&mut T)) -> Ticket {
        let mut inner = self.lock();
        if let Some(previous) = inner.in_flight.take() {
            previous.cancel();
        }
        inner.generation += 1;

        let token = CancellationToken::new();
        inner.in_flight = Some(token.clone());
        start(&mut inner.state);
        self.publish(&inner.state);

        Ticket {
            generation: inner.generation,
            token,
        }
    }

    /// Cancel the active request without starting another.
    ///
    /// `reset` receives whether a request was actually cancelled. Returns the same flag.
    pub fn cancel(&self, reset: impl FnOnce(&mut T, bool)) -> bool {
        let mut inner = self.lock();
        let cancelled = match inner.in_flight.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        };
        inner.generation += 1;
        reset(&mut inner.state, cancelled);
        self.publish(&inner.state);
        cancelled
    }

    /// Apply a finished request's outcome. A no-op returning `false` when the
    /// ticket has been superseded or cancelled.
    pub fn settle(&self, ticket: &Ticket, finish: impl FnOnce(&mut T)) -> bool {
        let mut inner = self.lock();
        if inner.generation != ticket.generation || ticket.is_cancelled() {
            return false;
        }
        inner.in_flight = None;
        finish(&mut inner.state);
        self.publish(&inner.state);
        true
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.lock().generation == ticket.generation && !ticket.is_cancelled()
    }

    pub fn in_flight(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    pub fn snapshot(&self) -> T {
        self.lock().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}
