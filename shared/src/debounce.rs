use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{self, Instant, Sleep};

/// Quiet period before typed search text reaches the listing query.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// Holds the latest value of a burst until no new value arrived for the
/// quiet period. Every [`Debouncer::push`] restarts the single timer.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet_period: Duration,
    pending: Option<T>,
    timer: Pin<Box<Sleep>>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
            timer: Box::pin(time::sleep(quiet_period)),
        }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some(value);
        self.timer
            .as_mut()
            .reset(Instant::now() + self.quiet_period);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value without waiting for the quiet period.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Resolves with the pending value once the quiet period elapsed.
    /// Never resolves while nothing is pending. Cancel safe.
    pub async fn settled(&mut self) -> T {
        loop {
            if self.pending.is_none() {
                future::pending::<()>().await;
            }
            self.timer.as_mut().await;
            if let Some(value) = self.pending.take() {
                return value;
            }
        }
    }
}
