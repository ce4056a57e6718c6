//! Operator shutdown requests
//!
//! Checked only between commands; an in-flight command is never cancelled.

use std::future::Future;
use std::pin::Pin;

/// A signal that resolves once the operator asked the flight to stop
pub struct Shutdown<'a> {
    signal: Pin<Box<dyn Future<Output = ()> + Send + 'a>>,
    fired: bool,
}

impl<'a> Shutdown<'a> {
    pub fn new(signal: impl Future<Output = ()> + Send + 'a) -> Self {
        Self {
            signal: Box::pin(signal),
            fired: false,
        }
    }

    /// A signal that never fires
    pub fn never() -> Self {
        Self::new(std::future::pending())
    }

    /// Wait for the signal; returns at once if it already fired
    ///
    /// Cancel safe.
    pub async fn wait(&mut self) {
        if !self.fired {
            self.signal.as_mut().await;
            self.fired = true;
        }
    }

    /// Whether the signal fired, without waiting
    pub async fn requested(&mut self) -> bool {
        tokio::select! {
            biased;
            _ = self.wait() => true,
            _ = std::future::ready(()) => false,
        }
    }
}

impl std::fmt::Debug for Shutdown<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shutdown").field("fired", &self.fired).finish()
    }
}
