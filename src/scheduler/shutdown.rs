//! Shutdown Signal
//!
//! One trigger fans out to any number of [`Shutdown`] receivers. Dropping the
//! trigger without firing it also counts as shutdown: nobody is left to keep
//! the process alive.

use tokio::sync::watch;

/// Creates a connected trigger/receiver pair.
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

// == Trigger ==
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Fires the signal. Idempotent.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }
}

// == Receiver ==
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once the signal fires or the trigger is dropped.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};

    #[tokio::test]
    async fn test_trigger_reaches_every_receiver() {
        let (trigger, shutdown) = shutdown_channel();
        let other = trigger.subscribe();
        let cloned = shutdown.clone();

        assert!(!shutdown.is_cancelled());
        trigger.trigger();

        shutdown.cancelled().await;
        other.cancelled().await;
        assert!(cloned.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_trigger_cancels() {
        let (trigger, shutdown) = shutdown_channel();
        drop(trigger);

        assert!(shutdown.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), shutdown.cancelled())
            .await
            .unwrap();
    }

    #[test]
    fn test_cancelled_pends_until_triggered() {
        let (trigger, shutdown) = shutdown_channel();
        let mut cancelled = task::spawn(shutdown.cancelled());

        assert_pending!(cancelled.poll());

        trigger.trigger();
        assert!(cancelled.is_woken());
        assert_ready!(cancelled.poll());
    }
}
