//! Pointer input hand-off.
//!
//! The platform mouse hook runs on its own thread and only ever enqueues;
//! the tick thread drains the queue at the top of each tick and owns all
//! engine mutation from there. The engine requires samples ordered by
//! timestamp, so the adapter clamps any non-monotonic hardware timestamp to
//! the last seen value instead of propagating it.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use tracing::{trace, warn};

use glint_core::PointerSample;

/// Creates a bounded hook-thread → tick-thread pointer channel.
#[must_use]
pub fn pointer_channel(capacity: usize) -> (PointerSender, PointerInputAdapter) {
    let (tx, rx) = bounded(capacity.max(1));
    (
        PointerSender { tx },
        PointerInputAdapter {
            rx,
            last_timestamp: f64::NEG_INFINITY,
            disconnected: false,
        },
    )
}

/// Producer handle for the platform hook thread.
#[derive(Debug, Clone)]
pub struct PointerSender {
    tx: Sender<PointerSample>,
}

impl PointerSender {
    /// Enqueues a sample without blocking.
    ///
    /// Returns `false` if the sample was dropped: queue full (the consumer
    /// is falling behind and losing pointer samples is harmless) or consumer
    /// gone.
    pub fn send(&self, sample: PointerSample) -> bool {
        match self.tx.try_send(sample) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("pointer queue full, sample dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Consumer side, drained once per tick on the tick thread.
#[derive(Debug)]
pub struct PointerInputAdapter {
    rx: Receiver<PointerSample>,
    last_timestamp: f64,
    disconnected: bool,
}

impl PointerInputAdapter {
    /// Drains all queued samples, in arrival order, with timestamps forced
    /// non-decreasing.
    pub fn drain(&mut self) -> Vec<PointerSample> {
        let mut samples = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(mut sample) => {
                    if sample.timestamp < self.last_timestamp {
                        warn!(
                            got = sample.timestamp,
                            last = self.last_timestamp,
                            "out-of-order pointer timestamp clamped"
                        );
                        sample.timestamp = self.last_timestamp;
                    } else {
                        self.last_timestamp = sample.timestamp;
                    }
                    samples.push(sample);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        warn!("pointer source disconnected; effects will drain naturally");
                        self.disconnected = true;
                    }
                    break;
                }
            }
        }
        samples
    }

    /// Whether the producer side is gone. Existing effects keep aging out.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn sample(ts: f64) -> PointerSample {
        PointerSample::new(Vec2::new(1.0, 2.0), true, ts)
    }

    #[test]
    fn test_drain_preserves_arrival_order() {
        let (tx, mut rx) = pointer_channel(8);
        assert!(tx.send(sample(0.1)));
        assert!(tx.send(sample(0.2)));
        assert!(tx.send(sample(0.3)));
        let drained = rx.drain();
        let stamps: Vec<f64> = drained.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, vec![0.1, 0.2, 0.3]);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn test_out_of_order_timestamps_are_clamped() {
        let (tx, mut rx) = pointer_channel(8);
        tx.send(sample(0.5));
        tx.send(sample(0.3));
        tx.send(sample(0.7));
        let stamps: Vec<f64> = rx.drain().iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, vec![0.5, 0.5, 0.7]);
    }

    #[test]
    fn test_full_queue_drops_sample() {
        let (tx, mut rx) = pointer_channel(1);
        assert!(tx.send(sample(0.1)));
        assert!(!tx.send(sample(0.2)));
        assert_eq!(rx.drain().len(), 1);
    }

    #[test]
    fn test_disconnect_is_detected_after_drain() {
        let (tx, mut rx) = pointer_channel(4);
        tx.send(sample(0.1));
        drop(tx);
        assert_eq!(rx.drain().len(), 1);
        assert!(rx.is_disconnected());
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn test_send_from_another_thread() {
        let (tx, mut rx) = pointer_channel(64);
        let handle = std::thread::spawn(move || {
            for i in 0..10 {
                tx.send(sample(f64::from(i) * 0.01));
            }
        });
        handle.join().unwrap();
        assert_eq!(rx.drain().len(), 10);
    }
}
