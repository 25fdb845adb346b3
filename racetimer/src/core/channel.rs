use crate::core::lap::LapDuration;
use flume::{Receiver, Sender};

/// lap_channel creates the unbounded, order-preserving hand-off between the pulse source thread
/// (producer) and the session loop (consumer).
pub fn lap_channel() -> (LapSender, LapReceiver) {
    let (tx, rx) = flume::unbounded();
    (LapSender { tx }, LapReceiver { rx })
}

/// Producer side of the lap channel. Dropping it closes the channel for the consumer once all
/// pending laps were drained.
#[derive(Debug)]
pub struct LapSender {
    tx: Sender<LapDuration>,
}

impl LapSender {
    /// send hands a lap over to the consumer. It returns false if the consumer is gone, in which
    /// case the lap could not be delivered to anybody anyway.
    pub fn send(&self, lap: LapDuration) -> bool {
        self.tx.send(lap).is_ok()
    }
}

/// Consumer side of the lap channel.
#[derive(Debug)]
pub struct LapReceiver {
    rx: Receiver<LapDuration>,
}

impl LapReceiver {
    /// drain returns all laps that are currently in the channel (in production order) without
    /// blocking.
    pub fn drain(&self) -> Vec<LapDuration> {
        self.rx.try_iter().collect()
    }

    /// is_closed returns true if the producer is gone and no lap is pending anymore.
    pub fn is_closed(&self) -> bool {
        // no lap can arrive after the disconnect, so the order of both checks is safe
        self.rx.is_disconnected() && self.rx.is_empty()
    }
}
