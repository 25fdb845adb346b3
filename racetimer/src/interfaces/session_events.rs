use crate::core::attempt::CompletedAttempt;
use crate::core::lap::LapDuration;

/// SessionEvent contains the side effects of the race session statemachine. Display and audio are
/// handled by whoever consumes the event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started {
        driver_id: String,
        heat_no: u32,
        target_lap_count: u32,
    },
    Countdown(u32),
    Go,
    Lap {
        lap: LapDuration,
        lap_no: u32,
        target_lap_count: u32,
        is_new_best: bool,
    },
    Finish(CompletedAttempt),
    Aborted {
        driver_id: String,
    },
}

/// Audio cue kinds (one sound per kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    Lap,
    Best,
    Finish,
    Countdown,
}

impl SessionEvent {
    /// cue returns the audio cue belonging to the event, if there is any. The start signal uses the
    /// same cue as a new best lap.
    pub fn cue(&self) -> Option<CueKind> {
        match self {
            SessionEvent::Countdown(_) => Some(CueKind::Countdown),
            SessionEvent::Go => Some(CueKind::Best),
            SessionEvent::Lap { is_new_best, .. } => {
                if *is_new_best {
                    Some(CueKind::Best)
                } else {
                    Some(CueKind::Lap)
                }
            }
            SessionEvent::Finish(_) => Some(CueKind::Finish),
            SessionEvent::Started { .. } | SessionEvent::Aborted { .. } => None,
        }
    }
}
