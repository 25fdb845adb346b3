use crate::core::attempt::{Attempt, CompletedAttempt, Phase};
use crate::core::error::CommandError;
use crate::core::lap::LapDuration;
use crate::interfaces::session_events::SessionEvent;
use flume::Sender;

/// The RaceSession contains the statemachine of a single attempt and emits the according side
/// effects into the event stream.
///
/// Possible statemachine phases:
/// * `Idle` -> no attempt was started yet
/// * `CountingDown(n)` -> n countdown ticks are left before the start signal
/// * `Running` -> laps are applied to the attempt
/// * `Finished` -> target lap count was reached, the attempt was handed off
/// * `Aborted` -> attempt was cancelled during the countdown or while running and discarded
///
/// At most one attempt can be in `CountingDown` or `Running` at any time. The session is inert in
/// `Finished` and `Aborted` until the next attempt is started.
#[derive(Debug)]
pub struct RaceSession {
    countdown_ticks: u32,
    phase: Phase,
    attempt: Option<Attempt>,
    tx: Sender<SessionEvent>,
}

impl RaceSession {
    pub fn new(countdown_ticks: u32, tx: Sender<SessionEvent>) -> RaceSession {
        RaceSession {
            countdown_ticks,
            phase: Phase::Idle,
            attempt: None,
            tx,
        }
    }

    pub fn get_phase(&self) -> Phase {
        self.phase
    }

    /// The method returns the attempt in progress (None when idle, finished or aborted).
    pub fn get_attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    /// is_active returns true while an attempt is counting down or running.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::CountingDown(_) | Phase::Running)
    }

    /// start creates a new attempt and enters the countdown. The active attempt is left untouched
    /// if there is one.
    pub fn start(
        &mut self,
        driver_id: &str,
        target_lap_count: u32,
        heat_no: u32,
    ) -> Result<(), CommandError> {
        if let Some(attempt) = self.attempt.as_ref().filter(|_| self.is_active()) {
            return Err(CommandError::AttemptAlreadyActive {
                driver_id: attempt.driver_id.to_owned(),
            });
        }
        if target_lap_count == 0 {
            return Err(CommandError::InvalidLapCount(0));
        }

        self.attempt = Some(Attempt::new(driver_id, heat_no, target_lap_count));
        self.phase = Phase::CountingDown(self.countdown_ticks);

        log::info!(
            "Attempt started: driver {}, heat {}, {} laps",
            driver_id,
            heat_no,
            target_lap_count
        );
        self.emit(SessionEvent::Started {
            driver_id: driver_id.to_owned(),
            heat_no,
            target_lap_count,
        });

        Ok(())
    }

    /// countdown_tick must be called once per countdown interval. It counts down and gives the
    /// start signal once the countdown reached zero. Outside of the countdown it does nothing.
    pub fn countdown_tick(&mut self) {
        match self.phase {
            Phase::CountingDown(0) => {
                self.phase = Phase::Running;
                self.emit(SessionEvent::Go);
            }
            Phase::CountingDown(n) => {
                self.emit(SessionEvent::Countdown(n));
                self.phase = Phase::CountingDown(n - 1);
            }
            _ => {}
        }
    }

    /// apply_lap records a lap of the running attempt. If the target lap count is reached
    /// thereby, the session finishes and returns the completed attempt. Laps that arrive in any
    /// other phase are ignored.
    pub fn apply_lap(&mut self, lap: LapDuration) -> Option<CompletedAttempt> {
        if self.phase != Phase::Running {
            log::debug!("Ignored lap {} in phase {:?}", lap, self.phase);
            return None;
        }

        let attempt = self.attempt.as_mut()?;
        let is_new_best = attempt.record_lap(lap);
        let lap_no = attempt.get_no_laps();
        let target_lap_count = attempt.target_lap_count;
        let complete = attempt.is_complete();

        self.emit(SessionEvent::Lap {
            lap,
            lap_no,
            target_lap_count,
            is_new_best,
        });

        if !complete {
            return None;
        }

        // FINISH ----------------------------------------------------------------------------------
        let completed = self.attempt.take()?.into_completed();
        self.phase = Phase::Finished;

        log::info!(
            "Attempt finished: driver {}, heat {}, best lap {}",
            completed.driver_id,
            completed.heat_no,
            completed
                .best_lap
                .map_or_else(|| String::from("-"), |x| x.to_string())
        );
        self.emit(SessionEvent::Finish(completed.to_owned()));

        Some(completed)
    }

    /// cancel discards the attempt if it is counting down or running. It returns false if there
    /// was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }

        let driver_id = match self.attempt.take() {
            Some(attempt) => attempt.driver_id,
            None => String::new(),
        };
        self.phase = Phase::Aborted;

        log::info!("Attempt of driver {} aborted", driver_id);
        self.emit(SessionEvent::Aborted { driver_id });

        true
    }

    fn emit(&self, event: SessionEvent) {
        // nobody listening is fine, e.g. in headless operation without audio cues
        if self.tx.send(event).is_err() {
            log::trace!("No subscriber for session events");
        }
    }
}
