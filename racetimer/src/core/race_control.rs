use crate::core::attempt::{Attempt, CompletedAttempt, Phase};
use crate::core::channel::LapReceiver;
use crate::core::error::CommandError;
use crate::core::registry::Registry;
use crate::core::session::RaceSession;
use crate::core::ticker::Ticker;
use crate::interfaces::session_events::SessionEvent;
use flume::Sender;
use std::convert::TryFrom;
use std::time::{Duration, Instant};

/// * `countdown_ticks` - Number of countdown ticks before the start signal
/// * `countdown_interval` - Time between two countdown ticks
/// * `poll_interval` - Time between two drains of the lap channel
#[derive(Debug, Clone)]
pub struct TimingPars {
    pub countdown_ticks: u32,
    pub countdown_interval: Duration,
    pub poll_interval: Duration,
}

impl Default for TimingPars {
    fn default() -> Self {
        TimingPars {
            countdown_ticks: 3,
            countdown_interval: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// RaceControl is the single owner of the race session, the registry and the consumer side of the
/// lap channel. It accepts the user commands and advances the session when update() is called on
/// a fixed cadence from the session/UI context.
#[derive(Debug)]
pub struct RaceControl {
    session: RaceSession,
    registry: Registry,
    laps: LapReceiver,
    countdown_ticker: Ticker,
    poll_ticker: Ticker,
}

impl RaceControl {
    pub fn new(
        timing_pars: &TimingPars,
        target_lap_count: u32,
        laps: LapReceiver,
        tx: Sender<SessionEvent>,
    ) -> RaceControl {
        RaceControl {
            session: RaceSession::new(timing_pars.countdown_ticks, tx),
            registry: Registry::new(target_lap_count),
            laps,
            countdown_ticker: Ticker::new(timing_pars.countdown_interval),
            poll_ticker: Ticker::new(timing_pars.poll_interval),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // COMMANDS ------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn start_attempt(
        &mut self,
        driver_id: &str,
        target_lap_count: i64,
    ) -> Result<(), CommandError> {
        if let Some(attempt) = self.get_attempt().filter(|_| self.session.is_active()) {
            return Err(CommandError::AttemptAlreadyActive {
                driver_id: attempt.driver_id.to_owned(),
            });
        }

        let target_lap_count = u32::try_from(target_lap_count)
            .ok()
            .filter(|&x| x > 0)
            .ok_or(CommandError::InvalidLapCount(target_lap_count))?;

        let heat_no = self.registry.begin_attempt(driver_id)?;

        if let Err(e) = self.session.start(driver_id, target_lap_count, heat_no) {
            self.registry.end_attempt();
            return Err(e);
        }

        self.countdown_ticker.reset();
        Ok(())
    }

    /// cancel_attempt aborts the active attempt. It returns false if no attempt was active.
    pub fn cancel_attempt(&mut self) -> bool {
        let cancelled = self.session.cancel();

        if cancelled {
            self.registry.end_attempt();
        }

        cancelled
    }

    pub fn register_driver(&mut self, name: &str) -> Result<(), CommandError> {
        self.registry.register_driver(name)
    }

    pub fn set_target_laps(&mut self, target_lap_count: i64) -> Result<(), CommandError> {
        self.registry.set_target_laps(target_lap_count)
    }

    pub fn advance_heat(&mut self) -> Result<u32, CommandError> {
        self.registry.advance_heat()
    }

    // ---------------------------------------------------------------------------------------------
    // SCHEDULED STEP ------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// update executes one "drain and advance" step:
    /// 1. Give a countdown tick if the countdown is active and the tick is due.
    /// 2. Drain the lap channel if the attempt is running and the poll is due, and apply the laps.
    /// Laps stay queued in the channel in every other phase.
    /// 3. Record the attempt in the registry if it finished in this step and return it.
    pub fn update(&mut self, now: Instant) -> Option<CompletedAttempt> {
        if matches!(self.session.get_phase(), Phase::CountingDown(_))
            && self.countdown_ticker.fire(now)
        {
            self.session.countdown_tick();

            if self.session.get_phase() == Phase::Running {
                self.poll_ticker.reset();
            }
        }

        if self.session.get_phase() != Phase::Running || !self.poll_ticker.fire(now) {
            return None;
        }

        let mut completed = None;

        for lap in self.laps.drain() {
            // the attempt reached its target earlier in this drain
            if self.session.get_phase() != Phase::Running {
                log::debug!("Discarded surplus lap {}", lap);
                continue;
            }

            if let Some(attempt) = self.session.apply_lap(lap) {
                self.registry.record_completed_attempt(
                    &attempt.driver_id,
                    attempt.heat_no,
                    attempt.laps.to_owned(),
                );
                completed = Some(attempt);
            }
        }

        completed
    }

    // ---------------------------------------------------------------------------------------------
    // GETTERS -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn get_phase(&self) -> Phase {
        self.session.get_phase()
    }

    pub fn get_attempt(&self) -> Option<&Attempt> {
        self.session.get_attempt()
    }

    pub fn is_attempt_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn get_registry(&self) -> &Registry {
        &self.registry
    }

    pub fn get_poll_interval(&self) -> Duration {
        self.poll_ticker.get_interval()
    }

    /// is_link_closed returns true if the pulse source is gone and no lap is pending anymore.
    pub fn is_link_closed(&self) -> bool {
        self.laps.is_closed()
    }
}
