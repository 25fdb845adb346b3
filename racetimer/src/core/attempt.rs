use crate::core::lap::LapDuration;

/// Phase of the race session statemachine. `Finished` and `Aborted` are terminal for the
/// respective attempt, a new attempt can be started from `Idle`, `Finished` and `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    CountingDown(u32),
    Running,
    Finished,
    Aborted,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

/// Attempt is one driver's run over a given number of laps within one heat. The recorded laps are
/// kept in arrival order.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub driver_id: String,
    pub heat_no: u32,
    pub target_lap_count: u32,
    recorded_laps: Vec<LapDuration>,
    best_lap: Option<LapDuration>,
}

impl Attempt {
    pub fn new(driver_id: &str, heat_no: u32, target_lap_count: u32) -> Attempt {
        Attempt {
            driver_id: driver_id.to_owned(),
            heat_no,
            target_lap_count,
            recorded_laps: Vec::with_capacity(target_lap_count as usize),
            best_lap: None,
        }
    }

    /// record_lap appends the lap and returns true if it is a new best lap. Only a strictly
    /// faster lap replaces the best lap, i.e. the first occurrence of a lap time wins.
    pub fn record_lap(&mut self, lap: LapDuration) -> bool {
        self.recorded_laps.push(lap);

        let is_new_best = match self.best_lap {
            Some(best_lap) => lap < best_lap,
            None => true,
        };

        if is_new_best {
            self.best_lap = Some(lap);
        }

        is_new_best
    }

    pub fn recorded_laps(&self) -> &[LapDuration] {
        &self.recorded_laps
    }

    pub fn best_lap(&self) -> Option<LapDuration> {
        self.best_lap
    }

    pub fn get_no_laps(&self) -> u32 {
        self.recorded_laps.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.get_no_laps() >= self.target_lap_count
    }

    pub fn into_completed(self) -> CompletedAttempt {
        CompletedAttempt {
            driver_id: self.driver_id,
            heat_no: self.heat_no,
            laps: self.recorded_laps,
            best_lap: self.best_lap,
        }
    }
}

/// CompletedAttempt is what is left of an attempt after it finished: it is handed to the registry
/// and the result export.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedAttempt {
    pub driver_id: String,
    pub heat_no: u32,
    pub laps: Vec<LapDuration>,
    pub best_lap: Option<LapDuration>,
}
