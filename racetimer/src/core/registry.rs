use crate::core::error::CommandError;
use crate::core::lap::LapDuration;
use std::collections::HashMap;
use std::convert::TryFrom;

/// DriverRecord contains the lap history of a driver, separated by heat.
#[derive(Debug, Clone)]
pub struct DriverRecord {
    pub name: String,
    laps_by_heat: HashMap<u32, Vec<LapDuration>>,
}

impl DriverRecord {
    fn new(name: &str) -> DriverRecord {
        DriverRecord {
            name: name.to_owned(),
            laps_by_heat: HashMap::new(),
        }
    }

    /// The method returns the laps of the given heat in arrival order (empty if the driver did not
    /// complete an attempt in that heat).
    pub fn get_laps(&self, heat_no: u32) -> &[LapDuration] {
        self.laps_by_heat
            .get(&heat_no)
            .map_or(&[][..], |laps| laps.as_slice())
    }

    /// The method returns the best lap of the given heat. The first of several equal lap times is
    /// the best lap.
    pub fn get_best_lap(&self, heat_no: u32) -> Option<LapDuration> {
        self.get_laps(heat_no)
            .iter()
            .fold(None, |best: Option<LapDuration>, &lap| match best {
                Some(x) if x <= lap => Some(x),
                _ => Some(lap),
            })
    }
}

/// * `heat_no` - Number of the current heat (starts at 1)
/// * `target_lap_count` - Lap count used for new attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatState {
    pub heat_no: u32,
    pub target_lap_count: u32,
}

/// Standing is a single line of the results of a heat.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub name: String,
    pub best_lap: LapDuration,
    pub no_laps: usize,
}

/// The Registry holds all drivers (in registration order) with their lap histories and the heat
/// state. It also knows which driver is on track, so that heat changes can be rejected while an
/// attempt is in progress.
#[derive(Debug)]
pub struct Registry {
    drivers: Vec<DriverRecord>,
    heat_state: HeatState,
    active_driver: Option<String>,
}

impl Registry {
    pub fn new(target_lap_count: u32) -> Registry {
        Registry {
            drivers: vec![],
            heat_state: HeatState {
                heat_no: 1,
                target_lap_count,
            },
            active_driver: None,
        }
    }

    pub fn get_heat_state(&self) -> &HeatState {
        &self.heat_state
    }

    pub fn get_drivers(&self) -> &[DriverRecord] {
        &self.drivers
    }

    pub fn get_driver(&self, name: &str) -> Option<&DriverRecord> {
        self.drivers.iter().find(|driver| driver.name == name)
    }

    pub fn get_active_driver(&self) -> Option<&str> {
        self.active_driver.as_deref()
    }

    /// register_driver adds a driver with an empty history. Registering a known driver again does
    /// nothing.
    pub fn register_driver(&mut self, name: &str) -> Result<(), CommandError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(CommandError::EmptyDriverName);
        }

        if self.get_driver(name).is_none() {
            self.drivers.push(DriverRecord::new(name));
            log::info!("Registered driver {}", name);
        }

        Ok(())
    }

    /// set_target_laps sets the lap count for new attempts.
    pub fn set_target_laps(&mut self, target_lap_count: i64) -> Result<(), CommandError> {
        let target_lap_count = u32::try_from(target_lap_count)
            .ok()
            .filter(|&x| x > 0)
            .ok_or(CommandError::InvalidLapCount(target_lap_count))?;

        if self.active_driver.is_some() {
            return Err(CommandError::AttemptInProgress);
        }

        self.heat_state.target_lap_count = target_lap_count;
        Ok(())
    }

    /// advance_heat switches to the next heat, in which no driver has laps yet.
    pub fn advance_heat(&mut self) -> Result<u32, CommandError> {
        if self.active_driver.is_some() {
            return Err(CommandError::AttemptInProgress);
        }

        self.heat_state.heat_no += 1;

        for driver in self.drivers.iter_mut() {
            driver.laps_by_heat.remove(&self.heat_state.heat_no);
        }

        log::info!("Advanced to heat {}", self.heat_state.heat_no);
        Ok(self.heat_state.heat_no)
    }

    /// begin_attempt marks the driver as being on track and returns the current heat number.
    pub fn begin_attempt(&mut self, name: &str) -> Result<u32, CommandError> {
        if self.active_driver.is_some() {
            return Err(CommandError::AttemptInProgress);
        }
        if self.get_driver(name).is_none() {
            return Err(CommandError::UnknownDriver(name.to_owned()));
        }

        self.active_driver = Some(name.to_owned());
        Ok(self.heat_state.heat_no)
    }

    /// end_attempt releases the active driver without recording anything (aborted attempt).
    pub fn end_attempt(&mut self) {
        self.active_driver = None;
    }

    /// record_completed_attempt stores the laps of a completed attempt, replacing whatever the
    /// driver had in that heat before. Unknown drivers are registered on the fly.
    pub fn record_completed_attempt(&mut self, name: &str, heat_no: u32, laps: Vec<LapDuration>) {
        if self.active_driver.as_deref() == Some(name) {
            self.active_driver = None;
        }

        let idx = match self.drivers.iter().position(|driver| driver.name == name) {
            Some(idx) => idx,
            None => {
                self.drivers.push(DriverRecord::new(name));
                self.drivers.len() - 1
            }
        };

        self.drivers[idx].laps_by_heat.insert(heat_no, laps);
    }

    /// get_standings returns all drivers with laps in the given heat in registration order.
    pub fn get_standings(&self, heat_no: u32) -> Vec<Standing> {
        self.drivers
            .iter()
            .filter_map(|driver| {
                driver.get_best_lap(heat_no).map(|best_lap| Standing {
                    name: driver.name.to_owned(),
                    best_lap,
                    no_laps: driver.get_laps(heat_no).len(),
                })
            })
            .collect()
    }
}
