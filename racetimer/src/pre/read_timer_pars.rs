use crate::core::race_control::TimingPars;
use crate::io::serial_link::LinkPars;
use crate::pre::timer_opts::TimerOpts;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;
use std::time::Duration;

/// * `drivers` - Drivers registered at startup
/// * `target_laps` - Number of laps per attempt
/// * `countdown_ticks` - Number of countdown ticks before the start signal
/// * `countdown_interval_ms` - (ms) Time between two countdown ticks
/// * `poll_interval_ms` - (ms) Time between two drains of the lap channel
/// * `read_timeout_ms` - (ms) Bound of a single blocking read on the serial link
/// * `reconnect_interval_ms` - (ms) Wait time between two attempts to reopen a lost link
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimerPars {
    pub drivers: Vec<String>,
    pub target_laps: i64,
    pub countdown_ticks: u32,
    pub countdown_interval_ms: u64,
    pub poll_interval_ms: u64,
    pub read_timeout_ms: u64,
    pub reconnect_interval_ms: u64,
}

impl Default for TimerPars {
    fn default() -> Self {
        TimerPars {
            drivers: vec![],
            target_laps: 5,
            countdown_ticks: 3,
            countdown_interval_ms: 1000,
            poll_interval_ms: 50,
            read_timeout_ms: 1000,
            reconnect_interval_ms: 1000,
        }
    }
}

impl TimerPars {
    /// apply_opts overrides the parameters with those set on the command line.
    pub fn apply_opts(&mut self, timer_opts: &TimerOpts) {
        if let Some(target_laps) = timer_opts.laps {
            self.target_laps = target_laps;
        }
        if let Some(countdown_ticks) = timer_opts.countdown {
            self.countdown_ticks = countdown_ticks;
        }
        if let Some(driver) = timer_opts.driver.as_ref() {
            if !self.drivers.contains(driver) {
                self.drivers.push(driver.to_owned());
            }
        }
    }

    pub fn get_timing_pars(&self) -> TimingPars {
        TimingPars {
            countdown_ticks: self.countdown_ticks,
            countdown_interval: Duration::from_millis(self.countdown_interval_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn get_link_pars(&self, timer_opts: &TimerOpts) -> LinkPars {
        LinkPars {
            port: timer_opts.port.to_owned(),
            baud: timer_opts.baud,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            reconnect_interval: Duration::from_millis(self.reconnect_interval_ms),
        }
    }
}

/// read_timer_pars reads the JSON file and decodes the JSON string into the timer parameters
/// struct. Missing fields keep their default values.
pub fn read_timer_pars(filepath: &Path) -> anyhow::Result<TimerPars> {
    // open file
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;

    // read and parse parameter file content
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}
