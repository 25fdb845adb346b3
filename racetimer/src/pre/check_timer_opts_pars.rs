use crate::pre::read_timer_pars::TimerPars;
use crate::pre::timer_opts::TimerOpts;
use anyhow::Context;
use helpers::general::InputValueError;

/// check_timer_opts_pars assures that the inserted options and parameters are within reasonable
/// limits and raises an error if not.
pub fn check_timer_opts_pars(timer_opts: &TimerOpts, timer_pars: &TimerPars) -> anyhow::Result<()> {
    // PART 1: TIMER OPTIONS
    if timer_opts.baud == 0 {
        return Err(InputValueError).context("baud must be greater than zero!");
    }

    if timer_opts.gui && timer_opts.monitor {
        return Err(InputValueError).context("gui and monitor cannot be activated together!");
    }

    if !timer_opts.gui && !timer_opts.monitor && timer_opts.driver.is_none() {
        return Err(InputValueError)
            .context("A driver must be set if neither gui nor monitor is activated!");
    }

    if timer_opts.monitor && timer_opts.stdin {
        return Err(InputValueError).context("monitor requires the serial link, not stdin!");
    }

    // PART 2: TIMER PARAMETERS
    if !(1 <= timer_pars.target_laps && timer_pars.target_laps <= 999) {
        return Err(InputValueError).context(format!(
            "target_laps is {}, which is not within the reasonable range of [1, 999]!",
            timer_pars.target_laps
        ));
    }

    if timer_pars.countdown_ticks > 10 {
        return Err(InputValueError).context(format!(
            "countdown_ticks is {}, which is not within the reasonable range of [0, 10]!",
            timer_pars.countdown_ticks
        ));
    }

    if !(100 <= timer_pars.countdown_interval_ms && timer_pars.countdown_interval_ms <= 5000) {
        return Err(InputValueError).context(format!(
            "countdown_interval_ms is {}ms, which is not within the reasonable range of \
            [100, 5000]ms!",
            timer_pars.countdown_interval_ms
        ));
    }

    if !(1 <= timer_pars.poll_interval_ms && timer_pars.poll_interval_ms <= 1000) {
        return Err(InputValueError).context(format!(
            "poll_interval_ms is {}ms, which is not within the reasonable range of [1, 1000]ms!",
            timer_pars.poll_interval_ms
        ));
    }

    if !(10 <= timer_pars.read_timeout_ms && timer_pars.read_timeout_ms <= 10000) {
        return Err(InputValueError).context(format!(
            "read_timeout_ms is {}ms, which is not within the reasonable range of [10, 10000]ms!",
            timer_pars.read_timeout_ms
        ));
    }

    if !(10 <= timer_pars.reconnect_interval_ms && timer_pars.reconnect_interval_ms <= 60000) {
        return Err(InputValueError).context(format!(
            "reconnect_interval_ms is {}ms, which is not within the reasonable range of \
            [10, 60000]ms!",
            timer_pars.reconnect_interval_ms
        ));
    }

    if timer_pars.drivers.iter().any(|name| name.trim().is_empty()) {
        return Err(InputValueError).context("Driver names must not be empty!");
    }

    Ok(())
}
