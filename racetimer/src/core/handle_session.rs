use crate::core::attempt::CompletedAttempt;
use crate::core::race_control::RaceControl;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// handle_session runs a single attempt without GUI: it starts the attempt and calls the race
/// control's update step on the poll cadence until the attempt is finished or aborted. It returns
/// the completed attempt, or None if the attempt was aborted.
pub fn handle_session(
    race_control: &mut RaceControl,
    driver_id: &str,
    target_lap_count: i64,
) -> anyhow::Result<Option<CompletedAttempt>> {
    race_control.start_attempt(driver_id, target_lap_count)?;

    let poll_interval = race_control.get_poll_interval();

    loop {
        let t_start = Instant::now();

        if let Some(attempt) = race_control.update(t_start) {
            return Ok(Some(attempt));
        }

        if !race_control.is_attempt_active() {
            return Ok(None);
        }

        // nothing can arrive anymore once the pulse source is gone
        if race_control.is_link_closed() {
            log::warn!("Pulse source closed, aborting the attempt");
            race_control.cancel_attempt();
            return Ok(None);
        }

        // sleep until the next poll is due
        let t_sleep = poll_interval
            .checked_sub(t_start.elapsed())
            .unwrap_or(Duration::from_millis(0));

        if t_sleep > Duration::from_millis(0) {
            sleep(t_sleep);
        } else {
            log::warn!("Could not keep up with the poll interval!")
        }
    }
}
