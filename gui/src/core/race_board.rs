use helpers::laptime::{fmt_laptime, fmt_opt_laptime, ranked_laptimes};
use racetimer::interfaces::session_events::SessionEvent;
use std::fmt::Write;

/// RaceBoard contains everything that is shown during an attempt. It is updated solely from the
/// session events.
#[derive(Debug, Clone, Default)]
pub struct RaceBoard {
    pub visible: bool,
    pub finished: bool,
    pub heat_no: u32,
    pub driver_id: String,
    pub target_lap_count: u32,
    pub laptimes: Vec<f64>,
    pub best_lap: Option<f64>,
    pub main_text: String,
}

impl RaceBoard {
    pub fn apply_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started {
                driver_id,
                heat_no,
                target_lap_count,
            } => {
                *self = RaceBoard {
                    visible: true,
                    heat_no: *heat_no,
                    driver_id: driver_id.to_owned(),
                    target_lap_count: *target_lap_count,
                    ..Default::default()
                };
            }
            SessionEvent::Countdown(n) => self.main_text = n.to_string(),
            SessionEvent::Go => self.main_text = String::from("GO!"),
            SessionEvent::Lap { lap, is_new_best, .. } => {
                self.laptimes.push(lap.as_secs_f64());
                if *is_new_best {
                    self.best_lap = Some(lap.as_secs_f64());
                }
                self.main_text = format!("Last: {}", fmt_laptime(lap.as_secs_f64()));
            }
            SessionEvent::Finish(_) => self.finished = true,
            SessionEvent::Aborted { .. } => *self = Default::default(),
        }
    }

    pub fn get_laps_text(&self) -> String {
        format!("Laps: {} / {}", self.laptimes.len(), self.target_lap_count)
    }

    pub fn get_best_text(&self) -> String {
        format!("Best: {}", fmt_opt_laptime(self.best_lap))
    }

    /// get_ranked_text returns the lap times sorted from best to worst, one per line.
    pub fn get_ranked_text(&self) -> String {
        let mut text = String::new();

        for (i, (_lap_no, laptime)) in ranked_laptimes(&self.laptimes).iter().enumerate() {
            let _ = writeln!(&mut text, "{}. {}", i + 1, fmt_laptime(*laptime));
        }

        text
    }
}
