use crate::general::{argsort, SortOrder};

/// Placeholder shown instead of a lap time as long as no lap was recorded.
pub const NO_LAPTIME: &str = "---.---";

/// fmt_laptime formats a lap time in seconds with millisecond resolution, e.g. 12.345.
pub fn fmt_laptime(laptime: f64) -> String {
    format!("{:.3}", laptime)
}

/// fmt_opt_laptime formats an optional lap time and falls back to the placeholder.
pub fn fmt_opt_laptime(laptime: Option<f64>) -> String {
    match laptime {
        Some(x) => fmt_laptime(x),
        None => String::from(NO_LAPTIME),
    }
}

/// ranked_laptimes returns the lap times sorted from best to worst as (lap number, lap time)
/// pairs. Lap numbers start at 1 and refer to the arrival order.
pub fn ranked_laptimes(laptimes: &[f64]) -> Vec<(usize, f64)> {
    argsort(laptimes, SortOrder::Ascending)
        .into_iter()
        .map(|idx| (idx + 1, laptimes[idx]))
        .collect()
}
