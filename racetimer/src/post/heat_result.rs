use crate::core::registry::Registry;
use anyhow::Context;
use chrono::{DateTime, Local};
use helpers::general::argmin;
use helpers::laptime::fmt_laptime;
use serde::Serialize;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

/// DriverResult contains the laps of a driver within a heat in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverResult {
    pub name: String,
    pub laptimes: Vec<f64>,
}

impl DriverResult {
    /// The method returns the index of the best lap (first occurrence in case of equal times).
    pub fn get_best_lap_idx(&self) -> Option<usize> {
        argmin(&self.laptimes)
    }
}

#[derive(Debug, Serialize)]
struct CsvLapRow<'a> {
    driver: &'a str,
    lap: usize,
    lap_time_s: f64,
    is_best: bool,
}

/// HeatResult contains everything that is required to export the results of a heat.
#[derive(Debug, Clone)]
pub struct HeatResult {
    pub heat_no: u32,
    pub created: DateTime<Local>,
    pub driver_results: Vec<DriverResult>,
}

impl HeatResult {
    /// from_registry collects the results of all drivers with laps in the given heat (in
    /// registration order).
    pub fn from_registry(registry: &Registry, heat_no: u32) -> HeatResult {
        let driver_results = registry
            .get_drivers()
            .iter()
            .filter(|driver| !driver.get_laps(heat_no).is_empty())
            .map(|driver| DriverResult {
                name: driver.name.to_owned(),
                laptimes: driver
                    .get_laps(heat_no)
                    .iter()
                    .map(|lap| lap.as_secs_f64())
                    .collect(),
            })
            .collect();

        HeatResult {
            heat_no,
            created: Local::now(),
            driver_results,
        }
    }

    /// to_text creates the content of the text result file.
    pub fn to_text(&self) -> String {
        let mut text = String::new();

        // writing into a String cannot fail
        let _ = writeln!(&mut text, "Results for Heat {}", self.heat_no);
        let _ = writeln!(&mut text, "Date/Time: {}", self.created.to_rfc3339());
        let _ = writeln!(&mut text);

        for driver_result in self.driver_results.iter() {
            let best_lap_idx = match driver_result.get_best_lap_idx() {
                Some(x) => x,
                None => continue,
            };

            let _ = writeln!(&mut text, "Driver: {}", driver_result.name);
            let _ = writeln!(
                &mut text,
                "  Best lap: {}s",
                fmt_laptime(driver_result.laptimes[best_lap_idx])
            );
            let _ = writeln!(&mut text, "  Laps ({}):", driver_result.laptimes.len());

            for (i, laptime) in driver_result.laptimes.iter().enumerate() {
                let _ = writeln!(&mut text, "    {}. {}s", i + 1, fmt_laptime(*laptime));
            }
            let _ = writeln!(&mut text);
        }

        text
    }

    /// write_txt writes results_heat_<n>.txt into the given directory and returns its path.
    pub fn write_txt(&self, results_dir: &Path) -> anyhow::Result<PathBuf> {
        let filepath = results_dir.join(format!("results_heat_{}.txt", self.heat_no));

        fs::write(&filepath, self.to_text()).context(format!(
            "Failed to write result file {}!",
            filepath.display()
        ))?;

        Ok(filepath)
    }

    /// write_csv writes results_heat_<n>.csv (one row per lap) into the given directory and
    /// returns its path.
    pub fn write_csv(&self, results_dir: &Path) -> anyhow::Result<PathBuf> {
        let filepath = results_dir.join(format!("results_heat_{}.csv", self.heat_no));

        let mut wtr = csv::Writer::from_path(&filepath).context(format!(
            "Failed to create result file {}!",
            filepath.display()
        ))?;

        for driver_result in self.driver_results.iter() {
            let best_lap_idx = driver_result.get_best_lap_idx();

            for (i, laptime) in driver_result.laptimes.iter().enumerate() {
                wtr.serialize(CsvLapRow {
                    driver: &driver_result.name,
                    lap: i + 1,
                    lap_time_s: *laptime,
                    is_best: best_lap_idx == Some(i),
                })
                .context("Failed to serialize lap!")?;
            }
        }

        wtr.flush().context(format!(
            "Failed to write result file {}!",
            filepath.display()
        ))?;

        Ok(filepath)
    }
}

/// export_heat_results writes the result files of the given heat into the results directory and
/// returns the path of the text file.
pub fn export_heat_results(
    registry: &Registry,
    heat_no: u32,
    results_dir: &Path,
    write_csv: bool,
) -> anyhow::Result<PathBuf> {
    let heat_result = HeatResult::from_registry(registry, heat_no);
    let filepath = heat_result.write_txt(results_dir)?;

    if write_csv {
        heat_result.write_csv(results_dir)?;
    }

    log::info!("Results written to {}", filepath.display());
    Ok(filepath)
}
