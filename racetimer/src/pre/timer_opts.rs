use clap::Parser;
use std::path::PathBuf;

#[cfg(windows)]
const DEFAULT_PORT: &str = "COM3";
#[cfg(not(windows))]
const DEFAULT_PORT: &str = "/dev/ttyUSB0";

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    author = "Alexander Heilmeier <alexander.heilmeier@tum.de>",
    name = "RC-LAPS",
    about = "A lap timer for remote-control vehicles written in Rust"
)]
pub struct TimerOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Activate GUI (driver menu and race board)
    #[clap(short, long, conflicts_with = "monitor")]
    pub gui: bool,

    /// Print raw lines received on the serial link instead of timing laps
    #[clap(short, long)]
    pub monitor: bool,

    /// Read lap pulses from standard input instead of the serial link
    #[clap(long)]
    pub stdin: bool,

    /// Write the heat results as CSV file as well
    #[clap(long)]
    pub csv: bool,

    /// Ring the terminal bell for audio cues
    #[clap(long)]
    pub bell: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set serial port of the lap sensor
    #[clap(short, long, default_value = DEFAULT_PORT)]
    pub port: String,

    /// Set baud rate of the serial link
    #[clap(short, long, default_value = "115200")]
    pub baud: u32,

    /// Set path to the timer parameter file (JSON)
    #[clap(parse(from_os_str), long)]
    pub parfile_path: Option<PathBuf>,

    /// Set driver for a single attempt without GUI
    #[clap(long)]
    pub driver: Option<String>,

    /// Set number of laps per attempt, overrides the parameter file
    #[clap(short, long)]
    pub laps: Option<i64>,

    /// Set number of countdown ticks before the start, overrides the parameter file
    #[clap(short, long)]
    pub countdown: Option<u32>,

    /// Set directory the result files are written to
    #[clap(parse(from_os_str), short, long, default_value = ".")]
    pub results_dir: PathBuf,
}
