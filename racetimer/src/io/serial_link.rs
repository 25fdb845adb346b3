use crate::core::channel::LapSender;
use crate::core::lap::{parse_raw_pulse, RawPulse};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, sleep, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// * `port` - Serial port name, e.g. COM3 or /dev/ttyUSB0
/// * `baud` - (1/s) Symbol rate
/// * `read_timeout` - Bound of a single blocking read (also bounds the stop latency)
/// * `reconnect_interval` - Wait time between two attempts to reopen a lost link
#[derive(Debug, Clone)]
pub struct LinkPars {
    pub port: String,
    pub baud: u32,
    pub read_timeout: Duration,
    pub reconnect_interval: Duration,
}

#[derive(Error, Debug)]
pub enum LinkError {
    /// The hardware connection could not be opened. Not fatal, the timer keeps running without
    /// live pulses.
    #[error("serial link {port} ({baud} baud) is unavailable: {reason}")]
    LinkUnavailable {
        port: String,
        baud: u32,
        reason: String,
    },
}

/// open_serial opens the serial port with the configured rate and read timeout.
pub fn open_serial(link_pars: &LinkPars) -> Result<Box<dyn serialport::SerialPort>, LinkError> {
    serialport::new(link_pars.port.as_str(), link_pars.baud)
        .timeout(link_pars.read_timeout)
        .open()
        .map_err(|e| LinkError::LinkUnavailable {
            port: link_pars.port.to_owned(),
            baud: link_pars.baud,
            reason: e.to_string(),
        })
}

// -------------------------------------------------------------------------------------------------
// LINE READER -------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A non-empty, trimmed line.
    Line(String),
    /// The read timed out without a complete line.
    Idle,
    /// End of input.
    Closed,
}

/// LineReader splits a byte stream into trimmed text lines. Partial lines survive read timeouts
/// and bytes that are not valid UTF-8 are dropped.
pub struct LineReader<R: Read> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub fn new(source: R) -> LineReader<R> {
        LineReader {
            reader: BufReader::new(source),
            buf: Vec::with_capacity(64),
        }
    }

    /// read_line blocks until a non-empty line is available, the read times out or the input
    /// ends. Empty lines are skipped.
    pub fn read_line(&mut self) -> io::Result<ReadOutcome> {
        loop {
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    // a last line without terminating newline is still a line
                    if self.buf.is_empty() {
                        return Ok(ReadOutcome::Closed);
                    }
                }
                Ok(_) => {
                    if self.buf.last() != Some(&b'\n') {
                        continue;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(ReadOutcome::Idle),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(ReadOutcome::Idle),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            let line = decode_line(&self.buf);
            self.buf.clear();

            if !line.is_empty() {
                return Ok(ReadOutcome::Line(line));
            }
        }
    }
}

/// decode_line converts the raw bytes into a trimmed string and drops undecodable bytes.
fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect::<String>()
        .trim()
        .to_owned()
}

// -------------------------------------------------------------------------------------------------
// PULSE SOURCE THREAD -----------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------

#[derive(Debug)]
enum ForwardEnd {
    Stopped,
    ConsumerGone,
    Closed,
    Failed(io::Error),
}

/// forward_lines reads lines until stopped or until the input ends and forwards every valid lap to
/// the channel. Rejected pulses are dropped.
fn forward_lines<R: Read>(
    reader: &mut LineReader<R>,
    tx: &LapSender,
    stop: &AtomicBool,
) -> ForwardEnd {
    while !stop.load(Ordering::Relaxed) {
        match reader.read_line() {
            Ok(ReadOutcome::Line(line)) => {
                if let Ok(lap) = parse_raw_pulse(&RawPulse::new(line)) {
                    if !tx.send(lap) {
                        return ForwardEnd::ConsumerGone;
                    }
                }
            }
            Ok(ReadOutcome::Idle) => {}
            Ok(ReadOutcome::Closed) => return ForwardEnd::Closed,
            Err(e) => return ForwardEnd::Failed(e),
        }
    }
    ForwardEnd::Stopped
}

/// PulseSourceHandle belongs to a running pulse source thread. Stopping is best effort: a blocking
/// read in progress completes or times out before the thread exits.
#[derive(Debug)]
pub struct PulseSourceHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl PulseSourceHandle {
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// stop requests the thread to stop and waits for it.
    pub fn stop(self) {
        self.request_stop();
        self.join();
    }

    /// join waits for the thread to end on its own, e.g. at the end of the input.
    pub fn join(self) {
        if self.thread.join().is_err() {
            log::error!("Pulse source thread panicked");
        }
    }
}

/// spawn_serial_source opens the serial link and starts the reader thread on it. If the link is
/// lost later on, the thread keeps trying to reopen it until it is stopped. Returns
/// LinkUnavailable if the link cannot be opened initially.
pub fn spawn_serial_source(
    link_pars: &LinkPars,
    tx: LapSender,
) -> Result<PulseSourceHandle, LinkError> {
    let port = open_serial(link_pars)?;
    log::info!(
        "Opened serial link {} ({} baud)",
        link_pars.port,
        link_pars.baud
    );

    let link_pars = link_pars.to_owned();
    let stop = Arc::new(AtomicBool::new(false));
    let stop_thread = Arc::clone(&stop);

    let thread = thread::spawn(move || {
        let mut port = Some(port);

        while !stop_thread.load(Ordering::Relaxed) {
            let cur_port = match port.take() {
                Some(x) => x,
                None => match open_serial(&link_pars) {
                    Ok(x) => {
                        log::info!("Reopened serial link {}", link_pars.port);
                        x
                    }
                    Err(e) => {
                        log::debug!("{}", e);
                        sleep(link_pars.reconnect_interval);
                        continue;
                    }
                },
            };

            let mut reader = LineReader::new(cur_port);

            match forward_lines(&mut reader, &tx, &stop_thread) {
                ForwardEnd::Stopped | ForwardEnd::ConsumerGone => break,
                ForwardEnd::Closed => {
                    log::warn!("Serial link {} closed, reconnecting", link_pars.port)
                }
                ForwardEnd::Failed(e) => {
                    log::warn!("Serial link {} lost ({}), reconnecting", link_pars.port, e)
                }
            }
            sleep(link_pars.reconnect_interval);
        }
    });

    Ok(PulseSourceHandle { stop, thread })
}

/// spawn_reader_source starts the reader thread on an arbitrary byte source, e.g. standard input.
/// The end of the input closes the producer side of the lap channel.
pub fn spawn_reader_source<R: Read + Send + 'static>(
    source: R,
    tx: LapSender,
) -> PulseSourceHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_thread = Arc::clone(&stop);

    let thread = thread::spawn(move || {
        let mut reader = LineReader::new(source);

        if let ForwardEnd::Failed(e) = forward_lines(&mut reader, &tx, &stop_thread) {
            log::warn!("Pulse source failed: {}", e);
        }
        log::info!("Pulse source closed");
    });

    PulseSourceHandle { stop, thread }
}

/// monitor_link prints every raw line received on the link as "RAW: <line>" until the input ends.
pub fn monitor_link<R: Read, W: Write>(source: R, out: &mut W) -> io::Result<()> {
    let mut reader = LineReader::new(source);

    loop {
        match reader.read_line()? {
            ReadOutcome::Line(line) => writeln!(out, "RAW: {}", line)?,
            ReadOutcome::Idle => {}
            ReadOutcome::Closed => return Ok(()),
        }
    }
}
