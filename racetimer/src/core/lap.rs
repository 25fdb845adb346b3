use std::cmp::Ordering;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// (ms) Pulses below this value are treated as sensor glitches.
pub const GLITCH_THRESHOLD_MS: u64 = 50;

/// RawPulse is a single line of text as received from the pulse source together with its arrival
/// time.
#[derive(Debug, Clone)]
pub struct RawPulse {
    pub line: String,
    pub t_arrival: Instant,
}

impl RawPulse {
    pub fn new(line: String) -> RawPulse {
        RawPulse {
            line,
            t_arrival: Instant::now(),
        }
    }
}

/// PulseRejection describes why a raw pulse did not become a lap duration. Both cases are expected
/// hardware noise and are never shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PulseRejection {
    /// MalformedPulse: the token is not a non-negative integer count of milliseconds.
    #[error("not a millisecond count: {token:?}")]
    NotNumeric { token: String },

    /// GlitchPulse: the value is below the glitch threshold.
    #[error("{ms}ms is below the glitch threshold of {}ms", GLITCH_THRESHOLD_MS)]
    BelowGlitchThreshold { ms: u64 },
}

/// LapDuration is a validated lap time in seconds. It can only be created from a millisecond
/// reading of at least GLITCH_THRESHOLD_MS, i.e. it is always >= 0.050s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapDuration(f64);

impl LapDuration {
    /// from_millis validates a millisecond reading and converts it into seconds.
    pub fn from_millis(ms: u64) -> Result<LapDuration, PulseRejection> {
        if ms < GLITCH_THRESHOLD_MS {
            return Err(PulseRejection::BelowGlitchThreshold { ms });
        }
        Ok(LapDuration(ms as f64 / 1000.0))
    }

    /// The method returns the lap time in seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }
}

impl PartialOrd for LapDuration {
    fn partial_cmp(&self, other: &LapDuration) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl fmt::Display for LapDuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// parse_pulse classifies a raw token (surrounding whitespace is ignored). Accepted tokens are
/// non-negative integer millisecond counts of at least GLITCH_THRESHOLD_MS.
pub fn parse_pulse(token: &str) -> Result<LapDuration, PulseRejection> {
    let token = token.trim();

    // a leading '+' would be accepted by u64::from_str, the hardware never sends one
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PulseRejection::NotNumeric {
            token: token.to_owned(),
        });
    }

    // digit strings that overflow u64 cannot be a plausible reading either
    let ms = token
        .parse::<u64>()
        .map_err(|_| PulseRejection::NotNumeric {
            token: token.to_owned(),
        })?;

    LapDuration::from_millis(ms)
}

/// parse_raw_pulse is parse_pulse applied to a RawPulse with trace/debug logging of the outcome.
pub fn parse_raw_pulse(pulse: &RawPulse) -> Result<LapDuration, PulseRejection> {
    log::trace!("raw pulse {:?}", pulse.line);

    let res = parse_pulse(&pulse.line);

    if let Err(ref rejection) = res {
        log::debug!("Discarded pulse: {}", rejection);
    }

    res
}
