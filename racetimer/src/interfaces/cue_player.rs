use crate::interfaces::session_events::CueKind;
use std::io::Write;

/// CuePlayer is implemented by the audio collaborators that turn cues into sound.
pub trait CuePlayer {
    fn play(&mut self, cue: CueKind);
}

/// SilentCues only logs the cues.
#[derive(Debug, Default)]
pub struct SilentCues;

impl CuePlayer for SilentCues {
    fn play(&mut self, cue: CueKind) {
        log::debug!("Cue {:?}", cue);
    }
}

/// TerminalBell rings the terminal bell once per cue, twice for a finish.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn play(&mut self, cue: CueKind) {
        log::debug!("Cue {:?}", cue);

        let bells = match cue {
            CueKind::Finish => "\x07\x07",
            _ => "\x07",
        };

        let mut stdout = std::io::stdout();
        if stdout
            .write_all(bells.as_bytes())
            .and_then(|_| stdout.flush())
            .is_err()
        {
            log::trace!("Could not ring the terminal bell");
        }
    }
}
