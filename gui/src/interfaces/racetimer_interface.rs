use crate::core::race_board::RaceBoard;
use flume::Receiver;
use racetimer::interfaces::session_events::SessionEvent;

#[derive(Debug)]
pub struct RacetimerInterface {
    pub rx: Receiver<SessionEvent>,
    pub race_board: RaceBoard,
}

impl RacetimerInterface {
    /// update applies all pending session events (in order) to the race board and returns them
    /// for further handling, e.g. audio cues and result export.
    pub fn update(&mut self) -> Vec<SessionEvent> {
        let events: Vec<SessionEvent> = self.rx.try_iter().collect();

        for event in events.iter() {
            self.race_board.apply_event(event);
        }

        events
    }
}
