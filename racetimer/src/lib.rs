pub mod core {
    pub mod attempt;
    pub mod channel;
    pub mod error;
    pub mod handle_session;
    pub mod lap;
    pub mod race_control;
    pub mod registry;
    pub mod session;
    pub mod ticker;
}

pub mod interfaces {
    pub mod cue_player;
    pub mod session_events;
}

pub mod io {
    pub mod serial_link;
}

pub mod post {
    pub mod heat_result;
}

pub mod pre {
    pub mod check_timer_opts_pars;
    pub mod read_timer_pars;
    pub mod timer_opts;
}



#[cfg(test)]
mod test_utils {
    use crate::core::lap::LapDuration;
    use crate::interfaces::session_events::SessionEvent;
    use flume::Receiver;

    pub fn lap(ms: u64) -> LapDuration {
        LapDuration::from_millis(ms).unwrap()
    }

    pub fn collect_events(rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
        rx.try_iter().collect()
    }
}

#[cfg(test)]
mod session_tests {
    use crate::core::attempt::Phase;
    use crate::core::error::CommandError;
    use crate::core::session::RaceSession;
    use crate::interfaces::session_events::{CueKind, SessionEvent};
    use crate::test_utils::{collect_events, lap};
    use approx::assert_ulps_eq;

    fn running_session(driver_id: &str, target_lap_count: u32) -> RaceSession {
        let (tx, _rx) = flume::unbounded();
        let mut session = RaceSession::new(0, tx);
        session.start(driver_id, target_lap_count, 1).unwrap();
        session.countdown_tick();
        assert_eq!(session.get_phase(), Phase::Running);
        session
    }

    #[test]
    fn test_countdown() {
        let (tx, rx) = flume::unbounded();
        let mut session = RaceSession::new(3, tx);
        assert_eq!(session.get_phase(), Phase::Idle);

        session.start("X", 3, 1).unwrap();
        assert_eq!(session.get_phase(), Phase::CountingDown(3));

        for _ in 0..4 {
            session.countdown_tick();
        }
        assert_eq!(session.get_phase(), Phase::Running);

        // further ticks do nothing
        session.countdown_tick();
        assert_eq!(session.get_phase(), Phase::Running);

        let events = collect_events(&rx);
        assert_eq!(
            events,
            vec![
                SessionEvent::Started {
                    driver_id: String::from("X"),
                    heat_no: 1,
                    target_lap_count: 3
                },
                SessionEvent::Countdown(3),
                SessionEvent::Countdown(2),
                SessionEvent::Countdown(1),
                SessionEvent::Go,
            ]
        );
        let cues: Vec<Option<CueKind>> = events.iter().map(|e| e.cue()).collect();
        assert_eq!(
            cues,
            vec![
                None,
                Some(CueKind::Countdown),
                Some(CueKind::Countdown),
                Some(CueKind::Countdown),
                Some(CueKind::Best)
            ]
        );
    }

    #[test]
    fn test_start_while_active() {
        let (tx, _rx) = flume::unbounded();
        let mut session = RaceSession::new(3, tx);
        session.start("X", 3, 1).unwrap();
        session.countdown_tick();

        assert_eq!(
            session.start("Y", 5, 1),
            Err(CommandError::AttemptAlreadyActive {
                driver_id: String::from("X")
            })
        );

        // the active attempt is unmodified
        let attempt = session.get_attempt().unwrap();
        assert_eq!(attempt.driver_id, "X");
        assert_eq!(attempt.target_lap_count, 3);
        assert_eq!(session.get_phase(), Phase::CountingDown(2));
    }

    #[test]
    fn test_best_lap_tie_break() {
        let (tx, rx) = flume::unbounded();
        let mut session = RaceSession::new(0, tx);
        session.start("X", 10, 1).unwrap();
        session.countdown_tick();
        let _ = collect_events(&rx);

        let mut best_laps = vec![];
        let mut new_best_flags = vec![];

        for ms in [1200, 1100, 1100, 900].iter() {
            assert!(session.apply_lap(lap(*ms)).is_none());
            best_laps.push(session.get_attempt().unwrap().best_lap().unwrap().as_secs_f64());

            match collect_events(&rx).as_slice() {
                [SessionEvent::Lap { is_new_best, .. }] => new_best_flags.push(*is_new_best),
                x => panic!("unexpected events {:?}", x),
            }
        }

        assert_eq!(new_best_flags, vec![true, true, false, true]);
        assert_ulps_eq!(best_laps[0], 1.2);
        assert_ulps_eq!(best_laps[1], 1.1);
        assert_ulps_eq!(best_laps[2], 1.1);
        assert_ulps_eq!(best_laps[3], 0.9);
    }

    #[test]
    fn test_completion() {
        let (tx, rx) = flume::unbounded();
        let mut session = RaceSession::new(0, tx);
        session.start("X", 3, 2).unwrap();
        session.countdown_tick();

        assert!(session.apply_lap(lap(2000)).is_none());
        assert!(session.apply_lap(lap(1500)).is_none());
        assert_eq!(session.get_phase(), Phase::Running);

        let completed = session.apply_lap(lap(1800)).unwrap();
        assert_eq!(session.get_phase(), Phase::Finished);
        assert!(!session.is_active());
        assert_eq!(completed.driver_id, "X");
        assert_eq!(completed.heat_no, 2);
        assert_eq!(completed.laps, vec![lap(2000), lap(1500), lap(1800)]);
        assert_eq!(completed.best_lap, Some(lap(1500)));

        let events = collect_events(&rx);
        assert_eq!(events.last(), Some(&SessionEvent::Finish(completed)));
        assert_eq!(events.last().unwrap().cue(), Some(CueKind::Finish));

        // inert after finishing
        assert!(session.apply_lap(lap(1000)).is_none());
        assert!(collect_events(&rx).is_empty());
    }

    #[test]
    fn test_laps_ignored_before_go() {
        let (tx, _rx) = flume::unbounded();
        let mut session = RaceSession::new(2, tx);
        assert!(session.apply_lap(lap(1000)).is_none());

        session.start("X", 1, 1).unwrap();
        assert!(session.apply_lap(lap(1000)).is_none());
        assert_eq!(session.get_attempt().unwrap().get_no_laps(), 0);
    }

    #[test]
    fn test_cancel() {
        let (tx, rx) = flume::unbounded();
        let mut session = RaceSession::new(3, tx);
        assert!(!session.cancel());

        session.start("X", 3, 1).unwrap();
        assert!(session.cancel());
        assert_eq!(session.get_phase(), Phase::Aborted);
        assert!(session.get_attempt().is_none());
        assert_eq!(
            collect_events(&rx).last(),
            Some(&SessionEvent::Aborted {
                driver_id: String::from("X")
            })
        );

        // a new attempt can be started after the abort
        session.start("Y", 3, 1).unwrap();
        assert_eq!(session.get_phase(), Phase::CountingDown(3));
    }

    #[test]
    fn test_cancel_running() {
        let mut session = running_session("X", 3);
        session.apply_lap(lap(1000));
        assert!(session.cancel());
        assert!(!session.cancel());
        assert_eq!(session.get_phase(), Phase::Aborted);
    }

    #[test]
    fn test_single_lap_attempt() {
        let mut session = running_session("X", 1);
        let completed = session.apply_lap(lap(950)).unwrap();
        assert_eq!(completed.laps.len(), 1);
        assert_eq!(session.get_phase(), Phase::Finished);
    }
}


#[cfg(test)]
mod ticker_tests {
    use crate::core::ticker::Ticker;
    use std::time::{Duration, Instant};

    #[test]
    fn test_ticker_cadence() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(100));

        assert!(ticker.fire(t0));
        assert!(!ticker.fire(t0 + Duration::from_millis(50)));
        assert!(ticker.fire(t0 + Duration::from_millis(110)));
        assert!(!ticker.fire(t0 + Duration::from_millis(190)));
        assert!(ticker.fire(t0 + Duration::from_millis(200)));
    }
    #[test]
    fn test_ticker_no_burst() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(100));

        assert!(ticker.fire(t0));
        assert!(ticker.fire(t0 + Duration::from_millis(1000)));
        assert!(!ticker.fire(t0 + Duration::from_millis(1050)));
        assert!(ticker.fire(t0 + Duration::from_millis(1100)));
    }
    #[test]
    fn test_ticker_reset() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(100));

        assert!(ticker.fire(t0));
        ticker.reset();
        assert!(ticker.fire(t0 + Duration::from_millis(10)));
    }
}


#[cfg(test)]
mod serial_link_tests {
    use crate::core::channel::lap_channel;
    use crate::io::serial_link::{
        monitor_link, open_serial, spawn_reader_source, spawn_serial_source, LineReader, LinkError,
        LinkPars, ReadOutcome,
    };
    use crate::test_utils::lap;
    use std::io::{self, Cursor, Read};
    use std::time::Duration;

    /// Source that returns its chunks one per read and times out in between.
    struct ChunkedSource {
        chunks: Vec<Vec<u8>>,
        timeout_next: bool,
    }

    impl Read for ChunkedSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            if self.timeout_next {
                self.timeout_next = false;
                return Err(io::Error::new(io::ErrorKind::TimedOut, "timeout"));
            }
            self.timeout_next = true;
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_line_reader() {
        let mut reader = LineReader::new(Cursor::new(b"1234\r\n\n  \nREADY\n987".to_vec()));
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::Line(String::from("1234")));
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::Line(String::from("READY")));
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::Line(String::from("987")));
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::Closed);
    }

    #[test]
    fn test_line_reader_undecodable() {
        let mut reader = LineReader::new(Cursor::new(vec![b'1', 0xff, b'2', 0xfe, b'\n']));
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::Line(String::from("12")));
    }

    #[test]
    fn test_line_reader_timeout() {
        let mut reader = LineReader::new(ChunkedSource {
            chunks: vec![b"12".to_vec(), b"34\n".to_vec()],
            timeout_next: false,
        });
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::Idle);
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::Line(String::from("1234")));
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::Closed);
    }

    #[test]
    fn test_reader_source() {
        let (tx, rx) = lap_channel();
        let input = b"2000\nnoise\n20\n1500\n\n1800\n".to_vec();
        let handle = spawn_reader_source(Cursor::new(input), tx);
        handle.join();

        assert!(!rx.is_closed());
        assert_eq!(rx.drain(), vec![lap(2000), lap(1500), lap(1800)]);
        assert!(rx.is_closed());
    }

    #[test]
    fn test_link_unavailable() {
        let link_pars = LinkPars {
            port: String::from("/dev/racetimer_missing_port"),
            baud: 115200,
            read_timeout: Duration::from_millis(100),
            reconnect_interval: Duration::from_millis(100),
        };

        match open_serial(&link_pars).err() {
            Some(LinkError::LinkUnavailable { port, baud, .. }) => {
                assert_eq!(port, "/dev/racetimer_missing_port");
                assert_eq!(baud, 115200);
            }
            None => panic!("missing port was opened"),
        }

        // the producer side is released, the timer runs without live pulses
        let (tx, rx) = lap_channel();
        assert!(matches!(
            spawn_serial_source(&link_pars, tx),
            Err(LinkError::LinkUnavailable { .. })
        ));
        assert!(rx.is_closed());
    }

    #[test]
    fn test_monitor_link() {
        let mut out = vec![];
        monitor_link(Cursor::new(b"1234\n\nhello\n".to_vec()), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "RAW: 1234\nRAW: hello\n");
    }
}


#[cfg(test)]
mod pre_tests {
    use crate::pre::check_timer_opts_pars::check_timer_opts_pars;
    use crate::pre::read_timer_pars::{read_timer_pars, TimerPars};
    use crate::pre::timer_opts::TimerOpts;
    use clap::Parser;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn test_opts_defaults() {
        let timer_opts = TimerOpts::parse_from(&["rc-laps", "--driver", "Adam"]);
        assert_eq!(timer_opts.baud, 115200);
        assert!(!timer_opts.gui);
        assert_eq!(timer_opts.laps, None);

        let mut timer_pars = TimerPars::default();
        timer_pars.apply_opts(&timer_opts);
        assert_eq!(timer_pars.drivers, vec![String::from("Adam")]);
        assert_eq!(timer_pars.target_laps, 5);
        assert!(check_timer_opts_pars(&timer_opts, &timer_pars).is_ok());

        let link_pars = timer_pars.get_link_pars(&timer_opts);
        assert_eq!(link_pars.read_timeout, Duration::from_millis(1000));
        let timing_pars = timer_pars.get_timing_pars();
        assert_eq!(timing_pars.countdown_ticks, 3);
        assert_eq!(timing_pars.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_opts_override() {
        let timer_opts =
            TimerOpts::parse_from(&["rc-laps", "--gui", "--laps", "10", "--countdown", "5"]);
        let mut timer_pars = TimerPars::default();
        timer_pars.apply_opts(&timer_opts);
        assert_eq!(timer_pars.target_laps, 10);
        assert_eq!(timer_pars.countdown_ticks, 5);
        assert!(check_timer_opts_pars(&timer_opts, &timer_pars).is_ok());
    }

    #[test]
    fn test_check_rejects() {
        let timer_opts = TimerOpts::parse_from(&["rc-laps"]);
        assert!(check_timer_opts_pars(&timer_opts, &TimerPars::default()).is_err());

        let timer_opts = TimerOpts::parse_from(&["rc-laps", "--gui", "--laps", "0"]);
        let mut timer_pars = TimerPars::default();
        timer_pars.apply_opts(&timer_opts);
        assert!(check_timer_opts_pars(&timer_opts, &timer_pars).is_err());

        let timer_opts = TimerOpts::parse_from(&["rc-laps", "--gui"]);
        let timer_pars = TimerPars {
            poll_interval_ms: 0,
            ..TimerPars::default()
        };
        assert!(check_timer_opts_pars(&timer_opts, &timer_pars).is_err());

        let timer_pars = TimerPars {
            reconnect_interval_ms: 0,
            ..TimerPars::default()
        };
        assert!(check_timer_opts_pars(&timer_opts, &timer_pars).is_err());
    }

    #[test]
    fn test_read_timer_pars() {
        let filepath = std::env::temp_dir().join(format!(
            "racetimer_pre_tests_{}.json",
            std::process::id()
        ));
        fs::write(&filepath, r#"{"drivers": ["Adam", "Eva"], "target_laps": 7}"#).unwrap();

        let timer_pars = read_timer_pars(&filepath).unwrap();
        assert_eq!(timer_pars.drivers, vec![String::from("Adam"), String::from("Eva")]);
        assert_eq!(timer_pars.target_laps, 7);
        assert_eq!(timer_pars.countdown_ticks, 3);

        fs::remove_file(&filepath).unwrap();
        assert!(read_timer_pars(&filepath).is_err());
    }
}
