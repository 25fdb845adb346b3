use anyhow::Context;
use clap::Parser;
use flume::Receiver;
use gui::core::gui::{GuiPars, LapManager};
use racetimer::core::channel::lap_channel;
use racetimer::core::handle_session::handle_session;
use racetimer::core::race_control::RaceControl;
use racetimer::interfaces::cue_player::{CuePlayer, SilentCues, TerminalBell};
use racetimer::interfaces::session_events::SessionEvent;
use racetimer::io::serial_link::{
    monitor_link, open_serial, spawn_reader_source, spawn_serial_source, PulseSourceHandle,
};
use racetimer::post::heat_result::export_heat_results;
use racetimer::pre::check_timer_opts_pars::check_timer_opts_pars;
use racetimer::pre::read_timer_pars::{read_timer_pars, TimerPars};
use racetimer::pre::timer_opts::TimerOpts;
use std::io;
use std::thread;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get timer options from the command line arguments and read timer parameters (if available)
    let timer_opts: TimerOpts = TimerOpts::parse();

    let log_level = if timer_opts.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut timer_pars = match timer_opts.parfile_path.as_ref() {
        Some(parfile_path) => read_timer_pars(parfile_path.as_path())?,
        None => TimerPars::default(),
    };
    timer_pars.apply_opts(&timer_opts);

    // check timer options and parameters
    check_timer_opts_pars(&timer_opts, &timer_pars)?;

    let link_pars = timer_pars.get_link_pars(&timer_opts);

    // MONITOR CASE --------------------------------------------------------------------------------
    if timer_opts.monitor {
        let port = open_serial(&link_pars)?;
        println!("Listening for lap times... (Ctrl+C to stop)");

        let stdout = io::stdout();
        monitor_link(port, &mut stdout.lock()).context("Serial link failed!")?;
        return Ok(());
    }

    // PULSE SOURCE --------------------------------------------------------------------------------
    // create channel for the laps between the pulse source thread and the session
    let (lap_tx, lap_rx) = lap_channel();

    let (link_info, pulse_source): (String, Option<PulseSourceHandle>) = if timer_opts.stdin {
        (
            String::from("Pulse source: standard input"),
            Some(spawn_reader_source(io::stdin(), lap_tx)),
        )
    } else {
        match spawn_serial_source(&link_pars, lap_tx) {
            Ok(handle) => (
                format!("Serial link {} ({} baud)", link_pars.port, link_pars.baud),
                Some(handle),
            ),
            Err(e) => {
                // degraded mode: the timer keeps running without live pulses
                log::warn!("{}, continuing without live pulses", e);
                (format!("No timing link: {}", e), None)
            }
        }
    };

    // RACE CONTROL --------------------------------------------------------------------------------
    // create channel for the session events and set up the race control with all known drivers
    let (tx, rx) = flume::unbounded();
    let mut race_control = RaceControl::new(
        &timer_pars.get_timing_pars(),
        timer_pars.target_laps as u32,
        lap_rx,
        tx,
    );

    for driver in timer_pars.drivers.iter() {
        race_control.register_driver(driver)?;
    }

    let cue_player: Box<dyn CuePlayer + Send> = if timer_opts.bell {
        Box::new(TerminalBell)
    } else {
        Box::new(SilentCues)
    };

    // EXECUTION -----------------------------------------------------------------------------------
    if timer_opts.gui {
        // GUI CASE --------------------------------------------------------------------------------
        // the GUI runs the session in the main thread and does not return
        let gui = LapManager::new(
            race_control,
            rx,
            cue_player,
            GuiPars {
                results_dir: timer_opts.results_dir.to_owned(),
                write_csv: timer_opts.csv,
                link_info,
            },
        );
        let native_options = eframe::NativeOptions::default();
        eframe::run_native(Box::new(gui), native_options);
    }

    // HEADLESS CASE -------------------------------------------------------------------------------
    log::info!("{}", link_info);

    let driver_id = timer_opts
        .driver
        .to_owned()
        .context("A driver is required without GUI!")?;

    // print the session events in a separate thread while the session runs in the main thread
    let printer = thread::spawn(move || print_events(rx, cue_player));

    let res = handle_session(&mut race_control, &driver_id, timer_pars.target_laps);

    // POST-PROCESSING -----------------------------------------------------------------------------
    if let Ok(Some(attempt)) = res.as_ref() {
        export_heat_results(
            race_control.get_registry(),
            attempt.heat_no,
            &timer_opts.results_dir,
            timer_opts.csv,
        )?;
    }

    // dropping the race control closes the event channel and ends the printer thread
    drop(race_control);
    if printer.join().is_err() {
        log::error!("Event printer thread panicked");
    }

    // the stdin reader can block forever, it is left behind on exit
    if let Some(handle) = pulse_source {
        if timer_opts.stdin {
            handle.request_stop();
        } else {
            handle.stop();
        }
    }

    match res? {
        Some(attempt) => {
            println!(
                "RESULT: {} finished heat {} with best lap {}",
                attempt.driver_id,
                attempt.heat_no,
                attempt
                    .best_lap
                    .map_or_else(|| String::from("-"), |x| x.to_string())
            );
        }
        None => println!("RESULT: Attempt aborted"),
    }

    Ok(())
}

/// print_events prints the session events to the console and plays their cues until the event
/// channel is closed.
fn print_events(rx: Receiver<SessionEvent>, mut cue_player: Box<dyn CuePlayer + Send>) {
    for event in rx.iter() {
        if let Some(cue) = event.cue() {
            cue_player.play(cue);
        }

        match event {
            SessionEvent::Started {
                driver_id,
                heat_no,
                target_lap_count,
            } => println!(
                "Heat {}, driver {}, {} laps",
                heat_no, driver_id, target_lap_count
            ),
            SessionEvent::Countdown(n) => println!("{}", n),
            SessionEvent::Go => println!("GO!"),
            SessionEvent::Lap {
                lap,
                lap_no,
                target_lap_count,
                is_new_best,
            } => println!(
                "Lap {:3}/{}: {}{}",
                lap_no,
                target_lap_count,
                lap,
                if is_new_best { " (best)" } else { "" }
            ),
            SessionEvent::Finish(_) => println!("FINISH"),
            SessionEvent::Aborted { driver_id } => println!("Attempt of {} aborted", driver_id),
        }
    }
}
