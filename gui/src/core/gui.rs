use crate::core::race_board::RaceBoard;
use crate::interfaces::racetimer_interface::RacetimerInterface;
use eframe::{egui, epi};
use flume::Receiver;
use helpers::laptime::fmt_laptime;
use racetimer::core::race_control::RaceControl;
use racetimer::interfaces::cue_player::CuePlayer;
use racetimer::interfaces::session_events::SessionEvent;
use racetimer::post::heat_result::export_heat_results;
use std::fmt::Write;
use std::path::PathBuf;
use std::time::Instant;

/// * `results_dir` - Directory the result files are written to
/// * `write_csv` - Write a CSV result file next to the text file
/// * `link_info` - Description of the pulse source shown in the menu
#[derive(Debug, Clone)]
pub struct GuiPars {
    pub results_dir: PathBuf,
    pub write_csv: bool,
    pub link_info: String,
}

/// LapManager is the GUI of the race timer. It owns the race control and advances it on every
/// repaint, so that the GUI thread is the session context.
pub struct LapManager {
    race_control: RaceControl,
    racetimer_interface: RacetimerInterface,
    cue_player: Box<dyn CuePlayer>,
    gui_pars: GuiPars,
    selected_driver: Option<String>,
    new_driver_name: String,
    target_laps_input: String,
    status_text: String,
}

impl LapManager {
    pub fn new(
        race_control: RaceControl,
        rx: Receiver<SessionEvent>,
        cue_player: Box<dyn CuePlayer>,
        gui_pars: GuiPars,
    ) -> LapManager {
        let target_laps_input = race_control
            .get_registry()
            .get_heat_state()
            .target_lap_count
            .to_string();

        LapManager {
            race_control,
            racetimer_interface: RacetimerInterface {
                rx,
                race_board: RaceBoard::default(),
            },
            cue_player,
            gui_pars,
            selected_driver: None,
            new_driver_name: String::new(),
            target_laps_input,
            status_text: String::new(),
        }
    }

    /// handle_events plays the cues of the new session events and exports the heat results
    /// whenever an attempt finished.
    fn handle_events(&mut self, events: &[SessionEvent]) {
        for event in events.iter() {
            if let Some(cue) = event.cue() {
                self.cue_player.play(cue);
            }

            if let SessionEvent::Finish(attempt) = event {
                self.status_text = match export_heat_results(
                    self.race_control.get_registry(),
                    attempt.heat_no,
                    &self.gui_pars.results_dir,
                    self.gui_pars.write_csv,
                ) {
                    Ok(filepath) => format!("Results written to {}", filepath.display()),
                    Err(e) => {
                        log::error!("{:#}", e);
                        format!("{:#}", e)
                    }
                };
            }
        }
    }

    fn get_results_text(&self) -> String {
        let heat_no = self.race_control.get_registry().get_heat_state().heat_no;
        let mut text = format!("=== RESULTS (Heat {}) ===\n", heat_no);

        for standing in self.race_control.get_registry().get_standings(heat_no) {
            let _ = writeln!(
                &mut text,
                "{}: best {}s, laps: {}",
                standing.name,
                fmt_laptime(standing.best_lap.as_secs_f64()),
                standing.no_laps
            );
        }

        text
    }

    // ---------------------------------------------------------------------------------------------
    // MENU ----------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn set_menu_content(&mut self, ui: &mut egui::Ui) {
        let heat_state = self.race_control.get_registry().get_heat_state().to_owned();

        // heat
        ui.horizontal(|ui| {
            ui.heading(format!("Heat: {}", heat_state.heat_no));

            if ui.button("Next Heat").clicked() {
                self.status_text = match self.race_control.advance_heat() {
                    Ok(heat_no) => format!("Heat {} started", heat_no),
                    Err(e) => e.to_string(),
                };
            }
        });
        ui.separator();

        // driver list
        ui.heading("Driver List");

        let names: Vec<String> = self
            .race_control
            .get_registry()
            .get_drivers()
            .iter()
            .map(|driver| driver.name.to_owned())
            .collect();

        for name in names.into_iter() {
            let selected = self.selected_driver.as_deref() == Some(name.as_str());

            if ui.selectable_label(selected, name.as_str()).clicked() {
                self.selected_driver = Some(name);
            }
        }

        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.new_driver_name);

            if ui.button("Add Driver").clicked() {
                match self.race_control.register_driver(&self.new_driver_name) {
                    Ok(()) => self.new_driver_name.clear(),
                    Err(e) => self.status_text = e.to_string(),
                }
            }
        });

        // lap count and start
        ui.horizontal(|ui| {
            ui.label(format!("Laps: {}", heat_state.target_lap_count));
            ui.text_edit_singleline(&mut self.target_laps_input);

            if ui.button("Set Laps").clicked() {
                self.status_text = match self.target_laps_input.trim().parse::<i64>() {
                    Ok(target_laps) => match self.race_control.set_target_laps(target_laps) {
                        Ok(()) => format!("Laps set to {}", target_laps),
                        Err(e) => e.to_string(),
                    },
                    Err(_) => String::from("Laps must be an integer"),
                };
            }
        });

        if ui.button("Start Race").clicked() {
            self.status_text = match self.selected_driver.as_ref() {
                Some(driver_id) => match self
                    .race_control
                    .start_attempt(driver_id, heat_state.target_lap_count as i64)
                {
                    Ok(()) => String::new(),
                    Err(e) => e.to_string(),
                },
                None => String::from("Select a driver first"),
            };
        }
        ui.separator();

        // results and status
        ui.label(self.get_results_text());
        ui.separator();

        let link_text = if self.race_control.is_link_closed() {
            format!("{} (closed)", self.gui_pars.link_info)
        } else {
            self.gui_pars.link_info.to_owned()
        };
        ui.label(link_text);

        if !self.status_text.is_empty() {
            ui.colored_label(egui::Color32::YELLOW, self.status_text.as_str());
        }
    }

    // ---------------------------------------------------------------------------------------------
    // RACE BOARD ----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn set_race_board_content(&mut self, ui: &mut egui::Ui) {
        let race_board = self.racetimer_interface.race_board.to_owned();

        ui.heading(format!("Heat {}", race_board.heat_no));
        ui.heading(format!("Driver: {}", race_board.driver_id));
        ui.heading(race_board.get_laps_text());
        ui.separator();

        ui.add(egui::Label::new(race_board.main_text.as_str()).heading().strong());
        ui.heading(race_board.get_best_text());
        ui.separator();

        ui.label(race_board.get_ranked_text());
        ui.separator();

        if race_board.finished {
            ui.add(egui::Label::new("FINISH").heading().strong());

            if ui.button("Back to Menu").clicked() {
                self.racetimer_interface.race_board = RaceBoard::default();
            }
        } else if ui.button("Abort (Esc)").clicked() {
            self.race_control.cancel_attempt();
        }
    }
}

impl epi::App for LapManager {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::CtxRef, _frame: &mut epi::Frame) {
        // advance the race session and handle its side effects
        self.race_control.update(Instant::now());
        let events = self.racetimer_interface.update();
        self.handle_events(&events);

        if ctx.input().key_pressed(egui::Key::Escape) {
            self.race_control.cancel_attempt();
        }

        // update UI content
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.racetimer_interface.race_board.visible {
                self.set_race_board_content(ui);
            } else {
                self.set_menu_content(ui);
            }
        });

        // request repaint of the UI such that the session keeps being advanced
        ctx.request_repaint();
    }

    fn name(&self) -> &str {
        "RC Lap Manager"
    }
}
