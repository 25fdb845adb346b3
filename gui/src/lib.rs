pub mod core {
    pub mod gui;
    pub mod race_board;
}

pub mod interfaces {
    pub mod racetimer_interface;
}
