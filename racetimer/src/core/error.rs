use thiserror::Error;

/// CommandError contains the reasons for which a command to the race timer can be rejected. All
/// of them are returned to the caller for user feedback, none of them is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("an attempt is already active (driver {driver_id})")]
    AttemptAlreadyActive { driver_id: String },

    #[error("not possible while an attempt is in progress")]
    AttemptInProgress,

    #[error("lap count must be a positive integer, but is {0}")]
    InvalidLapCount(i64),

    #[error("driver {0:?} is not registered")]
    UnknownDriver(String),

    #[error("driver name must not be empty")]
    EmptyDriverName,
}
