use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid reminder: {0}")]
    Reminder(#[from] ReminderError),
}

/// Reasons a persisted reminder is rejected by the evaluator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    #[error("reminder has no id")]
    MissingId,

    #[error("reminder {0} has empty text")]
    EmptyText(String),

    #[error("reminder {0} is completed but has no completedAt")]
    MissingCompletedAt(String),

    #[error("reminder {0} is not completed but carries a completedAt")]
    StaleCompletedAt(String),
}
