use nudge_core::CoreError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("reminder not found: {0}")]
    ReminderNotFound(String),
}
