pub mod logger;

pub use logger::{RunLog, RunLogger, StepLog, SEARCH_LOG_FILE};
