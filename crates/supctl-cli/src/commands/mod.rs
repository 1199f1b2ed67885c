// Command modules

pub mod process_stop;

pub use process_stop::{execute as process_stop, Outcome, ProcessStopArgs, StopReport};
