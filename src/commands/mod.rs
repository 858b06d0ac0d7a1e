pub mod app_command;
pub mod judge;
pub mod progress;
pub mod seed;

pub use app_command::{AppCommand, USAGE};
