pub mod comparator;
pub mod model;
pub mod poller;
pub mod response;
pub mod runner;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use model::{Mode, Submission};
pub use service::JudgeService;
