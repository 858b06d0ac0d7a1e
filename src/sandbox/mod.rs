pub mod client;
pub mod dto;
pub mod language;
pub mod types;
pub mod urls;

pub use client::SandboxClient;
pub use language::Language;
pub use types::{ExecutionRequest, JobHandle, JobSnapshot, JobStatus, Sandbox, SandboxError};
