use crate::sandbox::language::Language;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SandboxError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    /// Network failure or 5xx / throttling from the sandbox.
    #[error("transport error: {0}")]
    Transport(String),
    /// The sandbox answered but the payload is unusable.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SandboxError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SandboxError::Transport(_))
    }
}

/// Opaque job reference handed out by the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle(pub String);

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    /// The submitted program failed: compile error, time limit, runtime error.
    Failed,
    /// The sandbox itself failed to execute the job.
    Errored,
}

impl JobStatus {
    /// Decode the sandbox's numeric status id. Unknown ids count as sandbox errors.
    pub fn from_status_id(id: u32) -> Self {
        match id {
            1 => JobStatus::Queued,
            2 => JobStatus::Running,
            3 => JobStatus::Succeeded,
            4..=12 => JobStatus::Failed,
            _ => JobStatus::Errored,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Errored
        )
    }
}

/// One decoded observation of a job. Text fields are already base64-decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub description: String,
    pub stdout: String,
    pub stderr: String,
    pub compile_output: String,
    pub time_ms: Option<f64>,
    pub memory_kb: Option<u64>,
}

impl JobSnapshot {
    #[cfg(test)]
    pub fn pending(status: JobStatus) -> Self {
        Self {
            status,
            description: String::new(),
            stdout: String::new(),
            stderr: String::new(),
            compile_output: String::new(),
            time_ms: None,
            memory_kb: None,
        }
    }

    /// Best diagnostic text for a failed job.
    pub fn failure_detail(&self) -> String {
        if !self.stderr.trim().is_empty() {
            self.stderr.clone()
        } else if !self.compile_output.trim().is_empty() {
            self.compile_output.clone()
        } else {
            self.description.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionRequest<'a> {
    pub source_code: &'a str,
    pub language: Language,
    pub stdin: &'a str,
}

/// Client side of the external execution service.
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn submit(&self, req: &ExecutionRequest<'_>) -> Result<JobHandle, SandboxError>;

    async fn fetch(&self, handle: &JobHandle) -> Result<JobSnapshot, SandboxError>;
}
