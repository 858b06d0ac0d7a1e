//! In-process sandbox double driven by per-input scripts.

use crate::sandbox::{ExecutionRequest, JobHandle, JobSnapshot, JobStatus, Sandbox, SandboxError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

type Step = Result<JobSnapshot, SandboxError>;

/// Each stdin gets its own script of poll responses. The last step repeats
/// forever, so a single `running()` models a job that never finishes.
#[derive(Default)]
pub struct ScriptedSandbox {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    handles: Mutex<HashMap<JobHandle, String>>,
    submitted: Mutex<Vec<String>>,
    submit_errors: Mutex<HashMap<String, SandboxError>>,
    fetches: AtomicUsize,
}

impl ScriptedSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, stdin: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(stdin.to_string(), steps.into());
        self
    }

    pub fn reject_submit(self, stdin: &str, err: SandboxError) -> Self {
        self.submit_errors
            .lock()
            .unwrap()
            .insert(stdin.to_string(), err);
        self
    }

    /// Stdin of every accepted job, in submission order.
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sandbox for ScriptedSandbox {
    async fn submit(&self, req: &ExecutionRequest<'_>) -> Result<JobHandle, SandboxError> {
        if let Some(err) = self.submit_errors.lock().unwrap().get(req.stdin) {
            return Err(err.clone());
        }
        let mut submitted = self.submitted.lock().unwrap();
        let handle = JobHandle(format!("job-{}", submitted.len() + 1));
        submitted.push(req.stdin.to_string());
        self.handles
            .lock()
            .unwrap()
            .insert(handle.clone(), req.stdin.to_string());
        Ok(handle)
    }

    async fn fetch(&self, handle: &JobHandle) -> Result<JobSnapshot, SandboxError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let stdin = self
            .handles
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .ok_or_else(|| SandboxError::Protocol(format!("unknown handle {}", handle)))?;

        let mut scripts = self.scripts.lock().unwrap();
        let steps = scripts
            .get_mut(&stdin)
            .ok_or_else(|| SandboxError::Protocol(format!("no script for {:?}", stdin)))?;
        if steps.len() > 1 {
            steps
                .pop_front()
                .ok_or_else(|| SandboxError::Protocol("empty script".into()))?
        } else {
            steps
                .front()
                .cloned()
                .ok_or_else(|| SandboxError::Protocol("empty script".into()))?
        }
    }
}

pub fn running() -> JobSnapshot {
    let mut s = JobSnapshot::pending(JobStatus::Running);
    s.description = "Processing".into();
    s
}

pub fn done(stdout: &str, time_ms: f64, memory_kb: u64) -> JobSnapshot {
    JobSnapshot {
        status: JobStatus::Succeeded,
        description: "Accepted".into(),
        stdout: stdout.to_string(),
        stderr: String::new(),
        compile_output: String::new(),
        time_ms: Some(time_ms),
        memory_kb: Some(memory_kb),
    }
}

pub fn failed(description: &str, stderr: &str) -> JobSnapshot {
    JobSnapshot {
        status: JobStatus::Failed,
        description: description.to_string(),
        stdout: String::new(),
        stderr: stderr.to_string(),
        compile_output: String::new(),
        time_ms: Some(3.0),
        memory_kb: Some(512),
    }
}
