use super::dto::{CreateSubmissionRequest, CreateSubmissionResponse, SubmissionResponse};
use super::types::{ExecutionRequest, JobHandle, JobSnapshot, JobStatus, Sandbox, SandboxError};
use super::urls::{url_submission_token, url_submissions};
use crate::config::JudgeConfig;
use async_trait::async_trait;
use base64::Engine;
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// HTTP client for the execution sandbox.
///
/// Source and stdin are sent base64-encoded so arbitrary bytes survive the JSON
/// body; results come back the same way and are decoded here, before anything
/// else in the crate sees them.
pub struct SandboxClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    submit_retries: u32,
    retry_base: Duration,
}

impl SandboxClient {
    pub fn new(config: &JudgeConfig) -> Result<Self, SandboxError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("codejudge/0.1")
            .build()
            .map_err(|e| SandboxError::Transport(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.sandbox_url.clone(),
            auth_token: config.sandbox_auth_token.clone(),
            submit_retries: config.submit_retries,
            retry_base: config.poll_interval,
        })
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.auth_token {
            Some(ref token) => builder.header("X-Auth-Token", token),
            None => builder,
        }
    }

    async fn submit_once(&self, req: &ExecutionRequest<'_>) -> Result<JobHandle, SandboxError> {
        let body = CreateSubmissionRequest {
            language_id: req.language.sandbox_id(),
            source_code: encode(req.source_code),
            stdin: encode(req.stdin),
        };

        let url = url_submissions(&self.base_url);
        let resp = self
            .with_auth(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SandboxError::Transport(format!("submit request failed: {}", e)))?;
        let resp = check_status(resp).await?;

        let text = resp
            .text()
            .await
            .map_err(|e| SandboxError::Transport(format!("failed to read submit response: {}", e)))?;
        let parsed: CreateSubmissionResponse = serde_json::from_str(&text).map_err(|e| {
            SandboxError::Protocol(format!("submit response is not json: {}, raw={}", e, text))
        })?;

        match parsed.token {
            Some(token) if !token.trim().is_empty() => Ok(JobHandle(token)),
            _ => Err(SandboxError::Protocol(format!(
                "sandbox accepted the job but returned no token, raw={}",
                text
            ))),
        }
    }
}

#[async_trait]
impl Sandbox for SandboxClient {
    async fn submit(&self, req: &ExecutionRequest<'_>) -> Result<JobHandle, SandboxError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.submit_once(req).await {
                Ok(handle) => {
                    info!("▶ job submitted [{}] ({} tries)", handle, attempt);
                    return Ok(handle);
                }
                Err(e) if e.is_retryable() && attempt <= self.submit_retries => {
                    let delay = backoff_delay(self.retry_base, attempt - 1, Duration::from_secs(10));
                    warn!(
                        "⚠ submit failed [{}/{}], retrying in {:?}: {}",
                        attempt,
                        self.submit_retries + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch(&self, handle: &JobHandle) -> Result<JobSnapshot, SandboxError> {
        let url = url_submission_token(&self.base_url, &handle.0);
        let resp = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| SandboxError::Transport(format!("poll request failed: {}", e)))?;
        let resp = check_status(resp).await?;

        let text = resp
            .text()
            .await
            .map_err(|e| SandboxError::Transport(format!("failed to read poll response: {}", e)))?;
        let body: SubmissionResponse = serde_json::from_str(&text).map_err(|e| {
            SandboxError::Protocol(format!("poll response is not json: {}, raw={}", e, text))
        })?;
        debug!("poll [{}]: {:?}", handle, body.status);

        snapshot_from_response(body)
    }
}

async fn check_status(resp: Response) -> Result<Response, SandboxError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(SandboxError::Transport(
            "sandbox is throttling requests (429)".to_string(),
        )),
        s if s.is_server_error() => Err(SandboxError::Transport(format!(
            "sandbox server error ({}): {}",
            s.as_u16(),
            text
        ))),
        s => Err(SandboxError::Protocol(format!(
            "unexpected status ({}): {}",
            s.as_u16(),
            text
        ))),
    }
}

pub(crate) fn snapshot_from_response(body: SubmissionResponse) -> Result<JobSnapshot, SandboxError> {
    let status = body
        .status
        .ok_or_else(|| SandboxError::Protocol("poll response is missing status".to_string()))?;

    Ok(JobSnapshot {
        status: JobStatus::from_status_id(status.id),
        description: status.description,
        stdout: decode_opt(body.stdout.as_deref())?,
        stderr: decode_opt(body.stderr.as_deref())?,
        compile_output: decode_opt(body.compile_output.as_deref())?,
        time_ms: body.time.map(|secs| secs * 1000.0),
        memory_kb: body.memory,
    })
}

pub(crate) fn encode(raw: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(raw.as_bytes())
}

/// Decode a base64 field. The sandbox wraps long payloads across lines.
pub(crate) fn decode_opt(field: Option<&str>) -> Result<String, SandboxError> {
    let Some(raw) = field else {
        return Ok(String::new());
    };
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SandboxError::Protocol(format!("invalid base64 payload: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Exponential backoff with a cap and up to 20% jitter.
pub(crate) fn backoff_delay(base: Duration, retry: u32, cap: Duration) -> Duration {
    let base_ms = base.as_millis().clamp(1, u64::MAX as u128) as u64;
    let cap_ms = cap.as_millis().min(u64::MAX as u128) as u64;
    let exp = (1u64 << retry.min(10)).saturating_mul(base_ms);
    let delay = exp.min(cap_ms);
    let jitter = (delay / 5) / 5 * (rand::random::<u8>() as u64 % 5);
    Duration::from_millis(delay.saturating_add(jitter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::dto::StatusDto;
    use crate::sandbox::Language;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// One-shot HTTP server: each connection gets the next canned (status, body).
    /// Returns the base url and the request heads it saw.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let head = read_request(&mut stream).await;
                log.lock().unwrap().push(head);
                let reply = format!(
                    "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(reply.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });
        (base, seen)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    return head;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_lowercase()
    }

    fn client(base: &str, retries: u32) -> SandboxClient {
        SandboxClient::new(&JudgeConfig {
            sandbox_url: base.to_string(),
            sandbox_auth_token: Some("secret".into()),
            request_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(1),
            submit_retries: retries,
            ..JudgeConfig::default()
        })
        .unwrap()
    }

    fn request() -> ExecutionRequest<'static> {
        ExecutionRequest {
            source_code: "print(1)",
            language: Language::Python,
            stdin: "1 2",
        }
    }

    #[tokio::test]
    async fn submit_retries_server_errors_then_returns_token() {
        let (base, seen) = serve(vec![(503, "busy"), (201, r#"{"token":"abc"}"#)]).await;
        let handle = client(&base, 3).submit(&request()).await.unwrap();
        assert_eq!(handle, JobHandle("abc".into()));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("post /submissions?base64_encoded=true"));
        assert!(seen[0].contains("x-auth-token: secret"));
    }

    #[tokio::test]
    async fn submit_gives_up_after_configured_retries() {
        let (base, seen) = serve(vec![(503, ""), (502, ""), (500, "")]).await;
        let err = client(&base, 2).submit(&request()).await.unwrap_err();
        assert!(matches!(err, SandboxError::Transport(_)));
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn accepted_job_without_token_is_a_protocol_error() {
        let (base, seen) = serve(vec![(201, "{}")]).await;
        let err = client(&base, 3).submit(&request()).await.unwrap_err();
        assert!(matches!(err, SandboxError::Protocol(ref m) if m.contains("no token")));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (base, seen) = serve(vec![(422, r#"{"language_id":["is invalid"]}"#)]).await;
        let err = client(&base, 3).submit(&request()).await.unwrap_err();
        assert!(matches!(err, SandboxError::Protocol(ref m) if m.contains("422")));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_decodes_poll_body() {
        let (base, seen) = serve(vec![(
            200,
            r#"{"stdout":"Mw==\n","stderr":null,"compile_output":null,"message":null,
                "status":{"id":3,"description":"Accepted"},"time":"0.25","memory":3124}"#,
        )])
        .await;
        let snap = client(&base, 0)
            .fetch(&JobHandle("tok-1".into()))
            .await
            .unwrap();
        assert_eq!(snap.status, JobStatus::Succeeded);
        assert_eq!(snap.stdout, "3");
        assert_eq!(snap.time_ms, Some(250.0));
        assert_eq!(snap.memory_kb, Some(3124));
        assert!(seen.lock().unwrap()[0].starts_with("get /submissions/tok-1?base64_encoded=true"));
    }

    #[test]
    fn encodes_control_characters_safely() {
        let src = "int main(){}\n\t\u{0}\r\n";
        assert_eq!(decode_opt(Some(&encode(src))).unwrap(), src);
    }

    #[test]
    fn decodes_line_wrapped_base64() {
        let wrapped = "aGVs\nbG8g\nd29y\nbGQ=\n";
        assert_eq!(decode_opt(Some(wrapped)).unwrap(), "hello world");
        assert_eq!(decode_opt(None).unwrap(), "");
        assert!(matches!(
            decode_opt(Some("@@not base64@@")),
            Err(SandboxError::Protocol(_))
        ));
    }

    #[test]
    fn snapshot_requires_status_and_converts_units() {
        let missing = SubmissionResponse {
            stdout: None,
            stderr: None,
            compile_output: None,
            message: None,
            status: None,
            time: None,
            memory: None,
        };
        assert!(matches!(
            snapshot_from_response(missing),
            Err(SandboxError::Protocol(_))
        ));

        let done = SubmissionResponse {
            stdout: Some(encode("3\n")),
            stderr: None,
            compile_output: None,
            message: None,
            status: Some(StatusDto {
                id: 3,
                description: "Accepted".into(),
            }),
            time: Some(0.25),
            memory: Some(1024),
        };
        let snap = snapshot_from_response(done).unwrap();
        assert_eq!(snap.status, JobStatus::Succeeded);
        assert_eq!(snap.stdout, "3\n");
        assert_eq!(snap.time_ms, Some(250.0));
        assert_eq!(snap.memory_kb, Some(1024));
    }

    #[test]
    fn backoff_grows_and_respects_cap() {
        let base = Duration::from_millis(100);
        let cap = Duration::from_millis(1_000);
        let first = backoff_delay(base, 0, cap);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(120));
        let third = backoff_delay(base, 2, cap);
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(480));
        let capped = backoff_delay(base, 30, cap);
        assert!(capped <= Duration::from_millis(1_200));
    }
}
