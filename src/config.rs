use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings for the sandbox client, the poller and storage.
///
/// Built once at startup and handed to each component; nothing here is global.
#[derive(Clone, Debug)]
pub struct JudgeConfig {
    pub sandbox_url: String,
    pub sandbox_auth_token: Option<String>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub submit_retries: u32,
    pub max_parallel_cases: usize,
    pub database_url: String,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            sandbox_url: "http://localhost:2358".to_string(),
            sandbox_auth_token: None,
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            max_poll_attempts: 10,
            submit_retries: 3,
            max_parallel_cases: 1,
            database_url: "sqlite://codejudge.db?mode=rwc".to_string(),
        }
    }
}

impl JudgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let sandbox_url = std::env::var("SANDBOX_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.sandbox_url);
        let sandbox_auth_token = std::env::var("SANDBOX_AUTH_TOKEN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let request_timeout = match read_num::<u64>("SANDBOX_REQUEST_TIMEOUT_SECS")? {
            Some(secs) => Duration::from_secs(secs),
            None => defaults.request_timeout,
        };
        let poll_interval = match read_num::<u64>("JUDGE_POLL_INTERVAL_MS")? {
            Some(ms) => Duration::from_millis(ms),
            None => defaults.poll_interval,
        };
        let max_poll_attempts = read_num::<u32>("JUDGE_MAX_POLL_ATTEMPTS")?
            .unwrap_or(defaults.max_poll_attempts)
            .max(1);
        // retries after the first attempt; 0 disables retrying
        let submit_retries =
            read_num::<u32>("JUDGE_SUBMIT_RETRIES")?.unwrap_or(defaults.submit_retries);
        let max_parallel_cases = read_num::<usize>("JUDGE_MAX_PARALLEL_CASES")?
            .unwrap_or(defaults.max_parallel_cases)
            .max(1);

        let database_url = std::env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        Ok(Self {
            sandbox_url,
            sandbox_auth_token,
            request_timeout,
            poll_interval,
            max_poll_attempts,
            submit_retries,
            max_parallel_cases,
            database_url,
        })
    }
}

fn read_num<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => {
            let t = raw.trim();
            if t.is_empty() {
                return Ok(None);
            }
            t.parse::<T>()
                .map(Some)
                .map_err(|_| ConfigError::Invalid {
                    key,
                    value: raw.clone(),
                })
        }
        Err(_) => Ok(None),
    }
}
