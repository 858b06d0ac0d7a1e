use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Run {
        problem_id: i32,
        language: String,
        source: PathBuf,
    },
    Submit {
        user_id: i32,
        problem_id: i32,
        language: String,
        source: PathBuf,
    },
    Progress {
        user_id: i32,
    },
    History {
        user_id: i32,
    },
    Seed {
        file: PathBuf,
    },
    Help,
    Unknown(String),
}

pub const USAGE: &str = "commands: run <problem_id> <language> <source_file> | submit <user_id> <problem_id> <language> <source_file> | progress <user_id> | history <user_id> | seed <test_cases.json> | help";

impl AppCommand {
    /// Parse already-split arguments. Paths are taken verbatim, spaces included.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let parts: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        if parts.is_empty() {
            return AppCommand::Help;
        }

        let id = |i: usize| parts.get(i).and_then(|s| s.trim().parse::<i32>().ok());

        match parts[0] {
            "run" => match (id(1), parts.get(2), parts.get(3)) {
                (Some(problem_id), Some(lang), Some(file)) => AppCommand::Run {
                    problem_id,
                    language: lang.to_string(),
                    source: PathBuf::from(file),
                },
                _ => AppCommand::Unknown(
                    "usage: run <problem_id> <language> <source_file>".to_string(),
                ),
            },
            "submit" => match (id(1), id(2), parts.get(3), parts.get(4)) {
                (Some(user_id), Some(problem_id), Some(lang), Some(file)) => AppCommand::Submit {
                    user_id,
                    problem_id,
                    language: lang.to_string(),
                    source: PathBuf::from(file),
                },
                _ => AppCommand::Unknown(
                    "usage: submit <user_id> <problem_id> <language> <source_file>".to_string(),
                ),
            },
            "progress" => match id(1) {
                Some(user_id) => AppCommand::Progress { user_id },
                None => AppCommand::Unknown("usage: progress <user_id>".to_string()),
            },
            "history" | "submissions" => match id(1) {
                Some(user_id) => AppCommand::History { user_id },
                None => AppCommand::Unknown("usage: history <user_id>".to_string()),
            },
            "seed" => match parts.get(1) {
                Some(file) => AppCommand::Seed {
                    file: PathBuf::from(file),
                },
                None => AppCommand::Unknown("usage: seed <test_cases.json>".to_string()),
            },
            "help" | "h" | "-h" | "--help" => AppCommand::Help,
            other => AppCommand::Unknown(format!("unknown command: {}", other)),
        }
    }
}

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        Ok(AppCommand::from_args(&parts))
    }
}
