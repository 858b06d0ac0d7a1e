pub mod submission;
pub mod test_case;
pub mod user_progress;
