pub mod progress_repo;
pub mod submission_repo;
pub mod test_case_repo;

pub use progress_repo::ProgressRepository;
pub use submission_repo::SubmissionRepository;
pub use test_case_repo::{TestCaseRepository, TestCaseSeed};
