/// Compare produced output with the expected answer.
///
/// Both sides are trimmed at the ends only. Internal whitespace, line endings
/// and number formatting must match exactly; there is no numeric tolerance.
pub fn compare(expected: &str, actual: &str) -> bool {
    expected.trim() == actual.trim()
}
