/// Parses a path segment as a project id. Anything that is not a positive
/// 32-bit integer yields `None`.
pub fn parse_project_id(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i32>().ok().filter(|id| *id > 0)
}
