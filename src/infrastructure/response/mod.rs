use once_cell::sync::Lazy;
use regex::Regex;

static SQL_FENCE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"```sql").unwrap());

static FENCE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"```").unwrap());

/// Cleans raw LLM output into a single-line SQL statement: strips markdown
/// fencing and collapses all whitespace runs (including newlines) into
/// single spaces. Idempotent; may legitimately return an empty string.
pub fn clean_sql(raw: &str) -> String {
    let cleaned = SQL_FENCE_PATTERN.replace_all(raw, "");
    let cleaned = FENCE_PATTERN.replace_all(&cleaned, "");

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
