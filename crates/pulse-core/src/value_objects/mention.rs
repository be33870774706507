//! Mention extraction from post and comment bodies
//!
//! An `@name` token starts at `@` and runs over `[A-Za-z0-9_]`.
//! Duplicate mentions of the same name collapse to one entry.

/// Extract distinct mentioned usernames from a text body, in first-seen order.
///
/// Returns names without the leading `@`. A bare `@` with no word
/// characters after it is ignored.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '@' {
            continue;
        }

        let mut name = String::new();
        while let Some(&(_, next)) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }

        if !name.is_empty() && !found.iter().any(|n| n == &name) {
            found.push(name);
        }
    }

    found
}
