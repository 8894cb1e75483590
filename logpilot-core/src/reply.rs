// Line grammar shared by the model-reply parsers.
//
// Replies are free text. Every parser walks the reply one trimmed line at a
// time and recognises three shapes: `Label: value` fields (label matched
// case-insensitively), `- item` bullets, and anything else, which is ignored.

/// Trimmed, non-empty lines of a model reply.
pub fn reply_lines(reply: &str) -> impl Iterator<Item = &str> {
    reply.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Case-insensitive ASCII prefix test that never splits a UTF-8 character.
pub fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

/// Value of a `label: value` line, trimmed. `label` includes the colon.
pub fn field_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    if starts_with_ignore_case(line, label) {
        Some(line[label.len()..].trim())
    } else {
        None
    }
}

/// Text of a `- item` bullet, trimmed.
pub fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ").map(str::trim)
}

/// Keep the first value seen for a field; later duplicates are ignored.
pub fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

/// Fallback-to-raw: an absent or empty field is replaced by the whole reply.
pub fn or_raw(value: Option<String>, raw: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => raw.to_string(),
    }
}
