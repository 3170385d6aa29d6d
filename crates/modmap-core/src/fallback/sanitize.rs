//! Neutralises module-derived text before it is interpolated into agent instructions.

/// Maximum length, in characters, of a sanitized value.
pub const MAX_SANITIZED_LEN: usize = 200;

const STRIPPED: &[char] = &['{', '}', '<', '>', '`', '\'', '"', '='];

/// Collapse line breaks to a single space, drop other control characters and
/// prompt-structure characters, then truncate.
///
/// Identifier punctuation (`-`, `.`, `:`, `/`, `\`, `@`, spaces) is preserved.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_SANITIZED_LEN));
    let mut in_break = false;
    for ch in input.chars() {
        if ch == '\r' || ch == '\n' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
            continue;
        }
        in_break = false;
        if ch.is_control() || STRIPPED.contains(&ch) {
            continue;
        }
        out.push(ch);
    }
    out.chars().take(MAX_SANITIZED_LEN).collect()
}
