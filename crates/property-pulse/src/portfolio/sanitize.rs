//! Text hygiene for values that arrive from clients or end up on screen.

/// Strips ASCII control characters and collapses whitespace runs to a single
/// space, trimming both ends.
///
/// Tab, newline and carriage return survive the control-character pass and are
/// then folded into spaces with the rest of the whitespace. The byte order mark
/// counts as whitespace; NEL (U+0085) does not.
pub fn sanitize_text(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| !is_stripped_control(*c)).collect();
    stripped
        .split(is_collapsed_whitespace)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escapes the characters that are unsafe inside HTML text or attributes.
pub fn sanitize_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn is_collapsed_whitespace(c: char) -> bool {
    match c {
        '\u{FEFF}' => true,
        '\u{85}' => false,
        other => other.is_whitespace(),
    }
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}
