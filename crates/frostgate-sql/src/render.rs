//! Rendering helpers for identifiers and literals.

/// Whether an identifier can be written without quotes.
pub fn is_bare_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Render an identifier, double-quoting it unless it is a plain word.
pub fn quote_identifier(ident: &str) -> String {
    if is_bare_identifier(ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

/// Render a dotted name from its parts.
pub fn qualified_name<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| quote_identifier(p.as_ref()))
        .collect::<Vec<_>>()
        .join(".")
}

/// Render a single-quoted string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Render a parenthesized list of string literals.
pub fn string_list_literal<S: AsRef<str>>(items: &[S]) -> String {
    let rendered: Vec<String> = items.iter().map(|i| string_literal(i.as_ref())).collect();
    format!("({})", rendered.join(", "))
}

/// Wrap a routine body in `$$` quotes.
///
/// Returns `None` when the body itself contains `$$`, which would end the
/// quoted block early.
pub fn dollar_quote(body: &str) -> Option<String> {
    if body.contains("$$") {
        None
    } else {
        Some(format!("$$\n{}\n$$", body))
    }
}
