//! Secret set codec: the plaintext layout inside the sealed blob.
//!
//! One `name=value` pair per line, names in ascending order so the same
//! set always serializes to the same bytes. Values are escaped so they may
//! contain `=`, newlines, and backslashes:
//!
//! ```text
//! \        ->  \\
//! newline  ->  \n
//! =        ->  \=
//! ```
//!
//! On parse, blank lines and `#`-prefixed lines are ignored and a line
//! without a `=` separator is skipped: one corrupt line must not take the
//! rest of the set with it.

use std::collections::BTreeMap;

/// Serialize a secret set to the deterministic line format.
pub fn serialize(secrets: &BTreeMap<String, String>) -> Vec<u8> {
    let mut lines = Vec::with_capacity(secrets.len());
    for (name, value) in secrets {
        lines.push(format!("{name}={}", escape(value)));
    }
    lines.join("\n").into_bytes()
}

/// Parse the line format back into a secret set.
pub fn parse(data: &[u8]) -> BTreeMap<String, String> {
    let mut secrets = BTreeMap::new();
    let text = String::from_utf8_lossy(data);

    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Escaped values never contain a raw '=', so the first one on the
        // line is always the separator.
        if let Some((name, value)) = line.split_once('=') {
            secrets.insert(name.trim().to_string(), unescape(value));
        }
    }

    secrets
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '=' => out.push_str("\\="),
            other => out.push(other),
        }
    }
    out
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('=') => out.push('='),
            // Unknown escape: keep both characters rather than guess.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
