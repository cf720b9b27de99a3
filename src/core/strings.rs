// src/core/strings.rs
//
// Small text and set helpers shared by the parsers and the enabled-set tracker.

/// Splits `s` on `delim`, dropping the empty pieces produced by runs of
/// delimiters or by leading/trailing ones.
pub fn split_words(s: &str, delim: char) -> Vec<&str> {
    s.split(delim).filter(|part| !part.is_empty()).collect()
}

/// Removes every trailing occurrence of `ch`.
pub fn strip_trailing(s: &str, ch: char) -> &str {
    s.trim_end_matches(ch)
}

/// Removes trailing slashes, leaving a lone `/` intact.
pub fn strip_trailing_slashes(path: &str) -> &str {
    let stripped = path.trim_end_matches('/');
    if stripped.is_empty() && path.starts_with('/') {
        "/"
    } else {
        stripped
    }
}

/// Drops backslash escapes: each `\` disappears and the character after it is
/// kept literally. A dangling backslash at the end is dropped.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => break,
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Sorted union of two lists with every element kept exactly once.
pub fn merge_unique<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> Vec<String> {
    let mut merged: Vec<String> = a
        .iter()
        .map(|s| s.as_ref().to_string())
        .chain(b.iter().map(|s| s.as_ref().to_string()))
        .collect();
    merged.sort();
    merged.dedup();
    merged
}

/// Wraps `value` in double quotes, escaping the double quotes inside it.
pub fn wrap_value(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Prints one entry per line on stdout.
pub fn print_lines<S: AsRef<str>>(lines: &[S]) {
    for line in lines {
        println!("{}", line.as_ref());
    }
}
