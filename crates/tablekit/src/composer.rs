//! Generic text assembly: separators go between elements, never after them.

/// Join `fragments` with `separator`. Empty input yields an empty string.
pub fn join<I, S>(fragments: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, fragment) in fragments.into_iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(fragment.as_ref());
    }
    out
}

/// Surround `body` with `prefix` and `suffix`.
pub fn wrap(body: &str, prefix: &str, suffix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + body.len() + suffix.len());
    out.push_str(prefix);
    out.push_str(body);
    out.push_str(suffix);
    out
}
