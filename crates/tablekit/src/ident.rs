//! Identifier checks for names that are spliced into SQL text.
//!
//! Identifiers cannot be bound as parameters, so table, column and constraint
//! names are validated before they reach a statement:
//!
//! - bare segments match `[A-Za-z_][A-Za-z0-9_$]*`
//! - quoted segments (`"Name"` or `` `Name` ``) may hold anything but NUL; their
//!   own quote character is written doubled (`"a""b"`)
//! - segments may be dotted (`schema.table`)

use crate::error::{TableError, TableResult};

/// Validate `name` as an identifier and return it unchanged.
pub fn validate<'a>(what: &str, name: &'a str) -> TableResult<&'a str> {
    if name.is_empty() {
        return Err(TableError::validation(format!("{what} name cannot be empty")));
    }
    if name.contains('\0') {
        return Err(TableError::validation(format!(
            "{what} name cannot contain NUL character"
        )));
    }

    let mut rest = name;
    loop {
        rest = segment(what, name, rest)?;
        match rest.strip_prefix('.') {
            Some("") => {
                return Err(TableError::validation(format!(
                    "Trailing '.' in {what} name '{name}'"
                )));
            }
            Some(next) => rest = next,
            None if rest.is_empty() => return Ok(name),
            None => {
                return Err(TableError::validation(format!(
                    "Invalid {what} name '{name}'"
                )));
            }
        }
    }
}

/// Consume one segment from the front of `rest`, returning what follows it.
fn segment<'a>(what: &str, name: &str, rest: &'a str) -> TableResult<&'a str> {
    let invalid = || TableError::validation(format!("Invalid {what} name '{name}'"));

    let Some(first) = rest.chars().next() else {
        return Err(invalid());
    };

    if first == '"' || first == '`' {
        let body = &rest[1..];
        let mut offset = 0;
        loop {
            let end = body[offset..]
                .find(first)
                .map(|i| offset + i)
                .ok_or_else(|| {
                    TableError::validation(format!("Unclosed quoted {what} name '{name}'"))
                })?;
            // Doubled quote: an escaped quote inside the segment.
            if body[end + 1..].starts_with(first) {
                offset = end + 2;
                continue;
            }
            if end == 0 {
                return Err(invalid());
            }
            return Ok(&body[end + 1..]);
        }
    }

    if !(first == '_' || first.is_ascii_alphabetic()) {
        return Err(invalid());
    }
    let end = rest
        .find(|c: char| !(c == '_' || c == '$' || c.is_ascii_alphanumeric()))
        .unwrap_or(rest.len());
    Ok(&rest[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_dotted_and_quoted() {
        assert_eq!(validate("table", "People").unwrap(), "People");
        assert!(validate("table", "public.people").is_ok());
        assert!(validate("table", r#"public."Camel Case""#).is_ok());
        assert!(validate("table", "`order`").is_ok());
        assert!(validate("column", "my_var$1").is_ok());
    }

    #[test]
    fn doubled_quotes_stay_inside_the_segment() {
        assert!(validate("table", r#""a""b""#).is_ok());
        assert!(validate("table", r#""""""#).is_ok());
        assert!(validate("table", r#"public."say ""hi""".x"#).is_ok());
        assert!(validate("column", "`back``tick`").is_ok());

        assert!(validate("table", r#""a""b"#).is_err());
        assert!(validate("table", r#""a"" ; DROP TABLE x"#).is_err());
        assert!(validate("table", r#""a" "b""#).is_err());
    }

    #[test]
    fn rejects_injection_shapes() {
        assert!(validate("table", "").is_err());
        assert!(validate("table", "1table").is_err());
        assert!(validate("table", "my table").is_err());
        assert!(validate("table", "people; DROP TABLE x").is_err());
        assert!(validate("table", "schema..table").is_err());
        assert!(validate("table", "schema.").is_err());
        assert!(validate("table", r#""unclosed"#).is_err());
        assert!(validate("table", r#""""#).is_err());
    }
}
