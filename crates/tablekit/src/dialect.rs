//! SQL dialect differences the builders care about.

use std::fmt::Write;

/// Target SQL dialect.
///
/// The dialect decides how bound values are written: as `$n` / `?` placeholders
/// when a statement is executed, or as quoted literals when it is rendered for
/// display. It also owns the statements that toggle foreign key enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
}

impl Dialect {
    /// Append the placeholder for the 1-based parameter `index`.
    pub fn write_placeholder(self, out: &mut String, index: usize) {
        match self {
            Dialect::Postgres => {
                let _ = write!(out, "${index}");
            }
            Dialect::MySql => out.push('?'),
        }
    }

    /// Append `text` as a quoted string literal, escaping quote characters.
    pub fn write_literal(self, out: &mut String, text: &str) {
        match self {
            Dialect::Postgres => {
                out.push('\'');
                for ch in text.chars() {
                    if ch == '\'' {
                        out.push_str("''");
                    } else {
                        out.push(ch);
                    }
                }
                out.push('\'');
            }
            Dialect::MySql => {
                out.push('"');
                for ch in text.chars() {
                    match ch {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        _ => out.push(ch),
                    }
                }
                out.push('"');
            }
        }
    }

    /// Statement that turns foreign key enforcement on or off for the session.
    ///
    /// PostgreSQL has no such switch: `DROP TABLE` there checks dependencies
    /// regardless of session settings, so drops with checks disabled use
    /// `CASCADE` instead (see [`Dialect::cascades_drops`]).
    pub fn foreign_key_checks(self, enabled: bool) -> Option<&'static str> {
        match (self, enabled) {
            (Dialect::MySql, false) => Some("SET FOREIGN_KEY_CHECKS=0"),
            (Dialect::MySql, true) => Some("SET FOREIGN_KEY_CHECKS=1"),
            (Dialect::Postgres, _) => None,
        }
    }

    /// Whether a drop with foreign key checks disabled is written as
    /// `DROP TABLE <t> CASCADE`.
    pub fn cascades_drops(self) -> bool {
        self == Dialect::Postgres
    }
}
