//! Statement buffer.
//!
//! A [`Statement`] stores SQL pieces and bound values separately. The same
//! statement renders with placeholders for execution ([`Statement::to_sql`])
//! or with quoted literals for logs and tests ([`Statement::to_inline_sql`]).
//!
//! # Example
//!
//! ```ignore
//! use tablekit::{Dialect, Statement};
//!
//! let mut s = Statement::new("UPDATE People SET name = ");
//! s.push_bind("Bo").push(" WHERE id = ").push_bind(2);
//!
//! assert_eq!(s.to_sql(Dialect::Postgres), "UPDATE People SET name = $1 WHERE id = $2");
//! assert_eq!(s.to_inline_sql(Dialect::MySql), r#"UPDATE People SET name = "Bo" WHERE id = "2""#);
//! ```

use crate::dialect::Dialect;
use crate::fragment::Render;
use crate::value::Value;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Raw(String),
    Param,
}

/// The kind of statement, detected from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Create,
    Alter,
    Drop,
    Insert,
    Select,
    Update,
    Delete,
    /// `SET ...` and other session-level statements
    Session,
    Other,
}

impl StatementKind {
    /// Detect the kind from the first keyword of `sql`.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("");

        match keyword.to_ascii_uppercase().as_str() {
            "CREATE" => StatementKind::Create,
            "ALTER" => StatementKind::Alter,
            "DROP" => StatementKind::Drop,
            "INSERT" => StatementKind::Insert,
            "SELECT" => StatementKind::Select,
            "UPDATE" => StatementKind::Update,
            "DELETE" => StatementKind::Delete,
            "SET" => StatementKind::Session,
            _ => StatementKind::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Create => "create",
            StatementKind::Alter => "alter",
            StatementKind::Drop => "drop",
            StatementKind::Insert => "insert",
            StatementKind::Select => "select",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Session => "session",
            StatementKind::Other => "other",
        }
    }

    /// Whether the statement is expected to produce rows.
    pub fn returns_rows(self) -> bool {
        matches!(self, StatementKind::Select)
    }
}

/// A SQL statement with its bound values.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Statement {
    parts: Vec<Part>,
    params: Vec<Value>,
}

impl Statement {
    /// Create a new statement with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty statement.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(Part::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(Part::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(Part::Param);
        self.params.push(value.into());
        self
    }

    /// Append a copy of another statement, keeping its bound values in order.
    pub fn push_statement(&mut self, other: &Statement) -> &mut Self {
        for part in &other.parts {
            match part {
                Part::Raw(sql) => {
                    self.push(sql);
                }
                Part::Param => self.parts.push(Part::Param),
            }
        }
        self.params.extend(other.params.iter().cloned());
        self
    }

    /// Append a single fragment.
    pub fn push_fragment<R: Render + ?Sized>(&mut self, fragment: &R) -> &mut Self {
        fragment.render_into(self);
        self
    }

    /// Append fragments with `separator` between them.
    pub fn push_joined<'a, R, I>(&mut self, fragments: I, separator: &str) -> &mut Self
    where
        R: Render + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        for (i, fragment) in fragments.into_iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            fragment.render_into(self);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, Part::Raw(s) if s.is_empty()))
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }

    /// Statement kind, from the leading keyword.
    pub fn kind(&self) -> StatementKind {
        match self.parts.first() {
            Some(Part::Raw(sql)) => StatementKind::from_sql(sql),
            _ => StatementKind::Other,
        }
    }

    /// Render SQL with the dialect's placeholders.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut out = String::with_capacity(self.raw_len() + self.params.len() * 3);
        let mut idx = 0;
        for part in &self.parts {
            match part {
                Part::Raw(s) => out.push_str(s),
                Part::Param => {
                    idx += 1;
                    dialect.write_placeholder(&mut out, idx);
                }
            }
        }
        out
    }

    /// Render SQL with every bound value written as a quoted literal.
    ///
    /// Meant for logs and assertions; execution always goes through [`Statement::to_sql`].
    pub fn to_inline_sql(&self, dialect: Dialect) -> String {
        let mut out = String::with_capacity(self.raw_len() + self.params.len() * 8);
        let mut values = self.params.iter();
        for part in &self.parts {
            match part {
                Part::Raw(s) => out.push_str(s),
                Part::Param => {
                    if let Some(value) = values.next() {
                        value.write_inline(dialect, &mut out);
                    }
                }
            }
        }
        out
    }

    fn raw_len(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                Part::Raw(s) => s.len(),
                Part::Param => 0,
            })
            .sum()
    }
}
