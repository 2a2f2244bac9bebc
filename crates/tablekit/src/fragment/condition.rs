//! WHERE conditions and SET assignments.

use super::Render;
use crate::error::{TableError, TableResult};
use crate::ident;
use crate::statement::Statement;
use crate::value::Value;

const COMPARISON_OPS: &[&str] = &["=", "!=", "<>", "<", "<=", ">", ">=", "LIKE", "NOT LIKE"];

/// A boolean SQL fragment.
///
/// Raw conditions are opaque text and are not parsed or validated.
/// Comparisons built with [`Condition::compare`] bind their value.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(Statement);

impl Condition {
    /// Opaque condition text, e.g. `"age > 18"`.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self(Statement::new(sql))
    }

    /// `<column> <op> <value>` with the value bound.
    pub fn compare(column: &str, op: &str, value: impl Into<Value>) -> TableResult<Self> {
        ident::validate("column", column)?;
        let op = op.trim();
        if !COMPARISON_OPS.iter().any(|known| known.eq_ignore_ascii_case(op)) {
            return Err(TableError::validation(format!(
                "unsupported comparison operator '{op}'"
            )));
        }

        let mut sql = Statement::new(column);
        sql.push(" ").push(op).push(" ").push_bind(value);
        Ok(Self(sql))
    }

    pub fn eq(column: &str, value: impl Into<Value>) -> TableResult<Self> {
        Self::compare(column, "=", value)
    }

    pub fn is_null(column: &str) -> TableResult<Self> {
        ident::validate("column", column)?;
        Ok(Self::raw(format!("{column} IS NULL")))
    }

    pub fn is_not_null(column: &str) -> TableResult<Self> {
        ident::validate("column", column)?;
        Ok(Self::raw(format!("{column} IS NOT NULL")))
    }
}

impl Render for Condition {
    fn render_into(&self, out: &mut Statement) {
        out.push_statement(&self.0);
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Self::raw(sql)
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Self::raw(sql)
    }
}

/// Boolean connector placed before a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_str(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// Ordered conditions joined by caller-chosen connectors.
///
/// The connector attached to the first condition is never rendered.
///
/// ```ignore
/// let where_ = Conditions::new().and("age > 18").or("name = 'root'");
/// // age > 18 OR name = 'root'
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    items: Vec<(Connector, Condition)>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, connector: Connector, condition: impl Into<Condition>) -> &mut Self {
        self.items.push((connector, condition.into()));
        self
    }

    pub fn and(mut self, condition: impl Into<Condition>) -> Self {
        self.push(Connector::And, condition);
        self
    }

    pub fn or(mut self, condition: impl Into<Condition>) -> Self {
        self.push(Connector::Or, condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl Render for Conditions {
    fn render_into(&self, out: &mut Statement) {
        for (i, (connector, condition)) in self.items.iter().enumerate() {
            if i > 0 {
                out.push(" ").push(connector.as_str()).push(" ");
            }
            condition.render_into(out);
        }
    }
}

impl From<Condition> for Conditions {
    fn from(condition: Condition) -> Self {
        Self::new().and(condition)
    }
}

impl From<&str> for Conditions {
    fn from(sql: &str) -> Self {
        Self::new().and(sql)
    }
}

impl<C: Into<Condition>> FromIterator<C> for Conditions {
    /// Collects with `AND` between every condition.
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        let mut conditions = Self::new();
        for condition in iter {
            conditions.push(Connector::And, condition);
        }
        conditions
    }
}

/// One entry of an UPDATE's SET list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment(Statement);

impl Assignment {
    /// `<column> = <value>` with the value bound.
    pub fn set(column: &str, value: impl Into<Value>) -> TableResult<Self> {
        ident::validate("column", column)?;
        let mut sql = Statement::new(column);
        sql.push(" = ").push_bind(value);
        Ok(Self(sql))
    }

    /// Opaque assignment text, e.g. `"visits = visits + 1"`.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self(Statement::new(sql))
    }
}

impl Render for Assignment {
    fn render_into(&self, out: &mut Statement) {
        out.push_statement(&self.0);
    }
}

impl From<&str> for Assignment {
    fn from(sql: &str) -> Self {
        Self::raw(sql)
    }
}

impl From<String> for Assignment {
    fn from(sql: String) -> Self {
        Self::raw(sql)
    }
}
