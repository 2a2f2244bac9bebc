//! Typed, renderable pieces of SQL statements.
//!
//! Every fragment implements [`Render`], which writes it into a
//! [`Statement`]. Heterogeneous lists use the [`Fragment`] sum type so a
//! single ordered sequence can mix field definitions, value tuples, column
//! lists and conditions.

mod condition;
mod field;

pub use condition::{Assignment, Condition, Conditions, Connector};
pub use field::{FieldDefinition, attrs, check, foreign_key, primary_key, types, unique};

use crate::composer;
use crate::dialect::Dialect;
use crate::error::TableResult;
use crate::ident;
use crate::statement::Statement;
use crate::value::Value;
use serde::Serialize;

/// Something that can write itself into a statement.
pub trait Render {
    fn render_into(&self, out: &mut Statement);
}

impl Render for str {
    fn render_into(&self, out: &mut Statement) {
        out.push(self);
    }
}

impl Render for String {
    fn render_into(&self, out: &mut Statement) {
        out.push(self);
    }
}

/// One element of a heterogeneous fragment list.
#[derive(Debug, Clone)]
pub enum Fragment {
    Field(FieldDefinition),
    Values(ValueTuple),
    Columns(OutputColumns),
    Condition(Condition),
    Raw(String),
}

impl Render for Fragment {
    fn render_into(&self, out: &mut Statement) {
        match self {
            Fragment::Field(field) => field.render_into(out),
            Fragment::Values(values) => values.render_into(out),
            Fragment::Columns(columns) => columns.render_into(out),
            Fragment::Condition(condition) => condition.render_into(out),
            Fragment::Raw(sql) => sql.render_into(out),
        }
    }
}

impl From<FieldDefinition> for Fragment {
    fn from(field: FieldDefinition) -> Self {
        Fragment::Field(field)
    }
}

impl From<ValueTuple> for Fragment {
    fn from(values: ValueTuple) -> Self {
        Fragment::Values(values)
    }
}

impl From<OutputColumns> for Fragment {
    fn from(columns: OutputColumns) -> Self {
        Fragment::Columns(columns)
    }
}

impl From<Condition> for Fragment {
    fn from(condition: Condition) -> Self {
        Fragment::Condition(condition)
    }
}

/// Projection list of a SELECT; renders `*` when empty.
///
/// Names are checked as identifiers before the SELECT is sent. Use
/// [`OutputColumns::raw`] for expressions such as `count(*)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputColumns {
    columns: Vec<String>,
    raw: bool,
}

impl OutputColumns {
    /// `*`
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            raw: false,
        }
    }

    /// Projection items written by hand and sent without identifier checks.
    pub fn raw<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            raw: true,
            ..Self::new(items)
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Reject any name that is neither `*` nor a valid identifier.
    pub fn validate(&self) -> TableResult<()> {
        if self.raw {
            return Ok(());
        }
        for column in &self.columns {
            if column != "*" {
                ident::validate("column", column)?;
            }
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            "*".to_string()
        } else {
            composer::join(&self.columns, ", ")
        }
    }
}

impl Render for OutputColumns {
    fn render_into(&self, out: &mut Statement) {
        if self.columns.is_empty() {
            out.push("*");
        } else {
            out.push_joined(&self.columns, ", ");
        }
    }
}

impl From<&str> for OutputColumns {
    fn from(column: &str) -> Self {
        if column == "*" {
            Self::all()
        } else {
            Self::new([column])
        }
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for OutputColumns {
    fn from(columns: [S; N]) -> Self {
        Self::new(columns)
    }
}

/// One row of values for an INSERT, positionally matching its column list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueTuple(Vec<Value>);

impl ValueTuple {
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Append one value (handy for mixed types).
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.0.push(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// `("v1", "v2")` in MySQL, `('v1', 'v2')` in PostgreSQL.
    pub fn render_inline(&self, dialect: Dialect) -> String {
        let mut out = Statement::empty();
        self.render_into(&mut out);
        out.to_inline_sql(dialect)
    }
}

impl Render for ValueTuple {
    fn render_into(&self, out: &mut Statement) {
        out.push("(");
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(", ");
            }
            out.push_bind(value.clone());
        }
        out.push(")");
    }
}

impl From<Vec<Value>> for ValueTuple {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl<V: Into<Value>, const N: usize> From<[V; N]> for ValueTuple {
    fn from(values: [V; N]) -> Self {
        Self::new(values)
    }
}
