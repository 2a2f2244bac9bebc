//! Query results as ordered rows of text cells.

use crate::error::GatewayError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use tokio_postgres::SimpleQueryMessage;
use tokio_postgres::types::{FromSql, Type};

/// One result row; `None` is SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row(Vec<Option<String>>);

impl Row {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self(values)
    }

    /// Cell text at `index`; `None` when NULL or out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|v| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Option<String>> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<Option<S>> for Row {
    fn from_iter<T: IntoIterator<Item = Option<S>>>(iter: T) -> Self {
        Self(iter.into_iter().map(|v| v.map(Into::into)).collect())
    }
}

/// Ordered rows in the order the database delivered them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rowset {
    columns: Vec<String>,
    rows: Vec<Row>,
    affected: u64,
}

impl Rowset {
    /// Empty result, as produced by statements that return no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a rowset, checking every row against the column count.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, GatewayError> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(GatewayError::Decode {
                column: format!("row {index}"),
                message: format!("expected {} cells, got {}", columns.len(), row.len()),
            });
        }
        Ok(Self {
            columns,
            rows,
            affected: 0,
        })
    }

    /// Record how many rows the statement touched.
    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows inserted, updated or deleted, when the gateway reports it.
    pub fn affected(&self) -> u64 {
        self.affected
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Rows keyed by their 0-based position.
    pub fn indexed(&self) -> BTreeMap<usize, Row> {
        self.rows.iter().cloned().enumerate().collect()
    }

    /// Collect a simple-protocol response (all cells arrive as text).
    pub(crate) fn from_simple_query(
        messages: Vec<SimpleQueryMessage>,
    ) -> Result<Self, GatewayError> {
        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Row> = Vec::new();
        let mut affected = 0;

        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(description) => {
                    columns = description.iter().map(|c| c.name().to_string()).collect();
                }
                SimpleQueryMessage::Row(row) => {
                    if columns.is_empty() {
                        columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                    }
                    rows.push((0..row.len()).map(|i| row.get(i)).collect());
                }
                SimpleQueryMessage::CommandComplete(n) => affected += n,
                _ => {}
            }
        }

        Ok(Self::from_parts(columns, rows)?.with_affected(affected))
    }

    /// Collect extended-protocol rows, decoding every cell to text.
    pub(crate) fn from_rows(rows: &[tokio_postgres::Row]) -> Result<Self, GatewayError> {
        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for (i, column) in row.columns().iter().enumerate() {
                let cell: CellText = row.try_get(i).map_err(|e| GatewayError::Decode {
                    column: column.name().to_string(),
                    message: e.source().map_or_else(|| e.to_string(), ToString::to_string),
                })?;
                cells.push(cell.0);
            }
            out.push(Row::new(cells));
        }

        Self::from_parts(columns, out)
    }
}

impl<'a> IntoIterator for &'a Rowset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for Rowset {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Text rendering of a binary-format cell.
struct CellText(Option<String>);

type DecodeResult<T> = Result<T, Box<dyn Error + Sync + Send>>;

fn decode_text(ty: &Type, raw: &[u8]) -> DecodeResult<String> {
    macro_rules! via {
        ($t:ty) => {
            <$t as FromSql>::from_sql(ty, raw)?.to_string()
        };
    }

    let text = if *ty == Type::BOOL {
        via!(bool)
    } else if *ty == Type::INT2 {
        via!(i16)
    } else if *ty == Type::INT4 {
        via!(i32)
    } else if *ty == Type::INT8 {
        via!(i64)
    } else if *ty == Type::OID {
        via!(u32)
    } else if *ty == Type::FLOAT4 {
        via!(f32)
    } else if *ty == Type::FLOAT8 {
        via!(f64)
    } else if *ty == Type::DATE {
        via!(chrono::NaiveDate)
    } else if *ty == Type::TIME {
        via!(chrono::NaiveTime)
    } else if *ty == Type::TIMESTAMP {
        via!(chrono::NaiveDateTime)
    } else if *ty == Type::TIMESTAMPTZ {
        <chrono::DateTime<chrono::Utc> as FromSql>::from_sql(ty, raw)?.to_rfc3339()
    } else if *ty == Type::UUID {
        via!(uuid::Uuid)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        via!(serde_json::Value)
    } else if numeric(ty) {
        decode_numeric(ty, raw)?
    } else if <String as FromSql>::accepts(ty) {
        <String as FromSql>::from_sql(ty, raw)?
    } else {
        return Err(format!("unsupported column type {ty}").into());
    };
    Ok(text)
}

fn numeric(ty: &Type) -> bool {
    *ty == Type::NUMERIC
}

#[cfg(feature = "rust_decimal")]
fn decode_numeric(ty: &Type, raw: &[u8]) -> DecodeResult<String> {
    Ok(<rust_decimal::Decimal as FromSql>::from_sql(ty, raw)?.to_string())
}

#[cfg(not(feature = "rust_decimal"))]
fn decode_numeric(_ty: &Type, _raw: &[u8]) -> DecodeResult<String> {
    Err("NUMERIC cells need the `rust_decimal` feature".into())
}

impl<'a> FromSql<'a> for CellText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> DecodeResult<Self> {
        decode_text(ty, raw).map(|text| CellText(Some(text)))
    }

    fn from_sql_null(_ty: &Type) -> DecodeResult<Self> {
        Ok(CellText(None))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[Option<&str>]) -> Row {
        cells.iter().copied().collect()
    }

    #[test]
    fn rows_must_match_column_count() {
        let ok = Rowset::from_parts(
            vec!["id".into(), "name".into()],
            vec![row(&[Some("1"), Some("Ann")]), row(&[Some("2"), None])],
        )
        .unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.rows()[1].get(1), None);
        assert_eq!(ok.column_index("name"), Some(1));

        let err = Rowset::from_parts(vec!["id".into()], vec![row(&[Some("1"), Some("x")])]);
        assert!(matches!(err, Err(GatewayError::Decode { .. })));
    }

    #[test]
    fn indexed_keeps_delivery_order() {
        let set = Rowset::from_parts(
            vec!["name".into()],
            vec![row(&[Some("Bo")]), row(&[Some("Ann")])],
        )
        .unwrap();

        let indexed = set.indexed();
        assert_eq!(indexed[&0].get(0), Some("Bo"));
        assert_eq!(indexed[&1].get(0), Some("Ann"));
    }

    #[test]
    fn binary_cells_decode_to_text() {
        assert_eq!(decode_text(&Type::INT4, &42_i32.to_be_bytes()).unwrap(), "42");
        assert_eq!(decode_text(&Type::BOOL, &[1]).unwrap(), "true");
        assert_eq!(decode_text(&Type::VARCHAR, b"Ann").unwrap(), "Ann");
        assert!(decode_text(&Type::POINT, &[0; 16]).is_err());
    }

    #[test]
    fn serializes_as_plain_structure() {
        let set = Rowset::from_parts(vec!["name".into()], vec![row(&[Some("Ann")])]).unwrap();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["columns"][0], "name");
        assert_eq!(json["rows"][0][0], "Ann");
    }
}
