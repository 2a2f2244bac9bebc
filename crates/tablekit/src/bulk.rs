//! Operations spanning several tables.
//!
//! All of them are fail-fast: the first failing entry stops the run and the
//! error names that entry and how many entries before it were applied. No
//! transaction is opened, so applied entries stay applied.

use crate::error::{TableError, TableResult};
use crate::foreign_keys::{ForeignKeyChecks, with_checks};
use crate::fragment::{Conditions, FieldDefinition, OutputColumns};
use crate::gateway::{Gateway, dispatch};
use crate::ident;
use crate::rowset::Rowset;
use crate::table::{Table, render};

fn stopped_at(entry: &str, succeeded: usize, source: TableError) -> TableError {
    TableError::Bulk {
        entry: entry.to_string(),
        succeeded,
        source: Box::new(source),
    }
}

/// Create every table in iteration order.
///
/// Pass a `BTreeMap<String, Vec<FieldDefinition>>` for name order, or a
/// `Vec` of pairs to choose the order (referenced tables first).
pub async fn create_tables<'g, G, I, N, F>(
    gateway: &'g G,
    specs: I,
) -> TableResult<Vec<Table<'g, G>>>
where
    G: Gateway,
    I: IntoIterator<Item = (N, F)>,
    N: AsRef<str>,
    F: IntoIterator<Item = FieldDefinition>,
{
    let mut tables = Vec::new();
    for (name, fields) in specs {
        let name: &str = name.as_ref();
        match Table::create(gateway, name, fields).await {
            Ok(table) => tables.push(table),
            Err(source) => return Err(stopped_at(name, tables.len(), source)),
        }
    }
    Ok(tables)
}

/// `DROP TABLE` each name in order, optionally with foreign key checks off
/// for the whole run.
///
/// With checks disabled the statements are: disable, every drop, enable. The
/// enable statement is sent even when a drop fails. PostgreSQL has no toggle;
/// there every drop is sent as `DROP TABLE <t> CASCADE`.
pub async fn drop_tables<G, S>(
    gateway: &G,
    names: &[S],
    checks: ForeignKeyChecks,
) -> TableResult<()>
where
    G: Gateway,
    S: AsRef<str>,
{
    for name in names {
        ident::validate("table", name.as_ref())?;
    }

    let scope: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
    let scope = scope.join(",");
    let cascade = checks.cascade(gateway.dialect());

    with_checks(gateway, &scope, checks, async {
        for (succeeded, name) in names.iter().enumerate() {
            let name: &str = name.as_ref();
            let statement = render::drop_table(name, cascade);
            if let Err(source) = dispatch(gateway, name, &statement).await {
                let source = TableError::Schema {
                    table: name.to_string(),
                    source,
                };
                return Err(stopped_at(name, succeeded, source));
            }
        }
        Ok(())
    })
    .await
}

/// One SELECT of a multi-table read.
#[derive(Debug, Clone)]
pub struct TableQuery {
    table: String,
    columns: OutputColumns,
    conditions: Conditions,
}

impl TableQuery {
    /// `SELECT * FROM <table>`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: OutputColumns::all(),
            conditions: Conditions::new(),
        }
    }

    pub fn columns(mut self, columns: impl Into<OutputColumns>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn filter(mut self, conditions: impl Into<Conditions>) -> Self {
        self.conditions = conditions.into();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl From<&str> for TableQuery {
    fn from(table: &str) -> Self {
        Self::new(table)
    }
}

/// Run each query in order and return the rowsets in the same order.
pub async fn select_tables<G, I>(gateway: &G, queries: I) -> TableResult<Vec<Rowset>>
where
    G: Gateway,
    I: IntoIterator,
    I::Item: Into<TableQuery>,
{
    let mut results = Vec::new();
    for query in queries {
        let query: TableQuery = query.into();
        match select_one(gateway, &query).await {
            Ok(rows) => results.push(rows),
            Err(source) => return Err(stopped_at(&query.table, results.len(), source)),
        }
    }
    Ok(results)
}

async fn select_one<G: Gateway>(gateway: &G, query: &TableQuery) -> TableResult<Rowset> {
    let table = ident::validate("table", &query.table)?;
    query.columns.validate()?;
    let statement = render::select(table, &query.columns, &query.conditions);
    dispatch(gateway, table, &statement)
        .await
        .map_err(|source| TableError::Query {
            table: table.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::fragment::types;
    use crate::testing::RecordingGateway;
    use std::collections::BTreeMap;

    fn id_field() -> Vec<FieldDefinition> {
        vec![FieldDefinition::new("id", types::INT)]
    }

    #[tokio::test]
    async fn create_tables_stops_at_first_failure() {
        let gateway = RecordingGateway::new().fail_on("EXISTS B(");
        let err = create_tables(
            &gateway,
            vec![("A", id_field()), ("B", id_field()), ("C", id_field())],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TableError::Bulk { ref entry, succeeded: 1, .. } if entry == "B"));
        assert!(gateway.has_table("A"));
        assert!(!gateway.has_table("C"));
        assert_eq!(gateway.log().len(), 2);
    }

    #[tokio::test]
    async fn create_tables_follows_map_order() {
        let gateway = RecordingGateway::new();
        let specs: BTreeMap<String, Vec<FieldDefinition>> =
            [("B".to_string(), id_field()), ("A".to_string(), id_field())].into();

        let tables = create_tables(&gateway, specs).await.unwrap();
        let names: Vec<_> = tables.iter().map(Table::name).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn drop_tables_brackets_every_drop() {
        let gateway = RecordingGateway::new().with_table("A").with_table("B");
        drop_tables(&gateway, &["A", "B"], ForeignKeyChecks::Disabled)
            .await
            .unwrap();

        assert_eq!(
            gateway.log(),
            [
                "SET FOREIGN_KEY_CHECKS=0",
                "DROP TABLE A",
                "DROP TABLE B",
                "SET FOREIGN_KEY_CHECKS=1",
            ]
        );
    }

    #[tokio::test]
    async fn failed_drop_still_restores_checks() {
        let gateway = RecordingGateway::new()
            .with_table("A")
            .with_table("B")
            .fail_on("DROP TABLE A");

        let err = drop_tables(&gateway, &["A", "B"], ForeignKeyChecks::Disabled)
            .await
            .unwrap_err();

        assert!(matches!(err, TableError::Bulk { ref entry, succeeded: 0, .. } if entry == "A"));
        assert_eq!(
            gateway.log(),
            [
                "SET FOREIGN_KEY_CHECKS=0",
                "DROP TABLE A",
                "SET FOREIGN_KEY_CHECKS=1",
            ]
        );
        assert!(gateway.has_table("B"));
    }

    #[tokio::test]
    async fn postgres_drops_cascade_without_toggles() {
        let gateway = RecordingGateway::new()
            .with_dialect(Dialect::Postgres)
            .with_table("owners")
            .with_table("pets");
        drop_tables(&gateway, &["owners", "pets"], ForeignKeyChecks::Disabled)
            .await
            .unwrap();

        assert_eq!(
            gateway.log(),
            ["DROP TABLE owners CASCADE", "DROP TABLE pets CASCADE"]
        );

        let gateway = RecordingGateway::new()
            .with_dialect(Dialect::Postgres)
            .with_table("owners");
        drop_tables(&gateway, &["owners"], ForeignKeyChecks::Enforced)
            .await
            .unwrap();
        assert_eq!(gateway.log(), ["DROP TABLE owners"]);
    }

    #[tokio::test]
    async fn drop_tables_validates_names_first() {
        let gateway = RecordingGateway::new();
        let err = drop_tables(&gateway, &["A", "B; --"], ForeignKeyChecks::Disabled)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(gateway.log().is_empty());
    }

    #[tokio::test]
    async fn select_tables_returns_rowsets_in_query_order() {
        let gateway = RecordingGateway::new()
            .with_table("People")
            .with_table("Pets")
            .with_rows(
                "Pets",
                Rowset::from_parts(vec!["name".into()], vec![[Some("Rex")].into_iter().collect()])
                    .unwrap(),
            );

        let results = select_tables(
            &gateway,
            [
                TableQuery::new("People").filter("id > 1"),
                TableQuery::new("Pets").columns(["name"]),
            ],
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_empty());
        assert_eq!(results[1].rows()[0].get(0), Some("Rex"));
        assert_eq!(
            gateway.log(),
            ["SELECT * FROM People WHERE id > 1", "SELECT name FROM Pets"]
        );

        let err = select_tables(&gateway, ["People", "Nowhere", "Pets"])
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::Bulk { ref entry, succeeded: 1, .. } if entry == "Nowhere"));
    }

    #[tokio::test]
    async fn select_tables_rejects_bad_projection_before_sending() {
        let gateway = RecordingGateway::new().with_table("People");
        let err = select_tables(
            &gateway,
            [TableQuery::new("People").columns(["id; DROP TABLE People"])],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TableError::Bulk { ref entry, succeeded: 0, .. } if entry == "People"));
        assert!(gateway.log().is_empty());
    }
}
