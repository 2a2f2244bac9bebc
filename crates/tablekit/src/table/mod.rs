//! The table model.
//!
//! A [`Table`] owns one table's name, its known field definitions, rows
//! waiting to be inserted and the names of constraints added through it. Every
//! operation renders one statement (or one per row for inserts) and sends it
//! through the borrowed [`Gateway`].
//!
//! ## Safety rails
//!
//! - Table, column and constraint names are validated as identifiers.
//! - Values are bound, never spliced into the executed SQL.
//! - UPDATE and DELETE require at least one condition; `update_all` and
//!   `delete_all` are the explicit way to touch every row.
//! - Nothing here opens a transaction. Pass a `tokio_postgres::Transaction`
//!   as the gateway when several operations must commit together.

pub(crate) mod render;

use crate::error::{ChecksPhase, TableError, TableResult};
use crate::foreign_keys::{ForeignKeyChecks, with_checks};
use crate::fragment::{Assignment, Conditions, FieldDefinition, OutputColumns, ValueTuple};
use crate::gateway::{Gateway, dispatch};
use crate::ident;
use crate::rowset::Rowset;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Lifecycle of the remote table as far as this object knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Created,
    /// `DROP TABLE` succeeded. The cached schema is kept; further statements
    /// still reach the gateway and fail there.
    Dropped,
}

/// One database table and the gateway its statements go through.
pub struct Table<'g, G: Gateway> {
    gateway: &'g G,
    name: String,
    fields: BTreeMap<String, FieldDefinition>,
    pending: Vec<ValueTuple>,
    constraints: Vec<String>,
    state: TableState,
}

impl<G: Gateway> std::fmt::Debug for Table<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("pending", &self.pending.len())
            .field("constraints", &self.constraints)
            .field("state", &self.state)
            .finish()
    }
}

impl<'g, G: Gateway> Table<'g, G> {
    /// `CREATE TABLE IF NOT EXISTS <name>(<f1>, <f2>, ...)`.
    ///
    /// Creating an existing table again succeeds and yields the same cache.
    pub async fn create<I>(gateway: &'g G, name: &str, fields: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = FieldDefinition>,
    {
        ident::validate("table", name)?;
        let fields: Vec<FieldDefinition> = fields.into_iter().collect();
        if fields.is_empty() {
            return Err(TableError::validation(format!(
                "table '{name}' needs at least one field"
            )));
        }
        let cache = field_cache(&fields)?;

        let statement = render::create_table(name, &fields);
        dispatch(gateway, name, &statement)
            .await
            .map_err(|source| TableError::Schema {
                table: name.to_string(),
                source,
            })?;

        Ok(Self::with_cache(gateway, name, cache))
    }

    /// Open a table that already exists, without issuing DDL.
    ///
    /// `fields` describes the columns the caller knows about and may be empty.
    /// The table's existence is checked with a query that returns no rows.
    pub async fn attach<I>(gateway: &'g G, name: &str, fields: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = FieldDefinition>,
    {
        ident::validate("table", name)?;
        let fields: Vec<FieldDefinition> = fields.into_iter().collect();
        let cache = field_cache(&fields)?;

        dispatch(gateway, name, &render::probe(name))
            .await
            .map_err(|source| TableError::Query {
                table: name.to_string(),
                source,
            })?;

        Ok(Self::with_cache(gateway, name, cache))
    }

    fn with_cache(gateway: &'g G, name: &str, fields: BTreeMap<String, FieldDefinition>) -> Self {
        Self {
            gateway,
            name: name.to_string(),
            fields,
            pending: Vec::new(),
            constraints: Vec::new(),
            state: TableState::Created,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Known field definitions, keyed by field name.
    pub fn fields(&self) -> &BTreeMap<String, FieldDefinition> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Constraint names added through [`Table::add_constraint`], oldest first.
    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    pub fn state(&self) -> TableState {
        self.state
    }

    pub fn is_dropped(&self) -> bool {
        self.state == TableState::Dropped
    }

    pub fn gateway(&self) -> &'g G {
        self.gateway
    }

    // ==================== Inserts ====================

    /// Queue one row for the next [`Table::flush`].
    pub fn stage(&mut self, row: impl Into<ValueTuple>) -> &mut Self {
        self.pending.push(row.into());
        self
    }

    /// Rows waiting to be inserted.
    pub fn pending(&self) -> &[ValueTuple] {
        &self.pending
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Insert every pending row, one `INSERT` per row, in staging order.
    ///
    /// Stops at the first rejected row. Rows before it stay committed and
    /// leave the buffer; the rejected row and everything after it stay
    /// pending. On success the buffer is empty. Returns the affected row count.
    pub async fn flush(&mut self, columns: &[&str]) -> TableResult<u64> {
        let columns = self.insert_columns(columns, &self.pending)?;
        let result = self.send_rows(&columns, &self.pending).await;

        match &result {
            Ok(_) => self.pending.clear(),
            Err(TableError::Insert { row, .. }) => {
                self.pending.drain(..*row);
            }
            Err(_) => {}
        }
        result
    }

    /// Insert a single row. The pending buffer is left alone.
    pub async fn insert_one(
        &self,
        columns: &[&str],
        row: impl Into<ValueTuple>,
    ) -> TableResult<u64> {
        self.insert_rows(columns, &[row.into()]).await
    }

    /// Insert exactly the given rows, one statement per row. The pending
    /// buffer is left alone.
    ///
    /// On failure, [`TableError::Insert`] carries the index of the rejected
    /// row; rows before it are committed, rows from it onward were not sent.
    pub async fn insert_many<I>(&self, columns: &[&str], rows: I) -> TableResult<u64>
    where
        I: IntoIterator,
        I::Item: Into<ValueTuple>,
    {
        let rows: Vec<ValueTuple> = rows.into_iter().map(Into::into).collect();
        self.insert_rows(columns, &rows).await
    }

    async fn insert_rows(&self, columns: &[&str], rows: &[ValueTuple]) -> TableResult<u64> {
        let columns = self.insert_columns(columns, rows)?;
        self.send_rows(&columns, rows).await
    }

    async fn send_rows(&self, columns: &[String], rows: &[ValueTuple]) -> TableResult<u64> {
        let mut affected = 0;
        for (row, values) in rows.iter().enumerate() {
            let statement = render::insert(&self.name, columns, values);
            match dispatch(self.gateway, &self.name, &statement).await {
                Ok(result) => affected += result.affected(),
                Err(source) => {
                    return Err(TableError::Insert {
                        table: self.name.clone(),
                        row,
                        source,
                    });
                }
            }
        }
        Ok(affected)
    }

    /// Check the column list and the arity of every row before anything is sent.
    fn insert_columns(&self, columns: &[&str], rows: &[ValueTuple]) -> TableResult<Vec<String>> {
        if columns.is_empty() {
            return Err(TableError::validation(format!(
                "insert into '{}' needs at least one column",
                self.name
            )));
        }
        for column in columns {
            ident::validate("column", column)?;
        }
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(TableError::validation(format!(
                "row {index} for '{}' has {} values for {} columns",
                self.name,
                row.len(),
                columns.len()
            )));
        }
        Ok(columns.iter().map(|c| c.to_string()).collect())
    }

    // ==================== Queries ====================

    /// `SELECT <columns> FROM <table> [WHERE <conditions>]`.
    ///
    /// Rows come back in the order the database delivers them.
    pub async fn select_values(
        &self,
        columns: &OutputColumns,
        conditions: &Conditions,
    ) -> TableResult<Rowset> {
        columns.validate()?;
        let statement = render::select(&self.name, columns, conditions);
        dispatch(self.gateway, &self.name, &statement)
            .await
            .map_err(|source| TableError::Query {
                table: self.name.clone(),
                source,
            })
    }

    /// `SELECT * FROM <table>`.
    pub async fn select_all(&self) -> TableResult<Rowset> {
        self.select_values(&OutputColumns::all(), &Conditions::new()).await
    }

    // ==================== Updates & deletes ====================

    /// `UPDATE <table> SET <assignments> WHERE <conditions>`; returns the affected row count.
    ///
    /// An empty condition list is rejected; use [`Table::update_all`] instead.
    pub async fn update_values<I>(
        &self,
        assignments: I,
        conditions: &Conditions,
    ) -> TableResult<u64>
    where
        I: IntoIterator,
        I::Item: Into<Assignment>,
    {
        if conditions.is_empty() {
            return Err(TableError::validation(format!(
                "update on '{}' without conditions; use update_all to change every row",
                self.name
            )));
        }
        self.run_update(assignments, conditions).await
    }

    /// `UPDATE <table> SET <assignments>` on every row.
    pub async fn update_all<I>(&self, assignments: I) -> TableResult<u64>
    where
        I: IntoIterator,
        I::Item: Into<Assignment>,
    {
        self.run_update(assignments, &Conditions::new()).await
    }

    async fn run_update<I>(&self, assignments: I, conditions: &Conditions) -> TableResult<u64>
    where
        I: IntoIterator,
        I::Item: Into<Assignment>,
    {
        let assignments: Vec<Assignment> = assignments.into_iter().map(Into::into).collect();
        if assignments.is_empty() {
            return Err(TableError::validation(format!(
                "update on '{}' needs at least one assignment",
                self.name
            )));
        }

        let statement = render::update(&self.name, &assignments, conditions);
        dispatch(self.gateway, &self.name, &statement)
            .await
            .map(|rows| rows.affected())
            .map_err(|source| TableError::Update {
                table: self.name.clone(),
                source,
            })
    }

    /// `DELETE FROM <table> WHERE <conditions>`; returns the affected row count.
    ///
    /// An empty condition list is rejected; use [`Table::delete_all`] instead.
    pub async fn delete_values(&self, conditions: &Conditions) -> TableResult<u64> {
        if conditions.is_empty() {
            return Err(TableError::validation(format!(
                "delete on '{}' without conditions; use delete_all to remove every row",
                self.name
            )));
        }
        self.run_delete(conditions).await
    }

    /// `DELETE FROM <table>`.
    pub async fn delete_all(&self) -> TableResult<u64> {
        self.run_delete(&Conditions::new()).await
    }

    async fn run_delete(&self, conditions: &Conditions) -> TableResult<u64> {
        let statement = render::delete(&self.name, conditions);
        dispatch(self.gateway, &self.name, &statement)
            .await
            .map(|rows| rows.affected())
            .map_err(|source| TableError::Delete {
                table: self.name.clone(),
                source,
            })
    }

    // ==================== Schema changes ====================

    /// `ALTER TABLE <table> ADD CONSTRAINT <name> <definition>`.
    ///
    /// `definition` comes from [`check`](crate::fragment::check),
    /// [`unique`](crate::fragment::unique) and friends, or is written by hand.
    pub async fn add_constraint(&mut self, name: &str, definition: &str) -> TableResult<()> {
        ident::validate("constraint", name)?;
        if definition.trim().is_empty() {
            return Err(TableError::validation(format!(
                "constraint '{name}' has an empty definition"
            )));
        }

        let statement = render::add_constraint(&self.name, name, definition);
        dispatch(self.gateway, &self.name, &statement)
            .await
            .map_err(|source| TableError::Schema {
                table: self.name.clone(),
                source,
            })?;

        self.constraints.push(name.to_string());
        Ok(())
    }

    /// `DROP TABLE <table>`.
    pub async fn drop_table(&mut self) -> TableResult<()> {
        self.drop_table_with(ForeignKeyChecks::Enforced).await
    }

    /// `DROP TABLE <table>`, optionally with foreign key checks turned off around it.
    ///
    /// On PostgreSQL disabled checks mean `DROP TABLE <table> CASCADE`, which
    /// also drops foreign keys in other tables that reference this one.
    ///
    /// The table is marked dropped whenever the DROP itself succeeded, even
    /// if turning checks back on failed afterwards.
    pub async fn drop_table_with(&mut self, checks: ForeignKeyChecks) -> TableResult<()> {
        let gateway = self.gateway;
        let name = self.name.as_str();
        let statement = render::drop_table(name, checks.cascade(gateway.dialect()));

        let result = with_checks(gateway, name, checks, async {
            dispatch(gateway, name, &statement)
                .await
                .map(|_| ())
                .map_err(|source| TableError::Schema {
                    table: name.to_string(),
                    source,
                })
        })
        .await;

        if matches!(
            result,
            Ok(())
                | Err(TableError::ForeignKeyChecks {
                    phase: ChecksPhase::Enable,
                    ..
                })
        ) {
            self.state = TableState::Dropped;
        }
        result
    }
}

/// Validate field definitions and key them by name, rejecting duplicates.
fn field_cache(fields: &[FieldDefinition]) -> TableResult<BTreeMap<String, FieldDefinition>> {
    let mut cache = BTreeMap::new();
    for field in fields {
        field.validate()?;
        match cache.entry(field.name().to_string()) {
            Entry::Occupied(_) => {
                return Err(TableError::validation(format!(
                    "duplicate field '{}'",
                    field.name()
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(field.clone());
            }
        }
    }
    Ok(cache)
}
