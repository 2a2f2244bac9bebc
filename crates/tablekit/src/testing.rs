//! In-memory gateway for unit tests.

use crate::dialect::Dialect;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::rowset::Rowset;
use crate::statement::{Statement, StatementKind};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// Records every statement it is asked to run, rendered with inline literals
/// of its dialect (MySQL unless set with [`RecordingGateway::with_dialect`]).
///
/// It also tracks which tables exist: `CREATE` adds one, a successful `DROP`
/// removes it, and any other statement naming an unknown table is rejected.
#[derive(Default)]
pub(crate) struct RecordingGateway {
    log: Mutex<Vec<String>>,
    tables: Mutex<BTreeSet<String>>,
    failures: Vec<String>,
    rows: BTreeMap<String, Rowset>,
    dialect: Dialect,
}

impl RecordingGateway {
    pub(crate) fn new() -> Self {
        Self {
            dialect: Dialect::MySql,
            ..Self::default()
        }
    }

    pub(crate) fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Reject every statement whose inline SQL contains `pattern`.
    pub(crate) fn fail_on(mut self, pattern: &str) -> Self {
        self.failures.push(pattern.to_string());
        self
    }

    /// Pretend `table` already exists.
    pub(crate) fn with_table(self, table: &str) -> Self {
        self.tables
            .lock()
            .unwrap()
            .insert(table.to_string());
        self
    }

    /// Answer every SELECT on `table` with `rows`.
    pub(crate) fn with_rows(mut self, table: &str, rows: Rowset) -> Self {
        self.rows.insert(table.to_string(), rows);
        self
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn has_table(&self, table: &str) -> bool {
        self.tables.lock().unwrap().contains(table)
    }
}

impl Gateway for RecordingGateway {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&self, statement: &Statement) -> Result<Rowset, GatewayError> {
        let sql = statement.to_inline_sql(self.dialect);
        self.log.lock().unwrap().push(sql.clone());

        if let Some(pattern) = self.failures.iter().find(|p| sql.contains(p.as_str())) {
            return Err(GatewayError::rejected(format!("rejected by '{pattern}'")));
        }

        let kind = statement.kind();
        let Some(table) = target_table(kind, &sql) else {
            return Ok(Rowset::empty());
        };

        let mut tables = self.tables.lock().unwrap();
        match kind {
            StatementKind::Create => {
                tables.insert(table);
                return Ok(Rowset::empty());
            }
            _ if !tables.contains(&table) => {
                return Err(GatewayError::rejected(format!("Table '{table}' doesn't exist")));
            }
            StatementKind::Drop => {
                tables.remove(&table);
            }
            _ => {}
        }

        Ok(match kind {
            StatementKind::Select => self.rows.get(&table).cloned().unwrap_or_default(),
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete => {
                Rowset::empty().with_affected(1)
            }
            _ => Rowset::empty(),
        })
    }
}

fn target_table(kind: StatementKind, sql: &str) -> Option<String> {
    let marker = match kind {
        StatementKind::Create => "EXISTS ",
        StatementKind::Drop | StatementKind::Alter => "TABLE ",
        StatementKind::Insert => "INTO ",
        StatementKind::Select => " FROM ",
        StatementKind::Update => "UPDATE ",
        StatementKind::Delete => "FROM ",
        StatementKind::Session | StatementKind::Other => return None,
    };
    let start = sql.find(marker)? + marker.len();
    let name: String = sql[start..]
        .chars()
        .take_while(|c| !matches!(c, '(' | ' ' | ';'))
        .collect();
    (!name.is_empty()).then_some(name)
}
