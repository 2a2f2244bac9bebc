//! End-to-end statement scenarios against a scripted MySQL-style gateway.
//!
//! The gateway here is written against the public `Gateway` trait only, the
//! same way an application would plug in its own driver.

use std::sync::Mutex;
use tablekit::prelude::*;
use tablekit::{Dialect, GatewayError, Statement, drop_tables};

#[derive(Default)]
struct ScriptedGateway {
    log: Mutex<Vec<String>>,
    reject: Vec<&'static str>,
}

impl ScriptedGateway {
    fn rejecting(patterns: &[&'static str]) -> Self {
        Self {
            reject: patterns.to_vec(),
            ..Self::default()
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Gateway for ScriptedGateway {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn execute(&self, statement: &Statement) -> Result<Rowset, GatewayError> {
        let sql = statement.to_inline_sql(Dialect::MySql);
        self.log.lock().unwrap().push(sql.clone());
        if self.reject.iter().any(|p| sql.contains(p)) {
            return Err(GatewayError::rejected(format!("cannot run: {sql}")));
        }
        Ok(Rowset::empty())
    }
}

fn people_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("id", "INT").attrs([
            attrs::NOT_NULL,
            attrs::PRIMARY_KEY,
            attrs::AUTO_INCREMENT,
        ]),
        FieldDefinition::new("name", "VARCHAR(30)"),
    ]
}

#[tokio::test]
async fn create_people() -> TableResult<()> {
    let gateway = ScriptedGateway::default();
    Table::create(&gateway, "People", people_fields()).await?;

    assert_eq!(
        gateway.log(),
        ["CREATE TABLE IF NOT EXISTS People(id INT NOT NULL PRIMARY KEY AUTO_INCREMENT, name VARCHAR(30))"]
    );
    Ok(())
}

#[tokio::test]
async fn insert_two_names_second_rejected() -> TableResult<()> {
    let gateway = ScriptedGateway::rejecting(&[r#"VALUES ("Bo")"#]);
    let people = Table::create(&gateway, "People", people_fields()).await?;

    let err = people
        .insert_many(&["name"], [["Ann"], ["Bo"]])
        .await
        .unwrap_err();

    assert_eq!(err.succeeded(), Some(1));
    assert!(matches!(err, TableError::Insert { row: 1, .. }));
    assert_eq!(
        gateway.log()[1..],
        [
            r#"INSERT INTO People(name) VALUES ("Ann")"#,
            r#"INSERT INTO People(name) VALUES ("Bo")"#,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn drop_two_tables_with_checks_disabled() {
    let gateway = ScriptedGateway::default();
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

    let gateway = ScriptedGateway::rejecting(&["DROP TABLE A"]);
    let err = drop_tables(&gateway, &["A", "B"], ForeignKeyChecks::Disabled)
        .await
        .unwrap_err();
    assert_eq!(err.succeeded(), Some(0));
    assert_eq!(
        gateway.log().last().map(String::as_str),
        Some("SET FOREIGN_KEY_CHECKS=1")
    );
}

#[tokio::test]
async fn values_never_reach_executed_sql() -> TableResult<()> {
    let gateway = ScriptedGateway::default();
    let people = Table::create(&gateway, "People", people_fields()).await?;

    let conditions = Conditions::from(Condition::eq("name", r#"x" OR "1"="1"#)?);
    people.select_values(&OutputColumns::all(), &conditions).await?;

    let mut statement = Statement::new("SELECT * FROM People WHERE ");
    statement.push_fragment(&conditions);
    assert_eq!(
        statement.to_sql(Dialect::MySql),
        "SELECT * FROM People WHERE name = ?"
    );
    assert_eq!(statement.param_count(), 1);
    Ok(())
}
