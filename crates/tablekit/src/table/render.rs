//! Statement shapes issued by [`Table`](super::Table).

use crate::fragment::{Assignment, Conditions, FieldDefinition, OutputColumns, ValueTuple};
use crate::statement::Statement;

pub(crate) fn create_table(table: &str, fields: &[FieldDefinition]) -> Statement {
    let mut s = Statement::new("CREATE TABLE IF NOT EXISTS ");
    s.push(table).push("(").push_joined(fields, ", ").push(")");
    s
}

pub(crate) fn probe(table: &str) -> Statement {
    let mut s = Statement::new("SELECT * FROM ");
    s.push(table).push(" WHERE 1=0");
    s
}

pub(crate) fn insert(table: &str, columns: &[String], row: &ValueTuple) -> Statement {
    let mut s = Statement::new("INSERT INTO ");
    s.push(table)
        .push("(")
        .push_joined(columns, ", ")
        .push(") VALUES ")
        .push_fragment(row);
    s
}

pub(crate) fn select(table: &str, columns: &OutputColumns, conditions: &Conditions) -> Statement {
    let mut s = Statement::new("SELECT ");
    s.push_fragment(columns).push(" FROM ").push(table);
    push_where(&mut s, conditions);
    s
}

pub(crate) fn update(
    table: &str,
    assignments: &[Assignment],
    conditions: &Conditions,
) -> Statement {
    let mut s = Statement::new("UPDATE ");
    s.push(table).push(" SET ").push_joined(assignments, ", ");
    push_where(&mut s, conditions);
    s
}

pub(crate) fn delete(table: &str, conditions: &Conditions) -> Statement {
    let mut s = Statement::new("DELETE FROM ");
    s.push(table);
    push_where(&mut s, conditions);
    s
}

pub(crate) fn add_constraint(table: &str, name: &str, definition: &str) -> Statement {
    let mut s = Statement::new("ALTER TABLE ");
    s.push(table)
        .push(" ADD CONSTRAINT ")
        .push(name)
        .push(" ")
        .push(definition);
    s
}

pub(crate) fn drop_table(table: &str, cascade: bool) -> Statement {
    let mut s = Statement::new("DROP TABLE ");
    s.push(table);
    if cascade {
        s.push(" CASCADE");
    }
    s
}

/// ` WHERE <conditions>`, or nothing at all for an empty list.
fn push_where(s: &mut Statement, conditions: &Conditions) {
    if !conditions.is_empty() {
        s.push(" WHERE ").push_fragment(conditions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::fragment::Condition;

    #[test]
    fn select_without_conditions_has_no_where() {
        let s = select("People", &OutputColumns::all(), &Conditions::new());
        assert_eq!(s.to_sql(Dialect::Postgres), "SELECT * FROM People");
    }

    #[test]
    fn update_joins_assignments() {
        let s = update(
            "People",
            &[Assignment::set("name", "Bo").unwrap(), "visits = visits + 1".into()],
            &Condition::eq("id", 2).unwrap().into(),
        );
        assert_eq!(
            s.to_sql(Dialect::Postgres),
            "UPDATE People SET name = $1, visits = visits + 1 WHERE id = $2"
        );
    }

    #[test]
    fn ddl_shapes() {
        assert_eq!(
            add_constraint("People", "adult", "CHECK (age > 18)").to_sql(Dialect::MySql),
            "ALTER TABLE People ADD CONSTRAINT adult CHECK (age > 18)"
        );
        assert_eq!(drop_table("People", false).to_sql(Dialect::MySql), "DROP TABLE People");
        assert_eq!(
            drop_table("People", true).to_sql(Dialect::Postgres),
            "DROP TABLE People CASCADE"
        );
        assert_eq!(
            probe("People").to_sql(Dialect::MySql),
            "SELECT * FROM People WHERE 1=0"
        );
        assert_eq!(
            delete("People", &Conditions::new()).to_sql(Dialect::MySql),
            "DELETE FROM People"
        );
    }
}
