use super::Render;
use crate::composer;
use crate::error::{TableError, TableResult};
use crate::ident;
use crate::statement::Statement;

/// A column definition inside `CREATE TABLE`: `<name> <type> <attr...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    name: String,
    sql_type: String,
    attributes: Vec<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            attributes: Vec::new(),
        }
    }

    /// Append one attribute (`NOT NULL`, `PRIMARY KEY`, ...).
    pub fn attr(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    /// Append several attributes in order.
    pub fn attrs<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Name must be a valid identifier and the type non-empty.
    pub fn validate(&self) -> TableResult<()> {
        ident::validate("field", &self.name)?;
        if self.sql_type.trim().is_empty() {
            return Err(TableError::validation(format!(
                "field '{}' has an empty type",
                self.name
            )));
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let head = [self.name.as_str(), self.sql_type.as_str()];
        composer::join(
            head.into_iter().chain(self.attributes.iter().map(String::as_str)),
            " ",
        )
    }
}

impl Render for FieldDefinition {
    fn render_into(&self, out: &mut Statement) {
        out.push(&self.render());
    }
}

/// Column attribute keywords.
pub mod attrs {
    pub const PRIMARY_KEY: &str = "PRIMARY KEY";
    pub const UNIQUE: &str = "UNIQUE";
    pub const AUTO_INCREMENT: &str = "AUTO_INCREMENT";
    pub const NULL: &str = "NULL";
    pub const NOT_NULL: &str = "NOT NULL";
    pub const AND: &str = "AND";
    pub const OR: &str = "OR";

    /// `DEFAULT <expr>`
    pub fn default(expr: &str) -> String {
        format!("DEFAULT {expr}")
    }
}

/// Column type names.
pub mod types {
    pub const BOOL: &str = "BOOL";
    pub const INT: &str = "INT";
    pub const BIGINT: &str = "BIGINT";
    pub const SMALLINT: &str = "SMALLINT";
    pub const TINYINT: &str = "TINYINT";

    pub const TEXT: &str = "TEXT";
    pub const MEDIUMTEXT: &str = "MEDIUMTEXT";
    pub const LONGTEXT: &str = "LONGTEXT";
    pub const BLOB: &str = "BLOB";
    pub const MEDIUMBLOB: &str = "MEDIUMBLOB";
    pub const LONGBLOB: &str = "LONGBLOB";

    pub const DATE: &str = "DATE";
    pub const TIME: &str = "TIME";
    pub const DATETIME: &str = "DATETIME";
    pub const TIMESTAMP: &str = "TIMESTAMP";

    fn sized(name: &str, digits: usize, scale: usize) -> String {
        format!("{name}({digits},{scale})")
    }

    pub fn float(digits: usize, scale: usize) -> String {
        sized("FLOAT", digits, scale)
    }

    pub fn double(digits: usize, scale: usize) -> String {
        sized("DOUBLE", digits, scale)
    }

    pub fn decimal(digits: usize, scale: usize) -> String {
        sized("DECIMAL", digits, scale)
    }

    pub fn numeric(digits: usize, scale: usize) -> String {
        sized("NUMERIC", digits, scale)
    }

    pub fn varchar(len: usize) -> String {
        format!("VARCHAR({len})")
    }

    pub fn char(len: usize) -> String {
        format!("CHAR({len})")
    }

    pub fn year(width: usize) -> String {
        format!("YEAR({width})")
    }
}

/// `CHECK (<expr> <extra...>)`, e.g. `check("age > 18", [attrs::AND, "age < 150"])`.
pub fn check<I, S>(expr: &str, extra: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut body = expr.to_string();
    for part in extra {
        body.push(' ');
        body.push_str(part.as_ref());
    }
    composer::wrap(&body, "CHECK (", ")")
}

/// `UNIQUE (<columns>)`
pub fn unique(columns: &[&str]) -> String {
    composer::wrap(&composer::join(columns, ", "), "UNIQUE (", ")")
}

/// `PRIMARY KEY (<columns>)`
pub fn primary_key(columns: &[&str]) -> String {
    composer::wrap(&composer::join(columns, ", "), "PRIMARY KEY (", ")")
}

/// `FOREIGN KEY (<columns>) REFERENCES <table>(<referenced>)`
pub fn foreign_key(columns: &[&str], table: &str, referenced: &[&str]) -> String {
    let mut out = composer::wrap(&composer::join(columns, ", "), "FOREIGN KEY (", ")");
    out.push_str(" REFERENCES ");
    out.push_str(table);
    out.push_str(&composer::wrap(&composer::join(referenced, ", "), "(", ")"));
    out
}
