//! # tablekit
//!
//! Typed SQL fragments and a table model that executes them over tokio-postgres.
//!
//! ## Features
//!
//! - **Typed fragments**: field definitions, value tuples, column lists,
//!   conditions and assignments, composed into statements without dangling separators
//! - **Bound values**: values travel as parameters, never spliced into executed SQL
//! - **Table model**: create, attach, insert, select, update, delete, constrain and drop
//! - **Explicit gateway**: every table borrows the connection it talks to; pass a
//!   transaction when several operations must commit together
//! - **Safe defaults**: UPDATE and DELETE require a condition unless you opt out
//! - **Fail-fast bulk operations** that report the failing entry and how far they got
//!
//! ## Example
//!
//! ```ignore
//! use tablekit::prelude::*;
//!
//! let session = Session::connect(&ConnectOptions::from_env()?).await?;
//!
//! let mut people = Table::create(
//!     &session,
//!     "people",
//!     [
//!         FieldDefinition::new("id", "SERIAL").attr(attrs::PRIMARY_KEY),
//!         FieldDefinition::new("name", types::varchar(30)).attr(attrs::NOT_NULL),
//!     ],
//! )
//! .await?;
//!
//! people.insert_many(&["name"], [["Ann"], ["Bo"]]).await?;
//!
//! let rows = people
//!     .select_values(&OutputColumns::from(["id", "name"]), &"id > 1".into())
//!     .await?;
//!
//! people.update_values([Assignment::set("name", "Cy")?], &Condition::eq("id", 2)?.into()).await?;
//! people.drop_table().await?;
//! session.close().await;
//! ```

pub mod bulk;
pub mod composer;
pub mod config;
pub mod dialect;
pub mod error;
pub mod foreign_keys;
pub mod fragment;
pub mod gateway;
pub mod ident;
pub mod rowset;
pub mod session;
pub mod statement;
pub mod table;
pub mod value;

pub mod prelude;

#[cfg(test)]
mod testing;

pub use bulk::{TableQuery, create_tables, drop_tables, select_tables};
pub use config::{ConnectOptions, SessionConfig};
pub use dialect::Dialect;
pub use error::{ChecksPhase, GatewayError, TableError, TableResult};
pub use foreign_keys::ForeignKeyChecks;
pub use fragment::{
    Assignment, Condition, Conditions, Connector, FieldDefinition, Fragment, OutputColumns, Render,
    ValueTuple,
};
pub use gateway::Gateway;
pub use rowset::{Row, Rowset};
pub use session::Session;
pub use statement::{Statement, StatementKind};
pub use table::{Table, TableState};
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{checkout, create_pool, create_pool_with_builder, create_pool_with_config};
