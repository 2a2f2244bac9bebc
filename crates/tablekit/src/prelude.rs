//! Convenient imports for typical `tablekit` usage.
//!
//! ```ignore
//! use tablekit::prelude::*;
//! ```

pub use crate::fragment::{attrs, check, foreign_key, primary_key, types, unique};
pub use crate::{
    Assignment, Condition, Conditions, ConnectOptions, FieldDefinition, ForeignKeyChecks, Gateway,
    OutputColumns, Rowset, Session, SessionConfig, Table, TableError, TableResult, ValueTuple,
};

#[cfg(feature = "pool")]
pub use crate::{checkout, create_pool, create_pool_with_config};
