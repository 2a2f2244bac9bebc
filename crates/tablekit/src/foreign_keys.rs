//! Foreign key enforcement around destructive DDL.

use crate::dialect::Dialect;
use crate::error::{ChecksPhase, TableError, TableResult};
use crate::gateway::{Gateway, dispatch};
use crate::statement::Statement;
use std::future::Future;

/// Whether foreign key checks stay on while a table is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignKeyChecks {
    #[default]
    Enforced,
    /// Turn checks off before the drop and back on afterwards (MySQL), or
    /// drop with `CASCADE` (PostgreSQL).
    Disabled,
}

impl ForeignKeyChecks {
    /// Whether a `DROP TABLE` under these checks carries `CASCADE`.
    pub(crate) fn cascade(self, dialect: Dialect) -> bool {
        self == ForeignKeyChecks::Disabled && dialect.cascades_drops()
    }
}

impl From<bool> for ForeignKeyChecks {
    /// `true` means "disable checks".
    fn from(disabled: bool) -> Self {
        if disabled {
            ForeignKeyChecks::Disabled
        } else {
            ForeignKeyChecks::Enforced
        }
    }
}

/// Run `body`, bracketed by the dialect's disable/enable statements when
/// `checks` is [`ForeignKeyChecks::Disabled`] and the dialect has them.
///
/// Once the disable statement succeeded, the enable statement is sent no
/// matter how `body` ends.
pub(crate) async fn with_checks<G, T, F>(
    gateway: &G,
    scope: &str,
    checks: ForeignKeyChecks,
    body: F,
) -> TableResult<T>
where
    G: Gateway,
    F: Future<Output = TableResult<T>>,
{
    if checks == ForeignKeyChecks::Enforced {
        return body.await;
    }
    let dialect = gateway.dialect();
    let (Some(disable), Some(enable)) = (
        dialect.foreign_key_checks(false),
        dialect.foreign_key_checks(true),
    ) else {
        return body.await;
    };

    dispatch(gateway, scope, &Statement::new(disable))
        .await
        .map_err(|source| TableError::ForeignKeyChecks {
            phase: ChecksPhase::Disable,
            source,
        })?;

    let outcome = body.await;

    let restored = dispatch(gateway, scope, &Statement::new(enable)).await;

    match (outcome, restored) {
        (outcome, Ok(_)) => outcome,
        (Ok(_), Err(source)) => Err(TableError::ForeignKeyChecks {
            phase: ChecksPhase::Enable,
            source,
        }),
        (Err(cause), Err(restore)) => {
            tracing::warn!(
                target: "tablekit.sql",
                scope,
                %restore,
                "foreign key checks left disabled after failed operation"
            );
            Err(TableError::ChecksNotRestored {
                cause: Box::new(cause),
                restore,
            })
        }
    }
}
