//! The connection gateway: the one seam between statement building and a database.

use crate::dialect::Dialect;
use crate::error::GatewayError;
use crate::rowset::Rowset;
use crate::statement::Statement;

/// Executes finished statements.
///
/// Implemented for `tokio_postgres::Client`, `tokio_postgres::Transaction`
/// (pass a transaction when several table operations must commit together),
/// pooled connections and [`Session`](crate::Session). Other databases plug in
/// by implementing this trait and reporting their [`Dialect`].
pub trait Gateway: Send + Sync {
    /// Dialect the gateway speaks. Decides placeholders and session toggles.
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    /// Execute one statement and return its rows (empty for non-queries).
    fn execute(
        &self,
        statement: &Statement,
    ) -> impl std::future::Future<Output = Result<Rowset, GatewayError>> + Send;
}

/// Statements without bound values use the simple protocol so every cell
/// arrives as text; bound statements use the extended protocol.
macro_rules! impl_postgres_gateway {
    ($($ty:ty),* $(,)?) => {$(
        impl Gateway for $ty {
            async fn execute(&self, statement: &Statement) -> Result<Rowset, GatewayError> {
                let sql = statement.to_sql(Dialect::Postgres);
                if statement.param_count() == 0 {
                    let messages = self.simple_query(&sql).await?;
                    return Rowset::from_simple_query(messages);
                }

                let params = statement.params_ref();
                if statement.kind().returns_rows() {
                    let rows = self.query(&sql, &params).await?;
                    Rowset::from_rows(&rows)
                } else {
                    let affected = self.execute(&sql, &params).await?;
                    Ok(Rowset::empty().with_affected(affected))
                }
            }
        }
    )*};
}

impl_postgres_gateway!(tokio_postgres::Client, tokio_postgres::Transaction<'_>);

#[cfg(feature = "pool")]
impl Gateway for deadpool_postgres::Object {
    async fn execute(&self, statement: &Statement) -> Result<Rowset, GatewayError> {
        let client: &tokio_postgres::Client = self;
        <tokio_postgres::Client as Gateway>::execute(client, statement).await
    }
}

/// Send `statement` through `gateway`, with the SQL log the rest of the crate relies on.
pub(crate) async fn dispatch<G: Gateway>(
    gateway: &G,
    table: &str,
    statement: &Statement,
) -> Result<Rowset, GatewayError> {
    let kind = statement.kind();
    tracing::debug!(
        target: "tablekit.sql",
        kind = kind.as_str(),
        table,
        param_count = statement.param_count(),
        sql = %statement.to_sql(gateway.dialect()),
        "executing statement"
    );

    let result = gateway.execute(statement).await;
    if let Err(error) = &result {
        tracing::debug!(
            target: "tablekit.sql",
            kind = kind.as_str(),
            table,
            %error,
            "statement failed"
        );
    }
    result
}
