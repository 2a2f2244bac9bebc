//! An owned database session.

use crate::config::{ConnectOptions, SessionConfig};
use crate::dialect::Dialect;
use crate::error::{GatewayError, TableError, TableResult};
use crate::gateway::Gateway;
use crate::rowset::Rowset;
use crate::statement::Statement;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

/// One connection plus the task driving it.
///
/// Give each concurrent caller its own session (or a pooled connection);
/// statements on one session run one after another.
///
/// # Example
///
/// ```ignore
/// let session = Session::connect(&ConnectOptions::from_env()?).await?;
/// let people = Table::create(&session, "People", fields).await?;
/// // ...
/// session.close().await;
/// ```
pub struct Session {
    client: Client,
    connection: JoinHandle<()>,
    config: SessionConfig,
}

impl Session {
    /// Open a session with default settings.
    pub async fn connect(options: &ConnectOptions) -> TableResult<Self> {
        Self::connect_with(options, SessionConfig::default()).await
    }

    /// Open a session with a query timeout and slow statement threshold.
    pub async fn connect_with(
        options: &ConnectOptions,
        config: SessionConfig,
    ) -> TableResult<Self> {
        let (client, connection) = options
            .to_pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| TableError::Connect(e.to_string()))?;

        let connection = tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::error!(target: "tablekit.sql", %error, "connection terminated");
            }
        });

        tracing::info!(
            target: "tablekit.sql",
            host = %options.host,
            port = options.port,
            database = %options.database,
            user = %options.user,
            "session opened"
        );

        Ok(Self {
            client,
            connection,
            config,
        })
    }

    /// The underlying client, for work outside the table model (transactions, COPY, ...).
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Close the connection and wait for its task to finish.
    pub async fn close(self) {
        drop(self.client);
        if let Err(error) = self.connection.await {
            tracing::warn!(
                target: "tablekit.sql",
                %error,
                "connection task did not shut down cleanly"
            );
        }
        tracing::info!(target: "tablekit.sql", "session closed");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("closed", &self.client.is_closed())
            .field("config", &self.config)
            .finish()
    }
}

impl Gateway for Session {
    async fn execute(&self, statement: &Statement) -> Result<Rowset, GatewayError> {
        let started = Instant::now();
        let run = <Client as Gateway>::execute(&self.client, statement);

        let result = match self.config.query_timeout {
            Some(timeout) => {
                tokio::pin!(run);
                tokio::select! {
                    result = &mut run => result,
                    _ = tokio::time::sleep(timeout) => {
                        let cancel_token = self.client.cancel_token();
                        tokio::spawn(async move {
                            let _ = cancel_token.cancel_query(NoTls).await;
                        });
                        Err(GatewayError::Timeout(timeout))
                    }
                }
            }
            None => run.await,
        };

        let elapsed = started.elapsed();
        if let Some(threshold) = self.config.slow_threshold
            && elapsed >= threshold
        {
            tracing::warn!(
                target: "tablekit.sql",
                kind = statement.kind().as_str(),
                ?elapsed,
                sql = %statement.to_sql(Dialect::Postgres),
                "slow statement"
            );
        }
        result
    }
}
