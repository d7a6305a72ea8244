use actix_web::dev::ServerHandle;
use sqlx::{Pool, Postgres};
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// Handles graceful shutdown of the application
///
/// On SIGTERM or CTRL+C the HTTP server stops accepting connections and
/// drains in-flight requests, then the database pool is closed.
pub struct ShutdownCoordinator {
    server_handle: ServerHandle,
    server_task: JoinHandle<Result<(), std::io::Error>>,
    pool: Pool<Postgres>,
}

impl ShutdownCoordinator {
    pub fn new(
        server_handle: ServerHandle,
        server_task: JoinHandle<Result<(), std::io::Error>>,
        pool: Pool<Postgres>,
    ) -> Self {
        Self {
            server_handle,
            server_task,
            pool,
        }
    }

    /// Wait for a shutdown signal, then shut down gracefully
    ///
    /// Also returns if the server task ends on its own, closing the pool
    /// and reporting how the server exited.
    pub async fn wait_for_shutdown(mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        #[cfg(unix)]
        let terminate = sigterm.recv();

        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        let exited = tokio::select! {
            result = ctrl_c => {
                result?;
                info!("Received CTRL+C signal, initiating graceful shutdown...");
                None
            }
            _ = terminate => {
                info!("Received SIGTERM signal, initiating graceful shutdown...");
                None
            }
            joined = &mut self.server_task => Some(joined),
        };

        match exited {
            Some(joined) => {
                error!("HTTP server stopped without a shutdown signal");
                let result = server_outcome(joined);
                self.close_pool().await;
                result
            }
            None => self.shutdown().await,
        }
    }

    async fn shutdown(mut self) -> std::io::Result<()> {
        info!("Stopping HTTP server (draining in-flight requests)...");
        self.server_handle.stop(true).await;

        let result = server_outcome((&mut self.server_task).await);
        self.close_pool().await;
        result
    }

    async fn close_pool(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn server_outcome(
    joined: Result<std::io::Result<()>, JoinError>,
) -> std::io::Result<()> {
    match joined {
        Ok(Ok(())) => {
            info!("HTTP server shut down successfully");
            Ok(())
        }
        Ok(Err(e)) => {
            error!("HTTP server encountered error during shutdown: {:?}", e);
            Err(e)
        }
        Err(e) => {
            error!("HTTP server task panicked: {:?}", e);
            Err(std::io::Error::other(e))
        }
    }
}
