use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{error, info};

mod api;
mod cli;
mod config;
mod db;
mod logging;
mod shutdown;

use crate::api::{
    health::health_config,
    job::{PgJobService, handlers::job_config},
    validation,
};
use crate::cli::Cli;
use crate::config::{Config, ConfigError};
use crate::shutdown::ShutdownCoordinator;

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_dir) {
        eprintln!("Failed to initialize logging in {}: {}", cli.log_dir.display(), e);
        std::process::exit(1);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting job-api");
    info!("Configuration loaded successfully:");
    info!("  - Database: {}@{}:{}/{}", config.database.user, config.database.host, config.database.port, config.database.name);
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max database connections: {}", config.max_db_connections);
    info!("  - Statement timeout: {:?}", config.statement_timeout());

    let pool = match db::connection::get_connection(
        &config.database,
        config.max_db_connections,
        config.db_acquire_timeout(),
    )
    .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::connection::ping(&pool).await {
        error!("Database ping failed: {}", e);
        std::process::exit(1);
    }
    info!("Database connection pool established");

    let job_service = web::Data::new(PgJobService::new(pool.clone(), config.statement_timeout()));
    let server_pool = pool.clone();
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(server_pool.clone()))
            .app_data(job_service.clone())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config().limit(max_payload_size))
            .configure(health_config)
            .configure(job_config::<PgJobService>)
    });

    let address = (config.server.host.as_str(), config.server.port);
    info!("Server starting on http://{}:{}", address.0, address.1);

    let server = server.bind(address)?.run();
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, pool)
        .wait_for_shutdown()
        .await
}
