use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Logger, NormalizePath, TrailingSlash},
    web,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, filter::LevelFilter};
mod api;
use crate::api::api_config;
mod cli;
mod config;
mod db;
mod shutdown;
use crate::cli::{Cli, Command};
use crate::shutdown::ShutdownCoordinator;

/// Console output plus one daily rotating file per level
/// Log files will be created as: logs/info.log.2024-12-22, logs/error.log.2024-12-22, etc.
fn init_tracing(log_dir: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let info_file = tracing_appender::rolling::daily(log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(log_dir, "error.log");
    let debug_file = tracing_appender::rolling::daily(log_dir, "debug.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let debug_layer = tracing_subscriber::fmt::layer()
        .with_writer(debug_file)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .with(debug_layer)
        .init();

    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment, then apply command line overrides
    let mut config = config::Config::from_env().map_err(std::io::Error::other)?;
    cli.apply(&mut config);

    init_tracing(&config.log_dir)?;

    info!("Starting job-tracker application");
    info!("Configuration loaded successfully:");
    info!("  - Storage backend: {:?}", config.storage_backend);
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max database connections: {}", config.max_db_connections);

    let store = db::open_store(&config).await.map_err(std::io::Error::other)?;

    // Run migrations on startup (auto-migrate when starting server)
    store.migrate().await.map_err(std::io::Error::other)?;

    if cli.command() == Command::Migrate {
        info!("Migrations applied, exiting");
        store.close().await;
        return Ok(());
    }

    let server_store = store.clone();
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        // Configure payload size limits globally
        let payload_config = web::PayloadConfig::default()
            .limit(max_payload_size);

        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(payload_config)
            .configure(api_config(server_store.clone()))
    });

    info!("Server starting on http://{}:{}", config.host, config.port);

    let server = server
        .bind((config.host.as_str(), config.port))?
        .run();

    // Get server handle for graceful shutdown
    let server_handle = server.handle();

    // Spawn server in background
    let server_task = tokio::spawn(server);

    let coordinator = ShutdownCoordinator::new(server_handle, server_task, store);

    coordinator.wait_for_shutdown().await
}
