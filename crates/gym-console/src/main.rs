//! Gym Management Console
//!
//! Loads `app.properties`, connects to PostgreSQL and runs the menu on
//! stdin/stdout. Logs go to stderr.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gym_console::{
    config::{DatabaseConfig, PROPERTIES_FILE},
    db::{create_pool, pool::health_check, schema},
    reports::ReportingService,
    shell::Console,
    store::PgStore,
    workflow::{SystemClock, Workflows},
};

/// Gym database management console.
///
/// Connection settings are read from `app.properties` in the working directory.
#[derive(Parser)]
#[command(name = "gym-console", version, about)]
struct Cli {}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,gym_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();
    init_tracing();

    let config = match DatabaseConfig::from_properties_file(PROPERTIES_FILE) {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e.operator_message());
            println!("Make sure {} exists in the working directory.", PROPERTIES_FILE);
            std::process::exit(1);
        }
    };

    let pool = match create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            println!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };
    if !health_check(&pool).await {
        println!("Error connecting to database: health check failed");
        std::process::exit(1);
    }
    println!("Database connection successful!");
    println!();

    if config.init_schema {
        schema::install(&pool)
            .await
            .context("Failed to install database schema")?;
    } else {
        let missing = schema::validate(&pool)
            .await
            .context("Failed to validate database schema")?;
        if !missing.is_empty() {
            tracing::warn!(
                schema = schema::SCHEMA,
                missing = ?missing,
                "Missing tables; set db.init_schema=true to install them"
            );
        }
    }

    let store = Arc::new(PgStore::new(pool.clone()));
    let workflows = Workflows::new(store.clone(), Arc::new(SystemClock));
    let reports = ReportingService::new(store);

    let mut console = Console::new(
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        workflows,
        reports,
    );
    console.run().await.context("Console session failed")?;

    pool.close().await;
    Ok(())
}
