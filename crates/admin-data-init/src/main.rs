//! admin-data-init: prepares the admin data directory.
//!
//! Loads `admin-data.toml` (or the file named by `ADMIN_DATA_CONFIG`), then
//! runs the bootstrap once: data files, legacy migration, default admin.

mod config;

use tracing::{error, info};

use crate::config::{InitSettings, DATA_DIR_ENV};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load settings
    let settings = InitSettings::load()?;

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&settings.logging.log_level))?,
        )
        .init();

    // 3. Build library config
    let config = settings.admin_data_config(std::env::var(DATA_DIR_ENV).ok());
    info!("Preparing admin data in {:?}", config.resolve().data_dir);

    // 4. Bootstrap
    match admin_data_store::run_admin_data_migration(&config).await {
        Ok(report) => {
            info!(
                "Admin data ready: {} file(s) created, migration {:?}, default admin {:?}",
                report.files.created.len(),
                report.migration,
                report.default_admin
            );
            Ok(())
        }
        Err(e) => {
            error!("Admin data bootstrap failed: {}", e);
            Err(e.into())
        }
    }
}
