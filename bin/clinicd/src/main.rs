//! `clinicd` — the hospital management server binary.
//!
//! Usage:
//!   clinicd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/clinicd/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod accounts;
mod accounts_api;
mod auth_middleware;
mod bootstrap;
mod config;
mod login;
mod routes;

use std::sync::Arc;

use clap::Parser;
use jsonwebtoken::{DecodingKey, Validation};
use clinic_core::Module;
use tracing::info;

use accounts::AccountStore;
use auth_middleware::JwtState;
use config::ServerConfig;
use routes::AppState;

/// Hospital management server.
#[derive(Parser, Debug)]
#[command(name = "clinicd", about = "Hospital management server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    // Embedded stores, shared by all modules.
    let sql: Arc<dyn clinic_sql::SQLStore> = Arc::new(
        clinic_sql::SqliteStore::open(&data_dir.join("clinic.sqlite"))
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let kv: Arc<dyn clinic_kv::KVStore> = Arc::new(
        clinic_kv::RedbStore::open(&data_dir.join("clinic.redb"))
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );

    // Bootstrap: role documents + admin account.
    bootstrap::ensure_role_docs(&kv)?;
    let accounts = Arc::new(AccountStore::new(Arc::clone(&sql))?);
    bootstrap::ensure_admin_account(&accounts, &server_config)?;

    // ── Business modules ──

    let staff_module = staff::StaffModule::new(staff::service::StaffService::new(
        Arc::clone(&sql),
    )?);
    info!("Staff module initialized");

    let patients_module = patients::PatientsModule::new(patients::service::PatientService::new(
        Arc::clone(&sql),
    )?);
    info!("Patients module initialized");

    let pharmacy_module = pharmacy::PharmacyModule::new(pharmacy::service::PharmacyService::new(
        Arc::clone(&sql),
    )?);
    info!("Pharmacy module initialized");

    let lab_module = lab::LabModule::new(lab::service::LabService::new(
        Arc::clone(&sql),
        Arc::clone(&kv),
    )?);
    info!("Lab module initialized");

    let module_routes = vec![
        (staff_module.name(), staff_module.routes()),
        (patients_module.name(), patients_module.routes()),
        (pharmacy_module.name(), pharmacy_module.routes()),
        (lab_module.name(), lab_module.routes()),
    ];

    // Build JWT state for middleware.
    let jwt_state = Arc::new(JwtState {
        decoding_key: DecodingKey::from_secret(server_config.jwt.secret.as_bytes()),
        validation: Validation::default(),
    });

    let server_config = Arc::new(server_config);

    // Build application state.
    let app_state = AppState {
        jwt_state,
        server_config,
        accounts,
    };

    // Build router.
    let app = routes::build_router(app_state, module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("clinicd listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
