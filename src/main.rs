use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use udaan::config::{AppConfig, StoreBackend};
use udaan::context::{self, AppContext};
use udaan::handlers;
use udaan::store::{MemoryWorkbook, PgWorkbook, RowStore};
use udaan::warnings;

fn fatal(what: &str, e: impl std::fmt::Display) -> std::io::Error {
    log::error!("{what}: {e}");
    std::io::Error::other(format!("{what}: {e}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let cfg = AppConfig::from_env().map_err(|e| fatal("Invalid configuration", e))?;

    // Open the workbook
    let store: Arc<dyn RowStore> = match cfg.backend {
        StoreBackend::Postgres => {
            let url = cfg.database_url.as_deref().unwrap_or_default();
            let pg = PgWorkbook::connect(url)
                .await
                .map_err(|e| fatal("Failed to open PostgreSQL workbook", e))?;
            log::info!("Connected to PostgreSQL workbook");
            Arc::new(pg)
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory workbook (data is lost on restart)");
            Arc::new(MemoryWorkbook::new())
        }
    };

    // Create missing worksheets and the primary admin
    if cfg.provision || cfg.backend == StoreBackend::Memory {
        context::provision(store.clone(), &cfg.admin_password)
            .await
            .map_err(|e| fatal("Provisioning failed", e))?;
    }

    // Every worksheet must exist with the expected header row before we serve
    let app_ctx = AppContext::connect(store, &cfg)
        .await
        .map_err(|e| fatal("Workbook check failed", e))?;
    log::info!("All worksheets verified");

    warnings::scheduler::spawn_scheduler(app_ctx.clone(), cfg.stuck_scan_interval_secs);

    // Session encryption key. Load from SESSION_KEY for persistent sessions across restarts
    let secret_key = match cfg.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    log::info!("Starting {} at http://{}", cfg.event_name, cfg.bind);

    let app_data = web::Data::new(app_ctx);
    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_name("udaan_session".to_string())
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(app_data.clone())
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            .configure(handlers::configure)
    })
    .bind(&cfg.bind)?
    .run()
    .await
}
