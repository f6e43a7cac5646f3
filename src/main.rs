use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod service;
mod store;
mod utils;

#[cfg(test)]
mod test_support;

use config::Config;
use db::{init_db, run_migrations};

use crate::docs::ApiDoc;
use crate::service::absence::spawn_sweeper;
use crate::service::settings::{SettingsCache, default_entries};
use crate::store::memory::MemoryStore;
use crate::store::mysql::MySqlStore;
use crate::store::{SettingsStore, Store};
use crate::utils::time::now_local;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "clockin.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = init_db(url).await?;
            run_migrations(&pool).await?;
            Arc::new(MySqlStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; data lives in memory and is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let seeded = store
        .seed_settings(&default_entries(now_local()))
        .await
        .context("Failed to seed default settings")?;
    info!(seeded, "Default settings in place");

    let settings = SettingsCache::new(Duration::from_secs(config.settings_cache_ttl_secs));

    if config.sweep_interval_secs > 0 {
        spawn_sweeper(
            store.clone(),
            settings.clone(),
            Duration::from_secs(config.sweep_interval_secs),
        );
    }

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard serves the JS/CSS assets
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::from(store.clone()))
            .app_data(Data::new(settings.clone()))
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
