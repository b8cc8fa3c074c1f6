//! Startup wiring shared by the `ticketing-server` and `ticketing-seed`
//! binaries: configuration, telemetry, store selection and seeding.

pub mod config;

use anyhow::Context;
use config::{Config, DatabaseConfig, StorageBackend};
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use ticketing_auth::{IdentityService, InMemorySessionStore, RedisSessionStore, SessionStore};
use ticketing_core::{
    CatalogStore, Event, EventDraft, EventId, InMemoryStore, SystemClock, TicketingStore,
};
use ticketing_postgres::PostgresStore;
use ticketing_web::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,ticketing=debug,sqlx=warn";

/// Install the global tracing subscriber.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Describe the business metrics and serve them for Prometheus.
///
/// # Errors
///
/// Returns error if the address is invalid or the exporter cannot start.
pub fn init_metrics(config: &Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .metrics_address()
        .parse()
        .context("Invalid metrics address")?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;
    ticketing_core::metrics::register_business_metrics();

    tracing::info!(addr = %addr, "Metrics available at http://{addr}/metrics");
    Ok(())
}

/// Open a connection pool and run migrations.
///
/// # Errors
///
/// Returns error if the database is unreachable or a migration fails.
pub async fn connect_postgres(config: &DatabaseConfig) -> anyhow::Result<PostgresStore> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(&config.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let store = PostgresStore::new(pool);
    store.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Database connected and migrated");
    Ok(store)
}

/// Redis sessions when configured, in-memory otherwise.
///
/// # Errors
///
/// Returns error if Redis is configured but unreachable.
pub async fn session_store(config: &Config) -> anyhow::Result<Arc<dyn SessionStore>> {
    match &config.session.redis_url {
        Some(url) => {
            let store = RedisSessionStore::new(url)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Using Redis session store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("REDIS_URL not set, sessions are kept in memory");
            Ok(Arc::new(InMemorySessionStore::new()))
        }
    }
}

/// Events inserted into an empty catalog.
#[must_use]
pub fn sample_events() -> Vec<EventDraft> {
    [
        (
            "Festival Anime Jakarta 2025",
            "Cosplay, merchandise and live anime music at Jakarta's biggest anime festival.",
            150_000,
            100,
        ),
        (
            "Workshop Manga bersama Sensei",
            "Learn to draw manga from a professional mangaka, with hands-on tips.",
            200_000,
            50,
        ),
        (
            "Konser J-Pop Night",
            "A live J-pop concert with your favourite Japanese artists.",
            250_000,
            80,
        ),
    ]
    .into_iter()
    .filter_map(|(title, description, price, stock)| {
        EventDraft::new(title, description, price, stock).ok()
    })
    .collect()
}

/// Insert [`sample_events`] when the catalog is empty.
///
/// Returns how many events were inserted.
///
/// # Errors
///
/// Returns error if the store fails.
pub async fn seed_sample_events<S>(store: &S) -> anyhow::Result<usize>
where
    S: CatalogStore + ?Sized,
{
    if !store.list_events().await?.is_empty() {
        tracing::info!("Catalog already has events, skipping sample data");
        return Ok(0);
    }

    let drafts = sample_events();
    for draft in &drafts {
        let event = Event::from_draft(EventId::new(), draft.clone());
        store.insert_event(&event).await?;
        tracing::info!(event_id = %event.id, title = %event.title, "Sample event added");
    }
    Ok(drafts.len())
}

/// Create or promote the configured administrator, if any.
///
/// # Errors
///
/// Returns error if the account cannot be created.
pub async fn ensure_admin(config: &Config, identity: &IdentityService) -> anyhow::Result<()> {
    let Some(admin) = &config.admin else {
        tracing::info!("ADMIN_EMAIL not set, no admin account ensured");
        return Ok(());
    };
    let user = identity
        .ensure_admin(&admin.email, &admin.password)
        .await
        .context("Failed to ensure admin account")?;
    tracing::info!(user_id = %user.id, email = %user.email, "Admin account ready");
    Ok(())
}

async fn assemble<S>(store: Arc<S>, config: &Config) -> anyhow::Result<AppState>
where
    S: TicketingStore + 'static,
{
    let sessions = session_store(config).await?;
    let identity = IdentityService::new(
        store.clone(),
        sessions,
        Arc::new(SystemClock),
        config.session.ttl,
    );

    ensure_admin(config, &identity).await?;
    if config.seed_sample_events {
        seed_sample_events(store.as_ref()).await?;
    }

    Ok(AppState::new(store, identity, Arc::new(SystemClock))
        .with_secure_cookies(config.session.cookie_secure))
}

/// Build the application state for the configured backends.
///
/// # Errors
///
/// Returns error if a backend is unreachable.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    match config.storage {
        StorageBackend::Postgres => {
            let store = connect_postgres(&config.database).await?;
            assemble(Arc::new(store), config).await
        }
        StorageBackend::Memory => {
            tracing::warn!("STORAGE_BACKEND=memory, data is lost on restart");
            assemble(Arc::new(InMemoryStore::new()), config).await
        }
    }
}
