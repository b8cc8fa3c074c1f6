//! Prepare a PostgreSQL database: run migrations, ensure the admin account
//! and add the sample events to an empty catalog.

use std::sync::Arc;
use ticketing_auth::{IdentityService, InMemorySessionStore};
use ticketing_core::SystemClock;
use ticketing_server::{
    config::Config, connect_postgres, ensure_admin, init_tracing, seed_sample_events,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    let store = Arc::new(connect_postgres(&config.database).await?);

    let identity = IdentityService::new(
        store.clone(),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(SystemClock),
        config.session.ttl,
    );
    ensure_admin(&config, &identity).await?;

    let inserted = seed_sample_events(store.as_ref()).await?;
    info!(inserted, "Seeding finished");
    Ok(())
}
