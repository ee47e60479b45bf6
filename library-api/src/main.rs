use library_api::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let repository = if config.storage.seed {
        InMemoryLibraryRepository::seeded()
    } else {
        InMemoryLibraryRepository::new()
    };
    tracing::info!(seeded = config.storage.seed, "In-memory library store ready");

    let state = AppState::new(config.clone(), repository)?;
    let maintenance = spawn_maintenance(&state, MAINTENANCE_INTERVAL);
    let app = router(state);

    let result = Server::new(config).serve(app).await;

    maintenance.abort();
    result
}
