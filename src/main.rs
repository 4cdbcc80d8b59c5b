use std::{net::TcpListener, sync::Arc, time::Duration};

use env_logger::Env;
use magnet::{
    configuration::get_configuration,
    dal::{intent_example_db::PgIntentExampleIndex, lead_db::PgLeadStore},
    services::{EmbeddingClient, IntentClassifier, PageScraper, SearchPipeline, SerperClient},
    startup::run,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let pool_options = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(15 * 60)) // 15 minutes
        .max_lifetime(None);

    let connection_pool = pool_options.connect_lazy_with(configuration.database.with_db());
    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;

    let search_client = SerperClient::new(configuration.search);
    let page_scraper = PageScraper::new();
    let embedding_client = EmbeddingClient::new(configuration.embedding);
    let vector_index = PgIntentExampleIndex::new(connection_pool.clone());
    let lead_store = Arc::new(PgLeadStore::new(connection_pool));

    let classifier = IntentClassifier::new(Arc::new(embedding_client), Arc::new(vector_index));
    let pipeline = SearchPipeline::new(
        Arc::new(search_client),
        Arc::new(page_scraper),
        classifier,
        lead_store.clone(),
    );

    run(listener, pipeline, lead_store)?.await
}
