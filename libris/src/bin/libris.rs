//! Boots an in-memory catalog, seeds it, and prints the authors as JSON.

use libris::{prelude::*, seed};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = LibrisConfig::load()?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log.filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let backend = InMemoryStore::builder().build().await?;
    let catalog = Catalog::new(DocumentStore::new(backend));

    if let Some(path) = config.seed_path() {
        let report = seed::load_seed_file(&catalog, path).await?;
        info!(path, authors = report.authors, books = report.books, "catalog seeded");
    }

    let authors = catalog.list_authors().await?;
    println!("{}", serde_json::to_string_pretty(&authors)?);

    for author in &authors {
        let detail = catalog.author_detail(&author.id).await?;
        println!("{}", serde_json::to_string_pretty(&detail)?);
    }

    catalog.into_store().shutdown().await?;
    Ok(())
}
