use anyhow::Context;
use book_gateway::config::GatewayConfig;
use book_gateway::journal::store::RankedStore;
use book_gateway::journal::{ActivityJournal, JournalWriter, MemoryRankedStore, RedisRankedStore};
use book_gateway::loader;
use book_gateway::service::{DocumentService, router};
use book_gateway::store::{DocumentStore, ElasticStore, MemoryStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Arc::new(parse_args(GatewayConfig::from_env())?);
    let bind_addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_addr))?;

    // 1. Stores, created once and shared by every request:
    let (store, ranked): (Arc<dyn DocumentStore>, Arc<dyn RankedStore>) = if config.in_memory {
        tracing::info!("Running with in-memory document and journal stores");
        (
            Arc::new(MemoryStore::new(config.max_hits)),
            Arc::new(MemoryRankedStore::new()),
        )
    } else {
        let store = ElasticStore::connect(&config.elastic_url, config.max_hits)
            .await
            .with_context(|| format!("cannot reach search engine at {}", config.elastic_url))?;
        let ranked = RedisRankedStore::connect(&config.redis_url)
            .await
            .with_context(|| format!("cannot reach journal store at {}", config.redis_url))?;
        (Arc::new(store), Arc::new(ranked))
    };

    if let Some(path) = &config.seed_csv {
        loader::seed_store(store.as_ref(), path).await?;
    }

    // 2. Journal writer:
    let journal = ActivityJournal::new(ranked).with_retention(config.journal_retention);
    let writer = JournalWriter::spawn(Arc::new(journal), config.journal_queue);

    // 3. Service and HTTP router:
    let service = Arc::new(DocumentService::new(
        store,
        writer.handle(),
        config.request_timeout(),
    ));
    let app = router(service, config.clone());

    // 4. Serve until Ctrl+C:
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 5. Drain the journal:
    writer.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn parse_args(mut config: GatewayConfig) -> anyhow::Result<GatewayConfig> {
    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                config.bind_addr = flag_value(&args, i)?;
                i += 2;
            }
            "--elastic" => {
                config.elastic_url = flag_value(&args, i)?;
                i += 2;
            }
            "--redis" => {
                config.redis_url = flag_value(&args, i)?;
                i += 2;
            }
            "--seed" => {
                config.seed_csv = Some(flag_value(&args, i)?);
                i += 2;
            }
            "--in-memory" => {
                config.in_memory = true;
                i += 1;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: {} [--bind <addr:port>] [--elastic <url>] [--redis <url>] [--seed <file.csv>] [--in-memory]",
                    args[0]
                );
                std::process::exit(0);
            }
            other => {
                tracing::warn!("Ignoring unknown argument {}", other);
                i += 1;
            }
        }
    }

    Ok(config)
}

fn flag_value(args: &[String], i: usize) -> anyhow::Result<String> {
    args.get(i + 1)
        .cloned()
        .with_context(|| format!("{} needs a value", args[i]))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
