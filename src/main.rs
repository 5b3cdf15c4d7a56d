use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,hyper=warn,reqwest=warn".parse().unwrap());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    telerelay::cli::run().await
}
