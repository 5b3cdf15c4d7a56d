use crate::channels::TelegramChannel;
use crate::config::{Config, apply_env_overrides, load_config};
use crate::dispatch::Dispatcher;
use crate::gateway::{self, GatewayState};
use crate::providers::openai::OpenAIProvider;
use crate::session::{IdleExpiry, NeverEvict, SessionManager};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "telerelay")]
#[command(about = "Telegram webhook relay backed by an LLM", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the webhook endpoint (default)
    Serve(ServeArgs),
    /// Manage the Telegram webhook registration
    Webhook {
        #[command(subcommand)]
        cmd: WebhookCommands,
    },
}

#[derive(clap::Args, Default)]
struct ServeArgs {
    /// JSON config file; environment variables override its values
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
    /// Listen port (overrides PORT)
    #[arg(long, short = 'p')]
    port: Option<u16>,
    /// Skip registering the webhook with Telegram on startup
    #[arg(long)]
    no_register_webhook: bool,
}

#[derive(Subcommand)]
enum WebhookCommands {
    /// Register WEBHOOK_URL with Telegram
    Set {
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
    /// Remove the webhook registration
    Delete {
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => serve(args).await,
        Commands::Webhook { cmd } => match cmd {
            WebhookCommands::Set { config } => webhook_set(config).await,
            WebhookCommands::Delete { config } => webhook_delete(config).await,
        },
    }
}

/// File, then environment. Validation is left to the caller.
fn resolve_config(path: Option<&PathBuf>) -> Result<Config> {
    let mut config = load_config(path.map(PathBuf::as_path))?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn build_sessions(config: &Config) -> SessionManager {
    let max_history = config.session.max_history_messages;
    if config.session.idle_ttl_secs > 0 {
        let ttl = Duration::from_secs(config.session.idle_ttl_secs);
        info!("sessions expire after {}s of inactivity", ttl.as_secs());
        SessionManager::with_policy(Box::new(IdleExpiry::new(ttl)), max_history)
    } else {
        SessionManager::with_policy(Box::new(NeverEvict), max_history)
    }
}

fn spawn_session_sweeper(
    sessions: Arc<SessionManager>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sessions.sweep().await;
        }
    })
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = resolve_config(args.config.as_ref())?;
    if let Some(port) = args.port {
        config.gateway.port = port;
    }
    if args.no_register_webhook {
        config.telegram.register_webhook = false;
    }
    config.validate()?;
    debug!("effective config: {:?}", config);

    let provider = Arc::new(
        OpenAIProvider::with_config(
            config.provider.api_key.clone(),
            config.provider.model.clone(),
            config.provider.api_base.clone(),
            config.provider.name.clone(),
        )
        .with_sampling(config.provider.max_tokens, config.provider.temperature),
    );
    info!(
        "completion provider: {} ({})",
        provider.provider_name(),
        config.provider.api_base
    );
    let telegram = Arc::new(TelegramChannel::new(&config.telegram.token));
    let sessions = Arc::new(build_sessions(&config));

    let sweeper = sessions.needs_sweep().then(|| {
        spawn_session_sweeper(
            sessions.clone(),
            Duration::from_secs(config.session.sweep_interval_secs),
        )
    });

    let dispatcher = Arc::new(Dispatcher::new(
        telegram.clone(),
        provider,
        sessions,
        config.chat.clone(),
    ));

    if config.telegram.register_webhook {
        let endpoint = config.telegram.webhook_endpoint()?;
        telegram
            .register_webhook(endpoint)
            .await
            .context("Webhook registration failed")?;
    } else {
        info!("skipping webhook registration");
    }

    let (server, addr) = gateway::start(
        &config.gateway.host,
        config.gateway.port,
        GatewayState::new(dispatcher),
    )
    .await
    .with_context(|| {
        format!(
            "Failed to bind {}:{}",
            config.gateway.host, config.gateway.port
        )
    })?;
    info!(
        "telerelay {} ready on {} (model {})",
        crate::VERSION,
        addr,
        config.provider.model
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
        res = server => {
            if let Err(e) = res {
                warn!("gateway task ended unexpectedly: {}", e);
            }
        }
    }

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    Ok(())
}

async fn webhook_set(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path.as_ref())?;
    let endpoint = config.telegram.webhook_endpoint()?;
    require_token(&config)?;
    TelegramChannel::new(&config.telegram.token)
        .register_webhook(endpoint.clone())
        .await?;
    println!("Webhook set to {}", endpoint);
    Ok(())
}

async fn webhook_delete(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path.as_ref())?;
    require_token(&config)?;
    TelegramChannel::new(&config.telegram.token)
        .delete_webhook()
        .await?;
    println!("Webhook removed");
    Ok(())
}

fn require_token(config: &Config) -> Result<()> {
    if config.telegram.token.trim().is_empty() {
        anyhow::bail!("TELEGRAM_TOKEN is not set");
    }
    Ok(())
}
