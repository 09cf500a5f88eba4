use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use courier_db::Services;
use courier_server::{CourierServer, ServerConfig, TokenAuth, DEFAULT_TOKEN_SECRET};

use crate::cli::{CheckConfigArgs, Cli, Command, ServeArgs};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::CheckConfig(args) => cmd_check_config(args),
    }
}

fn resolve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    Ok(config)
}

/// Wire the services and seed the root admin into an empty store.
async fn bootstrap(config: &ServerConfig) -> anyhow::Result<Services> {
    let services = Services::in_memory(config.store_config());
    if let Some(root) = &config.root_admin {
        match services
            .users
            .ensure_root_admin(&root.to_user())
            .await
            .context("creating root admin")?
        {
            Some(user) => tracing::info!(user_id = ?user.id, "root admin created"),
            None => tracing::debug!("users already present, root admin skipped"),
        }
    }
    Ok(services)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let services = bootstrap(&config).await?;
    let auth = TokenAuth::from_config(&config).context("configuring session tokens")?;
    if config.token_secret == DEFAULT_TOKEN_SECRET {
        tracing::warn!("token_secret is the built-in default, set it before exposing the server");
    }

    println!(
        "{} Courier listening on {}",
        "✓".green().bold(),
        config.bind_addr.to_string().bold()
    );
    let server = CourierServer::new(config, services, Arc::new(auth));
    server
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                return;
            }
            tracing::info!("shutdown requested");
        })
        .await?;
    Ok(())
}

fn cmd_check_config(args: CheckConfigArgs) -> anyhow::Result<()> {
    let config = ServerConfig::load(&args.path)
        .with_context(|| format!("loading config from {}", args.path.display()))?;
    println!("{} {} is valid", "✓".green().bold(), args.path.display().to_string().bold());
    println!("  Bind: {}", config.bind_addr.to_string().cyan());
    println!("  Op timeout: {}s", config.op_timeout_secs);
    println!("  Token TTL: {}s", config.token_ttl_secs);
    match &config.root_admin {
        Some(root) => println!("  Root admin: {}", root.email.yellow()),
        None => println!("  Root admin: {}", "none".dimmed()),
    }
    println!("\n{}", config.to_toml()?.dimmed());
    Ok(())
}
