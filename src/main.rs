use anyhow::{Context, Result};
use nuker::cli::{
    Args, ConfigDiscovery, ConsoleAuthorizer, ConsolePresenter, DeleteConfig, ExecutionMode,
    NukerConfig, render_cooldown, render_usage,
};
use nuker::engine::{
    ActivityLog, CooldownController, DeletionEngine, Notifier, RunOutcome, UsageLedger,
};
use nuker::reddit::{AuthSession, RedditClient};
use nuker::store::{FileStore, MemoryStore, StateStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Activity lines reach the user through the presenter; RUST_LOG can
    // still turn the `nuker::activity` target back on.
    let default_filter = if args.verbose {
        "nuker=debug,nuker::activity=off"
    } else {
        "nuker=info,nuker::activity=off"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let config = load_config(&args)?;

    match mode {
        ExecutionMode::ShowConfig => {
            ConfigDiscovery::show_discovery_info();
            println!();
            println!("State directory: {:?}", config.nuker_dir());
            println!();
            print!("{}", config.redacted().to_toml_string()?);
            Ok(())
        }
        ExecutionMode::Status => show_status(&config).await,
        ExecutionMode::Log { clear } => show_log(&config, clear).await,
        ExecutionMode::Delete(delete) => run_delete(config, delete).await,
    }
}

fn load_config(args: &Args) -> Result<NukerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration override from: {:?}", path);
            NukerConfig::from_toml_file(path)?
        }
        None => ConfigDiscovery::discover_config()?,
    };

    config.apply_env_overrides(|key| std::env::var(key).ok());
    if let Some(state_dir) = &args.state_dir {
        config.state_dir = Some(state_dir.clone());
    }

    Ok(config)
}

async fn open_store(config: &NukerConfig) -> Result<Arc<dyn StateStore>> {
    let store = FileStore::open(config.nuker_dir())
        .await
        .context("Failed to open state store")?;
    Ok(Arc::new(store))
}

async fn show_status(config: &NukerConfig) -> Result<()> {
    let store = open_store(config).await?;
    let cooldown = CooldownController::new(store.clone(), Notifier::silent())
        .get()
        .await?;
    let usage = UsageLedger::new(store, Notifier::silent()).totals().await?;

    println!("{}", render_cooldown(cooldown.as_ref()));
    println!("{}", render_usage(&usage));
    Ok(())
}

async fn show_log(config: &NukerConfig, clear: bool) -> Result<()> {
    let store = open_store(config).await?;
    let log = ActivityLog::new(store, Notifier::silent(), config.engine.max_log_entries);

    if clear {
        log.clear().await?;
        println!("Activity log cleared");
        return Ok(());
    }

    let entries = log.entries().await?;
    if entries.is_empty() {
        println!("Activity log is empty");
    }
    for entry in entries {
        println!("[{}] {}", entry.stamp(), entry.message);
    }
    Ok(())
}

async fn run_delete(mut config: NukerConfig, delete: DeleteConfig) -> Result<()> {
    if let Some(page_size) = delete.page_size {
        config.engine.page_size = page_size;
    }

    let store: Arc<dyn StateStore> = if delete.ephemeral {
        info!("Ephemeral run: state will not be persisted");
        Arc::new(MemoryStore::new())
    } else {
        open_store(&config).await?
    };

    let session = Arc::new(
        AuthSession::new(config.reddit.clone(), Arc::new(ConsoleAuthorizer))
            .context("Invalid Reddit configuration")?,
    );
    let client = Arc::new(RedditClient::new(session.clone()));

    let (notifier, events) = Notifier::channel();
    let presenter = ConsolePresenter::spawn(events);

    let engine = Arc::new(DeletionEngine::new(
        config.engine.clone(),
        session,
        client,
        store,
        notifier,
    ));

    let cancel = CancellationToken::new();
    let watcher = {
        let engine = engine.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            engine.activity().append_warning("abort signal sent").await;
            cancel.cancel();

            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Interrupted again, exiting immediately");
                std::process::exit(130);
            }
        })
    };

    let report = engine.run(delete.kind, cancel).await;
    watcher.abort();
    let _ = watcher.await;
    drop(engine);
    let _ = presenter.await;

    match &report.outcome {
        RunOutcome::Done => {
            println!(
                "Finished: {} {}(s) deleted, nothing left",
                report.deleted, report.kind
            );
            Ok(())
        }
        RunOutcome::Aborted(cause) => {
            println!(
                "Stopped after deleting {} {}(s): {}",
                report.deleted, report.kind, cause
            );
            Ok(())
        }
        RunOutcome::CoolingDown { remaining_secs } => {
            println!("On cooldown, try again in {} seconds", remaining_secs);
            Ok(())
        }
        RunOutcome::Busy => {
            println!("Another run is already in progress");
            Ok(())
        }
    }
}
