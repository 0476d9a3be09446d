use anyhow::Result;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use suivi::classify::Classifier;
use suivi::cli::print_help;
use suivi::client::TaskClient;
use suivi::config::Config;
use suivi::context::{AppContext, StandardContext};
use suivi::controller::ReconcileController;
use suivi::store::TrackerStore;
use suivi::view;

enum Command {
    Reconcile,
    Add(String),
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut command = Command::Reconcile;
    let mut root: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" | "help" => {
                print_help("suivi");
                return Ok(());
            }
            "--version" => {
                println!("suivi v{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "-r" | "--root" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| anyhow::anyhow!("--root requires a path"))?;
                root = Some(PathBuf::from(path));
            }
            "-a" | "--add" => {
                i += 1;
                let name = args
                    .get(i)
                    .ok_or_else(|| anyhow::anyhow!("--add requires a list name"))?;
                command = Command::Add(name.clone());
            }
            "-l" | "--list" => {
                command = Command::List;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help("suivi");
                std::process::exit(2);
            }
        }
        i += 1;
    }

    let ctx: Arc<dyn AppContext> = Arc::new(StandardContext::new(root));
    init_logging(ctx.as_ref());

    match command {
        Command::Add(name) => {
            let mut store = TrackerStore::load(ctx.as_ref())?;
            if store.add_list(&name) {
                store.persist(ctx.as_ref(), None).await?;
                view::print_added(&name);
            } else {
                view::print_already_tracked(&name);
            }
        }
        Command::List => {
            let store = TrackerStore::load(ctx.as_ref())?;
            view::print_tracked_lists(store.tracked_lists());
        }
        Command::Reconcile => reconcile(ctx).await?,
    }

    Ok(())
}

async fn reconcile(ctx: Arc<dyn AppContext>) -> Result<()> {
    let config = match Config::load(ctx.as_ref()) {
        Ok(config) => config,
        Err(e) if Config::is_missing_config_error(&e) => {
            log::info!("no config file yet, using defaults");
            Config::default()
        }
        Err(e) => return Err(e),
    };

    // Load first: a corrupt tracker must abort before any network spend.
    let store = TrackerStore::load(ctx.as_ref())?;
    if store.tracked_lists().is_empty() {
        view::print_tracked_lists(store.tracked_lists());
        return Ok(());
    }

    let classifier = Classifier::from_config(&config)?;

    if config.tasks_token.is_empty() {
        anyhow::bail!("no task provider token configured; set tasks_token in config.toml");
    }
    let tasks = TaskClient::new(config.tasks_token.clone());
    let (raw_items_by_list, missing) = tasks.fetch_tracked(store.tracked_lists()).await?;
    view::print_missing_lists(&missing);

    let mut controller =
        ReconcileController::new(store, Arc::new(classifier), config, ctx.clone());
    let outcomes = controller.run(raw_items_by_list).await?;
    view::print_outcomes(&outcomes);

    Ok(())
}

fn init_logging(ctx: &dyn AppContext) {
    // Logging is best-effort; a read-only data dir must not kill the run.
    if let Some(path) = ctx.get_log_path()
        && let Ok(file) = std::fs::File::create(&path)
    {
        let config = ConfigBuilder::new().set_time_format_rfc3339().build();
        let _ = WriteLogger::init(LevelFilter::Info, config, file);
    }
}
