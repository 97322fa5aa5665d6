//! DataMark command line entry point.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use datamark::config::{AppConfig, ConfigSource};
use datamark::constants::{ZOOM_MAX, ZOOM_MIN};
use datamark::export;
use datamark::input::{EventMerger, InputEvent};
use datamark::{AnnotationStore, HttpStore, Session};
use datamark_canvas::Scene;

#[derive(Parser)]
#[command(name = "datamark")]
#[command(version, about = "Bounding-box annotation for image datasets", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Annotation API server URL
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what the store holds
    Status,

    /// Export the dataset in YOLO training layout
    Export {
        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        out: PathBuf,

        /// Also write a zip archive
        #[arg(long, value_name = "FILE")]
        zip: Option<PathBuf>,
    },

    /// Delete all images, labels and uploads from the store
    Restart,

    /// Feed recorded input events through a headless session
    Replay {
        /// JSON file with a list of input events
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Label to select (created if missing)
        #[arg(short, long, value_name = "NAME")]
        label: Option<String>,
    },
}

type CliResult = Result<(), Box<dyn Error>>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let (mut config, source) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    source.log();
    if let Some(conflict) = config.keybindings.conflict() {
        log::warn!("Keybinding conflict in configuration: {}", conflict);
    }
    config.apply_env(|name| std::env::var(name).ok());
    if let Some(url) = &cli.api_url {
        config.store.base_url = url.clone();
    }

    let result = match cli.command {
        Commands::Status => cmd_status(&config).await,
        Commands::Export { out, zip } => cmd_export(&config, out, zip).await,
        Commands::Restart => cmd_restart(&config).await,
        Commands::Replay { script, label } => cmd_replay(&config, script, label).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Read the config file. Logging is not up yet, so what happened is
/// returned as a [`ConfigSource`] to report afterwards.
fn load_config(cli: &Cli) -> Result<(AppConfig, ConfigSource), Box<dyn Error>> {
    let loaded = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(AppConfig::default_path()),
    };
    Ok(loaded)
}

fn connect(config: &AppConfig) -> Result<Arc<dyn AnnotationStore>, Box<dyn Error>> {
    let store = HttpStore::new(&config.store.base_url)?;
    log::info!("Using store at {}", store.base_url());
    Ok(Arc::new(store))
}

fn new_session(config: &AppConfig, store: Arc<dyn AnnotationStore>) -> Session<Scene> {
    let prefs = &config.preferences;
    let scene = Scene::new(prefs.canvas_width, prefs.canvas_height)
        .with_zoom_limits(ZOOM_MIN, ZOOM_MAX);
    Session::new(store, scene).with_keybindings(config.keybindings.clone())
}

async fn cmd_status(config: &AppConfig) -> CliResult {
    let store = connect(config)?;
    let images = store.all_images().await?;
    let labels = store.labels().await?;
    let highest = store.highest_annotation_id().await?;
    let annotations: usize = images.iter().map(|e| e.annotations.len()).sum();

    println!("Store: {}", config.store.base_url);
    println!("  Images:      {}", images.len());
    println!("  Annotations: {}", annotations);
    println!(
        "  Labels:      {}",
        labels
            .iter()
            .map(|l| l.label_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    match highest {
        Some(id) => println!("  Highest id:  {}", id),
        None => println!("  Highest id:  none"),
    }
    Ok(())
}

async fn cmd_export(config: &AppConfig, out: PathBuf, zip: Option<PathBuf>) -> CliResult {
    let store = connect(config)?;
    let bundle = export::collect(store.as_ref(), &config.export).await?;

    bundle.write_dir(&out)?;
    if let Some(zip) = zip {
        bundle.write_zip_file(&zip)?;
    }

    println!("Exported {} files to {}", bundle.len(), out.display());
    for warning in bundle.warnings() {
        println!("  warning: {}", warning);
    }
    Ok(())
}

async fn cmd_restart(config: &AppConfig) -> CliResult {
    let store = connect(config)?;
    let mut session = new_session(config, store);
    session.restart().await;
    println!("Store cleared");
    Ok(())
}

async fn cmd_replay(config: &AppConfig, script: PathBuf, label: Option<String>) -> CliResult {
    let json = std::fs::read_to_string(&script)?;
    let events: Vec<InputEvent> = serde_json::from_str(&json)?;

    let store = connect(config)?;
    let mut session = new_session(config, Arc::clone(&store));
    if !session.has_previous_data().await {
        return Err("the store holds no images to annotate".into());
    }
    session.resume().await;

    if let Some(name) = label {
        let index = match session.labels().names().iter().position(|n| *n == name.trim()) {
            Some(index) => index,
            None => {
                session.add_label(&name)?;
                session.labels().len() - 1
            }
        };
        session.select_label(index);
    }

    let first = session.sequence().peek();
    let (merger, sources) = EventMerger::new(config.preferences.input_capacity);
    let count = events.len();
    let producer = tokio::spawn(async move {
        for event in events {
            if sources.feed(event).await.is_err() {
                break;
            }
        }
    });

    session.run(merger).await;
    producer.await?;
    let last = session.sequence().peek();
    log::info!("Replayed {} events from {}", count, script.display());

    for entry in store.all_images().await? {
        for annotation in &entry.annotations {
            let committed = annotation
                .annotation_id
                .sequence_number()
                .is_some_and(|n| (first..last).contains(&n));
            if committed {
                let line = serde_json::json!({
                    "imageName": entry.name(),
                    "annotation": annotation,
                });
                println!("{}", line);
            }
        }
    }
    Ok(())
}
