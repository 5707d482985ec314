//! Gesture Pipeline - hand-gesture recognition for presentation control
//!
//! Reads skeleton ticks, recognizes gestures and emits input actions.

use gesture_pipeline::app::cli::{Cli, Commands, ConfigAction, Mode};
use gesture_pipeline::app::config::Config;
use gesture_pipeline::classify::{ClassifierEnsemble, FrequencyEngine};
use gesture_pipeline::dispatch::LogDispatcher;
use gesture_pipeline::features::FeatureExtractor;
use gesture_pipeline::quantize::Codebook;
use gesture_pipeline::sequence::SequenceBuilder;
use gesture_pipeline::session::{JsonLinesSource, Session};
use gesture_pipeline::workflow::{self, ModelStore, ModelTrainer};
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    match cli.mode() {
        Mode::Live { source } => run_live(source.map(|p| p.as_path()), &config)?,
        Mode::Batch { sequence_file } => run_batch(sequence_file, &config)?,
        Mode::Command(Commands::Train { force }) => run_train(*force, &config)?,
        Mode::Command(Commands::Confusion) => run_confusion(&config)?,
        Mode::Command(Commands::Init { force }) => run_init(*force, &config)?,
        Mode::Command(Commands::Config { action }) => run_config(action, &config)?,
    }

    Ok(())
}

fn load_codebook(config: &Config) -> anyhow::Result<Codebook> {
    let path = &config.paths.codebook;
    let codebook = Codebook::load(path)?;
    if codebook.is_empty() {
        return Err(gesture_pipeline::Error::EmptyCodebook.into());
    }
    info!("Loaded {} centroids from {:?}", codebook.len(), path);
    Ok(codebook)
}

/// Load the stored models, training and saving them first if any is unusable
fn load_ensemble(
    codebook: &Codebook,
    config: &Config,
    force_train: bool,
) -> anyhow::Result<ClassifierEnsemble<FrequencyEngine>> {
    let engine = FrequencyEngine::with_smoothing(codebook.len(), config.model.smoothing);
    let builder = SequenceBuilder::new(codebook, config.sequence.window_size)?;
    let trainer = ModelTrainer::new(&engine, builder, &config.paths.dataset_dir);
    let store = ModelStore::new(&config.paths.model_dir);

    let models = store.load_or_train(&trainer, force_train)?;
    let ensemble = workflow::build_ensemble(engine.clone(), models, config.confidence_floor())?;
    Ok(ensemble)
}

fn run_live(source: Option<&Path>, config: &Config) -> anyhow::Result<()> {
    let codebook = load_codebook(config)?;
    let ensemble = load_ensemble(&codebook, config, false)?;

    let reader: Box<dyn BufRead> = match source {
        Some(path) => {
            info!("Reading sensor ticks from {:?}", path);
            let file = std::fs::File::open(path)
                .map_err(|e| anyhow::anyhow!("Cannot open sensor stream {:?}: {}", path, e))?;
            Box::new(std::io::BufReader::new(file))
        }
        None => {
            info!("Reading sensor ticks from stdin");
            Box::new(std::io::stdin().lock())
        }
    };

    let mut session = Session::new(
        codebook,
        ensemble,
        JsonLinesSource::new(reader),
        LogDispatcher::new(),
        config.sequence.window_size,
    )?
    .with_extractor(FeatureExtractor::with_min_scale(config.features.min_scale));

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_handler = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_handler.store(true, Ordering::SeqCst);
    })?;

    info!("Recognizing gestures... Press Ctrl+C to stop");
    let stats = session.run(&stop_flag)?;

    println!("\nSession summary:");
    println!("  Ticks: {}", stats.ticks);
    println!("  Gestures dispatched: {}", session.dispatcher().dispatched());
    println!("  Windows aborted: {}", stats.aborted_windows);
    print!("{}", stats.decisions.render());
    tracing::debug!("Session stats:\n{}", stats.to_json()?);

    Ok(())
}

fn run_batch(sequence_file: &Path, config: &Config) -> anyhow::Result<()> {
    if !sequence_file.exists() {
        anyhow::bail!("Sequence file not found: {:?}", sequence_file);
    }

    let codebook = load_codebook(config)?;
    let ensemble = load_ensemble(&codebook, config, false)?;
    let builder = SequenceBuilder::new(&codebook, config.sequence.window_size)?;

    let tally = workflow::classify_file(&ensemble, &builder, sequence_file)?;
    if tally.total() == 0 {
        anyhow::bail!(
            "{:?} holds no complete window of {} rows",
            sequence_file,
            config.sequence.window_size
        );
    }

    println!("{} sequences in {:?}:", tally.total(), sequence_file);
    print!("{}", tally.render());
    Ok(())
}

fn run_train(force: bool, config: &Config) -> anyhow::Result<()> {
    let codebook = load_codebook(config)?;
    let ensemble = load_ensemble(&codebook, config, force)?;

    println!("Models in {:?}:", config.paths.model_dir);
    for class in ensemble.classes() {
        println!("  {}  ({})", class.label(), class.model_file());
    }
    Ok(())
}

fn run_confusion(config: &Config) -> anyhow::Result<()> {
    let codebook = load_codebook(config)?;
    let ensemble = load_ensemble(&codebook, config, false)?;
    let builder = SequenceBuilder::new(&codebook, config.sequence.window_size)?;

    let confusion = workflow::confusion_matrix(&ensemble, &builder, &config.paths.dataset_dir)?;
    print!("{}", confusion.render());
    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save_default()?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    std::fs::create_dir_all(&config.paths.model_dir)?;
    println!("\nModel directory: {:?}", config.paths.model_dir);

    Ok(())
}

fn run_config(action: &ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Get { key } => match find_config_value(config, key)? {
            Some(v) => println!("{} = {}", key, v),
            None => anyhow::bail!("Configuration key '{}' not found", key),
        },
        ConfigAction::Reset { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            Config::default().save_default()?;
            println!("Configuration reset to defaults at {:?}", config_path);
        }
    }

    Ok(())
}

/// Look up a dotted key such as `decision.confidence_floor`
fn find_config_value(config: &Config, key: &str) -> anyhow::Result<Option<toml::Value>> {
    let root = toml::Value::try_from(config)?;
    Ok(key
        .split('.')
        .try_fold(&root, |value, part| value.get(part))
        .cloned())
}
