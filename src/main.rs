use clap::{Parser, Subcommand};
use coralscan::common::{display_name, CoralImage};
use coralscan::config::Settings;
use coralscan::error::AppError;
use coralscan::pipeline::{
    AnalysisResult, CoralAnalysisOrchestrator, CoralAnalysisService, TracingProgress,
};
use coralscan::species::SpeciesCatalog;
use coralscan::store::{persist_result, JsonLinesResultStore, PersistOutcome, ResultStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::{Service, ServiceExt};
use tracing::{error, warn, Level};

#[derive(Parser)]
#[command(name = "coralscan")]
#[command(version, about = "Coral photograph health and morphology analysis", long_about = None)]
struct Cli {
    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level regardless of settings
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more coral photographs
    Analyze {
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Save matched results to the result store
        #[arg(long)]
        save: bool,

        /// Write `<stem>_enhanced.png` for each image into DIR
        #[arg(long, value_name = "DIR")]
        enhanced_dir: Option<PathBuf>,
    },

    /// List the reference species catalog
    Species,

    /// List saved analyses, newest first
    History,
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        settings.log_level.parse().unwrap_or(Level::INFO)
    };
    init_logging(level);

    match cli.command {
        Commands::Analyze {
            images,
            json,
            save,
            enhanced_dir,
        } => analyze(settings, images, json, save, enhanced_dir).await,
        Commands::Species => {
            print_catalog(&SpeciesCatalog::reference());
            Ok(())
        }
        Commands::History => history(&settings),
    }
}

async fn analyze(
    settings: Settings,
    images: Vec<PathBuf>,
    json: bool,
    save: bool,
    enhanced_dir: Option<PathBuf>,
) -> Result<(), AppError> {
    let store = if save || settings.store.enabled {
        match JsonLinesResultStore::open(&settings.store.path) {
            Ok(store) => Some(store),
            Err(e) => {
                eprintln!("Result store unavailable, analyses will not be saved: {}", e);
                None
            }
        }
    } else {
        None
    };

    let orchestrator = Arc::new(
        CoralAnalysisOrchestrator::builder()
            .settings(settings)
            .progress(TracingProgress)
            .build()?,
    );
    let mut service = CoralAnalysisService::new(orchestrator.clone());

    if let Some(dir) = &enhanced_dir {
        std::fs::create_dir_all(dir)?;
    }

    for path in images {
        let analyzed = match CoralImage::open(&path) {
            Ok(image) => match service.ready().await {
                Ok(ready) => ready.call(image).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        // one failed image never stops the batch
        let result = match analyzed {
            Ok(result) => result,
            Err(e) if e.is_unreadable_input() => {
                warn!("{}", e);
                AnalysisResult::unreadable(display_name(&path))
            }
            Err(e) => {
                error!("Analysis of {} failed: {}", path.display(), e);
                continue;
            }
        };

        if let (Some(dir), Some(enhanced)) = (&enhanced_dir, &result.enhanced) {
            let target = dir.join(enhanced_name(&path));
            if let Err(e) = orchestrator.enhancer().save(enhanced, &target) {
                eprintln!("{}", e);
            }
        }

        if json {
            let view = serde_json::json!({
                "result": &result,
                "insights": result.insights(),
                "guidance": result.guidance(),
                "species_notes": result.species_notes(),
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            print_summary(&result);
        }

        if let Some(store) = &store {
            match persist_result(store, &result) {
                PersistOutcome::Saved(id) => println!("Saved as record #{}", id),
                PersistOutcome::Skipped(reason) => println!("{}", reason),
                PersistOutcome::Failed(notice) => eprintln!("{}", notice),
            }
        }
    }
    Ok(())
}

fn enhanced_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{}_enhanced.png", stem)
}

fn print_summary(result: &AnalysisResult) {
    println!("== {} ==", result.filename);
    match result.dimensions {
        Some((w, h)) => println!("Resolution: {}x{}", w, h),
        None => println!("Image could not be read"),
    }

    let bleaching = &result.bleaching;
    println!("Morphology: {}", result.morphology.morphology);
    if let Some(features) = &result.morphology.features {
        println!(
            "  circularity {:.3}, aspect {:.2}, {} contours",
            features.circularity, features.aspect_ratio, features.contour_count
        );
    }
    println!(
        "Health: {} ({:.1}% bleaching, {:.0}% confidence)",
        bleaching.health_status, bleaching.bleaching_percentage, bleaching.confidence
    );
    match &result.species.record {
        Some(record) => println!(
            "Species: {} ({}), {:.1}% confidence",
            record.common_name, record.scientific_name, result.species.confidence
        ),
        None => println!("Species: Unknown"),
    }

    if let Some(guidance) = result.guidance() {
        println!("{}", guidance);
    }
    if let Some(notes) = result.species_notes() {
        println!("{}", notes);
    }
    println!();
}

fn print_catalog(catalog: &SpeciesCatalog) {
    for record in catalog.records() {
        println!(
            "{:<20} {:<26} {:<14} {:<12} resistance {:<6} {}",
            record.common_name,
            record.scientific_name,
            record.family,
            record.morphology.to_string(),
            record.bleaching_resistance.to_string(),
            record.conservation_status
        );
    }
}

fn history(settings: &Settings) -> Result<(), AppError> {
    let store = JsonLinesResultStore::open(&settings.store.path)?;
    let records = store.list()?;
    if records.is_empty() {
        println!("No saved analyses in {}", store.path().display());
    }
    for record in records {
        println!(
            "#{:<4} {} {:<24} {:<20} {:<20} {:.1}%",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.filename,
            record.predicted_species,
            record.health_status.label(),
            record.bleaching_percentage
        );
    }
    Ok(())
}
