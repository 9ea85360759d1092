use actix_web::{web, App, HttpServer};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::{debug, info};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use admission_planner::config::{
    AppConfig, PlanningConfig, DEFAULT_DATASET_PATH, DEFAULT_MODEL_PATH, DEFAULT_TIMETABLE_PATH,
};
use admission_planner::server::{configure, AppState};

/// College admission prediction and planning dashboard
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Historical admissions CSV
    #[arg(long, env = "ADMISSION_DATASET", default_value = DEFAULT_DATASET_PATH)]
    dataset: PathBuf,

    /// Trained model artifact (JSON)
    #[arg(long, env = "ADMISSION_MODEL", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Timetable CSV to load before falling back to generation
    #[arg(long, env = "ADMISSION_TIMETABLE", default_value = DEFAULT_TIMETABLE_PATH)]
    timetable: PathBuf,

    /// Write a generated timetable back to the timetable file
    #[arg(long, env = "ADMISSION_PERSIST_GENERATED")]
    persist_generated: bool,

    /// JSON file overriding the planning ratios and unit costs
    #[arg(long, env = "ADMISSION_PLANNING_CONFIG")]
    planning_config: Option<PathBuf>,

    #[arg(long, env = "ADMISSION_BIND", default_value = "127.0.0.1")]
    bind: String,

    #[arg(short, long, env = "ADMISSION_PORT", default_value_t = 8080)]
    port: u16,
}

fn planning_config(path: Option<&PathBuf>) -> Result<PlanningConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(PlanningConfig::default()),
    }
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .parse_default_env()
        .init();

    debug!("{args:?}");

    let config = AppConfig {
        dataset_path: args.dataset.clone(),
        model_path: args.model.clone(),
        timetable_path: args.timetable.clone(),
        persist_generated: args.persist_generated,
        planning: planning_config(args.planning_config.as_ref())?,
    };

    // dataset and model problems stop the server here, not on first request
    let state = web::Data::new(AppState::load(config)?);

    info!("Starting Admission Planner on http://{}:{}", args.bind, args.port);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((args.bind.as_str(), args.port))?
        .run()
        .await?;

    Ok(())
}
