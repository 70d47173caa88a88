mod battery;
mod history;
mod inference;
mod telemetry;
#[cfg(test)]
mod test_utils;
mod web;

use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;

use crate::battery::{FeatureTensor, PredictionRequest, FEATURE_NAMES};
use crate::inference::{load_model, predict, ModelError, ModelKind, Models, PredictionResult};
use crate::web::api::predict::PredictionResponse;
use crate::web::config::ModelsConfig;
use crate::web::Config;

#[derive(Parser)]
#[command(name = "battery-predictor")]
#[command(about = "Battery SOC/SOH prediction service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (needs a build with `--features onnx` to load models)
    Serve {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
    /// Validate a prediction request file and show the model input rows
    Validate { request: String },
    /// Run a single prediction from a request file (needs `--features onnx`)
    Predict {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
        #[arg(short, long, value_enum)]
        model: ModelKind,
        request: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config),
        Commands::Validate { request } => with_console_logging(|| validate(&request)),
        Commands::Predict {
            config,
            model,
            request,
        } => with_console_logging(|| predict_once(&config, model, &request)),
    }
}

fn with_console_logging(run: impl FnOnce() -> ExitCode) -> ExitCode {
    if let Err(e) = telemetry::init(false) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    run()
}

fn serve(config_path: &str) -> ExitCode {
    let config = match Config::from_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config {}: {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = telemetry::init(config.telemetry.otlp_export) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let models = match load_models(&config.models) {
        Ok(m) => m,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(web::run_server(config, models));
    telemetry::shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let request = match read_request(path) {
        Some(r) => r,
        None => return ExitCode::FAILURE,
    };

    match FeatureTensor::from_request(&request) {
        Ok(tensor) => {
            println!("Request is valid (shape {:?})", tensor.shape());
            println!("  {}", FEATURE_NAMES.join(", "));
            for (i, row) in tensor.rows().outer_iter().enumerate() {
                let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                println!("  {}: {}", i + 1, cells.join(", "));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Invalid request: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn predict_once(config_path: &str, kind: ModelKind, path: &str) -> ExitCode {
    let config = match Config::from_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config {}: {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };

    let request = match read_request(path) {
        Some(r) => r,
        None => return ExitCode::FAILURE,
    };

    let models = match load_models(&config.models) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let value = match predict(&request, models.get(kind)) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Prediction failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let response = PredictionResponse::new(
        PredictionResult {
            kind,
            value,
            input: Some(request),
        },
        config.compat.legacy_soh_response_key,
    );
    match serde_json::to_string_pretty(&response) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to encode response: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_request(path: &str) -> Option<PredictionRequest> {
    let json = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return None;
        }
    };

    match PredictionRequest::from_json(&json) {
        Ok(r) => Some(r),
        Err(e) => {
            eprintln!("Parse error: {}", e);
            None
        }
    }
}

fn load_models(config: &ModelsConfig) -> Result<Models, ModelError> {
    log::info!(
        "Loading SOC model from {} and SOH model from {}",
        config.soc.display(),
        config.soh.display()
    );
    let soc = load_model(&config.soc, config.intra_threads)?;
    let soh = load_model(&config.soh, config.intra_threads)?;
    Ok(Models::new(soc, soh))
}
