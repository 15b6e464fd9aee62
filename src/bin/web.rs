#![cfg(not(tarpaulin_include))]

use expense_survey::{AppConfig, app};
use std::env;

/// Main entry point for the survey web application
///
/// Usage: `survey-web [port] [definition.json]`. Host, port and definition
/// can also come from `SURVEY_HOST`, `SURVEY_PORT` and `SURVEY_DEFINITION`;
/// logging is controlled by `RUST_LOG`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = AppConfig::from_env_and_args(&args);

    println!("Starting survey server on http://{}", config.bind_address());
    app::run(config).await
}
