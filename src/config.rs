use std::{env, path::PathBuf};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rides_file: PathBuf,
    pub max_search_results: Option<usize>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let rides_file = env::var("RIDESHARE_RIDES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("rides.json"));

        let max_search_results = match env::var("RIDESHARE_MAX_RESULTS") {
            Ok(raw) => Some(parse_max_results(&raw)?),
            Err(_) => None,
        };

        Ok(Self {
            rides_file,
            max_search_results,
        })
    }
}

fn parse_max_results(raw: &str) -> Result<usize, AppError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(AppError::Config(
            "RIDESHARE_MAX_RESULTS must be positive".to_string(),
        )),
        Ok(limit) => Ok(limit),
        Err(err) => Err(AppError::Config(format!(
            "invalid RIDESHARE_MAX_RESULTS: {err}"
        ))),
    }
}
