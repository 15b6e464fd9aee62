use std::env;
use std::path::PathBuf;

use crate::definition::SurveyDefinition;
use crate::error::SurveyError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Runtime settings for the binaries
///
/// Defaults are overridden by `SURVEY_HOST`, `SURVEY_PORT` and
/// `SURVEY_DEFINITION`, then by positional arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// JSON survey definition to load instead of the built-in form
    pub definition_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            definition_path: None,
        }
    }
}

impl AppConfig {
    /// Configuration from the process environment and `args`
    ///
    /// `args` excludes the program name: `[port] [definition]`.
    pub fn from_env_and_args(args: &[String]) -> Self {
        Self::from_sources(|key| env::var(key).ok(), args)
    }

    pub fn from_sources(lookup: impl Fn(&str) -> Option<String>, args: &[String]) -> Self {
        let mut config = AppConfig::default();

        if let Some(host) = lookup("SURVEY_HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host;
        }
        if let Some(port) = lookup("SURVEY_PORT").and_then(|p| p.trim().parse().ok()) {
            config.port = port;
        }
        if let Some(path) = lookup("SURVEY_DEFINITION").filter(|p| !p.trim().is_empty()) {
            config.definition_path = Some(PathBuf::from(path));
        }

        if let Some(port) = args.first().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Some(path) = args.get(1) {
            config.definition_path = Some(PathBuf::from(path));
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured survey definition, or the built-in one
    pub fn load_definition(&self) -> Result<SurveyDefinition, SurveyError> {
        match &self.definition_path {
            Some(path) => SurveyDefinition::from_file(path),
            None => Ok(SurveyDefinition::default()),
        }
    }
}
