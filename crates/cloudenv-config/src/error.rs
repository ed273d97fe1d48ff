use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Settings file not found: {0}\nCheck the CLOUDENV_CONFIG_PATH environment variable")]
    SettingsFileNotFound(PathBuf),

    #[error(
        "Missing setting: {0}\n\
        Set it in cloudenv.yaml or through the {1} environment variable"
    )]
    MissingSetting(&'static str, &'static str),

    #[error("Invalid setting {field}: {message}")]
    InvalidSetting {
        field: &'static str,
        message: String,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
