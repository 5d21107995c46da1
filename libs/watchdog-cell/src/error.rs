use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchdogError {
    #[error("device not watched: {0}")]
    DeviceNotWatched(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] shared_config::ConfigError),
}
