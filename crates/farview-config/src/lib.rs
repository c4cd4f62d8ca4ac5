//! Configuration for the Farview preview renderer.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, CameraConfig, Config, DebugConfig, DepthConfig, PreviewConfig, SkyConfig,
    StarLayerConfig, default_config_dir,
};
pub use error::ConfigError;
