use std::path::Path;
use tracing::info;

use crate::error::TaucoderError;
use crate::models::{Config, ConfigOverrides};

/// Load configuration with CLI overrides
///
/// An explicit `config_path` must exist. Otherwise `taucoder.toml` in
/// `working_dir` is used when present, falling back to defaults.
pub fn load_config(
    working_dir: &Path,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<Config, TaucoderError> {
    let config = match config_path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_from_dir(working_dir)?,
    };
    let config = config.with_overrides(overrides);
    config.validate()?;

    info!(
        "Configuration loaded: url={}, encoder={}, quality={}, poll every {}s",
        config.api.base_url,
        config.encoder.encoder_version,
        config.encoder.quality,
        config.polling.interval_seconds
    );

    Ok(config)
}
