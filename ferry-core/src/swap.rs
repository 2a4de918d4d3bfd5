//! Swap the pre-authored target configuration into place.

use crate::config::FerryConfig;
use crate::error::{FerryError, Result};

/// Overwrite the active configuration with the target configuration.
///
/// Fails without touching anything if the target file is absent.
pub fn swap_configuration(config: &FerryConfig) -> Result<()> {
    let target = config.resolve(&config.paths.target_config);
    if !target.is_file() {
        log::error!("Target configuration missing; path={}", target.display());
        return Err(FerryError::TargetConfigMissing {
            path: config.paths.target_config.clone(),
        });
    }
    std::fs::copy(&target, config.resolve(&config.paths.config))?;
    log::info!(
        "Copied {} → {}",
        config.paths.target_config.display(),
        config.paths.config.display()
    );
    Ok(())
}
