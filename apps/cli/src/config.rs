//! CLI configuration loading and merging.

use aiplatform_clients::PlatformConfig;
use anyhow::{Context, Result};

/// Load and merge CLI configuration.
///
/// Configuration precedence:
/// 1. CLI arguments (`overrides`)
/// 2. Environment variables
/// 3. Local config file (./.aiplatformrc)
/// 4. Global config file (~/.aiplatform/config.toml)
/// 5. Defaults
pub fn load_config(overrides: &PlatformConfig) -> Result<PlatformConfig> {
    let mut config =
        PlatformConfig::discover_and_load().context("Failed to load platform configuration")?;
    config.merge(overrides);
    Ok(config)
}
