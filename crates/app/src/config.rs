use anyhow::{Context, Result};
use graphwerk_layout::LayoutConfig;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the layout configuration, defaults when no file is given
pub fn load(path: Option<&Path>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read configuration {}", path.display()))?;
    let config: LayoutConfig = ron::from_str(&text)
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Configuration as pretty RON, a starting point for a configuration file
pub fn render(config: &LayoutConfig) -> Result<String> {
    Ok(ron::ser::to_string_pretty(
        config,
        ron::ser::PrettyConfig::default(),
    )?)
}
