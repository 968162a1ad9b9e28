//! Environment source: hub credentials and transfer toggles.
//!
//! Read once while the configuration is built; nothing else in the crate reads
//! these variables.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;

/// Apply environment overrides on top of file sources.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder
        .set_override_option("hub.token", non_empty_var("HF_TOKEN"))?
        .set_override_option("hub.endpoint", non_empty_var("HF_ENDPOINT"))?
        .set_override_option("transfer.cache_dir", non_empty_var("HFF_CACHE_DIR"))?
        .set_override_option("snapshot.namespace", std::env::var("HFF_SNAPDIR").ok())?;

    // Unset means "on"; any explicit value is honored.
    if let Ok(raw) = std::env::var("HF_HUB_ENABLE_HF_TRANSFER") {
        builder = builder.set_override("transfer.accelerated", parse_toggle(&raw))?;
    }
    Ok(builder)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Truthy values: 1, true, yes, on (case-insensitive).
pub fn parse_toggle(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
