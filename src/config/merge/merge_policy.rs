//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";
pub const DEFAULT_REVISION: &str = "main";
pub const DEFAULT_SNAPSHOT_NAMESPACE: &str = "snapshot";

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones: defaults, global file, explicit `--config`
/// file, then environment variables.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("hub.endpoint", DEFAULT_ENDPOINT)?
        .set_default("hub.revision", DEFAULT_REVISION)?
        .set_default("transfer.accelerated", true)?
        .set_default("snapshot.namespace", DEFAULT_SNAPSHOT_NAMESPACE)
}
