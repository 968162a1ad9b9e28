//! ConfigLoader: single entry point that assembles every configuration source.

use super::merge::merge_policy;
use super::sources::{environment, global_file};
use super::HffConfig;
use crate::error::ApiError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, the global file, an optional explicit file, then environment.
    pub fn load(explicit: Option<&Path>) -> Result<HffConfig, ApiError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApiError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }
        builder = environment::add_to_builder(builder)?;

        let config: HffConfig = builder.build()?.try_deserialize()?;
        debug!(
            endpoint = %config.hub.endpoint,
            revision = %config.hub.revision,
            accelerated = config.transfer.accelerated,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load a single file on top of defaults, ignoring the global file and environment.
    pub fn load_from_file(path: &Path) -> Result<HffConfig, ApiError> {
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Serializes tests that touch process environment.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 7] = [
        "HF_TOKEN",
        "HF_ENDPOINT",
        "HF_HUB_ENABLE_HF_TRANSFER",
        "HFF_CACHE_DIR",
        "HFF_SNAPDIR",
        "XDG_CONFIG_HOME",
        "HOME",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<(&str, Option<String>)> =
            VARS.iter().map(|v| (*v, std::env::var(v).ok())).collect();
        let isolated = TempDir::new().unwrap();
        for v in VARS {
            std::env::remove_var(v);
        }
        std::env::set_var("HOME", isolated.path());
        for (k, v) in vars {
            std::env::set_var(k, v);
        }

        f();

        for (k, v) in saved {
            match v {
                Some(v) => std::env::set_var(k, v),
                None => std::env::remove_var(k),
            }
        }
    }

    #[test]
    fn test_load_defaults_without_sources() {
        with_env(&[], || {
            let config = ConfigLoader::load(None).unwrap();
            assert!(config.hub.token.is_none());
            assert!(config.transfer.accelerated);
            assert_eq!(config.snapshot.namespace, "snapshot");
        });
    }

    #[test]
    fn test_environment_overrides() {
        with_env(
            &[
                ("HF_TOKEN", "hf_secret"),
                ("HF_ENDPOINT", "http://localhost:8080"),
                ("HF_HUB_ENABLE_HF_TRANSFER", "0"),
                ("HFF_SNAPDIR", "backups/snaps"),
            ],
            || {
                let config = ConfigLoader::load(None).unwrap();
                assert_eq!(config.hub.token.as_deref(), Some("hf_secret"));
                assert_eq!(config.hub.endpoint, "http://localhost:8080");
                assert!(!config.transfer.accelerated);
                assert_eq!(config.snapshot.namespace, "backups/snaps");
            },
        );
    }

    #[test]
    fn test_explicit_file_then_env() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("hff.toml");
        std::fs::write(
            &file,
            r#"
[hub]
endpoint = "http://file-endpoint"
token = "from-file"

[snapshot]
namespace = "snaps"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        with_env(&[("HF_TOKEN", "from-env")], || {
            let config = ConfigLoader::load(Some(&file)).unwrap();
            assert_eq!(config.hub.endpoint, "http://file-endpoint");
            assert_eq!(config.hub.token.as_deref(), Some("from-env"));
            assert_eq!(config.snapshot.namespace, "snaps");
            assert_eq!(config.logging.level, "debug");
        });
    }

    #[test]
    fn test_global_file_is_read_from_xdg_config_home() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("hff");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[transfer]\naccelerated = false\n").unwrap();

        with_env(&[("XDG_CONFIG_HOME", temp.path().to_str().unwrap())], || {
            assert_eq!(
                ConfigLoader::global_config_path().unwrap(),
                dir.join("config.toml")
            );
            let config = ConfigLoader::load(None).unwrap();
            assert!(!config.transfer.accelerated);
        });
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        with_env(&[], || {
            let err = ConfigLoader::load(Some(Path::new("/nonexistent/hff.toml"))).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        });
    }
}
