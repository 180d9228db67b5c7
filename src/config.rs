use crate::core::conversion::OverRangePolicy;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "hrscore.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub kpi: KpiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub json: bool,
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            json: false,
            log_level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    pub over_range: OverRangePolicy,
    pub warn_weight_mismatch: bool,
    pub fail_on_missing_reference: bool,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            over_range: OverRangePolicy::ClampTop,
            warn_weight_mismatch: true,
            fail_on_missing_reference: false,
        }
    }
}

pub fn load_config(cli_config_path: Option<&Path>, cwd: &Path) -> Result<Config> {
    if let Some(path) = cli_config_path {
        if !path.exists() {
            bail!(
                "config file not found at {} (passed with --config)",
                path.display()
            );
        }
        return read_config(path);
    }

    let local_path = cwd.join(CONFIG_FILE_NAME);
    if local_path.exists() {
        return read_config(&local_path);
    }

    Ok(Config::default())
}

pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "refusing to overwrite existing config file: {}",
            path.display()
        );
    }

    let content = default_config_toml()?;
    fs::write(path, content).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}

pub fn default_config_toml() -> Result<String> {
    toml::to_string_pretty(&Config::default()).context("failed to serialize default config")
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed reading config file {}", path.display()))?;
    let config = toml::from_str::<Config>(&content)
        .with_context(|| format!("failed parsing config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[kpi]
over_range = "zero"
"#,
        )
        .unwrap();

        assert_eq!(config.kpi.over_range, OverRangePolicy::Zero);
        assert!(config.kpi.warn_weight_mismatch);
        assert_eq!(config.general.log_level, "warn");
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let rendered = default_config_toml().unwrap();
        assert!(rendered.contains("over_range = \"clamp_top\""));
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.kpi.over_range, OverRangePolicy::ClampTop);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        write_default_config(&path).unwrap();
        assert!(write_default_config(&path).is_err());

        let loaded = load_config(None, dir.path()).unwrap();
        assert!(!loaded.general.json);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing), dir.path()).is_err());
    }
}
