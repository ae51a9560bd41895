use crate::frontend::LateSchemaPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SimtokConfig {
    pub language: Option<String>,
    pub schema_policy: Option<String>,
}

impl SimtokConfig {
    pub fn schema_policy(&self) -> anyhow::Result<LateSchemaPolicy> {
        match self.schema_policy.as_deref() {
            None | Some("leave-unresolved") => Ok(LateSchemaPolicy::LeaveUnresolved),
            Some("reprocess") => Ok(LateSchemaPolicy::ReprocessInstances),
            Some(other) => anyhow::bail!(
                "unknown schema_policy '{}' (expected 'leave-unresolved' or 'reprocess')",
                other
            ),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("simtok.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<SimtokConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: SimtokConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &SimtokConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
