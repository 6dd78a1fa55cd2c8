use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::error::MiningError;

/// Full mining configuration after merging user and project files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    #[serde(default)]
    pub heuristic: HeuristicConfig,
    #[serde(default)]
    pub scale: ScaleConfig,
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub output: Option<String>,
}

/// Heuristic miner parameters and edge-thickness policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicConfig {
    #[serde(default = "default_min_frequency")]
    pub min_frequency: f64,
    #[serde(default = "default_dependency_threshold")]
    pub dependency_threshold: f64,
    /// Baseline added to every scaled edge thickness.
    #[serde(default = "default_min_edge_thickness")]
    pub min_edge_thickness: f64,
    /// Fixed thickness used when the dependency threshold is exactly zero.
    #[serde(default = "default_zero_threshold_edge_thickness")]
    pub zero_threshold_edge_thickness: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            min_frequency: default_min_frequency(),
            dependency_threshold: default_dependency_threshold(),
            min_edge_thickness: default_min_edge_thickness(),
            zero_threshold_edge_thickness: default_zero_threshold_edge_thickness(),
        }
    }
}

/// Bounds for the frequency-to-scale bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    #[serde(default = "default_max_clusters")]
    pub max_clusters: usize,
    #[serde(default = "default_score_min")]
    pub score_min: f64,
    #[serde(default = "default_score_max")]
    pub score_max: f64,
}

impl ScaleConfig {
    /// Check that the score range is finite and not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`MiningError::InvalidScaleBounds`] otherwise.
    pub fn validate(&self) -> Result<(), MiningError> {
        let (min, max) = (self.score_min, self.score_max);
        if min.is_finite() && max.is_finite() && min <= max {
            Ok(())
        } else {
            Err(MiningError::InvalidScaleBounds { min, max })
        }
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            max_clusters: default_max_clusters(),
            score_min: default_score_min(),
            score_max: default_score_max(),
        }
    }
}

/// Node box dimensions for the default frequency-based node sizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_base_width")]
    pub base_width: f64,
    #[serde(default = "default_base_height")]
    pub base_height: f64,
    /// Extra fraction of the base size granted to the most frequent node.
    #[serde(default = "default_max_growth")]
    pub max_growth: f64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            base_width: default_base_width(),
            base_height: default_base_height(),
            max_growth: default_max_growth(),
        }
    }
}

/// Path of the project config relative to `project_root`.
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".flowmine/config.toml")
}

/// Path of the per-user config, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flowmine/config.toml"))
}

/// Load configuration with precedence project > user > defaults.
///
/// Keys are merged table by table, so a project file that only sets
/// `heuristic.dependency_threshold` keeps every other user setting.
pub fn load_config(project_root: &Path) -> Result<MiningConfig> {
    let user = match user_config_path() {
        Some(path) => read_layer(&path)?,
        None => None,
    };
    let project = read_layer(&project_config_path(project_root))?;
    merge_layers(user, project)
}

/// Merge an optional lower-precedence and higher-precedence TOML layer.
pub fn merge_layers(
    lower: Option<toml::Table>,
    upper: Option<toml::Table>,
) -> Result<MiningConfig> {
    let mut merged = lower.unwrap_or_default();
    if let Some(upper) = upper {
        merge_table(&mut merged, upper);
    }
    let config = toml::Value::Table(merged)
        .try_into::<MiningConfig>()
        .context("Failed to interpret merged configuration")?;
    config.scale.validate().context("Invalid [scale] section")?;
    Ok(config)
}

fn read_layer(path: &Path) -> Result<Option<toml::Table>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let table = toml::from_str::<toml::Table>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config layer");
    Ok(Some(table))
}

fn merge_table(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_table(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Resolve the output mode: `--json` flag, then `FLOWMINE_FORMAT`, then the
/// config file, then TTY detection.
pub fn resolve_output(cli_json: bool, config_output: Option<&str>) -> String {
    let env_format = env::var("FLOWMINE_FORMAT").ok();
    resolve_output_from(cli_json, config_output, env_format.as_deref())
}

fn resolve_output_from(
    cli_json: bool,
    config_output: Option<&str>,
    env_format: Option<&str>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = config_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_min_frequency() -> f64 {
    1.0
}

const fn default_dependency_threshold() -> f64 {
    0.5
}

const fn default_min_edge_thickness() -> f64 {
    1.0
}

const fn default_zero_threshold_edge_thickness() -> f64 {
    0.1
}

const fn default_max_clusters() -> usize {
    8
}

const fn default_score_min() -> f64 {
    0.1
}

const fn default_score_max() -> f64 {
    0.49
}

const fn default_base_width() -> f64 {
    1.5
}

const fn default_base_height() -> f64 {
    0.6
}

const fn default_max_growth() -> f64 {
    0.5
}
