use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::{
    engine::{Engine, EngineBuilder, EngineSettings},
    layout,
    systems::{DisruptionSystem, GrowthSystem, PollutionSystem, ResourceSystem},
    world::City,
};

fn default_refresh_rate() -> u64 {
    1
}

fn default_disruptions() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Region layout file, relative to the scenario file.
    pub layout: PathBuf,
    pub max_steps: u64,
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_disruptions")]
    pub disruptions: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Load a YAML scenario (`.yaml`/`.yml`) or a plain line config (anything else).
    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let mut scenario = if is_yaml {
            serde_yaml::from_str::<Scenario>(&data)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            parse_line_config(&data).with_context(|| format!("Failed to parse {}", path.display()))?
        };

        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "region".to_string());
        }
        scenario.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(scenario)
    }
}

/// Layout path on the first line, then the step limit and refresh rate. Each line may carry
/// a `Label:` prefix.
fn parse_line_config(data: &str) -> Result<Scenario> {
    let mut lines = data
        .lines()
        .map(|line| strip_label(line.trim()))
        .filter(|line| !line.is_empty());
    let layout = lines
        .next()
        .ok_or_else(|| anyhow!("missing region layout path"))?;

    let numbers = lines
        .flat_map(str::split_whitespace)
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("expected a non-negative integer, found '{token}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    let &[max_steps, refresh_rate] = numbers.as_slice() else {
        bail!(
            "expected a time limit and a refresh rate, found {} value(s)",
            numbers.len()
        );
    };

    Ok(Scenario {
        name: String::new(),
        layout: PathBuf::from(layout),
        max_steps,
        refresh_rate,
        seed: 0,
        disruptions: default_disruptions(),
        logging: LoggingConfig::default(),
        base_dir: PathBuf::new(),
    })
}

/// A label is a word of two or more letters, possibly several words. A lone drive letter
/// like `C:` is part of a path.
fn strip_label(line: &str) -> &str {
    match line.split_once(':') {
        Some((label, rest))
            if label.chars().count() > 1
                && label.chars().all(|c| c.is_alphabetic() || c == ' ') =>
        {
            rest.trim()
        }
        _ => line,
    }
}

impl Scenario {
    pub fn layout_path(&self) -> PathBuf {
        self.base_dir.join(&self.layout)
    }

    pub fn build_city(&self) -> Result<City> {
        let path = self.layout_path();
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read region layout {}", path.display()))?;
        let city = layout::decode(&text)
            .with_context(|| format!("Failed to decode region layout {}", path.display()))?;
        tracing::info!(width = city.width(), height = city.height(), "region decoded");
        Ok(city)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            scenario_name: self.name.clone(),
            seed: self.seed,
            max_steps: self.max_steps,
            refresh_rate: self.refresh_rate,
        }
    }

    /// Resources, pollution, growth, then disruption when enabled.
    pub fn build_engine(&self) -> Engine {
        let mut builder = EngineBuilder::new(self.engine_settings())
            .with_system(ResourceSystem::new())
            .with_system(PollutionSystem::new())
            .with_system(GrowthSystem::new());
        if self.disruptions {
            builder.push_system(DisruptionSystem::new());
        }
        builder.build()
    }
}
