use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub automation: AutomationConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the SSE transport binds to; the stdio transport ignores it.
    pub bind_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Text recognition engine: "auto", "vision", or "tesseract".
    pub engine: String,
    /// Matches below this confidence are discarded.
    pub min_confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Timeout applied to every external command invocation.
    pub command_timeout_secs: u64,
    /// Process name System Events queries for windows and clicks.
    pub simulator_process: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Device identifier passed to simctl when a tool call names none.
    pub default_device: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8848".to_string(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: "auto".to_string(),
            min_confidence: 0.3,
        }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 30,
            simulator_process: "Simulator".to_string(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            default_device: "booted".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            ocr: OcrConfig::default(),
            automation: AutomationConfig::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

const DEFAULT_PATHS: [&str; 3] = [
    "./ios-interact.toml",
    "~/.config/ios-interact/config.toml",
    "~/.ios-interact.toml",
];

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Check if any config file exists
        let config_exists = if let Some(path) = config_path {
            Path::new(path).exists()
        } else {
            DEFAULT_PATHS.iter().any(|path| {
                let expanded = shellexpand::tilde(path);
                Path::new(expanded.as_ref()).exists()
            })
        };

        // If no config exists, create and save a default config
        if !config_exists {
            let default_config = Self::default();

            let config_dir = dirs::home_dir()
                .map(|mut path| {
                    path.push(".config");
                    path.push("ios-interact");
                    path
                })
                .unwrap_or_else(|| std::path::PathBuf::from("."));

            std::fs::create_dir_all(&config_dir).ok();

            let config_file = config_dir.join("config.toml");
            match config_file.to_str() {
                Some(path) => {
                    if let Err(e) = default_config.save(path) {
                        warn!("could not save default config: {e}");
                    } else {
                        info!("created default configuration at {}", config_file.display());
                    }
                }
                None => warn!("config path is not valid UTF-8, skipping default write"),
            }

            return Ok(default_config);
        }

        // Load config from file
        let config_path_to_load = if let Some(path) = config_path {
            Some(path.to_string())
        } else {
            DEFAULT_PATHS.iter().find_map(|path| {
                let expanded = shellexpand::tilde(path);
                if Path::new(expanded.as_ref()).exists() {
                    Some(expanded.to_string())
                } else {
                    None
                }
            })
        };

        if let Some(path) = config_path_to_load {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            return Ok(config);
        }

        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        match self.ocr.engine.as_str() {
            "auto" | "vision" | "tesseract" => {}
            other => anyhow::bail!(
                "unknown OCR engine '{other}'. Valid engines: auto, vision, tesseract"
            ),
        }
        if !(0.0..=1.0).contains(&self.ocr.min_confidence) {
            anyhow::bail!(
                "ocr.min_confidence must be between 0.0 and 1.0, got {}",
                self.ocr.min_confidence
            );
        }
        if self.automation.command_timeout_secs == 0 {
            anyhow::bail!("automation.command_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }
}
