use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Local page under verification. A web server must already be listening
/// here; the runner never starts one.
pub const DEFAULT_TARGET_URL: &str = "http://localhost:8000";
/// Section that must be reachable by scrolling.
pub const DEFAULT_SECTION_SELECTOR: &str = "#contact";
/// Screenshot destination, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "verification/verification.png";

const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VerifyConfig {
    pub target_url: String,
    pub section_selector: String,
    pub output_path: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
    pub element_timeout_ms: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            section_selector: DEFAULT_SECTION_SELECTOR.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            element_timeout_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
        }
    }
}

impl VerifyConfig {
    pub fn load() -> Self {
        let paths = vec![
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("verishot/config.toml"),
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".verishot/config.toml"),
        ];

        for path in paths {
            if path.exists() {
                match fs::read_to_string(&path) {
                    Ok(content) => match toml::from_str(&content) {
                        Ok(config) => {
                            tracing::info!("Loaded config from {}", path.display());
                            return config;
                        }
                        Err(e) => {
                            tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Self::default()
    }

    /// Target URL with a scheme, validated, suitable for `Page::goto`.
    pub fn target(&self) -> Result<Url, url::ParseError> {
        Url::parse(&normalize_url(&self.target_url))
    }
}

pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}
