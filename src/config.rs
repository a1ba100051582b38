use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: Render,
    #[serde(default)]
    pub preview: Preview,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub text: Text,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub security: Security,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Render {
    /// Resolution used for `page_NNN.png` artifacts.
    pub default_dpi: u32,
    pub max_dpi: u32,
}
impl Default for Render {
    fn default() -> Self {
        Self {
            default_dpi: 150,
            max_dpi: 1200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preview {
    pub max_pages: u32,
    pub snippet_chars: usize,
}
impl Default for Preview {
    fn default() -> Self {
        Self {
            max_pages: 10,
            snippet_chars: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cache {
    pub max_listed_files: usize,
}
impl Default for Cache {
    fn default() -> Self {
        Self {
            max_listed_files: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub normalize_unicode: bool,
    pub trim_trailing_whitespace: bool,
}
impl Default for Text {
    fn default() -> Self {
        Self {
            normalize_unicode: false,
            trim_trailing_whitespace: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Output {
    pub json: bool,
    /// Inline rendered PNGs as base64 in JSON output.
    pub embed_images: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_input_file_bytes: u64,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
