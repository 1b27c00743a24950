//! 配置管理模块
//!
//! 提供TOML配置文件的读取、写入和自动发现功能。

use crate::error::{Result, TranslatorError};
use crate::types::TranslatorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// 配置文件结构
///
/// 客户端配置位于 `[translator]` 表中，缺省字段使用默认值。
///
/// # 示例
///
/// ```rust,no_run
/// use google_web_translator::TranslatorFileConfig;
///
/// // 从默认位置加载配置
/// let config = TranslatorFileConfig::load_from_default_locations();
///
/// // 从指定文件加载配置
/// let config = TranslatorFileConfig::from_file("config.toml").unwrap();
///
/// // 保存配置到文件
/// config.save_to_file("output.toml").unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslatorFileConfig {
    /// 客户端配置
    #[serde(default)]
    pub translator: TranslatorConfig,
}

impl TranslatorFileConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| TranslatorError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TranslatorError::Config(e.to_string()))
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| TranslatorError::Config(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| TranslatorError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from multiple possible locations
    pub fn load_from_default_locations() -> Self {
        let possible_paths = [
            "translator-config.toml",
            "config.toml",
            ".translator-config.toml",
        ];

        for path in &possible_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        info!("Loaded configuration from: {}", path);
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", path, e);
                    }
                }
            }
        }

        info!("No configuration file found, using defaults");
        Self::default()
    }

    /// Generate example configuration file
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}
