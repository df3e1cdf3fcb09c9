//! 会话配置文件
//!
//! TOML 格式，两张表，所有字段都有默认值（空文件即默认配置）：
//!
//! ```toml
//! [session]
//! period_us = 1000
//! duration_ms = 20000
//! report_every = 100
//! controlled_drivers = 1
//! driver_timeout = 5
//!
//! [sim]
//! ack_after_inits = 0
//! cmd_loss_rate = 0.01
//! seed = 7
//! ```

use crate::control::LoopConfig;
use crate::error::ClientError;
use masterboard_driver::SimConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// 会话配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// 会话循环参数
    pub session: LoopConfig,
    /// 仿真主控板参数（仅对 `sim` 接口生效）
    pub sim: SimConfig,
}

impl SessionConfig {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ClientError> {
        let config: SessionConfig =
            toml::from_str(content).map_err(|e| ClientError::ConfigFile(e.to_string()))?;
        config.session.validate()?;
        config
            .sim
            .validate()
            .map_err(|e| ClientError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    /// 从文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ClientError::ConfigFile(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ClientError::ConfigFile(reason) => {
                ClientError::ConfigFile(format!("{}: {}", path.display(), reason))
            },
            other => other,
        })?;
        debug!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// 序列化为 TOML 文本
    pub fn to_toml_string(&self) -> Result<String, ClientError> {
        toml::to_string(self).map_err(|e| ClientError::ConfigFile(e.to_string()))
    }
}
