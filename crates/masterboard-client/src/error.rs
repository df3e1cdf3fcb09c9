//! 客户端层错误类型定义

use masterboard_driver::DriverError;
use thiserror::Error;

/// 客户端层错误类型
#[derive(Debug, Error)]
pub enum ClientError {
    /// 驱动层错误（接口调用失败）
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 配置无效（周期、时长、报告间隔、驱动器数量）
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// 配置文件读取或解析失败
    #[error("Config file error: {0}")]
    ConfigFile(String),

    /// 诊断报告输出失败
    #[error("Report output failed: {0}")]
    Report(#[from] std::io::Error),
}
