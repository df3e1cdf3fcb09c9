//! 驱动层错误类型定义

use masterboard_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 协议层错误（如索引越界）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// IO 错误（系统调用失败）
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 接口名称无效（为空、过长或包含 NUL）
    #[error("Invalid interface name: {0}")]
    InvalidInterface(String),

    /// 网络接口不存在
    #[error("Network interface '{0}' does not exist")]
    InterfaceNotFound(String),

    /// 网络接口存在但未启动
    #[error("Network interface '{0}' is down. Bring it up with:\n  sudo ip link set up {0}")]
    InterfaceDown(String),

    /// 当前构建没有可用于该接口的传输后端
    #[error("No master board transport available for interface '{0}' (use 'sim' for the simulated board)")]
    TransportUnavailable(String),

    /// 仿真器配置无效
    #[error("Invalid sim config: {0}")]
    InvalidSimConfig(String),

    /// 在 `init()` 之前调用了收发操作
    #[error("Interface not initialized: call init() first")]
    NotInitialized,

    /// 接口已停止
    #[error("Interface stopped")]
    Stopped,
}
