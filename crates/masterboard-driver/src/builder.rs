//! Builder 模式实现
//!
//! 根据接口名称选择主控板后端。

use crate::board::MasterBoard;
use crate::error::DriverError;
use crate::sim::{SimConfig, SimMasterBoard};
use tracing::info;

/// 选择仿真后端的接口名称前缀
pub const SIM_INTERFACE: &str = "sim";

/// 主控板 Builder（链式构造）
///
/// # 接口名称
///
/// - `"sim"` 或 `"sim:<label>"`: 进程内仿真主控板
/// - 其他名称: 视为网卡名，先检查网卡存在且为 UP，
///   本构建未包含真实传输后端，因此随后返回 [`DriverError::TransportUnavailable`]
///
/// # Example
///
/// ```
/// use masterboard_driver::{MasterBoard, MasterBoardBuilder, SimConfig};
///
/// let board = MasterBoardBuilder::new()
///     .interface("sim:left")
///     .sim_config(SimConfig::default())
///     .build()
///     .unwrap();
/// assert_eq!(board.interface(), "sim:left");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MasterBoardBuilder {
    interface: Option<String>,
    sim_config: Option<SimConfig>,
}

impl MasterBoardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置接口名称（必填）
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// 设置仿真器配置（可选，仅对仿真后端生效）
    pub fn sim_config(mut self, config: SimConfig) -> Self {
        self.sim_config = Some(config);
        self
    }

    /// 构建主控板实例
    ///
    /// # Errors
    /// - `DriverError::InvalidInterface`: 未设置接口或接口名为空
    /// - `DriverError::InvalidSimConfig`: 仿真器配置无效
    /// - `DriverError::InterfaceNotFound` / `DriverError::InterfaceDown`: 网卡不可用
    /// - `DriverError::TransportUnavailable`: 网卡可用但没有对应的传输后端
    pub fn build(self) -> Result<Box<dyn MasterBoard>, DriverError> {
        let interface = self.interface.unwrap_or_default();
        if interface.is_empty() {
            return Err(DriverError::InvalidInterface(
                "interface name is empty".to_string(),
            ));
        }

        if is_sim_interface(&interface) {
            info!("Using simulated master board on '{}'", interface);
            let config = self.sim_config.unwrap_or_default();
            config.validate()?;
            return Ok(Box::new(SimMasterBoard::new(interface, config)));
        }

        #[cfg(target_os = "linux")]
        {
            if !crate::interface_check::check_interface_status(&interface)? {
                return Err(DriverError::InterfaceDown(interface));
            }
        }

        Err(DriverError::TransportUnavailable(interface))
    }
}

/// 接口名称是否选择仿真后端
pub fn is_sim_interface(interface: &str) -> bool {
    interface == SIM_INTERFACE
        || interface
            .strip_prefix(SIM_INTERFACE)
            .is_some_and(|rest| rest.starts_with(':'))
}
