//! 就绪闸门
//!
//! 所有受控电机同时使能且就绪时锁存；锁存后不再检查。

use masterboard_driver::MasterBoard;
use tracing::info;

/// 就绪闸门（锁存）
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    motors: usize,
    latched_at: Option<u64>,
    checks: u64,
}

impl ReadinessGate {
    /// 检查前 `motors` 个电机的闸门
    pub fn new(motors: usize) -> Self {
        Self {
            motors,
            latched_at: None,
            checks: 0,
        }
    }

    /// 在第 `tick` 个 tick 更新闸门，返回是否已就绪
    ///
    /// 只在未锁存时读取电机状态。
    pub fn update<B: MasterBoard + ?Sized>(&mut self, board: &B, tick: u64) -> bool {
        if self.latched_at.is_some() {
            return true;
        }
        self.checks += 1;
        if board.sensor_data().motors_operational(self.motors) {
            info!(
                "All {} controlled motors enabled and ready at tick {}",
                self.motors, tick
            );
            self.latched_at = Some(tick);
            return true;
        }
        false
    }

    pub fn is_ready(&self) -> bool {
        self.latched_at.is_some()
    }

    /// 锁存时的 tick
    pub fn latched_at(&self) -> Option<u64> {
        self.latched_at
    }

    /// 实际执行的检查次数
    pub fn checks(&self) -> u64 {
        self.checks
    }
}
