//! 仿真主控板
//!
//! [`SimMasterBoard`] 在进程内实现 [`MasterBoard`]，用于无硬件的测试与演示。
//! 行为完全由 [`SimConfig`] 和随机种子决定，可重复。
//!
//! # 模型
//!
//! - **虚拟时间**: 每次 `send_init()` / `send_command()` 推进一个 `tick_period`
//! - **握手**: `init()` 之后第 `ack_after_inits` 次重发时收到 ack；
//!   `None` 表示永不 ack，超过 `handshake_timeout_ms` 后超时
//! - **丢包**: 两个方向按伯努利概率独立丢包；`disconnect_after_ticks` 之后双向全丢
//! - **链路超时**: 超过 `link_timeout_ms` 未收到传感器包时超时，仿真器自行停止
//! - **就绪**: 电机连续收到 `ready_after_ticks` 个使能命令后报告就绪
//!
//! 仿真器不编码任何线上帧格式。

use crate::board::MasterBoard;
use crate::error::DriverError;
use crate::heartbeat::ConnectionMonitor;
use masterboard_protocol::{
    DriverCommand, LinkStats, LossHistogram, LossTracker, MotorSlot, N_MOTORS, N_SLAVES,
    SensorData, check_driver_index,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 电流到加速度的增益（rad/s² per A）
const TORQUE_GAIN: f32 = 20.0;
/// 速度阻尼（1/s）
const VELOCITY_DAMPING: f32 = 2.0;
/// 重力加速度（m/s²）
const GRAVITY: f32 = 9.81;

/// 仿真器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// `init()` 之后第几次 `send_init()` 收到 ack（0 表示 `init()` 时立即 ack，
    /// `None` 表示永不 ack，配置文件中写作 `"never"`）
    #[serde(with = "ack_policy")]
    pub ack_after_inits: Option<u32>,
    /// 握手超时（毫秒，虚拟时间）
    pub handshake_timeout_ms: u64,
    /// 运行期链路超时（毫秒，虚拟时间）
    pub link_timeout_ms: u64,
    /// 每次发送推进的虚拟时间（微秒）
    pub tick_period_us: u64,
    /// 电机就绪前需要收到的使能命令数
    pub ready_after_ticks: u32,
    /// 命令方向丢包率（0.0 ~ 1.0）
    pub cmd_loss_rate: f64,
    /// 传感器方向丢包率（0.0 ~ 1.0）
    pub sensor_loss_rate: f64,
    /// 随机种子
    pub seed: u64,
    /// 发送多少个命令后断开链路（None 表示不断开）
    pub disconnect_after_ticks: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ack_after_inits: Some(0),
            handshake_timeout_ms: 1000,
            link_timeout_ms: 100,
            tick_period_us: 1000,
            ready_after_ticks: 100,
            cmd_loss_rate: 0.0,
            sensor_loss_rate: 0.0,
            seed: 0,
            disconnect_after_ticks: None,
        }
    }
}

impl SimConfig {
    /// 校验配置
    ///
    /// 虚拟时间只随发送推进，`tick_period_us` 为 0 时两种超时都不会触发。
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.tick_period_us == 0 {
            return Err(DriverError::InvalidSimConfig(format!(
                "tick_period_us: {} (must be > 0)",
                self.tick_period_us
            )));
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(self.tick_period_us)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn link_timeout(&self) -> Duration {
        Duration::from_millis(self.link_timeout_ms)
    }
}

/// `ack_after_inits` 的序列化形式：整数或 `"never"`
mod ack_policy {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Never {
        Never,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        After(u32),
        Never(Never),
    }

    pub fn serialize<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(after) => Repr::After(*after),
            None => Repr::Never(Never::Never),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::After(after) => Some(after),
            Repr::Never(_) => None,
        })
    }
}

/// 主控板侧的状态（"真实"的电机与驱动器）
#[derive(Debug, Clone, Default)]
struct BoardSide {
    /// 最近一次送达的命令
    applied: [DriverCommand; N_SLAVES],
    /// 每个电机连续收到使能命令的次数
    enable_streak: [u32; N_MOTORS],
    /// 主控板将要发出的传感器数据
    outgoing: SensorData,
}

impl BoardSide {
    fn new() -> Self {
        let mut side = Self::default();
        side.outgoing.imu.accelerometer = [0.0, 0.0, GRAVITY];
        side
    }

    fn apply(&mut self, commands: &[DriverCommand; N_SLAVES], ready_after: u32) {
        self.applied = *commands;
        for (driver_index, command) in commands.iter().enumerate() {
            self.outgoing.drivers[driver_index].enabled = command.enabled;
            for (offset, slot) in [MotorSlot::First, MotorSlot::Second].into_iter().enumerate() {
                let motor_index = driver_index * 2 + offset;
                let enabled = command.enabled && command.motor(slot).enabled;
                let state = &mut self.outgoing.motors[motor_index];
                state.enabled = enabled;
                if enabled {
                    self.enable_streak[motor_index] = self.enable_streak[motor_index].saturating_add(1);
                } else {
                    self.enable_streak[motor_index] = 0;
                }
                state.ready = enabled && self.enable_streak[motor_index] >= ready_after;
                state.index_detected |= state.ready;
            }
        }
    }

    fn step(&mut self, dt: f32) {
        for driver_index in 0..N_SLAVES {
            let command = self.applied[driver_index];
            for (offset, slot) in [MotorSlot::First, MotorSlot::Second].into_iter().enumerate() {
                let state = &mut self.outgoing.motors[driver_index * 2 + offset];
                let current = if state.enabled && state.ready {
                    command.motor(slot).target_current(state.position, state.velocity)
                } else {
                    0.0
                };
                let acceleration = TORQUE_GAIN * current - VELOCITY_DAMPING * state.velocity;
                state.velocity += acceleration * dt;
                state.position += state.velocity * dt;
                state.current = current;
            }
            let m1 = self.outgoing.motors[driver_index * 2].current;
            let m2 = self.outgoing.motors[driver_index * 2 + 1].current;
            self.outgoing.drivers[driver_index].adc = [m1.abs() * 0.1, m2.abs() * 0.1];
        }
    }
}

/// 仿真主控板
///
/// # Example
///
/// ```rust
/// use masterboard_driver::{MasterBoard, SimConfig, SimMasterBoard};
///
/// let mut board = SimMasterBoard::new("sim", SimConfig::default());
/// board.init().unwrap();
/// assert!(board.is_ack_received());
///
/// board.driver_command(0).unwrap().enable();
/// board.send_command().unwrap();
/// board.parse_sensor_data().unwrap();
/// assert!(board.driver(0).unwrap().enabled);
/// ```
#[derive(Debug)]
pub struct SimMasterBoard {
    interface: String,
    config: SimConfig,
    rng: StdRng,
    now: Duration,
    handshake_started: Duration,
    initialized: bool,
    ack_received: bool,
    timeout: bool,
    stopped: bool,
    inits_sent: u32,
    commands_sent: u64,
    stop_count: u32,
    commands: [DriverCommand; N_SLAVES],
    board: BoardSide,
    sensors: SensorData,
    cmd_tracker: LossTracker,
    sensor_tracker: LossTracker,
    monitor: ConnectionMonitor,
}

impl SimMasterBoard {
    /// 创建仿真器
    ///
    /// 丢包率会被钳位到 `[0.0, 1.0]`。
    pub fn new(interface: impl Into<String>, mut config: SimConfig) -> Self {
        for (name, rate) in [
            ("cmd_loss_rate", &mut config.cmd_loss_rate),
            ("sensor_loss_rate", &mut config.sensor_loss_rate),
        ] {
            if !(0.0..=1.0).contains(&*rate) {
                let clamped = if rate.is_nan() { 0.0 } else { (*rate).clamp(0.0, 1.0) };
                warn!("Sim {} {} out of [0, 1], using {}", name, rate, clamped);
                *rate = clamped;
            }
        }
        let rng = StdRng::seed_from_u64(config.seed);
        let monitor = ConnectionMonitor::new(config.link_timeout(), Duration::ZERO);
        Self {
            interface: interface.into(),
            config,
            rng,
            now: Duration::ZERO,
            handshake_started: Duration::ZERO,
            initialized: false,
            ack_received: false,
            timeout: false,
            stopped: false,
            inits_sent: 0,
            commands_sent: 0,
            stop_count: 0,
            commands: [DriverCommand::default(); N_SLAVES],
            board: BoardSide::new(),
            sensors: SensorData::default(),
            cmd_tracker: LossTracker::new(),
            sensor_tracker: LossTracker::new(),
            monitor,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// `stop()` 被调用的次数
    pub fn stop_count(&self) -> u32 {
        self.stop_count
    }

    /// `send_command()` 的调用次数
    pub fn commands_sent(&self) -> u64 {
        self.commands_sent
    }

    /// `init()` 之后 `send_init()` 的重发次数
    pub fn inits_sent(&self) -> u32 {
        self.inits_sent
    }

    /// 仿真器的虚拟时间
    pub fn virtual_time(&self) -> Duration {
        self.now
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn ensure_running(&self) -> Result<(), DriverError> {
        if self.stopped {
            return Err(DriverError::Stopped);
        }
        if !self.initialized {
            return Err(DriverError::NotInitialized);
        }
        Ok(())
    }

    fn is_disconnected(&self) -> bool {
        self.config
            .disconnect_after_ticks
            .is_some_and(|after| self.commands_sent > after)
    }

    /// 按丢包率掷骰，返回 true 表示丢失
    fn roll_loss(&mut self, rate: f64) -> bool {
        rate > 0.0 && self.rng.gen_bool(rate)
    }

    fn check_ack(&mut self) {
        match self.config.ack_after_inits {
            Some(after) if self.inits_sent >= after => {
                self.ack_received = true;
                self.monitor.register_feedback(self.now);
                info!(
                    "Sim master board '{}' ack received after {} init retransmissions",
                    self.interface, self.inits_sent
                );
            },
            _ => {
                if self.now.saturating_sub(self.handshake_started) >= self.config.handshake_timeout()
                {
                    self.shut_down_on_timeout("handshake");
                }
            },
        }
    }

    /// 检测到超时后自行停止（不计入 `stop_count`）
    fn shut_down_on_timeout(&mut self, phase: &str) {
        warn!(
            "Sim master board '{}' {} timeout at {:?}",
            self.interface, phase, self.now
        );
        self.timeout = true;
        self.stopped = true;
        for command in &mut self.commands {
            command.shutdown();
        }
    }
}

impl MasterBoard for SimMasterBoard {
    fn interface(&self) -> &str {
        &self.interface
    }

    fn init(&mut self) -> Result<(), DriverError> {
        if self.stopped {
            return Err(DriverError::Stopped);
        }
        self.initialized = true;
        self.inits_sent = 0;
        self.handshake_started = self.now;
        debug!("Sim master board '{}' init", self.interface);
        self.check_ack();
        Ok(())
    }

    fn send_init(&mut self) -> Result<(), DriverError> {
        self.ensure_running()?;
        if self.ack_received {
            return Ok(());
        }
        self.now += self.config.tick_period();
        self.inits_sent += 1;
        self.check_ack();
        Ok(())
    }

    fn is_ack_received(&self) -> bool {
        self.ack_received
    }

    fn is_timeout(&self) -> bool {
        self.timeout
    }

    fn driver_command(&mut self, index: usize) -> Result<&mut DriverCommand, DriverError> {
        let index = check_driver_index(index)?;
        Ok(&mut self.commands[index])
    }

    fn parse_sensor_data(&mut self) -> Result<(), DriverError> {
        self.ensure_running()?;
        let lost = self.is_disconnected() || self.roll_loss(self.config.sensor_loss_rate);
        self.sensor_tracker.record(!lost);
        if !lost {
            self.sensors = self.board.outgoing;
            self.monitor.register_feedback(self.now);
        }
        Ok(())
    }

    fn send_command(&mut self) -> Result<(), DriverError> {
        self.ensure_running()?;
        self.commands_sent += 1;
        self.now += self.config.tick_period();

        let lost = self.is_disconnected() || self.roll_loss(self.config.cmd_loss_rate);
        self.cmd_tracker.record(!lost);
        if !lost {
            self.board.apply(&self.commands, self.config.ready_after_ticks);
        }
        self.board.step(self.config.tick_period().as_secs_f32());

        if self.ack_received && !self.monitor.check_connection(self.now) {
            self.shut_down_on_timeout("link");
        }
        Ok(())
    }

    fn sensor_data(&self) -> &SensorData {
        &self.sensors
    }

    fn cmd_stats(&self) -> LinkStats {
        self.cmd_tracker.stats()
    }

    fn sensor_stats(&self) -> LinkStats {
        self.sensor_tracker.stats()
    }

    fn cmd_histogram(&self) -> LossHistogram {
        self.cmd_tracker.histogram()
    }

    fn sensor_histogram(&self) -> LossHistogram {
        self.sensor_tracker.histogram()
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        self.stop_count += 1;
        if self.stopped {
            debug!("Sim master board '{}' already stopped", self.interface);
            return Ok(());
        }
        for command in &mut self.commands {
            command.shutdown();
        }
        self.stopped = true;
        info!(
            "Sim master board '{}' stopped after {} commands",
            self.interface, self.commands_sent
        );
        Ok(())
    }
}
