//! 命令表定义
//!
//! 主控板每个控制周期把完整的命令表发送给所有驱动器。
//! 这里的结构体只是"要发送什么"的内存表示，编码由具体后端负责。

/// 单个电机的命令
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorCommand {
    /// 电机使能
    pub enabled: bool,
    /// 电流参考值（A）
    pub current_reference: f32,
    /// 位置参考值（rad）
    pub position_reference: f32,
    /// 速度参考值（rad/s）
    pub velocity_reference: f32,
    /// 位置增益
    pub kp: f32,
    /// 速度增益
    pub kd: f32,
    /// 电流饱和值（A），0 表示不限制
    pub current_saturation: f32,
}

impl Default for MotorCommand {
    fn default() -> Self {
        Self {
            enabled: false,
            current_reference: 0.0,
            position_reference: 0.0,
            velocity_reference: 0.0,
            kp: 0.0,
            kd: 0.0,
            current_saturation: 0.0,
        }
    }
}

impl MotorCommand {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn set_current_reference(&mut self, current: f32) {
        self.current_reference = current;
    }

    pub fn set_position_reference(&mut self, position: f32) {
        self.position_reference = position;
    }

    pub fn set_velocity_reference(&mut self, velocity: f32) {
        self.velocity_reference = velocity;
    }

    pub fn set_kp(&mut self, kp: f32) {
        self.kp = kp;
    }

    pub fn set_kd(&mut self, kd: f32) {
        self.kd = kd;
    }

    pub fn set_current_saturation(&mut self, saturation: f32) {
        self.current_saturation = saturation;
    }

    /// 计算驱动器侧的期望电流
    ///
    /// `i = i_ref + kp * (q_ref - q) + kd * (v_ref - v)`，
    /// 若 `current_saturation > 0` 则钳位到 `[-sat, sat]`。
    pub fn target_current(&self, position: f32, velocity: f32) -> f32 {
        let current = self.current_reference
            + self.kp * (self.position_reference - position)
            + self.kd * (self.velocity_reference - velocity);
        if self.current_saturation > 0.0 {
            current.clamp(-self.current_saturation, self.current_saturation)
        } else {
            current
        }
    }
}

/// 单个驱动器的命令（包含两个电机）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverCommand {
    /// 驱动器使能
    pub enabled: bool,
    /// 第一个电机
    pub motor1: MotorCommand,
    /// 第二个电机
    pub motor2: MotorCommand,
    /// 位置翻转（rollover）错误检测
    pub position_rollover_error: bool,
    /// 驱动器命令超时参数（原始值，0 表示禁用）
    pub timeout: u8,
}

impl DriverCommand {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable_position_rollover_error(&mut self) {
        self.position_rollover_error = true;
    }

    pub fn disable_position_rollover_error(&mut self) {
        self.position_rollover_error = false;
    }

    pub fn set_timeout(&mut self, timeout: u8) {
        self.timeout = timeout;
    }

    /// 按槽位访问电机命令
    pub fn motor(&self, slot: crate::MotorSlot) -> &MotorCommand {
        match slot {
            crate::MotorSlot::First => &self.motor1,
            crate::MotorSlot::Second => &self.motor2,
        }
    }

    /// 按槽位可变访问电机命令
    pub fn motor_mut(&mut self, slot: crate::MotorSlot) -> &mut MotorCommand {
        match slot {
            crate::MotorSlot::First => &mut self.motor1,
            crate::MotorSlot::Second => &mut self.motor2,
        }
    }

    /// 关闭驱动器及其两个电机，电流参考归零
    pub fn shutdown(&mut self) {
        self.enabled = false;
        for motor in [&mut self.motor1, &mut self.motor2] {
            motor.disable();
            motor.set_current_reference(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MotorSlot;

    #[test]
    fn test_driver_command_default_disabled() {
        let cmd = DriverCommand::default();
        assert!(!cmd.enabled);
        assert!(!cmd.motor1.enabled);
        assert!(!cmd.motor2.enabled);
        assert!(!cmd.position_rollover_error);
        assert_eq!(cmd.timeout, 0);
    }

    #[test]
    fn test_driver_command_configuration() {
        let mut cmd = DriverCommand::default();
        cmd.motor1.set_current_reference(0.0);
        cmd.motor2.set_current_reference(0.0);
        cmd.motor1.enable();
        cmd.motor2.enable();
        cmd.enable_position_rollover_error();
        cmd.set_timeout(5);
        cmd.enable();

        assert!(cmd.enabled);
        assert!(cmd.motor(MotorSlot::First).enabled);
        assert!(cmd.motor(MotorSlot::Second).enabled);
        assert!(cmd.position_rollover_error);
        assert_eq!(cmd.timeout, 5);

        cmd.shutdown();
        assert!(!cmd.enabled);
        assert!(!cmd.motor1.enabled && !cmd.motor2.enabled);
    }

    #[test]
    fn test_target_current_pd_and_saturation() {
        let mut motor = MotorCommand::default();
        motor.set_kp(5.0);
        motor.set_kd(0.1);
        motor.set_position_reference(1.0);
        assert!((motor.target_current(0.0, 0.0) - 5.0).abs() < 1e-6);

        motor.set_current_saturation(1.0);
        assert_eq!(motor.target_current(0.0, 0.0), 1.0);
        assert_eq!(motor.target_current(2.0, 0.0), -1.0);
    }
}
