//! 周期诊断报告
//!
//! 每个报告先清屏，再依次输出 IMU、ADC、电机、驱动器、命令统计、传感器统计。

use masterboard_driver::{BoardSnapshot, MasterBoard};
use std::io::{self, Write};

/// ANSI 清屏序列
pub const CLEAR_SCREEN: &str = "\x1b[2J";

/// 写出一份诊断报告并刷新输出
pub fn write_report<W, B>(out: &mut W, board: &B, controlled_drivers: usize) -> io::Result<()>
where
    W: Write + ?Sized,
    B: MasterBoard + ?Sized,
{
    let snapshot = BoardSnapshot::capture(board, controlled_drivers);
    writeln!(out, "{}", CLEAR_SCREEN)?;
    write!(out, "{}", snapshot)?;
    out.flush()
}
