//! 仿真统计会话演示
//!
//! 在仿真主控板上运行 2 秒、带丢包注入的会话，结束后打印文本直方图和汇总。
//!
//! ```bash
//! cargo run -p masterboard-sdk --example stats_session
//! ```

use anyhow::{Context, Result};
use masterboard_sdk::prelude::*;
use masterboard_sdk::tools::{DEFAULT_BAR_WIDTH, LossSummary, render_record};
use masterboard_sdk::init_logger;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() -> Result<()> {
    init_logger("info");

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("设置 Ctrl-C 处理器失败")?;

    let sim = SimConfig {
        cmd_loss_rate: 0.02,
        sensor_loss_rate: 0.01,
        seed: 2024,
        ..SimConfig::default()
    };
    let mut board = MasterBoardBuilder::new()
        .interface("sim:demo")
        .sim_config(sim)
        .build()?;

    let config = LoopConfig {
        duration_ms: 2_000,
        report_every: 500,
        ..LoopConfig::default()
    };
    let record = run_session(
        board.as_mut(),
        &MonotonicClock::new(),
        &config,
        &interrupt,
        &mut std::io::stdout(),
    )?;

    if let Some(message) = record.outcome.message() {
        println!("{}", message);
    }
    print!("{}", render_record(&record, DEFAULT_BAR_WIDTH));

    let summary = LossSummary::calculate(&record.samples);
    println!(
        "{} ticks, {} samples over {:.2}s: command loss {:.3}%, sensor loss {:.3}%",
        record.ticks,
        summary.samples,
        summary.span,
        summary.cmd.final_ratio,
        summary.sensor.final_ratio
    );
    Ok(())
}
