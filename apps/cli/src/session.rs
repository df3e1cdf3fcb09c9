//! 会话执行与结果输出

use crate::priority;
use anyhow::{Context, Result};
use masterboard_sdk::client::{MonotonicClock, SessionConfig, run_session};
use masterboard_sdk::driver::MasterBoardBuilder;
use masterboard_sdk::tools::{DEFAULT_BAR_WIDTH, LossSummary, RunRecord, render_record};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// 运行一次统计会话并输出结果
pub fn run(interface: &str, config_path: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    println!("-- Start of master board statistics session --");
    priority::raise_current_thread();

    // 设置信号处理（Ctrl+C 结束会话，接口照常关闭）
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("设置 Ctrl-C 处理器失败")?;

    let mut board = MasterBoardBuilder::new()
        .interface(interface)
        .sim_config(config.sim.clone())
        .build()
        .with_context(|| format!("无法打开接口 '{}'", interface))?;

    let record = {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        run_session(
            board.as_mut(),
            &MonotonicClock::new(),
            &config.session,
            &interrupt,
            &mut out,
        )?
    };

    print_results(&record)?;
    println!("-- End of master board statistics session --");

    if let Some(path) = output {
        record.save_json(path)?;
        info!("Run record written to {}", path.display());
    }
    Ok(())
}

fn print_results(record: &RunRecord) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(message) = record.outcome.message() {
        writeln!(out, "{}", message)?;
    }
    write!(out, "{}", render_record(record, DEFAULT_BAR_WIDTH))?;

    let summary = LossSummary::calculate(&record.samples);
    writeln!(
        out,
        "{} ticks ({} overruns), ready at tick {}, {} samples over {:.2}s",
        record.ticks,
        record.overruns,
        record
            .ready_tick
            .map_or_else(|| "-".to_string(), |tick| tick.to_string()),
        summary.samples,
        summary.span
    )?;
    writeln!(
        out,
        "command loss {:.3}% (peak {:.3}%), sensor loss {:.3}% (peak {:.3}%)",
        summary.cmd.final_ratio,
        summary.cmd.peak_interval_ratio,
        summary.sensor.final_ratio,
        summary.sensor.peak_interval_ratio
    )?;
    out.flush()?;
    Ok(())
}
