//! # Master Board Stats
//!
//! 主控板丢包统计会话命令行工具。
//!
//! 使能受控驱动器及其电机，以 1kHz 运行 20 秒控制循环，周期输出诊断，
//! 结束后打印丢包直方图与丢包率曲线。
//!
//! ```bash
//! # 仿真主控板
//! masterboard-stats -i sim
//!
//! # 自定义会话与仿真参数，并导出运行记录
//! masterboard-stats -i sim -c session.toml -o run.json
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod priority;
mod session;

/// Master Board Stats - 丢包统计会话
#[derive(Parser, Debug)]
#[command(name = "masterboard-stats")]
#[command(about = "Packet-loss statistics session for the master board", long_about = None)]
#[command(version)]
struct Cli {
    /// 网络接口名称（`sim` 或 `sim:<label>` 使用仿真主控板）
    #[arg(short, long)]
    interface: String,

    /// TOML 会话配置文件（`[session]` / `[sim]`）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 运行记录导出路径（JSON）
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // 初始化日志
    masterboard_sdk::init_logger("masterboard_cli=info,masterboard_client=info");

    let cli = Cli::parse();
    session::run(&cli.interface, cli.config.as_deref(), cli.output.as_deref())
}
