//! # xrdphase - 物相衍射线叠加工具
//!
//! 把 JCPDS / CIF 物相在给定压力、温度下的衍射线列出、导出，
//! 或叠加到实测一维图谱上。
//!
//! ## 子命令
//! - `lines`   - 列出物相在给定条件下的衍射线
//! - `convert` - 批量把 CIF 结构转换为 JCPDS 物相
//! - `overlay` - 把物相衍射线缩放后叠加到 .xy 图谱
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── xrdphase (库：phase/, loaders/, xrd/, config)
//!   ├── batch/      (批量处理)
//!   └── utils/      (工具函数)
//! ```

mod batch;
mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;
use env_logger::Env;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
