//! # 美化输出工具
//!
//! 统一的终端状态行：`[标签] 消息`。错误和警告写到 stderr，
//! 保证 `lines` 的表格输出可以直接重定向。
//!
//! ## 依赖关系
//! - 被 `main.rs` 和所有 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::{ColoredString, Colorize};

const RULE_WIDTH: usize = 60;

fn status(tag: ColoredString, msg: &str) {
    println!("{} {}", tag, msg);
}

fn status_err(tag: ColoredString, msg: &str) {
    eprintln!("{} {}", tag, msg);
}

pub fn print_success(msg: &str) {
    status("[OK]".green().bold(), msg);
}

pub fn print_error(msg: &str) {
    status_err("[ERR]".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    status_err("[WARN]".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    status("[*]".blue().bold(), msg);
}

pub fn print_skip(msg: &str) {
    status("[SKIP]".dimmed(), msg);
}

pub fn print_done(msg: &str) {
    status("[DONE]".green().bold(), msg);
}

/// 打印单个文件的转换结果 `from -> to`
pub fn print_conversion(from: &str, to: &str) {
    status(
        "[OK]".green().bold(),
        &format!("{} {} {}", from.dimmed(), "->".cyan(), to),
    );
}

/// 打印标题栏；标题超过默认宽度时横线随之加长
pub fn print_header(title: &str) {
    let width = RULE_WIDTH.max(title.chars().count() + 4);
    let rule = "─".repeat(width);
    println!("\n{}", rule.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", rule.dimmed());
}
