//! # overlay 子命令 CLI 定义
//!
//! 把物相衍射线按图谱可见窗口缩放后叠加到实测 .xy 图谱上。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/overlay.rs`

use super::UnitArg;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 叠加输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OverlayOutputFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
    /// CSV data file (phase, position, intensity, hkl)
    Csv,
}

/// overlay 子命令参数
#[derive(Args, Debug)]
pub struct OverlayArgs {
    /// Measured pattern (.xy, two columns)
    pub pattern: PathBuf,

    /// Phase files (.jcpds or .cif)
    pub phases: Vec<PathBuf>,

    /// Restore phases, parameters and colors from a saved JSON configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Save the phase configuration to this JSON file
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Pressure in GPa
    #[arg(short = 'P', long)]
    pub pressure: Option<f64>,

    /// Temperature in K
    #[arg(short = 'T', long)]
    pub temperature: Option<f64>,

    /// Apply pressure / temperature to the last phase only
    #[arg(long, default_value_t = false)]
    pub independent: bool,

    /// X-ray wavelength: radiation source name (cu-ka, mo-ka, etc.) or value in Å
    #[arg(short, long, default_value = "0.31")]
    pub wavelength: String,

    /// Unit of the pattern x axis
    #[arg(short, long, value_enum, default_value = "tth")]
    pub unit: UnitArg,

    /// Visible x range (e.g. "5-25"); defaults to the pattern extent
    #[arg(short = 'x', long)]
    pub x_range: Option<String>,

    /// Visible y range (e.g. "0-1500"); defaults to the pattern extent
    #[arg(short = 'y', long)]
    pub y_range: Option<String>,

    /// Output file
    #[arg(short, long, default_value = "overlay.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<OverlayOutputFormat>,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: pattern name)
    #[arg(long)]
    pub title: Option<String>,
}
