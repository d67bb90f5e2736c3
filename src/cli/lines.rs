//! # lines 子命令 CLI 定义
//!
//! 列出一个或多个物相在给定压力 / 温度下的衍射线。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/lines.rs`

use super::UnitArg;

use clap::Args;
use std::path::PathBuf;

/// lines 子命令参数
#[derive(Args, Debug)]
pub struct LinesArgs {
    /// Phase files (.jcpds, or .cif converted on the fly)
    #[arg(required = true)]
    pub phases: Vec<PathBuf>,

    /// Pressure in GPa (applied to every phase)
    #[arg(short = 'P', long)]
    pub pressure: Option<f64>,

    /// Temperature in K (ignored by phases without thermal expansion)
    #[arg(short = 'T', long)]
    pub temperature: Option<f64>,

    /// X-ray wavelength: radiation source name (cu-ka, mo-ka, etc.) or value in Å
    #[arg(short, long, default_value = "0.31")]
    pub wavelength: String,

    /// Unit of the line positions
    #[arg(short, long, value_enum, default_value = "tth")]
    pub unit: UnitArg,

    /// Minimum d-spacing in Å for CIF conversion
    #[arg(long, default_value_t = 0.5)]
    pub min_d: f64,

    /// Minimum relative intensity (%) for CIF conversion
    #[arg(long, default_value_t = 0.5)]
    pub cutoff: f64,

    /// Export the lines of all phases to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
