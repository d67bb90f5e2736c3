//! # convert 子命令 CLI 定义
//!
//! 批量把 CIF 结构转换为 JCPDS 物相文件 (.cif -> .jcpds)
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input: CIF file or directory containing CIF files
    pub input: PathBuf,

    /// Output directory for the JCPDS files
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// X-ray wavelength used for the intensities: source name or value in Å
    #[arg(short, long, default_value = "0.31")]
    pub wavelength: String,

    /// Minimum d-spacing in Å
    #[arg(long, default_value_t = 0.5)]
    pub min_d: f64,

    /// Minimum relative intensity (%) of the kept lines
    #[arg(long, default_value_t = 0.5)]
    pub cutoff: f64,

    /// Bulk modulus K0 in GPa written to the output (0 = incompressible)
    #[arg(long)]
    pub k0: Option<f64>,

    /// Pressure derivative K0' written to the output
    #[arg(long)]
    pub k0p: Option<f64>,

    /// Glob pattern for input files (directory mode, comma separated)
    #[arg(short, long, default_value = "*.cif")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
