//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `lines`: 列出物相衍射线
//! - `convert`: CIF → JCPDS 批量转换
//! - `overlay`: 衍射线叠加到实测图谱
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: lines, convert, overlay

pub mod convert;
pub mod lines;
pub mod overlay;

use clap::{Parser, Subcommand, ValueEnum};
use xrdphase::error::{Result, XrdPhaseError};
use xrdphase::phase::PatternUnit;

/// xrdphase - 物相衍射线叠加工具
#[derive(Parser)]
#[command(name = "xrdphase")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Crystal phase diffraction lines under pressure and temperature", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// List the diffraction lines of phases at given conditions
    Lines(lines::LinesArgs),

    /// Convert CIF structures to JCPDS phase files
    Convert(convert::ConvertArgs),

    /// Overlay phase lines on a measured 1D pattern
    Overlay(overlay::OverlayArgs),
}

/// 图谱横坐标单位
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum UnitArg {
    /// Two-theta in degrees
    #[default]
    Tth,
    /// Momentum transfer q in 1/Å
    Q,
    /// d-spacing in Å
    D,
}

impl From<UnitArg> for PatternUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Tth => PatternUnit::TwoTheta,
            UnitArg::Q => PatternUnit::Q,
            UnitArg::D => PatternUnit::D,
        }
    }
}

/// 预定义辐射源波长 (Å)
pub fn get_predefined_wavelength(name: &str) -> Option<f64> {
    match name.to_lowercase().as_str() {
        "cu-ka" | "cuka" => Some(1.5418),
        "cu-ka1" | "cuka1" => Some(1.5406),
        "cu-ka2" | "cuka2" => Some(1.5444),
        "cu-kb1" | "cukb1" => Some(1.3922),
        "mo-ka" | "moka" => Some(0.7107),
        "mo-ka1" | "moka1" => Some(0.7093),
        "co-ka" | "coka" => Some(1.7903),
        "fe-ka" | "feka" => Some(1.9373),
        "cr-ka" | "crka" => Some(2.2910),
        "ag-ka" | "agka" => Some(0.5609),
        _ => None,
    }
}

/// 解析波长输入（辐射源名称或数值）
pub fn parse_wavelength(input: &str) -> Result<f64> {
    if let Some(wl) = get_predefined_wavelength(input) {
        return Ok(wl);
    }
    input
        .parse::<f64>()
        .ok()
        .filter(|wl| *wl > 0.0 && wl.is_finite())
        .ok_or_else(|| {
            XrdPhaseError::InvalidArgument(format!(
                "Invalid wavelength '{}'. Use a number (e.g., 0.3344) or a name: cu-ka, mo-ka, co-ka, fe-ka, cr-ka, ag-ka",
                input
            ))
        })
}

/// 解析 "min-max"、"min:max" 或 "min,max" 形式的范围
pub fn parse_range(range: &str) -> Result<(f64, f64)> {
    let range = range.trim();
    let split = if let Some(pos) = range.find(|c: char| c == ':' || c == ',') {
        Some((&range[..pos], &range[pos + 1..]))
    } else {
        // 跳过首字符，允许负的下限
        range
            .get(1..)
            .and_then(|rest| rest.find('-'))
            .map(|pos| (&range[..pos + 1], &range[pos + 2..]))
    };

    let (min, max) = split.ok_or_else(|| XrdPhaseError::InvalidRange(range.to_string()))?;
    let min: f64 = min
        .trim()
        .parse()
        .map_err(|_| XrdPhaseError::InvalidRange(range.to_string()))?;
    let max: f64 = max
        .trim()
        .parse()
        .map_err(|_| XrdPhaseError::InvalidRange(range.to_string()))?;

    if !(max > min) {
        return Err(XrdPhaseError::InvalidRange(format!(
            "{} (must be min < max)",
            range
        )));
    }

    Ok((min, max))
}
