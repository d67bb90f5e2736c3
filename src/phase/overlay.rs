//! # 衍射线叠加缩放
//!
//! 把物相反射表换算到图谱的横坐标单位，并按当前可见窗口内的实测强度
//! 缩放线强度，得到可直接绘制的 (位置, 强度) 序列。
//!
//! ## 缩放规则
//! 1. 窗口内（开区间）实测最大强度，再以可见 y 上限封顶；窗口内无采样时取 1.0
//! 2. 比例因子 = (封顶强度 − 基线) / 窗口内最大线强度；窗口内无线时取 1.0
//! 3. 比例因子 ≤ 0 时取 0.01
//! 4. 全部反射（不只是窗口内的）强度 = 比例因子 × 原始强度 + 基线
//!
//! ## 依赖关系
//! - 被 `phase/collection.rs` 和 `commands/overlay.rs` 使用
//! - 使用 `phase/reflection.rs` 的 ReflectionTable、`pattern.rs` 的 PatternSource

use super::reflection::ReflectionTable;
use crate::error::{Result, XrdPhaseError};
use crate::pattern::PatternSource;

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// 退化比例因子的替代值
const FALLBACK_SCALE: f64 = 0.01;

/// 图谱横坐标单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternUnit {
    /// 2θ（度）
    #[default]
    TwoTheta,
    /// 动量转移 q（Å⁻¹）
    Q,
    /// d 间距（Å）
    D,
}

impl PatternUnit {
    /// 把 d 间距换算到当前单位
    pub fn convert_d(&self, d: f64, wavelength: f64) -> f64 {
        match self {
            PatternUnit::D => d,
            PatternUnit::TwoTheta => two_theta_from_d(d, wavelength),
            PatternUnit::Q => q_from_two_theta(two_theta_from_d(d, wavelength), wavelength),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PatternUnit::TwoTheta => "2θ (°)",
            PatternUnit::Q => "q (Å⁻¹)",
            PatternUnit::D => "d (Å)",
        }
    }
}

impl fmt::Display for PatternUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternUnit::TwoTheta => write!(f, "tth"),
            PatternUnit::Q => write!(f, "q"),
            PatternUnit::D => write!(f, "d"),
        }
    }
}

impl FromStr for PatternUnit {
    type Err = XrdPhaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tth" | "2theta" | "two-theta" | "two_theta" => Ok(PatternUnit::TwoTheta),
            "q" => Ok(PatternUnit::Q),
            "d" => Ok(PatternUnit::D),
            other => Err(XrdPhaseError::InvalidArgument(format!(
                "Unknown unit '{}' (use tth, q or d)",
                other
            ))),
        }
    }
}

/// Bragg 定律：2θ = 2·asin(λ / 2d)，单位度
pub fn two_theta_from_d(d: f64, wavelength: f64) -> f64 {
    2.0 * (wavelength / (2.0 * d)).asin() * 180.0 / PI
}

/// q = 4π/λ · sin(2θ/2)
pub fn q_from_two_theta(two_theta: f64, wavelength: f64) -> f64 {
    4.0 * PI / wavelength * (two_theta / 360.0 * PI).sin()
}

/// 可绘制的叠加线
#[derive(Debug, Clone, PartialEq)]
pub struct RescaledLines {
    /// 每条反射在图谱单位下的位置
    pub positions: Vec<f64>,
    /// 每条反射缩放后的显示强度
    pub intensities: Vec<f64>,
    /// 基线（茎线图的底）
    pub baseline: f64,
}

/// 反射位置换算到图谱单位
pub fn line_positions(table: &ReflectionTable, unit: PatternUnit, wavelength: f64) -> Vec<f64> {
    table
        .d_spacings()
        .into_iter()
        .map(|d| unit.convert_d(d, wavelength))
        .collect()
}

/// 按可见窗口缩放反射强度，返回 (强度, 基线)
pub fn line_intensities<P>(
    table: &ReflectionTable,
    positions: &[f64],
    pattern: &P,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> (Vec<f64>, f64)
where
    P: PatternSource + ?Sized,
{
    let inside = |x: f64| x > x_range.0 && x < x_range.1;
    let baseline = y_range.0;

    let (x, y) = pattern.data();
    let clamp_intensity = x
        .iter()
        .zip(y)
        .filter(|&(&xi, _)| inside(xi))
        .map(|(_, &yi)| yi)
        .reduce(f64::max)
        .map(|max_y| max_y.min(y_range.1))
        .unwrap_or(1.0);

    let raw = table.intensities();
    let max_line_in_window = positions
        .iter()
        .zip(&raw)
        .filter(|&(&pos, _)| inside(pos))
        .map(|(_, &i)| i)
        .reduce(f64::max);

    let mut scale = match max_line_in_window {
        Some(max_line) => (clamp_intensity - baseline) / max_line,
        None => 1.0,
    };
    // NaN（最大线强度为 0）同样视为退化
    if !(scale > 0.0) {
        scale = FALLBACK_SCALE;
    }

    let intensities = raw.iter().map(|&i| scale * i + baseline).collect();
    (intensities, baseline)
}

/// 位置换算 + 强度缩放
pub fn rescale<P>(
    table: &ReflectionTable,
    unit: PatternUnit,
    wavelength: f64,
    pattern: &P,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> RescaledLines
where
    P: PatternSource + ?Sized,
{
    let positions = line_positions(table, unit, wavelength);
    let (intensities, baseline) = line_intensities(table, &positions, pattern, x_range, y_range);
    RescaledLines {
        positions,
        intensities,
        baseline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::phase::params::{EosParams, Symmetry};
    use crate::phase::record::PhaseRecord;
    use crate::phase::reflection::Reflection;

    /// 立方晶胞 a = 3√3，(111) 的 d = 3.0
    fn table() -> ReflectionTable {
        let params = EosParams {
            a0: 3.0 * 3f64.sqrt(),
            ..EosParams::default()
        };
        let record = PhaseRecord::new(
            "t",
            Symmetry::Cubic,
            params,
            vec![
                Reflection::new(1.0, 1.0, 1.0, 100.0, 0.0),
                Reflection::new(2.0, 0.0, 0.0, 40.0, 0.0),
                Reflection::new(2.0, 2.0, 0.0, 20.0, 0.0),
            ],
        )
        .unwrap();
        ReflectionTable::derive(&record)
    }

    fn flat_pattern(y: f64) -> Pattern {
        let x: Vec<f64> = (0..400).map(|i| i as f64 * 0.1).collect();
        let y = vec![y; x.len()];
        Pattern::new("flat", x, y).unwrap()
    }

    #[test]
    fn test_unit_conversion() {
        let tth = PatternUnit::TwoTheta.convert_d(3.0, 1.0);
        let expected = 2.0 * (1.0f64 / 6.0).asin() * 180.0 / PI;
        assert!((tth - expected).abs() < 1e-12);
        assert!((tth - 19.19).abs() < 0.01);

        let q = PatternUnit::Q.convert_d(3.0, 1.0);
        assert!((q - 4.0 * PI * (expected / 360.0 * PI).sin()).abs() < 1e-12);
        // q = 2π/d
        assert!((q - 2.094).abs() < 1e-3);

        assert_eq!(PatternUnit::D.convert_d(3.0, 1.0), 3.0);
    }

    #[test]
    fn test_line_positions_in_d() {
        let positions = line_positions(&table(), PatternUnit::D, 0.31);
        assert!((positions[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rescale_to_pattern_maximum() {
        let table = table();
        let pattern = flat_pattern(500.0);
        // 窗口包含全部三条线（2θ 单位，λ = 1.0）
        let lines = rescale(
            &table,
            PatternUnit::TwoTheta,
            1.0,
            &pattern,
            (5.0, 35.0),
            (10.0, 1000.0),
        );

        assert_eq!(lines.baseline, 10.0);
        // 最强线顶到实测最大值
        assert!((lines.intensities[0] - 500.0).abs() < 1e-9);
        let scale = (500.0 - 10.0) / 100.0;
        assert!((lines.intensities[1] - (scale * 40.0 + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_by_visible_y_range() {
        let table = table();
        let pattern = flat_pattern(5000.0);
        let lines = rescale(
            &table,
            PatternUnit::TwoTheta,
            1.0,
            &pattern,
            (5.0, 35.0),
            (0.0, 800.0),
        );
        assert!((lines.intensities[0] - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_reflection_in_window_uses_unit_scale() {
        let table = table();
        let pattern = flat_pattern(500.0);
        let y0 = 7.0;
        let (intensities, baseline) = line_intensities(
            &table,
            &line_positions(&table, PatternUnit::TwoTheta, 1.0),
            &pattern,
            (36.0, 39.0),
            (y0, 1000.0),
        );
        assert_eq!(baseline, y0);
        for (scaled, raw) in intensities.iter().zip(table.intensities()) {
            assert_eq!(*scaled, raw + y0);
        }
    }

    #[test]
    fn test_empty_pattern_window_clamps_to_one() {
        let table = table();
        let pattern = Pattern::new("empty", vec![], vec![]).unwrap();
        let lines = rescale(
            &table,
            PatternUnit::TwoTheta,
            1.0,
            &pattern,
            (5.0, 35.0),
            (0.0, 100.0),
        );
        // 比例因子 = 1.0 / 100
        assert!((lines.intensities[0] - 1.0).abs() < 1e-12);
        assert!((lines.intensities[1] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_scale_falls_back() {
        let table = table();
        let pattern = flat_pattern(50.0);
        // 基线高于实测最大值 -> 比例因子为负
        let lines = rescale(
            &table,
            PatternUnit::TwoTheta,
            1.0,
            &pattern,
            (5.0, 35.0),
            (100.0, 1000.0),
        );
        assert!((lines.intensities[0] - (0.01 * 100.0 + 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_window_is_open_interval() {
        let table = table();
        let positions = vec![10.0, 20.0, 30.0];
        // 采样都落在边界上 -> 窗口内没有采样，封顶强度取 1.0
        let pattern = Pattern::new("p", vec![10.0, 30.0], vec![999.0, 999.0]).unwrap();
        let (intensities, _) =
            line_intensities(&table, &positions, &pattern, (10.0, 30.0), (0.0, 1e6));

        // 只有 20.0 处的线（强度 40）在窗口内
        let scale = 1.0 / 40.0;
        assert!((intensities[0] - scale * 100.0).abs() < 1e-12);
        assert!((intensities[1] - 1.0).abs() < 1e-12);
        assert!((intensities[2] - scale * 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("tth".parse::<PatternUnit>().unwrap(), PatternUnit::TwoTheta);
        assert_eq!("Q".parse::<PatternUnit>().unwrap(), PatternUnit::Q);
        assert!("energy".parse::<PatternUnit>().is_err());
    }
}
