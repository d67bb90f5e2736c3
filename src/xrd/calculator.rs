//! # XRD 衍射峰计算器
//!
//! 从晶体结构计算给定波长下、d 间距不小于截断值的全部衍射峰，
//! 是 CIF → JCPDS 结构转换的核心。
//!
//! ## 算法概述
//! 1. 计算倒易度规张量
//! 2. 由 |h| ≤ a/d_min 确定 (hkl) 搜索范围
//! 3. 计算 d 间距与 Bragg 角
//! 4. 计算结构因子（含占位率）
//! 5. 应用 Lorentz 极化校正
//! 6. 合并等效峰并归一化到 0-100
//!
//! ## 参考
//! - pymatgen.analysis.diffraction.xrd
//! - Structure of Materials by Marc De Graef and Michael E. McHenry
//!
//! ## 依赖关系
//! - 被 `loaders/converter.rs` 调用
//! - 使用 `models/structure.rs` 的 Crystal, Lattice 结构
//! - 使用 `xrd/scattering.rs` 获取原子散射因子

use crate::error::{Result, XrdPhaseError};
use crate::models::structure::d_from_reciprocal_metric;
use crate::models::Crystal;
use crate::xrd::scattering;

use std::cmp::Reverse;
use std::f64::consts::PI;

/// 单个坐标轴上的最大 Miller 指数
const MAX_INDEX: i32 = 40;

/// 合并等效峰时的 d 间距容差（Å）
const D_TOLERANCE: f64 = 1e-5;

/// 衍射峰
#[derive(Debug, Clone)]
pub struct Peak {
    /// 衍射角 2θ（度）
    pub two_theta: f64,
    /// d 间距（Å）
    pub d_spacing: f64,
    /// 相对强度（0-100）
    pub intensity: f64,
    /// Miller 指数 h
    pub h: i32,
    /// Miller 指数 k
    pub k: i32,
    /// Miller 指数 l
    pub l: i32,
}

/// XRD 衍射图谱
#[derive(Debug, Clone)]
pub struct XrdPattern {
    /// 衍射峰列表（按 d 间距降序排列）
    pub peaks: Vec<Peak>,
    /// 使用的波长（Å）
    pub wavelength: f64,
    /// 结构名称
    pub structure_name: String,
}

/// XRD 计算器
pub struct XrdCalculator {
    /// X 射线波长（Å）
    wavelength: f64,
}

impl XrdCalculator {
    /// 创建新的 XRD 计算器
    pub fn new(wavelength: f64) -> Self {
        Self { wavelength }
    }

    /// 计算 d ≥ `min_d_spacing` 的全部衍射峰
    pub fn calculate(&self, crystal: &Crystal, min_d_spacing: f64) -> Result<XrdPattern> {
        if !(self.wavelength > 0.0) {
            return Err(XrdPhaseError::InvalidArgument(format!(
                "Invalid wavelength: {}",
                self.wavelength
            )));
        }
        if !(min_d_spacing > 0.0) {
            return Err(XrdPhaseError::InvalidArgument(format!(
                "Invalid minimum d-spacing: {}",
                min_d_spacing
            )));
        }

        let gs = crystal.lattice.reciprocal_metric().ok_or_else(|| {
            XrdPhaseError::InvalidArgument(format!("Degenerate lattice in '{}'", crystal.name))
        })?;

        // sin(θ) ≤ 1 要求 d ≥ λ/2
        let d_min = min_d_spacing.max(self.wavelength / 2.0);

        let (a, b, c, _, _, _) = crystal.lattice.parameters();
        let limit = |length: f64| ((length / d_min) as i32).clamp(0, MAX_INDEX);
        let (h_max, k_max, l_max) = (limit(a), limit(b), limit(c));

        let mut peaks = Vec::new();

        for h in -h_max..=h_max {
            for k in -k_max..=k_max {
                for l in -l_max..=l_max {
                    // 跳过 (0,0,0)
                    if h == 0 && k == 0 && l == 0 {
                        continue;
                    }

                    let d = match d_from_reciprocal_metric(&gs, h as f64, k as f64, l as f64) {
                        Some(d) if d >= d_min - 1e-9 => d,
                        _ => continue,
                    };

                    let sin_theta = self.wavelength / (2.0 * d);
                    let theta = sin_theta.min(1.0).asin();

                    let (f_real, f_imag) = self.calculate_structure_factor(crystal, [h, k, l], d)?;
                    let f_sq = f_real * f_real + f_imag * f_imag;

                    // 系统消光
                    if f_sq < 1e-10 {
                        continue;
                    }

                    peaks.push(Peak {
                        two_theta: 2.0 * theta.to_degrees(),
                        d_spacing: d,
                        intensity: f_sq * self.lorentz_polarization(theta),
                        h,
                        k,
                        l,
                    });
                }
            }
        }

        let mut peaks = merge_equivalent_peaks(peaks);

        // 归一化强度到 0-100
        let max_i = peaks.iter().map(|p| p.intensity).fold(0.0_f64, f64::max);
        if max_i > 0.0 {
            for p in &mut peaks {
                p.intensity = 100.0 * p.intensity / max_i;
            }
        }

        Ok(XrdPattern {
            peaks,
            wavelength: self.wavelength,
            structure_name: crystal.name.clone(),
        })
    }

    /// 计算结构因子 F(hkl) = Σ occ·f(s)·exp(2πi(hx + ky + lz))
    fn calculate_structure_factor(
        &self,
        crystal: &Crystal,
        hkl: [i32; 3],
        d: f64,
    ) -> Result<(f64, f64)> {
        // s = sin(θ)/λ = 1/(2d)
        let s = 1.0 / (2.0 * d);
        let mut f_real = 0.0;
        let mut f_imag = 0.0;

        for atom in &crystal.atoms {
            let f_atom = scattering::calculate_scattering_factor(&atom.element, s)
                .ok_or_else(|| {
                    XrdPhaseError::InvalidArgument(format!(
                        "No scattering factor for element '{}'",
                        atom.element
                    ))
                })?;

            let r = atom.position;
            let phase = 2.0
                * PI
                * (hkl[0] as f64 * r[0] + hkl[1] as f64 * r[1] + hkl[2] as f64 * r[2]);

            f_real += atom.occupancy * f_atom * phase.cos();
            f_imag += atom.occupancy * f_atom * phase.sin();
        }

        Ok((f_real, f_imag))
    }

    /// Lorentz 极化校正
    fn lorentz_polarization(&self, theta: f64) -> f64 {
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();
        let cos_2theta = (2.0 * theta).cos();

        if sin_theta.abs() < 1e-10 || cos_theta.abs() < 1e-10 {
            return 0.0;
        }

        (1.0 + cos_2theta * cos_2theta) / (sin_theta * sin_theta * cos_theta)
    }
}

/// 合并等效峰（相同 d 间距），强度累加，保留最"简单"的 hkl
fn merge_equivalent_peaks(mut peaks: Vec<Peak>) -> Vec<Peak> {
    peaks.sort_by(|a, b| b.d_spacing.total_cmp(&a.d_spacing));

    let mut merged: Vec<Peak> = Vec::new();
    for peak in peaks {
        match merged.last_mut() {
            Some(existing) if (existing.d_spacing - peak.d_spacing).abs() < D_TOLERANCE => {
                existing.intensity += peak.intensity;
                if hkl_rank(&peak) < hkl_rank(existing) {
                    existing.h = peak.h;
                    existing.k = peak.k;
                    existing.l = peak.l;
                }
            }
            _ => merged.push(peak),
        }
    }
    merged
}

/// 负指数越少、指数越大越靠前：(1 1 1) 优先于 (-1 1 1)，(2 0 0) 优先于 (0 0 2)
fn hkl_rank(peak: &Peak) -> (usize, Reverse<i32>, Reverse<i32>, Reverse<i32>) {
    let negatives = [peak.h, peak.k, peak.l].iter().filter(|&&i| i < 0).count();
    (negatives, Reverse(peak.h), Reverse(peak.k), Reverse(peak.l))
}
