//! # 晶体结构 → 物相记录
//!
//! 读取 CIF 结构，在给定波长下计算 d ≥ `min_d_spacing` 的衍射线，
//! 去掉相对强度低于 `intensity_cutoff` 的线，得到一个没有压缩参数
//! （K0 = 0）的物相记录。
//!
//! ## 依赖关系
//! - 被 `loaders/mod.rs`、`phase/collection.rs` 和 `commands/convert.rs` 使用
//! - 使用 `loaders/cif.rs`、`xrd/calculator.rs`

use super::cif::parse_cif_file;
use super::{ConversionParams, StructureConverter};
use crate::error::{PhaseLoadError, Result};
use crate::models::Crystal;
use crate::phase::{EosParams, PhaseRecord, Reflection, Symmetry};
use crate::xrd::XrdCalculator;

use std::path::Path;

/// CIF 转换器
#[derive(Debug, Clone, Copy, Default)]
pub struct CifConverter;

impl StructureConverter for CifConverter {
    fn convert(
        &self,
        path: &Path,
        params: &ConversionParams,
    ) -> std::result::Result<PhaseRecord, PhaseLoadError> {
        parse_cif_file(path)
            .and_then(|crystal| crystal_to_phase(&crystal, params))
            .map_err(|e| PhaseLoadError::new(path.display().to_string(), e.to_string()))
    }
}

/// 由晶体结构生成物相记录
pub fn crystal_to_phase(crystal: &Crystal, params: &ConversionParams) -> Result<PhaseRecord> {
    let pattern = XrdCalculator::new(params.wavelength).calculate(crystal, params.min_d_spacing)?;

    let reflections: Vec<Reflection> = pattern
        .peaks
        .iter()
        .filter(|peak| peak.intensity >= params.intensity_cutoff)
        .map(|peak| {
            Reflection::new(
                peak.h as f64,
                peak.k as f64,
                peak.l as f64,
                peak.intensity,
                peak.d_spacing,
            )
        })
        .collect();

    log::debug!(
        "{}: {} of {} reflections above {}%",
        crystal.name,
        reflections.len(),
        pattern.peaks.len(),
        params.intensity_cutoff
    );

    let (a, b, c, alpha, beta, gamma) = crystal.lattice.parameters();
    let symmetry = structure_symmetry(crystal);
    let eos = EosParams {
        a0: a,
        b0: b,
        c0: c,
        alpha0: alpha,
        beta0: beta,
        gamma0: gamma,
        k0: 0.0,
        ..EosParams::default()
    };

    let comment = format!("{} converted from {}", crystal.formula(), crystal.name);
    Ok(PhaseRecord::new(crystal.name.clone(), symmetry, eos, reflections)?.with_comment(comment))
}

/// 空间群给出的晶系；菱面体轴设置的三方结构按晶胞判断
fn structure_symmetry(crystal: &Crystal) -> Symmetry {
    let (a, b, c, alpha, beta, gamma) = crystal.lattice.parameters();
    let from_cell = Symmetry::from_cell(a, b, c, alpha, beta, gamma);

    match crystal.space_group_number.and_then(Symmetry::from_space_group) {
        Some(Symmetry::Trigonal) if from_cell == Symmetry::Rhombohedral => Symmetry::Rhombohedral,
        Some(symmetry) => symmetry,
        None => from_cell,
    }
}
