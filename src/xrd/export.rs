//! # 衍射线数据导出
//!
//! 导出物相衍射线到 CSV。
//!
//! ## 支持格式
//! - 衍射线表: phase, h, k, l, d0, d, 位置, 强度
//! - 叠加结果: phase, color, h, k, l, 位置, 缩放强度, 基线
//!
//! ## 依赖关系
//! - 被 `commands/lines.rs`、`commands/overlay.rs` 调用
//! - 使用 `phase/` 的 PhaseCollection 和 RescaledLines
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{Result, XrdPhaseError};
use crate::phase::{PatternUnit, PhaseCollection, RescaledLines};

use std::path::Path;

/// 导出全部物相在当前条件下的衍射线
pub fn lines_to_csv(
    collection: &PhaseCollection,
    unit: PatternUnit,
    wavelength: f64,
    output_path: &Path,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    let position_col = format!("position_{}", unit);

    wtr.write_record([
        "phase",
        "h",
        "k",
        "l",
        "d0",
        "d",
        position_col.as_str(),
        "intensity",
    ])?;

    for i in 0..collection.len() {
        let record = collection.record(i);
        for r in record.reflections() {
            wtr.write_record(&[
                record.name().to_string(),
                r.h.to_string(),
                r.k.to_string(),
                r.l.to_string(),
                format!("{:.6}", r.d0),
                format!("{:.6}", r.d),
                format!("{:.4}", unit.convert_d(r.d, wavelength)),
                format!("{:.2}", r.intensity),
            ])?;
        }
    }

    flush(wtr, output_path)
}

/// 导出叠加缩放结果；`lines[i]` 对应集合中的第 i 个物相
pub fn overlay_to_csv(
    collection: &PhaseCollection,
    lines: &[RescaledLines],
    unit: PatternUnit,
    output_path: &Path,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    let position_col = format!("position_{}", unit);

    wtr.write_record([
        "phase",
        "color",
        "h",
        "k",
        "l",
        position_col.as_str(),
        "intensity",
        "baseline",
    ])?;

    for (i, phase_lines) in lines.iter().enumerate() {
        let record = collection.record(i);
        let color = collection.color(i).to_string();
        let rows = collection.reflection_table(i).rows();

        for ((row, position), intensity) in rows
            .iter()
            .zip(&phase_lines.positions)
            .zip(&phase_lines.intensities)
        {
            wtr.write_record(&[
                record.name().to_string(),
                color.clone(),
                row[2].to_string(),
                row[3].to_string(),
                row[4].to_string(),
                format!("{:.4}", position),
                format!("{:.4}", intensity),
                format!("{:.4}", phase_lines.baseline),
            ])?;
        }
    }

    flush(wtr, output_path)
}

fn flush(mut wtr: csv::Writer<std::fs::File>, output_path: &Path) -> Result<()> {
    wtr.flush().map_err(|e| XrdPhaseError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}
