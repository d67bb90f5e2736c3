//! # 反射与反射表
//!
//! `Reflection` 是物相记录中的一条预测衍射线；`ReflectionTable` 是由物相记录
//! 当前状态整体导出的 5 列数值表 `[d, I, h, k, l]`，不能单独修改。
//!
//! ## 依赖关系
//! - 被 `phase/record.rs`、`phase/collection.rs` 和 `phase/overlay.rs` 使用

use super::record::PhaseRecord;

use serde::{Deserialize, Serialize};

/// 一条预测的衍射线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    /// Miller 指数
    pub h: f64,
    pub k: f64,
    pub l: f64,
    /// 相对强度
    pub intensity: f64,
    /// 零压 d 间距（Å）
    pub d0: f64,
    /// 当前压力 / 温度下的 d 间距（Å）
    pub d: f64,
}

impl Reflection {
    pub fn new(h: f64, k: f64, l: f64, intensity: f64, d0: f64) -> Self {
        Reflection {
            h,
            k,
            l,
            intensity,
            d0,
            d: d0,
        }
    }

    /// 空白反射 (000)，用于手动添加
    pub fn blank() -> Self {
        Reflection::new(0.0, 0.0, 0.0, 0.0, 0.0)
    }
}

/// 反射表的一行：[d, intensity, h, k, l]
pub type ReflectionRow = [f64; 5];

/// 列索引
pub const COL_D: usize = 0;
pub const COL_INTENSITY: usize = 1;
pub const COL_H: usize = 2;
pub const COL_K: usize = 3;
pub const COL_L: usize = 4;

/// 物相在当前条件下的反射表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReflectionTable {
    rows: Vec<ReflectionRow>,
}

impl ReflectionTable {
    /// 由物相记录整体重建反射表
    pub fn derive(record: &PhaseRecord) -> Self {
        ReflectionTable {
            rows: record
                .reflections()
                .iter()
                .map(|r| [r.d, r.intensity, r.h, r.k, r.l])
                .collect(),
        }
    }

    pub fn rows(&self) -> &[ReflectionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// d 间距列
    pub fn d_spacings(&self) -> Vec<f64> {
        self.column(COL_D)
    }

    /// 强度列
    pub fn intensities(&self) -> Vec<f64> {
        self.column(COL_INTENSITY)
    }

    fn column(&self, col: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[col]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::params::{EosParams, Symmetry};

    #[test]
    fn test_derive_packs_five_columns() {
        let params = EosParams {
            a0: 4.0,
            ..EosParams::default()
        };
        let reflections = vec![
            Reflection::new(1.0, 1.0, 1.0, 100.0, 0.0),
            Reflection::new(2.0, 0.0, 0.0, 50.0, 0.0),
        ];
        let record = PhaseRecord::new("test", Symmetry::Cubic, params, reflections).unwrap();

        let table = ReflectionTable::derive(&record);
        assert_eq!(table.len(), 2);
        assert!((table.rows()[0][COL_D] - 4.0 / 3f64.sqrt()).abs() < 1e-9);
        assert_eq!(table.rows()[0][COL_INTENSITY], 100.0);
        assert_eq!(table.rows()[1][COL_H], 2.0);
        assert_eq!(table.rows()[1][COL_K], 0.0);
        assert_eq!(table.rows()[1][COL_L], 0.0);
        assert_eq!(table.intensities(), vec![100.0, 50.0]);
    }
}
