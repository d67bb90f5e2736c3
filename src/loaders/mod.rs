//! # 物相加载器
//!
//! 物相的两种来源：
//! - `jcpds`: 原生 JCPDS（版本 4 关键字格式）读取与写出
//! - `cif`: CIF 晶体结构读取（含对称操作展开）
//! - `converter`: CIF 结构 → 预测衍射线 → 物相记录
//!
//! 加载失败统一返回 [`PhaseLoadError`]，集合管理器不区分底层原因。
//!
//! ## 依赖关系
//! - 被 `phase/collection.rs`、`config.rs` 和 `commands/` 使用
//! - 使用 `phase/record.rs`、`models/`、`xrd/`

pub mod cif;
pub mod converter;
pub mod jcpds;

pub use converter::CifConverter;
pub use jcpds::JcpdsLoader;

use crate::error::PhaseLoadError;
use crate::phase::PhaseRecord;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 原生格式的物相来源
pub trait PhaseSource {
    fn load(&self, path: &Path) -> Result<PhaseRecord, PhaseLoadError>;
}

/// 晶体结构 → 物相记录的转换器
pub trait StructureConverter {
    fn convert(
        &self,
        path: &Path,
        params: &ConversionParams,
    ) -> Result<PhaseRecord, PhaseLoadError>;
}

/// 结构转换参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionParams {
    /// 计算强度使用的波长（Å）
    pub wavelength: f64,
    /// 最小 d 间距（Å）
    pub min_d_spacing: f64,
    /// 最小相对强度（0-100）
    pub intensity_cutoff: f64,
}

impl Default for ConversionParams {
    fn default() -> Self {
        ConversionParams {
            wavelength: 0.31,
            min_d_spacing: 0.5,
            intensity_cutoff: 0.5,
        }
    }
}

/// 物相文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseFormat {
    #[default]
    Jcpds,
    Cif,
}

impl PhaseFormat {
    /// 从扩展名推断格式（.cif 为 CIF，其余按 JCPDS 处理）
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("cif") => PhaseFormat::Cif,
            _ => PhaseFormat::Jcpds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(PhaseFormat::from_path(Path::new("au.jcpds")), PhaseFormat::Jcpds);
        assert_eq!(PhaseFormat::from_path(Path::new("dir/MgO.CIF")), PhaseFormat::Cif);
        assert_eq!(PhaseFormat::from_path(Path::new("noext")), PhaseFormat::Jcpds);
    }
}
