//! # XRD 计算模块
//!
//! 提供 X 射线衍射线计算与输出功能。
//!
//! ## 子模块
//! - `scattering`: 原子散射因子数据库
//! - `calculator`: 衍射线位置与强度计算
//! - `plot`: 叠加图生成
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `loaders/converter.rs` 和 `commands/` 使用
//! - 使用 `models/structure.rs`

pub mod calculator;
pub mod export;
pub mod plot;
pub mod scattering;

pub use calculator::{Peak, XrdCalculator, XrdPattern};
