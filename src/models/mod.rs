//! # 数据模型模块
//!
//! 定义结构转换使用的晶体结构数据模型。
//!
//! ## 依赖关系
//! - 被 `loaders/`、`xrd/` 和 `phase/` 使用
//! - 子模块: structure

pub mod structure;

pub use structure::{Atom, Crystal, Lattice};
