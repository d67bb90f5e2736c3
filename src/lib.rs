//! # xrdphase - 物相衍射线叠加
//!
//! 晶相的压力 / 温度物态方程模型，以及把预测衍射线叠加到实测一维
//! XRD 图谱上所需的计算。
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── phase/      (物相记录、反射表、集合管理、叠加缩放)
//!   ├── loaders/    (JCPDS 读写、CIF 转换)
//!   │     ├── models/ (晶体结构)
//!   │     └── xrd/    (结构因子计算、导出、绘图)
//!   ├── pattern.rs  (实测图谱)
//!   ├── config.rs   (保存与恢复)
//!   └── error.rs    (错误处理)
//! ```

pub mod config;
pub mod error;
pub mod loaders;
pub mod models;
pub mod pattern;
pub mod phase;
pub mod xrd;

pub use error::{PhaseLoadError, Result, XrdPhaseError};
pub use phase::{PhaseCollection, PhaseRecord, ReflectionTable};
