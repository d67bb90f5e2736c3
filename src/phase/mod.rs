//! # 物相模块
//!
//! 晶相的物态方程模型、反射表、集合管理和叠加缩放。
//!
//! ## 依赖关系
//! - 被 `loaders/`、`config.rs` 和 `commands/` 使用
//! - 子模块: params, record, reflection, color, event, collection, overlay

pub mod collection;
pub mod color;
pub mod event;
pub mod overlay;
pub mod params;
pub mod record;
pub mod reflection;

pub use collection::PhaseCollection;
pub use color::{color_for, Rgb};
pub use event::{PhaseEvent, PhaseObserver};
pub use overlay::{PatternUnit, RescaledLines};
pub use params::{EosParams, PhaseParam, Symmetry};
pub use record::{Cell, PhaseRecord};
pub use reflection::{Reflection, ReflectionTable};
