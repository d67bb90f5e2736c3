//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `utils/` 以及库中的 `phase/`, `loaders/`, `xrd/`
//! - 子模块: lines, convert, overlay

pub mod convert;
pub mod lines;
pub mod overlay;

use crate::cli::Commands;
use crate::utils::output;

use std::path::PathBuf;
use xrdphase::error::Result;
use xrdphase::loaders::{ConversionParams, PhaseFormat};
use xrdphase::phase::PhaseCollection;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Lines(args) => lines::execute(args),
        Commands::Convert(args) => convert::execute(args),
        Commands::Overlay(args) => overlay::execute(args),
    }
}

/// 按扩展名加载物相文件；CIF 文件即时转换
///
/// 第一个失败的文件中止加载，之前加载的物相保留在集合中。
fn load_phases(
    collection: &mut PhaseCollection,
    paths: &[PathBuf],
    conversion: &ConversionParams,
) -> Result<()> {
    for path in paths {
        let index = match PhaseFormat::from_path(path) {
            PhaseFormat::Jcpds => collection.add(path)?,
            PhaseFormat::Cif => collection.add_converted(path, conversion)?,
        };
        let record = collection.record(index);
        output::print_success(&format!(
            "Loaded '{}' ({} reflections) from {}",
            record.name(),
            record.reflections().len(),
            path.display()
        ));
    }
    Ok(())
}

/// 把压力 / 温度施加到最后一个物相；联动时传播到全部物相
fn apply_conditions(
    collection: &mut PhaseCollection,
    pressure: Option<f64>,
    temperature: Option<f64>,
) {
    let Some(last) = collection.len().checked_sub(1) else {
        return;
    };

    if let Some(p) = pressure {
        collection.set_pressure(last, p);
    }

    if let Some(t) = temperature {
        collection.set_temperature(last, t);

        let targets = if collection.same_conditions() { 0..=last } else { last..=last };
        for i in targets {
            let record = collection.record(i);
            if !record.has_thermal_expansion() {
                output::print_warning(&format!(
                    "'{}' has no thermal expansion data, temperature ignored",
                    record.name()
                ));
            }
        }
    }
}
