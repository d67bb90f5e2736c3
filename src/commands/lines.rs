//! # lines 命令实现
//!
//! 列出物相在给定压力 / 温度下的晶胞和衍射线。
//!
//! ## 功能
//! - 加载 JCPDS 文件，CIF 文件即时转换
//! - 联动设置全部物相的压力与温度
//! - 以表格打印每个物相的衍射线，可选导出 CSV
//!
//! ## 依赖关系
//! - 使用 `cli/lines.rs` 定义的参数
//! - 使用 `phase/` 的 PhaseCollection，`xrd/export.rs` 导出
//! - 使用 `utils/output.rs`

use crate::cli::lines::LinesArgs;
use crate::cli::parse_wavelength;
use crate::utils::output;

use tabled::{Table, Tabled};
use xrdphase::error::Result;
use xrdphase::loaders::ConversionParams;
use xrdphase::phase::{PatternUnit, PhaseCollection};
use xrdphase::xrd::export;

/// 执行 lines 命令
pub fn execute(args: LinesArgs) -> Result<()> {
    let wavelength = parse_wavelength(&args.wavelength)?;
    let unit: PatternUnit = args.unit.into();
    let conversion = ConversionParams {
        wavelength,
        min_d_spacing: args.min_d,
        intensity_cutoff: args.cutoff,
    };

    output::print_header("Phase Diffraction Lines");
    output::print_info(&format!(
        "Wavelength: {:.4} Å, positions in {}",
        wavelength,
        unit.label()
    ));

    let mut collection = PhaseCollection::new();
    super::load_phases(&mut collection, &args.phases, &conversion)?;
    super::apply_conditions(&mut collection, args.pressure, args.temperature);

    for i in 0..collection.len() {
        print_phase(&collection, i, unit, wavelength);
    }

    if let Some(path) = args.output {
        export::lines_to_csv(&collection, unit, wavelength, &path)?;
        output::print_success(&format!("Lines exported to {}", path.display()));
    }

    Ok(())
}

/// 打印单个物相的条件、晶胞和衍射线表
fn print_phase(collection: &PhaseCollection, index: usize, unit: PatternUnit, wavelength: f64) {
    #[derive(Tabled)]
    struct LineRow {
        #[tabled(rename = "(hkl)")]
        hkl: String,
        #[tabled(rename = "d0 (Å)")]
        d0: String,
        #[tabled(rename = "d (Å)")]
        d: String,
        #[tabled(rename = "Position")]
        position: String,
        #[tabled(rename = "I (%)")]
        intensity: String,
    }

    let record = collection.record(index);
    let cell = record.cell();

    output::print_header(&format!(
        "{} [{}] {}",
        record.name(),
        record.symmetry(),
        collection.color(index)
    ));
    output::print_info(&format!(
        "P = {:.2} GPa, T = {:.1} K, V/V0 = {:.4}",
        record.pressure(),
        record.temperature(),
        cell.v / record.v0()
    ));
    output::print_info(&format!(
        "a = {:.4} b = {:.4} c = {:.4} Å, α = {:.2} β = {:.2} γ = {:.2}°, V = {:.3} Å³",
        cell.a, cell.b, cell.c, cell.alpha, cell.beta, cell.gamma, cell.v
    ));

    let rows: Vec<LineRow> = record
        .reflections()
        .iter()
        .map(|r| LineRow {
            hkl: format!("({} {} {})", r.h, r.k, r.l),
            d0: format!("{:.4}", r.d0),
            d: format!("{:.4}", r.d),
            position: format!("{:.4}", unit.convert_d(r.d, wavelength)),
            intensity: format!("{:.1}", r.intensity),
        })
        .collect();

    if rows.is_empty() {
        output::print_warning("No reflections");
    } else {
        println!("{}", Table::new(&rows));
    }
}
