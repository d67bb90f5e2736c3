//! # overlay 命令实现
//!
//! 把物相衍射线按图谱可见窗口缩放后叠加到实测 .xy 图谱上。
//!
//! ## 功能
//! - 从配置文件恢复物相，或直接加载物相文件（两者可叠加）
//! - 联动或独立设置压力 / 温度
//! - 按可见窗口缩放衍射线强度
//! - 输出 PNG / SVG 叠加图或 CSV 数据，可选保存配置
//!
//! ## 依赖关系
//! - 使用 `cli/overlay.rs` 定义的参数
//! - 使用库中的 `pattern.rs`、`phase/`、`config.rs`、`xrd/plot.rs`、`xrd/export.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::overlay::{OverlayArgs, OverlayOutputFormat};
use crate::cli::{parse_range, parse_wavelength};
use crate::utils::{output, progress};

use std::path::Path;
use tabled::{Table, Tabled};
use xrdphase::config::PhaseConfiguration;
use xrdphase::error::{Result, XrdPhaseError};
use xrdphase::loaders::ConversionParams;
use xrdphase::pattern::{parse_xy_file, Pattern};
use xrdphase::phase::{PatternUnit, PhaseCollection, RescaledLines};
use xrdphase::xrd::{export, plot};

/// 执行 overlay 命令
pub fn execute(args: OverlayArgs) -> Result<()> {
    output::print_header("Phase Overlay");

    let wavelength = parse_wavelength(&args.wavelength)?;
    let unit: PatternUnit = args.unit.into();

    let pattern = parse_xy_file(&args.pattern)?;
    if pattern.is_empty() {
        return Err(XrdPhaseError::InvalidArgument(format!(
            "Pattern {} contains no data points",
            args.pattern.display()
        )));
    }
    output::print_info(&format!(
        "Pattern '{}' with {} points",
        pattern.name,
        pattern.len()
    ));

    let mut collection = PhaseCollection::new();
    let mut conversion = ConversionParams {
        wavelength,
        ..ConversionParams::default()
    };

    if let Some(config_path) = &args.config {
        let config = PhaseConfiguration::from_json_file(config_path)?;
        config.restore(&mut collection)?;
        conversion = config.conversion;
        output::print_success(&format!(
            "Restored {} phase(s) from {}",
            collection.len(),
            config_path.display()
        ));
    }

    super::load_phases(&mut collection, &args.phases, &conversion)?;
    if collection.is_empty() {
        return Err(XrdPhaseError::InvalidArgument(
            "No phases given (pass phase files or --config)".to_string(),
        ));
    }

    if args.independent {
        collection.set_same_conditions(false);
    }
    super::apply_conditions(&mut collection, args.pressure, args.temperature);

    let (x_range, y_range) = view_ranges(&pattern, args.x_range.as_deref(), args.y_range.as_deref())?;
    log::debug!("View window x={:?} y={:?}", x_range, y_range);

    let lines: Vec<RescaledLines> = (0..collection.len())
        .map(|i| collection.rescaled_reflections(i, &pattern, x_range, y_range, wavelength, unit))
        .collect();

    print_summary(&collection, &lines, x_range);

    let format = args
        .format
        .unwrap_or_else(|| guess_format(&args.output));

    match format {
        OverlayOutputFormat::Csv => {
            export::overlay_to_csv(&collection, &lines, unit, &args.output)?;
        }
        OverlayOutputFormat::Png | OverlayOutputFormat::Svg => {
            let phases: Vec<plot::OverlayPhase<'_>> = (0..collection.len())
                .filter(|&i| collection.is_visible(i))
                .map(|i| plot::OverlayPhase {
                    name: collection.record(i).name(),
                    color: collection.color(i),
                    lines: &lines[i],
                })
                .collect();
            let title = args.title.as_deref().unwrap_or(pattern.name.as_str());

            let spinner = progress::create_spinner("Rendering overlay");
            let rendered = plot::generate_overlay_plot(
                &pattern,
                &phases,
                unit,
                x_range,
                y_range,
                &args.output,
                title,
                args.width,
                args.height,
                format == OverlayOutputFormat::Svg,
            );
            spinner.finish_and_clear();
            rendered?;
        }
    }
    output::print_success(&format!("Overlay written to {}", args.output.display()));

    if let Some(path) = &args.save_config {
        let mut config = collection.configuration();
        config.conversion = conversion;
        config.to_json_file(path)?;
        output::print_success(&format!("Configuration saved to {}", path.display()));
    }

    Ok(())
}

/// 可见窗口：用户给定的范围，缺省取图谱范围
fn view_ranges(
    pattern: &Pattern,
    x_range: Option<&str>,
    y_range: Option<&str>,
) -> Result<((f64, f64), (f64, f64))> {
    let (x_min, x_max, y_min, y_max) = pattern
        .bounds()
        .ok_or_else(|| XrdPhaseError::InvalidArgument("Empty pattern".to_string()))?;

    let x = match x_range {
        Some(range) => parse_range(range)?,
        None => (x_min, x_max),
    };
    let y = match y_range {
        Some(range) => parse_range(range)?,
        None if y_max > y_min => (y_min, y_max),
        None => (y_min - 1.0, y_max + 1.0),
    };
    Ok((x, y))
}

/// 根据扩展名推断输出格式，默认 PNG
fn guess_format(path: &Path) -> OverlayOutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("svg") => OverlayOutputFormat::Svg,
        Some("csv") => OverlayOutputFormat::Csv,
        _ => OverlayOutputFormat::Png,
    }
}

fn print_summary(collection: &PhaseCollection, lines: &[RescaledLines], x_range: (f64, f64)) {
    #[derive(Tabled)]
    struct PhaseRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "Phase")]
        name: String,
        #[tabled(rename = "Color")]
        color: String,
        #[tabled(rename = "P (GPa)")]
        pressure: String,
        #[tabled(rename = "T (K)")]
        temperature: String,
        #[tabled(rename = "Lines in view")]
        in_view: usize,
        #[tabled(rename = "Shown")]
        visible: String,
    }

    let (x_min, x_max) = x_range;
    let rows: Vec<PhaseRow> = lines
        .iter()
        .enumerate()
        .map(|(i, phase_lines)| {
            let record = collection.record(i);
            PhaseRow {
                index: i,
                name: record.name().to_string(),
                color: collection.color(i).to_string(),
                pressure: format!("{:.2}", record.pressure()),
                temperature: format!("{:.1}", record.temperature()),
                in_view: phase_lines
                    .positions
                    .iter()
                    .filter(|&&x| x > x_min && x < x_max)
                    .count(),
                visible: if collection.is_visible(i) { "yes" } else { "no" }.to_string(),
            }
        })
        .collect();

    println!("{}", Table::new(&rows));
}
