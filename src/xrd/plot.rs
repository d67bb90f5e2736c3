//! # 叠加图生成
//!
//! 使用 `plotters` 库把实测图谱和各物相缩放后的衍射线画在同一张图上。
//!
//! ## 功能
//! - 实测图谱画成连续曲线
//! - 物相衍射线画成从基线出发的竖线，颜色取物相颜色
//! - 图例列出物相名称
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/overlay.rs` 调用
//! - 使用 `pattern.rs` 的 Pattern、`phase/` 的 RescaledLines
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, XrdPhaseError};
use crate::pattern::Pattern;
use crate::phase::{PatternUnit, RescaledLines, Rgb};

use plotters::prelude::*;
use std::path::Path;

/// 一个物相在图上的衍射线
#[derive(Debug, Clone, Copy)]
pub struct OverlayPhase<'a> {
    pub name: &'a str,
    pub color: Rgb,
    pub lines: &'a RescaledLines,
}

/// 生成叠加图
#[allow(clippy::too_many_arguments)]
pub fn generate_overlay_plot(
    pattern: &Pattern,
    phases: &[OverlayPhase<'_>],
    unit: PatternUnit,
    x_range: (f64, f64),
    y_range: (f64, f64),
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_overlay_chart(&root, pattern, phases, unit, x_range, y_range, title)?;
        root.present()
            .map_err(|e| XrdPhaseError::PlotError(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_overlay_chart(&root, pattern, phases, unit, x_range, y_range, title)?;
        root.present()
            .map_err(|e| XrdPhaseError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 绘制叠加图的核心逻辑
fn draw_overlay_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    pattern: &Pattern,
    phases: &[OverlayPhase<'_>],
    unit: PatternUnit,
    x_range: (f64, f64),
    y_range: (f64, f64),
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let plot_error = |e: DrawingAreaErrorKind<DB::ErrorType>| XrdPhaseError::PlotError(format!("{:?}", e));

    root.fill(&WHITE).map_err(plot_error)?;

    let (x_min, x_max) = x_range;
    let (y_min, y_max) = y_range;
    let y_top = y_max + 0.05 * (y_max - y_min);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_top)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc(unit.label())
        .y_desc("Intensity")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    // 实测图谱
    let inside_x = |x: f64| x >= x_min && x <= x_max;
    chart
        .draw_series(LineSeries::new(
            pattern
                .x()
                .iter()
                .zip(pattern.y())
                .filter(|&(&x, _)| inside_x(x))
                .map(|(&x, &y)| (x, y.clamp(y_min, y_top))),
            BLACK.stroke_width(1),
        ))
        .map_err(plot_error)?
        .label(pattern.name.as_str())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    // 物相衍射线
    for phase in phases {
        let color = RGBColor(phase.color.r, phase.color.g, phase.color.b);
        let baseline = phase.lines.baseline;

        chart
            .draw_series(
                phase
                    .lines
                    .positions
                    .iter()
                    .zip(&phase.lines.intensities)
                    .filter(|&(&x, &y)| x.is_finite() && y.is_finite() && inside_x(x))
                    .map(|(&x, &y)| {
                        PathElement::new(
                            vec![(x, baseline), (x, y.min(y_top))],
                            color.stroke_width(2),
                        )
                    }),
            )
            .map_err(plot_error)?
            .label(phase.name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(plot_error)?;

    Ok(())
}
