//! # 一维衍射图谱
//!
//! 叠加显示时使用的实测图谱 (x, y)，以及两列 `.xy` 文本文件的读取。
//!
//! ## .xy 格式说明
//! ```text
//! # 注释行以 '#' 开头
//! 5.000   123.4
//! 5.010   125.1
//! ```
//!
//! ## 依赖关系
//! - 被 `phase/overlay.rs` 和 `commands/overlay.rs` 使用

use crate::error::{Result, XrdPhaseError};

use std::fs;
use std::path::Path;

/// 实测图谱数据源（只读）
pub trait PatternSource {
    /// 当前的 (x, y) 采样
    fn data(&self) -> (&[f64], &[f64]);
}

/// 内存中的图谱
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pattern {
    pub name: String,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Pattern {
    /// x 与 y 长度不一致时返回错误
    pub fn new(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(XrdPhaseError::InvalidArgument(format!(
                "Pattern x and y lengths differ ({} vs {})",
                x.len(),
                y.len()
            )));
        }
        Ok(Pattern {
            name: name.into(),
            x,
            y,
        })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// (x_min, x_max, y_min, y_max)；空图谱返回 None
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let fold = |v: &[f64]| {
            v.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                    (lo.min(x), hi.max(x))
                })
        };
        let (x_min, x_max) = fold(&self.x);
        let (y_min, y_max) = fold(&self.y);
        Some((x_min, x_max, y_min, y_max))
    }
}

impl PatternSource for Pattern {
    fn data(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }
}

/// 读取 .xy 文件
pub fn parse_xy_file(path: &Path) -> Result<Pattern> {
    let content = fs::read_to_string(path).map_err(|e| XrdPhaseError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_xy_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("pattern"),
    )
    .map_err(|reason| XrdPhaseError::ParseError {
        format: "xy".to_string(),
        path: path.display().to_string(),
        reason,
    })
}

/// 从字符串解析 .xy 内容（逗号或空白分隔）
pub fn parse_xy_content(content: &str, name: &str) -> std::result::Result<Pattern, String> {
    let mut x = Vec::new();
    let mut y = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('\'') {
            continue;
        }

        let parts: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .collect();
        if parts.len() < 2 {
            return Err(format!("line {}: expected two columns", line_no + 1));
        }

        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| format!("line {}: invalid number '{}'", line_no + 1, s))
        };
        x.push(parse(parts[0])?);
        y.push(parse(parts[1])?);
    }

    Ok(Pattern {
        name: name.to_string(),
        x,
        y,
    })
}
