//! # JCPDS 格式读写
//!
//! 物相的原生格式（版本 4，关键字格式）。
//!
//! ## 格式说明
//! ```text
//! VERSION:   4
//! COMMENT: Gold (Au), Heinz & Jeanloz (1984)
//! K0:  166.65
//! K0P:  5.4823
//! DK0DT: 0
//! DK0PDT: 0
//! SYMMETRY: CUBIC
//! A:  4.0786
//! ALPHAT:  4.26E-05
//! DALPHADT: 0
//! DIHKL:   2.3548  100.0   1   1   1
//! DIHKL:   2.0393   52.0   2   0   0
//! ```
//!
//! 版本 1-3 的位置格式不支持。
//!
//! ## 依赖关系
//! - 被 `loaders/mod.rs`、`commands/` 使用
//! - 使用 `regex` 匹配关键字行

use super::PhaseSource;
use crate::error::{PhaseLoadError, Result, XrdPhaseError};
use crate::phase::{EosParams, PhaseRecord, Reflection, Symmetry};

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static KEYWORD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9_]+)\s*:\s*(.*?)\s*$").expect("keyword regex is valid")
});

/// 原生 JCPDS 加载器
#[derive(Debug, Clone, Copy, Default)]
pub struct JcpdsLoader;

impl PhaseSource for JcpdsLoader {
    fn load(&self, path: &Path) -> std::result::Result<PhaseRecord, PhaseLoadError> {
        parse_jcpds_file(path)
            .map_err(|e| PhaseLoadError::new(path.display().to_string(), e.to_string()))
    }
}

/// 解析 JCPDS 文件
pub fn parse_jcpds_file(path: &Path) -> Result<PhaseRecord> {
    let content = fs::read_to_string(path).map_err(|e| XrdPhaseError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_jcpds_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 JCPDS 格式
pub fn parse_jcpds_content(content: &str, name: &str) -> Result<PhaseRecord> {
    let parse_error = |reason: String| XrdPhaseError::ParseError {
        format: "jcpds".to_string(),
        path: name.to_string(),
        reason,
    };

    let mut params = EosParams::default();
    let mut symmetry: Option<Symmetry> = None;
    let mut comment = String::new();
    let mut version: Option<u32> = None;
    let mut reflections = Vec::new();
    let mut has_a = false;

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let Some(caps) = KEYWORD_LINE.captures(line) else {
            if version.is_none() {
                return Err(parse_error(
                    "only keyword (version 4) JCPDS files are supported".to_string(),
                ));
            }
            return Err(parse_error(format!("line {}: expected 'KEY: value'", line_no + 1)));
        };

        let key = caps[1].to_uppercase();
        let value = &caps[2];
        let number = || {
            value
                .split_whitespace()
                .next()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    parse_error(format!("line {}: invalid value for {}: '{}'", line_no + 1, key, value))
                })
        };

        match key.as_str() {
            "VERSION" => {
                let v = number()? as u32;
                if v != 4 {
                    return Err(parse_error(format!("unsupported JCPDS version {}", v)));
                }
                version = Some(v);
            }
            "COMMENT" => {
                if !comment.is_empty() {
                    comment.push('\n');
                }
                comment.push_str(value);
            }
            "K0" => params.k0 = number()?,
            "K0P" => params.k0p = number()?,
            "DK0DT" => params.dk0dt = number()?,
            "DK0PDT" => params.dk0pdt = number()?,
            "SYMMETRY" => symmetry = Some(value.parse()?),
            "A" => {
                params.a0 = number()?;
                has_a = true;
            }
            "B" => params.b0 = number()?,
            "C" => params.c0 = number()?,
            "ALPHA" => params.alpha0 = number()?,
            "BETA" => params.beta0 = number()?,
            "GAMMA" => params.gamma0 = number()?,
            "ALPHAT" => params.alpha_t0 = number()?,
            "DALPHADT" => params.d_alpha_dt = number()?,
            "DIHKL" => {
                let values: Vec<f64> = value
                    .split_whitespace()
                    .map(|s| s.parse::<f64>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|_| parse_error(format!("line {}: invalid DIHKL row", line_no + 1)))?;
                if values.len() < 5 {
                    return Err(parse_error(format!(
                        "line {}: DIHKL needs 'd I h k l'",
                        line_no + 1
                    )));
                }
                reflections.push(Reflection::new(
                    values[2], values[3], values[4], values[1], values[0],
                ));
            }
            // VOLUME 由晶胞参数重算；其它关键字忽略
            _ => {}
        }
    }

    if version.is_none() {
        return Err(parse_error("missing VERSION".to_string()));
    }
    let symmetry = symmetry.ok_or_else(|| parse_error("missing SYMMETRY".to_string()))?;
    if !has_a {
        return Err(parse_error("missing lattice parameter A".to_string()));
    }

    Ok(PhaseRecord::new(name, symmetry, params, reflections)?.with_comment(comment))
}

/// 将物相记录写为 JCPDS 版本 4 字符串
pub fn to_jcpds_string(record: &PhaseRecord) -> String {
    let p = record.params();
    let mut result = String::new();

    result.push_str("VERSION:   4\n");
    for line in record.comment().lines() {
        result.push_str(&format!("COMMENT: {}\n", line));
    }
    if record.comment().is_empty() {
        result.push_str(&format!("COMMENT: {}\n", record.name()));
    }
    result.push_str(&format!("K0: {}\n", p.k0));
    result.push_str(&format!("K0P: {}\n", p.k0p));
    result.push_str(&format!("DK0DT: {}\n", p.dk0dt));
    result.push_str(&format!("DK0PDT: {}\n", p.dk0pdt));
    result.push_str(&format!("SYMMETRY: {}\n", record.symmetry()));
    result.push_str(&format!("A: {:.6}\n", p.a0));
    result.push_str(&format!("B: {:.6}\n", p.b0));
    result.push_str(&format!("C: {:.6}\n", p.c0));
    result.push_str(&format!("ALPHA: {:.6}\n", p.alpha0));
    result.push_str(&format!("BETA: {:.6}\n", p.beta0));
    result.push_str(&format!("GAMMA: {:.6}\n", p.gamma0));
    result.push_str(&format!("VOLUME: {:.6}\n", record.v0()));
    result.push_str(&format!("ALPHAT: {}\n", p.alpha_t0));
    result.push_str(&format!("DALPHADT: {}\n", p.d_alpha_dt));

    for r in record.reflections() {
        result.push_str(&format!(
            "DIHKL: {:10.6} {:8.3} {:4} {:4} {:4}\n",
            r.d0, r.intensity, r.h, r.k, r.l
        ));
    }

    result
}

/// 写出 JCPDS 文件
pub fn write_jcpds_file(record: &PhaseRecord, path: &Path) -> Result<()> {
    fs::write(path, to_jcpds_string(record)).map_err(|e| XrdPhaseError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
