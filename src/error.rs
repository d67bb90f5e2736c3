//! # 统一错误处理模块
//!
//! 定义 xrdphase 的所有错误类型，使用 `thiserror` 派生。
//!
//! 物相加载失败使用独立的 [`PhaseLoadError`]，集合管理器只接收这一种失败信号，
//! 不关心底层具体是哪一种数值错误。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 物相文件加载失败（JCPDS 读取或 CIF 转换）
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Could not load {path} as phase file: {reason}")]
pub struct PhaseLoadError {
    /// 出错的文件路径（用于向用户展示）
    pub path: String,
    /// 失败原因
    pub reason: String,
}

impl PhaseLoadError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// xrdphase 统一错误类型
#[derive(Error, Debug)]
pub enum XrdPhaseError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error(transparent)]
    PhaseLoad(#[from] PhaseLoadError),

    #[error("Invalid phase state: {0}")]
    InvalidPhase(String),

    #[error("Unknown phase parameter: {0}")]
    UnknownParameter(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化 / 输出错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Plot error: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, XrdPhaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_load_error_carries_path() {
        let err = PhaseLoadError::new("data/au.jcpds", "division by zero");
        assert_eq!(err.path, "data/au.jcpds");
        assert!(err.to_string().contains("data/au.jcpds"));

        let wrapped: XrdPhaseError = err.clone().into();
        match wrapped {
            XrdPhaseError::PhaseLoad(inner) => assert_eq!(inner, err),
            other => panic!("unexpected error: {other}"),
        }
    }
}
