//! # 批量执行器
//!
//! 并行执行批量处理任务。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代
//! - 进度条显示（消息中带失败计数）
//! - 错误收集与汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::utils::progress;

use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 单个文件处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 处理成功
    Success(String),
    /// 跳过（如输出文件已存在）
    Skipped(String),
    /// 处理失败
    Failed(String, String), // (文件路径, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    pub success: usize,
    pub skipped: usize,
    /// 失败的 (文件路径, 错误信息)，按输入顺序
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed()
    }
}

impl Extend<ProcessResult> for BatchResult {
    fn extend<I: IntoIterator<Item = ProcessResult>>(&mut self, iter: I) {
        for result in iter {
            match result {
                ProcessResult::Success(_) => self.success += 1,
                ProcessResult::Skipped(_) => self.skipped += 1,
                ProcessResult::Failed(path, err) => self.failures.push((path, err)),
            }
        }
    }
}

impl FromIterator<ProcessResult> for BatchResult {
    fn from_iter<I: IntoIterator<Item = ProcessResult>>(iter: I) -> Self {
        let mut result = BatchResult::default();
        result.extend(iter);
        result
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器；0 表示使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行处理文件列表
    ///
    /// 结果按输入顺序汇总。
    pub fn run<F>(&self, files: Vec<PathBuf>, processor: F) -> BatchResult
    where
        F: Fn(&PathBuf) -> ProcessResult + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, "Converting");
        let failed_count = AtomicUsize::new(0);

        let process_all = || -> Vec<ProcessResult> {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file);
                    if matches!(result, ProcessResult::Failed(..)) {
                        let failed = failed_count.fetch_add(1, Ordering::Relaxed) + 1;
                        pb.set_message(format!("Converting ({} failed)", failed));
                    }
                    pb.inc(1);
                    result
                })
                .collect()
        };

        // 线程池创建失败时退回全局池
        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            Ok(pool) => pool.install(process_all),
            Err(e) => {
                log::warn!("Falling back to the global thread pool: {}", e);
                process_all()
            }
        };

        pb.finish_and_clear();
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_collects_results() {
        let files: Vec<PathBuf> = ["a.cif", "b.cif", "skip.cif", "bad.cif"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let result = BatchRunner::new(2).run(files, |file| {
            let name = file.display().to_string();
            match name.as_str() {
                "skip.cif" => ProcessResult::Skipped(name),
                "bad.cif" => ProcessResult::Failed(name, "broken".to_string()),
                _ => ProcessResult::Success(name),
            }
        });

        assert_eq!(result.success, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.total(), 4);
        assert_eq!(
            result.failures,
            vec![("bad.cif".to_string(), "broken".to_string())]
        );
    }

    #[test]
    fn test_run_empty() {
        let result = BatchRunner::new(0).run(Vec::new(), |_| unreachable!());
        assert_eq!(result.total(), 0);
    }
}
