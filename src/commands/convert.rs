//! # convert 命令实现
//!
//! 批量把 CIF 结构转换为 JCPDS 物相文件。
//!
//! ## 功能
//! - 单文件或目录输入（glob 模式、递归）
//! - 计算衍射线强度并按阈值筛选
//! - 可选写入体弹模量 K0 / K0'
//! - 并行处理，已有输出默认跳过
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `batch/` 收集与并行处理
//! - 使用库中的 `loaders/` (CifConverter, write_jcpds_file)
//! - 使用 `utils/output.rs`

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::convert::ConvertArgs;
use crate::cli::parse_wavelength;
use crate::utils::output;

use std::fs;
use std::path::Path;
use xrdphase::error::{Result, XrdPhaseError};
use xrdphase::loaders::jcpds::write_jcpds_file;
use xrdphase::loaders::{CifConverter, ConversionParams, StructureConverter};
use xrdphase::phase::PhaseParam;

/// 写入输出文件前覆盖的物态方程参数
#[derive(Debug, Clone, Copy, Default)]
struct EosOverrides {
    k0: Option<f64>,
    k0p: Option<f64>,
}

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header("Converting CIF to JCPDS");

    if !args.input.exists() {
        return Err(XrdPhaseError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let conversion = ConversionParams {
        wavelength: parse_wavelength(&args.wavelength)?,
        min_d_spacing: args.min_d,
        intensity_cutoff: args.cutoff,
    };
    let overrides = EosOverrides {
        k0: args.k0,
        k0p: args.k0p,
    };

    fs::create_dir_all(&args.output).map_err(|e| XrdPhaseError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .map_err(XrdPhaseError::InvalidArgument)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            args.pattern,
            args.input.display()
        ));
        return Ok(());
    }

    // 单文件直接处理，错误原样返回
    if files.len() == 1 && args.input.is_file() {
        let input = &files[0];
        return match convert_file(input, &args.output, &conversion, overrides, args.overwrite)? {
            ProcessResult::Skipped(path) => {
                output::print_skip(&format!("{} exists (use --overwrite)", path));
                Ok(())
            }
            ProcessResult::Success(path) => {
                output::print_conversion(&input.display().to_string(), &path);
                Ok(())
            }
            ProcessResult::Failed(path, err) => Err(XrdPhaseError::Other(format!(
                "{}: {}",
                path, err
            ))),
        };
    }

    output::print_info(&format!(
        "Found {} files, λ = {:.4} Å, d >= {} Å, I >= {}%",
        files.len(),
        conversion.wavelength,
        conversion.min_d_spacing,
        conversion.intensity_cutoff
    ));

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |input| {
        match convert_file(input, &args.output, &conversion, overrides, args.overwrite) {
            Ok(result) => result,
            Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
        }
    });

    for (path, err) in &result.failures {
        output::print_error(&format!("{}: {}", path, err));
    }

    output::print_done(&format!(
        "Converted {} of {} file(s) into '{}' ({} skipped, {} failed)",
        result.success,
        result.total(),
        args.output.display(),
        result.skipped,
        result.failed()
    ));

    Ok(())
}

/// 转换单个 CIF 文件，输出 `{stem}.jcpds`
fn convert_file(
    input: &Path,
    output_dir: &Path,
    conversion: &ConversionParams,
    overrides: EosOverrides,
    overwrite: bool,
) -> Result<ProcessResult> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("phase");
    let output_path = output_dir.join(format!("{}.jcpds", stem));
    let output_name = output_path.display().to_string();

    if output_path.exists() && !overwrite {
        return Ok(ProcessResult::Skipped(output_name));
    }

    let mut record = CifConverter.convert(input, conversion)?;
    if let Some(k0) = overrides.k0 {
        record.set_parameter(PhaseParam::K0, k0);
    }
    if let Some(k0p) = overrides.k0p {
        record.set_parameter(PhaseParam::K0p, k0p);
    }

    write_jcpds_file(&record, &output_path)?;
    log::debug!(
        "{} -> {} ({} reflections)",
        input.display(),
        output_name,
        record.reflections().len()
    );

    Ok(ProcessResult::Success(output_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrdphase::loaders::jcpds::parse_jcpds_file;

    const NACL_CIF: &str = "\
data_NaCl
_cell_length_a 5.64
_cell_length_b 5.64
_cell_length_c 5.64
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
_space_group_IT_number 225
loop_
_space_group_symop_operation_xyz
'x,y,z'
'-x,-y,z'
'-x,y,-z'
'x,-y,-z'
'z,x,y'
'y,z,x'
'x,y+1/2,z+1/2'
'x+1/2,y,z+1/2'
'x+1/2,y+1/2,z'
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Na1 Na 0 0 0
Cl1 Cl 0.5 0.5 0.5
";

    #[test]
    fn test_convert_file_writes_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("nacl.cif");
        fs::write(&input, NACL_CIF).unwrap();
        let out_dir = dir.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let overrides = EosOverrides {
            k0: Some(23.8),
            k0p: Some(5.0),
        };
        let params = ConversionParams::default();

        let result = convert_file(&input, &out_dir, &params, overrides, false).unwrap();
        assert!(matches!(result, ProcessResult::Success(_)));

        let record = parse_jcpds_file(&out_dir.join("nacl.jcpds")).unwrap();
        assert_eq!(record.params().k0, 23.8);
        assert_eq!(record.params().k0p, 5.0);
        assert!((record.params().a0 - 5.64).abs() < 1e-6);
        assert!(!record.reflections().is_empty());

        let again = convert_file(&input, &out_dir, &params, overrides, false).unwrap();
        assert!(matches!(again, ProcessResult::Skipped(_)));

        let forced = convert_file(&input, &out_dir, &params, overrides, true).unwrap();
        assert!(matches!(forced, ProcessResult::Success(_)));
    }

    #[test]
    fn test_convert_file_reports_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.cif");
        fs::write(&input, "data_broken\n_cell_length_a 4.0\n").unwrap();

        let result = convert_file(
            &input,
            dir.path(),
            &ConversionParams::default(),
            EosOverrides::default(),
            false,
        );
        assert!(result.is_err());
        assert!(!dir.path().join("broken.jcpds").exists());
    }
}
