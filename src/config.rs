//! # 物相集合的保存与恢复
//!
//! 以 JSON 保存集合的可观察状态：每个物相的来源路径、格式、全部物态方程
//! 参数、颜色和可见性，以及 `same_conditions`。CIF 物相另存加载时的
//! 转换参数，恢复时按原参数重新转换。
//!
//! ```no_run
//! use std::path::Path;
//! use xrdphase::config::PhaseConfiguration;
//! use xrdphase::phase::PhaseCollection;
//!
//! let mut collection = PhaseCollection::new();
//! let config = PhaseConfiguration::from_json_file(Path::new("phases.json"))?;
//! config.restore(&mut collection)?;
//! # Ok::<(), xrdphase::error::XrdPhaseError>(())
//! ```
//!
//! 恢复时先重新加载所有来源文件，全部成功后才替换集合内容。
//!
//! ## 依赖关系
//! - 被 `commands/overlay.rs` 使用
//! - 使用 `phase/collection.rs`、`loaders/`

use crate::error::{Result, XrdPhaseError};
use crate::loaders::{
    CifConverter, ConversionParams, JcpdsLoader, PhaseFormat, PhaseSource, StructureConverter,
};
use crate::phase::{EosParams, PhaseCollection, PhaseRecord, Rgb};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 单个物相的保存状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSettings {
    pub path: PathBuf,
    #[serde(default)]
    pub format: PhaseFormat,
    /// CIF 物相的转换参数；缺省时使用 [`PhaseConfiguration::conversion`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionParams>,
    pub params: EosParams,
    pub color: Rgb,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

/// 集合的保存状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfiguration {
    pub same_conditions: bool,
    /// 没有单独保存转换参数的 CIF 物相使用的参数
    #[serde(default)]
    pub conversion: ConversionParams,
    pub phases: Vec<PhaseSettings>,
}

impl Default for PhaseConfiguration {
    fn default() -> Self {
        PhaseConfiguration {
            same_conditions: true,
            conversion: ConversionParams::default(),
            phases: Vec::new(),
        }
    }
}

impl PhaseCollection {
    /// 当前状态的快照
    pub fn configuration(&self) -> PhaseConfiguration {
        PhaseConfiguration {
            same_conditions: self.same_conditions(),
            conversion: ConversionParams::default(),
            phases: (0..self.len())
                .map(|i| PhaseSettings {
                    path: self.path(i).to_path_buf(),
                    format: self.format(i),
                    conversion: self.conversion(i),
                    params: self.record(i).params().clone(),
                    color: self.color(i),
                    visible: self.is_visible(i),
                })
                .collect(),
        }
    }
}

impl PhaseConfiguration {
    /// 用保存的状态重建集合
    ///
    /// 任一来源加载失败时返回错误，集合保持不变。
    pub fn restore(&self, collection: &mut PhaseCollection) -> Result<()> {
        let records = self
            .phases
            .iter()
            .map(|settings| self.reload(settings))
            .collect::<Result<Vec<PhaseRecord>>>()?;

        collection.reset();
        for (settings, record) in self.phases.iter().zip(records) {
            let index = collection.add_record_as(
                record,
                &settings.path,
                settings.format,
                self.cif_conversion(settings),
            );
            collection.set_params(index, settings.params.clone());
            collection.set_color(index, settings.color);
            collection.set_visible(index, settings.visible);
        }
        collection.set_same_conditions(self.same_conditions);

        log::debug!("Restored {} phases", collection.len());
        Ok(())
    }

    fn reload(&self, settings: &PhaseSettings) -> Result<PhaseRecord> {
        let record = match self.cif_conversion(settings) {
            None => JcpdsLoader.load(&settings.path)?,
            Some(params) => CifConverter.convert(&settings.path, &params)?,
        };
        Ok(record)
    }

    fn cif_conversion(&self, settings: &PhaseSettings) -> Option<ConversionParams> {
        match settings.format {
            PhaseFormat::Jcpds => None,
            PhaseFormat::Cif => Some(settings.conversion.unwrap_or(self.conversion)),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| XrdPhaseError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| XrdPhaseError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::jcpds::write_jcpds_file;
    use crate::phase::{PhaseParam, Reflection, Symmetry};

    fn write_phase(dir: &Path, name: &str, a0: f64, alpha_t0: f64) -> PathBuf {
        let params = EosParams {
            a0,
            k0: 160.0,
            k0p: 4.5,
            alpha_t0,
            ..EosParams::default()
        };
        let record = PhaseRecord::new(
            name,
            Symmetry::Cubic,
            params,
            vec![
                Reflection::new(1.0, 1.0, 1.0, 100.0, 0.0),
                Reflection::new(2.0, 0.0, 0.0, 50.0, 0.0),
            ],
        )
        .unwrap();
        let path = dir.join(format!("{name}.jcpds"));
        write_jcpds_file(&record, &path).unwrap();
        path
    }

    #[test]
    fn test_save_and_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let au = write_phase(dir.path(), "au", 4.0786, 4.26e-5);
        let mgo = write_phase(dir.path(), "mgo", 4.2112, 0.0);

        let mut original = PhaseCollection::new();
        original.add(&au).unwrap();
        original.add(&mgo).unwrap();
        original.set_same_conditions(false);
        original.set_pressure(0, 15.0);
        original.set_temperature(0, 900.0);
        original.set_parameter(1, PhaseParam::K0, 200.0);
        original.set_pressure(1, 30.0);
        original.set_visible(1, false);
        original.set_color(0, Rgb::new(10, 20, 30));

        let json_path = dir.path().join("phases.json");
        original.configuration().to_json_file(&json_path).unwrap();
        let config = PhaseConfiguration::from_json_file(&json_path).unwrap();
        assert_eq!(config, original.configuration());

        let mut restored = PhaseCollection::new();
        config.restore(&mut restored).unwrap();

        assert_eq!(restored.len(), original.len());
        assert_eq!(restored.same_conditions(), original.same_conditions());
        for i in 0..original.len() {
            assert_eq!(restored.path(i), original.path(i));
            assert_eq!(restored.record(i), original.record(i));
            assert_eq!(restored.reflection_table(i), original.reflection_table(i));
            assert_eq!(restored.color(i), original.color(i));
            assert_eq!(restored.is_visible(i), original.is_visible(i));
        }
    }

    #[test]
    fn test_restore_failure_keeps_collection() {
        let dir = tempfile::tempdir().unwrap();
        let au = write_phase(dir.path(), "au", 4.0786, 4.26e-5);

        let mut collection = PhaseCollection::new();
        collection.add(&au).unwrap();

        let mut config = collection.configuration();
        config.phases.push(PhaseSettings {
            path: dir.path().join("missing.jcpds"),
            format: PhaseFormat::Jcpds,
            conversion: None,
            params: EosParams::default(),
            color: Rgb::new(0, 0, 0),
            visible: true,
        });

        let err = config.restore(&mut collection).unwrap_err();
        assert!(matches!(err, XrdPhaseError::PhaseLoad(_)));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let json = r#"{
            "same_conditions": false,
            "phases": [{
                "path": "au.jcpds",
                "params": {
                    "a0": 4.0786, "b0": 4.0786, "c0": 4.0786,
                    "alpha0": 90.0, "beta0": 90.0, "gamma0": 90.0,
                    "k0": 166.65, "k0p": 5.48, "dk0dt": 0.0, "dk0pdt": 0.0,
                    "alpha_t0": 0.0, "d_alpha_dt": 0.0,
                    "pressure": 0.0, "temperature": 298.0
                },
                "color": { "r": 1, "g": 2, "b": 3 }
            }]
        }"#;
        let config: PhaseConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(config.conversion, ConversionParams::default());
        assert_eq!(config.phases[0].format, PhaseFormat::Jcpds);
        assert_eq!(config.phases[0].conversion, None);
        assert!(config.phases[0].visible);
    }

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
'x,y+1/2,z+1/2'
'x+1/2,y,z+1/2'
'x+1/2,y+1/2,z'
loop_
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Na 0 0 0
Cl 0.5 0.5 0.5
";

    #[test]
    fn test_restore_reconverts_cif_with_its_own_params() {
        let dir = tempfile::tempdir().unwrap();
        let cif = dir.path().join("nacl.cif");
        fs::write(&cif, NACL_CIF).unwrap();

        let coarse = ConversionParams {
            wavelength: 0.31,
            min_d_spacing: 1.2,
            intensity_cutoff: 5.0,
        };
        let mut original = PhaseCollection::new();
        original.add_converted(&cif, &coarse).unwrap();
        assert_eq!(original.conversion(0), Some(coarse));

        let json_path = dir.path().join("phases.json");
        original.configuration().to_json_file(&json_path).unwrap();
        let config = PhaseConfiguration::from_json_file(&json_path).unwrap();
        assert_eq!(config.phases[0].conversion, Some(coarse));

        let mut restored = PhaseCollection::new();
        config.restore(&mut restored).unwrap();
        assert_eq!(restored.conversion(0), Some(coarse));
        assert_eq!(restored.record(0), original.record(0));
        assert_eq!(restored.reflection_table(0), original.reflection_table(0));

        // 默认参数下线条更多，说明恢复没有退回默认值
        let mut fine = PhaseCollection::new();
        fine.add_converted(&cif, &ConversionParams::default()).unwrap();
        assert!(fine.reflection_table(0).len() > restored.reflection_table(0).len());
    }

    #[test]
    fn test_restore_keeps_saved_format_for_any_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("phase.txt");
        fs::write(&source, NACL_CIF).unwrap();

        let mut original = PhaseCollection::new();
        original
            .add_converted(&source, &ConversionParams::default())
            .unwrap();
        let config = original.configuration();
        assert_eq!(config.phases[0].format, PhaseFormat::Cif);

        let mut restored = PhaseCollection::new();
        config.restore(&mut restored).unwrap();
        assert_eq!(restored.format(0), PhaseFormat::Cif);

        // 再保存一次仍然是 CIF，并且可以再次恢复
        let resaved = restored.configuration();
        assert_eq!(resaved, config);
        let mut again = PhaseCollection::new();
        resaved.restore(&mut again).unwrap();
        assert_eq!(again.format(0), PhaseFormat::Cif);
        assert_eq!(again.reflection_table(0), original.reflection_table(0));
    }
}
