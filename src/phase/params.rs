//! # 物态方程参数
//!
//! 物相记录中可由用户修改的原始参数（零压晶胞、体弹模量及其导数、
//! 热膨胀系数）以及当前的压力 / 温度条件。
//!
//! 参数可以通过 [`PhaseParam`] 以名字寻址，名字与 JCPDS 关键字和配置文件中的
//! 字段名一致。
//!
//! ## 依赖关系
//! - 被 `phase/record.rs`、`loaders/` 和 `config.rs` 使用

use crate::error::XrdPhaseError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 室温（K），热膨胀参考温度
pub const REFERENCE_TEMPERATURE: f64 = 298.0;

/// 晶系（决定零压晶胞参数的约束关系）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Symmetry {
    Cubic,
    Tetragonal,
    Orthorhombic,
    Hexagonal,
    Trigonal,
    Rhombohedral,
    Monoclinic,
    Triclinic,
}

impl Symmetry {
    /// 由国际表空间群编号确定晶系
    ///
    /// 三方晶系按六方轴设置处理。
    pub fn from_space_group(number: u32) -> Option<Self> {
        match number {
            1..=2 => Some(Symmetry::Triclinic),
            3..=15 => Some(Symmetry::Monoclinic),
            16..=74 => Some(Symmetry::Orthorhombic),
            75..=142 => Some(Symmetry::Tetragonal),
            143..=167 => Some(Symmetry::Trigonal),
            168..=194 => Some(Symmetry::Hexagonal),
            195..=230 => Some(Symmetry::Cubic),
            _ => None,
        }
    }

    /// 由晶胞参数猜测最高对称性
    pub fn from_cell(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let eq = |x: f64, y: f64| (x - y).abs() < 1e-4 * x.abs().max(1.0);
        let right = |x: f64| eq(x, 90.0);

        if right(alpha) && right(beta) && right(gamma) {
            if eq(a, b) && eq(b, c) {
                Symmetry::Cubic
            } else if eq(a, b) {
                Symmetry::Tetragonal
            } else {
                Symmetry::Orthorhombic
            }
        } else if right(alpha) && right(beta) && eq(gamma, 120.0) && eq(a, b) {
            Symmetry::Hexagonal
        } else if eq(a, b) && eq(b, c) && eq(alpha, beta) && eq(beta, gamma) {
            Symmetry::Rhombohedral
        } else if right(alpha) && right(gamma) {
            Symmetry::Monoclinic
        } else {
            Symmetry::Triclinic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Symmetry::Cubic => "CUBIC",
            Symmetry::Tetragonal => "TETRAGONAL",
            Symmetry::Orthorhombic => "ORTHORHOMBIC",
            Symmetry::Hexagonal => "HEXAGONAL",
            Symmetry::Trigonal => "TRIGONAL",
            Symmetry::Rhombohedral => "RHOMBOHEDRAL",
            Symmetry::Monoclinic => "MONOCLINIC",
            Symmetry::Triclinic => "TRICLINIC",
        }
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symmetry {
    type Err = XrdPhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CUBIC" => Ok(Symmetry::Cubic),
            "TETRAGONAL" => Ok(Symmetry::Tetragonal),
            "ORTHORHOMBIC" => Ok(Symmetry::Orthorhombic),
            "HEXAGONAL" => Ok(Symmetry::Hexagonal),
            "TRIGONAL" => Ok(Symmetry::Trigonal),
            "RHOMBOHEDRAL" => Ok(Symmetry::Rhombohedral),
            "MONOCLINIC" => Ok(Symmetry::Monoclinic),
            "TRICLINIC" => Ok(Symmetry::Triclinic),
            other => Err(XrdPhaseError::InvalidArgument(format!(
                "Unknown symmetry '{}'",
                other
            ))),
        }
    }
}

/// 物态方程参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EosParams {
    /// 零压晶胞参数（Å）
    pub a0: f64,
    pub b0: f64,
    pub c0: f64,
    /// 零压晶胞角（度）
    pub alpha0: f64,
    pub beta0: f64,
    pub gamma0: f64,
    /// 体弹模量 K0（GPa）
    pub k0: f64,
    /// 体弹模量压力导数 K0'
    pub k0p: f64,
    /// dK0/dT（GPa/K）
    pub dk0dt: f64,
    /// dK0'/dT（1/K）
    pub dk0pdt: f64,
    /// 热膨胀系数 α（1/K）
    pub alpha_t0: f64,
    /// dα/dT（1/K²）
    pub d_alpha_dt: f64,
    /// 当前压力（GPa）
    pub pressure: f64,
    /// 当前温度（K）
    pub temperature: f64,
}

impl Default for EosParams {
    fn default() -> Self {
        EosParams {
            a0: 0.0,
            b0: 0.0,
            c0: 0.0,
            alpha0: 90.0,
            beta0: 90.0,
            gamma0: 90.0,
            k0: 0.0,
            k0p: 4.0,
            dk0dt: 0.0,
            dk0pdt: 0.0,
            alpha_t0: 0.0,
            d_alpha_dt: 0.0,
            pressure: 0.0,
            temperature: REFERENCE_TEMPERATURE,
        }
    }
}

impl EosParams {
    pub fn get(&self, param: PhaseParam) -> f64 {
        match param {
            PhaseParam::A0 => self.a0,
            PhaseParam::B0 => self.b0,
            PhaseParam::C0 => self.c0,
            PhaseParam::Alpha0 => self.alpha0,
            PhaseParam::Beta0 => self.beta0,
            PhaseParam::Gamma0 => self.gamma0,
            PhaseParam::K0 => self.k0,
            PhaseParam::K0p => self.k0p,
            PhaseParam::Dk0dt => self.dk0dt,
            PhaseParam::Dk0pdt => self.dk0pdt,
            PhaseParam::AlphaT0 => self.alpha_t0,
            PhaseParam::DAlphaDt => self.d_alpha_dt,
            PhaseParam::Pressure => self.pressure,
            PhaseParam::Temperature => self.temperature,
        }
    }

    pub fn set(&mut self, param: PhaseParam, value: f64) {
        let slot = match param {
            PhaseParam::A0 => &mut self.a0,
            PhaseParam::B0 => &mut self.b0,
            PhaseParam::C0 => &mut self.c0,
            PhaseParam::Alpha0 => &mut self.alpha0,
            PhaseParam::Beta0 => &mut self.beta0,
            PhaseParam::Gamma0 => &mut self.gamma0,
            PhaseParam::K0 => &mut self.k0,
            PhaseParam::K0p => &mut self.k0p,
            PhaseParam::Dk0dt => &mut self.dk0dt,
            PhaseParam::Dk0pdt => &mut self.dk0pdt,
            PhaseParam::AlphaT0 => &mut self.alpha_t0,
            PhaseParam::DAlphaDt => &mut self.d_alpha_dt,
            PhaseParam::Pressure => &mut self.pressure,
            PhaseParam::Temperature => &mut self.temperature,
        };
        *slot = value;
    }

    /// 以 (名字, 数值) 形式列出全部参数
    pub fn iter(&self) -> impl Iterator<Item = (PhaseParam, f64)> + '_ {
        PhaseParam::ALL.iter().map(move |&p| (p, self.get(p)))
    }
}

/// 可寻址的物态方程参数名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseParam {
    A0,
    B0,
    C0,
    Alpha0,
    Beta0,
    Gamma0,
    K0,
    K0p,
    Dk0dt,
    Dk0pdt,
    AlphaT0,
    DAlphaDt,
    Pressure,
    Temperature,
}

impl PhaseParam {
    pub const ALL: [PhaseParam; 14] = [
        PhaseParam::A0,
        PhaseParam::B0,
        PhaseParam::C0,
        PhaseParam::Alpha0,
        PhaseParam::Beta0,
        PhaseParam::Gamma0,
        PhaseParam::K0,
        PhaseParam::K0p,
        PhaseParam::Dk0dt,
        PhaseParam::Dk0pdt,
        PhaseParam::AlphaT0,
        PhaseParam::DAlphaDt,
        PhaseParam::Pressure,
        PhaseParam::Temperature,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PhaseParam::A0 => "a0",
            PhaseParam::B0 => "b0",
            PhaseParam::C0 => "c0",
            PhaseParam::Alpha0 => "alpha0",
            PhaseParam::Beta0 => "beta0",
            PhaseParam::Gamma0 => "gamma0",
            PhaseParam::K0 => "k0",
            PhaseParam::K0p => "k0p",
            PhaseParam::Dk0dt => "dk0dt",
            PhaseParam::Dk0pdt => "dk0pdt",
            PhaseParam::AlphaT0 => "alpha_t0",
            PhaseParam::DAlphaDt => "d_alpha_dt",
            PhaseParam::Pressure => "pressure",
            PhaseParam::Temperature => "temperature",
        }
    }

    /// 压力和温度是实验条件，其余是晶体本身的参数
    pub fn is_condition(&self) -> bool {
        matches!(self, PhaseParam::Pressure | PhaseParam::Temperature)
    }
}

impl fmt::Display for PhaseParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhaseParam {
    type Err = XrdPhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        PhaseParam::ALL
            .iter()
            .copied()
            .find(|p| p.name() == key)
            .ok_or_else(|| XrdPhaseError::UnknownParameter(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_names_round_trip() {
        for param in PhaseParam::ALL {
            assert_eq!(param.name().parse::<PhaseParam>().unwrap(), param);
        }
        assert!("K0P".parse::<PhaseParam>().is_ok());
        assert!(matches!(
            "volume".parse::<PhaseParam>(),
            Err(XrdPhaseError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_get_set() {
        let mut params = EosParams::default();
        params.set(PhaseParam::K0, 166.65);
        params.set(PhaseParam::Pressure, 10.0);
        assert_eq!(params.get(PhaseParam::K0), 166.65);
        assert_eq!(params.pressure, 10.0);
        assert_eq!(params.iter().count(), PhaseParam::ALL.len());
    }

    #[test]
    fn test_symmetry_from_space_group() {
        assert_eq!(Symmetry::from_space_group(225), Some(Symmetry::Cubic));
        assert_eq!(Symmetry::from_space_group(194), Some(Symmetry::Hexagonal));
        assert_eq!(Symmetry::from_space_group(62), Some(Symmetry::Orthorhombic));
        assert_eq!(Symmetry::from_space_group(0), None);
    }

    #[test]
    fn test_symmetry_from_cell() {
        assert_eq!(Symmetry::from_cell(4.0, 4.0, 4.0, 90.0, 90.0, 90.0), Symmetry::Cubic);
        assert_eq!(
            Symmetry::from_cell(3.0, 3.0, 5.0, 90.0, 90.0, 120.0),
            Symmetry::Hexagonal
        );
        assert_eq!(
            Symmetry::from_cell(5.0, 6.0, 7.0, 90.0, 101.0, 90.0),
            Symmetry::Monoclinic
        );
        assert_eq!("hexagonal".parse::<Symmetry>().unwrap(), Symmetry::Hexagonal);
    }
}
