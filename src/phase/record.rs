//! # 物相记录
//!
//! 单个晶相的物态方程参数及其派生量（零压体积 V0、零压 d 间距、
//! 当前条件下的晶胞与 d 间距）。
//!
//! ## 物态方程
//! 三阶 Birch–Murnaghan，x = V0/V：
//!
//! P(x) = 3/2·K_T·(x^{7/3} − x^{5/3})·(1 + 3/4·(K'_T − 4)·(x^{2/3} − 1))
//!
//! 温度效应以热压 α_T·K_T·(T − 298) 计入：先从外压中扣除，再求解体积。
//! 晶胞各边按 (V/V0)^{1/3} 等比例缩放，角度不变。
//!
//! ## 不变量
//! 任何参数修改后立即重算派生量：原始参数变化时按 V0 → d0 → d 的顺序重算，
//! 压力 / 温度变化时只重算 d。
//!
//! ## 依赖关系
//! - 被 `phase/collection.rs`、`loaders/` 使用
//! - 使用 `models/structure.rs` 的晶格几何计算

use super::params::{EosParams, PhaseParam, Symmetry, REFERENCE_TEMPERATURE};
use super::reflection::Reflection;
use crate::error::{Result, XrdPhaseError};
use crate::models::Lattice;

/// Birch–Murnaghan 求解的最大压缩比 V0/V
const MAX_COMPRESSION: f64 = 20.0;

/// 当前条件下的晶胞
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    /// 体积（Å³）
    pub v: f64,
}

/// 单个晶相
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseRecord {
    name: String,
    comment: String,
    symmetry: Symmetry,
    params: EosParams,
    v0: f64,
    cell: Cell,
    reflections: Vec<Reflection>,
}

impl PhaseRecord {
    /// 由原始参数创建物相记录，并在默认（文件中给出的）条件下计算全部派生量
    ///
    /// 零压晶胞或求得的 d 间距出现非有限值、非正值时返回 `InvalidPhase`。
    pub fn new(
        name: impl Into<String>,
        symmetry: Symmetry,
        params: EosParams,
        reflections: Vec<Reflection>,
    ) -> Result<Self> {
        let mut record = PhaseRecord {
            name: name.into(),
            comment: String::new(),
            symmetry,
            params,
            v0: 0.0,
            cell: Cell {
                a: 0.0,
                b: 0.0,
                c: 0.0,
                alpha: 0.0,
                beta: 0.0,
                gamma: 0.0,
                v: 0.0,
            },
            reflections,
        };

        record.recompute_all();
        record.validate()?;
        Ok(record)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    pub fn params(&self) -> &EosParams {
        &self.params
    }

    pub fn pressure(&self) -> f64 {
        self.params.pressure
    }

    pub fn temperature(&self) -> f64 {
        self.params.temperature
    }

    /// 零压体积（Å³）
    pub fn v0(&self) -> f64 {
        self.v0
    }

    /// 当前条件下的晶胞
    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn reflections(&self) -> &[Reflection] {
        &self.reflections
    }

    /// 是否有热膨胀参数；没有时温度修改不产生任何效果
    pub fn has_thermal_expansion(&self) -> bool {
        self.params.alpha_t0 != 0.0 || self.params.d_alpha_dt != 0.0
    }

    /// 应用晶系约束并计算零压体积
    pub fn compute_v0(&mut self) {
        let p = &mut self.params;
        match self.symmetry {
            Symmetry::Cubic => {
                p.b0 = p.a0;
                p.c0 = p.a0;
                p.alpha0 = 90.0;
                p.beta0 = 90.0;
                p.gamma0 = 90.0;
            }
            Symmetry::Tetragonal => {
                p.b0 = p.a0;
                p.alpha0 = 90.0;
                p.beta0 = 90.0;
                p.gamma0 = 90.0;
            }
            Symmetry::Orthorhombic => {
                p.alpha0 = 90.0;
                p.beta0 = 90.0;
                p.gamma0 = 90.0;
            }
            Symmetry::Hexagonal | Symmetry::Trigonal => {
                p.b0 = p.a0;
                p.alpha0 = 90.0;
                p.beta0 = 90.0;
                p.gamma0 = 120.0;
            }
            Symmetry::Rhombohedral => {
                p.b0 = p.a0;
                p.c0 = p.a0;
                p.beta0 = p.alpha0;
                p.gamma0 = p.alpha0;
            }
            Symmetry::Monoclinic => {
                p.alpha0 = 90.0;
                p.gamma0 = 90.0;
            }
            Symmetry::Triclinic => {}
        }

        self.v0 = self.zero_pressure_lattice().volume().abs();
    }

    /// 由零压晶胞计算每条反射的 d0
    ///
    /// (000) 这样没有几何意义的反射保留原有 d0。
    pub fn compute_d0(&mut self) {
        let Some(gs) = self.zero_pressure_lattice().reciprocal_metric() else {
            for reflection in &mut self.reflections {
                reflection.d0 = f64::NAN;
            }
            return;
        };

        for reflection in &mut self.reflections {
            if let Some(d0) = crate::models::structure::d_from_reciprocal_metric(
                &gs,
                reflection.h,
                reflection.k,
                reflection.l,
            ) {
                reflection.d0 = d0;
            }
        }
    }

    /// 在给定（或当前）压力 / 温度下重算晶胞和全部 d 间距
    ///
    /// 传入的条件会被保存；相同输入重复调用得到完全相同的结果。
    pub fn compute_spacing(&mut self, pressure: Option<f64>, temperature: Option<f64>) {
        if let Some(pressure) = pressure {
            self.params.pressure = pressure;
        }
        if let Some(temperature) = temperature {
            self.params.temperature = temperature;
        }

        let v = self.compute_volume();
        let ratio = (v / self.v0).cbrt();

        self.cell = Cell {
            a: self.params.a0 * ratio,
            b: self.params.b0 * ratio,
            c: self.params.c0 * ratio,
            alpha: self.params.alpha0,
            beta: self.params.beta0,
            gamma: self.params.gamma0,
            v,
        };

        for reflection in &mut self.reflections {
            reflection.d = reflection.d0 * ratio;
        }
    }

    /// 修改压力并重算
    pub fn set_pressure(&mut self, pressure: f64) {
        self.compute_spacing(Some(pressure), None);
    }

    /// 修改温度并重算；没有热膨胀参数时什么也不做
    ///
    /// 返回是否实际修改了温度。
    pub fn set_temperature(&mut self, temperature: f64) -> bool {
        if !self.has_thermal_expansion() {
            return false;
        }
        self.compute_spacing(None, Some(temperature));
        true
    }

    /// 修改单个参数并按 V0 → d0 → d 的顺序重算
    pub fn set_parameter(&mut self, param: PhaseParam, value: f64) {
        self.params.set(param, value);
        self.recompute_all();
    }

    /// 整体替换参数（恢复配置时使用）
    pub fn set_params(&mut self, params: EosParams) {
        self.params = params;
        self.recompute_all();
    }

    /// 追加一条反射，并在当前条件下计算它的 d 间距
    pub fn add_reflection(&mut self, reflection: Reflection) {
        self.reflections.push(reflection);
        self.compute_d0();
        self.compute_spacing(None, None);
    }

    /// 删除一条反射
    ///
    /// # Panics
    /// `index` 越界时 panic。
    pub fn delete_reflection(&mut self, index: usize) -> Reflection {
        self.reflections.remove(index)
    }

    fn recompute_all(&mut self) {
        self.compute_v0();
        self.compute_d0();
        self.compute_spacing(None, None);
    }

    fn zero_pressure_lattice(&self) -> Lattice {
        let p = &self.params;
        Lattice::from_parameters(p.a0, p.b0, p.c0, p.alpha0, p.beta0, p.gamma0)
    }

    /// 当前压力 / 温度下的体积
    fn compute_volume(&self) -> f64 {
        let p = &self.params;

        // 0 K 视为室温
        let temperature = if p.temperature == 0.0 {
            REFERENCE_TEMPERATURE
        } else {
            p.temperature
        };
        let dt = temperature - REFERENCE_TEMPERATURE;

        let alpha_t = p.alpha_t0 + p.d_alpha_dt * temperature;
        let k0_t = p.k0 + p.dk0dt * dt;
        let k0p_t = p.k0p + p.dk0pdt * dt;

        if p.k0 <= 0.0 || k0_t <= 0.0 {
            return self.v0 * (1.0 + alpha_t * dt);
        }

        let mod_pressure = p.pressure - alpha_t * k0_t * dt;
        if mod_pressure < 0.0 {
            return self.v0 * (1.0 - mod_pressure / k0_t);
        }

        match bm3_compression(mod_pressure, k0_t, k0p_t) {
            Some(x) => self.v0 / x,
            None => f64::NAN,
        }
    }

    fn validate(&self) -> Result<()> {
        let p = &self.params;
        for (name, value) in [("a0", p.a0), ("b0", p.b0), ("c0", p.c0)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(XrdPhaseError::InvalidPhase(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.v0 > 0.0 && self.v0.is_finite()) {
            return Err(XrdPhaseError::InvalidPhase(format!(
                "unit cell volume is undefined ({})",
                self.v0
            )));
        }
        if !self.cell.v.is_finite() {
            return Err(XrdPhaseError::InvalidPhase(format!(
                "volume at P = {} GPa, T = {} K is undefined",
                p.pressure, p.temperature
            )));
        }
        if let Some(bad) = self
            .reflections
            .iter()
            .find(|r| !r.d.is_finite() || r.d < 0.0)
        {
            return Err(XrdPhaseError::InvalidPhase(format!(
                "reflection ({} {} {}) has invalid d-spacing {}",
                bad.h, bad.k, bad.l, bad.d
            )));
        }
        Ok(())
    }
}

/// Birch–Murnaghan 三阶物态方程给出的压力
pub fn bm3_pressure(x: f64, k0: f64, k0p: f64) -> f64 {
    let x23 = x.powf(2.0 / 3.0);
    1.5 * k0 * (x.powf(7.0 / 3.0) - x.powf(5.0 / 3.0)) * (1.0 + 0.75 * (k0p - 4.0) * (x23 - 1.0))
}

/// 求解 P(x) = pressure 的压缩比 x = V0/V（二分法，结果只依赖输入）
fn bm3_compression(pressure: f64, k0: f64, k0p: f64) -> Option<f64> {
    if pressure <= 0.0 {
        return Some(1.0);
    }

    let mut lo = 1.0;
    let mut hi = 1.0 + pressure / k0;
    while bm3_pressure(hi, k0, k0p) < pressure {
        lo = hi;
        hi = 1.0 + 2.0 * (hi - 1.0);
        if hi > MAX_COMPRESSION {
            return None;
        }
    }

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if bm3_pressure(mid, k0, k0p) < pressure {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-15 {
            break;
        }
    }

    Some(0.5 * (lo + hi))
}
