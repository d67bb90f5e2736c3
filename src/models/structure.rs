//! # 晶体结构数据模型
//!
//! 定义结构转换器使用的晶体结构表示，以及物相记录共享的晶格几何计算
//! （度规张量、倒易度规、d 间距）。
//!
//! ## 依赖关系
//! - 被 `loaders/cif.rs`、`xrd/calculator.rs` 和 `phase/record.rs` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let (sin_gamma, cos_gamma) = gamma.to_radians().sin_cos();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();

        Lattice {
            matrix: [a_vec, b_vec, [c1, c2, c3]],
        }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let g = self.metric_tensor();

        let a = g[0][0].sqrt();
        let b = g[1][1].sqrt();
        let c = g[2][2].sqrt();

        let alpha = (g[1][2] / (b * c)).acos().to_degrees();
        let beta = (g[0][2] / (a * c)).acos().to_degrees();
        let gamma = (g[0][1] / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 度规张量 G_ij = a_i · a_j
    pub fn metric_tensor(&self) -> [[f64; 3]; 3] {
        let mut g = [[0.0; 3]; 3];
        for (i, row) in g.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = dot(&self.matrix[i], &self.matrix[j]);
            }
        }
        g
    }

    /// 倒易度规张量 G* = G⁻¹；晶格退化时返回 None
    pub fn reciprocal_metric(&self) -> Option<[[f64; 3]; 3]> {
        invert(&self.metric_tensor())
    }

    /// 计算 (hkl) 晶面的 d 间距：1/d² = hᵀ G* h
    ///
    /// (000) 或退化晶格返回 None。
    pub fn d_spacing(&self, h: f64, k: f64, l: f64) -> Option<f64> {
        let gs = self.reciprocal_metric()?;
        d_from_reciprocal_metric(&gs, h, k, l)
    }
}

/// 用已求好的倒易度规计算 d 间距，避免在循环中反复求逆
pub fn d_from_reciprocal_metric(gs: &[[f64; 3]; 3], h: f64, k: f64, l: f64) -> Option<f64> {
    let hkl = [h, k, l];
    let mut inv_d2 = 0.0;
    for i in 0..3 {
        for j in 0..3 {
            inv_d2 += hkl[i] * gs[i][j] * hkl[j];
        }
    }
    if inv_d2 > 0.0 && inv_d2.is_finite() {
        Some(1.0 / inv_d2.sqrt())
    } else {
        None
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],

    /// 占位率
    pub occupancy: f64,

    /// 可选：原子标签（用于区分同种元素的不同位置）
    pub label: Option<String>,
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
            occupancy: 1.0,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = occupancy;
        self
    }
}

/// 晶体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表（已按对称操作展开）
    pub atoms: Vec<Atom>,

    /// 国际表空间群编号
    pub space_group_number: Option<u32>,

    /// 来源文件格式
    pub source_format: Option<String>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
            space_group_number: None,
            source_format: None,
        }
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, f64> = BTreeMap::new();

        for atom in &self.atoms {
            *counts.entry(atom.element.as_str()).or_insert(0.0) += atom.occupancy;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if (count - 1.0).abs() < 1e-6 {
                    el.to_string()
                } else if (count - count.round()).abs() < 1e-6 {
                    format!("{}{}", el, count.round() as i64)
                } else {
                    format!("{}{:.2}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 3x3 矩阵求逆
fn invert(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

    if det.abs() < 1e-12 || !det.is_finite() {
        return None;
    }

    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
        ],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_from_parameters_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let (a, b, c, alpha, beta, gamma) = lattice.parameters();

        assert!((a - 5.0).abs() < 1e-6);
        assert!((b - 5.0).abs() < 1e-6);
        assert!((c - 5.0).abs() < 1e-6);
        assert!((alpha - 90.0).abs() < 1e-6);
        assert!((beta - 90.0).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);
        assert!((lattice.volume().abs() - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_hexagonal() {
        let lattice = Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        let (a, _, c, _, _, gamma) = lattice.parameters();

        assert!((a - 3.0).abs() < 0.01);
        assert!((c - 5.0).abs() < 0.01);
        assert!((gamma - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_d_spacing_cubic() {
        let lattice = Lattice::from_parameters(4.0786, 4.0786, 4.0786, 90.0, 90.0, 90.0);
        let d111 = lattice.d_spacing(1.0, 1.0, 1.0).unwrap();
        // a / sqrt(3)
        assert!((d111 - 4.0786 / 3f64.sqrt()).abs() < 1e-9);
        assert!(lattice.d_spacing(0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_d_spacing_hexagonal() {
        let (a, c) = (3.0, 5.0);
        let lattice = Lattice::from_parameters(a, a, c, 90.0, 90.0, 120.0);
        let d = lattice.d_spacing(1.0, 0.0, 1.0).unwrap();
        // 1/d² = 4/3 (h² + hk + k²)/a² + l²/c²
        let expected = 1.0 / (4.0 / 3.0 / (a * a) + 1.0 / (c * c)).sqrt();
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn test_crystal_formula_with_occupancy() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.0]),
            Atom::new("Cl", [0.5, 0.5, 0.5]),
            Atom::new("Fe", [0.25, 0.25, 0.25]).with_occupancy(0.5),
        ];
        let crystal = Crystal::new("test", lattice, atoms);
        assert_eq!(crystal.formula(), "ClFe0.50Na");
    }

    #[test]
    fn test_atom_with_label() {
        let atom = Atom::new("Fe", [0.0, 0.0, 0.0]).with_label("Fe1");
        assert_eq!(atom.label, Some("Fe1".to_string()));
        assert_eq!(atom.occupancy, 1.0);
    }
}
