//! # CIF 格式解析器
//!
//! 只读取计算衍射线需要的部分：晶胞参数、空间群编号、对称操作和原子位置。
//!
//! ## CIF 格式说明
//! ```text
//! data_NaCl
//! _cell_length_a    5.6402(3)
//! _cell_angle_alpha 90
//! _symmetry_Int_Tables_number 225
//! loop_
//! _symmetry_equiv_pos_as_xyz
//!   'x, y, z'
//!   '-x+1/2, y, -z'
//! loop_
//! _atom_site_label
//! _atom_site_type_symbol
//! _atom_site_fract_x
//! _atom_site_fract_y
//! _atom_site_fract_z
//! _atom_site_occupancy
//! Na1 Na+ 0 0 0 1.0
//! ```
//!
//! 数值后的括号不确定度会被忽略；`?` 和 `.` 视为缺失。
//! 只读取第一个 `data_` 块。
//!
//! ## 依赖关系
//! - 被 `loaders/converter.rs` 使用
//! - 使用 `models/structure.rs`、`xrd/scattering.rs` 的元素符号规范化

use crate::error::{Result, XrdPhaseError};
use crate::models::{Atom, Crystal, Lattice};
use crate::xrd::scattering::element_symbol;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 对称展开时判断两个位置重合的容差（分数坐标）
const POSITION_TOLERANCE: f64 = 1e-3;

/// 解析 CIF 文件
pub fn parse_cif_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| XrdPhaseError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_cif_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
    .map_err(|reason| XrdPhaseError::ParseError {
        format: "cif".to_string(),
        path: path.display().to_string(),
        reason,
    })
}

/// 从字符串内容解析 CIF 格式
pub fn parse_cif_content(content: &str, default_name: &str) -> std::result::Result<Crystal, String> {
    let block = CifBlock::parse(content)?;

    let name = block
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_name.to_string());

    let cell_value = |tag: &str| -> std::result::Result<f64, String> {
        block
            .number(tag)
            .ok_or_else(|| format!("missing or invalid {}", tag))
    };
    let a = cell_value("_cell_length_a")?;
    let b = cell_value("_cell_length_b")?;
    let c = cell_value("_cell_length_c")?;
    let alpha = block.number("_cell_angle_alpha").unwrap_or(90.0);
    let beta = block.number("_cell_angle_beta").unwrap_or(90.0);
    let gamma = block.number("_cell_angle_gamma").unwrap_or(90.0);
    let lattice = Lattice::from_parameters(a, b, c, alpha, beta, gamma);

    let space_group_number = block
        .number("_space_group_it_number")
        .or_else(|| block.number("_symmetry_int_tables_number"))
        .map(|n| n as u32);

    let operations = match block
        .column("_space_group_symop_operation_xyz")
        .or_else(|| block.column("_symmetry_equiv_pos_as_xyz"))
    {
        Some(ops) => ops
            .iter()
            .map(|op| SymmetryOperation::parse(op))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => vec![SymmetryOperation::identity()],
    };

    let sites = block.atom_sites()?;
    if sites.is_empty() {
        return Err("no _atom_site entries found".to_string());
    }

    let atoms = expand_sites(&sites, &operations);
    log::debug!(
        "CIF {}: {} sites, {} operations -> {} atoms",
        name,
        sites.len(),
        operations.len(),
        atoms.len()
    );

    let mut crystal = Crystal::new(name, lattice, atoms);
    crystal.space_group_number = space_group_number;
    crystal.source_format = Some("cif".to_string());
    Ok(crystal)
}

/// 一个 CIF 词法单元
#[derive(Debug, Clone, PartialEq)]
struct Token {
    text: String,
    /// 引号或分号文本域中的值，不能当作关键字
    quoted: bool,
}

impl Token {
    fn is_tag(&self) -> bool {
        !self.quoted && self.text.starts_with('_')
    }

    fn is_reserved(&self) -> bool {
        if self.quoted {
            return false;
        }
        let lower = self.text.to_lowercase();
        lower == "loop_" || lower.starts_with("data_") || lower.starts_with("save_")
    }
}

fn tokenize(content: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        // 分号文本域
        if let Some(first) = line.strip_prefix(';') {
            let mut text = first.to_string();
            let mut closed = false;
            for next in lines.by_ref() {
                if next.starts_with(';') {
                    closed = true;
                    break;
                }
                text.push('\n');
                text.push_str(next);
            }
            if !closed {
                return Err("unterminated ';' text field".to_string());
            }
            tokens.push(Token {
                text: text.trim().to_string(),
                quoted: true,
            });
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            if ch.is_whitespace() {
                i += 1;
                continue;
            }
            if ch == '#' {
                break;
            }
            if ch == '\'' || ch == '"' {
                // 结束引号后必须是空白或行尾
                let start = i + 1;
                let mut end = start;
                while end < chars.len()
                    && !(chars[end] == ch
                        && (end + 1 == chars.len() || chars[end + 1].is_whitespace()))
                {
                    end += 1;
                }
                tokens.push(Token {
                    text: chars[start..end.min(chars.len())].iter().collect(),
                    quoted: true,
                });
                i = end + 1;
                continue;
            }
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            tokens.push(Token {
                text: chars[start..i].iter().collect(),
                quoted: false,
            });
        }
    }

    Ok(tokens)
}

#[derive(Debug, Default)]
struct CifLoop {
    tags: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CifLoop {
    fn column_index(&self, tag: &str) -> Option<usize> {
        self.tags.iter().position(|t| t == tag)
    }
}

/// 第一个数据块中的单值项和循环
#[derive(Debug, Default)]
struct CifBlock {
    name: Option<String>,
    items: HashMap<String, String>,
    loops: Vec<CifLoop>,
}

impl CifBlock {
    fn parse(content: &str) -> std::result::Result<Self, String> {
        let tokens = tokenize(content)?;
        let mut block = CifBlock::default();
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            let lower = token.text.to_lowercase();

            if !token.quoted && lower.starts_with("data_") {
                if block.name.is_some() {
                    break;
                }
                block.name = Some(token.text[5..].to_string());
                i += 1;
            } else if !token.quoted && lower == "loop_" {
                i += 1;
                let mut cif_loop = CifLoop::default();
                while i < tokens.len() && tokens[i].is_tag() {
                    cif_loop.tags.push(tokens[i].text.to_lowercase());
                    i += 1;
                }
                let mut values = Vec::new();
                while i < tokens.len() && !tokens[i].is_tag() && !tokens[i].is_reserved() {
                    values.push(tokens[i].text.clone());
                    i += 1;
                }
                if cif_loop.tags.is_empty() {
                    return Err("loop_ without tags".to_string());
                }
                if values.len() % cif_loop.tags.len() != 0 {
                    return Err(format!(
                        "loop starting with {} has {} values for {} columns",
                        cif_loop.tags[0],
                        values.len(),
                        cif_loop.tags.len()
                    ));
                }
                cif_loop.rows = values
                    .chunks(cif_loop.tags.len())
                    .map(|row| row.to_vec())
                    .collect();
                block.loops.push(cif_loop);
            } else if token.is_tag() {
                let value = tokens
                    .get(i + 1)
                    .filter(|t| !t.is_tag() && !t.is_reserved())
                    .ok_or_else(|| format!("tag {} has no value", token.text))?;
                block.items.insert(lower, value.text.clone());
                i += 2;
            } else {
                // 数据块之外的孤立值
                i += 1;
            }
        }

        Ok(block)
    }

    /// 单值数字项（也接受只有一行的循环）
    fn number(&self, tag: &str) -> Option<f64> {
        self.items
            .get(tag)
            .map(String::as_str)
            .or_else(|| {
                self.column(tag)
                    .and_then(|col| col.first().copied())
            })
            .and_then(parse_number)
    }

    fn column(&self, tag: &str) -> Option<Vec<&str>> {
        self.loops.iter().find_map(|l| {
            l.column_index(tag)
                .map(|idx| l.rows.iter().map(|row| row[idx].as_str()).collect())
        })
    }

    fn atom_sites(&self) -> std::result::Result<Vec<Atom>, String> {
        let Some(sites) = self
            .loops
            .iter()
            .find(|l| l.column_index("_atom_site_fract_x").is_some())
        else {
            return Ok(Vec::new());
        };

        let col = |tag: &str| sites.column_index(tag);
        let (Some(ix), Some(iy), Some(iz)) = (
            col("_atom_site_fract_x"),
            col("_atom_site_fract_y"),
            col("_atom_site_fract_z"),
        ) else {
            return Err("atom_site loop lacks fractional coordinates".to_string());
        };
        let label_col = col("_atom_site_label");
        let type_col = col("_atom_site_type_symbol");
        let occ_col = col("_atom_site_occupancy");
        if label_col.is_none() && type_col.is_none() {
            return Err("atom_site loop lacks label and type symbol".to_string());
        }

        sites
            .rows
            .iter()
            .map(|row| {
                let label = label_col.map(|c| row[c].as_str());
                let type_symbol = type_col.map(|c| row[c].as_str()).or(label).unwrap_or("");
                let element = element_symbol(type_symbol);
                if element.is_empty() {
                    return Err(format!("cannot determine element of site '{}'", type_symbol));
                }

                let coord = |c: usize| {
                    parse_number(&row[c])
                        .ok_or_else(|| format!("invalid coordinate '{}'", row[c]))
                };
                let position = [coord(ix)?, coord(iy)?, coord(iz)?];
                let occupancy = occ_col
                    .and_then(|c| parse_number(&row[c]))
                    .unwrap_or(1.0);

                let mut atom = Atom::new(element, position).with_occupancy(occupancy);
                if let Some(label) = label {
                    atom = atom.with_label(label);
                }
                Ok(atom)
            })
            .collect()
    }
}

/// 解析数字，忽略括号中的不确定度
fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text == "?" || text == "." {
        return None;
    }
    let text = text.split('(').next().unwrap_or(text);
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 解析分数或小数，如 `1/2`、`0.25`
fn parse_fraction(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => text.trim().parse().ok(),
    }
}

/// 一个对称操作：x' = R·x + t
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperation {
    pub rotation: [[f64; 3]; 3],
    pub translation: [f64; 3],
}

impl SymmetryOperation {
    pub fn identity() -> Self {
        SymmetryOperation {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }

    /// 解析 `-x+1/2, y, -z` 形式的操作
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let parts: Vec<&str> = text.split(',').collect();
        if parts.len() != 3 {
            return Err(format!("invalid symmetry operation '{}'", text));
        }

        let mut op = SymmetryOperation {
            rotation: [[0.0; 3]; 3],
            translation: [0.0; 3],
        };
        for (row, part) in parts.iter().enumerate() {
            let (coeffs, shift) = parse_component(part)
                .ok_or_else(|| format!("invalid symmetry operation '{}'", text))?;
            op.rotation[row] = coeffs;
            op.translation[row] = shift;
        }
        Ok(op)
    }

    pub fn apply(&self, p: &[f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, row) in self.rotation.iter().enumerate() {
            out[i] = row[0] * p[0] + row[1] * p[1] + row[2] * p[2] + self.translation[i];
        }
        out
    }
}

/// 解析一个坐标分量，返回 (x/y/z 系数, 平移)
fn parse_component(text: &str) -> Option<([f64; 3], f64)> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if compact.is_empty() {
        return None;
    }

    // 按 +/- 切分，符号留在项首
    let mut terms: Vec<String> = Vec::new();
    for ch in compact.chars() {
        if (ch == '+' || ch == '-') || terms.is_empty() {
            terms.push(String::new());
        }
        if let Some(last) = terms.last_mut() {
            last.push(ch);
        }
    }

    let mut coeffs = [0.0; 3];
    let mut shift = 0.0;
    for term in terms {
        let (sign, body) = match term.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, term.strip_prefix('+').unwrap_or(&term)),
        };
        if body.is_empty() {
            return None;
        }

        let axis = match body.chars().last() {
            Some('x') => Some(0),
            Some('y') => Some(1),
            Some('z') => Some(2),
            _ => None,
        };
        match axis {
            Some(axis) => {
                let factor = body[..body.len() - 1].trim_end_matches('*');
                let factor = if factor.is_empty() {
                    1.0
                } else {
                    parse_fraction(factor)?
                };
                coeffs[axis] += sign * factor;
            }
            None => shift += sign * parse_fraction(body)?,
        }
    }

    Some((coeffs, shift))
}

/// 用对称操作展开不等价位置，去掉重合的原子
fn expand_sites(sites: &[Atom], operations: &[SymmetryOperation]) -> Vec<Atom> {
    let mut atoms: Vec<Atom> = Vec::new();

    for site in sites {
        let start = atoms.len();
        for op in operations {
            let p = op.apply(&site.position);
            let position = [
                wrap_unit(p[0]),
                wrap_unit(p[1]),
                wrap_unit(p[2]),
            ];

            let duplicate = atoms[start..]
                .iter()
                .any(|a| periodic_distance(&a.position, &position) < POSITION_TOLERANCE);
            if !duplicate {
                let mut atom = site.clone();
                atom.position = position;
                atoms.push(atom);
            }
        }
    }

    atoms
}

fn wrap_unit(x: f64) -> f64 {
    let w = x.rem_euclid(1.0);
    // 1 - 1e-12 这样的值归到 0
    if (1.0 - w) < 1e-9 {
        0.0
    } else {
        w
    }
}

fn periodic_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (x - y).rem_euclid(1.0);
            d.min(1.0 - d)
        })
        .fold(0.0, f64::max)
}
