//! # 物相颜色分配
//!
//! 颜色只由"历史上一共添加过多少个物相"决定：色相每次前进 0.19 圈，
//! 饱和度和明度固定为 0.8。删除物相不会让颜色被重新使用。
//!
//! ## 依赖关系
//! - 被 `phase/collection.rs` 使用
//! - 使用 `palette` 完成 HSV → sRGB 转换

use palette::{encoding, FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 8 位 RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// 第 `n` 个颜色
pub fn color_for(n: usize) -> Rgb {
    let hue = (0.19 * (n as f64 + 2.0)).rem_euclid(1.0);
    let hsv: Hsv<encoding::Srgb, f32> = Hsv::new((hue * 360.0) as f32, 0.8, 0.8);
    let rgb: Srgb<f32> = Srgb::from_color(hsv);
    let rgb: Srgb<u8> = rgb.into_format();
    Rgb::new(rgb.red, rgb.green, rgb.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_deterministic() {
        assert_eq!(color_for(10), color_for(10));
        assert_ne!(color_for(10), color_for(11));
    }

    #[test]
    fn test_color_saturation_and_value() {
        for n in 0..20 {
            let c = color_for(n);
            let max = c.r.max(c.g).max(c.b);
            let min = c.r.min(c.g).min(c.b);
            // V = 0.8 -> 204, S = 0.8 -> min = 0.2 * 204 ≈ 41
            assert!((max as i32 - 204).abs() <= 1, "{c}");
            assert!((min as i32 - 41).abs() <= 1, "{c}");
        }
    }

    #[test]
    fn test_hue_walk() {
        // n = 3 -> h = 0.95 -> 接近红色
        let c = color_for(3);
        assert!(c.r > c.g && c.r > c.b);
        assert_eq!(format!("{}", Rgb::new(255, 0, 16)), "#ff0010");
    }
}
