//! 颜色分类
//!
//! 将带噪声的 RGB 观测映射到六个魔方面色锚点中最近的一个
//! （RGB 空间欧氏距离最近邻）。纯函数，不做任何 I/O——
//! 原始读取是 Sensing Channel 的职责。

use cubescan_hw::Rgb;

/// 魔方面色
///
/// **变体声明顺序即平局裁决顺序**：两个锚点到观测值的距离
/// 严格相等时，分类结果取先声明的那个。该顺序是文档化约定，
/// 不是实现巧合，不要改动。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceColor {
    White,
    Green,
    Yellow,
    Orange,
    Blue,
    Red,
}

impl FaceColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceColor::White => "White",
            FaceColor::Green => "Green",
            FaceColor::Yellow => "Yellow",
            FaceColor::Orange => "Orange",
            FaceColor::Blue => "Blue",
            FaceColor::Red => "Red",
        }
    }
}

impl std::fmt::Display for FaceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 固定参考调色板（标定锚点）
///
/// 进程级不可变常量；条目顺序与 `FaceColor` 声明顺序一致。
pub const REFERENCE_PALETTE: [(FaceColor, Rgb); 6] = [
    (FaceColor::White, Rgb::new(255, 255, 255)),
    (FaceColor::Green, Rgb::new(0, 155, 72)),
    (FaceColor::Yellow, Rgb::new(255, 213, 0)),
    (FaceColor::Orange, Rgb::new(255, 88, 0)),
    (FaceColor::Blue, Rgb::new(0, 70, 173)),
    (FaceColor::Red, Rgb::new(196, 30, 58)),
];

/// RGB 空间欧氏距离的平方
///
/// 欧氏距离关于平方和单调，比较时无需开方。
fn distance_sq(a: Rgb, b: Rgb) -> i64 {
    let dr = a.r as i64 - b.r as i64;
    let dg = a.g as i64 - b.g as i64;
    let db = a.b as i64 - b.b as i64;
    dr * dr + dg * dg + db * db
}

/// 将观测 RGB 分类为最近的面色
///
/// 按调色板声明顺序扫描，严格 `<` 更新最小值，因此距离相等时
/// 保留先遇到的锚点（确定的平局裁决）。
pub fn classify(observed: Rgb) -> FaceColor {
    let (mut best_color, first_anchor) = REFERENCE_PALETTE[0];
    let mut best_distance = distance_sq(observed, first_anchor);

    for &(color, anchor) in &REFERENCE_PALETTE[1..] {
        let distance = distance_sq(observed, anchor);
        if distance < best_distance {
            best_distance = distance;
            best_color = color;
        }
    }

    best_color
}
