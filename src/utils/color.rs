use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// RGB颜色，分量范围 [0.0, 1.0]
pub type Color = Vector3<f32>;

pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

/// 将 [0,1] 的浮点颜色转换为u8数组
pub fn rgb_to_u8(color: &Color) -> [u8; 3] {
    [
        (color.x * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.y * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.z * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// 根据三角形序号生成伪随机颜色，同一序号总是得到同一颜色
pub fn get_face_color(face_index: usize) -> Color {
    let mut rng = StdRng::seed_from_u64(face_index as u64);
    Color::new(
        0.3 + rng.random::<f32>() * 0.7,
        0.3 + rng.random::<f32>() * 0.7,
        0.3 + rng.random::<f32>() * 0.7,
    )
}

/// 将归一化深度 (0.0-1.0) 转换为JET色图的RGB字节，非有限值输出黑色
pub fn apply_colormap_jet(normalized_depth: &[f32]) -> Vec<u8> {
    let mut result = vec![0u8; normalized_depth.len() * 3];

    for (index, &depth) in normalized_depth.iter().enumerate() {
        if !depth.is_finite() {
            continue;
        }

        let value = depth.clamp(0.0, 1.0);
        let mut r = 0.0;
        let g;
        let mut b = 0.0;

        if value <= 0.25 {
            b = 1.0;
            g = value * 4.0;
        } else if value <= 0.5 {
            g = 1.0;
            b = 1.0 - (value - 0.25) * 4.0;
        } else if value <= 0.75 {
            g = 1.0;
            r = (value - 0.5) * 4.0;
        } else {
            r = 1.0;
            g = 1.0 - (value - 0.75) * 4.0;
        }

        let rgb = rgb_to_u8(&Color::new(r, g, b));
        result[index * 3..index * 3 + 3].copy_from_slice(&rgb);
    }

    result
}
