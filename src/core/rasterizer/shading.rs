use super::triangle_data::ScreenTriangle;
use crate::utils::color::{Color, WHITE, get_face_color};
use nalgebra::Vector3;

/// 逐像素着色函数：根据重心权重和三角形的顶点属性给出颜色
///
/// 需要 `Sync`，以便并行光栅化器在多个线程间共享。
pub trait PixelShader: Sync {
    fn shade(&self, weights: &Vector3<f32>, triangle: &ScreenTriangle) -> Color;
}

impl<F> PixelShader for F
where
    F: Fn(&Vector3<f32>, &ScreenTriangle) -> Color + Sync,
{
    fn shade(&self, weights: &Vector3<f32>, triangle: &ScreenTriangle) -> Color {
        self(weights, triangle)
    }
}

/// 纯色着色，默认白色
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantShader(pub Color);

impl Default for ConstantShader {
    fn default() -> Self {
        Self(WHITE)
    }
}

impl PixelShader for ConstantShader {
    fn shade(&self, _weights: &Vector3<f32>, _triangle: &ScreenTriangle) -> Color {
        self.0
    }
}

/// 每个三角形一个伪随机颜色
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceColorShader;

impl PixelShader for FaceColorShader {
    fn shade(&self, _weights: &Vector3<f32>, triangle: &ScreenTriangle) -> Color {
        get_face_color(triangle.index)
    }
}

/// 按重心权重插值逐顶点颜色
#[derive(Debug, Clone, Copy, Default)]
pub struct BarycentricShader;

impl PixelShader for BarycentricShader {
    fn shade(&self, weights: &Vector3<f32>, triangle: &ScreenTriangle) -> Color {
        let [c0, c1, c2] = &triangle.colors;
        c0 * weights.x + c1 * weights.y + c2 * weights.z
    }
}
