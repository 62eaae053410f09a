use crate::geometry::transform::Vertex;
use crate::utils::color::{Color, WHITE};
use nalgebra::Vector3;

/// 屏幕空间三角形：视口变换后的三个顶点及其逐顶点属性
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenTriangle {
    /// 提交顺序中的序号
    pub index: usize,
    pub vertices: [Vertex; 3],
    /// 逐顶点颜色，供着色器插值
    pub colors: [Color; 3],
}

impl ScreenTriangle {
    pub fn new(index: usize, vertices: [Vertex; 3]) -> Self {
        Self {
            index,
            vertices,
            colors: [WHITE; 3],
        }
    }

    pub fn with_colors(mut self, colors: [Color; 3]) -> Self {
        self.colors = colors;
        self
    }

    /// 重心坐标的公共分母，为0表示退化三角形
    pub fn barycentric_denominator(&self) -> f32 {
        let [v0, v1, v2] = &self.vertices;
        (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y)
    }

    pub fn edge_setup(&self) -> Option<EdgeSetup> {
        let denom = self.barycentric_denominator();
        if denom == 0.0 {
            return None;
        }
        let [v0, v1, v2] = self.vertices;
        Some(EdgeSetup { v0, v1, v2, denom })
    }
}

/// 三角形的重心坐标预计算
#[derive(Debug, Clone, Copy)]
pub struct EdgeSetup {
    v0: Vertex,
    v1: Vertex,
    v2: Vertex,
    denom: f32,
}

impl EdgeSetup {
    /// 点 `(px, py)` 相对三个顶点的重心权重 `(w0, w1, w2)`
    #[inline]
    pub fn weights(&self, px: f32, py: f32) -> Vector3<f32> {
        let (v0, v1, v2) = (&self.v0, &self.v1, &self.v2);
        let w0 = ((v1.y - v2.y) * (px - v2.x) + (v2.x - v1.x) * (py - v2.y)) / self.denom;
        let w1 = ((v2.y - v0.y) * (px - v2.x) + (v0.x - v2.x) * (py - v2.y)) / self.denom;
        Vector3::new(w0, w1, 1.0 - w0 - w1)
    }

    /// 在像素中心采样
    #[inline]
    pub fn weights_at_pixel(&self, x: usize, y: usize) -> Vector3<f32> {
        self.weights(x as f32 + 0.5, y as f32 + 0.5)
    }

    /// 边上的点（权重为0）同时属于相邻的两个三角形
    #[inline]
    pub fn is_inside(weights: &Vector3<f32>) -> bool {
        weights.x >= 0.0 && weights.y >= 0.0 && weights.z >= 0.0
    }

    #[inline]
    pub fn depth(&self, weights: &Vector3<f32>) -> f32 {
        weights.x * self.v0.z + weights.y * self.v1.z + weights.z * self.v2.z
    }
}

/// 屏幕空间包围盒，闭区间，已裁剪到 `[0, width-1] x [0, height-1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    /// 完全落在屏幕外时返回 `None`
    pub fn from_triangle(triangle: &ScreenTriangle, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let [v0, v1, v2] = &triangle.vertices;

        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i64).max(0);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i64).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i64).min(width as i64 - 1);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i64).min(height as i64 - 1);

        if max_x < min_x || max_y < min_y {
            None
        } else {
            Some(Self {
                min_x: min_x as usize,
                min_y: min_y as usize,
                max_x: max_x as usize,
                max_y: max_y as usize,
            })
        }
    }

    pub fn for_each_pixel<F>(&self, mut callback: F)
    where
        F: FnMut(usize, usize),
    {
        for y in self.min_y..=self.max_y {
            for x in self.min_x..=self.max_x {
                callback(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::transform::vertex;

    fn tri(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> ScreenTriangle {
        ScreenTriangle::new(
            0,
            [
                vertex(a.0, a.1, 0.0),
                vertex(b.0, b.1, 0.5),
                vertex(c.0, c.1, 1.0),
            ],
        )
    }

    #[test]
    fn bounding_box_is_floor_ceil_and_clamped() {
        let t = tri((-3.2, 1.5), (4.1, 2.2), (1.0, 9.7));
        let bbox = BoundingBox::from_triangle(&t, 8, 8).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                min_x: 0,
                min_y: 1,
                max_x: 5,
                max_y: 7,
            }
        );
    }

    #[test]
    fn offscreen_triangle_has_no_box() {
        let t = tri((20.0, 1.0), (25.0, 2.0), (22.0, 5.0));
        assert_eq!(BoundingBox::from_triangle(&t, 8, 8), None);
    }

    #[test]
    fn weights_sum_to_one_and_hit_vertices() {
        let t = tri((0.0, 0.0), (4.0, 0.0), (0.0, 4.0));
        let setup = t.edge_setup().unwrap();

        let at_v0 = setup.weights(0.0, 0.0);
        assert!((at_v0 - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
        let at_v2 = setup.weights(0.0, 4.0);
        assert!((at_v2 - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);

        let w = setup.weights_at_pixel(1, 1);
        assert!((w.sum() - 1.0).abs() < 1e-6);
        assert!(EdgeSetup::is_inside(&w));
        assert!(!EdgeSetup::is_inside(&setup.weights(3.5, 3.5)));
    }

    #[test]
    fn depth_is_weighted_sum() {
        let t = tri((0.0, 0.0), (4.0, 0.0), (0.0, 4.0));
        let setup = t.edge_setup().unwrap();
        let w = setup.weights(2.0, 0.0);
        assert!((setup.depth(&w) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn coincident_vertices_are_degenerate() {
        let t = tri((1.0, 1.0), (1.0, 1.0), (5.0, 3.0));
        assert_eq!(t.barycentric_denominator(), 0.0);
        assert!(t.edge_setup().is_none());
    }
}
