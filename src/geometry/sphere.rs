use crate::core::error::RenderError;
use crate::geometry::transform::{Vertex, vertex};
use log::debug;
use std::f32::consts::PI;

/// 三角网格：顶点列表 + 扁平三角形索引列表（每3个索引构成一个三角形）
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 检查索引数是3的倍数，且所有索引落在 `[0, vertex_count)` 之内
    ///
    /// 末尾不完整的三角形按缺失的第一个索引位置报告，与 `triangle` 一致。
    pub fn validate(&self) -> Result<(), RenderError> {
        let vertex_count = self.vertex_count();
        let len = self.indices.len();
        if len % 3 != 0 {
            return Err(RenderError::InvalidIndex {
                triangle: len / 3,
                index: len,
                vertex_count,
            });
        }
        for (i, &index) in self.indices.iter().enumerate() {
            if index as usize >= vertex_count {
                return Err(RenderError::InvalidIndex {
                    triangle: i / 3,
                    index: index as usize,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// 取出第 `triangle` 个三角形的三个顶点，索引越界时返回 `InvalidIndex`
    pub fn triangle(&self, triangle: usize) -> Result<[Vertex; 3], RenderError> {
        let base = triangle * 3;
        let vertex_count = self.vertex_count();
        let mut out = [Vertex::zeros(); 3];

        for (k, slot) in out.iter_mut().enumerate() {
            let index = self.indices.get(base + k).copied().ok_or(
                RenderError::InvalidIndex {
                    triangle,
                    index: base + k,
                    vertex_count,
                },
            )? as usize;
            *slot = *self.vertices.get(index).ok_or(RenderError::InvalidIndex {
                triangle,
                index,
                vertex_count,
            })?;
        }

        Ok(out)
    }
}

/// 生成以y轴为极轴的单位UV球体
///
/// `width` 为经度方向的顶点数，`height` 为纬度方向的环数（含两极）。
/// 顶点数为 `(height-2)*width + 2`，三角形数为 `(height-2)*(width-1)*2`。
/// `width < 2` 或 `height < 3` 时得到退化网格，不做校验。
pub fn generate_sphere(width: usize, height: usize) -> Mesh {
    let rings = height.saturating_sub(2);
    let segments = width.saturating_sub(1);

    let mut vertices = Vec::with_capacity(rings * width + 2);
    for j in 1..=rings {
        for i in 0..width {
            let theta = j as f32 / (height - 1) as f32 * PI;
            let phi = i as f32 / segments.max(1) as f32 * PI * 2.0;

            vertices.push(vertex(
                theta.sin() * phi.cos(),
                theta.cos(),
                -theta.sin() * phi.sin(),
            ));
        }
    }

    // 北极、南极
    vertices.push(vertex(0.0, 1.0, 0.0));
    vertices.push(vertex(0.0, -1.0, 0.0));

    let mut indices: Vec<u32> = Vec::with_capacity(rings * segments * 6);

    // 相邻纬度环之间的四边形，每个拆成两个三角形
    for j in 0..rings.saturating_sub(1) {
        for i in 0..segments {
            let (a, b) = (j * width, (j + 1) * width);
            indices.extend([a + i, b + i + 1, a + i + 1].map(|k| k as u32));
            indices.extend([a + i, b + i, b + i + 1].map(|k| k as u32));
        }
    }

    // 两极的扇形
    if rings > 0 {
        let north = rings * width;
        let south = north + 1;
        let last_ring = (rings - 1) * width;
        for i in 0..segments {
            indices.extend([north, i, i + 1].map(|k| k as u32));
            indices.extend([south, last_ring + i + 1, last_ring + i].map(|k| k as u32));
        }
    }

    debug!(
        "生成球体网格 {}x{}: {} 个顶点, {} 个三角形",
        width,
        height,
        vertices.len(),
        indices.len() / 3
    );

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn counts_match_resolution() {
        for (w, h) in [(3, 3), (4, 5), (32, 16), (7, 20)] {
            let mesh = generate_sphere(w, h);
            assert_eq!(mesh.vertex_count(), (h - 2) * w + 2, "{}x{}", w, h);
            assert_eq!(mesh.triangle_count(), (h - 2) * (w - 1) * 2, "{}x{}", w, h);
            assert_eq!(mesh.indices.len() % 3, 0);
            assert!(mesh.validate().is_ok());
        }
    }

    #[test]
    fn every_vertex_is_on_unit_sphere() {
        let mesh = generate_sphere(32, 16);
        for v in &mesh.vertices {
            let r2 = v.x * v.x + v.y * v.y + v.z * v.z;
            assert!((r2 - 1.0).abs() < EPS, "|v|^2 = {}", r2);
            assert_eq!(v.w, 1.0);
        }
    }

    #[test]
    fn poles_follow_interior_rings() {
        let mesh = generate_sphere(32, 16);
        let north = mesh.vertices[14 * 32];
        let south = mesh.vertices[14 * 32 + 1];
        assert_eq!((north.x, north.y, north.z), (0.0, 1.0, 0.0));
        assert_eq!((south.x, south.y, south.z), (0.0, -1.0, 0.0));
    }

    #[test]
    fn first_interior_vertex_uses_polar_y_axis() {
        let mesh = generate_sphere(4, 5);
        // j = 1, i = 0: theta = pi/4, phi = 0
        let v = mesh.vertices[0];
        let s = (PI / 4.0).sin();
        assert!((v.x - s).abs() < EPS);
        assert!((v.y - (PI / 4.0).cos()).abs() < EPS);
        assert!(v.z.abs() < EPS);
    }

    #[test]
    fn winding_order_is_preserved() {
        let w = 4;
        let h = 5;
        let mesh = generate_sphere(w, h);
        assert_eq!(&mesh.indices[0..6], &[0, 5, 1, 0, 4, 5]);

        let quads = (h - 3) * (w - 1) * 6;
        let north = ((h - 2) * w) as u32;
        let south = north + 1;
        let last_ring = ((h - 3) * w) as u32;
        assert_eq!(&mesh.indices[quads..quads + 3], &[north, 0, 1]);
        assert_eq!(
            &mesh.indices[quads + 3..quads + 6],
            &[south, last_ring + 1, last_ring]
        );
    }

    #[test]
    fn corrupted_index_is_reported() {
        let mut mesh = generate_sphere(4, 4);
        let count = mesh.vertex_count();
        mesh.indices[7] = count as u32;

        assert_eq!(
            mesh.validate(),
            Err(RenderError::InvalidIndex {
                triangle: 2,
                index: count,
                vertex_count: count,
            })
        );
        assert!(mesh.triangle(2).is_err());
        assert!(mesh.triangle(0).is_ok());
    }

    #[test]
    fn trailing_partial_triangle_is_reported() {
        let mesh = Mesh {
            vertices: vec![
                vertex(0.0, 0.0, 0.0),
                vertex(1.0, 0.0, 0.0),
                vertex(0.0, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2, 0],
        };
        let expected = RenderError::InvalidIndex {
            triangle: 1,
            index: 4,
            vertex_count: 3,
        };

        assert_eq!(mesh.validate(), Err(expected.clone()));
        assert_eq!(mesh.triangle(1), Err(expected));
        assert!(mesh.triangle(0).is_ok());
    }

    #[test]
    fn too_small_resolution_degenerates_quietly() {
        let mesh = generate_sphere(1, 2);
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.triangle_count(), 0);
    }
}
