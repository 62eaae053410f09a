use super::shading::PixelShader;
use super::triangle_data::{BoundingBox, EdgeSetup, ScreenTriangle};
use crate::core::frame_buffer::FrameBuffer;
use log::debug;

/// 一批三角形的光栅化统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub triangles: usize,
    pub degenerate: usize,
    pub pixels_written: usize,
}

/// 光栅化单个三角形，返回通过深度测试写入的像素数
///
/// 退化三角形（分母为0）返回 `None`，不写任何像素。
pub fn rasterize_triangle<S>(
    triangle: &ScreenTriangle,
    frame_buffer: &FrameBuffer,
    shader: &S,
) -> Option<usize>
where
    S: PixelShader + ?Sized,
{
    let setup = triangle.edge_setup()?;
    let Some(bbox) = BoundingBox::from_triangle(triangle, frame_buffer.width, frame_buffer.height)
    else {
        return Some(0);
    };

    let mut written = 0;
    bbox.for_each_pixel(|x, y| {
        let Some(pixel_index) = frame_buffer.pixel_index(x, y) else {
            return;
        };
        if process_pixel(triangle, &setup, x, y, pixel_index, frame_buffer, shader) {
            written += 1;
        }
    });
    Some(written)
}

/// 核心像素处理：覆盖测试 → 深度插值 → 深度测试 → 着色写入
#[inline]
fn process_pixel<S>(
    triangle: &ScreenTriangle,
    setup: &EdgeSetup,
    x: usize,
    y: usize,
    pixel_index: usize,
    frame_buffer: &FrameBuffer,
    shader: &S,
) -> bool
where
    S: PixelShader + ?Sized,
{
    let weights = setup.weights_at_pixel(x, y);
    if !EdgeSetup::is_inside(&weights) {
        return false;
    }

    let depth = setup.depth(&weights);
    frame_buffer.depth_test_and_write(pixel_index, depth, || shader.shade(&weights, triangle))
}

/// 按提交顺序依次光栅化所有三角形
pub fn rasterize<S>(
    triangles: &[ScreenTriangle],
    frame_buffer: &FrameBuffer,
    shader: &S,
) -> RasterStats
where
    S: PixelShader + ?Sized,
{
    let mut stats = RasterStats {
        triangles: triangles.len(),
        ..Default::default()
    };

    for triangle in triangles {
        match rasterize_triangle(triangle, frame_buffer, shader) {
            Some(written) => stats.pixels_written += written,
            None => stats.degenerate += 1,
        }
    }

    debug!(
        "顺序光栅化完成: {} 个三角形, 跳过 {} 个退化三角形, 写入 {} 个像素",
        stats.triangles, stats.degenerate, stats.pixels_written
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rasterizer::shading::{BarycentricShader, ConstantShader};
    use crate::geometry::transform::vertex;
    use crate::utils::color::{Color, WHITE};
    use nalgebra::Vector3;

    fn snapshot(fb: &FrameBuffer) -> (Vec<f32>, Vec<f32>) {
        (fb.get_depth_buffer_f32(), fb.present())
    }

    fn flat(index: usize, z: f32) -> ScreenTriangle {
        ScreenTriangle::new(
            index,
            [vertex(1.0, 1.0, z), vertex(14.0, 2.0, z), vertex(6.0, 13.0, z)],
        )
    }

    #[test]
    fn degenerate_triangle_writes_nothing() {
        let fb = FrameBuffer::new(16, 16).unwrap();
        let before = snapshot(&fb);

        let t = ScreenTriangle::new(
            0,
            [vertex(3.0, 3.0, 0.1), vertex(3.0, 3.0, 0.1), vertex(10.0, 12.0, 0.1)],
        );
        assert_eq!(rasterize_triangle(&t, &fb, &ConstantShader::default()), None);

        let stats = rasterize(&[t], &fb, &ConstantShader::default());
        assert_eq!(stats.degenerate, 1);
        assert_eq!(stats.pixels_written, 0);
        assert_eq!(snapshot(&fb), before);
    }

    #[test]
    fn offscreen_triangle_is_not_counted_as_degenerate() {
        let fb = FrameBuffer::new(8, 8).unwrap();
        let away = ScreenTriangle::new(
            0,
            [vertex(20.0, 20.0, 0.1), vertex(30.0, 20.0, 0.1), vertex(20.0, 30.0, 0.1)],
        );
        assert_eq!(rasterize_triangle(&away, &fb, &ConstantShader::default()), Some(0));

        let stats = rasterize(&[away], &fb, &ConstantShader::default());
        assert_eq!(stats.degenerate, 0);
        assert_eq!(stats.pixels_written, 0);
    }

    #[test]
    fn covered_pixels_get_color_and_depth() {
        let fb = FrameBuffer::new(16, 16).unwrap();
        let written = rasterize_triangle(&flat(0, 0.5), &fb, &ConstantShader::default()).unwrap();
        assert!(written > 0);

        assert_eq!(fb.color_at(6, 5), Some(WHITE));
        assert!((fb.depth_at(6, 5).unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(fb.color_at(15, 15), Some(Color::zeros()));
        assert_eq!(fb.depth_at(15, 15), Some(f32::INFINITY));

        let lit = fb.present().chunks_exact(3).filter(|c| c[0] == 1.0).count();
        assert_eq!(lit, written);
    }

    #[test]
    fn overlapping_triangles_are_order_independent() {
        let near = flat(0, 0.2);
        let far = ScreenTriangle::new(
            1,
            [vertex(0.0, 0.0, 0.7), vertex(15.0, 0.0, 0.7), vertex(8.0, 15.0, 0.7)],
        );
        let red = |_: &Vector3<f32>, t: &ScreenTriangle| {
            if t.index == 0 {
                Color::new(1.0, 0.0, 0.0)
            } else {
                Color::new(0.0, 0.0, 1.0)
            }
        };

        let a = FrameBuffer::new(16, 16).unwrap();
        rasterize(&[near.clone(), far.clone()], &a, &red);
        let b = FrameBuffer::new(16, 16).unwrap();
        rasterize(&[far, near], &b, &red);

        assert_eq!(snapshot(&a), snapshot(&b));
        assert!((a.depth_at(6, 5).unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(a.color_at(6, 5), Some(Color::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn equal_depth_keeps_first_writer() {
        let fb = FrameBuffer::new(16, 16).unwrap();
        let first = flat(0, 0.3).with_colors([Color::new(0.0, 1.0, 0.0); 3]);
        let second = flat(1, 0.3);
        rasterize(&[first, second], &fb, &BarycentricShader);
        let c = fb.color_at(6, 5).unwrap();
        assert!((c - Color::new(0.0, 1.0, 0.0)).norm() < 1e-6, "{:?}", c);
    }

    #[test]
    fn never_writes_outside_the_screen() {
        let fb = FrameBuffer::new(8, 8).unwrap();
        let huge = ScreenTriangle::new(
            0,
            [vertex(-50.0, -50.0, 0.0), vertex(80.0, -50.0, 0.0), vertex(-50.0, 80.0, 0.0)],
        );
        assert_eq!(rasterize_triangle(&huge, &fb, &ConstantShader::default()), Some(64));
    }
}
