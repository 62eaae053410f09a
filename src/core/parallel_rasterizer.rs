use crate::core::frame_buffer::FrameBuffer;
use crate::core::rasterizer::{
    BoundingBox, EdgeSetup, PixelShader, RasterStats, ScreenTriangle, rasterize,
};
use log::{debug, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// 尚未被任何三角形占据的像素
const EMPTY: u64 = u64::MAX;

/// 把深度和三角形槽位打包成可直接按整数比较的键
///
/// 高32位是保序的深度位模式，低32位是槽位。`fetch_min` 先比深度，
/// 深度相同时较早提交的三角形胜出，与顺序光栅化"严格小于才覆盖"的结果一致。
#[inline]
fn depth_key(depth: f32, slot: u32) -> u64 {
    // -0.0 与 0.0 在深度测试中相等
    let depth = if depth == 0.0 { 0.0 } else { depth };
    let bits = depth.to_bits();
    let ordered = if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    };
    ((ordered as u64) << 32) | slot as u64
}

#[inline]
fn key_slot(key: u64) -> usize {
    (key & 0xffff_ffff) as usize
}

/// 并行光栅化器
///
/// 第一遍：各三角形并行地对覆盖像素做原子最小值竞争（深度+槽位）。
/// 第二遍：逐行并行，为每个像素的胜出三角形着色并写回帧缓冲。
/// 结果与按提交顺序执行的顺序光栅化完全相同，与线程调度无关。
pub struct ParallelRasterizer;

impl ParallelRasterizer {
    pub fn rasterize_triangles<S>(
        triangles: &[ScreenTriangle],
        frame_buffer: &FrameBuffer,
        shader: &S,
    ) -> RasterStats
    where
        S: PixelShader + ?Sized,
    {
        if triangles.is_empty() {
            return RasterStats::default();
        }
        if triangles.len() > u32::MAX as usize {
            warn!("三角形数量 {} 超出并行光栅化上限，改用顺序光栅化", triangles.len());
            return rasterize(triangles, frame_buffer, shader);
        }

        let width = frame_buffer.width;
        let height = frame_buffer.height;

        let setups: Vec<Option<EdgeSetup>> =
            triangles.par_iter().map(|t| t.edge_setup()).collect();
        let degenerate = setups.iter().filter(|s| s.is_none()).count();

        let keys: Vec<AtomicU64> = (0..width * height)
            .map(|_| AtomicU64::new(EMPTY))
            .collect();

        let strategy = Self::choose_strategy(triangles, width, height);
        debug!("并行光栅化策略: {:?}", strategy);

        triangles
            .par_iter()
            .zip(setups.par_iter())
            .enumerate()
            .for_each(|(slot, (triangle, setup))| {
                let (Some(setup), Some(bbox)) =
                    (setup, BoundingBox::from_triangle(triangle, width, height))
                else {
                    return;
                };
                match strategy {
                    RenderStrategy::LargeTrianglePixelParallel => {
                        (bbox.min_y..=bbox.max_y).into_par_iter().for_each(|y| {
                            Self::claim_row(setup, slot as u32, y, &bbox, width, &keys);
                        });
                    }
                    RenderStrategy::SmallTriangleParallel => {
                        for y in bbox.min_y..=bbox.max_y {
                            Self::claim_row(setup, slot as u32, y, &bbox, width, &keys);
                        }
                    }
                }
            });

        let pixels_written: usize = (0..height)
            .into_par_iter()
            .map(|y| {
                let mut written = 0;
                for x in 0..width {
                    let pixel_index = y * width + x;
                    let key = keys[pixel_index].load(Ordering::Relaxed);
                    if key == EMPTY {
                        continue;
                    }
                    let slot = key_slot(key);
                    let Some(setup) = &setups[slot] else {
                        continue;
                    };
                    let triangle = &triangles[slot];
                    let weights = setup.weights_at_pixel(x, y);
                    let depth = setup.depth(&weights);
                    if frame_buffer.depth_test_and_write(pixel_index, depth, || {
                        shader.shade(&weights, triangle)
                    }) {
                        written += 1;
                    }
                }
                written
            })
            .sum();

        let stats = RasterStats {
            triangles: triangles.len(),
            degenerate,
            pixels_written,
        };
        debug!(
            "并行光栅化完成: {} 个三角形, 跳过 {} 个退化三角形, 写入 {} 个像素",
            stats.triangles, stats.degenerate, stats.pixels_written
        );
        stats
    }

    /// 一行内的覆盖测试与深度竞争
    #[inline]
    fn claim_row(
        setup: &EdgeSetup,
        slot: u32,
        y: usize,
        bbox: &BoundingBox,
        width: usize,
        keys: &[AtomicU64],
    ) {
        for x in bbox.min_x..=bbox.max_x {
            let weights = setup.weights_at_pixel(x, y);
            if !EdgeSetup::is_inside(&weights) {
                continue;
            }
            let depth = setup.depth(&weights);
            // NaN 和 +inf 永远无法通过深度测试
            if !(depth < f32::INFINITY) {
                continue;
            }
            keys[y * width + x].fetch_min(depth_key(depth, slot), Ordering::Relaxed);
        }
    }

    /// 根据前若干个三角形的平均面积选择并行粒度
    fn choose_strategy(
        triangles: &[ScreenTriangle],
        width: usize,
        height: usize,
    ) -> RenderStrategy {
        let screen_area = (width * height) as f32;
        let sample = triangles.len().min(50);
        let avg_triangle_size = triangles
            .iter()
            .take(sample)
            .map(|t| t.barycentric_denominator().abs() * 0.5)
            .sum::<f32>()
            / sample as f32;

        if avg_triangle_size > 500.0 || avg_triangle_size > screen_area * 0.05 {
            RenderStrategy::LargeTrianglePixelParallel
        } else {
            RenderStrategy::SmallTriangleParallel
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RenderStrategy {
    LargeTrianglePixelParallel,
    SmallTriangleParallel,
}
