use crate::core::error::RenderError;
use crate::core::frame_buffer::FrameBuffer;
use crate::io::render_settings::RenderSettings;
use crate::utils::color::apply_colormap_jet;
use image::ColorType;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// 保存RGB图像数据到PNG文件
pub fn save_image(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), RenderError> {
    image::save_buffer(path, data, width, height, ColorType::Rgb8)
        .map_err(|e| RenderError::Io(format!("保存图像到 {} 时出错: {}", path.display(), e)))?;
    info!("图像已保存到 {}", path.display());
    Ok(())
}

/// 上下翻转RGB行：缓冲区第0行是画面底部，而图像文件第0行是顶部
pub fn flip_rows(data: &[u8], width: usize) -> Vec<u8> {
    let row_len = width * 3;
    if row_len == 0 {
        return Vec::new();
    }
    data.chunks_exact(row_len).rev().flatten().copied().collect()
}

/// 将深度缓冲数据归一化到指定的百分位数范围，非有限值映射为1.0（远处）
///
/// # 参数
/// * `depth_buffer` - 深度数据
/// * `min_percentile` - 最小百分位（例如 1.0 表示第1百分位）
/// * `max_percentile` - 最大百分位（例如 99.0 表示第99百分位）
pub fn normalize_depth(depth_buffer: &[f32], min_percentile: f32, max_percentile: f32) -> Vec<f32> {
    let mut finite_depths: Vec<f32> = depth_buffer
        .iter()
        .filter(|d| d.is_finite())
        .copied()
        .collect();

    let (min_clip, max_clip) = if finite_depths.is_empty() {
        warn!("深度缓冲中没有有限深度值");
        (0.0, 1.0)
    } else {
        finite_depths.sort_unstable_by(f32::total_cmp);
        let last = finite_depths.len() - 1;
        let at = |percentile: f32| {
            let idx = (percentile / 100.0 * last as f32).round() as usize;
            finite_depths[idx.min(last)]
        };

        let (lo, hi) = (at(min_percentile), at(max_percentile));
        if (hi - lo).abs() < 1e-6 {
            let (first, last) = (finite_depths[0], finite_depths[last]);
            if (last - first).abs() < 1e-6 {
                (first, first + 1.0)
            } else {
                (first, last)
            }
        } else {
            (lo, hi)
        }
    };

    let inv_range = 1.0 / (max_clip - min_clip);
    depth_buffer
        .iter()
        .map(|&depth| {
            if depth.is_finite() {
                ((depth.clamp(min_clip, max_clip) - min_clip) * inv_range).clamp(0.0, 1.0)
            } else {
                1.0
            }
        })
        .collect()
}

fn output_path(settings: &RenderSettings, suffix: &str) -> PathBuf {
    Path::new(&settings.output_dir).join(format!("{}_{}.png", settings.output, suffix))
}

/// 保存渲染结果（彩色图像和可选的深度图）
pub fn save_render_result(
    frame_buffer: &FrameBuffer,
    settings: &RenderSettings,
) -> Result<(), RenderError> {
    std::fs::create_dir_all(&settings.output_dir)?;

    let width = frame_buffer.width;
    let height = frame_buffer.height;

    let color = flip_rows(&frame_buffer.get_color_buffer_bytes(), width);
    save_image(
        &output_path(settings, "color"),
        &color,
        width as u32,
        height as u32,
    )?;

    if settings.save_depth {
        let depth = frame_buffer.get_depth_buffer_f32();
        let normalized: Vec<f32> = normalize_depth(&depth, 1.0, 99.0)
            .into_iter()
            .map(|d| 1.0 - d)
            .collect();
        let depth_rgb = flip_rows(&apply_colormap_jet(&normalized), width);
        save_image(
            &output_path(settings, "depth"),
            &depth_rgb,
            width as u32,
            height as u32,
        )?;
    }

    Ok(())
}
