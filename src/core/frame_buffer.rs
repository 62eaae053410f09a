use crate::core::error::RenderError;
use crate::utils::color::{Color, rgb_to_u8};
use atomic_float::AtomicF32;
use rayon::prelude::*;
use std::sync::atomic::Ordering;

/// 帧缓冲区实现，存储一帧的渲染结果
///
/// 像素按 `y * width + x` 行优先存放，颜色平面再乘3加通道号。
/// 使用原子类型以支持并行光栅化器通过共享引用写入。
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    /// 深度平面，数值越小越"近"，初始为 +inf
    pub depth_buffer: Vec<AtomicF32>,
    /// 颜色平面，RGB浮点值 [0, 1]，初始为黑色
    pub color_buffer: Vec<AtomicF32>,
}

/// 检查尺寸为正，且像素数和颜色分量数不会溢出，返回像素数
pub fn check_size(width: usize, height: usize) -> Result<usize, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidConfiguration(format!(
            "帧缓冲区尺寸必须为正: {}x{}",
            width, height
        )));
    }
    width
        .checked_mul(height)
        .filter(|pixels| pixels.checked_mul(3).is_some())
        .ok_or_else(|| {
            RenderError::InvalidConfiguration(format!("帧缓冲区尺寸过大: {}x{}", width, height))
        })
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        let num_pixels = check_size(width, height)?;

        let depth_buffer = (0..num_pixels)
            .map(|_| AtomicF32::new(f32::INFINITY))
            .collect();
        let color_buffer = (0..num_pixels * 3).map(|_| AtomicF32::new(0.0)).collect();

        Ok(FrameBuffer {
            width,
            height,
            depth_buffer,
            color_buffer,
        })
    }

    /// 深度填充 +inf，颜色填充 0
    pub fn reset(&self) {
        self.depth_buffer.par_iter().for_each(|atomic_depth| {
            atomic_depth.store(f32::INFINITY, Ordering::Relaxed);
        });

        self.color_buffer
            .par_iter()
            .for_each(|atomic_color| atomic_color.store(0.0, Ordering::Relaxed));
    }

    /// 调整尺寸并重置；尺寸未变时只重置
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), RenderError> {
        check_size(width, height)?;
        if width != self.width || height != self.height {
            *self = Self::new(width, height)?;
        } else {
            self.reset();
        }
        Ok(())
    }

    #[inline]
    pub fn pixel_index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// 无条件写入一个像素的深度和颜色
    #[inline]
    pub fn write_pixel(&self, pixel_index: usize, depth: f32, color: &Color) {
        self.depth_buffer[pixel_index].store(depth, Ordering::Relaxed);
        let base = pixel_index * 3;
        self.color_buffer[base].store(color.x, Ordering::Relaxed);
        self.color_buffer[base + 1].store(color.y, Ordering::Relaxed);
        self.color_buffer[base + 2].store(color.z, Ordering::Relaxed);
    }

    /// 深度测试：`depth` 严格小于已存深度时写入深度和颜色
    ///
    /// 读-比较-写不是原子的，只用于单线程顺序光栅化。
    /// `shade` 只在测试通过时才会被调用。
    #[inline]
    pub fn depth_test_and_write<F>(&self, pixel_index: usize, depth: f32, shade: F) -> bool
    where
        F: FnOnce() -> Color,
    {
        if depth < self.depth_buffer[pixel_index].load(Ordering::Relaxed) {
            self.write_pixel(pixel_index, depth, &shade());
            true
        } else {
            false
        }
    }

    /// 输出颜色平面：按 `(y, x, 通道)` 行优先排列的浮点序列
    pub fn present(&self) -> Vec<f32> {
        self.color_buffer
            .iter()
            .map(|atomic_color| atomic_color.load(Ordering::Relaxed))
            .collect()
    }

    /// 获取颜色缓冲区的字节数据
    pub fn get_color_buffer_bytes(&self) -> Vec<u8> {
        self.present()
            .chunks_exact(3)
            .flat_map(|rgb| rgb_to_u8(&Color::new(rgb[0], rgb[1], rgb[2])))
            .collect()
    }

    /// 获取深度缓冲区的浮点数据
    pub fn get_depth_buffer_f32(&self) -> Vec<f32> {
        self.depth_buffer
            .iter()
            .map(|atomic_depth| atomic_depth.load(Ordering::Relaxed))
            .collect()
    }
}

#[cfg(test)]
impl FrameBuffer {
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.pixel_index(x, y)
            .map(|i| self.depth_buffer[i].load(Ordering::Relaxed))
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Color> {
        self.pixel_index(x, y).map(|i| {
            let base = i * 3;
            Color::new(
                self.color_buffer[base].load(Ordering::Relaxed),
                self.color_buffer[base + 1].load(Ordering::Relaxed),
                self.color_buffer[base + 2].load(Ordering::Relaxed),
            )
        })
    }
}
