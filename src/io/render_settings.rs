use crate::core::error::RenderError;
use crate::core::frame_buffer::check_size;
use crate::geometry::transform::{CameraBasis, Frustum};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// 着色方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingMode {
    /// 纯白
    #[default]
    White,
    /// 每个三角形一个伪随机颜色
    FaceColor,
    /// 按模型空间位置给顶点上色并插值
    Barycentric,
}

/// 所有可通过TOML配置的渲染参数
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    // ===== 文件路径设置 =====
    /// 输出文件的基础名称
    pub output: String,
    /// 输出图像的目录
    pub output_dir: String,

    // ===== 渲染基础设置 =====
    /// 输出图像的宽度
    pub width: usize,
    /// 输出图像的高度
    pub height: usize,
    pub shading: ShadingMode,
    /// 启用多线程光栅化
    pub use_multithreading: bool,
    /// 同时保存深度图
    pub save_depth: bool,

    // ===== 球体网格分辨率 =====
    pub sphere_width: usize,
    pub sphere_height: usize,

    // ===== 物体变换 =====
    pub model_scale: Vector3<f32>,
    pub model_translate: Vector3<f32>,

    // ===== 相机与投影 =====
    pub camera: CameraBasis,
    pub frustum: Frustum,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            output: "sphere".to_string(),
            output_dir: "output".to_string(),
            width: 512,
            height: 512,
            shading: ShadingMode::default(),
            use_multithreading: false,
            save_depth: false,
            sphere_width: 32,
            sphere_height: 16,
            model_scale: Vector3::new(2.0, 2.0, 2.0),
            model_translate: Vector3::new(0.0, 0.0, -7.0),
            camera: CameraBasis::default(),
            frustum: Frustum::default(),
        }
    }
}

impl RenderSettings {
    /// 在分配任何缓冲区之前检查配置
    pub fn validate(&self) -> Result<(), RenderError> {
        check_size(self.width, self.height)?;
        if self.sphere_width < 3 || self.sphere_height < 3 {
            return Err(RenderError::InvalidConfiguration(format!(
                "球体分辨率至少为 3x3: {}x{}",
                self.sphere_width, self.sphere_height
            )));
        }
        // 顶点索引以 u32 存储
        let vertex_count = (self.sphere_height - 2)
            .checked_mul(self.sphere_width)
            .and_then(|n| n.checked_add(2));
        if vertex_count.is_none_or(|n| n > u32::MAX as usize) {
            return Err(RenderError::InvalidConfiguration(format!(
                "球体分辨率过大: {}x{}",
                self.sphere_width, self.sphere_height
            )));
        }
        let Frustum {
            left,
            right,
            top,
            bottom,
            near,
            far,
        } = self.frustum;
        if left == right || top == bottom || near == far {
            return Err(RenderError::InvalidConfiguration(format!(
                "视锥体裁剪面重合: {:?}",
                self.frustum
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_reference_scene() {
        let s = RenderSettings::default();
        assert_eq!((s.width, s.height), (512, 512));
        assert_eq!((s.sphere_width, s.sphere_height), (32, 16));
        assert_eq!(s.model_translate, Vector3::new(0.0, 0.0, -7.0));
        assert_eq!(s.shading, ShadingMode::White);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_bad_sizes() {
        let s = RenderSettings {
            height: 0,
            ..Default::default()
        };
        assert!(matches!(s.validate(), Err(RenderError::InvalidConfiguration(_))));

        let s = RenderSettings {
            sphere_width: 2,
            ..Default::default()
        };
        assert!(s.validate().is_err());

        let mut s = RenderSettings::default();
        s.frustum.near = s.frustum.far;
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_sizes_that_overflow() {
        let s = RenderSettings {
            width: usize::MAX,
            height: 2,
            ..Default::default()
        };
        assert!(matches!(s.validate(), Err(RenderError::InvalidConfiguration(_))));

        let s = RenderSettings {
            sphere_width: usize::MAX,
            sphere_height: 16,
            ..Default::default()
        };
        assert!(matches!(s.validate(), Err(RenderError::InvalidConfiguration(_))));

        let s = RenderSettings {
            sphere_width: 1 << 17,
            sphere_height: 1 << 16,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }
}
