use crate::core::error::RenderError;
use crate::geometry::transform::{CameraBasis, Frustum};
use crate::io::render_settings::{RenderSettings, ShadingMode};
use log::info;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML配置文件的整体结构，每个字段对应一个 `[section]`
///
/// 缺省的section或键回退到 `RenderSettings::default()` 的值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    files: FilesSection,
    render: RenderSection,
    sphere: SphereSection,
    model: ModelSection,
    camera: CameraBasis,
    frustum: Frustum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct FilesSection {
    output: String,
    output_dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct RenderSection {
    width: usize,
    height: usize,
    shading: ShadingMode,
    use_multithreading: bool,
    save_depth: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SphereSection {
    width: usize,
    height: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ModelSection {
    scale: Vector3<f32>,
    translate: Vector3<f32>,
}

impl From<&RenderSettings> for ConfigFile {
    fn from(s: &RenderSettings) -> Self {
        Self {
            files: FilesSection {
                output: s.output.clone(),
                output_dir: s.output_dir.clone(),
            },
            render: RenderSection {
                width: s.width,
                height: s.height,
                shading: s.shading,
                use_multithreading: s.use_multithreading,
                save_depth: s.save_depth,
            },
            sphere: SphereSection {
                width: s.sphere_width,
                height: s.sphere_height,
            },
            model: ModelSection {
                scale: s.model_scale,
                translate: s.model_translate,
            },
            camera: s.camera,
            frustum: s.frustum,
        }
    }
}

impl From<ConfigFile> for RenderSettings {
    fn from(c: ConfigFile) -> Self {
        Self {
            output: c.files.output,
            output_dir: c.files.output_dir,
            width: c.render.width,
            height: c.render.height,
            shading: c.render.shading,
            use_multithreading: c.render.use_multithreading,
            save_depth: c.render.save_depth,
            sphere_width: c.sphere.width,
            sphere_height: c.sphere.height,
            model_scale: c.model.scale,
            model_translate: c.model.translate,
            camera: c.camera,
            frustum: c.frustum,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::from(&RenderSettings::default())
    }
}

impl Default for FilesSection {
    fn default() -> Self {
        ConfigFile::default().files
    }
}

impl Default for RenderSection {
    fn default() -> Self {
        ConfigFile::default().render
    }
}

impl Default for SphereSection {
    fn default() -> Self {
        ConfigFile::default().sphere
    }
}

impl Default for ModelSection {
    fn default() -> Self {
        ConfigFile::default().model
    }
}

/// TOML配置管理器 - 统一处理所有配置的读写
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    /// 从TOML文件加载完整配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<RenderSettings, RenderError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Io(format!("读取配置文件 {} 失败: {}", path.display(), e)))?;

        info!("加载配置文件: {}", path.display());
        Self::load_from_content(&content)
    }

    /// 从TOML内容字符串加载配置并校验
    pub fn load_from_content(content: &str) -> Result<RenderSettings, RenderError> {
        let config: ConfigFile = toml::from_str(content)
            .map_err(|e| RenderError::InvalidConfiguration(format!("解析TOML失败: {}", e)))?;

        let settings = RenderSettings::from(config);
        settings.validate()?;
        Ok(settings)
    }

    pub fn settings_to_toml(settings: &RenderSettings) -> Result<String, RenderError> {
        let body = toml::to_string_pretty(&ConfigFile::from(settings))
            .map_err(|e| RenderError::InvalidConfiguration(format!("序列化TOML失败: {}", e)))?;
        Ok(format!("# 球体光栅化器配置文件\n\n{}", body))
    }

    /// 保存配置到TOML文件
    pub fn save_to_file<P: AsRef<Path>>(
        settings: &RenderSettings,
        path: P,
    ) -> Result<(), RenderError> {
        let content = Self::settings_to_toml(settings)?;
        std::fs::write(path.as_ref(), content).map_err(|e| {
            RenderError::Io(format!("写入配置文件 {} 失败: {}", path.as_ref().display(), e))
        })
    }

    /// 以默认设置生成示例配置文件
    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<(), RenderError> {
        Self::save_to_file(&RenderSettings::default(), path)
    }
}
