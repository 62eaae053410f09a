use crate::io::config_loader::TomlConfigLoader;
use crate::io::render_settings::RenderSettings;
use clap::Parser;
use log::info;

/// 极简CLI - 配置文件为主，少量参数覆盖
#[derive(Parser, Debug)]
#[command(name = "sphere_rasterizer")]
#[command(about = "TOML驱动的UV球体软件光栅化器")]
pub struct SimpleCli {
    /// 配置文件路径（TOML格式）
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// 生成示例配置文件并以其渲染
    #[arg(long)]
    pub use_example_config: bool,

    /// 覆盖输出图像宽度
    #[arg(long)]
    pub width: Option<usize>,

    /// 覆盖输出图像高度
    #[arg(long)]
    pub height: Option<usize>,

    /// 使用多线程光栅化
    #[arg(long)]
    pub parallel: bool,

    /// 覆盖输出目录
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<String>,
}

impl SimpleCli {
    /// 处理CLI参数并返回最终的RenderSettings
    pub fn process() -> Result<RenderSettings, String> {
        Self::parse().into_settings()
    }

    fn into_settings(self) -> Result<RenderSettings, String> {
        let mut settings = if self.use_example_config {
            let temp_config_path = "example_config.toml";
            TomlConfigLoader::create_example_config(temp_config_path)
                .map_err(|e| format!("创建示例配置失败: {}", e))?;
            info!("已创建示例配置: {}", temp_config_path);

            TomlConfigLoader::load_from_file(temp_config_path)
                .map_err(|e| format!("加载示例配置失败: {}", e))?
        } else if let Some(config_path) = &self.config {
            TomlConfigLoader::load_from_file(config_path)
                .map_err(|e| format!("配置文件加载失败: {}", e))?
        } else {
            info!("使用默认设置");
            RenderSettings::default()
        };

        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if self.parallel {
            settings.use_multithreading = true;
        }
        if let Some(output_dir) = self.output_dir {
            settings.output_dir = output_dir;
        }

        settings.validate().map_err(|e| e.to_string())?;
        Ok(settings)
    }
}
