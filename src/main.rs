use log::info;
use std::time::Instant;

mod core;
mod geometry;
mod io;
mod utils;

use crate::core::renderer::render_scene;
use io::simple_cli::SimpleCli;
use utils::save_utils::save_render_result;

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start_time = Instant::now();
    let settings = SimpleCli::process()?;

    info!(
        "渲染 {}x{} 球体网格 (缩放 {:?}, 平移 {:?}) 到 {}x{} 图像",
        settings.sphere_width,
        settings.sphere_height,
        settings.model_scale.as_slice(),
        settings.model_translate.as_slice(),
        settings.width,
        settings.height
    );

    let frame_buffer = render_scene(&settings).map_err(|e| e.to_string())?;
    save_render_result(&frame_buffer, &settings).map_err(|e| e.to_string())?;

    info!("总执行时间: {:?}", start_time.elapsed());
    Ok(())
}
