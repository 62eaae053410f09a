use crate::core::error::RenderError;
use crate::core::frame_buffer::FrameBuffer;
use crate::core::parallel_rasterizer::ParallelRasterizer;
use crate::core::rasterizer::{
    BarycentricShader, ConstantShader, FaceColorShader, PixelShader, RasterStats,
    ScreenTriangle, rasterize,
};
use crate::geometry::sphere::{Mesh, generate_sphere};
use crate::geometry::transform::TransformPipeline;
use crate::io::render_settings::{RenderSettings, ShadingMode};
use log::info;
use rayon::prelude::*;
use std::time::Instant;

/// 根据设置构建固定变换管线
pub fn build_pipeline(settings: &RenderSettings) -> TransformPipeline {
    TransformPipeline::new(
        &settings.model_scale,
        &settings.model_translate,
        &settings.camera,
        &settings.frustum,
        settings.width,
        settings.height,
    )
}

/// 把网格的每个三角形变换到屏幕空间
///
/// 先整体校验索引，任何越界索引或不完整的三角形都会让整帧失败。
/// 逐顶点颜色取自模型空间位置，映射到 [0, 1]。
pub fn prepare_triangles(
    mesh: &Mesh,
    pipeline: &TransformPipeline,
) -> Result<Vec<ScreenTriangle>, RenderError> {
    mesh.validate()?;

    (0..mesh.triangle_count())
        .into_par_iter()
        .map(|index| -> Result<ScreenTriangle, RenderError> {
            let model = mesh.triangle(index)?;
            let screen = model.map(|v| pipeline.to_screen(&v));
            let colors = model.map(|v| v.xyz().map(|c| c * 0.5 + 0.5));
            Ok(ScreenTriangle::new(index, screen).with_colors(colors))
        })
        .collect()
}

/// 渲染器：持有帧缓冲区，并缓存按分辨率生成的球体网格
pub struct Renderer {
    pub frame_buffer: FrameBuffer,
    mesh_cache: Option<((usize, usize), Mesh)>,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        Ok(Self {
            frame_buffer: FrameBuffer::new(width, height)?,
            mesh_cache: None,
        })
    }

    /// 网格生成是确定性的，分辨率不变时直接复用
    fn cached_mesh(
        cache: &mut Option<((usize, usize), Mesh)>,
        width: usize,
        height: usize,
    ) -> &Mesh {
        if cache
            .as_ref()
            .is_some_and(|(key, _)| *key != (width, height))
        {
            *cache = None;
        }
        let (_, mesh) = cache.get_or_insert_with(|| {
            let mesh = generate_sphere(width, height);
            info!(
                "生成球体网格: {} 个顶点, {} 个三角形",
                mesh.vertex_count(),
                mesh.triangle_count()
            );
            ((width, height), mesh)
        });
        mesh
    }

    /// 按设置中的着色方式渲染一帧
    pub fn render(&mut self, settings: &RenderSettings) -> Result<RasterStats, RenderError> {
        match settings.shading {
            ShadingMode::White => self.render_with_shader(settings, &ConstantShader::default()),
            ShadingMode::FaceColor => self.render_with_shader(settings, &FaceColorShader),
            ShadingMode::Barycentric => self.render_with_shader(settings, &BarycentricShader),
        }
    }

    /// 完整的一帧：校验 → 重置/调整缓冲区 → 网格 → 变换 → 光栅化
    pub fn render_with_shader<S>(
        &mut self,
        settings: &RenderSettings,
        shader: &S,
    ) -> Result<RasterStats, RenderError>
    where
        S: PixelShader + ?Sized,
    {
        settings.validate()?;
        let frame_start = Instant::now();

        self.frame_buffer.resize(settings.width, settings.height)?;

        let mesh = Self::cached_mesh(
            &mut self.mesh_cache,
            settings.sphere_width,
            settings.sphere_height,
        );

        let transform_start = Instant::now();
        let pipeline = build_pipeline(settings);
        let triangles = prepare_triangles(mesh, &pipeline)?;
        let transform_time = transform_start.elapsed();

        let raster_start = Instant::now();
        let stats = if settings.use_multithreading {
            ParallelRasterizer::rasterize_triangles(&triangles, &self.frame_buffer, shader)
        } else {
            rasterize(&triangles, &self.frame_buffer, shader)
        };
        let raster_time = raster_start.elapsed();

        info!(
            "渲染完成 {}x{}: 变换 {:?}, 光栅化 {:?}, 总计 {:?} ({} 个三角形, {} 个像素写入)",
            settings.width,
            settings.height,
            transform_time,
            raster_time,
            frame_start.elapsed(),
            stats.triangles,
            stats.pixels_written
        );

        Ok(stats)
    }
}

/// 单帧渲染入口：从设置得到一帧完成的帧缓冲区，颜色平面由 `present` 取出
pub fn render_scene(settings: &RenderSettings) -> Result<FrameBuffer, RenderError> {
    settings.validate()?;
    let mut renderer = Renderer::new(settings.width, settings.height)?;
    renderer.render(settings)?;
    Ok(renderer.frame_buffer)
}
