//! # 三角形光栅化模块
//!
//! 包围盒扫描 + 重心坐标覆盖测试 + 逐像素深度测试，着色函数可插拔

pub mod pixel_processor;
pub mod shading;
pub mod triangle_data;

// 重新导出主要类型和函数
pub use pixel_processor::{RasterStats, rasterize};
pub use shading::{BarycentricShader, ConstantShader, FaceColorShader, PixelShader};
pub use triangle_data::{BoundingBox, EdgeSetup, ScreenTriangle};
