// geometry/mod.rs
// 导出网格生成和变换相关模块
pub mod sphere;
pub mod transform;
