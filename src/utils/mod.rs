// utils/mod.rs
// 导出颜色与输出相关工具函数
pub mod color;
pub mod save_utils;
