pub mod error;
pub mod frame_buffer;
pub mod parallel_rasterizer;
pub mod rasterizer;
pub mod renderer;
