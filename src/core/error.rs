use std::fmt;

/// 渲染核心可能产生的错误
///
/// 退化三角形与 `w == 0` 的投影结果不属于错误，会被静默处理。
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// 网格索引越界：调用方提供了格式错误的索引数据
    InvalidIndex {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },
    /// 非法配置（尺寸为零、球体分辨率过小等），在分配缓冲区之前报告
    InvalidConfiguration(String),
    /// 外壳层的输入输出错误（配置文件、图像保存）
    Io(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidIndex {
                triangle,
                index,
                vertex_count,
            } => write!(
                f,
                "三角形 {} 引用了无效的顶点索引 {} (顶点数量: {})",
                triangle, index, vertex_count
            ),
            RenderError::InvalidConfiguration(msg) => write!(f, "无效配置: {}", msg),
            RenderError::Io(msg) => write!(f, "IO错误: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        RenderError::Io(e.to_string())
    }
}
