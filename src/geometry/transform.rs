use nalgebra::{Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// 齐次坐标顶点 `(x, y, z, w)`
pub type Vertex = Vector4<f32>;

/// 创建 `w = 1` 的顶点
pub fn vertex(x: f32, y: f32, z: f32) -> Vertex {
    Vertex::new(x, y, z, 1.0)
}

/// 相机的正交基与视点位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraBasis {
    pub u: Vector3<f32>,
    pub v: Vector3<f32>,
    pub w: Vector3<f32>,
    pub eye: Vector3<f32>,
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self {
            u: Vector3::x(),
            v: Vector3::y(),
            w: Vector3::z(),
            eye: Vector3::zeros(),
        }
    }
}

/// 视锥体裁剪面参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Frustum {
    fn default() -> Self {
        Self {
            left: -0.1,
            right: 0.1,
            top: 0.1,
            bottom: -0.1,
            near: -0.1,
            far: -1000.0,
        }
    }
}

/// 变换矩阵工厂，提供创建各阶段变换矩阵的静态方法
pub struct TransformFactory;

impl TransformFactory {
    /// 建模矩阵：先缩放后平移，平移位于最后一列
    pub fn modeling(scale: &Vector3<f32>, translate: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0, 0.0, translate.x, //
            0.0, scale.y, 0.0, translate.y, //
            0.0, 0.0, scale.z, translate.z, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 相机矩阵：基向量按列摆放，视点位于最后一列
    ///
    /// 行依次为 `[u.x, v.x, w.x, e.x]`、`[u.y, v.y, w.y, e.y]`、`[u.z, v.z, w.z, e.z]`。
    /// 这与常见的"转置基 + 负视点"形式不同，在单位基下两者一致，这里保持原样。
    pub fn camera(basis: &CameraBasis) -> Matrix4<f32> {
        let CameraBasis { u, v, w, eye } = basis;
        Matrix4::new(
            u.x, v.x, w.x, eye.x, //
            u.y, v.y, w.y, eye.y, //
            u.z, v.z, w.z, eye.z, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// OpenGL风格的透视投影矩阵
    pub fn projection(frustum: &Frustum) -> Matrix4<f32> {
        let Frustum {
            left: l,
            right: r,
            top: t,
            bottom: b,
            near: n,
            far: f,
        } = *frustum;
        Matrix4::new(
            2.0 * n / (r - l), 0.0, (l + r) / (l - r), 0.0, //
            0.0, 2.0 * n / (t - b), (b + t) / (b - t), 0.0, //
            0.0, 0.0, (f + n) / (n - f), (2.0 * f * n) / (f - n), //
            0.0, 0.0, 1.0, 0.0,
        )
    }
}

/// 透视除法；`w == 0` 时原样返回
pub fn perspective_divide(v: Vertex) -> Vertex {
    if v.w != 0.0 {
        Vertex::new(v.x / v.w, v.y / v.w, v.z / v.w, 1.0)
    } else {
        v
    }
}

pub fn modeling_transform(v: &Vertex, scale: &Vector3<f32>, translate: &Vector3<f32>) -> Vertex {
    TransformFactory::modeling(scale, translate) * v
}

pub fn camera_transform(v: &Vertex, basis: &CameraBasis) -> Vertex {
    TransformFactory::camera(basis) * v
}

/// 投影并执行透视除法
pub fn projection_transform(v: &Vertex, frustum: &Frustum) -> Vertex {
    perspective_divide(TransformFactory::projection(frustum) * v)
}

/// NDC `[-1, 1]` 映射到像素坐标 `[0, width] x [0, height]`，z 保持不变
pub fn viewport_transform(v: &Vertex, width: f32, height: f32) -> Vertex {
    Vertex::new(
        (v.x + 1.0) * width * 0.5,
        (v.y + 1.0) * height * 0.5,
        v.z,
        v.w,
    )
}

/// 固定变换管线：建模 → 相机 → 投影(+透视除法) → 视口
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    pub scale: Vector3<f32>,
    pub translate: Vector3<f32>,
    pub camera: CameraBasis,
    pub frustum: Frustum,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl TransformPipeline {
    pub fn new(
        scale: &Vector3<f32>,
        translate: &Vector3<f32>,
        camera: &CameraBasis,
        frustum: &Frustum,
        viewport_width: usize,
        viewport_height: usize,
    ) -> Self {
        Self {
            scale: *scale,
            translate: *translate,
            camera: *camera,
            frustum: *frustum,
            viewport_width: viewport_width as f32,
            viewport_height: viewport_height as f32,
        }
    }

    /// 依次经过各阶段函数，把模型空间顶点变换到像素坐标
    pub fn to_screen(&self, v: &Vertex) -> Vertex {
        let world = modeling_transform(v, &self.scale, &self.translate);
        let view = camera_transform(&world, &self.camera);
        let ndc = projection_transform(&view, &self.frustum);
        viewport_transform(&ndc, self.viewport_width, self.viewport_height)
    }
}
