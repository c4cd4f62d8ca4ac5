//! Object stage: packed-position vertices projected with logarithmic depth.

use bytemuck::{Pod, Zeroable};
use farview_math::{PackedPosition, apply_log_depth, decode_relative};
use glam::{DVec3, Vec3, Vec4};

use crate::frame::FrameUniform;

/// Vertex with a packed world position and an RGBA color (alpha ignored).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectVertex {
    pub position: PackedPosition, // 16 bytes, vec4<u32>
    pub color: [f32; 4],          // 16 bytes, vec4<f32>
}

static_assertions::assert_eq_size!(ObjectVertex, [u8; 32]);

impl ObjectVertex {
    pub fn new(position: PackedPosition, color: [f32; 4]) -> Self {
        Self { position, color }
    }

    pub fn from_world(position: DVec3, color: [f32; 4]) -> Self {
        Self::new(PackedPosition::from_world(position), color)
    }

    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ObjectVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Uint32x4,
                },
                VertexAttribute {
                    offset: std::mem::size_of::<PackedPosition>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Output of [`object_vertex`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectVaryings {
    pub clip_position: Vec4,
    pub color: Vec3,
}

impl ObjectVaryings {
    /// Depth after the perspective divide, i.e. the logarithmic depth.
    #[inline]
    pub fn ndc_depth(&self) -> f32 {
        self.clip_position.z / self.clip_position.w
    }

    /// Whether the vertex lies inside the `[-w, w]² × [0, w]` clip volume.
    pub fn in_clip_volume(&self) -> bool {
        let [x, y, z, w] = self.clip_position.to_array();
        w > 0.0 && x.abs() <= w && y.abs() <= w && (0.0..=w).contains(&z)
    }
}

/// Per-vertex object stage.
///
/// Decodes the vertex relative to the camera in integer arithmetic, applies the
/// rotation-only view and the projection, then replaces clip `z` with
/// logarithmic depth pre-multiplied by `w`.
pub fn object_vertex(frame: &FrameUniform, vertex: &ObjectVertex) -> ObjectVaryings {
    let relative = decode_relative(vertex.position, frame.camera_packed_position);
    let view_pos = frame.view_matrix() * relative.extend(1.0);
    let z_view = -view_pos.z;
    let clip = frame.projection_matrix() * view_pos;
    ObjectVaryings {
        clip_position: apply_log_depth(clip, z_view, frame.z_near, frame.z_far),
        color: Vec4::from_array(vertex.color).truncate(),
    }
}

/// Per-pixel object stage: pass-through color, forced opaque.
#[inline]
pub fn object_fragment(varyings: &ObjectVaryings) -> Vec4 {
    varyings.color.extend(1.0)
}

/// WGSL for the object stage. Mirrors [`object_vertex`] and [`object_fragment`]
/// and binds [`FrameUniform`] at group 0, binding 0.
pub const OBJECT_SHADER_SOURCE: &str = r#"
struct FrameUniform {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    camera_packed_position: vec4<u32>,
    z_near: f32,
    z_far: f32,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniform;

struct VertexInput {
    @location(0) position: vec4<u32>,
    @location(1) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

const FRACTION_STEP: f32 = 1.0 / 16384.0;

fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32u - bits;
    return bitcast<i32>(value << shift) >> shift;
}

fn integer_parts(w: vec4<u32>) -> vec3<i32> {
    let x = w.w >> 3u;
    let y = ((w.z & 0x1FFFFFu) << 8u) | (w.y >> 24u);
    let z = ((w.y & 0x3FFu) << 18u) | (w.x >> 14u);
    return vec3<i32>(sign_extend(x, 29u), sign_extend(y, 29u), sign_extend(z, 28u));
}

fn fraction_parts(w: vec4<u32>) -> vec3<u32> {
    let x = ((w.w & 7u) << 11u) | (w.z >> 21u);
    let y = (w.y >> 10u) & 0x3FFFu;
    let z = w.x & 0x3FFFu;
    return vec3<u32>(x, y, z);
}

fn decode_relative(packed: vec4<u32>, camera: vec4<u32>) -> vec3<f32> {
    let whole = integer_parts(packed) - integer_parts(camera);
    let fraction = vec3<i32>(fraction_parts(packed)) - vec3<i32>(fraction_parts(camera));
    return vec3<f32>(whole) + vec3<f32>(fraction) * FRACTION_STEP;
}

fn log_depth(z_view: f32, z_near: f32, z_far: f32) -> f32 {
    let log_near = log(z_near);
    return (log(z_view) - log_near) / (log(z_far) - log_near);
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let relative = decode_relative(in.position, frame.camera_packed_position);
    let view_pos = frame.view * vec4<f32>(relative, 1.0);
    let z_view = -view_pos.z;
    var clip = frame.projection * view_pos;
    clip.z = log_depth(z_view, frame.z_near, frame.z_far) * clip.w;

    var out: VertexOutput;
    out.clip_position = clip;
    out.color = in.color.rgb;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use farview_math::DepthRange;
    use glam::Mat4;

    fn create_test_device() -> Option<wgpu::Device> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok()?;

            let (device, _queue) = adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()?;
            Some(device)
        })
    }

    fn identity_frame(camera: PackedPosition, near: f32, far: f32) -> FrameUniform {
        FrameUniform::new(
            Mat4::IDENTITY,
            Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, near, far),
            camera,
            DepthRange::new(near, far).unwrap(),
        )
    }

    #[test]
    fn test_object_vertex_layout() {
        let layout = ObjectVertex::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Uint32x4);
        assert_eq!(layout.attributes[1].offset, 16);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn test_vertex_at_near_plane_has_zero_depth() {
        let camera = PackedPosition::from_world(DVec3::new(1.0e8, 2.0e8, -1.0e8));
        let frame = identity_frame(camera, 1.0, 1000.0);
        let vertex = ObjectVertex::from_world(
            camera.to_world() + DVec3::new(0.0, 0.0, -1.0),
            [1.0, 0.0, 0.0, 1.0],
        );
        let out = object_vertex(&frame, &vertex);
        assert_eq!(out.clip_position.z, 0.0);
        assert_eq!(out.ndc_depth(), 0.0);
        assert!(out.in_clip_volume());
    }

    #[test]
    fn test_vertex_at_far_plane_has_unit_depth() {
        let camera = PackedPosition::from_world(DVec3::new(-3.0e7, 5.5, 1.0e7));
        let frame = identity_frame(camera, 1.0, 1000.0);
        let vertex = ObjectVertex::from_world(
            camera.to_world() + DVec3::new(0.0, 0.0, -1000.0),
            [0.0, 1.0, 0.0, 1.0],
        );
        let out = object_vertex(&frame, &vertex);
        assert_eq!(out.clip_position.w, 1000.0);
        assert_eq!(out.ndc_depth(), 1.0);
    }

    #[test]
    fn test_geometric_mean_depth_is_half() {
        let frame = identity_frame(PackedPosition::ORIGIN, 1.0, 1000.0);
        let z = 1000.0_f64.sqrt();
        let vertex = ObjectVertex::from_world(DVec3::new(0.0, 0.0, -z), [1.0; 4]);
        let out = object_vertex(&frame, &vertex);
        assert!((out.ndc_depth() - 0.5).abs() < 1e-4, "depth {}", out.ndc_depth());
    }

    #[test]
    fn test_depth_is_monotonic_along_view_axis() {
        let camera = PackedPosition::from_world(DVec3::new(2.5e8, -2.5e8, 1.2e8));
        let frame = identity_frame(camera, 0.5, 1.0e6);
        let mut previous = f32::NEG_INFINITY;
        for step in 1..200 {
            let distance = 0.5 * 1.08_f64.powi(step);
            if distance > 1.0e6 {
                break;
            }
            let vertex = ObjectVertex::from_world(
                camera.to_world() + DVec3::new(0.0, 0.0, -distance),
                [1.0; 4],
            );
            let depth = object_vertex(&frame, &vertex).ndc_depth();
            assert!(depth > previous, "depth {depth} at {distance} not increasing");
            previous = depth;
        }
    }

    #[test]
    fn test_far_world_matches_origin_world() {
        // The same camera-relative geometry must project identically whether the
        // scene sits at the origin or hundreds of millions of units away.
        let camera = Camera {
            look_dir: Vec3::new(0.2, 0.1, -1.0).normalize(),
            ..Camera::default()
        };
        let offset = DVec3::new(3.25, -1.5, -40.0);

        let near_frame = camera.frame_uniform().unwrap();
        let near_out = object_vertex(&near_frame, &ObjectVertex::from_world(offset, [1.0; 4]));

        let far_camera = Camera {
            position: DVec3::new(2.0e8, -1.5e8, 1.0e8),
            ..camera.clone()
        };
        let far_frame = far_camera.frame_uniform().unwrap();
        let far_out = object_vertex(
            &far_frame,
            &ObjectVertex::from_world(far_camera.position + offset, [1.0; 4]),
        );

        assert_eq!(near_out.clip_position, far_out.clip_position);
    }

    #[test]
    fn test_color_passes_through_and_alpha_is_ignored() {
        let frame = identity_frame(PackedPosition::ORIGIN, 1.0, 100.0);
        let vertex = ObjectVertex::from_world(DVec3::new(0.0, 0.0, -10.0), [0.25, 0.5, 0.75, 0.1]);
        let out = object_vertex(&frame, &vertex);
        assert_eq!(out.color, Vec3::new(0.25, 0.5, 0.75));
        assert_eq!(object_fragment(&out), Vec4::new(0.25, 0.5, 0.75, 1.0));
    }

    #[test]
    fn test_vertex_behind_camera_is_outside_clip_volume() {
        let frame = identity_frame(PackedPosition::ORIGIN, 1.0, 100.0);
        let vertex = ObjectVertex::from_world(DVec3::new(0.0, 0.0, 10.0), [1.0; 4]);
        assert!(!object_vertex(&frame, &vertex).in_clip_volume());
    }

    #[test]
    fn test_pod_cast_of_vertices() {
        let vertex = ObjectVertex::from_world(DVec3::new(1.5, -2.0, 3.0), [0.1, 0.2, 0.3, 1.0]);
        let bytes: &[u8] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
        assert_eq!(bytes.len(), 32);
        let words: &[u32] = bytemuck::cast_slice(&bytes[..16]);
        assert_eq!(words, &vertex.position.words());
    }

    #[test]
    fn test_object_shader_compiles() {
        let Some(device) = create_test_device() else {
            return;
        };
        let _module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("object-shader"),
            source: wgpu::ShaderSource::Wgsl(OBJECT_SHADER_SOURCE.into()),
        });
    }
}
