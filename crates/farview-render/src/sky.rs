//! Sky stage: a screen-covering quad just past the near plane whose
//! camera-relative positions double as view directions for the sky shader.

use bytemuck::{Pod, Zeroable};
use farview_sky::{SkyParams, shade};
use glam::{Vec3, Vec4};

use crate::camera::Camera;
use crate::frame::FrameUniform;

/// Triangle list for the four corners returned by [`build_near_field_quad`].
pub const NEAR_FIELD_QUAD_INDICES: [u16; 6] = [0, 2, 1, 1, 2, 3];

/// How far past the near plane the quad sits, as a multiple of `z_near`.
const NEAR_FIELD_PUSH: f32 = 1.01;

/// Plain camera-relative float position.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyVertex {
    pub position: [f32; 3],
}

static_assertions::assert_eq_size!(SkyVertex, [u8; 12]);

impl SkyVertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
        }
    }

    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SkyVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Output of [`sky_vertex`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyVaryings {
    pub clip_position: Vec4,
    /// Camera-relative position, interpolated across the quad.
    pub view_dir: Vec3,
}

/// Corners of the camera-relative quad covering the whole viewport, placed at
/// `1.01 * z_near` along the view direction.
///
/// Order is top-left, top-right, bottom-left, bottom-right, matching
/// [`NEAR_FIELD_QUAD_INDICES`]. Recompute whenever the camera rotates or the
/// viewport changes aspect.
pub fn build_near_field_quad(camera: &Camera) -> [Vec3; 4] {
    let look_dir = camera.look_dir.normalize_or_zero();
    let distance = camera.z_near * NEAR_FIELD_PUSH;
    let half_height = (camera.fov_y * 0.5).tan() * distance;
    let half_width = half_height * camera.aspect_ratio;

    let near_center = look_dir * distance;
    let right = look_dir.cross(camera.up).normalize_or_zero();
    let up = right.cross(look_dir);

    [
        near_center + up * half_height - right * half_width,
        near_center + up * half_height + right * half_width,
        near_center - up * half_height - right * half_width,
        near_center - up * half_height + right * half_width,
    ]
}

/// [`build_near_field_quad`] as upload-ready vertices.
pub fn near_field_vertices(camera: &Camera) -> [SkyVertex; 4] {
    build_near_field_quad(camera).map(SkyVertex::new)
}

/// Per-vertex sky stage: project the position and pass it on as a direction.
pub fn sky_vertex(frame: &FrameUniform, vertex: &SkyVertex) -> SkyVaryings {
    let position = Vec3::from_array(vertex.position);
    SkyVaryings {
        clip_position: frame.view_projection_matrix() * position.extend(1.0),
        view_dir: position,
    }
}

/// Per-pixel sky stage. The interpolated direction is re-normalized first.
pub fn sky_fragment(varyings: &SkyVaryings, params: &SkyParams) -> Vec4 {
    shade(varyings.view_dir.normalize_or_zero(), params)
}

/// WGSL for the sky stage with the default [`SkyParams`] baked in as constants.
/// Mirrors [`sky_vertex`], [`sky_fragment`] and the `farview_sky` functions.
pub const SKY_SHADER_SOURCE: &str = r#"
struct FrameUniform {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    camera_packed_position: vec4<u32>,
    z_near: f32,
    z_far: f32,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniform;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_dir: vec3<f32>,
};

const DENSITY: f32 = 0.005;
const STAR_SIZE: f32 = 0.1;
const BASE_DENSITY: f32 = 0.9995;
const STAR_GRID_SCALE: f32 = 150.0;
const FRACT_MAX: f32 = 0.99999994;
const CENTER_SEED: vec3<f32> = vec3<f32>(17.13, 41.71, 73.37);
const GREEN_TINT: vec3<f32> = vec3<f32>(0.1, 0.4, 0.3);
const PURPLE_TINT: vec3<f32> = vec3<f32>(0.4, 0.1, 0.5);

fn fract_below_one(v: vec3<f32>) -> vec3<f32> {
    return min(fract(v), vec3<f32>(FRACT_MAX));
}

fn hash3(q: vec3<f32>) -> vec3<f32> {
    var p = fract_below_one(q * vec3<f32>(0.1031, 0.1030, 0.0973));
    p = p + dot(p, p.yxz + 33.33);
    return fract_below_one((p.xxy + p.yxx) * p.zyx);
}

fn value_noise(p: vec3<f32>) -> f32 {
    let cell = floor(p);
    let f = fract_below_one(p);
    let u = f * f * (3.0 - 2.0 * f);

    let c000 = hash3(cell).x;
    let c100 = hash3(cell + vec3<f32>(1.0, 0.0, 0.0)).x;
    let c010 = hash3(cell + vec3<f32>(0.0, 1.0, 0.0)).x;
    let c110 = hash3(cell + vec3<f32>(1.0, 1.0, 0.0)).x;
    let c001 = hash3(cell + vec3<f32>(0.0, 0.0, 1.0)).x;
    let c101 = hash3(cell + vec3<f32>(1.0, 0.0, 1.0)).x;
    let c011 = hash3(cell + vec3<f32>(0.0, 1.0, 1.0)).x;
    let c111 = hash3(cell + vec3<f32>(1.0, 1.0, 1.0)).x;

    let y0 = mix(mix(c000, c100, u.x), mix(c010, c110, u.x), u.y);
    let y1 = mix(mix(c001, c101, u.x), mix(c011, c111, u.x), u.y);
    return mix(y0, y1, u.z);
}

fn fractal_noise(p: vec3<f32>, octaves: u32) -> f32 {
    var value = 0.0;
    var amplitude = 0.5;
    var frequency = 1.0;
    for (var i = 0u; i < octaves; i = i + 1u) {
        value = value + amplitude * value_noise(p * frequency);
        amplitude = amplitude * 0.5;
        frequency = frequency * 2.0;
    }
    return value;
}

// xyz: unit centre direction, w: 1 when the cell holds a star.
fn star_centre(cell: vec3<f32>, lattice_radius: f32) -> vec4<f32> {
    let jittered = normalize(cell + hash3(cell + CENTER_SEED));
    if (all(floor(jittered * lattice_radius) == cell)) {
        return vec4<f32>(jittered, 1.0);
    }
    let middle = normalize(cell + vec3<f32>(0.5));
    if (all(floor(middle * lattice_radius) == cell)) {
        return vec4<f32>(middle, 1.0);
    }
    return vec4<f32>(0.0);
}

fn star_test(v: vec3<f32>) -> f32 {
    let scaled = v * STAR_GRID_SCALE;
    let lattice_radius = length(scaled);
    let home = floor(scaled);
    let dir = normalize(v);
    var brightest = 0.0;
    for (var z = -1; z <= 1; z = z + 1) {
        for (var y = -1; y <= 1; y = y + 1) {
            for (var x = -1; x <= 1; x = x + 1) {
                let cell = home + vec3<f32>(f32(x), f32(y), f32(z));
                let h = hash3(cell);
                if (h.x > BASE_DENSITY * DENSITY) {
                    continue;
                }
                let centre = star_centre(cell, lattice_radius);
                if (centre.w == 0.0) {
                    continue;
                }
                let size = mix(0.001, 0.01, h.y) * STAR_SIZE;
                let d = distance(dir, centre.xyz);
                brightest = max(brightest, 1.0 - smoothstep(0.8 * size, size, d));
            }
        }
    }
    return brightest;
}

fn stars(dir: vec3<f32>) -> f32 {
    return star_test(dir) + 0.5 * star_test(dir * 1.5);
}

fn nebula(dir: vec3<f32>) -> vec3<f32> {
    let n1 = fractal_noise(dir, 4u);
    let n2 = fractal_noise(dir * 2.0, 3u);
    let n3 = fractal_noise(dir * 4.0, 2u);
    let blend = 0.6 * n1 + 0.3 * n2 + 0.1 * n3;
    let intensity = smoothstep(0.2, 0.8, blend * blend * blend) * 0.2;
    return mix(GREEN_TINT, PURPLE_TINT, n2) * intensity;
}

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = frame.projection * frame.view * vec4<f32>(position, 1.0);
    out.view_dir = position;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dir = normalize(in.view_dir);
    return vec4<f32>(nebula(dir) + vec3<f32>(stars(dir)), 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use farview_sky::{BASE_DENSITY, DENSITY, FRACT_MAX, STAR_GRID_SCALE, STAR_SIZE};

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

    #[test]
    fn test_sky_vertex_layout() {
        let layout = SkyVertex::layout();
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn test_quad_indices_cover_two_triangles() {
        assert_eq!(NEAR_FIELD_QUAD_INDICES, [0, 2, 1, 1, 2, 3]);
        assert!(NEAR_FIELD_QUAD_INDICES.iter().all(|&i| i < 4));
    }

    #[test]
    fn test_quad_sits_just_past_near_plane() {
        let camera = Camera {
            look_dir: Vec3::new(0.4, -0.3, -0.8).normalize(),
            z_near: 2.0,
            ..Camera::default()
        };
        for corner in build_near_field_quad(&camera) {
            let along = corner.dot(camera.look_dir);
            assert!((along - 2.02).abs() < 1e-4, "corner {corner} at depth {along}");
        }
    }

    #[test]
    fn test_quad_corners_land_on_screen_corners() {
        let camera = Camera {
            look_dir: Vec3::new(-0.5, 0.2, -0.6).normalize(),
            aspect_ratio: 1.5,
            ..Camera::default()
        };
        let frame = camera.frame_uniform().unwrap();
        let expected = [
            (-1.0, 1.0),
            (1.0, 1.0),
            (-1.0, -1.0),
            (1.0, -1.0),
        ];
        for (vertex, (x, y)) in near_field_vertices(&camera).iter().zip(expected) {
            let clip = sky_vertex(&frame, vertex).clip_position;
            let ndc = clip.truncate() / clip.w;
            assert!(
                (ndc.x - x).abs() < 1e-3 && (ndc.y - y).abs() < 1e-3,
                "corner projected to {ndc}, expected ({x}, {y})"
            );
            assert!(ndc.z > 0.0 && ndc.z < 1.0, "quad must lie inside the depth range");
        }
    }

    #[test]
    fn test_fragment_normalizes_interpolated_direction() {
        let params = SkyParams::default();
        let dir = Vec3::new(0.3, 0.5, -0.8).normalize();
        let scaled = SkyVaryings {
            clip_position: Vec4::ZERO,
            view_dir: dir * 0.101,
        };
        let unit = SkyVaryings {
            clip_position: Vec4::ZERO,
            view_dir: dir,
        };
        let a = sky_fragment(&scaled, &params);
        let b = sky_fragment(&unit, &params);
        assert!((a - b).abs().max_element() < 1e-5);
        assert_eq!(a.w, 1.0);
    }

    #[test]
    fn test_shader_constants_match_defaults() {
        let constants = [
            ("DENSITY", DENSITY),
            ("STAR_SIZE", STAR_SIZE),
            ("BASE_DENSITY", BASE_DENSITY),
            ("STAR_GRID_SCALE", STAR_GRID_SCALE),
            ("FRACT_MAX", FRACT_MAX),
        ];
        for (name, value) in constants {
            let line = SKY_SHADER_SOURCE
                .lines()
                .find(|l| l.starts_with(&format!("const {name}: f32")))
                .unwrap_or_else(|| panic!("missing const {name}"));
            let literal = line
                .split('=')
                .nth(1)
                .and_then(|s| s.trim().trim_end_matches(';').parse::<f32>().ok())
                .unwrap_or_else(|| panic!("unparsable const line: {line}"));
            assert_eq!(literal, value, "{name} drifted between Rust and WGSL");
        }
    }

    #[test]
    fn test_sky_shader_compiles() {
        let Some(device) = create_test_device() else {
            return;
        };
        let _module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sky-shader"),
            source: wgpu::ShaderSource::Wgsl(SKY_SHADER_SOURCE.into()),
        });
    }
}
