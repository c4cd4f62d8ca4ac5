//! Object and sky stages for the Farview renderer: GPU-facing data layouts,
//! WGSL sources, and CPU reference implementations run in parallel with rayon.

pub mod camera;
pub mod dispatch;
pub mod frame;
pub mod object;
pub mod sky;

pub use camera::{Camera, CameraError, MIN_ORIENTATION_SINE};
pub use dispatch::{
    SkyImage, decode_relative_par, render_sky_image, run_object_vertices, view_direction,
};
pub use frame::FrameUniform;
pub use object::{
    OBJECT_SHADER_SOURCE, ObjectVaryings, ObjectVertex, object_fragment, object_vertex,
};
pub use sky::{
    NEAR_FIELD_QUAD_INDICES, SKY_SHADER_SOURCE, SkyVaryings, SkyVertex, build_near_field_quad,
    near_field_vertices, sky_fragment, sky_vertex,
};
