//! PNG output for rendered preview images.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use farview_config::ConfigError;
use farview_render::{CameraError, SkyImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("camera cannot render: {0}")]
    Camera(#[from] CameraError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
    #[error("no config directory available; pass --config")]
    NoConfigDir,
}

/// Encode `rgba` (8 bits per channel, row-major) as PNG into `writer`.
pub fn encode_png<W: Write>(
    writer: W,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<(), PreviewError> {
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    Ok(())
}

/// Tone-clamp `image` to 8-bit RGBA and write it to `path`, creating parent
/// directories as needed.
pub fn write_png(image: &SkyImage, path: &Path) -> Result<(), PreviewError> {
    let io_err = |source| PreviewError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    encode_png(BufWriter::new(file), image.width, image.height, &image.to_rgba8())
}
