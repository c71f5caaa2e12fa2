//! File output and output path generation

use image::imageops::FilterType;
use image::RgbaImage;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent_dir(path)?;
    image.save(path)?;
    info!("Wrote {}x{} PNG to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Write raw CHR bytes, creating parent directories.
pub fn write_chr(data: &[u8], path: &Path) -> Result<(), OutputError> {
    ensure_parent_dir(path)?;
    std::fs::write(path, data)?;
    info!("Wrote {} bytes of CHR data to {}", data.len(), path.display());
    Ok(())
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// A factor of 0 or 1 returns the image unchanged.
pub fn scale_image(image: RgbaImage, factor: u8) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    let new_w = w * factor as u32;
    let new_h = h * factor as u32;
    image::imageops::resize(&image, new_w, new_h, FilterType::Nearest)
}

/// Pick the output path for a converted file.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No output given, input `gfx/hero.png` | `gfx/hero.<ext>` |
/// | `output.chr` | `output.chr` |
/// | `dir/` or an existing directory | `dir/hero.<ext>` |
pub fn generate_output_path(input: &Path, output_arg: Option<&Path>, extension: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(format!("{}.{}", stem, extension))
            } else {
                output.to_path_buf()
            }
        }
        None => input.with_file_name(format!("{}.{}", stem, extension)),
    }
}
