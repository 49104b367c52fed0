//! Pattern asset loading.
//!
//! Grayscale source patterns are PNG files loaded once at startup. A missing
//! or undecodable file is a startup error; better to refuse than to animate
//! with garbage. With no pattern directory configured the procedural set is
//! used instead, which keeps the headless demo and tests file-free.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use glint_core::{Pattern, PatternId, PatternSet};

/// Errors while loading pattern assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// A required pattern file is absent.
    #[error("pattern file not found: {0}")]
    Missing(PathBuf),

    /// A pattern file exists but could not be decoded.
    #[error("failed to decode {path}: {source}")]
    Decode {
        /// Offending file.
        path: PathBuf,
        /// Decoder error.
        source: image::ImageError,
    },
}

/// File name for each loadable pattern. The flipped triangle is derived.
const FILES: [(PatternId, &str); 3] = [
    (PatternId::Circle, "fx_circle.png"),
    (PatternId::Triangle, "fx_triangle.png"),
    (PatternId::TrailStrip, "fx_trail.png"),
];

fn load_one(path: &Path) -> Result<Pattern, AssetError> {
    if !path.exists() {
        return Err(AssetError::Missing(path.to_path_buf()));
    }
    let image = image::open(path)
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    Ok(Pattern::from_image(image))
}

/// Loads the full pattern set.
///
/// With a directory, every file in the stock list must load; without one,
/// procedural patterns of `procedural_size` pixels are generated.
pub fn load_patterns(dir: Option<&Path>, procedural_size: u32) -> Result<PatternSet, AssetError> {
    let Some(dir) = dir else {
        info!(size = procedural_size, "using procedural patterns");
        return Ok(PatternSet::procedural(procedural_size));
    };

    let mut set = PatternSet::new();
    for (id, name) in FILES {
        let pattern = load_one(&dir.join(name))?;
        if id == PatternId::Triangle {
            set.insert(PatternId::TriangleFlipped, pattern.flipped_vertical());
        }
        set.insert(id, pattern);
    }
    info!(dir = %dir.display(), "patterns loaded");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, top: u8, bottom: u8) {
        let mut img = RgbaImage::new(2, 2);
        for (_, y, px) in img.enumerate_pixels_mut() {
            let gray = if y == 0 { top } else { bottom };
            *px = Rgba([gray, gray, gray, 255]);
        }
        img.save(dir.join(name)).unwrap();
    }

    fn write_all(dir: &Path) {
        write_png(dir, "fx_circle.png", 200, 200);
        write_png(dir, "fx_triangle.png", 10, 250);
        write_png(dir, "fx_trail.png", 128, 128);
    }

    #[test]
    fn test_no_directory_uses_procedural_set() {
        let set = load_patterns(None, 32).unwrap();
        assert!(set.contains_all(&PatternId::ALL));
    }

    #[test]
    fn test_loads_files_and_derives_flipped_triangle() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path());

        let set = load_patterns(Some(dir.path()), 32).unwrap();
        assert!(set.contains_all(&PatternId::ALL));

        // The derived pattern is the triangle upside down.
        let triangle = set.get(PatternId::Triangle).unwrap();
        let flipped = set.get(PatternId::TriangleFlipped).unwrap();
        let plain = triangle.recolor([255, 255, 255], 255, true);
        let upside_down = flipped.recolor([255, 255, 255], 255, true);
        assert_eq!(plain.get_pixel(0, 0).0[0], upside_down.get_pixel(0, 1).0[0]);
    }

    #[test]
    fn test_missing_file_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "fx_circle.png", 1, 1);
        let err = load_patterns(Some(dir.path()), 32).unwrap_err();
        assert!(matches!(err, AssetError::Missing(_)));
    }

    #[test]
    fn test_corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path());
        std::fs::write(dir.path().join("fx_triangle.png"), b"not a png").unwrap();
        let err = load_patterns(Some(dir.path()), 32).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }
}
