// SPDX-License-Identifier: CEPL-1.0
use std::path::Path;

use lumen_render::StartupError;

/// Decoded texture, tightly packed RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TexturePixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub fn load_rgba(path: &Path) -> Result<TexturePixels, StartupError> {
    let bytes = std::fs::read(path).map_err(|source| StartupError::AssetMissing {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| StartupError::AssetDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(StartupError::AssetDecode {
            path: path.to_path_buf(),
            reason: "image has no pixels".into(),
        });
    }
    Ok(TexturePixels {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lumen-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn decodes_ascii_ppm_to_rgba() {
        let path = scratch("tiny.ppm", b"P3\n2 1\n255\n255 0 0  0 255 0\n");
        let tex = load_rgba(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.rgba, [255, 0, 0, 255, 0, 255, 0, 255]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let path = scratch("garbage.png", b"definitely not an image");
        let err = load_rgba(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, StartupError::AssetDecode { .. }));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_rgba(Path::new("/nonexistent/lumen/texture.ppm")).unwrap_err();
        assert!(matches!(err, StartupError::AssetMissing { .. }));
    }
}
