// SPDX-License-Identifier: CEPL-1.0
use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use ash::util::read_spv;
use lumen_render::StartupError;
use tracing::info;

const EMBEDDED_VERT: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/vert.spv"));
const EMBEDDED_FRAG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/frag.spv"));

/// SPIR-V words for the cube pipeline.
#[derive(Clone, Debug)]
pub struct ShaderCode {
    pub vert: Vec<u32>,
    pub frag: Vec<u32>,
}

impl ShaderCode {
    /// Reads `vert.spv` and `frag.spv` from `dir`, or uses the copies
    /// compiled into the binary.
    pub fn load(dir: Option<&Path>) -> Result<Self, StartupError> {
        match dir {
            None => Ok(Self {
                vert: parse_spirv("vert.spv", EMBEDDED_VERT)?,
                frag: parse_spirv("frag.spv", EMBEDDED_FRAG)?,
            }),
            Some(dir) => {
                info!("loading shaders from {}", dir.display());
                Ok(Self {
                    vert: read_file(dir.join("vert.spv"))?,
                    frag: read_file(dir.join("frag.spv"))?,
                })
            }
        }
    }
}

fn read_file(path: PathBuf) -> Result<Vec<u32>, StartupError> {
    let bytes = match fs::read(&path) {
        Ok(b) => b,
        Err(source) => return Err(StartupError::AssetMissing { path, source }),
    };
    parse_spirv(&path.display().to_string(), &bytes)
}

pub fn parse_spirv(name: &str, bytes: &[u8]) -> Result<Vec<u32>, StartupError> {
    read_spv(&mut Cursor::new(bytes)).map_err(|source| StartupError::InvalidShader {
        name: name.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_shaders_parse() {
        let code = ShaderCode::load(None).unwrap();
        assert_eq!(code.vert[0], 0x0723_0203);
        assert_eq!(code.frag[0], 0x0723_0203);
    }

    #[test]
    fn truncated_bytecode_is_rejected() {
        let err = parse_spirv("broken.spv", &[0x03, 0x02, 0x23]).unwrap_err();
        assert!(matches!(err, StartupError::InvalidShader { ref name, .. } if name == "broken.spv"));
    }

    #[test]
    fn missing_directory_reports_the_path() {
        let dir = std::env::temp_dir().join("lumen-no-such-shader-dir");
        match ShaderCode::load(Some(&dir)) {
            Err(StartupError::AssetMissing { path, .. }) => {
                assert_eq!(path, dir.join("vert.spv"))
            }
            other => panic!("expected AssetMissing, got {other:?}"),
        }
    }
}
