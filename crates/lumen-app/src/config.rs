// SPDX-License-Identifier: CEPL-1.0
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use lumen_math::MAX_OBJECTS;
use lumen_render::{PresentPreference, RenderConfig};
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct RenderCfg {
    #[serde(default = "default_clear")]
    pub clear_color: [f32; 4],
    #[serde(default)]
    pub present_mode: PresentModeCfg,
    #[serde(default = "default_true")]
    pub depth_test: bool,
    /// 0 = one slot per swapchain image.
    #[serde(default)]
    pub frames_in_flight: u32,
    #[serde(default)]
    pub wireframe: bool,
}

#[derive(Debug, Clone, Copy, serde::Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeCfg {
    Fifo,
    #[default]
    Mailbox,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SceneCfg {
    #[serde(default = "default_cubes")]
    pub cubes: u32,
    #[serde(default = "default_spacing")]
    pub spacing: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AssetsCfg {
    #[serde(default = "default_texture")]
    pub texture: PathBuf,
    #[serde(default)]
    pub shader_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct AppCfg {
    #[serde(default)]
    pub render: RenderCfg,
    #[serde(default)]
    pub scene: SceneCfg,
    #[serde(default)]
    pub assets: AssetsCfg,
}

impl Default for RenderCfg {
    fn default() -> Self {
        RenderCfg {
            clear_color: default_clear(),
            present_mode: PresentModeCfg::Mailbox,
            depth_test: true,
            frames_in_flight: 0,
            wireframe: false,
        }
    }
}

impl Default for SceneCfg {
    fn default() -> Self {
        SceneCfg {
            cubes: default_cubes(),
            spacing: default_spacing(),
        }
    }
}

impl Default for AssetsCfg {
    fn default() -> Self {
        AssetsCfg {
            texture: default_texture(),
            shader_dir: None,
        }
    }
}

impl RenderCfg {
    pub fn to_render_config(&self) -> RenderConfig {
        RenderConfig {
            clear_color: self.clear_color,
            present: match self.present_mode {
                PresentModeCfg::Fifo => PresentPreference::Fifo,
                PresentModeCfg::Mailbox => PresentPreference::LowLatency,
            },
            depth_test: self.depth_test,
            frames_in_flight: self.frames_in_flight,
            max_objects: MAX_OBJECTS,
        }
    }
}

fn default_clear() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
fn default_true() -> bool {
    true
}
fn default_cubes() -> u32 {
    9
}
fn default_spacing() -> f32 {
    1.5
}
fn default_texture() -> PathBuf {
    PathBuf::from("assets/checker.ppm")
}

pub fn parse_cfg(text: &str) -> Result<AppCfg, toml::de::Error> {
    toml::from_str::<AppCfg>(text)
}

/// Missing file → defaults. Malformed file → warning, then defaults.
pub fn load_cfg(path: &Path) -> AppCfg {
    match fs::read_to_string(path) {
        Ok(s) => match parse_cfg(&s) {
            Ok(cfg) => {
                info!("config loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("ignoring malformed {}: {e}", path.display());
                AppCfg::default()
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("no {}, using defaults", path.display());
            AppCfg::default()
        }
        Err(e) => {
            warn!("cannot read {}: {e}", path.display());
            AppCfg::default()
        }
    }
}
