// SPDX-License-Identifier: CEPL-1.0
//! Debug HUD: hotkeys that tune the camera, drawn as a column of gauge bars
//! with attachment clears inside the scene pass.

use lumen_math::{glam::Vec3, CameraState};
use lumen_platform::winit::keyboard::KeyCode;
use lumen_render::{vk, GpuDevice, Overlay};
use tracing::{info, warn};

const FOV_STEP: f32 = 5.0;
const ANGLE_STEP: f32 = 15.0;
const PLANE_FACTOR: f32 = 1.25;
const MIN_NEAR: f32 = 0.01;
const MAX_FAR: f32 = 1000.0;

const MARGIN: u32 = 12;
const BAR_WIDTH: u32 = 160;
const BAR_HEIGHT: u32 = 8;
const BAR_GAP: u32 = 6;
const TRACK_COLOR: [f32; 4] = [0.15, 0.15, 0.15, 1.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HudAction {
    WidenFov,
    NarrowFov,
    NearCloser,
    NearFarther,
    FarCloser,
    FarFarther,
    RotateLeft,
    RotateRight,
    /// Model rotation axis steps X, Y, Z.
    NextAxis,
    /// Camera up vector steps X, Y, Z.
    NextUp,
    ToggleWireframe,
    Reset,
    ToggleVisible,
}

impl HudAction {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        Some(match code {
            KeyCode::ArrowUp => HudAction::NarrowFov,
            KeyCode::ArrowDown => HudAction::WidenFov,
            KeyCode::KeyZ => HudAction::NearCloser,
            KeyCode::KeyX => HudAction::NearFarther,
            KeyCode::KeyC => HudAction::FarCloser,
            KeyCode::KeyV => HudAction::FarFarther,
            KeyCode::KeyQ => HudAction::RotateLeft,
            KeyCode::KeyE => HudAction::RotateRight,
            KeyCode::KeyT => HudAction::NextAxis,
            KeyCode::KeyU => HudAction::NextUp,
            KeyCode::KeyF => HudAction::ToggleWireframe,
            KeyCode::KeyR => HudAction::Reset,
            KeyCode::KeyH => HudAction::ToggleVisible,
            _ => return None,
        })
    }
}

/// One bar: `fraction` of the track is filled with `color`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gauge {
    pub fraction: f32,
    pub color: [f32; 4],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HudDrawData {
    pub gauges: Vec<Gauge>,
}

pub struct HudOverlay {
    visible: bool,
    wireframe_available: bool,
    pending: Vec<HudAction>,
}

impl HudOverlay {
    pub fn new(wireframe_available: bool) -> Self {
        Self {
            visible: true,
            wireframe_available,
            pending: Vec::new(),
        }
    }

    pub fn handle_keys(&mut self, keys: &[KeyCode]) {
        self.pending
            .extend(keys.iter().copied().filter_map(HudAction::from_key));
    }

    fn apply(&mut self, action: HudAction, cam: &mut CameraState) {
        match action {
            HudAction::WidenFov => cam.fovy += FOV_STEP,
            HudAction::NarrowFov => cam.fovy -= FOV_STEP,
            HudAction::NearCloser => cam.near /= PLANE_FACTOR,
            HudAction::NearFarther => cam.near *= PLANE_FACTOR,
            HudAction::FarCloser => cam.far /= PLANE_FACTOR,
            HudAction::FarFarther => cam.far *= PLANE_FACTOR,
            HudAction::RotateLeft => cam.angle -= ANGLE_STEP,
            HudAction::RotateRight => cam.angle += ANGLE_STEP,
            HudAction::NextAxis => {
                cam.axis = next_basis(cam.axis);
                info!("rotation axis {}", cam.axis);
            }
            HudAction::NextUp => {
                cam.up = next_basis(cam.up);
                info!("up vector {}", cam.up);
            }
            HudAction::ToggleWireframe => {
                if self.wireframe_available {
                    cam.wireframe = !cam.wireframe;
                    info!("wireframe {}", if cam.wireframe { "on" } else { "off" });
                } else {
                    warn!("wireframe needs fillModeNonSolid, which this device lacks");
                }
            }
            HudAction::Reset => *cam = CameraState::default(),
            HudAction::ToggleVisible => self.visible = !self.visible,
        }
        clamp_camera(cam);
    }
}

/// X to Y to Z and back to X. Anything off a basis vector snaps to X.
fn next_basis(v: Vec3) -> Vec3 {
    let n = v.normalize_or_zero();
    if n.abs_diff_eq(Vec3::X, 1e-4) {
        Vec3::Y
    } else if n.abs_diff_eq(Vec3::Y, 1e-4) {
        Vec3::Z
    } else {
        Vec3::X
    }
}

/// Keep the tunables inside ranges the projection can handle.
fn clamp_camera(cam: &mut CameraState) {
    cam.fovy = cam.fovy.clamp(CameraState::MIN_FOVY, CameraState::MAX_FOVY);
    cam.far = cam.far.clamp(MIN_NEAR * 2.0, MAX_FAR);
    cam.near = cam.near.clamp(MIN_NEAR, cam.far * 0.5);
    cam.angle = cam.angle.rem_euclid(360.0);
}

fn gauges(cam: &CameraState) -> Vec<Gauge> {
    vec![
        Gauge {
            fraction: cam.fovy / CameraState::MAX_FOVY,
            color: [0.9, 0.6, 0.1, 1.0],
        },
        Gauge {
            fraction: cam.near / cam.far,
            color: [0.2, 0.7, 0.9, 1.0],
        },
        Gauge {
            fraction: cam.far / MAX_FAR,
            color: [0.3, 0.4, 0.9, 1.0],
        },
        Gauge {
            fraction: cam.angle / 360.0,
            color: [0.8, 0.3, 0.8, 1.0],
        },
        Gauge {
            fraction: if cam.wireframe { 1.0 } else { 0.0 },
            color: [0.3, 0.9, 0.3, 1.0],
        },
    ]
}

/// Track and fill rectangles for the gauge in `row`, or `None` when the
/// row does not fit inside `extent`.
fn gauge_rects(extent: vk::Extent2D, row: u32, fraction: f32) -> Option<(vk::Rect2D, vk::Rect2D)> {
    let width = BAR_WIDTH.min(extent.width.saturating_sub(2 * MARGIN));
    let y = MARGIN + row * (BAR_HEIGHT + BAR_GAP);
    if width == 0 || y + BAR_HEIGHT > extent.height {
        return None;
    }
    let rect = |w: u32| vk::Rect2D {
        offset: vk::Offset2D {
            x: MARGIN as i32,
            y: y as i32,
        },
        extent: vk::Extent2D {
            width: w,
            height: BAR_HEIGHT,
        },
    };
    let filled = (fraction.clamp(0.0, 1.0) * width as f32).round() as u32;
    Some((rect(width), rect(filled)))
}

impl<D: GpuDevice> Overlay<D> for HudOverlay {
    type DrawData = HudDrawData;

    fn begin_frame(&mut self) {}

    fn render(&mut self, camera: &mut CameraState) -> HudDrawData {
        for action in std::mem::take(&mut self.pending) {
            self.apply(action, camera);
        }
        if !self.visible {
            return HudDrawData::default();
        }
        HudDrawData {
            gauges: gauges(camera),
        }
    }

    fn record_into(
        &mut self,
        device: &D,
        cmd: vk::CommandBuffer,
        extent: vk::Extent2D,
        data: &HudDrawData,
    ) {
        let rows: Vec<(&Gauge, vk::Rect2D, vk::Rect2D)> = data
            .gauges
            .iter()
            .enumerate()
            .map_while(|(row, g)| {
                gauge_rects(extent, row as u32, g.fraction).map(|(track, fill)| (g, track, fill))
            })
            .collect();
        let tracks: Vec<vk::Rect2D> = rows.iter().map(|&(_, track, _)| track).collect();
        device.cmd_clear_rects(cmd, TRACK_COLOR, &tracks);
        for (gauge, _, fill) in &rows {
            // zero-sized clear rects are invalid
            if fill.extent.width > 0 {
                device.cmd_clear_rects(cmd, gauge.color, std::slice::from_ref(fill));
            }
        }
    }
}
