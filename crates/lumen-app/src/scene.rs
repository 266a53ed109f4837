// SPDX-License-Identifier: CEPL-1.0
use lumen_math::{glam::Vec3, grid_positions};
use tracing::warn;

use crate::config::SceneCfg;

/// Cube offsets for the storage buffer, at most `capacity` of them.
pub fn cube_positions(cfg: &SceneCfg, capacity: usize) -> Vec<Vec3> {
    let wanted = cfg.cubes as usize;
    if wanted > capacity {
        warn!("scene asks for {wanted} cubes, storage holds {capacity}; capping");
    }
    grid_positions(wanted.min(capacity), cfg.spacing)
}
