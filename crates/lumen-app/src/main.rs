// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::{init_tracing, FpsCounter, FrameClock};
use lumen_math::{CameraState, FlyController};
use lumen_platform::WinitSurface;
use lumen_render::{FrameInput, FrameOutcome, Overlay, Renderer, SurfaceProvider};
use lumen_render_vk::{VkDevice, VkOptions};
use tracing::{debug, error, info};

mod config;
mod hud;
mod scene;

use config::load_cfg;
use hud::HudOverlay;

const WINDOW_TITLE: &str = "lumen";
const WINDOW_WIDTH: u32 = 1600;
const WINDOW_HEIGHT: u32 = 900;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with [render], [scene] and [assets] sections
    #[arg(long, default_value = "lumen.toml")]
    config: PathBuf,
    /// Exit after this many presented frames
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let cfg = load_cfg(&args.config);
    let render_config = cfg.render.to_render_config();

    let mut surface = WinitSurface::open(WINDOW_TITLE, WINDOW_WIDTH, WINDOW_HEIGHT)
        .context("open window")?;

    let options = VkOptions {
        app_name: WINDOW_TITLE.into(),
        texture: cfg.assets.texture.clone(),
        shader_dir: cfg.assets.shader_dir.clone(),
        ..Default::default()
    };
    let device = VkDevice::new(surface.window(), surface.window(), &options, &render_config)
        .context("vulkan init")?;
    let mut hud = HudOverlay::new(device.supports_wireframe());
    let adapter = device.adapter_name().to_owned();
    let mut renderer =
        Renderer::new(device, render_config, &surface).context("renderer init")?;

    let objects = scene::cube_positions(&cfg.scene, render_config.max_objects);
    info!("scene: {} cubes", objects.len());
    let mut camera = CameraState {
        wireframe: cfg.render.wireframe && renderer.device().supports_wireframe(),
        ..Default::default()
    };
    let fly = FlyController::default();
    let mut clock = FrameClock::new();
    let mut fps = FpsCounter::new();
    let mut presented: u64 = 0;

    while !surface.should_close() {
        surface.poll_events();
        if surface.should_close() {
            break;
        }
        if surface.take_resized() {
            renderer.mark_stale();
        }

        let dt = clock.tick();
        let mouse = surface.input_mut().take_mouse_delta();
        fly.update(&mut camera, surface.input().movement(), mouse, dt);
        hud.handle_keys(surface.input().just_pressed());
        surface.input_mut().end_frame();

        Overlay::<VkDevice>::begin_frame(&mut hud);
        let hud_data = Overlay::<VkDevice>::render(&mut hud, &mut camera);
        let input = FrameInput {
            camera: &camera,
            objects: &objects,
        };
        match renderer.render_frame(&mut surface, &input, &mut hud, &hud_data) {
            Ok(FrameOutcome::Presented { .. } | FrameOutcome::PresentedThenRecreated { .. }) => {
                presented += 1;
                fps.frame();
            }
            Ok(FrameOutcome::Recreated { .. }) => {
                debug!("frame skipped for swapchain rebuild");
            }
            Err(e) if e.is_fatal() => return Err(e).context("swapchain rebuild"),
            Err(e) => error!("frame dropped: {e}"),
        }

        if let Some(rate) = fps.poll() {
            info!("fps ~ {rate}");
            surface.set_title(&format!("{WINDOW_TITLE} | {adapter} | {rate} fps"));
        }
        if args.frames.is_some_and(|limit| presented >= limit) {
            info!("presented {presented} frames, exiting");
            surface.request_close();
        }
    }

    let stats = renderer.orchestrator().stats();
    info!(
        presented = stats.presented,
        recreations = stats.recreations,
        abandoned = stats.abandoned,
        failures = stats.failures,
        "shutting down"
    );
    // Renderer (and with it the Vulkan surface) goes before the window.
    drop(renderer);
    drop(surface);
    Ok(())
}
