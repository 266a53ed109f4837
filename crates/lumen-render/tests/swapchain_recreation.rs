// SPDX-License-Identifier: CEPL-1.0
mod common;

use common::{sentinel_caps, Call, MockDevice, MockSurface};
use lumen_render::{
    swapchain::{
        build_render_targets, create_swapchain, destroy_render_targets,
        recreate_swapchain_and_dependents,
    },
    vk, RenderConfig, RenderSize, RendererContext,
};

fn context(device: MockDevice) -> RendererContext<MockDevice> {
    RendererContext {
        device,
        config: RenderConfig::default(),
    }
}

#[test]
fn recreation_with_unchanged_size_is_idempotent() {
    let ctx = context(MockDevice::new());
    let mut surface = MockSurface::new(800, 600);
    let mut targets = build_render_targets(&ctx, RenderSize::new(800, 600)).unwrap();
    let (count, extent) = (targets.swapchain.image_count(), targets.swapchain.extent);
    let old_framebuffers = targets.swapchain.framebuffers.clone();
    ctx.device.clear_calls();

    assert!(recreate_swapchain_and_dependents(&ctx, &mut targets, &mut surface).unwrap());

    assert_eq!(targets.swapchain.image_count(), count);
    assert_eq!(targets.swapchain.extent, extent);
    assert_eq!(targets.swapchain.views.len(), count);
    assert_eq!(targets.swapchain.framebuffers.len(), count);
    assert_ne!(targets.swapchain.framebuffers, old_framebuffers);

    // idle first, everything old gone before anything new exists
    let calls = ctx.device.calls();
    assert_eq!(calls[0], Call::WaitIdle);
    let create = calls
        .iter()
        .position(|c| matches!(c, Call::CreateSwapchain { .. }))
        .unwrap();
    for fb in &old_framebuffers {
        let destroyed = calls
            .iter()
            .position(|c| *c == Call::DestroyFramebuffer(*fb))
            .unwrap();
        assert!(destroyed < create);
    }
    let destroy_pipelines = calls
        .iter()
        .position(|c| *c == Call::DestroyPipelines)
        .unwrap();
    assert!(destroy_pipelines < create);

    // rebuild order: swapchain, depth, pipelines, framebuffers
    let depth = calls.iter().position(|c| *c == Call::CreateDepth).unwrap();
    let pipelines = calls
        .iter()
        .position(|c| matches!(c, Call::CreatePipelines(_)))
        .unwrap();
    let first_fb = calls
        .iter()
        .position(|c| matches!(c, Call::CreateFramebuffer { .. }))
        .unwrap();
    assert!(create < depth && depth < pipelines && pipelines < first_fb);

    destroy_render_targets(&ctx, &mut targets);
    assert!(ctx.device.live.borrow().is_empty());
}

#[test]
fn sentinel_extent_is_clamped_to_surface_bounds() {
    let ctx = context(MockDevice::new());
    let mut sc = create_swapchain(&ctx, RenderSize::new(9000, 0), vk::SwapchainKHR::null()).unwrap();
    assert_eq!(
        sc.extent,
        vk::Extent2D {
            width: 4096,
            height: 1
        }
    );
    lumen_render::swapchain::destroy_swapchain(&ctx, &mut sc);
    assert!(sc.is_retired());
}

#[test]
fn reported_extent_wins_over_drawable_size() {
    let mut caps = sentinel_caps(2);
    caps.current_extent = vk::Extent2D {
        width: 640,
        height: 480,
    };
    let ctx = context(MockDevice::with_caps(caps));
    let sc = create_swapchain(&ctx, RenderSize::new(800, 600), vk::SwapchainKHR::null()).unwrap();
    assert_eq!(
        sc.extent,
        vk::Extent2D {
            width: 640,
            height: 480
        }
    );
    assert_eq!(sc.format, lumen_render::PREFERRED_SURFACE_FORMAT);
    assert_eq!(sc.present_mode, vk::PresentModeKHR::MAILBOX);
}

#[test]
fn minimised_window_stalls_rebuild() {
    let ctx = context(MockDevice::new());
    let mut targets = build_render_targets(&ctx, RenderSize::new(800, 600)).unwrap();
    let mut surface = MockSurface::new(800, 600).minimized(3);
    ctx.device.clear_calls();

    assert!(recreate_swapchain_and_dependents(&ctx, &mut targets, &mut surface).unwrap());

    assert_eq!(surface.waits, 3);
    let created: Vec<_> = ctx
        .device
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreateSwapchain { extent, .. } => Some(extent),
            _ => None,
        })
        .collect();
    // a swapchain built at (0,0) would have been clamped to 1x1
    assert_eq!(
        created,
        [vk::Extent2D {
            width: 800,
            height: 600
        }]
    );
}

#[test]
fn close_while_minimised_leaves_targets_torn_down() {
    let ctx = context(MockDevice::new());
    let mut targets = build_render_targets(&ctx, RenderSize::new(800, 600)).unwrap();
    let mut surface = MockSurface::new(800, 600).minimized(usize::MAX);
    surface.close_requested = true;
    ctx.device.clear_calls();

    assert!(!recreate_swapchain_and_dependents(&ctx, &mut targets, &mut surface).unwrap());
    assert!(targets.swapchain.is_retired());
    assert!(targets.pipelines.is_null());
    assert_eq!(
        ctx.device
            .count(|c| matches!(c, Call::CreateSwapchain { .. })),
        0
    );
    assert!(ctx.device.live.borrow().is_empty());
}
