// SPDX-License-Identifier: CEPL-1.0
use std::time::Duration;

use anyhow::{bail, Context, Result};
use lumen_render::{RenderSize, SurfaceProvider};
use tracing::{debug, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowId},
};

use crate::input::InputState;

// Some platforms only deliver `resumed` after a few pumps.
const OPEN_ATTEMPTS: u32 = 100;
const OPEN_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

/// Event-side state mutated by winit callbacks.
struct WindowApp {
    title: String,
    initial_size: PhysicalSize<u32>,
    window: Option<Window>,
    window_id: Option<WindowId>,
    create_error: Option<String>,
    close_requested: bool,
    resized: bool,
    focused: bool,
    input: InputState,
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window_id.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.initial_size);
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                info!("window created {}x{}", size.width, size.height);
                self.window_id = Some(window.id());
                self.window = Some(window);
            }
            Err(e) => self.create_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window_id != Some(window_id) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                info!("CloseRequested");
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                debug!("Resized → {}x{}", size.width, size.height);
                self.resized = true;
            }
            WindowEvent::Focused(focused) => {
                debug!("Focused({focused})");
                self.focused = focused;
                if !focused {
                    self.input.clear();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if code == KeyCode::Escape && event.state.is_pressed() {
                        info!("Escape pressed");
                        self.close_requested = true;
                    }
                    self.input.key(code, event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.mouse_button(button, state);
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.focused {
                self.input.mouse_motion(dx, dy);
            }
        }
    }
}

/// A winit window whose event loop is pumped by the caller.
///
/// Field order matters: the window is dropped before the event loop.
pub struct WinitSurface {
    window: Window,
    app: WindowApp,
    event_loop: EventLoop<()>,
}

impl WinitSurface {
    /// Creates the event loop and pumps it until the window exists.
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("create event loop")?;
        let mut app = WindowApp {
            title: title.to_owned(),
            initial_size: PhysicalSize::new(width, height),
            window: None,
            window_id: None,
            create_error: None,
            close_requested: false,
            resized: false,
            focused: true,
            input: InputState::default(),
        };

        for _ in 0..OPEN_ATTEMPTS {
            if app.window.is_some() || app.create_error.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(OPEN_PUMP_TIMEOUT), &mut app)
            {
                bail!("event loop exited with {code} before the window opened");
            }
        }
        if let Some(e) = app.create_error.take() {
            bail!("create_window: {e}");
        }
        let Some(window) = app.window.take() else {
            bail!("no window after {OPEN_ATTEMPTS} event pumps");
        };
        // The creation resize is not a change the renderer needs to hear about.
        app.resized = false;

        Ok(Self {
            window,
            app,
            event_loop,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn input(&self) -> &InputState {
        &self.app.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.app.input
    }

    /// True once per burst of resize events.
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.app.resized)
    }

    pub fn request_close(&mut self) {
        self.app.close_requested = true;
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, &mut self.app) {
            warn!("event loop exited with {code}");
            self.app.close_requested = true;
        }
    }
}

impl SurfaceProvider for WinitSurface {
    fn drawable_size(&self) -> RenderSize {
        let size = self.window.inner_size();
        RenderSize::new(size.width, size.height)
    }

    fn poll_events(&mut self) {
        self.pump(Some(Duration::ZERO));
    }

    fn wait_events(&mut self) {
        self.pump(None);
    }

    fn should_close(&self) -> bool {
        self.app.close_requested
    }
}
