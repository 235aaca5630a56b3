use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    config::DemoConfig, demo::DemoState, engine, rendering::renderer::Renderer,
    rendering::surface::FrameRequests, ui,
};

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    renderer: Option<Renderer>,
    demo_state: DemoState,
    requests: FrameRequests,
    imgui: Option<ImguiState>,
    last_frame: Instant,
}

impl App {
    fn from_demo_state(demo_state: DemoState) -> Self {
        Self {
            renderer: None,
            demo_state,
            requests: FrameRequests::default(),
            imgui: None,
            last_frame: Instant::now(),
        }
    }

    fn setup_imgui(&mut self, window: &Window) {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        self.imgui = Some(ImguiState { context, platform });
    }

    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Icosphere")
            .with_transparent(true);
        let window = event_loop
            .create_window(window_attributes)
            .context("Failed to create window")?;
        self.setup_imgui(&window);

        let imgui = self.imgui.as_mut().context("Imgui was not set up")?;
        let mut renderer = pollster::block_on(Renderer::new(
            Arc::new(window),
            &self.demo_state,
            &mut imgui.context,
        ))?;
        renderer.load_models(&mut self.demo_state)?;

        let size = renderer.size;
        self.demo_state.resize(size.width, size.height);
        renderer.window.request_redraw();
        self.renderer = Some(renderer);

        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(imgui)) = (self.renderer.as_mut(), self.imgui.as_mut()) else {
            return;
        };

        let delta_time = self.last_frame.elapsed();
        imgui.context.io_mut().update_delta_time(delta_time);
        self.last_frame = Instant::now();

        renderer.window.request_redraw();

        if let Err(e) = imgui
            .platform
            .prepare_frame(imgui.context.io_mut(), &renderer.window)
        {
            log::error!("Failed to prepare imgui frame: {}", e);
        }

        let ui = imgui.context.new_frame();

        let command = if self.demo_state.config.has_control_panel() {
            ui::control_panel(
                ui,
                &self.demo_state.controller,
                &self.demo_state.scheduler,
            )
        } else {
            None
        };

        imgui.platform.prepare_render(ui, &renderer.window);

        if let Err(e) = engine::update(&mut self.demo_state, &mut self.requests, command) {
            log::error!("Error during engine::update: {:?}", e);
        }

        if !self.requests.should_present() {
            imgui.context.render();
            return;
        }

        match renderer.render(&self.demo_state) {
            Ok(frame) => {
                renderer.finish_frame(frame, &mut imgui.context);
                return;
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(renderer.size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory");
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timeout");
            }
            Err(other) => {
                log::error!("Unexpected error: {:?}", other);
            }
        }

        // End the imgui frame even though nothing was presented.
        imgui.context.render();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        if let Err(e) = self.create_renderer(event_loop) {
            log::error!("Startup failed: {:?}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let ui_wants_mouse = self
            .imgui
            .as_ref()
            .is_some_and(|imgui| imgui.context.io().want_capture_mouse);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                }
                self.demo_state.resize(new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed if !ui_wants_mouse => self.demo_state.controls.pointer_down(),
                ElementState::Released => self.demo_state.controls.pointer_up(),
                _ => (),
            },
            WindowEvent::CursorMoved { position, .. } => {
                let height = self
                    .renderer
                    .as_ref()
                    .map_or(0.0, |renderer| renderer.size.height as f32);
                self.demo_state.controls.pointer_moved(
                    Vec2::new(position.x as f32, position.y as f32),
                    height,
                );
            }
            WindowEvent::MouseWheel { delta, .. } if !ui_wants_mouse => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                self.demo_state.controls.wheel(delta_y);
            }
            _ => (),
        }

        if let (Some(renderer), Some(imgui)) = (self.renderer.as_ref(), self.imgui.as_mut()) {
            imgui.platform.handle_event::<()>(
                imgui.context.io_mut(),
                &renderer.window,
                &Event::WindowEvent { window_id, event },
            );
        }
    }
}

pub async fn run(config: DemoConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let demo_state = DemoState::new(config).context("Failed to create demo state")?;
    let mut app = App::from_demo_state(demo_state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
