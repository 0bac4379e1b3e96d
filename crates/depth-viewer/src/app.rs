use crate::{
    camera::{CameraController, CameraState},
    config::CloudSettings,
    data::FrameIngestPipeline,
    error::RenderError,
    gpu::GpuBackend,
    input::InputTranslator,
    render::{RenderLoop, Viewport},
    renderer::Renderer,
    source::FrameMailbox,
    ui::{self, HudStats},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use winit::{event::WindowEvent, window::Window};

pub struct App {
    pub renderer: Renderer,
    pub camera: CameraController,
    pub input: InputTranslator,
    pub render_loop: RenderLoop,
    pub ingest: FrameIngestPipeline,
    pub mailbox: FrameMailbox,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
}

impl App {
    pub async fn new(
        window: Arc<Window>,
        settings: &CloudSettings,
        shader_source: &str,
        mailbox: FrameMailbox,
    ) -> Result<Self> {
        let mut renderer = Renderer::new(window.clone(), settings.layout, shader_source)
            .await
            .context("Failed to initialise the point-cloud renderer")?;
        let size = renderer.gfx.size;

        let viewport = Viewport {
            width: size.width.max(1),
            height: size.height.max(1),
        };
        let render_loop = RenderLoop::new(viewport, settings.dims, settings.centering);
        let camera = CameraController::new(CameraState::new(settings.eye_distance));

        // Storage is sized once here; every later frame overwrites it.
        let mut ingest = FrameIngestPipeline::new(settings);
        ingest
            .initialize(&mut renderer)
            .context("Failed to allocate point-cloud storage")?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        log::info!(
            "Viewer ready: {} frame, {} points, depth scale {}",
            settings.dims,
            ingest.vertex_count(),
            settings.depth_scale
        );

        Ok(Self {
            renderer,
            camera,
            input: InputTranslator::with_scale_factor(window.scale_factor()),
            render_loop,
            ingest,
            mailbox,
            egui_ctx,
            egui_state,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if self
            .render_loop
            .resize(self.camera.state_mut(), new_size.width, new_size.height)
        {
            self.renderer.resize(new_size);
            self.renderer.request_redraw();
        }
    }

    /// Returns `true` if egui consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.repaint {
            window.request_redraw();
        }
        if response.consumed {
            return true;
        }

        if let Some(input) = self.input.translate(event) {
            if self.camera.handle(input) {
                self.renderer.request_redraw();
            }
        }

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        false
    }

    /// Uploads the newest waiting frame pair, if any.
    ///
    /// Returns an error only when the GPU context is gone; rejected frames are
    /// logged by the pipeline and skipped.
    pub fn pump_frames(&mut self) -> Result<(), RenderError> {
        let Some(pair) = self.mailbox.take_latest() else {
            return Ok(());
        };
        match self
            .ingest
            .ingest(&mut self.renderer, &pair.depth, &pair.color)
        {
            Err(err) if err.is_fatal() => Err(err),
            _ => Ok(()),
        }
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let vertex_count = self.ingest.vertex_count();
        if let Err(err) = self.render_loop.paint(
            self.camera.state_mut(),
            &mut self.renderer,
            &swap_view,
            vertex_count,
        ) {
            log::error!("Point pass skipped: {}", err);
        }

        let stats = HudStats::collect(
            self.camera.state(),
            vertex_count,
            self.ingest.stats(),
            self.render_loop.recomputes(),
        );

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);
        ui::draw_hud(&self.egui_ctx, &stats);
        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);

        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            // Drawn over the points, so load instead of clear.
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
