//! The wgpu backend. Owns the GPU context, the depth target, the point
//! pipeline and the point-cloud storage, and implements [`GpuBackend`].

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{context::GfxContext, pipelines::point_cloud::PointCloudPipeline, targets::DepthTarget};
use crate::{
    data::types::TransformUniforms,
    error::RenderError,
    gpu::{GpuBackend, StorageSpec},
};
use depthframe::{FrameDims, VertexLayout, RGBA_BYTES_PER_PIXEL};
use std::sync::Arc;
use winit::window::Window;

/// Vertex buffer, color texture and the bind group that ties them to the
/// uniform block. Created once, overwritten per frame.
struct CloudStorage {
    vtx: wgpu::Buffer,
    color_tex: wgpu::Texture,
    frame: FrameDims,
    bind: wgpu::BindGroup,
}

pub struct Renderer {
    pub gfx: GfxContext,
    pub depth: DepthTarget,
    pub points: PointCloudPipeline,
    pub egui_renderer: egui_wgpu::Renderer,
    window: Arc<Window>,
    ubo: wgpu::Buffer,
    storage: Option<CloudStorage>,
    in_scope: bool,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        layout: VertexLayout,
        shader_source: &str,
    ) -> Result<Self, RenderError> {
        let gfx = GfxContext::new(window.clone()).await?;
        let depth = DepthTarget::new(&gfx.device, gfx.size);

        let points = PointCloudPipeline::new(
            &gfx.device,
            shader_source,
            gfx.config.format,
            depth.format,
            layout,
        )?;

        let ubo = gfx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transform UBO"),
            size: TransformUniforms::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        log::info!(
            "Renderer ready: surface {:?} {}x{}",
            gfx.config.format,
            gfx.config.width,
            gfx.config.height
        );

        Ok(Self {
            gfx,
            depth,
            points,
            egui_renderer,
            window,
            ubo,
            storage: None,
            in_scope: false,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.depth.resize(&self.gfx.device, new_size);
        }
    }
}

impl GpuBackend for Renderer {
    type Target = wgpu::TextureView;

    fn acquire(&mut self) -> Result<(), RenderError> {
        if !self.gfx.is_usable() {
            return Err(RenderError::ContextUnavailable("device lost or out of memory".into()));
        }
        self.in_scope = true;
        Ok(())
    }

    fn release(&mut self) {
        // Flush any staged writes so they land before unrelated work.
        self.gfx.queue.submit(std::iter::empty());
        self.in_scope = false;
    }

    fn allocate_storage(&mut self, spec: StorageSpec) -> Result<(), RenderError> {
        let device = &self.gfx.device;

        let vtx = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Cloud Vertices"),
            size: spec.vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let color_tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Color Frame"),
            size: wgpu::Extent3d {
                width: spec.frame.width,
                height: spec.frame.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let color_view = color_tex.create_view(&wgpu::TextureViewDescriptor::default());
        let bind = self.points.create_bind_group(device, &self.ubo, &color_view);

        self.storage = Some(CloudStorage {
            vtx,
            color_tex,
            frame: spec.frame,
            bind,
        });
        Ok(())
    }

    fn write_vertices(&mut self, offset: u64, vertices: &[f32]) {
        debug_assert!(self.in_scope, "vertex write outside a context scope");
        let Some(storage) = &self.storage else {
            log::warn!("Vertex write before storage allocation; dropped");
            return;
        };
        self.gfx
            .queue
            .write_buffer(&storage.vtx, offset, bytemuck::cast_slice(vertices));
    }

    fn write_color(&mut self, rgba: &[u8]) {
        let Some(storage) = &self.storage else {
            log::warn!("Texture write before storage allocation; dropped");
            return;
        };
        let frame = storage.frame;
        self.gfx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &storage.color_tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(frame.width * RGBA_BYTES_PER_PIXEL as u32),
                rows_per_image: Some(frame.height),
            },
            wgpu::Extent3d {
                width: frame.width,
                height: frame.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn write_uniforms(&mut self, uniforms: &TransformUniforms) {
        self.gfx
            .queue
            .write_buffer(&self.ubo, 0, bytemuck::bytes_of(uniforms));
    }

    fn draw_points(&mut self, target: &wgpu::TextureView, vertex_count: u32) {
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Point Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Nothing allocated yet: the pass still clears the frame.
            if let Some(storage) = &self.storage {
                self.points
                    .draw(&mut pass, &storage.bind, &storage.vtx, vertex_count);
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }
}
