use crate::error::RenderError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use winit::window::Window;

/// Shared flag raised from wgpu callbacks once the device is beyond use.
#[derive(Debug, Clone, Default)]
pub struct DeviceHealth {
    lost: Arc<AtomicBool>,
}

impl DeviceHealth {
    pub fn mark_lost(&self, why: &str) {
        if !self.lost.swap(true, Ordering::AcqRel) {
            log::error!("GPU device unusable: {}", why);
        }
    }

    #[inline]
    pub fn is_usable(&self) -> bool {
        !self.lost.load(Ordering::Acquire)
    }

    /// Hooks both failure paths: uncaptured out-of-memory and device loss.
    pub fn watch(&self, device: &wgpu::Device) {
        let on_error = self.clone();
        device.on_uncaptured_error(Box::new(move |err| {
            log::error!("Uncaptured GPU error: {}", err);
            if matches!(err, wgpu::Error::OutOfMemory { .. }) {
                on_error.mark_lost("out of memory");
            }
        }));

        let on_lost = self.clone();
        device.set_device_lost_callback(move |reason, message| {
            on_lost.mark_lost(&format!("device lost ({:?}): {}", reason, message));
        });
    }
}

/// Holds all GPU resources needed for rendering.
pub struct GfxContext {
    pub surface: wgpu::Surface<'static>,
    pub device:  wgpu::Device,
    pub queue:   wgpu::Queue,
    pub config:  wgpu::SurfaceConfiguration,
    pub size:    winit::dpi::PhysicalSize<u32>,
    health:      DeviceHealth,
}

impl GfxContext {
    /// Creates a new graphics context bound to the given window.
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        // The surface must outlive the window; `Arc` guarantees this.
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| RenderError::ContextUnavailable(format!("surface: {e}")))?;

        // Choose a high‑performance adapter compatible with the surface.
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference:         wgpu::PowerPreference::HighPerformance,
                compatible_surface:       Some(&surface),
                force_fallback_adapter:   false,
            })
            .await
            .ok_or_else(|| RenderError::ContextUnavailable("no suitable GPU adapter".into()))?;

        log::info!("Using adapter: {:?}", adapter.get_info());

        // Request a device and its command queue.
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label:            Some("Depth Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    // Use default limits for broad compatibility.
                    required_limits:   wgpu::Limits::default(),
                },
                None, // no trace
            )
            .await
            .map_err(|e| RenderError::ContextUnavailable(format!("device: {e}")))?;

        let health = DeviceHealth::default();
        health.watch(&device);

        // Determine the surface format (prefer sRGB).
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| RenderError::ContextUnavailable("surface reports no formats".into()))?;

        // Configure the surface.
        let config = wgpu::SurfaceConfiguration {
            usage:                       wgpu::TextureUsages::RENDER_ATTACHMENT,
            format:                      surface_format,
            width:                       size.width.max(1),
            height:                      size.height.max(1),
            present_mode:                wgpu::PresentMode::Fifo, // V‑sync
            alpha_mode:                  caps.alpha_modes[0],
            view_formats:                vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            health,
        })
    }

    /// False once the device has failed in a way later calls cannot recover from.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.health.is_usable()
    }

    /// Resizes the swap chain when the window size changes.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_is_sticky_and_shared_between_clones() {
        let health = DeviceHealth::default();
        let callback_side = health.clone();
        assert!(health.is_usable());

        callback_side.mark_lost("device lost (Unknown): driver reset");
        assert!(!health.is_usable());
        callback_side.mark_lost("out of memory");
        assert!(!health.is_usable());
    }
}
