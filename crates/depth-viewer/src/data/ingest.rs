use crate::config::CloudSettings;
use crate::error::RenderError;
use crate::gpu::{ContextScope, GpuBackend, StorageSpec};
use depthframe::{
    convert_to_rgba, validate_pair, ColorFrame, DepthFrame, FrameDims, PointCloudBuffer, RawFrame,
    RGBA_BYTES_PER_PIXEL,
};

/// Running counters, shown on the HUD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: u64,
    pub rejected: u64,
    pub allocations: u64,
}

/// Turns depth/color pairs into in-place GPU buffer updates.
///
/// Vertex and texture storage are sized for the configured frame once, on
/// [`initialize`](Self::initialize) or the first accepted frame; every later
/// frame overwrites that storage.
pub struct FrameIngestPipeline {
    dims: FrameDims,
    depth_scale: f32,
    points: PointCloudBuffer,
    rgba: Vec<u8>,
    allocated: bool,
    stats: IngestStats,
}

impl FrameIngestPipeline {
    pub fn new(settings: &CloudSettings) -> Self {
        Self {
            dims: settings.dims,
            depth_scale: settings.depth_scale,
            points: PointCloudBuffer::with_capacity(settings.dims, settings.layout),
            rgba: Vec::with_capacity(settings.dims.pixel_count() * RGBA_BYTES_PER_PIXEL),
            allocated: false,
            stats: IngestStats::default(),
        }
    }

    #[inline]
    pub fn dims(&self) -> FrameDims {
        self.dims
    }

    #[inline]
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    #[inline]
    pub fn points(&self) -> &PointCloudBuffer {
        &self.points
    }

    /// Points to draw: buffer length / stride.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.points.vertex_count() as u32
    }

    fn ensure_storage<B: GpuBackend>(&mut self, backend: &mut B) -> Result<(), RenderError> {
        if self.allocated {
            return Ok(());
        }

        let spec = StorageSpec {
            frame: self.dims,
            vertex_bytes: self.points.full_size_bytes(),
        };
        backend.allocate_storage(spec)?;
        self.allocated = true;
        self.stats.allocations += 1;
        log::info!(
            "Allocated point-cloud storage: {} points, {} vertex bytes, {} texture",
            self.dims.pixel_count(),
            spec.vertex_bytes,
            self.dims
        );
        Ok(())
    }

    /// Allocates storage and uploads a flat grid so the first paint has
    /// something to draw.
    pub fn initialize<B: GpuBackend>(&mut self, backend: &mut B) -> Result<(), RenderError> {
        // An empty grid fails here, before any storage exists.
        let flat = DepthFrame::zeros(self.dims)?;

        let mut scope = ContextScope::acquire(backend)?;
        self.ensure_storage(&mut *scope)?;
        self.points.rebuild(&flat, self.depth_scale)?;
        scope.write_vertices(0, self.points.as_slice());
        scope.request_redraw();
        Ok(())
    }

    /// Validates the pair, then rebuilds the vertex stream, converts the
    /// color frame and overwrites both GPU resources.
    ///
    /// A pair that fails validation is dropped before anything is written.
    pub fn ingest<B: GpuBackend>(
        &mut self,
        backend: &mut B,
        depth: &DepthFrame,
        color: &ColorFrame,
    ) -> Result<(), RenderError> {
        if let Err(err) = validate_pair(depth, color, self.dims) {
            self.stats.rejected += 1;
            log::warn!("Rejected frame #{}: {}", self.stats.rejected, err);
            return Err(err.into());
        }

        let mut scope = ContextScope::acquire(backend)?;
        self.ensure_storage(&mut *scope)?;

        self.points.rebuild(depth, self.depth_scale)?;
        scope.write_vertices(0, self.points.as_slice());

        convert_to_rgba(color, &mut self.rgba);
        scope.write_color(&self.rgba);

        scope.request_redraw();
        self.stats.accepted += 1;
        log::debug!(
            "Ingested frame #{} ({} points)",
            self.stats.accepted,
            self.points.vertex_count()
        );
        Ok(())
    }

    /// Same as [`ingest`](Self::ingest) for untyped frames; format errors count
    /// as rejections.
    pub fn ingest_raw<B: GpuBackend>(
        &mut self,
        backend: &mut B,
        depth: RawFrame,
        color: RawFrame,
    ) -> Result<(), RenderError> {
        let typed = DepthFrame::from_raw(depth).and_then(|d| ColorFrame::from_raw(color).map(|c| (d, c)));
        match typed {
            Ok((depth, color)) => self.ingest(backend, &depth, &color),
            Err(err) => {
                self.stats.rejected += 1;
                log::warn!("Rejected frame #{}: {}", self.stats.rejected, err);
                Err(err.into())
            }
        }
    }
}
