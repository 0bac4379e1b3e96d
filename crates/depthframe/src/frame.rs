//! Frame types and their shape/format validation.

use crate::error::FrameError;
use std::fmt;

/// Width and height of a frame in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameDims {
    pub width: u32,
    pub height: u32,
}

impl FrameDims {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels (and therefore point-cloud vertices).
    #[inline]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for FrameDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Element layout of a [`RawFrame`] payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One `f32` per pixel.
    Depth32F,
    /// One `u16` per pixel (raw sensor units).
    Depth16U,
    Gray8,
    Bgr8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Depth32F => 4,
            PixelFormat::Depth16U => 2,
            PixelFormat::Gray8 => 1,
            PixelFormat::Bgr8 | PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PixelFormat::Depth32F => "depth32f",
            PixelFormat::Depth16U => "depth16u",
            PixelFormat::Gray8 => "gray8",
            PixelFormat::Bgr8 => "bgr8",
            PixelFormat::Rgb8 => "rgb8",
            PixelFormat::Rgba8 => "rgba8",
        };

        f.write_str(s)
    }
}

/// An untyped frame as handed over by a device or a file loader.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub dims: FrameDims,
    pub format: PixelFormat,
    /// Little-endian, tightly packed, row-major.
    pub bytes: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, format: PixelFormat, bytes: Vec<u8>) -> Self {
        Self {
            dims: FrameDims::new(width, height),
            format,
            bytes,
        }
    }

    fn check_payload(&self) -> Result<(), FrameError> {
        if self.dims.is_empty() || self.bytes.is_empty() {
            return Err(FrameError::Empty);
        }

        let expected = self.dims.pixel_count() * self.format.bytes_per_pixel();
        if self.bytes.len() != expected {
            return Err(FrameError::LengthMismatch {
                dims: self.dims,
                expected,
                actual: self.bytes.len(),
            });
        }

        Ok(())
    }
}

fn check_len(dims: FrameDims, expected: usize, actual: usize) -> Result<(), FrameError> {
    if dims.is_empty() || actual == 0 {
        return Err(FrameError::Empty);
    }
    if actual != expected {
        return Err(FrameError::LengthMismatch {
            dims,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_dims(expected: FrameDims, actual: FrameDims) -> Result<(), FrameError> {
    if expected != actual {
        return Err(FrameError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Single-channel `f32` depth grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    dims: FrameDims,
    values: Vec<f32>,
}

impl DepthFrame {
    /// Wraps row-major depth values. Fails if empty or if the length does not
    /// match `width * height`.
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self, FrameError> {
        let dims = FrameDims::new(width, height);
        check_len(dims, dims.pixel_count(), values.len())?;
        Ok(Self { dims, values })
    }

    /// A flat frame at depth zero.
    pub fn zeros(dims: FrameDims) -> Result<Self, FrameError> {
        Self::new(dims.width, dims.height, vec![0.0; dims.pixel_count()])
    }

    /// Accepts only `Depth32F` payloads; every other format is rejected
    /// rather than converted.
    pub fn from_raw(raw: RawFrame) -> Result<Self, FrameError> {
        if raw.format != PixelFormat::Depth32F {
            return Err(FrameError::UnexpectedFormat {
                expected: "depth32f",
                actual: raw.format,
            });
        }
        raw.check_payload()?;

        let values = raw
            .bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Self {
            dims: raw.dims,
            values,
        })
    }

    #[inline]
    pub fn dims(&self) -> FrameDims {
        self.dims
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.dims.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.dims.height
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// `None` outside the grid; `x` never wraps into the next row.
    #[inline]
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.dims.width || y >= self.dims.height {
            return None;
        }
        Some(self.values[y as usize * self.dims.width as usize + x as usize])
    }

    pub fn row(&self, y: u32) -> Option<&[f32]> {
        if y >= self.dims.height {
            return None;
        }
        let w = self.dims.width as usize;
        let start = y as usize * w;
        Some(&self.values[start..start + w])
    }

    /// Rejects frames whose size differs from the configured capacity.
    pub fn validate_against(&self, expected: FrameDims) -> Result<(), FrameError> {
        check_dims(expected, self.dims)
    }
}

/// Byte order of the three color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    Bgr,
    Rgb,
}

/// 3-channel 8-bit image aligned with a [`DepthFrame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorFrame {
    dims: FrameDims,
    order: ChannelOrder,
    bytes: Vec<u8>,
}

impl ColorFrame {
    pub fn new(width: u32, height: u32, order: ChannelOrder, bytes: Vec<u8>) -> Result<Self, FrameError> {
        let dims = FrameDims::new(width, height);
        check_len(dims, dims.pixel_count() * 3, bytes.len())?;
        Ok(Self { dims, order, bytes })
    }

    /// Accepts `Bgr8` and `Rgb8`; other channel counts or element types are
    /// rejected.
    pub fn from_raw(raw: RawFrame) -> Result<Self, FrameError> {
        let order = match raw.format {
            PixelFormat::Bgr8 => ChannelOrder::Bgr,
            PixelFormat::Rgb8 => ChannelOrder::Rgb,
            other => {
                return Err(FrameError::UnexpectedFormat {
                    expected: "bgr8 or rgb8",
                    actual: other,
                })
            }
        };
        raw.check_payload()?;

        Ok(Self {
            dims: raw.dims,
            order,
            bytes: raw.bytes,
        })
    }

    #[inline]
    pub fn dims(&self) -> FrameDims {
        self.dims
    }

    #[inline]
    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn validate_against(&self, expected: FrameDims) -> Result<(), FrameError> {
        check_dims(expected, self.dims)
    }
}

/// Checks a depth/color pair against the configured size. The depth frame is
/// checked first so a pair that is wrong in both reports the depth error.
pub fn validate_pair(
    depth: &DepthFrame,
    color: &ColorFrame,
    expected: FrameDims,
) -> Result<(), FrameError> {
    depth.validate_against(expected)?;
    if color.dims != depth.dims {
        return Err(FrameError::SizeMismatch {
            depth: depth.dims,
            color: color.dims,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn depth_frame_rejects_empty_and_short_payloads() {
        assert_eq!(DepthFrame::new(0, 4, vec![]), Err(FrameError::Empty));
        assert_eq!(
            DepthFrame::new(2, 2, vec![0.0; 3]),
            Err(FrameError::LengthMismatch {
                dims: FrameDims::new(2, 2),
                expected: 4,
                actual: 3,
            })
        );
    }

    #[test]
    fn raw_depth_requires_f32_elements() {
        let raw = RawFrame::new(2, 1, PixelFormat::Depth16U, vec![0; 4]);
        assert!(matches!(
            DepthFrame::from_raw(raw),
            Err(FrameError::UnexpectedFormat { actual: PixelFormat::Depth16U, .. })
        ));

        let raw = RawFrame::new(2, 1, PixelFormat::Depth32F, depth_bytes(&[1.5, -2.0]));
        let frame = DepthFrame::from_raw(raw).unwrap();
        assert_eq!(frame.values(), &[1.5, -2.0]);
        assert_eq!(frame.depth_at(1, 0), Some(-2.0));
    }

    #[test]
    fn raw_color_requires_three_channels() {
        let raw = RawFrame::new(1, 1, PixelFormat::Rgba8, vec![1, 2, 3, 4]);
        assert!(matches!(
            ColorFrame::from_raw(raw),
            Err(FrameError::UnexpectedFormat { actual: PixelFormat::Rgba8, .. })
        ));

        let raw = RawFrame::new(1, 1, PixelFormat::Bgr8, vec![1, 2, 3]);
        let frame = ColorFrame::from_raw(raw).unwrap();
        assert_eq!(frame.order(), ChannelOrder::Bgr);
    }

    #[test]
    fn pair_validation_checks_configured_size_then_alignment() {
        let expected = FrameDims::new(2, 2);
        let depth = DepthFrame::zeros(expected).unwrap();
        let color = ColorFrame::new(2, 2, ChannelOrder::Bgr, vec![0; 12]).unwrap();
        assert_eq!(validate_pair(&depth, &color, expected), Ok(()));

        let wrong_depth = DepthFrame::zeros(FrameDims::new(3, 2)).unwrap();
        assert!(matches!(
            validate_pair(&wrong_depth, &color, expected),
            Err(FrameError::DimensionMismatch { .. })
        ));

        let wrong_color = ColorFrame::new(1, 2, ChannelOrder::Bgr, vec![0; 6]).unwrap();
        assert!(matches!(
            validate_pair(&depth, &wrong_color, expected),
            Err(FrameError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn rows_are_row_major() {
        let frame = DepthFrame::new(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(frame.row(1), Some(&[3.0, 4.0, 5.0][..]));
        assert_eq!(frame.row(2), None);
    }

    #[test]
    fn lookups_outside_the_grid_do_not_wrap() {
        let frame = DepthFrame::new(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(frame.depth_at(2, 0), Some(2.0));
        assert_eq!(frame.depth_at(3, 0), None);
        assert_eq!(frame.depth_at(0, 2), None);
    }
}
