//! Channel-order conversion for texture upload.

use crate::frame::{ChannelOrder, ColorFrame};
use rayon::prelude::*;

pub const RGBA_BYTES_PER_PIXEL: usize = 4;

/// Expands `frame` into tightly packed RGBA8 with opaque alpha, reusing `out`.
///
/// `out` is resized to `pixel_count * 4`; once it has that capacity no further
/// allocation happens.
pub fn convert_to_rgba(frame: &ColorFrame, out: &mut Vec<u8>) {
    out.resize(frame.dims().pixel_count() * RGBA_BYTES_PER_PIXEL, 0);

    let order = frame.order();
    out.par_chunks_exact_mut(RGBA_BYTES_PER_PIXEL)
        .zip(frame.bytes().par_chunks_exact(3))
        .for_each(|(dst, src)| {
            let (r, g, b) = match order {
                ChannelOrder::Bgr => (src[2], src[1], src[0]),
                ChannelOrder::Rgb => (src[0], src[1], src[2]),
            };
            dst[0] = r;
            dst[1] = g;
            dst[2] = b;
            dst[3] = u8::MAX;
        });
}

pub fn to_rgba(frame: &ColorFrame) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.dims().pixel_count() * RGBA_BYTES_PER_PIXEL);
    convert_to_rgba(frame, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgr_is_swapped_and_made_opaque() {
        let frame = ColorFrame::new(2, 1, ChannelOrder::Bgr, vec![10, 20, 30, 40, 50, 60]).unwrap();
        assert_eq!(to_rgba(&frame), vec![30, 20, 10, 255, 60, 50, 40, 255]);
    }

    #[test]
    fn rgb_keeps_order() {
        let frame = ColorFrame::new(1, 1, ChannelOrder::Rgb, vec![1, 2, 3]).unwrap();
        assert_eq!(to_rgba(&frame), vec![1, 2, 3, 255]);
    }

    #[test]
    fn scratch_buffer_is_reused() {
        let frame = ColorFrame::new(4, 4, ChannelOrder::Bgr, vec![7; 48]).unwrap();
        let mut scratch = Vec::with_capacity(64);
        convert_to_rgba(&frame, &mut scratch);
        let ptr = scratch.as_ptr();
        convert_to_rgba(&frame, &mut scratch);
        assert_eq!(scratch.as_ptr(), ptr);
        assert_eq!(scratch.len(), 64);
    }
}
