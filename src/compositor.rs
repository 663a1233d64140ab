use crate::error::DecodeError;
use crate::lzw;
use crate::types::{DisposalMethod, FrameRecord, FrameRect, GifFile, Rgb};

use log::debug;

/// Strategy for order-dependent frame materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Keep a snapshot of every composited frame. Arbitrary-order access
    /// is O(1) after the first visit, at the cost of one canvas worth of
    /// memory per frame.
    #[default]
    MemoizeFrames,
    /// Keep only the running canvas and replay from frame 0 whenever an
    /// earlier frame is requested again.
    RecomputeFromStart,
}

/// Applies disposal-method rules to merge decoded frames onto the running
/// RGBA canvas. The canvas always reflects frames `0..composited` drawn in
/// order.
#[derive(Debug)]
pub(crate) struct FrameCompositor {
    policy: CachePolicy,
    screen_width: usize,
    background: [u8; 4],
    canvas: Vec<u8>,
    composited: usize,
    /// Canvas from before the most recent RestoreToPrevious frame drew.
    previous: Option<Vec<u8>>,
    memo: Vec<Option<Vec<u8>>>,
}

impl FrameCompositor {
    pub(crate) fn new(file: &GifFile, policy: CachePolicy) -> Self {
        let background = background_color(file);
        let len = file.screen_width as usize * file.screen_height as usize * 4;
        let mut canvas = vec![0; len];
        fill(&mut canvas, background);

        FrameCompositor {
            policy,
            screen_width: file.screen_width as usize,
            background,
            canvas,
            composited: 0,
            previous: None,
            memo: vec![None; file.frames.len()],
        }
    }

    /// Returns the fully composited RGBA buffer for frame `index`.
    pub(crate) fn materialize(
        &mut self,
        file: &GifFile,
        index: usize,
    ) -> Result<Vec<u8>, DecodeError> {
        if let Some(cached) = self.memo.get(index).and_then(|m| m.as_ref()) {
            return Ok(cached.clone());
        }

        // Going backwards means replaying the whole sequence; the canvas
        // only ever steps forward.
        if self.composited > index + 1 {
            debug!("rewinding canvas to replay frames 0..={}", index);
            self.reset();
        }
        while self.composited <= index {
            self.step(file, self.composited)?;
        }

        Ok(self.canvas.clone())
    }

    fn reset(&mut self) {
        fill(&mut self.canvas, self.background);
        self.composited = 0;
        self.previous = None;
    }

    /// Advances the canvas from state `k - 1` to state `k`: dispose of
    /// frame `k - 1`, then paint frame `k`.
    ///
    /// Everything fallible (LZW decode, color table resolution, index
    /// validation) happens before the first canvas mutation, so a frame
    /// that fails to decode leaves the canvas exactly in state
    /// `composited` and other frames remain materializable.
    fn step(&mut self, file: &GifFile, k: usize) -> Result<(), DecodeError> {
        let frame = &file.frames[k];
        let raster = decode_raster(frame)?;
        let table = frame
            .local_color_table
            .as_ref()
            .or(file.global_color_table.as_ref())
            .ok_or(DecodeError::MissingColorTable)?;
        for &index in &raster {
            if frame.transparent_index != Some(index) && index as usize >= table.len() {
                return Err(DecodeError::InvalidColorIndex {
                    index,
                    table_len: table.len(),
                });
            }
        }

        if let Some(prev) = k.checked_sub(1).map(|p| &file.frames[p]) {
            match prev.disposal {
                DisposalMethod::None | DisposalMethod::DoNotDispose => {}
                DisposalMethod::RestoreToBackgroundColor => {
                    self.fill_rect(prev.rect, self.background)
                }
                DisposalMethod::RestoreToPrevious => {
                    if let Some(snapshot) = self.previous.take() {
                        self.canvas = snapshot;
                    }
                }
            }
        }

        self.previous = (frame.disposal == DisposalMethod::RestoreToPrevious)
            .then(|| self.canvas.clone());

        self.paint(frame, &raster, table);

        self.composited = k + 1;
        if self.policy == CachePolicy::MemoizeFrames {
            self.memo[k] = Some(self.canvas.clone());
        }
        Ok(())
    }

    /// Paints the frame's non-transparent pixels through its effective
    /// color table. Transparent pixels leave the canvas untouched.
    /// Indices were validated against `table` in [`FrameCompositor::step`].
    fn paint(&mut self, frame: &FrameRecord, raster: &[u8], table: &[Rgb]) {
        let FrameRect {
            left,
            top,
            width,
            height,
        } = frame.rect;

        for y in 0..height as usize {
            for x in 0..width as usize {
                let index = raster[y * width as usize + x];
                if frame.transparent_index == Some(index) {
                    continue;
                }
                let rgb = table[index as usize];
                let offset = ((top as usize + y) * self.screen_width + left as usize + x) * 4;
                self.canvas[offset..offset + 4].copy_from_slice(&[rgb.r, rgb.g, rgb.b, 0xff]);
            }
        }
    }

    fn fill_rect(&mut self, rect: FrameRect, pixel: [u8; 4]) {
        for y in 0..rect.height as usize {
            let row = (rect.top as usize + y) * self.screen_width + rect.left as usize;
            for x in 0..rect.width as usize {
                let offset = (row + x) * 4;
                self.canvas[offset..offset + 4].copy_from_slice(&pixel);
            }
        }
    }
}

/// Decompresses a frame's raster and undoes interlacing, yielding indices
/// in plain left-to-right, top-to-bottom order.
fn decode_raster(frame: &FrameRecord) -> Result<Vec<u8>, DecodeError> {
    let mut indices = lzw::decode(
        &frame.lzw_data,
        frame.minimum_code_size,
        frame.rect.pixel_count(),
    )?;
    if frame.interlaced {
        indices = deinterlace(&indices, frame.rect.width as usize);
    }
    Ok(indices)
}

/// Reorders interlaced rows into sequential order. See GIF89a appendix E
/// for the four-pass layout.
fn deinterlace(indices: &[u8], width: usize) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }

    let rows = indices.len() / width;
    let mut out = vec![0; indices.len()];

    const OFFSETS: [usize; 4] = [0, 4, 2, 1];
    const STEPS: [usize; 4] = [8, 8, 4, 2];

    let mut from_row = 0;
    for pass in 0..4 {
        let mut to_row = OFFSETS[pass];
        while to_row < rows {
            out[to_row * width..(to_row + 1) * width]
                .copy_from_slice(&indices[from_row * width..(from_row + 1) * width]);
            from_row += 1;
            to_row += STEPS[pass];
        }
    }
    out
}

/// The color used for the initial canvas and RestoreToBackgroundColor
/// clears: the declared background entry when a global color table exists,
/// otherwise transparent black.
fn background_color(file: &GifFile) -> [u8; 4] {
    match file
        .global_color_table
        .as_ref()
        .and_then(|table| table.get(file.background_color_index as usize))
    {
        Some(rgb) => [rgb.r, rgb.g, rgb.b, 0xff],
        None => [0, 0, 0, 0],
    }
}

fn fill(canvas: &mut [u8], pixel: [u8; 4]) {
    for chunk in canvas.chunks_exact_mut(4) {
        chunk.copy_from_slice(&pixel);
    }
}
