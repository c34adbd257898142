use crate::signature::encode::{encode_png, to_data_url, SignatureImage};
use crate::signature::input::{PointerSource, StrokeInput};
use crate::signature::model::{SignatureCanvas, INK, STROKE_WIDTH};
use crate::signature::render::rasterize;

pub type ChangeListener = Box<dyn FnMut(SignatureImage)>;

/// The signature capture surface. Turns begin/extend/end pointer samples
/// into strokes, keeps a bitmap at the current device resolution, and
/// reports the full encoded bitmap to the registered listener whenever a
/// stroke completes or the surface is cleared.
///
/// Positions are surface-local logical coordinates; the hosting widget
/// subtracts the surface's on-screen origin before calling in. The pad has
/// no knowledge of the record it signs.
pub struct SignaturePad {
    input: StrokeInput,
    canvas: SignatureCanvas,
    logical_size: (f32, f32),
    pixel_ratio: f32,
    disabled: bool,
    listener: Option<ChangeListener>,
    bitmap: Vec<u8>,
    revision: u64,
    rendered_revision: Option<u64>,
}

impl SignaturePad {
    pub fn new(logical_size: (f32, f32)) -> Self {
        Self {
            input: StrokeInput::default(),
            canvas: SignatureCanvas::default(),
            logical_size,
            pixel_ratio: 1.0,
            disabled: false,
            listener: None,
            bitmap: Vec::new(),
            revision: 0,
            rendered_revision: None,
        }
    }

    pub fn set_change_listener(&mut self, listener: ChangeListener) {
        self.listener = Some(listener);
    }

    /// Lock or unlock the surface. While disabled every mutating call is a
    /// no-op; an in-progress stroke is dropped uncommitted.
    pub fn set_disabled(&mut self, disabled: bool) {
        if disabled && self.input.is_open() {
            self.input.cancel();
            self.bump();
        }
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Track the displayed size and device pixel ratio. A change invalidates
    /// the bitmap; strokes are replayed at the new resolution with the same
    /// logical line width and round caps.
    pub fn set_viewport(&mut self, logical_size: (f32, f32), pixel_ratio: f32) {
        let pixel_ratio = pixel_ratio.max(1.0);
        if self.logical_size != logical_size || self.pixel_ratio != pixel_ratio {
            self.logical_size = logical_size;
            self.pixel_ratio = pixel_ratio;
            self.bump();
        }
    }

    pub fn begin(&mut self, source: PointerSource, pos: (f32, f32)) {
        if self.disabled {
            return;
        }
        if self.input.begin(source, pos) {
            self.bump();
        }
    }

    pub fn extend(&mut self, source: PointerSource, pos: (f32, f32)) {
        if self.disabled {
            return;
        }
        if self.input.extend(source, pos) {
            self.bump();
        }
    }

    /// Close the current stroke and emit the full surface bitmap as an
    /// encoded image. No-op while disabled or when `source` does not own an
    /// open stroke.
    pub fn end(&mut self, source: PointerSource) {
        if self.disabled {
            return;
        }
        let Some(path) = self.input.end(source) else {
            return;
        };
        self.canvas.push(path);
        self.bump();

        let (width, height) = self.device_size();
        self.render_if_stale();
        match encode_png(&self.bitmap, width, height) {
            Ok(png) => {
                let image = SignatureImage::from_data_url(to_data_url(&png));
                self.emit(image);
            }
            Err(err) => tracing::error!("failed to encode signature bitmap: {err:#}"),
        }
    }

    /// Erase the surface and notify the listener with an empty image.
    pub fn clear(&mut self) {
        if self.disabled {
            return;
        }
        self.input.cancel();
        self.canvas.clear();
        self.bump();
        self.emit(SignatureImage::empty());
    }

    pub fn is_blank(&self) -> bool {
        self.canvas.is_empty() && !self.input.is_open()
    }

    /// Monotonic counter bumped on every visual change; lets the hosting
    /// widget skip texture re-uploads for unchanged frames.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn device_size(&self) -> (u32, u32) {
        (
            (self.logical_size.0 * self.pixel_ratio).round().max(1.0) as u32,
            (self.logical_size.1 * self.pixel_ratio).round().max(1.0) as u32,
        )
    }

    /// Current bitmap pixels (RGBA, device resolution), re-rasterized on
    /// demand after any change.
    pub fn pixels(&mut self) -> (&[u8], (u32, u32)) {
        self.render_if_stale();
        (&self.bitmap, self.device_size())
    }

    fn render_if_stale(&mut self) {
        if self.rendered_revision == Some(self.revision) && !self.bitmap.is_empty() {
            return;
        }
        let (width, height) = self.device_size();
        self.bitmap = rasterize(
            &self.canvas,
            self.input.active_path(),
            width,
            height,
            self.pixel_ratio,
            STROKE_WIDTH,
            INK,
        );
        self.rendered_revision = Some(self.revision);
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn emit(&mut self, image: SignatureImage) {
        if let Some(listener) = self.listener.as_mut() {
            listener(image);
        }
    }
}
