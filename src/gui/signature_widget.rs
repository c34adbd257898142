use crate::signature::{PointerSource, SignaturePad};
use eframe::egui::{
    self, Color32, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, TouchPhase, Vec2,
};

const PAD_HEIGHT: f32 = 160.0;
const CORNER_RADIUS: f32 = 6.0;

/// Hosts the [`SignaturePad`] inside egui: translates viewport pointer
/// positions into surface-local coordinates (by subtracting the widget
/// rect's origin), routes touch contacts and pointer drags into the pad's
/// begin/extend/end contract, and keeps an uploaded texture of the pad
/// bitmap, re-uploading only when the pad's revision changes.
pub struct SignatureWidget {
    texture: Option<TextureHandle>,
    uploaded_revision: Option<u64>,
}

impl SignatureWidget {
    pub fn new() -> Self {
        Self {
            texture: None,
            uploaded_revision: None,
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, pad: &mut SignaturePad) -> egui::Response {
        let width = ui.available_width();
        let (rect, response) = ui.allocate_exact_size(Vec2::new(width, PAD_HEIGHT), Sense::drag());
        pad.set_viewport((rect.width(), rect.height()), ui.ctx().pixels_per_point());

        let to_local = |pos: Pos2| (pos.x - rect.min.x, pos.y - rect.min.y);

        // Touch contacts are routed as their own source. Stylus input
        // arrives from winit as pointer events, so pen strokes come in
        // through the drag path below; the pad's first-active-source rule
        // keeps a contact and its synthesized pointer events from opening
        // two strokes.
        let touches: Vec<(TouchPhase, Pos2)> = ui.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Touch { phase, pos, .. } => Some((*phase, *pos)),
                    _ => None,
                })
                .collect()
        });
        for (phase, pos) in touches {
            match phase {
                TouchPhase::Start => {
                    if rect.contains(pos) {
                        pad.begin(PointerSource::Touch, to_local(pos));
                    }
                }
                TouchPhase::Move => pad.extend(PointerSource::Touch, to_local(pos)),
                TouchPhase::End | TouchPhase::Cancel => pad.end(PointerSource::Touch),
            }
        }

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                pad.begin(PointerSource::Mouse, to_local(pos));
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                pad.extend(PointerSource::Mouse, to_local(pos));
            }
        }
        if response.drag_stopped() {
            pad.end(PointerSource::Mouse);
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, CORNER_RADIUS, Color32::WHITE);

        if self.uploaded_revision != Some(pad.revision()) {
            let (pixels, (width, height)) = pad.pixels();
            let image =
                egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], pixels);
            self.texture =
                Some(ui.ctx().load_texture("signature_pad", image, TextureOptions::LINEAR));
            self.uploaded_revision = Some(pad.revision());
        }
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        painter.rect_stroke(rect, CORNER_RADIUS, Stroke::new(1.0, Color32::GRAY));
        if pad.is_disabled() {
            painter.rect_filled(rect, CORNER_RADIUS, Color32::from_black_alpha(20));
        }

        response
    }
}
