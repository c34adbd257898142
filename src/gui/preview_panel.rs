use crate::record::Projection;
use crate::signature::SignatureImage;
use eframe::egui::{self, Color32, RichText, TextureHandle, TextureOptions, Vec2};

const SIGNATURE_BOX_HEIGHT: f32 = 128.0;

/// Renders the sheet exactly as the projector reports it: the live draft
/// while editing, the frozen snapshot once sealed. The signature is decoded
/// from the projection's own image so a sealed preview can never drift from
/// what was sealed.
pub struct PreviewPanel {
    signature_texture: Option<(SignatureCacheKey, TextureHandle)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SignatureCacheKey(String);

impl SignatureCacheKey {
    fn for_image(image: &SignatureImage) -> Self {
        // Length plus the base64 tail is enough to tell two rasters apart
        // without hashing the whole data url every frame.
        let s = image.as_str();
        let tail_start = s.len().saturating_sub(32);
        Self(format!("{}:{}", s.len(), &s[tail_start..]))
    }
}

impl PreviewPanel {
    pub fn new() -> Self {
        Self {
            signature_texture: None,
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, view: &Projection<'_>) {
        let fields = view.fields;

        ui.horizontal(|ui| {
            ui.heading("Signed Timesheet");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new("Preview").small().weak());
            });
        });

        if let Some(seal) = &view.seal {
            ui.colored_label(
                Color32::DARK_GREEN,
                format!(
                    "Sealed {} — verification {}",
                    seal.sealed_at.format("%Y-%m-%d %H:%M"),
                    seal.verification_id.short()
                ),
            );
        }
        ui.separator();

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(&fields.company).strong());
                ui.label(RichText::new("Work Order / Timesheet").weak());
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                ui.vertical(|ui| {
                    ui.label(format!("Job: {}", or_dash(&fields.job_number)));
                    ui.label(format!("Date: {}", fields.date));
                });
            });
        });
        ui.separator();

        egui::Grid::new("preview_fields")
            .num_columns(2)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Client").weak());
                ui.label(RichText::new("Site").weak());
                ui.end_row();
                ui.label(or_dash(&fields.client));
                ui.label(or_dash(&fields.site));
                ui.end_row();
            });

        egui::Grid::new("preview_times")
            .num_columns(4)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Start").weak());
                ui.label(RichText::new("Finish").weak());
                ui.label(RichText::new("Break (min)").weak());
                ui.label(RichText::new("Hours").weak());
                ui.end_row();
                ui.label(or_dash(&fields.start));
                ui.label(or_dash(&fields.finish));
                ui.label(fields.break_minutes.to_string());
                ui.label(or_dash(&fields.hours));
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.label(RichText::new("Work Description").weak());
        ui.label(or_dash(&fields.description));

        if !fields.materials.is_empty() {
            ui.add_space(6.0);
            ui.label(RichText::new("Materials / Extras").weak());
            ui.label(&fields.materials);
        }

        ui.add_space(6.0);
        egui::Grid::new("preview_people")
            .num_columns(2)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Employee").weak());
                ui.label(RichText::new("Client Name").weak());
                ui.end_row();
                ui.label(or_dash(&fields.employee));
                ui.label(or_dash(&fields.client_name));
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.label(RichText::new("Client Signature").weak());
        self.signature_box(ui, view.signature);

        ui.add_space(4.0);
        ui.label(
            RichText::new(
                "By signing, the client confirms the above work was completed \
                 satisfactorily and authorises invoicing.",
            )
            .small()
            .weak(),
        );
    }

    fn signature_box(&mut self, ui: &mut egui::Ui, image: &SignatureImage) {
        let width = ui.available_width();
        egui::Frame::none()
            .stroke(egui::Stroke::new(1.0, Color32::GRAY))
            .rounding(4.0)
            .fill(Color32::WHITE)
            .show(ui, |ui| {
                ui.set_min_size(Vec2::new(width, SIGNATURE_BOX_HEIGHT));
                if image.is_empty() {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("Awaiting signature…").weak());
                    });
                    return;
                }
                match self.texture_for(ui.ctx(), image) {
                    Some(texture) => {
                        let tex_size = texture.size_vec2();
                        let scale =
                            (width / tex_size.x).min(SIGNATURE_BOX_HEIGHT / tex_size.y).min(1.0);
                        let sized = egui::load::SizedTexture::new(texture.id(), tex_size * scale);
                        ui.centered_and_justified(|ui| {
                            ui.add(egui::Image::new(sized));
                        });
                    }
                    None => {
                        ui.centered_and_justified(|ui| {
                            ui.colored_label(Color32::RED, "signature image unreadable");
                        });
                    }
                }
            });
    }

    fn texture_for(
        &mut self,
        ctx: &egui::Context,
        image: &SignatureImage,
    ) -> Option<&TextureHandle> {
        let key = SignatureCacheKey::for_image(image);
        let stale = match &self.signature_texture {
            Some((cached, _)) => cached != &key,
            None => true,
        };
        if stale {
            let decoded = image
                .png_bytes()
                .ok()
                .and_then(|png| image::load_from_memory(&png).ok())?;
            let rgba = decoded.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            let texture = ctx.load_texture("preview_signature", color_image, TextureOptions::LINEAR);
            self.signature_texture = Some((key, texture));
        }
        self.signature_texture.as_ref().map(|(_, tex)| tex)
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "—"
    } else {
        value
    }
}
