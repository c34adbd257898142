pub mod preview_panel;
pub mod signature_widget;

use crate::address_book::AddressBook;
use crate::export::{export_filename, FileExporter, SheetExporter};
use crate::mail;
use crate::record::{SheetMachine, SignatureOutcome, TimesheetDraft, MAX_ADMIN_RECIPIENTS};
use crate::send::{
    Attachment, HttpMailTransport, MailTransport, OutgoingMail, SignIn, StoredCredential,
};
use crate::settings::{Settings, SETTINGS_FILE};
use crate::signature::{SignatureImage, SignaturePad};
use eframe::egui::{self, Color32, RichText};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use preview_panel::PreviewPanel;
use signature_widget::SignatureWidget;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

const PAD_LOGICAL_SIZE: (f32, f32) = (320.0, 160.0);

pub struct SignoffApp {
    settings: Settings,
    machine: SheetMachine,
    pad: SignaturePad,
    pad_inbox: Rc<RefCell<Vec<SignatureImage>>>,
    signature_widget: SignatureWidget,
    preview: PreviewPanel,
    address_book: AddressBook,
    address_book_path: PathBuf,
    set_as_default: bool,
    toasts: Toasts,
    confirm_unseal: bool,
}

impl SignoffApp {
    pub fn new(settings: Settings, address_book: AddressBook, address_book_path: PathBuf) -> Self {
        let draft = seeded_draft(&settings, &address_book);
        let machine = SheetMachine::new(draft, settings.seal_on_signature);

        let pad_inbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pad_inbox);
        let mut pad = SignaturePad::new(PAD_LOGICAL_SIZE);
        pad.set_change_listener(Box::new(move |image| sink.borrow_mut().push(image)));

        Self {
            settings,
            machine,
            pad,
            pad_inbox,
            signature_widget: SignatureWidget::new(),
            preview: PreviewPanel::new(),
            address_book,
            address_book_path,
            set_as_default: true,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            confirm_unseal: false,
        }
    }

    pub fn add_toast(&mut self, kind: ToastKind, text: impl Into<String>) {
        if !self.settings.enable_toasts {
            return;
        }
        self.toasts.add(Toast {
            text: text.into().into(),
            kind,
            options: ToastOptions::default()
                .duration_in_seconds(self.settings.toast_duration as f64),
        });
    }

    /// Completed-stroke and clear notifications from the pad, applied to
    /// the record. The first non-empty image seals the sheet.
    fn drain_signature_events(&mut self) {
        let images: Vec<SignatureImage> = self.pad_inbox.borrow_mut().drain(..).collect();
        for image in images {
            match self.machine.signature_changed(image) {
                Ok(SignatureOutcome::Sealed) => {
                    let id = self
                        .machine
                        .projection()
                        .seal
                        .map(|s| s.verification_id.short().to_string())
                        .unwrap_or_default();
                    self.add_toast(
                        ToastKind::Success,
                        format!("Record sealed — verification {id}"),
                    );
                }
                Ok(_) => {}
                Err(err) => self.add_toast(ToastKind::Error, err.to_string()),
            }
        }
    }

    fn validated(&mut self) -> bool {
        match self.machine.validate() {
            Ok(()) => true,
            Err(err) => {
                self.add_toast(ToastKind::Error, err.to_string());
                false
            }
        }
    }

    fn export_sheet(&mut self) {
        if !self.validated() {
            return;
        }
        let outcome = {
            let view = self.machine.projection();
            view.signature
                .png_bytes()
                .map_err(|e| e.to_string())
                .and_then(|rendered| {
                    FileExporter::exe_relative()
                        .and_then(|exporter| exporter.export(&view, &rendered, "png"))
                        .map_err(|e| e.to_string())
                })
        };
        match outcome {
            Ok(path) => self.add_toast(ToastKind::Success, format!("Exported {}", path.display())),
            Err(err) => self.add_toast(ToastKind::Error, err),
        }
    }

    fn open_mail_draft(&mut self) {
        if !self.validated() {
            return;
        }
        let draft = mail::draft_for(&self.machine.projection());
        self.remember_recipients(&draft.recipients);
        if let Err(err) = mail::open_draft(&draft) {
            self.add_toast(ToastKind::Error, format!("{err:#}"));
        }
    }

    fn send_sheet(&mut self) {
        if !self.validated() {
            return;
        }
        let Some(send_settings) = self.settings.authenticated_send.clone() else {
            return;
        };
        let (recipients, outcome) = {
            let view = self.machine.projection();
            let draft = mail::draft_for(&view);
            let filename = export_filename(&view.fields.job_number, view.fields.date, "png");
            let recipients = draft.recipients.clone();
            let outcome = view
                .signature
                .png_bytes()
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    let token = StoredCredential(send_settings.bearer_token.clone())
                        .obtain_token()
                        .map_err(|e| e.to_string())?;
                    let transport = HttpMailTransport::new(&send_settings.endpoint)
                        .map_err(|e| e.to_string())?;
                    let mail = OutgoingMail {
                        from: send_settings.sender.clone(),
                        to: draft.recipients,
                        subject: draft.subject,
                        body: draft.body,
                        attachment: Some(Attachment { filename, bytes }),
                    };
                    transport.send(&mail, &token).map_err(|e| e.to_string())
                });
            (recipients, outcome)
        };
        // A failed send never unseals or re-seals the record.
        match outcome {
            Ok(()) => {
                self.remember_recipients(&recipients);
                self.add_toast(ToastKind::Success, "Timesheet sent");
            }
            Err(err) => self.add_toast(ToastKind::Error, err),
        }
    }

    fn remember_recipients(&mut self, recipients: &[String]) {
        for (slot, recipient) in recipients.iter().enumerate() {
            self.address_book
                .remember(recipient, self.set_as_default && slot == 0);
        }
        if let Err(err) = self.address_book.save(&self.address_book_path) {
            self.add_toast(ToastKind::Error, format!("{err:#}"));
        }
    }

    fn reset_sheet(&mut self) {
        self.machine
            .reset(seeded_draft(&self.settings, &self.address_book));
        self.pad.clear();
    }

    fn unseal_sheet(&mut self) {
        if self.machine.unseal() {
            self.pad.set_disabled(false);
            self.pad.clear();
            self.add_toast(ToastKind::Info, "Record unsealed — editing enabled");
        }
        self.confirm_unseal = false;
    }

    fn form_ui(&mut self, ui: &mut egui::Ui) {
        let SignoffApp {
            machine,
            pad,
            signature_widget,
            address_book,
            set_as_default,
            settings,
            ..
        } = self;

        machine.edit(|d| {
            labelled(ui, "Company", false, |ui| {
                ui.text_edit_singleline(&mut d.company);
            });
            labelled(ui, "Job Number", true, |ui| {
                ui.add(egui::TextEdit::singleline(&mut d.job_number).hint_text("e.g., MB-042"));
            });
            labelled(ui, "Client", true, |ui| {
                ui.text_edit_singleline(&mut d.client);
            });
            labelled(ui, "Site / Address", true, |ui| {
                ui.text_edit_singleline(&mut d.site);
            });

            ui.horizontal(|ui| {
                ui.label("Date *");
                ui.add(egui_extras::DatePickerButton::new(&mut d.date).id_source("sheet_date"));
                ui.label("Start *");
                ui.add(
                    egui::TextEdit::singleline(&mut d.start)
                        .desired_width(56.0)
                        .hint_text("07:00"),
                );
                ui.label("Finish *");
                ui.add(
                    egui::TextEdit::singleline(&mut d.finish)
                        .desired_width(56.0)
                        .hint_text("17:00"),
                );
            });

            ui.horizontal(|ui| {
                ui.label("Break");
                ui.add(
                    egui::DragValue::new(&mut d.break_minutes)
                        .clamp_range(0..=24 * 60)
                        .suffix(" min"),
                );
                ui.label("Hours (auto)");
                let mut hours =
                    crate::record::hours::compute_hours(&d.start, &d.finish, d.break_minutes);
                ui.add_enabled(
                    false,
                    egui::TextEdit::singleline(&mut hours).desired_width(56.0),
                );
            });

            labelled(ui, "Work Description", true, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut d.description)
                        .desired_rows(3)
                        .hint_text("e.g., Set out culvert headwalls, as-built pickup, QA checks"),
                );
            });
            labelled(ui, "Materials / Extras (optional)", false, |ui| {
                ui.add(egui::TextEdit::multiline(&mut d.materials).desired_rows(2));
            });
            labelled(ui, "Employee", true, |ui| {
                ui.add(egui::TextEdit::singleline(&mut d.employee).hint_text("e.g., D. Adamson"));
            });

            while d.admin_emails.len() < admin_slot_count(settings) {
                d.admin_emails.push(String::new());
            }
            for slot in 0..d.admin_emails.len().min(MAX_ADMIN_RECIPIENTS) {
                let label = if slot == 0 {
                    "Admin email (recipient)"
                } else {
                    "Admin email (second recipient)"
                };
                labelled(ui, label, true, |ui| {
                    ui.text_edit_singleline(&mut d.admin_emails[slot]);
                });
            }
            if !address_book.entries.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    ui.label(RichText::new("Recent:").weak());
                    for known in &address_book.entries {
                        if ui.small_button(known).clicked() {
                            if let Some(first) = d.admin_emails.first_mut() {
                                *first = known.clone();
                            }
                        }
                    }
                });
            }
            ui.checkbox(set_as_default, "Set as default on this device");

            labelled(ui, "Client Name", true, |ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut d.client_name)
                        .hint_text("e.g., Site Supervisor"),
                );
            });
        });

        ui.add_space(4.0);
        ui.label("Client Signature *");
        signature_widget.ui(ui, pad);
        if ui.button("🗑 Clear signature").clicked() {
            pad.clear();
        }
    }

    fn locked_banner_ui(&mut self, ui: &mut egui::Ui) {
        let seal_line = self
            .machine
            .projection()
            .seal
            .map(|seal| {
                format!(
                    "Sealed {} — verification {}",
                    seal.sealed_at.format("%Y-%m-%d %H:%M:%S"),
                    seal.verification_id
                )
            })
            .unwrap_or_default();

        ui.colored_label(
            Color32::DARK_GREEN,
            "This timesheet is signed and locked against edits.",
        );
        ui.label(RichText::new(seal_line).small().monospace());
        ui.add_space(4.0);
        if ui.button("Unseal and edit…").clicked() {
            self.confirm_unseal = true;
        }
    }

    fn confirm_unseal_ui(&mut self, ctx: &egui::Context) {
        if !self.confirm_unseal {
            return;
        }
        egui::Window::new("Unseal record?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(
                    "Unsealing discards the sealed snapshot, its verification id \
                     and the client signature. The client will need to sign again.",
                );
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Unseal").clicked() {
                        self.unseal_sheet();
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_unseal = false;
                    }
                });
            });
    }
}

impl eframe::App for SignoffApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_signature_events();
        self.pad.set_disabled(self.machine.is_sealed());

        egui::SidePanel::right("preview_panel")
            .min_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let view = self.machine.projection();
                    self.preview.ui(ui, &view);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Timesheet + Client Sign-off");
            ui.label(
                RichText::new(
                    "Fill this out onsite, get the client to sign, then export and \
                     email it to admin.",
                )
                .weak(),
            );
            ui.add_space(6.0);

            egui::ScrollArea::vertical().show(ui, |ui| {
                if self.machine.is_sealed() {
                    self.locked_banner_ui(ui);
                } else {
                    self.form_ui(ui);
                }

                ui.add_space(8.0);
                ui.horizontal_wrapped(|ui| {
                    if ui.button("⬇ Export signed sheet").clicked() {
                        self.export_sheet();
                    }
                    if ui.button("✉ Open email draft").clicked() {
                        self.open_mail_draft();
                    }
                    if self.settings.authenticated_send.is_some()
                        && ui.button("📤 Send from account").clicked()
                    {
                        self.send_sheet();
                    }
                    if !self.machine.is_sealed() && ui.button("🗑 Reset form").clicked() {
                        self.reset_sheet();
                    }
                });
            });
        });

        self.confirm_unseal_ui(ctx);
        self.toasts.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(err) = self.settings.save(SETTINGS_FILE) {
            tracing::error!("failed to save settings: {err:#}");
        }
    }
}

fn admin_slot_count(settings: &Settings) -> usize {
    if settings.dual_admin_recipients {
        2
    } else {
        1
    }
}

/// A fresh draft from configured defaults plus the remembered default
/// recipient, dated today.
pub fn seeded_draft(settings: &Settings, address_book: &AddressBook) -> TimesheetDraft {
    let mut draft = TimesheetDraft::default();
    draft.company = settings.company.clone();
    draft.start = settings.default_start.clone();
    draft.finish = settings.default_finish.clone();
    draft.break_minutes = settings.default_break_minutes;

    let mut emails = vec![address_book
        .default_address()
        .unwrap_or_default()
        .to_string()];
    if settings.dual_admin_recipients {
        emails.push(String::new());
    }
    draft.admin_emails = emails;
    draft
}

fn labelled(ui: &mut egui::Ui, label: &str, required: bool, content: impl FnOnce(&mut egui::Ui)) {
    let text = if required {
        format!("{label} *")
    } else {
        label.to_string()
    };
    ui.label(text);
    content(ui);
    ui.add_space(2.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_draft_applies_settings_and_default_recipient() {
        let mut settings = Settings::default();
        settings.company = "Mensura Engineering Surveys".into();
        settings.default_break_minutes = 45;

        let mut book = AddressBook::default();
        book.remember("admin@example.com", true);

        let draft = seeded_draft(&settings, &book);
        assert_eq!(draft.company, "Mensura Engineering Surveys");
        assert_eq!(draft.start, "07:00");
        assert_eq!(draft.break_minutes, 45);
        assert_eq!(draft.admin_emails, vec!["admin@example.com".to_string()]);
    }

    #[test]
    fn dual_recipient_setting_adds_a_second_slot() {
        let mut settings = Settings::default();
        settings.dual_admin_recipients = true;

        let draft = seeded_draft(&settings, &AddressBook::default());
        assert_eq!(draft.admin_emails.len(), 2);
    }
}
