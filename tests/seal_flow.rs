use site_signoff::export::{export_filename, FileExporter, SheetExporter};
use site_signoff::mail;
use site_signoff::record::{SheetMachine, SheetPhase, SignatureOutcome, TimesheetDraft};
use site_signoff::signature::{PointerSource, SignatureImage, SignaturePad};
use std::cell::RefCell;
use std::rc::Rc;

fn filled_draft() -> TimesheetDraft {
    let mut draft = TimesheetDraft::default();
    draft.company = "Mensura Engineering Surveys".into();
    draft.job_number = "MB-042".into();
    draft.client = "Roadworks Pty".into();
    draft.site = "Culvert 3, Hwy 12".into();
    draft.date = chrono::NaiveDate::from_ymd_opt(2026, 3, 14).expect("date");
    draft.start = "07:00".into();
    draft.finish = "17:00".into();
    draft.break_minutes = 30;
    draft.description = "Set out culvert headwalls".into();
    draft.employee = "D. Adamson".into();
    draft.client_name = "Site Supervisor".into();
    draft.admin_emails = vec!["admin@example.com".into()];
    draft
}

fn signed_pad() -> (SignaturePad, Rc<RefCell<Vec<SignatureImage>>>) {
    let inbox = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&inbox);
    let mut pad = SignaturePad::new((320.0, 160.0));
    pad.set_change_listener(Box::new(move |image| sink.borrow_mut().push(image)));

    pad.begin(PointerSource::Touch, (40.0, 80.0));
    pad.extend(PointerSource::Touch, (120.0, 60.0));
    pad.extend(PointerSource::Touch, (200.0, 100.0));
    pad.end(PointerSource::Touch);

    (pad, inbox)
}

#[test]
fn drawn_signature_seals_and_flows_to_export_and_mail() {
    let mut machine = SheetMachine::new(filled_draft(), true);
    let (mut pad, inbox) = signed_pad();

    let image = inbox.borrow_mut().pop().expect("pad emitted an image");
    let outcome = machine.signature_changed(image).expect("seal");
    assert_eq!(outcome, SignatureOutcome::Sealed);
    assert_eq!(machine.phase(), SheetPhase::Sealed);
    pad.set_disabled(true);

    // Locked surface and record: neither ink nor edits get through.
    pad.begin(PointerSource::Mouse, (10.0, 10.0));
    pad.end(PointerSource::Mouse);
    assert!(inbox.borrow().is_empty());
    machine.edit(|d| d.site = "tampered".into());

    let view = machine.projection();
    assert_eq!(view.fields.site, "Culvert 3, Hwy 12");
    let seal = view.seal.expect("seal info");
    assert_eq!(seal.verification_id.as_str().len(), 64);

    // The export artifact is named deterministically from the snapshot.
    assert_eq!(
        export_filename(&view.fields.job_number, view.fields.date, "pdf"),
        "Timesheet_MB-042_2026-03-14.pdf"
    );
    let dir = tempfile::tempdir().expect("temp dir");
    let exporter = FileExporter::new(dir.path().to_path_buf());
    let rendered = view.signature.png_bytes().expect("rendered signature");
    let path = exporter.export(&view, &rendered, "png").expect("export");
    assert!(path.ends_with("Timesheet_MB-042_2026-03-14.png"));

    // The mail draft carries the summary and the verification id.
    let draft = mail::draft_for(&view);
    assert_eq!(draft.recipients, vec!["admin@example.com".to_string()]);
    assert!(draft.body.contains(&seal.verification_id.to_string()));
    let url = mail::mailto_url(&draft);
    assert!(url.starts_with("mailto:admin@example.com?subject=Timesheet%20MB-042"));
}

#[test]
fn identical_sheets_seal_to_identical_verification_ids() {
    let image = SignatureImage::from_data_url("data:image/png;base64,c2lnbmF0dXJl".into());

    let mut first = SheetMachine::new(filled_draft(), true);
    let mut second = SheetMachine::new(filled_draft(), true);
    first.signature_changed(image.clone()).expect("seal");
    second.signature_changed(image).expect("seal");

    assert_eq!(
        first.projection().seal.expect("first").verification_id,
        second.projection().seal.expect("second").verification_id
    );
}

#[test]
fn unseal_returns_to_the_editable_draft_and_requires_resigning() {
    let mut machine = SheetMachine::new(filled_draft(), true);
    let pre_seal = machine.draft().clone();
    let (_pad, inbox) = signed_pad();
    let image = inbox.borrow_mut().pop().expect("image");
    machine.signature_changed(image).expect("seal");

    assert!(machine.unseal());
    assert_eq!(machine.phase(), SheetPhase::Draft);
    assert_eq!(machine.draft(), &pre_seal);
    assert!(machine.projection().signature.is_empty());
    assert!(machine.validate().is_err());

    machine.edit(|d| d.description = "Amended description".into());
    assert_eq!(machine.draft().description, "Amended description");
}
