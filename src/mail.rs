use crate::record::Projection;
use anyhow::{Context, Result};

/// A prefilled outbound message, ready for the platform mail client or the
/// authenticated transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Build the admin notification for a sheet. The body is a human-readable
/// summary; a sealed sheet additionally carries its verification id and
/// sealing time so the recipient can tie the mail to the exact frozen
/// record.
pub fn draft_for(sheet: &Projection<'_>) -> MailDraft {
    let fields = sheet.fields;
    let subject = format!("Timesheet {} - {}", fields.job_number, fields.date);

    let mut body = format!(
        "Hi Admin,\n\nPlease find attached the signed timesheet for job {}.\n\n\
         Client: {}\nSite: {}\nDate: {}\nEmployee: {}\nHours: {}\n",
        fields.job_number, fields.client, fields.site, fields.date, fields.employee, fields.hours
    );
    if let Some(seal) = &sheet.seal {
        body.push_str(&format!(
            "Verification: {}\nSealed: {}\n",
            seal.verification_id,
            seal.sealed_at.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    body.push_str(&format!("\nRegards,\n{}", fields.employee));

    MailDraft {
        recipients: fields.recipients(),
        subject,
        body,
    }
}

/// `mailto:` URL with percent-encoded subject and body. Needs no network
/// access; the platform mail client does the rest.
pub fn mailto_url(draft: &MailDraft) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        draft.recipients.join(","),
        urlencoding::encode(&draft.subject),
        urlencoding::encode(&draft.body)
    )
}

/// Hand the draft to the default mail client.
pub fn open_draft(draft: &MailDraft) -> Result<()> {
    let url = mailto_url(draft);
    open::that(&url).context("open mail client for draft")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{SheetMachine, TimesheetDraft};
    use crate::signature::SignatureImage;

    fn machine() -> SheetMachine {
        let mut draft = TimesheetDraft::default();
        draft.job_number = "MB-042".into();
        draft.client = "Roadworks Pty".into();
        draft.site = "Culvert 3".into();
        draft.date = chrono::NaiveDate::from_ymd_opt(2026, 3, 14).expect("date");
        draft.start = "07:00".into();
        draft.finish = "17:00".into();
        draft.break_minutes = 30;
        draft.employee = "D. Adamson".into();
        draft.admin_emails = vec!["admin@example.com".into(), "ops@example.com".into()];
        SheetMachine::new(draft, true)
    }

    #[test]
    fn subject_names_job_and_date() {
        let machine = machine();
        let draft = draft_for(&machine.projection());
        assert_eq!(draft.subject, "Timesheet MB-042 - 2026-03-14");
    }

    #[test]
    fn body_summarizes_the_sheet() {
        let machine = machine();
        let draft = draft_for(&machine.projection());
        assert!(draft.body.contains("Client: Roadworks Pty"));
        assert!(draft.body.contains("Hours: 9.50"));
        assert!(draft.body.contains("Regards,\nD. Adamson"));
        assert!(!draft.body.contains("Verification:"));
    }

    #[test]
    fn sealed_sheet_body_carries_the_verification_id() {
        let mut machine = machine();
        machine
            .signature_changed(SignatureImage::from_data_url(
                "data:image/png;base64,c2ln".into(),
            ))
            .expect("seal");

        let view = machine.projection();
        let id = view.seal.expect("seal").verification_id.to_string();
        let draft = draft_for(&view);
        assert!(draft.body.contains(&format!("Verification: {id}")));
        assert!(draft.body.contains("Sealed: "));
    }

    #[test]
    fn mailto_url_joins_recipients_and_escapes_text() {
        let machine = machine();
        let url = mailto_url(&draft_for(&machine.projection()));
        assert!(url.starts_with("mailto:admin@example.com,ops@example.com?subject="));
        assert!(!url.contains(' '));
        assert!(!url.contains('\n'));
        assert!(url.contains("Timesheet%20MB-042"));
    }
}
