use crate::record::seal::VerificationId;
use crate::signature::SignatureImage;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A sheet carries one or two admin recipients.
pub const MAX_ADMIN_RECIPIENTS: usize = 2;

/// The mutable pre-seal record. `hours` is derived from the three timing
/// inputs and never edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetDraft {
    pub company: String,
    pub job_number: String,
    pub client: String,
    pub site: String,
    pub date: NaiveDate,
    pub start: String,
    pub finish: String,
    pub break_minutes: u32,
    pub hours: String,
    pub description: String,
    pub materials: String,
    pub employee: String,
    pub client_name: String,
    pub admin_emails: Vec<String>,
}

impl Default for TimesheetDraft {
    fn default() -> Self {
        Self {
            company: String::new(),
            job_number: String::new(),
            client: String::new(),
            site: String::new(),
            date: Local::now().date_naive(),
            start: String::new(),
            finish: String::new(),
            break_minutes: 0,
            hours: String::new(),
            description: String::new(),
            materials: String::new(),
            employee: String::new(),
            client_name: String::new(),
            admin_emails: vec![String::new()],
        }
    }
}

impl TimesheetDraft {
    /// Required text fields in the order validation reports them. `date` is
    /// a typed `NaiveDate` and cannot be absent, so it needs no entry here;
    /// admin recipients follow `client_name` and are named per slot.
    pub fn required_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields: Vec<(&'static str, &str)> = vec![
            ("job_number", self.job_number.as_str()),
            ("client", self.client.as_str()),
            ("site", self.site.as_str()),
            ("start", self.start.as_str()),
            ("finish", self.finish.as_str()),
            ("employee", self.employee.as_str()),
            ("description", self.description.as_str()),
            ("client_name", self.client_name.as_str()),
        ];
        for (slot, email) in self.admin_emails.iter().take(MAX_ADMIN_RECIPIENTS).enumerate() {
            fields.push((admin_email_name(slot), email.as_str()));
        }
        fields
    }

    /// Recipients with anything typed into them.
    pub fn recipients(&self) -> Vec<String> {
        self.admin_emails
            .iter()
            .filter(|e| !e.trim().is_empty())
            .cloned()
            .collect()
    }
}

fn admin_email_name(slot: usize) -> &'static str {
    if slot == 0 {
        "admin_email"
    } else {
        "admin_email_2"
    }
}

/// The frozen snapshot produced by sealing: a deep copy of the draft, the
/// signature it was sealed with, the sealing instant, and the integrity id
/// computed over the two. Discarded wholesale on unseal, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SealedTimesheet {
    pub fields: TimesheetDraft,
    pub signature: SignatureImage,
    pub sealed_at: DateTime<Local>,
    pub verification_id: VerificationId,
}
