use crate::record::hours::compute_hours;
use crate::record::model::{SealedTimesheet, TimesheetDraft};
use crate::record::seal::{compute_verification_id, SealError};
use crate::record::view::{Projection, SealInfo};
use crate::signature::SignatureImage;
use chrono::Local;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetPhase {
    Draft,
    Sealed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("client signature is required")]
    MissingSignature,
}

/// What a signature notification did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureOutcome {
    /// Empty image received; the stored signature was cleared.
    Cleared,
    /// Signature stored without sealing (sealing capability off).
    Stored,
    /// Signature stored and the record sealed.
    Sealed,
    /// Notification arrived while sealed and was dropped.
    Ignored,
}

/// Owns the draft record and drives it through Draft -> Sealed -> Draft.
/// At most one of {draft editable, sealed snapshot present} holds at any
/// time: while `sealed` is Some, edits and signature notifications are
/// silently dropped (the locked UX contract), and unsealing discards the
/// snapshot wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetMachine {
    draft: TimesheetDraft,
    signature: SignatureImage,
    sealed: Option<SealedTimesheet>,
    seal_on_signature: bool,
}

impl SheetMachine {
    pub fn new(draft: TimesheetDraft, seal_on_signature: bool) -> Self {
        let mut machine = Self {
            draft,
            signature: SignatureImage::empty(),
            sealed: None,
            seal_on_signature,
        };
        machine.recompute_hours();
        machine
    }

    pub fn phase(&self) -> SheetPhase {
        if self.sealed.is_some() {
            SheetPhase::Sealed
        } else {
            SheetPhase::Draft
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.is_some()
    }

    /// The live draft, regardless of phase. Consumers rendering the record
    /// must go through [`Self::projection`] instead.
    pub fn draft(&self) -> &TimesheetDraft {
        &self.draft
    }

    /// Apply a field update. Ignored without error once sealed; the hours
    /// field is recomputed after every accepted edit.
    pub fn edit(&mut self, apply: impl FnOnce(&mut TimesheetDraft)) {
        if self.sealed.is_some() {
            tracing::debug!("edit ignored: record is sealed");
            return;
        }
        apply(&mut self.draft);
        self.recompute_hours();
    }

    /// Handle a signature-surface notification. An empty image clears the
    /// stored signature; the first non-empty image seals the record when
    /// the sealing capability is on (signing IS sealing), otherwise it is
    /// just stored. Anything arriving while sealed is dropped.
    pub fn signature_changed(
        &mut self,
        image: SignatureImage,
    ) -> Result<SignatureOutcome, SealError> {
        if self.sealed.is_some() {
            tracing::debug!("signature notification ignored: record is sealed");
            return Ok(SignatureOutcome::Ignored);
        }
        if image.is_empty() {
            self.signature = image;
            return Ok(SignatureOutcome::Cleared);
        }

        self.signature = image.clone();
        if !self.seal_on_signature {
            return Ok(SignatureOutcome::Stored);
        }
        self.seal(image)?;
        Ok(SignatureOutcome::Sealed)
    }

    /// Freeze the record. The verification id is computed before anything
    /// is committed, so a failed computation leaves the machine in Draft.
    fn seal(&mut self, signature: SignatureImage) -> Result<(), SealError> {
        let verification_id = compute_verification_id(&self.draft, &signature)?;
        let sealed = SealedTimesheet {
            fields: self.draft.clone(),
            signature,
            sealed_at: Local::now(),
            verification_id,
        };
        tracing::info!(
            job_number = %sealed.fields.job_number,
            verification_id = %sealed.verification_id,
            "record sealed"
        );
        self.sealed = Some(sealed);
        Ok(())
    }

    /// Discard the sealed snapshot and return to an editable draft with the
    /// field values as they were at seal time and the signature cleared.
    /// Returns false when not sealed.
    pub fn unseal(&mut self) -> bool {
        let Some(sealed) = self.sealed.take() else {
            return false;
        };
        tracing::info!(job_number = %sealed.fields.job_number, "record unsealed");
        self.draft = sealed.fields;
        self.signature = SignatureImage::empty();
        true
    }

    /// Check the projection for completeness: first absent required field
    /// in declared order, then signature presence. Never mutates and may be
    /// called repeatedly in either phase.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let view = self.projection();
        for (name, value) in view.fields.required_fields() {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        if view.signature.is_empty() {
            return Err(ValidationError::MissingSignature);
        }
        Ok(())
    }

    /// The snapshot consumers must render: live draft while editable, the
    /// frozen copy once sealed.
    pub fn projection(&self) -> Projection<'_> {
        match &self.sealed {
            Some(sealed) => Projection {
                fields: &sealed.fields,
                signature: &sealed.signature,
                seal: Some(SealInfo {
                    sealed_at: sealed.sealed_at,
                    verification_id: &sealed.verification_id,
                }),
            },
            None => Projection {
                fields: &self.draft,
                signature: &self.signature,
                seal: None,
            },
        }
    }

    /// Replace the draft wholesale (the reset flow). Ignored once sealed.
    pub fn reset(&mut self, draft: TimesheetDraft) {
        if self.sealed.is_some() {
            tracing::debug!("reset ignored: record is sealed");
            return;
        }
        self.draft = draft;
        self.signature = SignatureImage::empty();
        self.recompute_hours();
    }

    fn recompute_hours(&mut self) {
        self.draft.hours = compute_hours(
            &self.draft.start,
            &self.draft.finish,
            self.draft.break_minutes,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature() -> SignatureImage {
        SignatureImage::from_data_url("data:image/png;base64,c2lnbmF0dXJl".into())
    }

    fn filled_draft() -> TimesheetDraft {
        let mut draft = TimesheetDraft::default();
        draft.company = "Mensura Engineering Surveys".into();
        draft.job_number = "MB-042".into();
        draft.client = "Roadworks Pty".into();
        draft.site = "Culvert 3, Hwy 12".into();
        draft.start = "07:00".into();
        draft.finish = "17:00".into();
        draft.break_minutes = 30;
        draft.description = "Set out culvert headwalls".into();
        draft.employee = "D. Adamson".into();
        draft.client_name = "Site Supervisor".into();
        draft.admin_emails = vec!["admin@example.com".into()];
        draft
    }

    fn sealed_machine() -> SheetMachine {
        let mut machine = SheetMachine::new(filled_draft(), true);
        machine.signature_changed(signature()).expect("seal");
        machine
    }

    #[test]
    fn hours_are_derived_on_construction_and_edit() {
        let mut machine = SheetMachine::new(filled_draft(), true);
        assert_eq!(machine.draft().hours, "9.50");

        machine.edit(|d| d.finish = "18:00".into());
        assert_eq!(machine.draft().hours, "10.50");

        machine.edit(|d| d.break_minutes = 60);
        assert_eq!(machine.draft().hours, "10.00");
    }

    #[test]
    fn non_empty_signature_seals_automatically() {
        let mut machine = SheetMachine::new(filled_draft(), true);
        let outcome = machine.signature_changed(signature()).expect("outcome");
        assert_eq!(outcome, SignatureOutcome::Sealed);
        assert_eq!(machine.phase(), SheetPhase::Sealed);

        let view = machine.projection();
        assert!(view.is_sealed());
        assert_eq!(view.seal.expect("seal info").verification_id.as_str().len(), 64);
    }

    #[test]
    fn empty_signature_clears_without_transition() {
        let mut machine = SheetMachine::new(filled_draft(), true);
        machine
            .signature_changed(SignatureImage::empty())
            .expect("clear");
        assert_eq!(machine.phase(), SheetPhase::Draft);
        assert!(machine.projection().signature.is_empty());
    }

    #[test]
    fn edits_after_sealing_are_silently_ignored() {
        let mut machine = sealed_machine();
        let before = machine.projection().fields.clone();

        machine.edit(|d| d.site = "tampered".into());

        assert_eq!(machine.phase(), SheetPhase::Sealed);
        assert_eq!(machine.projection().fields, &before);
    }

    #[test]
    fn signature_notifications_after_sealing_are_dropped() {
        let mut machine = sealed_machine();
        let id_before = machine
            .projection()
            .seal
            .expect("seal")
            .verification_id
            .clone();

        let outcome = machine
            .signature_changed(SignatureImage::from_data_url(
                "data:image/png;base64,bGF0ZQ==".into(),
            ))
            .expect("outcome");

        assert_eq!(outcome, SignatureOutcome::Ignored);
        assert_eq!(
            machine.projection().seal.expect("seal").verification_id,
            &id_before
        );
    }

    #[test]
    fn unseal_restores_editable_draft_with_seal_time_values() {
        let mut machine = sealed_machine();
        let sealed_fields = machine.projection().fields.clone();

        assert!(machine.unseal());

        assert_eq!(machine.phase(), SheetPhase::Draft);
        assert_eq!(machine.draft(), &sealed_fields);
        assert!(machine.projection().signature.is_empty());
        assert!(machine.projection().seal.is_none());

        machine.edit(|d| d.site = "editable again".into());
        assert_eq!(machine.draft().site, "editable again");
    }

    #[test]
    fn unseal_while_draft_reports_false() {
        let mut machine = SheetMachine::new(filled_draft(), true);
        assert!(!machine.unseal());
    }

    #[test]
    fn validation_reports_first_missing_field_in_declared_order() {
        let mut draft = filled_draft();
        draft.job_number.clear();
        draft.client.clear();

        let machine = SheetMachine::new(draft, true);
        assert_eq!(
            machine.validate(),
            Err(ValidationError::MissingField("job_number"))
        );
    }

    #[test]
    fn validation_requires_a_signature_after_fields() {
        let machine = SheetMachine::new(filled_draft(), true);
        assert_eq!(machine.validate(), Err(ValidationError::MissingSignature));
    }

    #[test]
    fn validation_passes_for_a_sealed_sheet_and_is_repeatable() {
        let machine = sealed_machine();
        assert_eq!(machine.validate(), Ok(()));
        assert_eq!(machine.validate(), Ok(()));
        assert_eq!(machine.phase(), SheetPhase::Sealed);
    }

    #[test]
    fn blank_second_recipient_fails_validation() {
        let mut draft = filled_draft();
        draft.admin_emails.push(String::new());

        let machine = SheetMachine::new(draft, true);
        assert_eq!(
            machine.validate(),
            Err(ValidationError::MissingField("admin_email_2"))
        );
    }

    #[test]
    fn sealing_capability_can_be_disabled() {
        let mut machine = SheetMachine::new(filled_draft(), false);
        let outcome = machine.signature_changed(signature()).expect("outcome");
        assert_eq!(outcome, SignatureOutcome::Stored);
        assert_eq!(machine.phase(), SheetPhase::Draft);
        assert!(!machine.projection().signature.is_empty());
        assert_eq!(machine.validate(), Ok(()));
    }

    #[test]
    fn reset_is_ignored_once_sealed() {
        let mut machine = sealed_machine();
        machine.reset(TimesheetDraft::default());
        assert_eq!(machine.phase(), SheetPhase::Sealed);
        assert_eq!(machine.projection().fields.job_number, "MB-042");
    }

    #[test]
    fn sealing_twice_with_identical_payload_is_deterministic() {
        let a = sealed_machine();
        let b = sealed_machine();
        assert_eq!(
            a.projection().seal.expect("a").verification_id,
            b.projection().seal.expect("b").verification_id
        );
    }
}
