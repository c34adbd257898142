use crate::record::model::TimesheetDraft;
use crate::record::seal::VerificationId;
use crate::signature::SignatureImage;
use chrono::{DateTime, Local};

/// Seal metadata exposed alongside a sealed projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SealInfo<'a> {
    pub sealed_at: DateTime<Local>,
    pub verification_id: &'a VerificationId,
}

/// What any consumer (screen preview or export) must render: the live
/// draft while editable, the frozen snapshot once sealed. Routing every
/// reader through this guarantees the preview and the exported artifact
/// show exactly what was sealed.
#[derive(Debug, Clone, Copy)]
pub struct Projection<'a> {
    pub fields: &'a TimesheetDraft,
    pub signature: &'a SignatureImage,
    pub seal: Option<SealInfo<'a>>,
}

impl Projection<'_> {
    pub fn is_sealed(&self) -> bool {
        self.seal.is_some()
    }
}
