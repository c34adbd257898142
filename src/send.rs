use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;
use url::Url;

/// Bearer credential produced by the provider's interactive sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

/// The interactive sign-in step. How the credential is obtained (browser
/// consent, device code, cached refresh) is the collaborator's concern.
pub trait SignIn {
    fn obtain_token(&self) -> Result<AccessToken>;
}

/// Sign-in backed by a credential already stored in settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential(pub Option<String>);

impl SignIn for StoredCredential {
    fn obtain_token(&self) -> Result<AccessToken> {
        self.0
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(AccessToken::new)
            .context("no stored credential; sign in first")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("send failed: {0}")]
pub struct SendFailure(pub String);

/// Delivers an assembled message. Implementations own their retry/timeout
/// policy; the caller never retries and never rolls back record state on
/// failure.
pub trait MailTransport {
    fn send(&self, mail: &OutgoingMail, token: &AccessToken) -> Result<(), SendFailure>;
}

const MIME_BOUNDARY: &str = "signoff_mime_boundary";
const BASE64_LINE_WIDTH: usize = 76;

/// Assemble the RFC 822 message: multipart/mixed with a plain-text body
/// and an optional base64 attachment.
pub fn build_mime(mail: &OutgoingMail) -> String {
    let mut out = String::new();
    out.push_str(&format!("From: {}\r\n", mail.from));
    out.push_str(&format!("To: {}\r\n", mail.to.join(", ")));
    out.push_str(&format!("Subject: {}\r\n", mail.subject));
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{MIME_BOUNDARY}\"\r\n\r\n"
    ));

    out.push_str(&format!("--{MIME_BOUNDARY}\r\n"));
    out.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n\r\n");
    out.push_str(&mail.body);
    out.push_str("\r\n");

    if let Some(attachment) = &mail.attachment {
        out.push_str(&format!("--{MIME_BOUNDARY}\r\n"));
        out.push_str("Content-Type: application/octet-stream\r\n");
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
            attachment.filename
        ));
        let encoded = general_purpose::STANDARD.encode(&attachment.bytes);
        for chunk in encoded.as_bytes().chunks(BASE64_LINE_WIDTH) {
            out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
            out.push_str("\r\n");
        }
    }

    out.push_str(&format!("--{MIME_BOUNDARY}--\r\n"));
    out
}

/// Gmail-style raw-message upload over HTTP: the MIME message is base64url
/// encoded into a JSON `raw` field and POSTed with the bearer credential.
pub struct HttpMailTransport {
    endpoint: Url,
    client: reqwest::blocking::Client,
}

impl HttpMailTransport {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("invalid send endpoint: {endpoint}"))?;
        Ok(Self {
            endpoint,
            client: reqwest::blocking::Client::new(),
        })
    }
}

impl MailTransport for HttpMailTransport {
    fn send(&self, mail: &OutgoingMail, token: &AccessToken) -> Result<(), SendFailure> {
        let raw = general_purpose::URL_SAFE_NO_PAD.encode(build_mime(mail));
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::AUTHORIZATION, token.authorization_header())
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .map_err(|e| SendFailure(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("timesheet mail accepted by transport");
            return Ok(());
        }
        let detail = response.text().unwrap_or_default();
        Err(SendFailure(format!("{status}: {detail}")))
    }
}
