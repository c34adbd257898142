use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "signoff_settings.json";

/// Configuration for the authenticated send capability. Absent entirely
/// when the deployment only uses mailto drafts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendSettings {
    /// HTTP endpoint accepting a Gmail-style raw MIME upload.
    pub endpoint: String,
    /// From address presented to the transport.
    pub sender: String,
    /// Bearer credential produced by the provider's sign-in flow. When
    /// absent the send button prompts for sign-in instead of sending.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Company name pre-filled into new sheets.
    #[serde(default)]
    pub company: String,
    #[serde(default = "default_start")]
    pub default_start: String,
    #[serde(default = "default_finish")]
    pub default_finish: String,
    #[serde(default = "default_break_minutes")]
    pub default_break_minutes: u32,
    /// The first non-empty signature seals the record. Turning this off
    /// yields the plain capture-only variant of the form.
    #[serde(default = "default_seal_on_signature")]
    pub seal_on_signature: bool,
    /// Show a second admin recipient field on the form.
    #[serde(default)]
    pub dual_admin_recipients: bool,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    /// Last known window size. If absent, a default size is used.
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
    #[serde(default)]
    pub authenticated_send: Option<SendSettings>,
}

fn default_start() -> String {
    "07:00".to_string()
}

fn default_finish() -> String {
    "17:00".to_string()
}

fn default_break_minutes() -> u32 {
    30
}

fn default_seal_on_signature() -> bool {
    true
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            company: String::new(),
            default_start: default_start(),
            default_finish: default_finish(),
            default_break_minutes: default_break_minutes(),
            seal_on_signature: default_seal_on_signature(),
            dual_admin_recipients: false,
            enable_toasts: true,
            toast_duration: default_toast_duration(),
            window_size: None,
            authenticated_send: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
