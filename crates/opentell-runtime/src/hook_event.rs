use serde::Deserialize;

/// The JSON object a host assistant writes to a hook's standard input
/// (spec.md §6 "Hook interfaces"). Every field is optional because each
/// hook kind only ever populates the subset it needs.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HookEvent {
    pub session_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub stop_hook_active: Option<bool>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<serde_json::Value>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl HookEvent {
    pub fn from_reader(reader: impl std::io::Read) -> Self {
        serde_json::from_reader(reader).unwrap_or_default()
    }

    pub fn session_id(&self) -> String {
        self.session_id.clone().unwrap_or_else(|| "unknown".to_string())
    }
}
