use serde::Deserialize;

/// `pagestress.toml` / `pagestress.json`. Every key is optional; values set
/// on the command line or through the environment win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub vus: Option<usize>,
    pub duration: Option<String>,
    pub sleep: Option<String>,
    pub timeout: Option<String>,
    pub graceful_stop: Option<String>,
    pub expected_status: Option<u16>,
    pub thresholds: Option<Vec<String>>,
    pub headers: Option<Vec<String>>,
    pub summary_export: Option<String>,
}
