pub(crate) const DEFAULT_USER_AGENT: &str = concat!("pagestress/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Config filenames checked when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["pagestress.toml", "pagestress.json"];
