use serde::Deserialize;

use crate::loader;

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub image_dir: String,
    pub font_path: Option<String>,
    pub icon_path: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            image_dir: loader::DEFAULT_IMAGE_DIR.to_string(),
            font_path: None,
            icon_path: None,
        }
    }
}

pub fn config_path() -> Option<String> {
    if let Some(home) = std::env::var_os("HOME") {
        let path = std::path::PathBuf::from(home)
            .join(".config")
            .join("korsanpaint.toml");
        if path.exists() {
            return Some(path.display().to_string());
        }
    }
    if std::path::Path::new("korsanpaint.toml").exists() {
        return Some("korsanpaint.toml".to_string());
    }
    None
}

pub fn load_settings(path: &str) -> Option<AppSettings> {
    let s = std::fs::read_to_string(path).ok()?;
    if path.ends_with(".toml") {
        toml::from_str::<AppSettings>(&s)
            .ok()
            .or_else(|| serde_json::from_str::<AppSettings>(&s).ok())
    } else {
        serde_json::from_str::<AppSettings>(&s)
            .ok()
            .or_else(|| toml::from_str::<AppSettings>(&s).ok())
    }
}
