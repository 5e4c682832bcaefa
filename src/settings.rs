use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ImpactError, Result};
use crate::tables::{LookupTables, Variant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub variant: Variant,
    /// Optional JSON file replacing the variant's lookup tables.
    #[serde(default)]
    pub tables: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            variant: Variant::default(),
            tables: None,
        }
    }
}

impl Settings {
    /// The lookup tables these settings select: the custom file when one is
    /// set, otherwise the variant preset.
    pub fn lookup_tables(&self) -> Result<LookupTables> {
        match &self.tables {
            Some(path) => LookupTables::load(&PathBuf::from(shellexpand_path(path))),
            None => Ok(self.variant.tables()),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("impact-dash")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ImpactError::Settings(e.to_string()))?;
    let path = settings_path();
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(path)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/impact".to_string(),
            variant: Variant::Grouped,
            tables: Some("/tmp/tables.json".to_string()),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.data_dir, "/tmp/impact");
        assert_eq!(loaded.variant, Variant::Grouped);
        assert_eq!(loaded.tables.as_deref(), Some("/tmp/tables.json"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/impact"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.variant, Variant::Split);
        assert!(s.tables.is_none());
    }

    #[test]
    fn test_variant_serialized_lowercase() {
        let s = Settings {
            variant: Variant::Vertical,
            ..Settings::default()
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"variant\":\"vertical\""));
    }

    #[test]
    fn test_lookup_tables_prefers_custom_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        let mut custom = Variant::Split.tables();
        custom.chart.page_title = "Custom".to_string();
        std::fs::write(&path, serde_json::to_string(&custom).unwrap()).unwrap();
        let s = Settings {
            tables: Some(path.to_string_lossy().to_string()),
            ..Settings::default()
        };
        assert_eq!(s.lookup_tables().unwrap().chart.page_title, "Custom");
        assert_eq!(
            Settings::default().lookup_tables().unwrap(),
            Variant::Split.tables()
        );
    }
}
