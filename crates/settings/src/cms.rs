//! Per-entity configuration supplied by the CMS.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::SettingsError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Initial state of the availability overlay.
    #[serde(default)]
    pub overlay_on: bool,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Name of the scene node this entry makes interactive.
    pub mesh: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub label: Option<LabelConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub text: Option<String>,
    /// Rendered size in pixels, when the host knows it up front.
    #[serde(default)]
    pub size: Option<[f32; 2]>,
}

impl CmsConfig {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let raw: CmsConfig = serde_json::from_str(json)?;
        Ok(raw.normalized())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let file = File::open(path.as_ref())?;
        let raw: CmsConfig = serde_json::from_reader(BufReader::new(file))?;
        Ok(raw.normalized())
    }

    /// Trims every string, drops entries without a name and turns empty
    /// strings into `None`.
    pub fn normalized(self) -> Self {
        let entities = self
            .entities
            .into_iter()
            .filter_map(|entry| {
                let mesh = entry.mesh.trim().to_owned();
                if mesh.is_empty() {
                    return None;
                }
                Some(EntityConfig {
                    mesh,
                    color: non_empty(entry.color),
                    link: non_empty(entry.link),
                    title: non_empty(entry.title),
                    label: entry.label.map(|label| LabelConfig {
                        text: non_empty(label.text),
                        size: label.size,
                    }),
                })
            })
            .collect();
        Self {
            overlay_on: self.overlay_on,
            entities,
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.mesh == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entity names in list order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.mesh.as_str())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_entries() {
        let cfg = CmsConfig::from_json(
            r##"{
                "overlay_on": true,
                "entities": [
                    { "mesh": "  Unit_A ", "color": " #ff0000 ", "link": "", "title": "Unit A",
                      "label": { "text": " A ", "size": [80, 24] } },
                    { "mesh": "   " },
                    { "mesh": "Unit_B", "color": "" }
                ]
            }"##,
        )
        .unwrap();

        assert!(cfg.overlay_on);
        assert_eq!(cfg.names().collect::<Vec<_>>(), vec!["Unit_A", "Unit_B"]);

        let a = cfg.get("Unit_A").unwrap();
        assert_eq!(a.color.as_deref(), Some("#ff0000"));
        assert_eq!(a.link, None);
        assert_eq!(a.label.as_ref().unwrap().text.as_deref(), Some("A"));
        assert_eq!(a.label.as_ref().unwrap().size, Some([80.0, 24.0]));

        assert_eq!(cfg.get("Unit_B").unwrap().color, None);
        assert!(!cfg.contains("missing"));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            CmsConfig::from_json("{ not json"),
            Err(SettingsError::Json(_))
        ));
    }
}
