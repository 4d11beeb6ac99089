use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FrontdeskError, Result};

/// Top-level configuration for the Frontdesk application.
///
/// Loaded from `~/.frontdesk/config.toml` by default. Each section corresponds
/// to a bounded context or cross-cutting concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontdeskConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

impl Default for FrontdeskConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            knowledge: KnowledgeConfig::default(),
            transfer: TransferConfig::default(),
        }
    }
}

impl FrontdeskConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FrontdeskConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FrontdeskError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Business name spoken in greetings and confirmations.
    pub business_name: String,
    /// Flow started when a turn arrives with no active flow.
    pub default_flow: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            business_name: "the office".to_string(),
            default_flow: "general".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Knowledge base answers served by the `lookup_info` action.
///
/// An empty string means the category has no configured answer and lookups
/// against it report "No information found".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Business hours.
    pub hours: String,
    /// Street address / directions.
    pub location: String,
    /// Services offered.
    pub services: String,
    /// Pricing information.
    pub pricing: String,
    /// Phone / email contact details.
    pub contact: String,
    /// Staff directory summary.
    pub staff: String,
    /// Cancellation and other policies.
    pub policies: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            hours: "We are open Monday through Friday, 9am to 5pm.".to_string(),
            location: "We are located at 100 Main Street, Suite 200.".to_string(),
            services: "We offer consultations, appointments, and general assistance.".to_string(),
            pricing: String::new(),
            contact: "You can reach us at (555) 010-0000 or office@example.com.".to_string(),
            staff: String::new(),
            policies: String::new(),
        }
    }
}

impl KnowledgeConfig {
    /// Returns the configured answer for a category, or None when the
    /// category is unknown or has no answer.
    pub fn answer_for(&self, category: &str) -> Option<&str> {
        let answer = match category {
            "hours" => &self.hours,
            "location" => &self.location,
            "services" => &self.services,
            "pricing" => &self.pricing,
            "contact" => &self.contact,
            "staff" => &self.staff,
            "policies" => &self.policies,
            _ => return None,
        };
        if answer.is_empty() {
            None
        } else {
            Some(answer)
        }
    }
}

/// Extension numbers used by the `transfer_call` action, one per destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Fallback destination (front desk).
    pub general: String,
    pub support: String,
    pub sales: String,
    pub billing: String,
    /// On-call line for urgent transfers.
    pub emergency: String,
    /// Operator extension used when the caller asks for a person by name.
    pub person: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            general: "100".to_string(),
            support: "200".to_string(),
            sales: "300".to_string(),
            billing: "400".to_string(),
            emergency: "911".to_string(),
            person: "0".to_string(),
        }
    }
}

impl TransferConfig {
    /// Returns the extension for a destination, falling back to the general
    /// line for unrecognized destinations.
    pub fn extension_for(&self, destination: &str) -> &str {
        match destination {
            "support" => &self.support,
            "sales" => &self.sales,
            "billing" => &self.billing,
            "emergency" => &self.emergency,
            "person" => &self.person,
            _ => &self.general,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = FrontdeskConfig::default();
        assert_eq!(config.general.default_flow, "general");
        assert_eq!(config.general.log_level, "info");
        assert!(config.knowledge.hours.contains("Monday"));
        assert_eq!(config.transfer.general, "100");
        assert_eq!(config.transfer.emergency, "911");
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
business_name = "Acme Dental"
default_flow = "general"
log_level = "debug"

[knowledge]
hours = "Open 24/7."
pricing = "Cleanings start at $80."

[transfer]
support = "210"
emergency = "555"
"#;
        let file = create_temp_config(content);
        let config = FrontdeskConfig::load(file.path()).unwrap();
        assert_eq!(config.general.business_name, "Acme Dental");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.knowledge.hours, "Open 24/7.");
        assert_eq!(config.knowledge.pricing, "Cleanings start at $80.");
        assert_eq!(config.transfer.support, "210");
        assert_eq!(config.transfer.emergency, "555");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = FrontdeskConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        // Remaining fields use defaults
        assert_eq!(config.general.default_flow, "general");
        assert_eq!(config.transfer.billing, "400");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = FrontdeskConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.default_flow, "general");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = FrontdeskConfig::default();
        config.save(&path).unwrap();

        let reloaded = FrontdeskConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.business_name, config.general.business_name);
        assert_eq!(reloaded.knowledge.hours, config.knowledge.hours);
        assert_eq!(reloaded.transfer.sales, config.transfer.sales);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = FrontdeskConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let deserialized: FrontdeskConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.general.log_level, config.general.log_level);
    }

    #[test]
    fn test_answer_for_known_category() {
        let knowledge = KnowledgeConfig::default();
        assert!(knowledge.answer_for("hours").unwrap().contains("Monday"));
        assert!(knowledge.answer_for("location").unwrap().contains("Main Street"));
    }

    #[test]
    fn test_answer_for_empty_category() {
        let knowledge = KnowledgeConfig::default();
        // pricing defaults to empty, so it has no answer
        assert!(knowledge.answer_for("pricing").is_none());
    }

    #[test]
    fn test_answer_for_unknown_category() {
        let knowledge = KnowledgeConfig::default();
        assert!(knowledge.answer_for("weather").is_none());
    }

    #[test]
    fn test_extension_for_destinations() {
        let transfer = TransferConfig::default();
        assert_eq!(transfer.extension_for("support"), "200");
        assert_eq!(transfer.extension_for("emergency"), "911");
        assert_eq!(transfer.extension_for("person"), "0");
        // Unknown destinations fall back to the general line
        assert_eq!(transfer.extension_for("warehouse"), "100");
    }
}
