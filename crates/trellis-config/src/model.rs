use serde::{Deserialize, Serialize};
use trellis_core::ItemStatus;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,
    pub general: GeneralConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub start_mailbox: String,
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub endpoint: Url,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub columns: Vec<ColumnSettings>,
}

/// One configured board column. The binding names the mailbox label whose
/// mail feeds the column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSettings {
    pub name: String,
    #[serde(default)]
    pub label_binding: Option<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: ItemStatus::ALL
                .iter()
                .map(|status| ColumnSettings {
                    name: status.title().to_string(),
                    label_binding: None,
                })
                .collect(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            general: GeneralConfig {
                start_mailbox: "INBOX".to_string(),
                refresh_interval_secs: 120,
            },
            network: NetworkConfig {
                endpoint: Url::parse("http://localhost:8787/api").expect("valid default endpoint"),
            },
            board: BoardConfig::default(),
        }
    }
}
