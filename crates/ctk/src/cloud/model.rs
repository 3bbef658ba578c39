//! Documents exchanged with the control plane.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of control-plane metadata for one cluster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterInformation {
    pub id: Option<String>,
    pub name: Option<String>,
    /// HTTPS URL of the cluster.
    pub url: Option<String>,
    pub project_id: Option<String>,
    pub health: Option<String>,
    pub suspended: bool,
    /// The document as returned by the API.
    pub raw: Value,
}

impl ClusterInformation {
    pub fn from_document(raw: Value) -> Self {
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: text("id"),
            name: text("name"),
            url: text("url"),
            project_id: text("project_id"),
            health: raw
                .pointer("/health/status")
                .and_then(Value::as_str)
                .map(str::to_string),
            suspended: raw
                .get("suspended")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            raw,
        }
    }
}

/// A project grouping clusters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// Body of `POST /api/v2/projects/`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

/// Body of `POST /api/v2/clusters/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployRequest {
    pub cluster: ClusterSpec,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSpec {
    pub name: String,
    pub product_name: String,
    pub product_tier: String,
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crate_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Body of `POST /api/v2/clusters/{id}/import-jobs/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportJobRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: ImportUrl,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    pub destination: ImportDestination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportDestination {
    pub table: String,
    pub create_table: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cluster_information_from_document() {
        let info = ClusterInformation::from_document(json!({
            "id": "e1e38d92-a650-48f1-8a70-8133f2d5c400",
            "name": "testdrive",
            "url": "https://testdrive.aks1.westeurope.azure.cratedb.net:4200",
            "project_id": "p1",
            "health": {"status": "GREEN"},
            "suspended": true
        }));
        assert_eq!(info.name.as_deref(), Some("testdrive"));
        assert_eq!(info.health.as_deref(), Some("GREEN"));
        assert!(info.suspended);
        assert_eq!(info.raw["project_id"], json!("p1"));
    }

    #[test]
    fn test_import_request_shape() {
        let request = ImportJobRequest {
            kind: "url".into(),
            url: ImportUrl {
                url: "https://example.org/data.csv.gz".into(),
            },
            format: "csv".into(),
            compression: Some("gzip".into()),
            destination: ImportDestination {
                table: "data".into(),
                create_table: true,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], json!("url"));
        assert_eq!(value["url"]["url"], json!("https://example.org/data.csv.gz"));
        assert_eq!(value["destination"]["table"], json!("data"));
    }
}
