//! HTTP implementation of [`ControlPlane`].

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use snafu::prelude::*;
use tracing::debug;
use url::Url;

use super::{
    ClusterInformation, ControlPlane, DeployRequest, ImportJobRequest, Project, ProjectRequest,
};
use crate::config::CloudConfig;
use crate::error::{
    ClientBuildSnafu, ControlPlaneError, DecodeSnafu, InvalidUrlSnafu, MissingCredentialsSnafu,
    NotFoundSnafu, RequestSnafu,
};
use crate::job::CloudJob;

/// Control plane client authenticating with an API key and secret.
#[derive(Debug, Clone)]
pub struct CloudApi {
    client: Client,
    base: Url,
    key: String,
    secret: String,
}

impl CloudApi {
    /// Build a client from configuration, with environment fallbacks.
    pub fn from_config(config: &CloudConfig) -> Result<Self, ControlPlaneError> {
        let key = config.api_key().context(MissingCredentialsSnafu)?;
        let secret = config.api_secret().context(MissingCredentialsSnafu)?;
        let url = config.api_url();
        let base = Url::parse(&url).context(InvalidUrlSnafu { url })?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context(ClientBuildSnafu)?;
        Ok(Self {
            client,
            base,
            key,
            secret,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<(Url, RequestBuilder), ControlPlaneError> {
        let url = self.base.join(path).context(InvalidUrlSnafu {
            url: format!("{}{}", self.base, path),
        })?;
        debug!(%method, %url, "Control plane request");
        let builder = self
            .client
            .request(method, url.clone())
            .basic_auth(&self.key, Some(&self.secret));
        Ok((url, builder))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ControlPlaneError> {
        let (url, builder) = self.request(Method::GET, path)?;
        let response = builder.send().await.context(RequestSnafu {
            url: url.to_string(),
        })?;
        decode(path, url, response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ControlPlaneError> {
        let (url, builder) = self.request(Method::POST, path)?;
        let response = builder.json(body).send().await.context(RequestSnafu {
            url: url.to_string(),
        })?;
        decode(path, url, response).await
    }
}

async fn decode<T: DeserializeOwned>(
    path: &str,
    url: Url,
    response: Response,
) -> Result<T, ControlPlaneError> {
    let status = response.status();
    if status.as_u16() == 404 {
        return Err(ControlPlaneError::NotFound {
            resource: format!("Resource {path}"),
        });
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ControlPlaneError::Api {
            status: status.as_u16(),
            path: path.to_string(),
            message: error_message(&message),
        });
    }
    response.json().await.context(DecodeSnafu {
        url: url.to_string(),
    })
}

/// Pull `message` out of a JSON error document, else return the body as is.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|doc| doc.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// The cluster document named `name`. No match is `NotFound`.
fn find_by_name(clusters: Vec<Value>, name: &str) -> Result<ClusterInformation, ControlPlaneError> {
    clusters
        .into_iter()
        .find(|cluster| cluster.get("name").and_then(Value::as_str) == Some(name))
        .map(ClusterInformation::from_document)
        .context(NotFoundSnafu {
            resource: format!("Cluster '{name}'"),
        })
}

#[async_trait]
impl ControlPlane for CloudApi {
    async fn get_cluster(&self, id: &str) -> Result<ClusterInformation, ControlPlaneError> {
        match self.get(&format!("/api/v2/clusters/{id}/")).await {
            Ok(document) => Ok(ClusterInformation::from_document(document)),
            Err(e) if e.is_not_found() => Err(ControlPlaneError::NotFound {
                resource: format!("Cluster '{id}'"),
            }),
            Err(e) => Err(e),
        }
    }

    async fn get_cluster_by_name(
        &self,
        name: &str,
    ) -> Result<ClusterInformation, ControlPlaneError> {
        let clusters: Vec<Value> = self.get("/api/v2/clusters/").await?;
        find_by_name(clusters, name)
    }

    async fn deploy_cluster(&self, request: &DeployRequest) -> Result<(), ControlPlaneError> {
        let _: Value = self.post("/api/v2/clusters/", request).await?;
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ControlPlaneError> {
        self.get("/api/v2/projects/").await
    }

    async fn create_project(&self, request: &ProjectRequest) -> Result<Project, ControlPlaneError> {
        self.post("/api/v2/projects/", request).await
    }

    async fn submit_import_job(
        &self,
        cluster_id: &str,
        request: &ImportJobRequest,
    ) -> Result<CloudJob, ControlPlaneError> {
        let document: Value = self
            .post(&format!("/api/v2/clusters/{cluster_id}/import-jobs/"), request)
            .await?;
        Ok(CloudJob::new(document))
    }

    async fn list_import_jobs(&self, cluster_id: &str) -> Result<Vec<CloudJob>, ControlPlaneError> {
        let documents: Vec<Value> = self
            .get(&format!("/api/v2/clusters/{cluster_id}/import-jobs/"))
            .await?;
        Ok(documents.into_iter().map(CloudJob::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer exactly one request with a canned response.
    async fn serve_once(status: &'static str, body: &'static str) -> CloudApi {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        CloudApi::from_config(&CloudConfig {
            api_url: Some(format!("http://{addr}")),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_http_404_is_not_found() {
        let api = serve_once("404 Not Found", r#"{"message": "Not found."}"#).await;
        let err = api.get_cluster("abc").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Cluster 'abc' not found");
    }

    #[tokio::test]
    async fn test_http_error_carries_message() {
        let api = serve_once("500 Internal Server Error", r#"{"message": "boom"}"#).await;
        let err = api.list_projects().await.unwrap_err();
        assert!(!err.is_not_found());
        match err {
            ControlPlaneError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected Api, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lookup_by_name_without_match() {
        let api = serve_once("200 OK", r#"[{"id": "1", "name": "other"}]"#).await;
        let err = api.get_cluster_by_name("testdrive").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_find_by_name() {
        let clusters = vec![
            json!({"id": "1", "name": "other"}),
            json!({"id": "2", "name": "testdrive"}),
        ];
        let info = find_by_name(clusters.clone(), "testdrive").unwrap();
        assert_eq!(info.id.as_deref(), Some("2"));

        let err = find_by_name(clusters, "missing").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Cluster 'missing' not found");

        assert!(find_by_name(vec![], "testdrive").unwrap_err().is_not_found());
    }

    #[test]
    fn test_missing_credentials() {
        let config = CloudConfig {
            api_key: Some("key".into()),
            api_secret: None,
            ..Default::default()
        };
        // Only meaningful when the fallback variable is absent.
        if std::env::var(crate::config::API_SECRET_ENV).is_err() {
            let err = CloudApi::from_config(&config).unwrap_err();
            assert!(matches!(err, ControlPlaneError::MissingCredentials));
        }
    }

    #[test]
    fn test_from_config() {
        let config = CloudConfig {
            api_url: Some("https://console.example.org".into()),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            timeout_secs: Some(5),
        };
        let api = CloudApi::from_config(&config).unwrap();
        assert_eq!(api.base_url().as_str(), "https://console.example.org/");
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"message": "Invalid token"}"#), "Invalid token");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
