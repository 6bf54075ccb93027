use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{ContentSource, Page, QueryResponse};
use crate::config::Config;
use crate::error::{PortfolioError, Result};

/// REST client for the content source. Every request is bounded by the
/// configured timeout.
pub struct NotionClient {
    http: Client,
    config: Config,
}

impl NotionClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let key = self.config.api_key()?;
        Ok(req
            .bearer_auth(key)
            .header("Notion-Version", self.config.notion_version.as_str()))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(PortfolioError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ContentSource for NotionClient {
    async fn query(&self, body: &Value) -> Result<QueryResponse> {
        let url = format!(
            "{}/databases/{}/query",
            self.config.api_base,
            self.config.database_id()?
        );
        debug!("Querying {}", url);
        let req = self.authorized(self.http.post(&url))?.json(body);
        let res: QueryResponse = self.send(req).await?;
        if res.has_more {
            debug!("Query returned a partial page ({} results)", res.results.len());
        }
        Ok(res)
    }

    async fn retrieve(&self, page_id: &str) -> Result<Page> {
        let url = format!("{}/pages/{}", self.config.api_base, page_id);
        debug!("Retrieving {}", url);
        let req = self.authorized(self.http.get(&url))?;
        self.send(req).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;

    fn client_for(server: &Server) -> NotionClient {
        NotionClient::new(Config {
            api_key: Some("secret_test".into()),
            database_id: Some("db123".into()),
            api_base: server.url(),
            timeout: Duration::from_secs(2),
            ..Config::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn query_posts_body_with_auth_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/databases/db123/query")
            .match_header("authorization", "Bearer secret_test")
            .match_header("notion-version", "2022-06-28")
            .match_body(Matcher::PartialJson(json!({"page_size": 50})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"results": [{"id": "p1", "properties": {}}], "has_more": false}).to_string())
            .create_async()
            .await;

        let res = client_for(&server)
            .query(&json!({"page_size": 50}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(res.results.len(), 1);
        assert_eq!(res.results[0].id, "p1");
    }

    #[tokio::test]
    async fn retrieve_gets_single_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/pages/0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0")
            .match_header("authorization", "Bearer secret_test")
            .with_status(200)
            .with_body(json!({"id": "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0", "properties": {}}).to_string())
            .create_async()
            .await;

        let page = client_for(&server)
            .retrieve("0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.id, "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/databases/db123/query")
            .with_status(401)
            .with_body(r#"{"code":"unauthorized"}"#)
            .create_async()
            .await;

        let err = client_for(&server).query(&json!({})).await.unwrap_err();
        match err {
            PortfolioError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("unauthorized"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/pages/abc")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server).retrieve("abc").await.unwrap_err();
        assert!(matches!(err, PortfolioError::Decode(_)));
    }

    #[tokio::test]
    async fn unresponsive_source_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and hold them open without ever answering.
        let _accept = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                held.push(sock);
            }
        });

        let client = NotionClient::new(Config {
            api_key: Some("secret_test".into()),
            database_id: Some("db123".into()),
            api_base: format!("http://{}", addr),
            timeout: Duration::from_millis(300),
            ..Config::default()
        })
        .unwrap();

        let err = client.query(&json!({})).await.unwrap_err();
        assert!(matches!(err, PortfolioError::Timeout), "got {err:?}");

        let err = client.retrieve("abc").await.unwrap_err();
        assert!(matches!(err, PortfolioError::Timeout), "got {err:?}");
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_request() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let client = NotionClient::new(Config {
            api_base: server.url(),
            ..Config::default()
        })
        .unwrap();
        let err = client.query(&json!({})).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, PortfolioError::MissingConfig(_)));
    }
}
