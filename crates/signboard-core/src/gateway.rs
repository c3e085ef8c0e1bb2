//! HTTP client for the signboard backend API.
//!
//! Thin wrapper over `reqwest`; every operation maps to one endpoint.
//! Failures surface as [`GatewayError`] and mean "no state change
//! occurred" -- callers recover on their next scheduled cycle.

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::GatewayError;
use crate::message::{Message, MessageDraft, Stats};

/// Response to a message submission.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Submitted {
    pub success: bool,
    pub id: i64,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Ack {
    pub success: bool,
}

/// Recent celebration triggers recorded by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerPoll {
    /// Epoch-second timestamps inside the recent window.
    pub triggers: Vec<f64>,
    pub count: usize,
}

/// Client for the backend gateway.
#[derive(Debug, Clone)]
pub struct Gateway {
    base: Url,
    http: Client,
}

impl Gateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            base: Url::parse(base_url)?,
            http: Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetch the full queue snapshot, unshown first, oldest first.
    pub async fn list_messages(&self) -> Result<Vec<Message>, GatewayError> {
        self.request(Method::GET, "/api/messages", "list messages", None)
            .await
    }

    /// Submit a sanitized draft; returns the backend-assigned id.
    pub async fn submit(&self, draft: &MessageDraft) -> Result<i64, GatewayError> {
        let body = serde_json::to_value(draft).map_err(|_| GatewayError::Rejected {
            operation: "add message",
        })?;
        let resp: Submitted = self
            .request(Method::POST, "/api/messages", "add message", Some(body))
            .await?;
        if !resp.success {
            return Err(GatewayError::Rejected {
                operation: "add message",
            });
        }
        Ok(resp.id)
    }

    /// Mark one message as shown.
    pub async fn mark_shown(&self, id: i64) -> Result<(), GatewayError> {
        let _: Ack = self
            .request(
                Method::PUT,
                &format!("/api/messages/{id}/shown"),
                "mark shown",
                None,
            )
            .await?;
        Ok(())
    }

    /// Reset every message back to unshown.
    pub async fn reset_shown(&self) -> Result<(), GatewayError> {
        let _: Ack = self
            .request(
                Method::POST,
                "/api/messages/reset-shown",
                "reset shown",
                None,
            )
            .await?;
        Ok(())
    }

    /// Delete a single message.
    pub async fn delete_message(&self, id: i64) -> Result<(), GatewayError> {
        let _: Ack = self
            .request(
                Method::DELETE,
                &format!("/api/messages/{id}"),
                "delete message",
                None,
            )
            .await?;
        Ok(())
    }

    /// Clear the whole queue.
    pub async fn clear_messages(&self) -> Result<(), GatewayError> {
        let _: Ack = self
            .request(Method::DELETE, "/api/messages", "clear messages", None)
            .await?;
        Ok(())
    }

    /// Aggregate queue statistics.
    pub async fn stats(&self) -> Result<Stats, GatewayError> {
        self.request(Method::GET, "/api/stats", "get stats", None)
            .await
    }

    /// Record an admin celebration trigger.
    pub async fn trigger_celebration(&self) -> Result<(), GatewayError> {
        let resp = self
            .http
            .post(self.endpoint("/api/celebration")?)
            .send()
            .await?;
        Self::check("trigger celebration", resp.status())?;
        Ok(())
    }

    /// Poll the count of recent admin triggers.
    pub async fn poll_triggers(&self) -> Result<TriggerPoll, GatewayError> {
        self.request(
            Method::GET,
            "/api/celebration/poll",
            "poll celebration triggers",
            None,
        )
        .await
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        Ok(self.base.join(path)?)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        operation: &'static str,
        body: Option<serde_json::Value>,
    ) -> Result<T, GatewayError> {
        let mut req = self.http.request(method, self.endpoint(path)?);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;
        Self::check(operation, resp.status())?;
        Ok(resp.json().await?)
    }

    fn check(operation: &'static str, status: reqwest::StatusCode) -> Result<(), GatewayError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(GatewayError::Status {
                operation,
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":1,"line1":"HI","line2":"","line3":"","line4":"","shown":false,
                     "timestamp":"2026-08-27T10:00:00Z"}]"#,
            )
            .create_async()
            .await;

        let gateway = Gateway::new(&server.url()).unwrap();
        let messages = gateway.list_messages().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, 1);
        assert_eq!(messages[0].line1, "HI");
        assert!(!messages[0].shown);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn submit_posts_sanitized_draft_and_returns_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/messages")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "line1": "HELLO WORLD!!",
                "line2": "",
                "line3": "",
                "line4": ""
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"id":42}"#)
            .create_async()
            .await;

        let gateway = Gateway::new(&server.url()).unwrap();
        let draft = MessageDraft::new("hello world!!", "", "", "").unwrap();
        assert_eq!(gateway.submit(&draft).await.unwrap(), 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn marks_message_shown() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/messages/7/shown")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let gateway = Gateway::new(&server.url()).unwrap();
        gateway.mark_shown(7).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_maps_to_gateway_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/stats")
            .with_status(500)
            .create_async()
            .await;

        let gateway = Gateway::new(&server.url()).unwrap();
        match gateway.stats().await {
            Err(GatewayError::Status { operation, status }) => {
                assert_eq!(operation, "get stats");
                assert_eq!(status, 500);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn polls_trigger_counts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/celebration/poll")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"triggers":[1756288000.1,1756288001.2],"count":2}"#)
            .create_async()
            .await;

        let gateway = Gateway::new(&server.url()).unwrap();
        let poll = gateway.poll_triggers().await.unwrap();
        assert_eq!(poll.count, 2);
        assert_eq!(poll.triggers.len(), 2);
    }
}
