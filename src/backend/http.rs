use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::ApiError;
use super::traits::EmailBackend;
use super::types::{
    Endpoint, ErrorBody, FeedbackRequest, FeedbackResponse, FinalizeRequest, FinalizeResponse,
    GenerateRequest, GenerateResponse, SendEmailRequest, SendEmailResponse, SessionSnapshot,
};
use crate::app::BackendConfig;
use crate::utils::WizardError;

/// reqwest-backed client for the generation service
pub struct HttpBackend {
    client: Client,
    health_client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the backend described by `config`
    pub fn new(config: &BackendConfig) -> Result<Self, WizardError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WizardError::Config(format!("Failed to build HTTP client: {}", e)))?;

        // Shorter timeout for liveness probes so startup never hangs
        let health_client = Client::builder()
            .timeout(Duration::from_secs(config.health_timeout_secs))
            .build()
            .map_err(|e| WizardError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            health_client,
            base_url: config.resolved_base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint.path());
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl EmailBackend for HttpBackend {
    async fn probe(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.health_client.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Backend {
                status: status.as_u16(),
                message: None,
            })
        }
    }

    async fn generate(&self, topic: &str) -> Result<GenerateResponse, ApiError> {
        self.post(Endpoint::Generate, &GenerateRequest { topic }).await
    }

    async fn feedback(
        &self,
        session_id: &str,
        feedback: &str,
    ) -> Result<FeedbackResponse, ApiError> {
        self.post(
            Endpoint::Feedback,
            &FeedbackRequest {
                session_id,
                feedback,
            },
        )
        .await
    }

    async fn finalize(&self, session_id: &str) -> Result<FinalizeResponse, ApiError> {
        self.post(Endpoint::Finalize, &FinalizeRequest { session_id })
            .await
    }

    async fn send_email(
        &self,
        session_id: &str,
        email: &str,
    ) -> Result<SendEmailResponse, ApiError> {
        self.post(Endpoint::SendEmail, &SendEmailRequest { session_id, email })
            .await
    }

    async fn session(&self, session_id: &str) -> Result<SessionSnapshot, ApiError> {
        let url = format!("{}/{}", self.url(Endpoint::Session.path()), session_id);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }
}

/// Turn a response into `R`, mapping non-2xx and `success: false` to errors
async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Backend {
            status: status.as_u16(),
            message: error_message(&text),
        });
    }

    parse_body(status.as_u16(), &text)
}

fn parse_body<R: DeserializeOwned>(status: u16, text: &str) -> Result<R, ApiError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ApiError::Unexpected(format!("response is not valid JSON: {}", e)))?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Backend {
            status,
            message: value
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }

    serde_json::from_value(value).map_err(|e| ApiError::Unexpected(e.to_string()))
}

fn error_message(text: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(text)
        .ok()
        .and_then(|body| body.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{check_health, BackendStatus};
    use crate::workflow::{Step, WorkflowController};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    type Recorded = Arc<Mutex<Vec<(String, String)>>>;

    /// Minimal loopback HTTP/1.1 server answering canned responses by path
    async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> (String, Recorded) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: HashMap<&str, (u16, &str)> = routes
            .into_iter()
            .map(|(path, status, body)| (path, (status, body)))
            .collect();
        let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&recorded);

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                handle_request(stream, &routes, &log).await;
            }
        });

        (format!("http://{}", addr), recorded)
    }

    async fn handle_request(
        mut stream: TcpStream,
        routes: &HashMap<&str, (u16, &str)>,
        log: &Recorded,
    ) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let path = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("")
            .to_string();
        let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
        // Record before answering so the client never observes a missing entry
        log.lock().unwrap().push((path.clone(), body));

        let (status, reply) = routes.get(path.as_str()).copied().unwrap_or((404, ""));
        let response = format!(
            "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reply.len(),
            reply
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
    }

    fn backend_for(base_url: &str) -> HttpBackend {
        HttpBackend::new(&BackendConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            health_timeout_secs: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_posts_topic() {
        let (url, recorded) = serve(vec![(
            "/api/generate",
            200,
            r#"{"success": true, "session_id": "abc123", "content": "Dear team,"}"#,
        )])
        .await;

        let resp = backend_for(&url).generate("Kickoff").await.unwrap();
        assert_eq!(resp.session_id, "abc123");
        assert_eq!(resp.content, "Dear team,");

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded[0].0, "/api/generate");
        let sent: Value = serde_json::from_str(&recorded[0].1).unwrap();
        assert_eq!(sent, serde_json::json!({"topic": "Kickoff"}));
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let (url, _) = serve(vec![(
            "/api/finalize",
            400,
            r#"{"error": "Invalid or expired session", "success": false}"#,
        )])
        .await;

        let err = backend_for(&url).finalize("gone").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Invalid or expired session"));
    }

    #[tokio::test]
    async fn test_session_snapshot_path() {
        let (url, recorded) = serve(vec![(
            "/api/session/abc123",
            200,
            r#"{"session_id": "abc123", "topic": "Kickoff", "feedback_history": []}"#,
        )])
        .await;

        let snapshot = backend_for(&url).session("abc123").await.unwrap();
        assert_eq!(snapshot.topic, "Kickoff");
        assert_eq!(recorded.lock().unwrap()[0].0, "/api/session/abc123");
    }

    #[tokio::test]
    async fn test_health_falls_back_to_api_path() {
        let (url, recorded) = serve(vec![("/api/health", 200, r#"{"status": "ok"}"#)]).await;

        let backend = backend_for(&url);
        assert_eq!(check_health(&backend).await, BackendStatus::Online);

        let paths: Vec<String> = recorded
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect();
        assert_eq!(paths, vec!["/health", "/api/health"]);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = backend_for(&format!("http://{}", addr));
        let err = backend.generate("Kickoff").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(check_health(&backend).await, BackendStatus::Offline);
    }

    #[tokio::test]
    async fn test_timeout_leaves_workflow_at_topic() {
        // Accepts connections and never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let backend = HttpBackend::new(&BackendConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 1,
            health_timeout_secs: 1,
        })
        .unwrap();
        let err = backend.generate("Kickoff").await.unwrap_err();
        assert!(err.is_timeout());

        let mut controller = WorkflowController::new(Arc::new(backend));
        let err = controller
            .submit_topic("Meeting invitation for project kickoff")
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::Network { .. }));
        assert_eq!(err.to_string(), "Failed to generate email");
        assert_eq!(controller.step(), Step::Topic);
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_success_false_is_backend_error() {
        let err = parse_body::<FinalizeResponse>(200, r#"{"success": false, "error": "nope"}"#)
            .unwrap_err();
        assert_eq!(err.server_message(), Some("nope"));
    }

    #[test]
    fn test_malformed_body_is_unexpected() {
        let err = parse_body::<GenerateResponse>(200, "<html>proxy error</html>").unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));

        let err = parse_body::<GenerateResponse>(200, r#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": "Topic is required"}"#).as_deref(),
            Some("Topic is required")
        );
        assert_eq!(error_message("Internal Server Error"), None);
        assert_eq!(error_message("{}"), None);
    }
}
