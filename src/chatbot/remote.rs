use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::ChatRequest;

/// Shape of the remote service's reply; it has used each of these names.
#[derive(Debug, Default, Deserialize)]
struct RemoteReply {
    response: Option<String>,
    reply: Option<String>,
    message: Option<String>,
}

impl RemoteReply {
    fn into_text(self) -> Option<String> {
        [self.response, self.reply, self.message]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }
}

/// Client for the optional external chat service.
#[derive(Debug, Clone)]
pub struct ChatService {
    client: reqwest::Client,
    remote_url: Option<String>,
}

impl ChatService {
    pub fn new(remote_url: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, remote_url })
    }

    pub fn has_remote(&self) -> bool {
        self.remote_url.is_some()
    }

    /// Forwards the message to the remote service.
    ///
    /// Returns `None` when no remote is configured or it fails in any way
    /// (transport error, non-2xx status, unreadable or empty body).
    pub async fn ask_remote(&self, request: &ChatRequest) -> Option<String> {
        let url = self.remote_url.as_deref()?;

        let resp = match self.client.post(url).json(request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Chat service unreachable, using local rules");
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "Chat service returned an error, using local rules");
            return None;
        }

        match resp.json::<RemoteReply>().await {
            Ok(body) => {
                let text = body.into_text();
                if text.is_none() {
                    debug!("Chat service reply had no text, using local rules");
                }
                text
            }
            Err(e) => {
                warn!(error = %e, "Chat service reply was not valid JSON, using local rules");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest {
            message: "hola".into(),
            username: "ana".into(),
            rol: "cliente".into(),
        }
    }

    #[test]
    fn reply_prefers_response_then_reply_then_message() {
        let r = RemoteReply {
            response: None,
            reply: Some("from reply".into()),
            message: Some("from message".into()),
        };
        assert_eq!(r.into_text().as_deref(), Some("from reply"));

        let r = RemoteReply {
            response: Some("  ".into()),
            reply: None,
            message: Some("from message".into()),
        };
        assert_eq!(r.into_text().as_deref(), Some("from message"));

        assert_eq!(RemoteReply::default().into_text(), None);
    }

    #[tokio::test]
    async fn no_remote_configured_yields_none() {
        let svc = ChatService::new(None, Duration::from_secs(1)).unwrap();
        assert!(!svc.has_remote());
        assert_eq!(svc.ask_remote(&request()).await, None);
    }

    #[tokio::test]
    async fn unreachable_remote_yields_none() {
        // Port 9 (discard) on loopback is closed in test environments.
        let svc = ChatService::new(Some("http://127.0.0.1:9/chat".into()), Duration::from_millis(500)).unwrap();
        assert!(svc.has_remote());
        assert_eq!(svc.ask_remote(&request()).await, None);
    }
}
