//! Telegram Bot API notification sink.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// JSON body for `sendMessage`.
#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Subset of the Bot API response envelope.
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Delivers messages to one Telegram chat.
///
/// One POST per message with a bounded timeout and no retries.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Creates a notifier for `chat_id` using bot `token`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Notification`] if the HTTP client cannot be
    /// built.
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Notification(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// Sends `text` as an HTML message. Never fails: the outcome is logged
    /// and returned as `true` on delivery.
    pub async fn send(&self, text: &str) -> bool {
        match self.try_send(text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, chat_id = %self.chat_id, "telegram send failed");
                false
            }
        }
    }

    async fn try_send(&self, text: &str) -> Result<(), BridgeError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let body = SendMessageBody {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };

        // The request URL embeds the bot token; strip it from errors.
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BridgeError::Notification(e.without_url().to_string()))?;

        let status = response.status();
        let reply: BotApiResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::Notification(e.without_url().to_string()))?;

        if reply.ok {
            Ok(())
        } else {
            Err(BridgeError::Notification(format!(
                "bot api rejected message ({status}): {}",
                reply.description.unwrap_or_default()
            )))
        }
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves exactly one HTTP request with `reply_json` and hands back the
    /// raw request text.
    async fn one_shot_server(reply_json: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("local_addr");
        };
        let handle = tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                panic!("accept");
            };
            let mut buf = vec![0_u8; 16 * 1024];
            let mut request = String::new();
            loop {
                let Ok(n) = socket.read(&mut buf).await else {
                    panic!("read");
                };
                request.push_str(&String::from_utf8_lossy(buf.get(..n).unwrap_or_default()));
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                reply_json.len(),
                reply_json
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn request_complete(request: &str) -> bool {
        let Some((head, body)) = request.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        body.len() >= length
    }

    fn notifier(base: &str) -> TelegramNotifier {
        let Ok(n) = TelegramNotifier::new(base, "123:secret", "-1001", Duration::from_secs(5))
        else {
            panic!("client");
        };
        n
    }

    #[tokio::test]
    async fn posts_html_message_to_bot_endpoint() {
        let (base, server) = one_shot_server(r#"{"ok":true,"result":{}}"#).await;
        assert!(notifier(&base).send("<b>hi</b>").await);

        let Ok(request) = server.await else {
            panic!("server task");
        };
        assert!(request.starts_with("POST /bot123:secret/sendMessage"));
        assert!(request.contains(r#""chat_id":"-1001""#));
        assert!(request.contains(r#""parse_mode":"HTML""#));
        assert!(request.contains(r#""text":"<b>hi</b>""#));
    }

    #[tokio::test]
    async fn rejected_message_reports_failure() {
        let (base, _server) =
            one_shot_server(r#"{"ok":false,"description":"Bad Request: chat not found"}"#).await;
        assert!(!notifier(&base).send("hi").await);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_swallowed() {
        assert!(!notifier("http://127.0.0.1:1").send("hi").await);
    }

    #[test]
    fn debug_redacts_token() {
        let text = format!("{:?}", notifier("http://localhost"));
        assert!(!text.contains("secret"));
    }
}
