//! Telegram Bot API HTTP client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::error::TelegramError;
use crate::types::{
    AnswerCallbackParams, GetUpdatesParams, ReplyMarkup, SendMessageParams, SentMessage, Update,
    User,
};

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i32>,
    #[serde(default)]
    description: Option<String>,
}

/// Client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    config: BotConfig,
    connected: Arc<AtomicBool>,
}

impl TelegramClient {
    /// Connect to the Bot API and verify the token.
    pub async fn connect(config: BotConfig) -> Result<Self, TelegramError> {
        let client = Self::new(config)?;

        let me = client.get_me().await?;
        if !me.is_bot {
            return Err(TelegramError::HealthCheckFailed);
        }
        client.connected.store(true, Ordering::SeqCst);
        info!(
            "Connected to Bot API at {} as @{}",
            client.config.api_url,
            me.username.as_deref().unwrap_or("?")
        );

        Ok(client)
    }

    /// Build a client without contacting the API.
    pub fn new(config: BotConfig) -> Result<Self, TelegramError> {
        if config.token.trim().is_empty() {
            return Err(TelegramError::Config("bot token is empty".to_string()));
        }

        // Requests must outlive the server-side long-poll timeout.
        let http = Client::builder()
            .timeout(config.poll_timeout + Duration::from_secs(15))
            .build()
            .map_err(TelegramError::Http)?;

        Ok(Self {
            http,
            config,
            connected: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Check if the last API call succeeded.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Get the bot's own user.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call::<(), _>("getMe", None).await
    }

    /// Send a message using the full parameter set.
    pub async fn send(&self, params: SendMessageParams) -> Result<SentMessage, TelegramError> {
        self.call("sendMessage", Some(params)).await
    }

    /// Send a plain text message.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<SentMessage, TelegramError> {
        self.send(SendMessageParams::text(chat_id, text)).await
    }

    /// Send a text message with a keyboard attached.
    pub async fn send_with_markup(
        &self,
        chat_id: i64,
        text: &str,
        markup: ReplyMarkup,
    ) -> Result<SentMessage, TelegramError> {
        self.send(SendMessageParams::text(chat_id, text).with_markup(markup))
            .await
    }

    /// Acknowledge an inline button press so the client stops its spinner.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<(), TelegramError> {
        let params = AnswerCallbackParams {
            callback_query_id: callback_query_id.to_string(),
            text: text.map(str::to_string),
        };
        let _: bool = self.call("answerCallbackQuery", Some(params)).await?;
        Ok(())
    }

    /// Long-poll for updates starting at `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdatesParams {
            offset,
            timeout: self.config.poll_timeout.as_secs(),
            allowed_updates: vec!["message".to_string(), "callback_query".to_string()],
        };
        self.call("getUpdates", Some(params)).await
    }

    /// Get the configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Make a Bot API call.
    async fn call<P: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: Option<P>,
    ) -> Result<R, TelegramError> {
        let url = self.config.method_url(method);
        debug!("API call: {}", method);

        let request = self.http.post(&url);
        let request = match params {
            Some(ref params) => request.json(params),
            None => request,
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.connected.store(false, Ordering::SeqCst);
                return Err(TelegramError::Http(e));
            }
        };

        // The Bot API reports failures in the body even on 4xx statuses.
        let body = response.text().await.map_err(TelegramError::Http)?;
        let api_response: ApiResponse<R> = serde_json::from_str(&body)?;
        self.connected.store(true, Ordering::SeqCst);

        parse_response(api_response)
    }
}

fn parse_response<R>(response: ApiResponse<R>) -> Result<R, TelegramError> {
    if !response.ok {
        return Err(TelegramError::Api {
            code: response.error_code.unwrap_or(-1),
            description: response
                .description
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    response.result.ok_or_else(|| TelegramError::Api {
        code: -1,
        description: "No result in response".to_string(),
    })
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}
