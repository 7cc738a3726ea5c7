use std::time::Duration;

use automarket_core::{ItemEnvelope, ListEnvelope, Page};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// Таймаут установки соединения.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Таймаут запроса по умолчанию.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент REST API маркетплейса.
///
/// Аналог axios-инстанса с интерцептором: базовый URL, таймауты и
/// `Authorization: Bearer <token>` для каждого запроса, если токен задан.
pub struct HttpClient {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl HttpClient {
    /// Создаёт клиент с таймаутом по умолчанию.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Создаёт клиент с заданным таймаутом запроса.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidRequest(format!(
                "base url must start with http:// or https://: {base_url}"
            )));
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url,
            client,
            token: None,
        })
    }

    /// Базовый URL API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Устанавливает bearer-токен. Пустой токен сбрасывает авторизацию.
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into().trim().to_string();
        self.token = (!token.is_empty()).then_some(token);
    }

    /// Сбрасывает токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Текущий токен.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "api request");
        let request = self.client.request(method, self.endpoint(path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Разбирает тело ошибки: `message`, затем `error`, затем текст по
    /// умолчанию для операции.
    async fn decode_error(response: Response, fallback: &str) -> ClientError {
        let status = response.status();
        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .message
                .or(body.error)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
            Err(_) => fallback.to_string(),
        };
        warn!(%status, %message, "api request failed");
        ClientError::from_http_status(status, message)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> ClientResult<T> {
        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response, fallback).await);
        }

        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        serde_json::from_slice::<T>(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
    }

    /// Достаёт `data` из `{success, data, message}`.
    fn unwrap_item<T>(envelope: ItemEnvelope<T>, fallback: &str) -> ClientResult<T> {
        if !envelope.success {
            return Err(rejected_envelope(envelope.message, fallback));
        }
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response envelope has no data".to_string()))
    }

    /// GET списка в конверте `{success, data, meta}`.
    pub(crate) async fn get_page<T, Q>(
        &self,
        path: &str,
        query: &Q,
        fallback: &str,
    ) -> ClientResult<Page<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).query(query);
        let envelope: ListEnvelope<T> = self.execute(request, fallback).await?;
        if !envelope.success {
            return Err(rejected_envelope(envelope.message, fallback));
        }
        Ok(Page::from_envelope(envelope))
    }

    /// GET одной сущности в конверте `{success, data}`.
    pub(crate) async fn get_item<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> ClientResult<T> {
        let request = self.request(Method::GET, path);
        let envelope: ItemEnvelope<T> = self.execute(request, fallback).await?;
        Self::unwrap_item(envelope, fallback)
    }

    /// POST/PUT с JSON-телом, ответ: сущность в конверте.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path).json(body);
        let envelope: ItemEnvelope<T> = self.execute(request, fallback).await?;
        Self::unwrap_item(envelope, fallback)
    }

    /// `multipart/form-data`, ответ: сущность в конверте.
    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Form,
        fallback: &str,
    ) -> ClientResult<T> {
        let request = self.request(method, path).multipart(form);
        let envelope: ItemEnvelope<T> = self.execute(request, fallback).await?;
        Self::unwrap_item(envelope, fallback)
    }

    /// DELETE; тело успешного ответа не требуется, но `{success: false}`
    /// считается ошибкой.
    pub(crate) async fn delete(&self, path: &str, fallback: &str) -> ClientResult<()> {
        let response = self
            .request(Method::DELETE, path)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response, fallback).await);
        }

        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        if bytes.is_empty() {
            return Ok(());
        }
        match serde_json::from_slice::<ItemEnvelope<serde_json::Value>>(&bytes) {
            Ok(envelope) if !envelope.success => {
                Err(rejected_envelope(envelope.message, fallback))
            }
            _ => Ok(()),
        }
    }
}

fn rejected_envelope(message: Option<String>, fallback: &str) -> ClientError {
    let message = message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    warn!(%message, "api returned success=false");
    ClientError::Rejected {
        status: 200,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:5000/").expect("client must build");
        let full = client.endpoint("/api/cars");
        assert_eq!(full, "http://localhost:5000/api/cars");
    }

    #[test]
    fn new_rejects_base_url_without_scheme() {
        let err = HttpClient::new("localhost:5000").expect_err("must fail");
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[test]
    fn set_token_ignores_blank_values() {
        let mut client = HttpClient::new("http://localhost:5000").expect("client must build");
        client.set_token("  jwt  ");
        assert_eq!(client.token(), Some("jwt"));

        client.set_token("   ");
        assert!(client.token().is_none());
    }

    #[test]
    fn unwrap_item_prefers_backend_message() {
        let envelope = ItemEnvelope::<i32> {
            success: false,
            data: None,
            message: Some("Машина уже продана".to_string()),
        };
        let err = HttpClient::unwrap_item(envelope, "fallback").expect_err("must fail");
        assert_eq!(err.to_string(), "Машина уже продана");
    }

    #[test]
    fn unwrap_item_requires_data() {
        let envelope = ItemEnvelope::<i32> {
            success: true,
            data: None,
            message: None,
        };
        let err = HttpClient::unwrap_item(envelope, "fallback").expect_err("must fail");
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
