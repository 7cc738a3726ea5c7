//! Клиентская библиотека REST API автомаркетплейса.
//!
//! Предоставляет единый API (`MarketplaceClient`) поверх `reqwest`:
//! - объявления (`CarsApi`)
//! - дилеры (`DealersApi`) и автосалоны (`AutosalonsApi`)
//!
//! Клиент хранит JWT-токен и добавляет его в каждый запрос. Ошибки бэкенда
//! приводятся к `ClientError`, текст которой можно показывать пользователю.
#![warn(missing_docs)]

mod catalog;
mod error;
mod http_client;
mod services;
mod upload;

pub use catalog::CarCatalog;
pub use error::{ClientError, ClientResult};
pub use http_client::{DEFAULT_TIMEOUT, HttpClient};
pub use services::{AutosalonsApi, CarsApi, CompanyApi, DealersApi};
pub use upload::UploadFile;

use std::time::Duration;

#[derive(Debug, Clone)]
/// Клиент маркетплейса: хранит токен и выдаёт обёртки ресурсов.
pub struct MarketplaceClient {
    http: HttpClient,
}

impl MarketplaceClient {
    /// Создаёт клиент с таймаутом по умолчанию.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    /// Создаёт клиент с заданным таймаутом запроса.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::with_timeout(base_url, timeout)?,
        })
    }

    /// Базовый URL API.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Устанавливает JWT-токен. Пустая строка сбрасывает его.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.http.set_token(token);
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn token(&self) -> Option<&str> {
        self.http.token()
    }

    /// Очищает JWT-токен.
    pub fn clear_token(&mut self) {
        self.http.clear_token();
    }

    /// Объявления.
    pub fn cars(&self) -> CarsApi<'_> {
        CarsApi::new(&self.http)
    }

    /// Дилеры.
    pub fn dealers(&self) -> DealersApi<'_> {
        DealersApi::dealers(&self.http)
    }

    /// Автосалоны.
    pub fn autosalons(&self) -> AutosalonsApi<'_> {
        AutosalonsApi::autosalons(&self.http)
    }
}
