use async_trait::async_trait;
use automarket_core::{Car, CarFilters, ListQuery, Page};

use crate::MarketplaceClient;
use crate::error::ClientResult;

/// Источник объявлений для страниц каталога.
///
/// Страницы зависят от трейта, а не от HTTP-клиента, поэтому в тестах
/// подставляется фейковая реализация.
#[async_trait]
pub trait CarCatalog: Send + Sync {
    /// Страница каталога с учётом фильтров.
    async fn list_cars(&self, query: &ListQuery, filters: &CarFilters) -> ClientResult<Page<Car>>;

    /// Карточка объявления.
    async fn get_car(&self, id: i64) -> ClientResult<Car>;
}

#[async_trait]
impl CarCatalog for MarketplaceClient {
    async fn list_cars(&self, query: &ListQuery, filters: &CarFilters) -> ClientResult<Page<Car>> {
        self.cars().list(query, filters).await
    }

    async fn get_car(&self, id: i64) -> ClientResult<Car> {
        self.cars().get(id).await
    }
}
