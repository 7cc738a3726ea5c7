use automarket_client::{CarCatalog, ClientResult};
use automarket_core::{Car, CarFilters, FilterSession, ListQuery, Page};
use tracing::debug;

/// Контейнер страницы каталога: фильтры, пагинация и загрузка данных.
///
/// Запросы всегда идут с применёнными фильтрами; черновик влияет на выдачу
/// только после `apply_filters`.
pub struct CarsPage<C> {
    catalog: C,
    session: FilterSession,
    query: ListQuery,
}

impl<C: CarCatalog> CarsPage<C> {
    pub fn new(catalog: C, session: FilterSession, query: ListQuery) -> Self {
        Self {
            catalog,
            session,
            query,
        }
    }

    pub fn session(&self) -> &FilterSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut FilterSession {
        &mut self.session
    }

    pub async fn load(&self) -> ClientResult<Page<Car>> {
        debug!(
            page = self.query.page(),
            filters = self.session.applied().active_count(),
            "loading cars page"
        );
        self.catalog
            .list_cars(&self.query, self.session.applied())
            .await
    }

    /// Фиксирует черновик и возвращает выдачу на первую страницу.
    pub fn apply_filters(&mut self) -> CarFilters {
        self.query = self.query.clone().with_page(1);
        self.session.apply()
    }

    /// Сбрасывает фильтры в памяти и возвращает выдачу на первую страницу.
    pub fn reset_filters(&mut self) {
        self.session.reset();
        self.query = self.query.clone().with_page(1);
    }

    pub fn go_to_page(&mut self, page: u32) {
        self.query = self.query.clone().with_page(page);
    }

    pub async fn show(&self, id: i64) -> ClientResult<Car> {
        self.catalog.get_car(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use automarket_client::ClientError;
    use automarket_core::FilterField;

    use super::*;

    #[derive(Clone, Default)]
    struct FakeCatalog {
        calls: Arc<Mutex<Vec<(ListQuery, CarFilters)>>>,
    }

    impl FakeCatalog {
        fn last_call(&self) -> (ListQuery, CarFilters) {
            self.calls
                .lock()
                .expect("calls mutex poisoned")
                .last()
                .cloned()
                .expect("catalog must be called")
        }
    }

    fn sample_car(id: i64) -> Car {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "make": "Kia",
            "model": "K5",
            "year": 2023,
            "price": 27000.0
        }))
        .expect("sample car must parse")
    }

    #[async_trait]
    impl CarCatalog for FakeCatalog {
        async fn list_cars(
            &self,
            query: &ListQuery,
            filters: &CarFilters,
        ) -> ClientResult<Page<Car>> {
            self.calls
                .lock()
                .expect("calls mutex poisoned")
                .push((query.clone(), filters.clone()));
            Ok(Page {
                items: vec![sample_car(1)],
                total: 1,
                page: query.page(),
                total_pages: 1,
            })
        }

        async fn get_car(&self, id: i64) -> ClientResult<Car> {
            if id == 1 {
                Ok(sample_car(id))
            } else {
                Err(ClientError::NotFound("Объявление не найдено".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn draft_edits_do_not_reach_catalog_until_applied() {
        let catalog = FakeCatalog::default();
        let mut page = CarsPage::new(
            catalog.clone(),
            FilterSession::default(),
            ListQuery::default(),
        );

        page.session_mut().set(FilterField::Make, "Kia");
        page.load().await.expect("load must succeed");
        assert!(catalog.last_call().1.is_empty());

        let applied = page.apply_filters();
        assert_eq!(applied.get(FilterField::Make), "Kia");
        page.load().await.expect("load must succeed");
        assert_eq!(catalog.last_call().1.get(FilterField::Make), "Kia");
    }

    #[tokio::test]
    async fn applying_and_resetting_return_to_first_page() {
        let catalog = FakeCatalog::default();
        let mut page = CarsPage::new(
            catalog.clone(),
            FilterSession::new(CarFilters::default().with(FilterField::Color, "red")),
            ListQuery::default(),
        );

        page.go_to_page(3);
        page.load().await.expect("load must succeed");
        assert_eq!(catalog.last_call().0.page(), 3);

        page.reset_filters();
        page.load().await.expect("load must succeed");
        let (query, filters) = catalog.last_call();
        assert_eq!(query.page(), 1);
        assert!(filters.is_empty());
        assert!(!page.session().is_dirty());
    }

    #[tokio::test]
    async fn show_passes_catalog_errors_through() {
        let page = CarsPage::new(
            FakeCatalog::default(),
            FilterSession::default(),
            ListQuery::default(),
        );

        assert_eq!(page.show(1).await.expect("car exists").id, 1);
        let err = page.show(2).await.expect_err("car is missing");
        assert_eq!(err.to_string(), "Объявление не найдено");
    }
}
