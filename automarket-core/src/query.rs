use serde::{Deserialize, Serialize};

use crate::filters::CarFilters;

/// Размер страницы каталога по умолчанию.
pub const DEFAULT_PAGE_SIZE: u32 = 12;
/// Максимальный размер страницы, который принимает бэкенд.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Направление сортировки.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Поле сортировки каталога автомобилей.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    CreatedAt,
    Price,
    Year,
    Mileage,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Price => "price",
            Self::Year => "year",
            Self::Mileage => "mileage",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "created_at" | "createdAt" | "date" => Some(Self::CreatedAt),
            "price" => Some(Self::Price),
            "year" => Some(Self::Year),
            "mileage" => Some(Self::Mileage),
            _ => None,
        }
    }
}

/// Параметры списочного запроса: `page/limit/search/sortBy/sortOrder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    limit: u32,
    search: String,
    sort_by: Option<String>,
    sort_order: Option<SortOrder>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: String::new(),
            sort_by: None,
            sort_order: None,
        }
    }
}

impl ListQuery {
    /// Запрос первой страницы с указанным размером (ограничивается 1..=100).
    pub fn new(limit: u32) -> Self {
        Self::default().with_limit(limit)
    }

    /// Номер страницы, минимум 1.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Поисковая строка; пробелы по краям отбрасываются.
    pub fn with_search(mut self, search: impl AsRef<str>) -> Self {
        self.search = search.as_ref().trim().to_string();
        self
    }

    /// Сортировка по произвольному серверному полю (для дилеров/автосалонов).
    pub fn with_sort(mut self, sort_by: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(order);
        self
    }

    /// Сортировка каталога автомобилей.
    pub fn with_car_sort(self, sort_by: SortBy, order: SortOrder) -> Self {
        self.with_sort(sort_by.as_str(), order)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Та же выборка, следующая страница.
    pub fn next_page(&self) -> Self {
        self.clone().with_page(self.page.saturating_add(1))
    }

    /// Та же выборка, предыдущая страница (не меньше 1).
    pub fn prev_page(&self) -> Self {
        self.clone().with_page(self.page.saturating_sub(1))
    }

    /// Пары query string без фильтров.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy", sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortOrder", order.as_str().to_string()));
        }
        pairs
    }

    /// Пары query string вместе с фильтрами каталога.
    pub fn to_pairs_with_filters(&self, filters: &CarFilters) -> Vec<(&'static str, String)> {
        let mut pairs = self.to_pairs();
        pairs.extend(filters.to_query_pairs());
        pairs
    }
}

/// Номер поколения запросов списка: ответ применяется, только если после
/// его запроса не стартовал более новый.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestGeneration(u64);

impl RequestGeneration {
    /// Начинает новый запрос и возвращает его номер.
    pub fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }

    pub fn is_current(&self, request: u64) -> bool {
        self.0 == request
    }
}
