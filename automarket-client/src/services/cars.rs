use automarket_core::{Car, CarFilters, CarPatch, ListQuery, NewCar, Page};
use reqwest::Method;
use reqwest::multipart::Form;

use crate::error::ClientResult;
use crate::http_client::HttpClient;
use crate::upload::UploadFile;

const LIST_FAILED: &str = "Не удалось загрузить список автомобилей";
const GET_FAILED: &str = "Не удалось загрузить объявление";
const CREATE_FAILED: &str = "Не удалось создать объявление";
const UPDATE_FAILED: &str = "Не удалось обновить объявление";
const DELETE_FAILED: &str = "Не удалось удалить объявление";
const UPLOAD_FAILED: &str = "Не удалось загрузить фотографии";

/// `/api/cars`.
#[derive(Debug, Clone, Copy)]
pub struct CarsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> CarsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Каталог с пагинацией, поиском, сортировкой и фильтрами.
    pub async fn list(&self, query: &ListQuery, filters: &CarFilters) -> ClientResult<Page<Car>> {
        let pairs = query.to_pairs_with_filters(filters);
        self.http.get_page("/api/cars", &pairs, LIST_FAILED).await
    }

    /// Объявление по идентификатору.
    pub async fn get(&self, id: i64) -> ClientResult<Car> {
        self.http
            .get_item(&format!("/api/cars/{id}"), GET_FAILED)
            .await
    }

    /// Требует токен.
    pub async fn create(&self, car: &NewCar) -> ClientResult<Car> {
        self.http
            .send_json(Method::POST, "/api/cars", car, CREATE_FAILED)
            .await
    }

    /// Требует токен.
    pub async fn update(&self, id: i64, patch: &CarPatch) -> ClientResult<Car> {
        self.http
            .send_json(Method::PUT, &format!("/api/cars/{id}"), patch, UPDATE_FAILED)
            .await
    }

    /// Требует токен.
    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.http
            .delete(&format!("/api/cars/{id}"), DELETE_FAILED)
            .await
    }

    /// Загружает фотографии: по одной части `images` на файл и
    /// `featuredIndex` с индексом обложки.
    pub async fn upload_images(
        &self,
        id: i64,
        files: Vec<UploadFile>,
        featured_index: usize,
    ) -> ClientResult<Car> {
        let mut form = Form::new().text("featuredIndex", featured_index.to_string());
        for file in files {
            form = form.part("images", file.into_part()?);
        }
        self.http
            .send_multipart(
                Method::POST,
                &format!("/api/cars/{id}/images"),
                form,
                UPLOAD_FAILED,
            )
            .await
    }
}
