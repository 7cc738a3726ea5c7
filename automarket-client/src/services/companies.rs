use std::marker::PhantomData;

use automarket_core::{Autosalon, Car, CompanyPayload, Dealer, ListQuery, Page};
use reqwest::Method;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;

use crate::error::ClientResult;
use crate::http_client::HttpClient;
use crate::upload::UploadFile;

/// Тексты ошибок по умолчанию для ресурса.
#[derive(Debug)]
struct Messages {
    list: &'static str,
    get: &'static str,
    create: &'static str,
    update: &'static str,
    delete: &'static str,
    logo: &'static str,
    cars: &'static str,
}

const DEALER_MESSAGES: Messages = Messages {
    list: "Не удалось загрузить список дилеров",
    get: "Не удалось загрузить дилера",
    create: "Не удалось создать дилера",
    update: "Не удалось обновить дилера",
    delete: "Не удалось удалить дилера",
    logo: "Не удалось загрузить логотип дилера",
    cars: "Не удалось загрузить автомобили дилера",
};

const AUTOSALON_MESSAGES: Messages = Messages {
    list: "Не удалось загрузить список автосалонов",
    get: "Не удалось загрузить автосалон",
    create: "Не удалось создать автосалон",
    update: "Не удалось обновить автосалон",
    delete: "Не удалось удалить автосалон",
    logo: "Не удалось загрузить логотип автосалона",
    cars: "Не удалось загрузить автомобили автосалона",
};

/// CRUD компании (дилера или автосалона). Эндпоинты у них одинаковые,
/// различаются только префикс и тексты ошибок.
#[derive(Debug)]
pub struct CompanyApi<'a, T> {
    http: &'a HttpClient,
    resource: &'static str,
    messages: &'static Messages,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for CompanyApi<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CompanyApi<'_, T> {}

/// `/api/dealers`.
pub type DealersApi<'a> = CompanyApi<'a, Dealer>;
/// `/api/autosalons`.
pub type AutosalonsApi<'a> = CompanyApi<'a, Autosalon>;

impl<'a> CompanyApi<'a, Dealer> {
    pub(crate) fn dealers(http: &'a HttpClient) -> Self {
        Self {
            http,
            resource: "/api/dealers",
            messages: &DEALER_MESSAGES,
            _entity: PhantomData,
        }
    }

    /// Дилер, привязанный к пользователю.
    pub async fn get_by_user(&self, user_id: i64) -> ClientResult<Dealer> {
        self.http
            .get_item(
                &format!("{}/user/{user_id}", self.resource),
                self.messages.get,
            )
            .await
    }
}

impl<'a> CompanyApi<'a, Autosalon> {
    pub(crate) fn autosalons(http: &'a HttpClient) -> Self {
        Self {
            http,
            resource: "/api/autosalons",
            messages: &AUTOSALON_MESSAGES,
            _entity: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> CompanyApi<'_, T> {
    /// Список с `page/limit/search/sortBy/sortOrder`.
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<T>> {
        self.http
            .get_page(self.resource, &query.to_pairs(), self.messages.list)
            .await
    }

    /// Компания по идентификатору.
    pub async fn get(&self, id: i64) -> ClientResult<T> {
        self.http
            .get_item(&format!("{}/{id}", self.resource), self.messages.get)
            .await
    }

    /// Требует токен администратора.
    pub async fn create(&self, payload: &CompanyPayload) -> ClientResult<T> {
        self.http
            .send_json(Method::POST, self.resource, payload, self.messages.create)
            .await
    }

    /// Требует токен администратора.
    pub async fn update(&self, id: i64, payload: &CompanyPayload) -> ClientResult<T> {
        self.http
            .send_json(
                Method::PUT,
                &format!("{}/{id}", self.resource),
                payload,
                self.messages.update,
            )
            .await
    }

    /// Требует токен администратора.
    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.http
            .delete(&format!("{}/{id}", self.resource), self.messages.delete)
            .await
    }

    /// Загружает логотип одной частью `logo`.
    pub async fn upload_logo(&self, id: i64, logo: UploadFile) -> ClientResult<T> {
        let form = Form::new().part("logo", logo.into_part()?);
        self.http
            .send_multipart(
                Method::POST,
                &format!("{}/{id}/logo", self.resource),
                form,
                self.messages.logo,
            )
            .await
    }

    /// Объявления компании.
    pub async fn cars(&self, id: i64, query: &ListQuery) -> ClientResult<Page<Car>> {
        self.http
            .get_page(
                &format!("{}/{id}/cars", self.resource),
                &query.to_pairs(),
                self.messages.cars,
            )
            .await
    }
}
