use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Характеристики автомобиля ("specification bag").
///
/// Все поля необязательны: бэкенд присылает только заполненные продавцом.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarSpecification {
    /// Тип топлива (`petrol`, `diesel`, `hybrid`, `electric`, ...).
    #[serde(default, alias = "fuelType", skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    /// Коробка передач.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    /// Привод.
    #[serde(default, alias = "driveType", skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    /// Тип кузова.
    #[serde(default, alias = "bodyType", skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    /// Цвет кузова.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Материал/цвет салона.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interior: Option<String>,
    /// Количество подушек безопасности.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airbags: Option<u8>,
    /// Объём двигателя, литры.
    #[serde(default, alias = "engineSize", skip_serializing_if = "Option::is_none")]
    pub engine_size: Option<f32>,
    /// Состояние (`new`, `used`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Ссылка на продавца объявления.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerRef {
    /// Идентификатор продавца (пользователь, дилер или автосалон).
    pub id: i64,
    /// Отображаемое имя.
    #[serde(default)]
    pub name: String,
    /// Контактный телефон.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Объявление о продаже автомобиля.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Идентификатор объявления.
    pub id: i64,
    /// Марка.
    pub make: String,
    /// Модель.
    pub model: String,
    /// Год выпуска.
    pub year: i32,
    /// Цена.
    pub price: f64,
    /// Пробег, км.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    /// Описание от продавца.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Город/регион.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Характеристики.
    #[serde(default)]
    pub specification: CarSpecification,
    /// URL фотографий.
    #[serde(default)]
    pub images: Vec<String>,
    /// Индекс обложки в `images`.
    #[serde(default, alias = "featuredImageIndex")]
    pub featured_image_index: usize,
    /// Продавец.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<SellerRef>,
    /// Платное VIP-размещение.
    #[serde(default, alias = "isVip")]
    pub is_vip: bool,
    /// Дата публикации (UTC).
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Car {
    /// URL обложки: фото по `featured_image_index` или первое фото.
    pub fn cover_image(&self) -> Option<&str> {
        self.images
            .get(self.featured_image_index)
            .or_else(|| self.images.first())
            .map(String::as_str)
    }

    /// Заголовок карточки: `"Make Model, Year"`.
    pub fn title(&self) -> String {
        format!("{} {}, {}", self.make, self.model, self.year)
    }
}

/// Общие реквизиты компании (дилер или автосалон).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Название компании.
    #[serde(default, alias = "companyName")]
    pub company_name: String,
    /// URL логотипа.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Год основания.
    #[serde(default, alias = "establishedYear", skip_serializing_if = "Option::is_none")]
    pub established_year: Option<i32>,
    /// Сайт.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Адрес.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Телефон.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Email для связи.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Описание.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Дилер: компания, привязанная к учётной записи пользователя.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dealer {
    /// Идентификатор дилера.
    pub id: i64,
    /// Связанный пользователь.
    #[serde(alias = "userId")]
    pub user_id: i64,
    /// Реквизиты компании.
    #[serde(flatten)]
    pub profile: CompanyProfile,
    /// Денормализованное число объявлений.
    #[serde(default, alias = "carCount")]
    pub car_count: u32,
}

/// Автосалон: отдельная сущность с теми же реквизитами, что и у дилера.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Autosalon {
    /// Идентификатор автосалона.
    pub id: i64,
    /// Связанный пользователь-администратор (если есть).
    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Реквизиты компании.
    #[serde(flatten)]
    pub profile: CompanyProfile,
    /// Денормализованное число объявлений.
    #[serde(default, alias = "carCount")]
    pub car_count: u32,
}

/// Общий интерфейс дилера и автосалона для списков и форм админки.
pub trait Company {
    fn id(&self) -> i64;
    fn profile(&self) -> &CompanyProfile;
    fn car_count(&self) -> u32;
}

impl Company for Dealer {
    fn id(&self) -> i64 {
        self.id
    }

    fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    fn car_count(&self) -> u32 {
        self.car_count
    }
}

impl Company for Autosalon {
    fn id(&self) -> i64 {
        self.id
    }

    fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    fn car_count(&self) -> u32 {
        self.car_count
    }
}

/// Данные для создания объявления.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub specification: CarSpecification,
}

/// Частичное обновление объявления: отправляются только заданные поля.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specification: Option<CarSpecification>,
}

impl CarPatch {
    /// `true`, если ни одно поле не задано.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Учётные данные администратора, создаваемого вместе с компанией.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountPayload {
    pub email: String,
    pub password: String,
}

/// Тело запроса создания/обновления дилера или автосалона.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub profile: CompanyProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountPayload>,
}

/// Метаданные пагинации из конверта `{success, data, meta}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    pub total: u64,
    pub page: u32,
    #[serde(rename = "totalPages", alias = "total_pages")]
    pub total_pages: u32,
}

/// Конверт списочного ответа бэкенда.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Конверт ответа с одной сущностью.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Страница результатов, уже развёрнутая из конверта.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Разворачивает конверт; при отсутствии `meta` считаем, что вся выборка
    /// пришла одной страницей.
    pub fn from_envelope(envelope: ListEnvelope<T>) -> Self {
        let meta = envelope.meta.unwrap_or(ListMeta {
            total: envelope.data.len() as u64,
            page: 1,
            total_pages: 1,
        });
        Self {
            items: envelope.data,
            total: meta.total,
            page: meta.page.max(1),
            total_pages: meta.total_pages,
        }
    }

    /// Есть ли следующая страница.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Есть ли предыдущая страница.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_parses_minimal_payload_with_defaults() {
        let raw = r#"{"id":7,"make":"Toyota","model":"Camry","year":2020,"price":25000}"#;
        let car: Car = serde_json::from_str(raw).expect("car should parse");

        assert_eq!(car.id, 7);
        assert!(car.images.is_empty());
        assert_eq!(car.specification, CarSpecification::default());
        assert!(!car.is_vip);
        assert_eq!(car.cover_image(), None);
        assert_eq!(car.title(), "Toyota Camry, 2020");
    }

    #[test]
    fn car_accepts_camel_case_specification_keys() {
        let raw = r#"{
            "id":1,"make":"BMW","model":"X5","year":2019,"price":40000,
            "specification":{"fuelType":"diesel","driveType":"awd","airbags":8},
            "images":["a.jpg","b.jpg"],"featuredImageIndex":1
        }"#;
        let car: Car = serde_json::from_str(raw).expect("car should parse");

        assert_eq!(car.specification.fuel_type.as_deref(), Some("diesel"));
        assert_eq!(car.specification.drive_type.as_deref(), Some("awd"));
        assert_eq!(car.specification.airbags, Some(8));
        assert_eq!(car.cover_image(), Some("b.jpg"));
    }

    #[test]
    fn cover_image_falls_back_to_first_when_index_is_stale() {
        let raw = r#"{"id":1,"make":"A","model":"B","year":2000,"price":1,
            "images":["only.jpg"],"featured_image_index":5}"#;
        let car: Car = serde_json::from_str(raw).expect("car should parse");
        assert_eq!(car.cover_image(), Some("only.jpg"));
    }

    #[test]
    fn dealer_flattens_company_profile() {
        let raw = r#"{"id":3,"user_id":11,"company_name":"Auto Plus",
            "established_year":2005,"car_count":12}"#;
        let dealer: Dealer = serde_json::from_str(raw).expect("dealer should parse");

        assert_eq!(dealer.user_id, 11);
        assert_eq!(dealer.profile.company_name, "Auto Plus");
        assert_eq!(dealer.profile.established_year, Some(2005));
        assert_eq!(dealer.car_count, 12);
    }

    #[test]
    fn page_from_envelope_uses_meta() {
        let raw = r#"{"success":true,"data":[1,2],"meta":{"total":12,"page":2,"totalPages":6}}"#;
        let envelope: ListEnvelope<i32> = serde_json::from_str(raw).expect("must parse");
        let page = Page::from_envelope(envelope);

        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total, 12);
        assert!(page.has_next());
        assert!(page.has_prev());
    }

    #[test]
    fn page_from_envelope_without_meta_is_single_page() {
        let raw = r#"{"data":[1,2,3]}"#;
        let envelope: ListEnvelope<i32> = serde_json::from_str(raw).expect("must parse");
        assert!(envelope.success);

        let page = Page::from_envelope(envelope);
        assert_eq!(page.total, 3);
        assert_eq!(page.page, 1);
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn car_patch_serializes_only_set_fields() {
        let patch = CarPatch {
            price: Some(1000.0),
            ..CarPatch::default()
        };
        let json = serde_json::to_value(&patch).expect("must serialize");
        assert_eq!(json, serde_json::json!({"price": 1000.0}));
        assert!(!patch.is_empty());
        assert!(CarPatch::default().is_empty());
    }

    #[test]
    fn company_payload_nests_account() {
        let payload = CompanyPayload {
            user_id: None,
            profile: CompanyProfile {
                company_name: "Salon".to_string(),
                ..CompanyProfile::default()
            },
            account: Some(AccountPayload {
                email: "a@b.uz".to_string(),
                password: "Secret12!".to_string(),
            }),
        };
        let json = serde_json::to_value(&payload).expect("must serialize");
        assert_eq!(json["company_name"], "Salon");
        assert_eq!(json["account"]["email"], "a@b.uz");
        assert!(json.get("user_id").is_none());
    }
}
