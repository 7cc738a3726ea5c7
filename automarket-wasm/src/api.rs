use automarket_core::forms::CompanyKind;
use automarket_core::{
    Autosalon, Car, CarFilters, Company, CompanyPayload, Dealer, ItemEnvelope, ListEnvelope,
    ListQuery, Page,
};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use web_sys::{File, FormData};

const API_BASE_URL: &str = match option_env!("WASM_API_BASE_URL") {
    Some(value) => value,
    None => "http://127.0.0.1:5000",
};

#[derive(Debug, Clone)]
pub(crate) enum ApiError {
    Network(String),
    Http { status: u16, message: String },
    Decode(String),
}

/// Для ответов бэкенда показывается ровно `message` из тела.
impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Нет связи с сервером: {msg}"),
            Self::Http { message, .. } => f.write_str(message),
            Self::Decode(msg) => write!(f, "Некорректный ответ сервера: {msg}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Строка таблицы админки: общие поля дилера и автосалона.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompanyRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) car_count: u32,
}

impl CompanyRow {
    fn from_company(company: &impl Company) -> Self {
        let profile = company.profile();
        Self {
            id: company.id(),
            name: profile.company_name.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            car_count: company.car_count(),
        }
    }
}

fn endpoint(path: &str) -> String {
    format!(
        "{}/{}",
        API_BASE_URL.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn resource(kind: CompanyKind) -> &'static str {
    match kind {
        CompanyKind::Dealer => "/api/dealers",
        CompanyKind::Autosalon => "/api/autosalons",
    }
}

fn with_token(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header("Authorization", &format!("Bearer {token}")),
        None => request,
    }
}

/// Текст ошибки: `message`, затем `error`, затем текст операции.
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

async fn parse_error_body(response: Response, fallback: &str) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    ApiError::Http {
        status,
        message: error_message(&text, fallback),
    }
}

async fn send(request: Request, fallback: &str) -> Result<Response, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;
    if !response.ok() {
        return Err(parse_error_body(response, fallback).await);
    }
    Ok(response)
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn rejected(message: Option<String>, fallback: &str) -> ApiError {
    ApiError::Http {
        status: 200,
        message: message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string()),
    }
}

async fn get_page<T: DeserializeOwned>(
    path: &str,
    pairs: Vec<(&'static str, String)>,
    fallback: &str,
) -> Result<Page<T>, ApiError> {
    let request = Request::get(&endpoint(path))
        .query(pairs.iter().map(|(key, value)| (*key, value.as_str())))
        .build()
        .map_err(|err| ApiError::Network(err.to_string()))?;
    let envelope: ListEnvelope<T> = parse_json(send(request, fallback).await?).await?;
    if !envelope.success {
        return Err(rejected(envelope.message, fallback));
    }
    Ok(Page::from_envelope(envelope))
}

async fn unwrap_item<T: DeserializeOwned>(
    response: Response,
    fallback: &str,
) -> Result<T, ApiError> {
    let envelope: ItemEnvelope<T> = parse_json(response).await?;
    if !envelope.success {
        return Err(rejected(envelope.message, fallback));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Decode("response envelope has no data".to_string()))
}

pub(crate) async fn list_cars(
    query: &ListQuery,
    filters: &CarFilters,
) -> Result<Page<Car>, ApiError> {
    get_page(
        "/api/cars",
        query.to_pairs_with_filters(filters),
        "Не удалось загрузить список автомобилей",
    )
    .await
}

pub(crate) async fn list_companies(
    kind: CompanyKind,
    query: &ListQuery,
) -> Result<Page<CompanyRow>, ApiError> {
    let page = match kind {
        CompanyKind::Dealer => {
            let page: Page<Dealer> = get_page(
                resource(kind),
                query.to_pairs(),
                "Не удалось загрузить список дилеров",
            )
            .await?;
            map_page(page)
        }
        CompanyKind::Autosalon => {
            let page: Page<Autosalon> = get_page(
                resource(kind),
                query.to_pairs(),
                "Не удалось загрузить список автосалонов",
            )
            .await?;
            map_page(page)
        }
    };
    Ok(page)
}

fn map_page<T: Company>(page: Page<T>) -> Page<CompanyRow> {
    Page {
        items: page.items.iter().map(CompanyRow::from_company).collect(),
        total: page.total,
        page: page.page,
        total_pages: page.total_pages,
    }
}

pub(crate) async fn create_company(
    token: Option<&str>,
    kind: CompanyKind,
    payload: &CompanyPayload,
) -> Result<CompanyRow, ApiError> {
    let fallback = match kind {
        CompanyKind::Dealer => "Не удалось создать дилера",
        CompanyKind::Autosalon => "Не удалось создать автосалон",
    };
    let request = with_token(Request::post(&endpoint(resource(kind))), token)
        .json(payload)
        .map_err(|err| ApiError::Network(err.to_string()))?;
    let response = send(request, fallback).await?;
    let row = match kind {
        CompanyKind::Dealer => {
            CompanyRow::from_company(&unwrap_item::<Dealer>(response, fallback).await?)
        }
        CompanyKind::Autosalon => {
            CompanyRow::from_company(&unwrap_item::<Autosalon>(response, fallback).await?)
        }
    };
    Ok(row)
}

pub(crate) async fn delete_company(
    token: Option<&str>,
    kind: CompanyKind,
    id: i64,
) -> Result<(), ApiError> {
    let fallback = match kind {
        CompanyKind::Dealer => "Не удалось удалить дилера",
        CompanyKind::Autosalon => "Не удалось удалить автосалон",
    };
    let request = with_token(
        Request::delete(&endpoint(&format!("{}/{id}", resource(kind)))),
        token,
    )
    .build()
    .map_err(|err| ApiError::Network(err.to_string()))?;
    send(request, fallback).await?;
    Ok(())
}

/// Отправляет фотографии: по части `images` на файл и `featuredIndex`.
pub(crate) async fn upload_car_images(
    token: Option<&str>,
    car_id: i64,
    files: &[File],
    featured_index: usize,
) -> Result<Car, ApiError> {
    const FALLBACK: &str = "Не удалось загрузить фотографии";

    let form =
        FormData::new().map_err(|_| ApiError::Network("FormData is not available".into()))?;
    for file in files {
        form.append_with_blob_and_filename("images", file, &file.name())
            .map_err(|_| ApiError::Network("failed to attach file".into()))?;
    }
    form.append_with_str("featuredIndex", &featured_index.to_string())
        .map_err(|_| ApiError::Network("failed to attach featuredIndex".into()))?;

    let request = with_token(
        Request::post(&endpoint(&format!("/api/cars/{car_id}/images"))),
        token,
    )
    .body(form)
    .map_err(|err| ApiError::Network(err.to_string()))?;
    let response = send(request, FALLBACK).await?;
    unwrap_item(response, FALLBACK).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_backend_message() {
        let body = r#"{"success":false,"message":"Дилер уже существует"}"#;
        assert_eq!(error_message(body, "fallback"), "Дилер уже существует");
    }

    #[test]
    fn error_message_uses_error_field_then_fallback() {
        assert_eq!(error_message(r#"{"error":"Нет доступа"}"#, "fallback"), "Нет доступа");
        assert_eq!(error_message("", "Ошибка загрузки"), "Ошибка загрузки");
        assert_eq!(error_message("<html>502</html>", "Ошибка загрузки"), "Ошибка загрузки");
    }

    #[test]
    fn http_error_displays_message_only() {
        let err = ApiError::Http {
            status: 409,
            message: "Конфликт".to_string(),
        };
        assert_eq!(err.to_string(), "Конфликт");
    }
}
