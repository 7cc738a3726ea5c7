use std::path::PathBuf;

use anyhow::{Result, anyhow};
use automarket_client::{CarsApi, ClientError, MarketplaceClient, UploadFile};
use automarket_core::upload::DEFAULT_MAX_FILE_SIZE;
use automarket_core::wizard::{CarWizard, WizardStep};
use automarket_core::{
    Car, CarFilters, CarPatch, FilterField, FilterSession, ListQuery, SortBy, SortOrder,
};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use crate::output::{print_car, print_cars, print_form_errors};
use crate::pages::CarsPage;
use crate::progress::{TICK, UploadBar, with_progress};
use crate::{map_client_error, parse_sort_order};

#[derive(Debug, Subcommand)]
pub enum CarsCommand {
    /// Каталог с фильтрами, поиском и сортировкой.
    List(ListArgs),
    /// Карточка объявления.
    Show {
        #[arg(long)]
        id: i64,
    },
    /// Новое объявление с фотографиями (требует токен).
    Create(CreateArgs),
    /// Частичное обновление объявления (требует токен).
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        mileage: Option<u32>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Удаление объявления (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
}

/// Значения фильтров каталога; пустая строка снимает фильтр.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    #[arg(long)]
    make: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    year_from: Option<String>,
    #[arg(long)]
    year_to: Option<String>,
    #[arg(long)]
    price_from: Option<String>,
    #[arg(long)]
    price_to: Option<String>,
    #[arg(long)]
    mileage_from: Option<String>,
    #[arg(long)]
    mileage_to: Option<String>,
    #[arg(long)]
    fuel_type: Option<String>,
    #[arg(long)]
    transmission: Option<String>,
    #[arg(long)]
    drive_type: Option<String>,
    #[arg(long)]
    body_type: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    location: Option<String>,
}

impl FilterArgs {
    fn values(&self) -> [(FilterField, &Option<String>); 14] {
        [
            (FilterField::Make, &self.make),
            (FilterField::Model, &self.model),
            (FilterField::YearFrom, &self.year_from),
            (FilterField::YearTo, &self.year_to),
            (FilterField::PriceFrom, &self.price_from),
            (FilterField::PriceTo, &self.price_to),
            (FilterField::MileageFrom, &self.mileage_from),
            (FilterField::MileageTo, &self.mileage_to),
            (FilterField::FuelType, &self.fuel_type),
            (FilterField::Transmission, &self.transmission),
            (FilterField::DriveType, &self.drive_type),
            (FilterField::BodyType, &self.body_type),
            (FilterField::Color, &self.color),
            (FilterField::Location, &self.location),
        ]
    }

    /// Накладывает заданные флаги поверх `filters`.
    pub fn apply_to(&self, filters: &mut CarFilters) {
        for (field, value) in self.values() {
            if let Some(value) = value {
                filters.set(field, value);
            }
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    filters: FilterArgs,
    /// Взять сохранённые применённые фильтры и наложить флаги поверх них.
    #[arg(long)]
    saved: bool,
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_parser = parse_sort_by)]
    sort_by: Option<SortBy>,
    #[arg(long, value_parser = parse_sort_order, default_value = "desc")]
    sort_order: SortOrder,
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Размер страницы (по умолчанию AUTOMARKET_PAGE_SIZE).
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    make: String,
    #[arg(long)]
    model: String,
    #[arg(long)]
    year: String,
    #[arg(long)]
    price: String,
    #[arg(long, default_value = "")]
    mileage: String,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    fuel_type: Option<String>,
    #[arg(long)]
    transmission: Option<String>,
    #[arg(long)]
    drive_type: Option<String>,
    #[arg(long)]
    body_type: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    condition: Option<String>,
    /// Фотография; флаг повторяется для каждого файла.
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,
    /// Индекс обложки среди принятых фотографий.
    #[arg(long, default_value_t = 0)]
    featured: usize,
}

fn parse_sort_by(raw: &str) -> Result<SortBy, String> {
    SortBy::parse(raw).ok_or_else(|| {
        format!("неизвестная сортировка `{raw}`: created_at, price, year, mileage")
    })
}

pub async fn run(
    client: &MarketplaceClient,
    saved: FilterSession,
    page_size: u32,
    command: CarsCommand,
) -> Result<()> {
    match command {
        CarsCommand::List(args) => {
            let mut filters = if args.saved {
                saved.applied().clone()
            } else {
                CarFilters::default()
            };
            args.filters.apply_to(&mut filters);

            let mut query = ListQuery::new(args.limit.unwrap_or(page_size))
                .with_search(args.search.unwrap_or_default());
            if let Some(sort_by) = args.sort_by {
                query = query.with_car_sort(sort_by, args.sort_order);
            }

            let mut page = CarsPage::new(client.clone(), FilterSession::new(filters), query);
            page.go_to_page(args.page);
            let cars = page.load().await.map_err(map_client_error)?;
            print_cars(&cars);
        }
        CarsCommand::Show { id } => {
            let page = CarsPage::new(client.clone(), saved, ListQuery::default());
            let car = page.show(id).await.map_err(map_client_error)?;
            print_car("Объявление", &car);
        }
        CarsCommand::Create(args) => create(client, args).await?,
        CarsCommand::Update {
            id,
            price,
            mileage,
            description,
            location,
        } => {
            let patch = CarPatch {
                price,
                mileage,
                description,
                location,
                specification: None,
            };
            if patch.is_empty() {
                return Err(anyhow!(
                    "нечего обновлять: укажите --price, --mileage, --description или --location"
                ));
            }
            if patch.price.is_some_and(|price| price <= 0.0) {
                return Err(anyhow!("цена должна быть больше нуля"));
            }
            let car = client
                .cars()
                .update(id, &patch)
                .await
                .map_err(map_client_error)?;
            print_car("Объявление обновлено", &car);
        }
        CarsCommand::Delete { id } => {
            client.cars().delete(id).await.map_err(map_client_error)?;
            println!("Объявление удалено: id={id}");
        }
    }
    Ok(())
}

async fn create(client: &MarketplaceClient, args: CreateArgs) -> Result<()> {
    let mut files = Vec::with_capacity(args.images.len());
    for path in &args.images {
        match UploadFile::from_path(path, DEFAULT_MAX_FILE_SIZE).await {
            Ok(file) => files.push(file),
            Err(ClientError::FileTooLarge { name, .. }) => {
                eprintln!("пропущен {name}: Файл слишком большой");
            }
            Err(err) => return Err(map_client_error(err)),
        }
    }

    let featured = args.featured;
    let mut wizard = fill_wizard(args);
    let outcome = wizard.photos.on_drop(files.iter().map(UploadFile::candidate));
    for (name, reason) in &outcome.rejected {
        eprintln!("пропущен {name}: {}", reason.message());
    }
    if !wizard.photos.set_featured(featured) {
        eprintln!("обложка #{featured} не выбрана, используется первая фотография");
    }

    while wizard.step() != WizardStep::Review {
        let step = wizard.step();
        if let Err(errors) = wizard.next() {
            eprintln!("Шаг «{}» заполнен с ошибками:", step.title());
            print_form_errors(&errors);
            return Err(anyhow!("объявление не создано"));
        }
    }
    let draft = wizard.build().map_err(|errors| anyhow!("{errors}"))?;

    // Отправляем только принятые файлы и в порядке выбора.
    let accepted: Vec<UploadFile> = draft
        .photos
        .files()
        .iter()
        .filter_map(|candidate| {
            files
                .iter()
                .find(|file| file.candidate().same_file(candidate))
                .cloned()
        })
        .collect();

    let car = client
        .cars()
        .create(&draft.car)
        .await
        .map_err(map_client_error)?;
    info!(id = car.id, photos = accepted.len(), "car created, uploading photos");

    let featured = draft.photos.featured_index();
    let car = upload_or_rollback(client.cars(), car.id, accepted, featured).await?;
    print_car("Объявление создано", &car);
    Ok(())
}

/// Загружает фотографии только что созданного объявления. Если загрузка
/// не удалась, объявление удаляется: карточка без фото в каталоге не нужна.
async fn upload_or_rollback(
    cars: CarsApi<'_>,
    car_id: i64,
    files: Vec<UploadFile>,
    featured: usize,
) -> Result<Car> {
    let bar = UploadBar::new(format!("фото: {}", files.len()));
    let upload = with_progress(
        cars.upload_images(car_id, files, featured),
        TICK,
        |progress| bar.draw(progress),
    )
    .await;

    let err = match upload {
        Ok(car) => return Ok(car),
        Err(err) => err,
    };
    warn!(id = car_id, error = %err, "photo upload failed, removing car");
    let reason = map_client_error(err);

    match cars.delete(car_id).await {
        Ok(()) => Err(anyhow!(
            "{reason}; объявление id={car_id} удалено, создайте его заново"
        )),
        Err(cleanup) => {
            warn!(id = car_id, error = %cleanup, "could not remove car without photos");
            Err(anyhow!(
                "{reason}; объявление id={car_id} осталось без фотографий, \
                 удалите его: `automarket cars delete --id {car_id}`"
            ))
        }
    }
}

fn fill_wizard(args: CreateArgs) -> CarWizard {
    let mut wizard = CarWizard::new();
    wizard.make = args.make;
    wizard.model = args.model;
    wizard.year = args.year;
    wizard.price = args.price;
    wizard.mileage = args.mileage;
    wizard.location = args.location;
    wizard.description = args.description;

    let spec = &mut wizard.specification;
    spec.fuel_type = args.fuel_type;
    spec.transmission = args.transmission;
    spec.drive_type = args.drive_type;
    spec.body_type = args.body_type;
    spec.color = args.color;
    spec.condition = args.condition;
    wizard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_flags_override_only_given_fields() {
        let mut filters = CarFilters::default()
            .with(FilterField::Make, "Kia")
            .with(FilterField::Color, "red");
        let args = FilterArgs {
            color: Some(String::new()),
            fuel_type: Some("hybrid".to_string()),
            ..FilterArgs::default()
        };

        args.apply_to(&mut filters);

        assert_eq!(filters.get(FilterField::Make), "Kia");
        assert_eq!(filters.get(FilterField::Color), "");
        assert_eq!(filters.get(FilterField::FuelType), "hybrid");
        assert_eq!(filters.active_count(), 2);
    }

    #[test]
    fn sort_by_parser_lists_options_on_error() {
        assert_eq!(parse_sort_by("price"), Ok(SortBy::Price));
        let err = parse_sort_by("color").expect_err("must fail");
        assert!(err.contains("mileage"));
    }

    fn car_body(id: i64) -> String {
        serde_json::json!({
            "success": true,
            "data": { "id": id, "make": "Kia", "model": "Rio", "year": 2020, "price": 9000.0 }
        })
        .to_string()
    }

    fn photo() -> Vec<UploadFile> {
        vec![UploadFile::new("front.jpg", "image/jpeg", b"jpeg".to_vec())]
    }

    #[tokio::test]
    async fn successful_upload_keeps_car() {
        let mut server = mockito::Server::new_async().await;
        let upload = server
            .mock("POST", "/api/cars/7/images")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(car_body(7))
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/cars/7")
            .expect(0)
            .create_async()
            .await;

        let client = MarketplaceClient::new(server.url()).expect("client must build");
        let car = upload_or_rollback(client.cars(), 7, photo(), 0)
            .await
            .expect("upload must succeed");

        assert_eq!(car.id, 7);
        upload.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn failed_upload_removes_created_car() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/cars/7/images")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Хранилище недоступно"}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/cars/7")
            .with_status(204)
            .create_async()
            .await;

        let client = MarketplaceClient::new(server.url()).expect("client must build");
        let err = upload_or_rollback(client.cars(), 7, photo(), 0)
            .await
            .expect_err("upload must fail");

        delete.assert_async().await;
        let message = err.to_string();
        assert!(message.contains("Хранилище недоступно"), "{message}");
        assert!(message.contains("id=7 удалено"), "{message}");
    }

    #[tokio::test]
    async fn failed_rollback_reports_car_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/cars/7/images")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Хранилище недоступно"}"#)
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/cars/7")
            .with_status(500)
            .create_async()
            .await;

        let client = MarketplaceClient::new(server.url()).expect("client must build");
        let err = upload_or_rollback(client.cars(), 7, photo(), 0)
            .await
            .expect_err("upload must fail");

        let message = err.to_string();
        assert!(message.contains("cars delete --id 7"), "{message}");
    }
}
