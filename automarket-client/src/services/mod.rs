//! Обёртки REST-эндпоинтов: по одному типу на ресурс.

mod cars;
mod companies;

pub use cars::CarsApi;
pub use companies::{AutosalonsApi, CompanyApi, DealersApi};
