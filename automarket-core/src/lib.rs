//! Клиентская логика автомаркетплейса, не зависящая от транспорта и UI.
//!
//! - DTO бэкенда (`models`)
//! - состояние фильтров и их согласование (`filters`, `query`)
//! - клиентское хранилище токена и фильтров (`storage`)
//! - выбор изображений для загрузки (`upload`)
//! - формы админки и мастер создания объявления (`forms`, `wizard`)
//!
//! Используется и CLI, и wasm-фронтендом.

pub mod error;
pub mod filters;
pub mod forms;
pub mod models;
pub mod query;
pub mod storage;
pub mod upload;
pub mod wizard;

pub use error::{FormErrors, ValidationError};
pub use filters::{AdvancedFiltersModal, CarFilters, FilterField, FilterSession};
pub use models::{
    AccountPayload, Autosalon, Car, CarPatch, CarSpecification, Company, CompanyPayload,
    CompanyProfile, Dealer, ItemEnvelope, ListEnvelope, ListMeta, NewCar, Page, SellerRef,
};
pub use query::{ListQuery, RequestGeneration, SortBy, SortOrder};
