//! Состояние фильтров каталога и его согласование.
//!
//! Фильтры хранятся плоским объектом из 14 строковых полей; пустая строка
//! означает "не задано". Клиент использует camelCase-имена (`fuelType`),
//! бэкенд и сохранённый кэш `carFilters` используют snake_case (`fuel_type`).
//! Загрузка принимает обе нотации.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Поле фильтра.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    Make,
    Model,
    YearFrom,
    YearTo,
    PriceFrom,
    PriceTo,
    MileageFrom,
    MileageTo,
    FuelType,
    Transmission,
    DriveType,
    BodyType,
    Color,
    Location,
}

impl FilterField {
    /// Все поля в порядке отображения.
    pub const ALL: [FilterField; 14] = [
        FilterField::Make,
        FilterField::Model,
        FilterField::YearFrom,
        FilterField::YearTo,
        FilterField::PriceFrom,
        FilterField::PriceTo,
        FilterField::MileageFrom,
        FilterField::MileageTo,
        FilterField::FuelType,
        FilterField::Transmission,
        FilterField::DriveType,
        FilterField::BodyType,
        FilterField::Color,
        FilterField::Location,
    ];

    /// Клиентское имя (camelCase), используется в URL и формах.
    pub fn key(self) -> &'static str {
        match self {
            Self::Make => "make",
            Self::Model => "model",
            Self::YearFrom => "yearFrom",
            Self::YearTo => "yearTo",
            Self::PriceFrom => "priceFrom",
            Self::PriceTo => "priceTo",
            Self::MileageFrom => "mileageFrom",
            Self::MileageTo => "mileageTo",
            Self::FuelType => "fuelType",
            Self::Transmission => "transmission",
            Self::DriveType => "driveType",
            Self::BodyType => "bodyType",
            Self::Color => "color",
            Self::Location => "location",
        }
    }

    /// Серверное имя (snake_case).
    pub fn server_key(self) -> &'static str {
        match self {
            Self::Make => "make",
            Self::Model => "model",
            Self::YearFrom => "year_from",
            Self::YearTo => "year_to",
            Self::PriceFrom => "price_from",
            Self::PriceTo => "price_to",
            Self::MileageFrom => "mileage_from",
            Self::MileageTo => "mileage_to",
            Self::FuelType => "fuel_type",
            Self::Transmission => "transmission",
            Self::DriveType => "drive_type",
            Self::BodyType => "body_type",
            Self::Color => "color",
            Self::Location => "location",
        }
    }

    /// Находит поле по любому из вариантов имени.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.key() == key || field.server_key() == key)
    }

    /// Подпись поля в интерфейсе.
    pub fn label(self) -> &'static str {
        match self {
            Self::Make => "Марка",
            Self::Model => "Модель",
            Self::YearFrom => "Год от",
            Self::YearTo => "Год до",
            Self::PriceFrom => "Цена от",
            Self::PriceTo => "Цена до",
            Self::MileageFrom => "Пробег от",
            Self::MileageTo => "Пробег до",
            Self::FuelType => "Топливо",
            Self::Transmission => "Коробка",
            Self::DriveType => "Привод",
            Self::BodyType => "Кузов",
            Self::Color => "Цвет",
            Self::Location => "Город",
        }
    }

    /// Поля, которые показываются только в расширенном окне фильтров.
    pub fn is_advanced(self) -> bool {
        matches!(
            self,
            Self::MileageFrom
                | Self::MileageTo
                | Self::DriveType
                | Self::BodyType
                | Self::Color
                | Self::Location
        )
    }
}

/// Плоский набор фильтров каталога. Пустая строка = фильтр не задан.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarFilters {
    pub make: String,
    pub model: String,
    #[serde(alias = "year_from")]
    pub year_from: String,
    #[serde(alias = "year_to")]
    pub year_to: String,
    #[serde(alias = "price_from")]
    pub price_from: String,
    #[serde(alias = "price_to")]
    pub price_to: String,
    #[serde(alias = "mileage_from")]
    pub mileage_from: String,
    #[serde(alias = "mileage_to")]
    pub mileage_to: String,
    #[serde(alias = "fuel_type")]
    pub fuel_type: String,
    pub transmission: String,
    #[serde(alias = "drive_type")]
    pub drive_type: String,
    #[serde(alias = "body_type")]
    pub body_type: String,
    pub color: String,
    pub location: String,
}

impl CarFilters {
    /// Значение поля.
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Make => &self.make,
            FilterField::Model => &self.model,
            FilterField::YearFrom => &self.year_from,
            FilterField::YearTo => &self.year_to,
            FilterField::PriceFrom => &self.price_from,
            FilterField::PriceTo => &self.price_to,
            FilterField::MileageFrom => &self.mileage_from,
            FilterField::MileageTo => &self.mileage_to,
            FilterField::FuelType => &self.fuel_type,
            FilterField::Transmission => &self.transmission,
            FilterField::DriveType => &self.drive_type,
            FilterField::BodyType => &self.body_type,
            FilterField::Color => &self.color,
            FilterField::Location => &self.location,
        }
    }

    fn slot(&mut self, field: FilterField) -> &mut String {
        match field {
            FilterField::Make => &mut self.make,
            FilterField::Model => &mut self.model,
            FilterField::YearFrom => &mut self.year_from,
            FilterField::YearTo => &mut self.year_to,
            FilterField::PriceFrom => &mut self.price_from,
            FilterField::PriceTo => &mut self.price_to,
            FilterField::MileageFrom => &mut self.mileage_from,
            FilterField::MileageTo => &mut self.mileage_to,
            FilterField::FuelType => &mut self.fuel_type,
            FilterField::Transmission => &mut self.transmission,
            FilterField::DriveType => &mut self.drive_type,
            FilterField::BodyType => &mut self.body_type,
            FilterField::Color => &mut self.color,
            FilterField::Location => &mut self.location,
        }
    }

    /// Устанавливает значение поля; пробелы по краям отбрасываются.
    pub fn set(&mut self, field: FilterField, value: impl AsRef<str>) {
        *self.slot(field) = value.as_ref().trim().to_string();
    }

    /// Builder-вариант `set`.
    pub fn with(mut self, field: FilterField, value: impl AsRef<str>) -> Self {
        self.set(field, value);
        self
    }

    /// Сбрасывает все поля в `""`.
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// Количество заданных (непустых) фильтров.
    pub fn active_count(&self) -> usize {
        FilterField::ALL
            .into_iter()
            .filter(|field| !self.get(*field).is_empty())
            .count()
    }

    /// `true`, если ни один фильтр не задан.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Заданные фильтры в порядке `FilterField::ALL`.
    pub fn active(&self) -> impl Iterator<Item = (FilterField, &str)> + '_ {
        FilterField::ALL
            .into_iter()
            .map(|field| (field, self.get(field)))
            .filter(|(_, value)| !value.is_empty())
    }

    /// Собирает фильтры из пар ключ/значение в любой нотации.
    ///
    /// Неизвестные ключи игнорируются, при повторе ключа побеждает последний.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::default();
        for (key, value) in pairs {
            if let Some(field) = FilterField::from_key(key.as_ref()) {
                filters.set(field, value);
            }
        }
        filters
    }

    /// Пары для query string запроса к бэкенду: только заданные поля,
    /// серверные имена.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        self.active()
            .map(|(field, value)| (field.server_key(), value.to_string()))
            .collect()
    }

    /// Пары для адресной строки: только заданные поля, клиентские имена.
    pub fn to_url_pairs(&self) -> Vec<(&'static str, String)> {
        self.active()
            .map(|(field, value)| (field.key(), value.to_string()))
            .collect()
    }

    /// Снимок в серверной нотации со всеми 14 ключами (для кэша `carFilters`).
    pub fn to_server_json(&self) -> Value {
        let map = FilterField::ALL
            .into_iter()
            .map(|field| {
                (
                    field.server_key().to_string(),
                    Value::String(self.get(field).to_string()),
                )
            })
            .collect::<Map<String, Value>>();
        Value::Object(map)
    }

    /// Разбирает JSON-объект в любой нотации.
    ///
    /// Числа приводятся к строке, `null` и прочие типы считаются пустыми.
    /// Возвращает `None`, если значение не объект.
    pub fn from_json_lenient(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let pairs = object.iter().map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => String::new(),
            };
            (key.as_str(), value)
        });
        Some(Self::from_pairs(pairs))
    }
}

/// Согласование временных (редактируемых) и применённых фильтров.
///
/// Пользователь меняет сколько угодно полей в `temp`; `applied` меняется
/// только через `apply`/`sync`/`reset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSession {
    applied: CarFilters,
    temp: CarFilters,
}

impl FilterSession {
    /// Сессия, в которой черновик совпадает с применёнными фильтрами.
    pub fn new(applied: CarFilters) -> Self {
        Self {
            temp: applied.clone(),
            applied,
        }
    }

    /// Восстанавливает сессию с уже существующим черновиком.
    pub fn with_draft(applied: CarFilters, temp: CarFilters) -> Self {
        Self { applied, temp }
    }

    /// Применённые фильтры.
    pub fn applied(&self) -> &CarFilters {
        &self.applied
    }

    /// Черновик.
    pub fn temp(&self) -> &CarFilters {
        &self.temp
    }

    /// Меняет поле черновика.
    pub fn set(&mut self, field: FilterField, value: impl AsRef<str>) {
        self.temp.set(field, value);
    }

    /// Меняет черновик по ключу в любой нотации. Возвращает `false` для
    /// неизвестного ключа.
    pub fn set_by_key(&mut self, key: &str, value: impl AsRef<str>) -> bool {
        match FilterField::from_key(key) {
            Some(field) => {
                self.temp.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Внешние фильтры изменились: принимаем их и пересобираем черновик.
    ///
    /// Несохранённые правки черновика теряются.
    pub fn sync(&mut self, applied: CarFilters) {
        self.temp = applied.clone();
        self.applied = applied;
    }

    /// Как `sync`, но из произвольных пар (например, фильтры из расширенного
    /// окна с серверными именами).
    pub fn sync_from_pairs<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.sync(CarFilters::from_pairs(pairs));
    }

    /// Фиксирует черновик и возвращает применённый снимок.
    pub fn apply(&mut self) -> CarFilters {
        self.applied = self.temp.clone();
        self.applied.clone()
    }

    /// Отбрасывает правки черновика.
    pub fn discard(&mut self) {
        self.temp = self.applied.clone();
    }

    /// Полный сброс в пустое состояние, без перезагрузки страницы.
    pub fn reset(&mut self) {
        self.applied.clear_all();
        self.temp.clear_all();
    }

    /// Есть ли неприменённые правки.
    pub fn is_dirty(&self) -> bool {
        self.applied != self.temp
    }

    /// Поля, в которых черновик отличается от применённых фильтров.
    pub fn pending_fields(&self) -> Vec<FilterField> {
        FilterField::ALL
            .into_iter()
            .filter(|field| self.applied.get(*field) != self.temp.get(*field))
            .collect()
    }
}

/// Состояние модального окна расширенных фильтров.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedFiltersModal {
    open: bool,
    filters: CarFilters,
}

impl AdvancedFiltersModal {
    /// Закрытое окно с пустыми фильтрами.
    pub fn new() -> Self {
        Self::default()
    }

    /// Открывает окно, копируя текущие фильтры.
    pub fn open(&mut self, current: &CarFilters) {
        self.filters = current.clone();
        self.open = true;
    }

    /// Открыто ли окно.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Фильтры внутри окна.
    pub fn filters(&self) -> &CarFilters {
        &self.filters
    }

    /// Меняет поле внутри окна.
    pub fn set(&mut self, field: FilterField, value: impl AsRef<str>) {
        self.filters.set(field, value);
    }

    /// Очищает все поля.
    pub fn handle_clear_all(&mut self) {
        self.filters.clear_all();
    }

    /// Количество заданных фильтров (бейдж на кнопке).
    pub fn active_filters_count(&self) -> usize {
        self.filters.active_count()
    }

    /// Закрывает окно и отдаёт фильтры в серверной нотации, как их ожидает
    /// `FilterSession::sync_from_pairs`.
    pub fn handle_apply(&mut self) -> Vec<(&'static str, String)> {
        self.open = false;
        FilterField::ALL
            .into_iter()
            .map(|field| (field.server_key(), self.filters.get(field).to_string()))
            .collect()
    }

    /// Закрывает окно без применения.
    pub fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_state() -> Value {
        json!({
            "make": "", "model": "",
            "yearFrom": "", "yearTo": "",
            "priceFrom": "", "priceTo": "",
            "mileageFrom": "", "mileageTo": "",
            "fuelType": "", "transmission": "",
            "driveType": "", "bodyType": "",
            "color": "", "location": ""
        })
    }

    #[test]
    fn field_keys_round_both_namings() {
        assert_eq!(FilterField::from_key("fuel_type"), Some(FilterField::FuelType));
        assert_eq!(FilterField::from_key("fuelType"), Some(FilterField::FuelType));
        assert_eq!(FilterField::from_key("unknown"), None);
        assert_eq!(FilterField::ALL.len(), 14);
    }

    #[test]
    fn set_trims_and_counts_active() {
        let filters = CarFilters::default()
            .with(FilterField::Color, "  red ")
            .with(FilterField::YearFrom, "2020")
            .with(FilterField::Model, "   ");

        assert_eq!(filters.color, "red");
        assert_eq!(filters.active_count(), 2);
    }

    #[test]
    fn deserialize_remaps_snake_case_variants() {
        let raw = r#"{"fuel_type":"diesel","driveType":"awd","year_from":"2018"}"#;
        let filters: CarFilters = serde_json::from_str(raw).expect("must parse");

        assert_eq!(filters.fuel_type, "diesel");
        assert_eq!(filters.drive_type, "awd");
        assert_eq!(filters.year_from, "2018");
        assert_eq!(filters.active_count(), 3);
    }

    #[test]
    fn from_json_lenient_stringifies_numbers() {
        let value = json!({"year_from": 2015, "price_to": 30000, "color": null, "junk": "x"});
        let filters = CarFilters::from_json_lenient(&value).expect("object must parse");

        assert_eq!(filters.year_from, "2015");
        assert_eq!(filters.price_to, "30000");
        assert_eq!(filters.color, "");
        assert!(CarFilters::from_json_lenient(&json!([1, 2])).is_none());
    }

    #[test]
    fn query_pairs_use_server_names_and_skip_empty() {
        let filters = CarFilters::default()
            .with(FilterField::FuelType, "petrol")
            .with(FilterField::PriceTo, "15000");

        assert_eq!(
            filters.to_query_pairs(),
            vec![
                ("price_to", "15000".to_string()),
                ("fuel_type", "petrol".to_string()),
            ]
        );
        assert_eq!(
            filters.to_url_pairs(),
            vec![
                ("priceTo", "15000".to_string()),
                ("fuelType", "petrol".to_string()),
            ]
        );
    }

    #[test]
    fn query_pairs_map_every_field_to_server_name() {
        let filters = FilterField::ALL
            .into_iter()
            .fold(CarFilters::default(), |filters, field| {
                filters.with(field, format!("v-{}", field.key()))
            });

        let keys: Vec<&str> = filters.to_query_pairs().iter().map(|(key, _)| *key).collect();
        assert_eq!(
            keys,
            vec![
                "make",
                "model",
                "year_from",
                "year_to",
                "price_from",
                "price_to",
                "mileage_from",
                "mileage_to",
                "fuel_type",
                "transmission",
                "drive_type",
                "body_type",
                "color",
                "location",
            ]
        );
        let pairs = filters.to_query_pairs();
        assert!(pairs.contains(&("drive_type", "v-driveType".to_string())));
        assert!(pairs.contains(&("mileage_from", "v-mileageFrom".to_string())));
    }

    #[test]
    fn server_json_restores_through_lenient_parser() {
        let filters = CarFilters::default()
            .with(FilterField::BodyType, "sedan")
            .with(FilterField::MileageTo, "90000");
        let snapshot = filters.to_server_json();

        assert_eq!(snapshot.as_object().map(|o| o.len()), Some(14));
        assert_eq!(snapshot["body_type"], "sedan");
        assert_eq!(CarFilters::from_json_lenient(&snapshot), Some(filters));
    }

    #[test]
    fn session_edits_do_not_touch_applied_until_apply() {
        let applied = CarFilters::default().with(FilterField::Make, "Kia");
        let mut session = FilterSession::new(applied.clone());

        session.set(FilterField::Color, "red");
        session.set(FilterField::Make, "Hyundai");

        assert_eq!(session.applied(), &applied);
        assert_eq!(session.temp().make, "Hyundai");
        assert!(session.is_dirty());
        assert_eq!(
            session.pending_fields(),
            vec![FilterField::Make, FilterField::Color]
        );

        let committed = session.apply();
        assert_eq!(committed.make, "Hyundai");
        assert_eq!(committed.color, "red");
        assert_eq!(session.applied(), &committed);
        assert!(!session.is_dirty());
    }

    #[test]
    fn session_sync_remaps_and_drops_draft() {
        let mut session = FilterSession::default();
        session.set(FilterField::Color, "blue");

        session.sync_from_pairs([("fuel_type", "hybrid"), ("body_type", "suv")]);

        assert_eq!(session.temp().fuel_type, "hybrid");
        assert_eq!(session.temp().body_type, "suv");
        assert_eq!(session.temp().color, "");
        assert!(!session.is_dirty());
    }

    #[test]
    fn session_discard_and_reset() {
        let mut session =
            FilterSession::new(CarFilters::default().with(FilterField::Location, "Tashkent"));
        session.set(FilterField::Location, "Samarkand");
        session.discard();
        assert_eq!(session.temp().location, "Tashkent");

        session.reset();
        assert!(session.applied().is_empty());
        assert!(session.temp().is_empty());
    }

    #[test]
    fn set_by_key_rejects_unknown_keys() {
        let mut session = FilterSession::default();
        assert!(session.set_by_key("drive_type", "fwd"));
        assert!(!session.set_by_key("wheels", "4"));
        assert_eq!(session.temp().drive_type, "fwd");
    }

    #[test]
    fn handle_clear_all_produces_documented_empty_state() {
        let current = CarFilters::default()
            .with(FilterField::Color, "red")
            .with(FilterField::YearFrom, "2020");
        let mut modal = AdvancedFiltersModal::new();
        modal.open(&current);
        assert_eq!(modal.active_filters_count(), 2);

        modal.handle_clear_all();

        assert_eq!(modal.active_filters_count(), 0);
        let value = serde_json::to_value(modal.filters()).expect("must serialize");
        assert_eq!(value, empty_state());
    }

    #[test]
    fn modal_apply_feeds_session_sync() {
        let mut modal = AdvancedFiltersModal::new();
        modal.open(&CarFilters::default());
        modal.set(FilterField::DriveType, "4wd");
        modal.set(FilterField::MileageTo, "50000");

        let pairs = modal.handle_apply();
        assert!(!modal.is_open());

        let mut session = FilterSession::default();
        session.sync_from_pairs(pairs);
        assert_eq!(session.applied().drive_type, "4wd");
        assert_eq!(session.applied().mileage_to, "50000");
    }
}
