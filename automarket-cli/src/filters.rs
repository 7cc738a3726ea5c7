use anyhow::{Result, anyhow};
use automarket_client::MarketplaceClient;
use automarket_core::storage::{clear_filters, save_session};
use automarket_core::{AdvancedFiltersModal, FilterField, FilterSession, ListQuery};
use clap::Subcommand;

use crate::map_client_error;
use crate::output::{print_cars, print_filters, print_session};
use crate::pages::CarsPage;
use crate::store::FileStore;

#[derive(Debug, Subcommand)]
pub enum FiltersCommand {
    /// Применённые фильтры и неприменённый черновик.
    Show,
    /// Правка черновика: `KEY=VALUE`, ключи в любой нотации
    /// (`fuelType` или `fuel_type`). Пустое значение снимает фильтр.
    Set {
        #[arg(value_parser = parse_key_value, required = true)]
        pairs: Vec<(String, String)>,
    },
    /// Применить черновик и показать первую страницу каталога.
    Apply,
    /// Очистить все поля черновика (до `apply` выдача не меняется).
    Clear,
    /// Отбросить неприменённые правки черновика.
    Discard,
    /// Сбросить и применённые фильтры, и черновик.
    Reset,
}

pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("ожидается KEY=VALUE, получено `{raw}`"))?;
    let key = key.trim();
    if FilterField::from_key(key).is_none() {
        let known: Vec<&str> = FilterField::ALL.iter().map(|field| field.key()).collect();
        return Err(format!(
            "неизвестный фильтр `{key}`; доступны: {}",
            known.join(", ")
        ));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

pub async fn run(
    client: &MarketplaceClient,
    store: &mut FileStore,
    session: FilterSession,
    page_size: u32,
    command: FiltersCommand,
) -> Result<()> {
    let mut page = CarsPage::new(client.clone(), session, ListQuery::new(page_size));
    match command {
        FiltersCommand::Show => print_session(page.session()),
        FiltersCommand::Set { pairs } => {
            for (key, value) in &pairs {
                if !page.session_mut().set_by_key(key, value) {
                    return Err(anyhow!("неизвестный фильтр `{key}`"));
                }
            }
            save_session(store, page.session())?;
            print_session(page.session());
        }
        FiltersCommand::Apply => {
            let applied = page.apply_filters();
            save_session(store, page.session())?;
            print_filters("Фильтры применены", &applied);

            let cars = page.load().await.map_err(map_client_error)?;
            print_cars(&cars);
        }
        FiltersCommand::Clear => {
            let mut modal = AdvancedFiltersModal::new();
            modal.open(page.session().temp());
            modal.handle_clear_all();
            for (key, value) in modal.handle_apply() {
                page.session_mut().set_by_key(key, value);
            }
            save_session(store, page.session())?;
            print_session(page.session());
        }
        FiltersCommand::Discard => {
            page.session_mut().discard();
            save_session(store, page.session())?;
            print_session(page.session());
        }
        FiltersCommand::Reset => {
            page.reset_filters();
            clear_filters(store)?;
            println!("Фильтры сброшены");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_accepts_both_namings() {
        assert_eq!(
            parse_key_value("fuel_type=diesel"),
            Ok(("fuel_type".to_string(), "diesel".to_string()))
        );
        assert_eq!(
            parse_key_value("yearFrom = 2020 "),
            Ok(("yearFrom".to_string(), "2020".to_string()))
        );
        assert_eq!(
            parse_key_value("color="),
            Ok(("color".to_string(), String::new()))
        );
    }

    #[test]
    fn key_value_rejects_unknown_keys_and_missing_separator() {
        assert!(parse_key_value("seats=5").is_err());
        assert!(parse_key_value("color").is_err());
    }
}
