use std::process;

use anyhow::{Context, Result};
use automarket_client::{ClientError, MarketplaceClient};
use automarket_core::SortOrder;
use automarket_core::forms::CompanyKind;
use automarket_core::storage::{clear_token, load_session, load_token, save_token};
use clap::{Parser, Subcommand};
use tracing::debug;

mod cars;
mod companies;
mod filters;
mod logging;
mod output;
mod pages;
mod progress;
mod settings;
mod store;

use cars::CarsCommand;
use companies::{CompanyCommand, DealersCommand};
use filters::FiltersCommand;
use logging::init_logging;
use settings::Settings;
use store::FileStore;

#[derive(Debug, Parser)]
#[command(name = "automarket", version, about = "Терминальный клиент автомаркетплейса")]
struct Cli {
    /// Адрес API (по умолчанию AUTOMARKET_API_URL).
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Объявления.
    #[command(subcommand)]
    Cars(CarsCommand),
    /// Сохранённые фильтры каталога.
    #[command(subcommand)]
    Filters(FiltersCommand),
    /// Дилеры.
    #[command(subcommand)]
    Dealers(DealersCommand),
    /// Автосалоны.
    #[command(subcommand)]
    Autosalons(CompanyCommand),
    /// JWT-токен для защищённых операций.
    #[command(subcommand)]
    Token(TokenCommand),
}

#[derive(Debug, Subcommand)]
enum TokenCommand {
    /// Сохранить токен.
    Set { token: String },
    /// Удалить сохранённый токен.
    Clear,
    /// Показать сохранённый токен (в сокращённом виде).
    Show,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    init_logging(&settings.log_level)?;

    let mut store =
        FileStore::open(&settings.state_dir).context("не удалось открыть хранилище")?;

    let api_url = normalize_server(cli.server.unwrap_or(settings.api_url));
    debug!(%api_url, "using api");
    let mut client = MarketplaceClient::with_timeout(api_url, settings.request_timeout)
        .map_err(map_client_error)?;
    if let Some(token) = load_token(&store) {
        client.set_token(token);
    }

    match cli.command {
        Command::Cars(command) => {
            let saved = load_session(&store);
            cars::run(&client, saved, settings.page_size, command).await?;
        }
        Command::Filters(command) => {
            let session = load_session(&store);
            filters::run(&client, &mut store, session, settings.page_size, command).await?;
        }
        Command::Dealers(command) => {
            companies::run_dealers(&client, settings.page_size, command).await?;
        }
        Command::Autosalons(command) => {
            companies::run(
                client.autosalons(),
                CompanyKind::Autosalon,
                settings.page_size,
                command,
            )
            .await?;
        }
        Command::Token(command) => match command {
            TokenCommand::Set { token } => {
                save_token(&mut store, &token).context("не удалось сохранить токен")?;
                println!("Токен сохранён");
            }
            TokenCommand::Clear => {
                clear_token(&mut store).context("не удалось удалить токен")?;
                println!("Токен удалён");
            }
            TokenCommand::Show => match load_token(&store) {
                Some(token) => println!("token: {}", mask_token(&token)),
                None => println!("Токен не сохранён"),
            },
        },
    }

    Ok(())
}

fn normalize_server(server: String) -> String {
    let server = server.trim().trim_end_matches('/').to_string();
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

pub(crate) fn parse_sort_order(raw: &str) -> Result<SortOrder, String> {
    SortOrder::parse(raw).ok_or_else(|| format!("ожидается asc или desc, получено `{raw}`"))
}

fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(8).collect();
    if visible.chars().count() == token.chars().count() {
        return visible;
    }
    format!("{visible}…")
}

pub(crate) fn map_client_error(err: ClientError) -> anyhow::Error {
    let message = match err {
        ClientError::Unauthorized(message) => {
            format!("{message}; сохраните токен: `automarket token set <JWT>`")
        }
        ClientError::NotFound(message) | ClientError::Rejected { message, .. } => message,
        ClientError::Http(err) => format!("ошибка HTTP: {err}"),
        ClientError::Decode(message) => format!("некорректный ответ сервера: {message}"),
        ClientError::Io(err) => format!("не удалось прочитать файл: {err}"),
        ClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        too_large @ ClientError::FileTooLarge { .. } => too_large.to_string(),
    };
    anyhow::anyhow!(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://api.example.com:5000/".to_string());
        assert_eq!(s, "https://api.example.com:5000");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:5000".to_string());
        assert_eq!(s, "http://127.0.0.1:5000");
    }

    #[test]
    fn mask_token_hides_tail() {
        assert_eq!(mask_token("abc"), "abc");
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGci…");
    }

    #[test]
    fn backend_message_is_shown_verbatim() {
        let err = map_client_error(ClientError::Rejected {
            status: 422,
            message: "Цена должна быть больше нуля".to_string(),
        });
        assert_eq!(err.to_string(), "Цена должна быть больше нуля");

        let err = map_client_error(ClientError::Unauthorized("Нет доступа".to_string()));
        assert!(err.to_string().starts_with("Нет доступа; "));
    }

    #[test]
    fn cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "automarket",
            "cars",
            "list",
            "--fuel-type",
            "diesel",
            "--sort-by",
            "price",
            "--sort-order",
            "asc",
        ])
        .expect("cars list must parse");
        assert!(matches!(cli.command, Command::Cars(CarsCommand::List(_))));

        let cli = Cli::try_parse_from(["automarket", "dealers", "by-user", "--user-id", "7"])
            .expect("dealers by-user must parse");
        assert!(matches!(
            cli.command,
            Command::Dealers(DealersCommand::ByUser { user_id: 7 })
        ));

        let cli = Cli::try_parse_from(["automarket", "dealers", "show", "--id", "3"])
            .expect("dealers show must parse");
        assert!(matches!(
            cli.command,
            Command::Dealers(DealersCommand::Common(CompanyCommand::Show { id: 3 }))
        ));

        let by_user = ["automarket", "autosalons", "by-user", "--user-id", "7"];
        assert!(Cli::try_parse_from(by_user).is_err());
    }

    #[test]
    fn filters_set_rejects_unknown_key_at_parse_time() {
        assert!(Cli::try_parse_from(["automarket", "filters", "set", "fuel_type=diesel"]).is_ok());
        assert!(Cli::try_parse_from(["automarket", "filters", "set", "seats=5"]).is_err());
    }
}
