use std::path::PathBuf;

use anyhow::{Result, anyhow};
use automarket_client::{CompanyApi, MarketplaceClient, UploadFile};
use automarket_core::forms::{CompanyForm, CompanyKind, StrengthLevel};
use automarket_core::upload::{DEFAULT_MAX_FILE_SIZE, SingleSlot};
use automarket_core::{Company, CompanyPayload, ListQuery, SortOrder};
use clap::{Args, Subcommand};
use serde::de::DeserializeOwned;

use crate::output::{print_cars, print_companies, print_company, print_form_errors};
use crate::{map_client_error, parse_sort_order};

#[derive(Debug, Subcommand)]
pub enum DealersCommand {
    #[command(flatten)]
    Common(CompanyCommand),
    /// Дилер, привязанный к пользователю.
    ByUser {
        #[arg(long)]
        user_id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum CompanyCommand {
    /// Список с поиском и сортировкой.
    List(ListArgs),
    /// Карточка компании.
    Show {
        #[arg(long)]
        id: i64,
    },
    /// Создание (требует токен администратора).
    Create(CompanyArgs),
    /// Обновление: незаданные поля остаются прежними.
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        fields: CompanyArgs,
    },
    /// Удаление (требует токен администратора).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Загрузка логотипа.
    Logo {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        file: PathBuf,
    },
    /// Объявления компании.
    Cars {
        #[arg(long)]
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    /// Серверное поле сортировки, например `company_name`.
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long, value_parser = parse_sort_order, default_value = "asc")]
    sort_order: SortOrder,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    limit: Option<u32>,
}

/// Поля формы компании. При создании пустые поля проверяются валидацией.
#[derive(Debug, Default, Args)]
pub struct CompanyArgs {
    /// Email новой учётной записи администратора.
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// Повтор пароля; если не задан, совпадает с `--password`.
    #[arg(long)]
    confirm_password: Option<String>,
    /// Привязать к существующему пользователю вместо создания учётной записи.
    #[arg(long)]
    user_id: Option<i64>,
    #[arg(long)]
    company_name: Option<String>,
    #[arg(long)]
    established_year: Option<String>,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    contact_email: Option<String>,
    #[arg(long)]
    address: Option<String>,
}

impl CompanyArgs {
    /// Переносит заданные флаги в форму.
    pub fn fill(self, form: &mut CompanyForm) {
        if let Some(password) = &self.password {
            form.confirm_password = self
                .confirm_password
                .clone()
                .unwrap_or_else(|| password.clone());
        }
        let fields = [
            (&mut form.email, self.email),
            (&mut form.password, self.password),
            (&mut form.company_name, self.company_name),
            (&mut form.established_year, self.established_year),
            (&mut form.website, self.website),
            (&mut form.description, self.description),
            (&mut form.phone, self.phone),
            (&mut form.contact_email, self.contact_email),
            (&mut form.address, self.address),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if self.user_id.is_some() {
            form.user_id = self.user_id;
        }
    }
}

pub async fn run_dealers(
    client: &MarketplaceClient,
    page_size: u32,
    command: DealersCommand,
) -> Result<()> {
    match command {
        DealersCommand::Common(command) => {
            run(client.dealers(), CompanyKind::Dealer, page_size, command).await
        }
        DealersCommand::ByUser { user_id } => {
            let dealer = client
                .dealers()
                .get_by_user(user_id)
                .await
                .map_err(map_client_error)?;
            print_company("Дилер", &dealer);
            Ok(())
        }
    }
}

pub async fn run<T>(
    api: CompanyApi<'_, T>,
    kind: CompanyKind,
    page_size: u32,
    command: CompanyCommand,
) -> Result<()>
where
    T: Company + DeserializeOwned,
{
    let title = kind.label();
    match command {
        CompanyCommand::List(args) => {
            let mut query = ListQuery::new(args.limit.unwrap_or(page_size))
                .with_page(args.page)
                .with_search(args.search.unwrap_or_default());
            if let Some(sort_by) = args.sort_by {
                query = query.with_sort(sort_by, args.sort_order);
            }
            let page = api.list(&query).await.map_err(map_client_error)?;
            print_companies(&page);
        }
        CompanyCommand::Show { id } => {
            let company = api.get(id).await.map_err(map_client_error)?;
            print_company(title, &company);
        }
        CompanyCommand::Create(fields) => {
            let mut form = CompanyForm::new(kind);
            fields.fill(&mut form);
            let payload = submit(form)?;
            let company = api.create(&payload).await.map_err(map_client_error)?;
            print_company(&format!("{title}: создан"), &company);
        }
        CompanyCommand::Update { id, fields } => {
            let current = api.get(id).await.map_err(map_client_error)?;
            let mut form = CompanyForm::edit(kind, current.profile());
            fields.fill(&mut form);
            let payload = submit(form)?;
            let company = api.update(id, &payload).await.map_err(map_client_error)?;
            print_company(&format!("{title}: обновлён"), &company);
        }
        CompanyCommand::Delete { id } => {
            api.delete(id).await.map_err(map_client_error)?;
            println!("{title} удалён: id={id}");
        }
        CompanyCommand::Logo { id, file } => {
            let file = UploadFile::from_path(&file, DEFAULT_MAX_FILE_SIZE)
                .await
                .map_err(map_client_error)?;
            let mut slot = SingleSlot::new(DEFAULT_MAX_FILE_SIZE);
            slot.replace(file.candidate())
                .map_err(|reason| anyhow!("{}: {}", file.name, reason.message()))?;
            let company = api.upload_logo(id, file).await.map_err(map_client_error)?;
            print_company(&format!("{title}: логотип обновлён"), &company);
        }
        CompanyCommand::Cars { id, page, limit } => {
            let query = ListQuery::new(limit.unwrap_or(page_size)).with_page(page);
            let cars = api.cars(id, &query).await.map_err(map_client_error)?;
            print_cars(&cars);
        }
    }
    Ok(())
}

/// Проходит шаги формы по порядку и собирает тело запроса.
fn submit(mut form: CompanyForm) -> Result<CompanyPayload> {
    let needs_account = !form.is_editing() && form.user_id.is_none();
    if needs_account && !form.password.is_empty() {
        let strength = form.password_strength();
        eprintln!(
            "Надёжность пароля: {} ({}/5)",
            strength.level.label(),
            strength.score
        );
        if strength.level != StrengthLevel::Strong {
            for hint in &strength.hints {
                eprintln!("  - {hint}");
            }
        }
    }

    loop {
        let step = form.step();
        if let Err(errors) = form.next() {
            eprintln!("Шаг «{}» заполнен с ошибками:", step.title());
            print_form_errors(&errors);
            return Err(anyhow!("форма не отправлена"));
        }
        if form.is_last_step() && form.step() == step {
            break;
        }
    }
    form.into_payload().map_err(|errors| anyhow!("{errors}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dealer_args() -> CompanyArgs {
        CompanyArgs {
            email: Some("Admin@Motors.uz".to_string()),
            password: Some("Str0ng!pass".to_string()),
            company_name: Some("Tashkent Motors".to_string()),
            phone: Some("+998 90 123 45 67".to_string()),
            ..CompanyArgs::default()
        }
    }

    #[test]
    fn confirm_password_defaults_to_password() {
        let mut form = CompanyForm::new(CompanyKind::Dealer);
        dealer_args().fill(&mut form);
        assert_eq!(form.confirm_password, form.password);
    }

    #[test]
    fn submit_walks_all_steps_and_builds_payload() {
        let mut form = CompanyForm::new(CompanyKind::Dealer).with_current_year(2026);
        dealer_args().fill(&mut form);

        let payload = submit(form).expect("form must be valid");
        let account = payload.account.expect("account must be created");
        assert_eq!(account.email, "admin@motors.uz");
        assert_eq!(payload.profile.company_name, "Tashkent Motors");
    }

    #[test]
    fn submit_stops_on_first_invalid_step() {
        let mut form = CompanyForm::new(CompanyKind::Autosalon).with_current_year(2026);
        dealer_args().fill(&mut form);

        // У автосалона адрес обязателен.
        assert!(submit(form).is_err());
    }
}
