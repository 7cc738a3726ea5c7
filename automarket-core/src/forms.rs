//! Формы админки: оценка пароля и многошаговая форма компании
//! (дилер или автосалон).

use chrono::{Datelike, Utc};
use validator::{ValidateEmail, ValidateUrl};

use crate::error::{FormErrors, ValidationError};
use crate::models::{AccountPayload, CompanyPayload, CompanyProfile};

/// Уровень надёжности пароля.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
}

impl StrengthLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Weak => "Слабый",
            Self::Medium => "Средний",
            Self::Strong => "Надёжный",
        }
    }
}

/// Оценка пароля: по баллу за каждый выполненный критерий.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordStrength {
    /// 0..=5.
    pub score: u8,
    pub level: StrengthLevel,
    /// Подсказки по невыполненным критериям.
    pub hints: Vec<&'static str>,
}

/// Минимальная длина пароля.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Оценивает пароль: длина >= 8, строчная, заглавная, цифра, спецсимвол.
pub fn password_strength(password: &str) -> PasswordStrength {
    let checks: [(bool, &'static str); 5] = [
        (
            password.chars().count() >= MIN_PASSWORD_LEN,
            "Не менее 8 символов",
        ),
        (
            password.chars().any(char::is_lowercase),
            "Добавьте строчную букву",
        ),
        (
            password.chars().any(char::is_uppercase),
            "Добавьте заглавную букву",
        ),
        (password.chars().any(|c| c.is_ascii_digit()), "Добавьте цифру"),
        (
            password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
            "Добавьте спецсимвол",
        ),
    ];

    let score = checks.iter().filter(|(ok, _)| *ok).count() as u8;
    let hints = checks
        .iter()
        .filter(|(ok, _)| !*ok)
        .map(|(_, hint)| *hint)
        .collect();
    let level = match score {
        0..=2 => StrengthLevel::Weak,
        3..=4 => StrengthLevel::Medium,
        _ => StrengthLevel::Strong,
    };

    PasswordStrength {
        score,
        level,
        hints,
    }
}

/// Какая сущность редактируется.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyKind {
    Dealer,
    Autosalon,
}

impl CompanyKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Dealer => "Дилер",
            Self::Autosalon => "Автосалон",
        }
    }
}

/// Шаг формы.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Account,
    Company,
    Contacts,
}

impl FormStep {
    pub fn title(self) -> &'static str {
        match self {
            Self::Account => "Учётная запись",
            Self::Company => "Компания",
            Self::Contacts => "Контакты",
        }
    }
}

const CREATE_STEPS: [FormStep; 3] = [FormStep::Account, FormStep::Company, FormStep::Contacts];
const EDIT_STEPS: [FormStep; 2] = [FormStep::Company, FormStep::Contacts];

/// Многошаговая форма создания/редактирования дилера или автосалона.
///
/// Поля хранятся "как введены"; нормализация выполняется в `into_payload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyForm {
    kind: CompanyKind,
    editing: bool,
    step: FormStep,
    current_year: i32,

    pub email: String,
    pub password: String,
    pub confirm_password: String,

    pub company_name: String,
    pub established_year: String,
    pub website: String,
    pub description: String,

    pub phone: String,
    pub contact_email: String,
    pub address: String,

    /// Для дилера: привязка к существующему пользователю вместо создания
    /// новой учётной записи.
    pub user_id: Option<i64>,
}

impl CompanyForm {
    /// Пустая форма создания.
    pub fn new(kind: CompanyKind) -> Self {
        Self {
            kind,
            editing: false,
            step: FormStep::Account,
            current_year: Utc::now().year(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            company_name: String::new(),
            established_year: String::new(),
            website: String::new(),
            description: String::new(),
            phone: String::new(),
            contact_email: String::new(),
            address: String::new(),
            user_id: None,
        }
    }

    /// Форма редактирования существующей компании: шаг учётной записи
    /// пропускается.
    pub fn edit(kind: CompanyKind, profile: &CompanyProfile) -> Self {
        let mut form = Self::new(kind);
        form.editing = true;
        form.step = FormStep::Company;
        form.company_name = profile.company_name.clone();
        form.established_year = profile
            .established_year
            .map(|year| year.to_string())
            .unwrap_or_default();
        form.website = profile.website.clone().unwrap_or_default();
        form.description = profile.description.clone().unwrap_or_default();
        form.phone = profile.phone.clone().unwrap_or_default();
        form.contact_email = profile.email.clone().unwrap_or_default();
        form.address = profile.address.clone().unwrap_or_default();
        form
    }

    /// Фиксирует "текущий год" для проверки года основания.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn kind(&self) -> CompanyKind {
        self.kind
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn steps(&self) -> &'static [FormStep] {
        if self.editing {
            &EDIT_STEPS
        } else {
            &CREATE_STEPS
        }
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn step_index(&self) -> usize {
        self.steps()
            .iter()
            .position(|step| *step == self.step)
            .unwrap_or(0)
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index() + 1 == self.steps().len()
    }

    pub fn password_strength(&self) -> PasswordStrength {
        password_strength(&self.password)
    }

    /// Ошибки одного шага.
    pub fn validate_step(&self, step: FormStep) -> FormErrors {
        let mut errors = FormErrors::new();
        match step {
            FormStep::Account => {
                if self.user_id.is_none() {
                    errors.check(validate_email("email", &self.email));
                    errors.check(self.validate_password());
                    if self.password != self.confirm_password {
                        errors.push(ValidationError::new(
                            "confirmPassword",
                            "Пароли не совпадают",
                        ));
                    }
                }
            }
            FormStep::Company => {
                errors.check(validate_company_name(&self.company_name));
                errors.check(validate_established_year(
                    &self.established_year,
                    self.current_year,
                ));
                errors.check(validate_website(&self.website));
            }
            FormStep::Contacts => {
                errors.check(validate_phone(&self.phone));
                if !self.contact_email.trim().is_empty() {
                    errors.check(validate_email("contactEmail", &self.contact_email));
                }
                if self.kind == CompanyKind::Autosalon && self.address.trim().is_empty() {
                    errors.push(ValidationError::new("address", "Укажите адрес автосалона"));
                }
            }
        }
        errors
    }

    /// Ошибки всех шагов текущего режима.
    pub fn validate_all(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        for step in self.steps() {
            errors.extend(self.validate_step(*step));
        }
        errors
    }

    /// Переход вперёд; при ошибках текущего шага остаёмся на месте.
    pub fn next(&mut self) -> Result<FormStep, FormErrors> {
        self.validate_step(self.step).into_result()?;
        if let Some(next) = self.steps().get(self.step_index() + 1) {
            self.step = *next;
        }
        Ok(self.step)
    }

    /// Переход назад без проверки.
    pub fn back(&mut self) -> FormStep {
        let index = self.step_index();
        if index > 0 {
            self.step = self.steps()[index - 1];
        }
        self.step
    }

    fn validate_password(&self) -> Result<(), ValidationError> {
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::new(
                "password",
                "Пароль должен быть не короче 8 символов",
            ));
        }
        if self.password_strength().level == StrengthLevel::Weak {
            return Err(ValidationError::new("password", "Пароль слишком простой"));
        }
        Ok(())
    }

    /// Проверяет все шаги и собирает тело запроса.
    pub fn into_payload(self) -> Result<CompanyPayload, FormErrors> {
        self.validate_all().into_result()?;

        let account = if self.editing || self.user_id.is_some() {
            None
        } else {
            Some(AccountPayload {
                email: self.email.trim().to_lowercase(),
                password: self.password,
            })
        };

        Ok(CompanyPayload {
            user_id: self.user_id,
            profile: CompanyProfile {
                company_name: self.company_name.trim().to_string(),
                logo: None,
                established_year: self.established_year.trim().parse().ok(),
                website: non_empty(normalize_website(&self.website)),
                address: non_empty(self.address),
                phone: non_empty(self.phone),
                email: non_empty(self.contact_email.trim().to_lowercase()),
                description: non_empty(self.description),
            },
            account,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn validate_email(field: &'static str, email: &str) -> Result<(), ValidationError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::new(field, "Укажите email"));
    }
    if !email.validate_email() {
        return Err(ValidationError::new(field, "Некорректный email"));
    }
    Ok(())
}

fn validate_company_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if !(2..=100).contains(&len) {
        return Err(ValidationError::new(
            "companyName",
            "Название должно быть от 2 до 100 символов",
        ));
    }
    Ok(())
}

fn validate_established_year(raw: &str, current_year: i32) -> Result<(), ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(());
    }
    match raw.parse::<i32>() {
        Ok(year) if (1900..=current_year).contains(&year) => Ok(()),
        _ => Err(ValidationError::new(
            "establishedYear",
            "Год основания должен быть между 1900 и текущим годом",
        )),
    }
}

fn normalize_website(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

fn validate_website(raw: &str) -> Result<(), ValidationError> {
    let url = normalize_website(raw);
    if url.is_empty() || url.validate_url() {
        return Ok(());
    }
    Err(ValidationError::new("website", "Некорректный адрес сайта"))
}

fn validate_phone(raw: &str) -> Result<(), ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::new("phone", "Укажите телефон"));
    }
    let allowed = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '));
    let digits = raw.chars().filter(char::is_ascii_digit).count();
    if !allowed || !(7..=15).contains(&digits) {
        return Err(ValidationError::new("phone", "Некорректный номер телефона"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(kind: CompanyKind) -> CompanyForm {
        let mut form = CompanyForm::new(kind).with_current_year(2026);
        form.email = "Owner@Example.com".to_string();
        form.password = "Str0ng!pass".to_string();
        form.confirm_password = "Str0ng!pass".to_string();
        form.company_name = "Auto Plus".to_string();
        form.established_year = "2010".to_string();
        form.website = "autoplus.uz".to_string();
        form.phone = "+998 (90) 123-45-67".to_string();
        form.address = "Tashkent, Amir Temur 1".to_string();
        form
    }

    #[test]
    fn password_strength_scores_each_rule() {
        let weak = password_strength("abc");
        assert_eq!(weak.level, StrengthLevel::Weak);
        assert_eq!(weak.score, 1);
        assert_eq!(weak.hints.len(), 4);

        let medium = password_strength("abcdefG1");
        assert_eq!(medium.score, 4);
        assert_eq!(medium.level, StrengthLevel::Medium);
        assert_eq!(medium.hints, vec!["Добавьте спецсимвол"]);

        let strong = password_strength("Str0ng!pass");
        assert_eq!(strong.score, 5);
        assert_eq!(strong.level, StrengthLevel::Strong);
        assert!(strong.hints.is_empty());
    }

    #[test]
    fn account_step_reports_mismatch_and_weak_password() {
        let mut form = CompanyForm::new(CompanyKind::Dealer);
        form.email = "not-an-email".to_string();
        form.password = "password".to_string();
        form.confirm_password = "other".to_string();

        let errors = form.validate_step(FormStep::Account);
        assert_eq!(errors.get("email"), Some("Некорректный email"));
        assert_eq!(errors.get("password"), Some("Пароль слишком простой"));
        assert_eq!(errors.get("confirmPassword"), Some("Пароли не совпадают"));
    }

    #[test]
    fn next_stays_on_step_with_errors() {
        let mut form = CompanyForm::new(CompanyKind::Dealer);
        let errors = form.next().expect_err("empty account step must fail");
        assert!(!errors.is_empty());
        assert_eq!(form.step(), FormStep::Account);
    }

    #[test]
    fn next_and_back_walk_through_steps() {
        let mut form = filled(CompanyKind::Dealer);
        assert_eq!(form.next().expect("account valid"), FormStep::Company);
        assert_eq!(form.next().expect("company valid"), FormStep::Contacts);
        assert!(form.is_last_step());
        assert_eq!(form.next().expect("contacts valid"), FormStep::Contacts);
        assert_eq!(form.back(), FormStep::Company);
        assert_eq!(form.back(), FormStep::Account);
        assert_eq!(form.back(), FormStep::Account);
    }

    #[test]
    fn established_year_must_not_be_in_future() {
        let mut form = filled(CompanyKind::Dealer);
        form.established_year = "2027".to_string();
        let errors = form.validate_step(FormStep::Company);
        assert!(errors.get("establishedYear").is_some());

        form.established_year = String::new();
        assert!(form.validate_step(FormStep::Company).is_empty());
    }

    #[test]
    fn autosalon_requires_address_dealer_does_not() {
        let mut dealer = filled(CompanyKind::Dealer);
        dealer.address.clear();
        assert!(dealer.validate_step(FormStep::Contacts).is_empty());

        let mut salon = filled(CompanyKind::Autosalon);
        salon.address.clear();
        let errors = salon.validate_step(FormStep::Contacts);
        assert_eq!(errors.get("address"), Some("Укажите адрес автосалона"));
    }

    #[test]
    fn phone_rules() {
        assert!(validate_phone("+998901234567").is_ok());
        assert!(validate_phone("12-34").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn into_payload_normalizes_fields() {
        let payload = filled(CompanyKind::Autosalon)
            .into_payload()
            .expect("form must be valid");

        assert_eq!(payload.profile.company_name, "Auto Plus");
        assert_eq!(payload.profile.established_year, Some(2010));
        assert_eq!(
            payload.profile.website.as_deref(),
            Some("https://autoplus.uz")
        );
        let account = payload.account.expect("account must be created");
        assert_eq!(account.email, "owner@example.com");
        assert!(payload.profile.email.is_none());
    }

    #[test]
    fn edit_mode_skips_account_step() {
        let profile = CompanyProfile {
            company_name: "Old Name".to_string(),
            phone: Some("+998901112233".to_string()),
            address: Some("Bukhara".to_string()),
            ..CompanyProfile::default()
        };
        let form = CompanyForm::edit(CompanyKind::Autosalon, &profile).with_current_year(2026);

        assert_eq!(form.step(), FormStep::Company);
        assert_eq!(form.steps(), &[FormStep::Company, FormStep::Contacts]);

        let payload = form.into_payload().expect("existing profile must be valid");
        assert!(payload.account.is_none());
        assert_eq!(payload.profile.address.as_deref(), Some("Bukhara"));
    }

    #[test]
    fn dealer_linked_to_existing_user_needs_no_account() {
        let mut form = filled(CompanyKind::Dealer);
        form.email.clear();
        form.password.clear();
        form.confirm_password.clear();
        form.user_id = Some(42);

        let payload = form.into_payload().expect("must be valid");
        assert_eq!(payload.user_id, Some(42));
        assert!(payload.account.is_none());
    }
}
