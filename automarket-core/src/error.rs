use std::collections::BTreeMap;

use thiserror::Error;

/// Ошибка валидации одного поля формы.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed for '{field}': {message}")]
pub struct ValidationError {
    /// Имя поля в клиентской нотации (`companyName`, `yearFrom`, ...).
    pub field: &'static str,
    /// Сообщение для inline-вывода рядом с полем.
    pub message: &'static str,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Набор ошибок формы: поле -> первое найденное сообщение.
///
/// Порядок полей стабилен (BTreeMap), чтобы вывод в UI/CLI не "прыгал".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: BTreeMap<&'static str, &'static str>,
}

impl FormErrors {
    /// Пустой набор ошибок.
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет ошибку; для поля сохраняется первое сообщение.
    pub fn push(&mut self, err: ValidationError) {
        self.errors.entry(err.field).or_insert(err.message);
    }

    /// Добавляет ошибку из результата проверки, если она есть.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.push(err);
        }
    }

    /// Объединяет два набора ошибок.
    pub fn extend(&mut self, other: FormErrors) {
        for (field, message) in other.errors {
            self.errors.entry(field).or_insert(message);
        }
    }

    /// `true`, если ошибок нет.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Количество полей с ошибками.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Сообщение для конкретного поля.
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.errors.get(field).copied()
    }

    /// Итератор по парам `(поле, сообщение)`.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.errors.iter().map(|(field, message)| (*field, *message))
    }

    /// Превращает набор в `Result`: `Ok(())`, если ошибок нет.
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl core::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_first_message_per_field() {
        let mut errors = FormErrors::new();
        errors.push(ValidationError::new("email", "first"));
        errors.push(ValidationError::new("email", "second"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some("first"));
    }

    #[test]
    fn display_lists_fields_in_stable_order() {
        let mut errors = FormErrors::new();
        errors.push(ValidationError::new("phone", "bad phone"));
        errors.push(ValidationError::new("email", "bad email"));

        assert_eq!(errors.to_string(), "email: bad email; phone: bad phone");
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(FormErrors::new().into_result().is_ok());
    }
}
