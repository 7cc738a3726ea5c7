use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `automarket-client`.
///
/// Для ответов бэкенда `Display` совпадает с текстом ошибки: либо
/// `message` из тела ответа, либо локализованный текст по умолчанию
/// для конкретной операции. Этот текст показывается пользователю как есть.
pub enum ClientError {
    /// Ошибка HTTP-транспорта (`reqwest`): нет сети, таймаут, TLS.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401/403: нет токена или он недействителен.
    #[error("{0}")]
    Unauthorized(String),

    /// 404: ресурс не найден.
    #[error("{0}")]
    NotFound(String),

    /// Прочие ошибки бэкенда, включая `{success: false}` при статусе 2xx.
    #[error("{message}")]
    Rejected {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение бэкенда или текст по умолчанию.
        message: String,
    },

    /// Тело ответа не соответствует ожидаемой схеме.
    #[error("decode error: {0}")]
    Decode(String),

    /// Не удалось прочитать локальный файл для загрузки.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Локальный файл больше допустимого размера; он не читался.
    #[error("{name}: файл слишком большой ({size} байт, лимит {limit})")]
    FileTooLarge {
        name: String,
        size: u64,
        limit: u64,
    },

    /// Запрос не может быть отправлен (некорректный URL, пустой токен, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Результат операций `automarket-client`.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub(crate) fn from_http_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, format!("http status {status}"));
        }
        Self::Http(err)
    }

    /// HTTP-статус, если ошибка пришла от бэкенда.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::Rejected { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// `true` для ошибок, которые пользователь исправит повторным входом.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping_keeps_backend_message() {
        let unauth = ClientError::from_http_status(StatusCode::FORBIDDEN, "нет доступа".into());
        assert!(unauth.is_unauthorized());
        assert_eq!(unauth.to_string(), "нет доступа");

        let missing = ClientError::from_http_status(StatusCode::NOT_FOUND, "нет такой".into());
        assert!(matches!(missing, ClientError::NotFound(_)));
        assert_eq!(missing.status(), Some(404));

        let conflict = ClientError::from_http_status(StatusCode::CONFLICT, "дубликат".into());
        match conflict {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "дубликат");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
