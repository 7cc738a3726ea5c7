use automarket_core::RequestGeneration;
use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NoticeKind {
    Success,
    Error,
}

/// Уведомление (toast) над страницей.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notice {
    pub(crate) kind: NoticeKind,
    pub(crate) text: String,
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) token: RwSignal<Option<String>>,
    pub(crate) notice: RwSignal<Option<Notice>>,
    pub(crate) loading: RwSignal<bool>,
    /// Номер последнего запроса списка; ответы на более старые
    /// запросы отбрасываются.
    generation: RwSignal<RequestGeneration>,
}

impl AppState {
    pub(crate) fn new() -> Self {
        Self {
            token: RwSignal::new(None),
            notice: RwSignal::new(None),
            loading: RwSignal::new(false),
            generation: RwSignal::new(RequestGeneration::default()),
        }
    }

    pub(crate) fn set_error(&self, message: impl Into<String>) {
        self.notice.set(Some(Notice {
            kind: NoticeKind::Error,
            text: message.into(),
        }));
    }

    pub(crate) fn notify(&self, message: impl Into<String>) {
        self.notice.set(Some(Notice {
            kind: NoticeKind::Success,
            text: message.into(),
        }));
    }

    pub(crate) fn clear_error(&self) {
        self.notice.set(None);
    }

    pub(crate) fn token_value(&self) -> Option<String> {
        self.token.get_untracked()
    }

    /// Начинает новый запрос и возвращает его номер.
    pub(crate) fn next_request(&self) -> u64 {
        let mut generation = self.generation.get_untracked();
        let request = generation.next();
        self.generation.set(generation);
        request
    }

    /// Актуален ли ещё ответ на запрос с номером `request`.
    pub(crate) fn is_current(&self, request: u64) -> bool {
        self.generation.get_untracked().is_current(request)
    }
}
