use automarket_core::forms::CompanyKind;
use automarket_core::query::DEFAULT_PAGE_SIZE;
use automarket_core::storage::{clear_token, load_token, save_token};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::components::cars_page::CarsPage;
use crate::components::company_admin::CompanyAdmin;
use crate::components::image_upload::ImageUpload;
use crate::state::{AppState, NoticeKind};
use crate::storage::{read_store, with_store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Cars,
    Dealers,
    Autosalons,
    Upload,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Cars, Tab::Dealers, Tab::Autosalons, Tab::Upload];

    fn title(self) -> &'static str {
        match self {
            Self::Cars => "Каталог",
            Self::Dealers => "Дилеры",
            Self::Autosalons => "Автосалоны",
            Self::Upload => "Фотографии",
        }
    }
}

#[component]
fn TokenBar(state: AppState) -> impl IntoView {
    let draft = RwSignal::new(String::new());

    let on_save = {
        let state = state.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            let token = draft.get_untracked().trim().to_string();
            if token.is_empty() {
                state.set_error("Вставьте токен администратора");
                return;
            }
            match with_store(|store| save_token(store, &token)) {
                Ok(()) => {
                    state.token.set(Some(token));
                    draft.set(String::new());
                    state.notify("Токен сохранён");
                }
                Err(err) => state.set_error(err),
            }
        }
    };

    let on_logout = {
        let state = state.clone();
        move |_| match with_store(|store| clear_token(store)) {
            Ok(()) => {
                state.token.set(None);
                state.clear_error();
            }
            Err(err) => state.set_error(err),
        }
    };

    let token = state.token;
    let status = move || {
        if token.with(Option::is_some) {
            "Авторизован"
        } else {
            "Гость"
        }
    };

    view! {
        <form class="token-bar" on:submit=on_save>
            <span>{status}</span>
            <input
                type="password"
                placeholder="JWT-токен"
                prop:value=move || draft.get()
                on:input=move |ev| draft.set(event_target_value(&ev))
            />
            <button type="submit">"Сохранить"</button>
            <button type="button" disabled=move || token.with(Option::is_none) on:click=on_logout>
                "Выйти"
            </button>
        </form>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    state.token.set(read_store(|store| load_token(store)));

    let tab = RwSignal::new(Tab::Cars);
    let notice = state.notice;

    let banner = {
        let state = state.clone();
        move || {
            notice.get().map(|notice| {
                let class = match notice.kind {
                    NoticeKind::Success => "notice success",
                    NoticeKind::Error => "notice error",
                };
                let state = state.clone();
                view! {
                    <div class=class>
                        <span>{notice.text}</span>
                        <button type="button" on:click=move |_| state.clear_error()>"×"</button>
                    </div>
                }
            })
        }
    };

    let content = {
        let state = state.clone();
        move || match tab.get() {
            Tab::Cars => view! { <CarsPage state=state.clone() page_size=DEFAULT_PAGE_SIZE /> }.into_any(),
            Tab::Dealers => view! {
                <CompanyAdmin state=state.clone() kind=CompanyKind::Dealer page_size=DEFAULT_PAGE_SIZE />
            }
            .into_any(),
            Tab::Autosalons => view! {
                <CompanyAdmin state=state.clone() kind=CompanyKind::Autosalon page_size=DEFAULT_PAGE_SIZE />
            }
            .into_any(),
            Tab::Upload => view! { <ImageUpload state=state.clone() /> }.into_any(),
        }
    };

    let loading = state.loading;

    view! {
        <main class="page">
            <header class="container">
                <h1>"AutoMarket"</h1>
                <TokenBar state=state.clone() />
                <nav class="tabs">
                    {Tab::ALL
                        .into_iter()
                        .map(|item| {
                            view! {
                                <button
                                    type="button"
                                    class:active=move || tab.get() == item
                                    on:click=move |_| tab.set(item)
                                >
                                    {item.title()}
                                </button>
                            }
                        })
                        .collect_view()}
                </nav>
            </header>

            {banner}
            <Show when=move || loading.get()>
                <div class="spinner">"Загрузка…"</div>
            </Show>

            <section class="container">{content}</section>
        </main>
    }
}
