use automarket_core::forms::{CompanyForm, CompanyKind, FormStep, StrengthLevel};
use automarket_core::{FormErrors, ListQuery, Page};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{self, CompanyRow};
use crate::state::AppState;

/// Поле формы компании.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Email,
    Password,
    ConfirmPassword,
    CompanyName,
    EstablishedYear,
    Website,
    Description,
    Phone,
    ContactEmail,
    Address,
}

impl Field {
    /// Ключ ошибки в `FormErrors`.
    fn key(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::CompanyName => "companyName",
            Self::EstablishedYear => "establishedYear",
            Self::Website => "website",
            Self::Description => "description",
            Self::Phone => "phone",
            Self::ContactEmail => "contactEmail",
            Self::Address => "address",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Email => "Email для входа",
            Self::Password => "Пароль",
            Self::ConfirmPassword => "Повторите пароль",
            Self::CompanyName => "Название компании",
            Self::EstablishedYear => "Год основания",
            Self::Website => "Сайт",
            Self::Description => "Описание",
            Self::Phone => "Телефон",
            Self::ContactEmail => "Контактный email",
            Self::Address => "Адрес",
        }
    }

    fn input_type(self) -> &'static str {
        match self {
            Self::Email | Self::ContactEmail => "email",
            Self::Password | Self::ConfirmPassword => "password",
            Self::EstablishedYear => "number",
            Self::Phone => "tel",
            _ => "text",
        }
    }

    fn value(self, form: &CompanyForm) -> &str {
        match self {
            Self::Email => &form.email,
            Self::Password => &form.password,
            Self::ConfirmPassword => &form.confirm_password,
            Self::CompanyName => &form.company_name,
            Self::EstablishedYear => &form.established_year,
            Self::Website => &form.website,
            Self::Description => &form.description,
            Self::Phone => &form.phone,
            Self::ContactEmail => &form.contact_email,
            Self::Address => &form.address,
        }
    }

    fn slot(self, form: &mut CompanyForm) -> &mut String {
        match self {
            Self::Email => &mut form.email,
            Self::Password => &mut form.password,
            Self::ConfirmPassword => &mut form.confirm_password,
            Self::CompanyName => &mut form.company_name,
            Self::EstablishedYear => &mut form.established_year,
            Self::Website => &mut form.website,
            Self::Description => &mut form.description,
            Self::Phone => &mut form.phone,
            Self::ContactEmail => &mut form.contact_email,
            Self::Address => &mut form.address,
        }
    }
}

fn step_fields(step: FormStep) -> &'static [Field] {
    match step {
        FormStep::Account => &[Field::Email, Field::Password, Field::ConfirmPassword],
        FormStep::Company => &[
            Field::CompanyName,
            Field::EstablishedYear,
            Field::Website,
            Field::Description,
        ],
        FormStep::Contacts => &[Field::Phone, Field::ContactEmail, Field::Address],
    }
}

fn strength_class(level: StrengthLevel) -> &'static str {
    match level {
        StrengthLevel::Weak => "strength weak",
        StrengthLevel::Medium => "strength medium",
        StrengthLevel::Strong => "strength strong",
    }
}

fn parse_user_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok().filter(|id| *id > 0)
}

fn load_companies(
    state: AppState,
    kind: CompanyKind,
    query: ListQuery,
    rows: RwSignal<Option<Page<CompanyRow>>>,
) {
    let request = state.next_request();
    state.loading.set(true);
    spawn_local(async move {
        let result = api::list_companies(kind, &query).await;
        if !state.is_current(request) {
            return;
        }
        match result {
            Ok(page) => rows.set(Some(page)),
            Err(err) => state.set_error(err.to_string()),
        }
        state.loading.set(false);
    });
}

/// Админка дилеров или автосалонов: список, поиск, удаление и
/// многошаговая форма создания.
#[component]
pub(crate) fn CompanyAdmin(state: AppState, kind: CompanyKind, page_size: u32) -> impl IntoView {
    let query = RwSignal::new(ListQuery::new(page_size));
    let rows = RwSignal::new(None::<Page<CompanyRow>>);
    let form = RwSignal::new(CompanyForm::new(kind));
    let errors = RwSignal::new(FormErrors::new());

    let reload = Callback::new({
        let state = state.clone();
        move |_: ()| load_companies(state.clone(), kind, query.get_untracked(), rows)
    });
    reload.run(());

    let on_search = move |ev: leptos::ev::Event| {
        let text = event_target_value(&ev);
        query.set(ListQuery::new(page_size).with_search(text));
        reload.run(());
    };

    let on_delete = {
        let state = state.clone();
        move |row: CompanyRow| {
            let question = format!("Удалить «{}»?", row.name);
            let confirmed = window().confirm_with_message(&question).unwrap_or(false);
            if !confirmed {
                return;
            }
            let token = state.token_value();
            let state2 = state.clone();
            spawn_local(async move {
                match api::delete_company(token.as_deref(), kind, row.id).await {
                    Ok(()) => {
                        state2.notify(format!("{} удалён", kind.label()));
                        reload.run(());
                    }
                    Err(err) => state2.set_error(err.to_string()),
                }
            });
        }
    };

    let on_next = move |_| match form.try_update(|f| f.next()) {
        Some(Err(step_errors)) => errors.set(step_errors),
        _ => errors.set(FormErrors::new()),
    };

    let on_back = move |_| {
        form.update(|f| {
            f.back();
        });
        errors.set(FormErrors::new());
    };

    let on_create = {
        let state = state.clone();
        move |_| {
            let payload = match form.get_untracked().into_payload() {
                Ok(payload) => payload,
                Err(all) => {
                    errors.set(all);
                    return;
                }
            };
            errors.set(FormErrors::new());
            state.loading.set(true);
            let token = state.token_value();
            let state2 = state.clone();
            spawn_local(async move {
                match api::create_company(token.as_deref(), kind, &payload).await {
                    Ok(row) => {
                        form.set(CompanyForm::new(kind));
                        state2.notify(format!("{} «{}» создан", kind.label(), row.name));
                        reload.run(());
                    }
                    Err(err) => state2.set_error(err.to_string()),
                }
                state2.loading.set(false);
            });
        }
    };

    let step = move || form.with(CompanyForm::step);
    let is_last = move || form.with(CompanyForm::is_last_step);
    let loading = state.loading;

    let fields = move || {
        step_fields(step())
            .iter()
            .copied()
            .map(|field| {
                view! {
                    <label>
                        {field.label()}
                        <input
                            type=field.input_type()
                            prop:value=move || form.with(|f| field.value(f).to_string())
                            on:input=move |ev| {
                                let value = event_target_value(&ev);
                                form.update(|f| *field.slot(f) = value);
                            }
                        />
                        {move || {
                            errors
                                .with(|e| e.get(field.key()))
                                .map(|message| view! { <small class="field-error">{message}</small> })
                        }}
                    </label>
                }
            })
            .collect_view()
    };

    let strength = move || {
        (step() == FormStep::Account).then(|| {
            let report = form.with(CompanyForm::password_strength);
            view! {
                <div class=strength_class(report.level)>
                    <meter min="0" max="5" value=report.score></meter>
                    <span>{report.level.label()}</span>
                    <ul>
                        {report.hints.into_iter().map(|hint| view! { <li>{hint}</li> }).collect_view()}
                    </ul>
                </div>
            }
        })
    };

    let user_id_input = move || {
        (kind == CompanyKind::Dealer && step() == FormStep::Account).then(|| {
            view! {
                <label>
                    "ID существующего пользователя (необязательно)"
                    <input
                        type="number"
                        on:input=move |ev| {
                            let user_id = parse_user_id(&event_target_value(&ev));
                            form.update(|f| f.user_id = user_id);
                        }
                    />
                </label>
            }
        })
    };

    view! {
        <section class="company-admin">
            <h2>{kind.label()}</h2>
            <input placeholder="Поиск по названию" on:change=on_search />

            <table>
                <thead>
                    <tr>
                        <th>"ID"</th>
                        <th>"Название"</th>
                        <th>"Телефон"</th>
                        <th>"Объявлений"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || rows.get().map(|page| page.items).unwrap_or_default()
                        key=|row| row.id
                        children=move |row| {
                            let on_delete = on_delete.clone();
                            let target = row.clone();
                            view! {
                                <tr>
                                    <td>{row.id}</td>
                                    <td>{row.name}</td>
                                    <td>{row.phone}</td>
                                    <td>{row.car_count}</td>
                                    <td>
                                        <button on:click=move |_| on_delete(target.clone())>
                                            "Удалить"
                                        </button>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>

            <h3>{move || format!("Новый: {}", step().title())}</h3>
            <ol class="steps">
                {form
                    .with_untracked(|f| f.steps())
                    .iter()
                    .map(|s| {
                        let s = *s;
                        view! { <li class:current=move || step() == s>{s.title()}</li> }
                    })
                    .collect_view()}
            </ol>

            {user_id_input}
            {fields}
            {strength}

            <div class="form-actions">
                <button type="button" disabled=move || form.with(|f| f.step_index() == 0) on:click=on_back>
                    "Назад"
                </button>
                <Show
                    when=is_last
                    fallback=move || view! { <button type="button" on:click=on_next>"Далее"</button> }
                >
                    <button type="button" disabled=move || loading.get() on:click=on_create.clone()>
                        "Создать"
                    </button>
                </Show>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_field_maps_back_to_the_form() {
        let mut form = CompanyForm::new(CompanyKind::Autosalon);
        for step in [FormStep::Account, FormStep::Company, FormStep::Contacts] {
            for field in step_fields(step) {
                *field.slot(&mut form) = field.key().to_string();
                assert_eq!(field.value(&form), field.key());
            }
        }
        assert_eq!(form.confirm_password, "confirmPassword");
    }

    #[test]
    fn parse_user_id_accepts_positive_numbers_only() {
        assert_eq!(parse_user_id(" 42 "), Some(42));
        assert_eq!(parse_user_id("0"), None);
        assert_eq!(parse_user_id("abc"), None);
        assert_eq!(parse_user_id(""), None);
    }
}
