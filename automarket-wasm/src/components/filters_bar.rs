use automarket_core::{FilterField, FilterSession};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::components::field_control::FieldControl;

/// Поля, которые всегда видны над выдачей.
const BAR_FIELDS: [FilterField; 8] = [
    FilterField::Make,
    FilterField::Model,
    FilterField::YearFrom,
    FilterField::YearTo,
    FilterField::PriceFrom,
    FilterField::PriceTo,
    FilterField::FuelType,
    FilterField::Transmission,
];

/// Подпись о неприменённых правках, если они есть.
fn pending_label(session: &FilterSession) -> Option<String> {
    let pending = session.pending_fields();
    if pending.is_empty() {
        return None;
    }
    let labels: Vec<&str> = pending.into_iter().map(FilterField::label).collect();
    Some(format!("Не применено: {}", labels.join(", ")))
}

#[component]
pub(crate) fn FiltersBar(
    session: RwSignal<FilterSession>,
    on_apply: Callback<()>,
    on_reset: Callback<()>,
    on_advanced: Callback<()>,
) -> impl IntoView {
    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        on_apply.run(());
    };

    let advanced_count = move || {
        session.with(|s| {
            s.temp()
                .active()
                .filter(|(field, _)| field.is_advanced())
                .count()
        })
    };

    view! {
        <form class="filters-bar" on:submit=on_submit>
            {BAR_FIELDS
                .into_iter()
                .map(|field| {
                    view! {
                        <FieldControl
                            field=field
                            value=Signal::derive(move || {
                                session.with(|s| s.temp().get(field).to_string())
                            })
                            on_change=Callback::new(move |value: String| {
                                session.update(|s| s.set(field, value))
                            })
                        />
                    }
                })
                .collect_view()}

            <button type="button" on:click=move |_| on_advanced.run(())>
                "Ещё фильтры"
                <Show when=move || { advanced_count() > 0 }>
                    <span class="badge">{advanced_count}</span>
                </Show>
            </button>
            <button type="submit">"Применить"</button>
            <button type="button" on:click=move |_| on_reset.run(())>
                "Сбросить"
            </button>

            <small class="pending">
                {move || session.with(pending_label).unwrap_or_default()}
            </small>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_label_lists_changed_fields() {
        let mut session = FilterSession::default();
        assert!(pending_label(&session).is_none());

        session.set(FilterField::Make, "BYD");
        session.set(FilterField::Color, "white");
        assert_eq!(
            pending_label(&session).as_deref(),
            Some("Не применено: Марка, Цвет")
        );

        session.apply();
        assert!(pending_label(&session).is_none());
    }
}
