use automarket_core::{AdvancedFiltersModal, FilterField};
use leptos::prelude::*;

use crate::components::field_control::FieldControl;

/// Группы полей внутри окна.
const SECTIONS: [(&str, &[FilterField]); 4] = [
    (
        "Автомобиль",
        &[FilterField::Make, FilterField::Model, FilterField::BodyType, FilterField::Color],
    ),
    (
        "Цена и год",
        &[
            FilterField::PriceFrom,
            FilterField::PriceTo,
            FilterField::YearFrom,
            FilterField::YearTo,
        ],
    ),
    (
        "Техника",
        &[
            FilterField::FuelType,
            FilterField::Transmission,
            FilterField::DriveType,
            FilterField::MileageFrom,
            FilterField::MileageTo,
        ],
    ),
    ("Расположение", &[FilterField::Location]),
];

#[component]
pub(crate) fn AdvancedFilters(
    modal: RwSignal<AdvancedFiltersModal>,
    on_apply: Callback<Vec<(&'static str, String)>>,
) -> impl IntoView {
    let count = move || modal.with(AdvancedFiltersModal::active_filters_count);

    let apply = move |_| {
        if let Some(pairs) = modal.try_update(AdvancedFiltersModal::handle_apply) {
            on_apply.run(pairs);
        }
    };

    view! {
        <Show when=move || modal.with(AdvancedFiltersModal::is_open)>
            <div class="modal-backdrop" on:click=move |_| modal.update(AdvancedFiltersModal::close)>
                <div class="modal" on:click=|ev| ev.stop_propagation()>
                    <header>
                        <h2>"Все фильтры"</h2>
                        <span class="badge">{count}</span>
                    </header>

                    {SECTIONS
                        .into_iter()
                        .map(|(title, fields)| {
                            view! {
                                <fieldset>
                                    <legend>{title}</legend>
                                    {fields
                                        .iter()
                                        .copied()
                                        .map(|field| {
                                            view! {
                                                <FieldControl
                                                    field=field
                                                    value=Signal::derive(move || {
                                                        modal.with(|m| m.filters().get(field).to_string())
                                                    })
                                                    on_change=Callback::new(move |value: String| {
                                                        modal.update(|m| m.set(field, value))
                                                    })
                                                />
                                            }
                                        })
                                        .collect_view()}
                                </fieldset>
                            }
                        })
                        .collect_view()}

                    <footer>
                        <button
                            type="button"
                            on:click=move |_| modal.update(AdvancedFiltersModal::handle_clear_all)
                        >
                            "Очистить всё"
                        </button>
                        <button type="button" on:click=move |_| modal.update(AdvancedFiltersModal::close)>
                            "Отмена"
                        </button>
                        <button type="button" class="primary" on:click=apply>
                            {move || format!("Показать ({})", count())}
                        </button>
                    </footer>
                </div>
            </div>
        </Show>
    }
}
