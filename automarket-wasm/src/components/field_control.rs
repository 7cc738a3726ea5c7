use automarket_core::FilterField;
use leptos::prelude::*;

const FUEL_TYPES: &[(&str, &str)] = &[
    ("petrol", "Бензин"),
    ("diesel", "Дизель"),
    ("gas", "Газ"),
    ("hybrid", "Гибрид"),
    ("electric", "Электро"),
];

const TRANSMISSIONS: &[(&str, &str)] = &[
    ("manual", "Механика"),
    ("automatic", "Автомат"),
    ("robot", "Робот"),
    ("cvt", "Вариатор"),
];

const DRIVE_TYPES: &[(&str, &str)] = &[
    ("fwd", "Передний"),
    ("rwd", "Задний"),
    ("awd", "Полный"),
];

const BODY_TYPES: &[(&str, &str)] = &[
    ("sedan", "Седан"),
    ("hatchback", "Хэтчбек"),
    ("suv", "Внедорожник"),
    ("wagon", "Универсал"),
    ("coupe", "Купе"),
    ("minivan", "Минивэн"),
    ("pickup", "Пикап"),
];

/// Варианты выбора для полей-списков; `None` означает текстовое поле.
pub(crate) fn field_options(field: FilterField) -> Option<&'static [(&'static str, &'static str)]> {
    match field {
        FilterField::FuelType => Some(FUEL_TYPES),
        FilterField::Transmission => Some(TRANSMISSIONS),
        FilterField::DriveType => Some(DRIVE_TYPES),
        FilterField::BodyType => Some(BODY_TYPES),
        _ => None,
    }
}

fn input_type(field: FilterField) -> &'static str {
    match field {
        FilterField::YearFrom
        | FilterField::YearTo
        | FilterField::PriceFrom
        | FilterField::PriceTo
        | FilterField::MileageFrom
        | FilterField::MileageTo => "number",
        _ => "text",
    }
}

/// Поле фильтра: список или текстовый ввод. Значение уходит наверх
/// по `change`, а не на каждый символ.
#[component]
pub(crate) fn FieldControl(
    field: FilterField,
    value: Signal<String>,
    on_change: Callback<String>,
) -> impl IntoView {
    match field_options(field) {
        Some(options) => view! {
            <label class="filter-field">
                <span>{field.label()}</span>
                <select
                    prop:value=move || value.get()
                    on:change=move |ev| on_change.run(event_target_value(&ev))
                >
                    <option value="">"Любой"</option>
                    {options
                        .iter()
                        .map(|(option, label)| view! { <option value=*option>{*label}</option> })
                        .collect_view()}
                </select>
            </label>
        }
        .into_any(),
        None => view! {
            <label class="filter-field">
                <span>{field.label()}</span>
                <input
                    type=input_type(field)
                    placeholder=field.label()
                    prop:value=move || value.get()
                    on:change=move |ev| on_change.run(event_target_value(&ev))
                />
            </label>
        }
        .into_any(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_fields_have_options() {
        for field in [
            FilterField::FuelType,
            FilterField::Transmission,
            FilterField::DriveType,
            FilterField::BodyType,
        ] {
            assert!(field_options(field).is_some_and(|options| !options.is_empty()));
        }
        assert!(field_options(FilterField::Make).is_none());
    }

    #[test]
    fn range_fields_are_numeric() {
        assert_eq!(input_type(FilterField::PriceFrom), "number");
        assert_eq!(input_type(FilterField::Color), "text");
    }
}
