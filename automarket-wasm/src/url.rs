//! Зеркалирование фильтров в query string адресной строки.

use automarket_core::CarFilters;
use web_sys::UrlSearchParams;

/// Фильтры из `location.search`. Ключи принимаются в обеих нотациях.
pub(crate) fn filters_from_location() -> Option<CarFilters> {
    let search = web_sys::window()?.location().search().ok()?;
    if search.trim_start_matches('?').is_empty() {
        return None;
    }
    let params = UrlSearchParams::new_with_str(&search).ok()?;
    let pairs = automarket_core::FilterField::ALL
        .into_iter()
        .flat_map(|field| {
            [field.key(), field.server_key()]
                .into_iter()
                .filter_map(|key| params.get(key).map(|value| (key, value)))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    Some(CarFilters::from_pairs(pairs))
}

/// Заменяет query string текущей записи истории, без перезагрузки.
pub(crate) fn write_filters_to_location(filters: &CarFilters) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(params) = UrlSearchParams::new() else {
        return;
    };
    for (key, value) in filters.to_url_pairs() {
        params.append(key, &value);
    }

    let query = params.to_string().as_string().unwrap_or_default();
    let path = window.location().pathname().unwrap_or_default();
    let url = if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    };

    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&url));
    }
}

/// Прокрутка к началу выдачи после применения фильтров.
pub(crate) fn scroll_to_top() {
    if let Some(window) = web_sys::window() {
        let options = web_sys::ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(web_sys::ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
    }
}
