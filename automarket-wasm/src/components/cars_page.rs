use automarket_core::storage::{FILTERS_KEY, clear_filters, load_filters, save_filters};
use automarket_core::{
    AdvancedFiltersModal, Car, CarFilters, FilterSession, ListQuery, Page, SortBy, SortOrder,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::components::advanced_filters::AdvancedFilters;
use crate::components::filters_bar::FiltersBar;
use crate::state::AppState;
use crate::storage::{read_store, with_store};
use crate::url;

/// Стартовые фильтры: адресная строка важнее сохранённого снимка.
fn initial_filters() -> CarFilters {
    url::filters_from_location()
        .or_else(|| read_store(|store| load_filters(store, FILTERS_KEY)))
        .unwrap_or_default()
}

fn load_cars(
    state: AppState,
    query: ListQuery,
    filters: CarFilters,
    cars: RwSignal<Option<Page<Car>>>,
) {
    let request = state.next_request();
    state.loading.set(true);

    spawn_local(async move {
        let result = api::list_cars(&query, &filters).await;
        if !state.is_current(request) {
            return;
        }
        match result {
            Ok(page) => cars.set(Some(page)),
            Err(err) => state.set_error(err.to_string()),
        }
        state.loading.set(false);
    });
}

fn sort_value(sort: (SortBy, SortOrder)) -> String {
    format!("{}:{}", sort.0.as_str(), sort.1.as_str())
}

fn parse_sort_value(raw: &str) -> Option<(SortBy, SortOrder)> {
    let (by, order) = raw.split_once(':')?;
    Some((SortBy::parse(by)?, SortOrder::parse(order)?))
}

const SORT_OPTIONS: [((SortBy, SortOrder), &str); 6] = [
    ((SortBy::CreatedAt, SortOrder::Desc), "Сначала новые"),
    ((SortBy::Price, SortOrder::Asc), "Сначала дешёвые"),
    ((SortBy::Price, SortOrder::Desc), "Сначала дорогие"),
    ((SortBy::Year, SortOrder::Desc), "Год: новее"),
    ((SortBy::Mileage, SortOrder::Asc), "Пробег: меньше"),
    ((SortBy::Mileage, SortOrder::Desc), "Пробег: больше"),
];

#[component]
pub(crate) fn CarsPage(state: AppState, page_size: u32) -> impl IntoView {
    let session = RwSignal::new(FilterSession::new(initial_filters()));
    let query = RwSignal::new(ListQuery::new(page_size));
    let sort = RwSignal::new(SORT_OPTIONS[0].0);
    let cars = RwSignal::new(None::<Page<Car>>);
    let modal = RwSignal::new(AdvancedFiltersModal::new());

    let load = Callback::new({
        let state = state.clone();
        move |_: ()| {
            load_cars(
                state.clone(),
                query.get_untracked(),
                session.with_untracked(|s| s.applied().clone()),
                cars,
            )
        }
    });

    // Применённые фильтры: снимок в localStorage, адресная строка,
    // первая страница, перезагрузка и прокрутка вверх.
    let commit = Callback::new({
        let state = state.clone();
        move |applied: CarFilters| {
            if let Err(err) = with_store(|store| save_filters(store, FILTERS_KEY, &applied)) {
                state.set_error(err);
            }
            url::write_filters_to_location(&applied);
            query.update(|q| *q = q.clone().with_page(1));
            load.run(());
            url::scroll_to_top();
        }
    });

    let on_apply = Callback::new(move |_: ()| {
        if let Some(applied) = session.try_update(FilterSession::apply) {
            commit.run(applied);
        }
    });

    let on_reset = Callback::new({
        let state = state.clone();
        move |_: ()| {
            session.update(FilterSession::reset);
            if let Err(err) = with_store(|store| clear_filters(store)) {
                state.set_error(err);
            }
            url::write_filters_to_location(&CarFilters::default());
            query.update(|q| *q = q.clone().with_page(1));
            load.run(());
        }
    });

    let on_advanced = Callback::new(move |_: ()| {
        let current = session.with_untracked(|s| s.temp().clone());
        modal.update(|m| m.open(&current));
    });

    let on_advanced_apply = Callback::new(move |pairs: Vec<(&'static str, String)>| {
        session.update(|s| s.sync_from_pairs(pairs));
        commit.run(session.with_untracked(|s| s.applied().clone()));
    });

    let on_sort = move |raw: String| {
        if let Some(value) = parse_sort_value(&raw) {
            sort.set(value);
            query.update(|q| *q = q.clone().with_car_sort(value.0, value.1).with_page(1));
            load.run(());
        }
    };

    let go_to = move |page: u32| {
        query.update(|q| *q = q.clone().with_page(page));
        load.run(());
        url::scroll_to_top();
    };

    load.run(());

    let summary = move || {
        cars.with(|page| match page {
            Some(page) => format!("Найдено: {}", page.total),
            None => String::new(),
        })
    };
    let has_prev = move || cars.with(|page| page.as_ref().is_some_and(Page::has_prev));
    let has_next = move || cars.with(|page| page.as_ref().is_some_and(Page::has_next));
    let current_page = move || cars.with(|page| page.as_ref().map_or(1, |p| p.page));
    let total_pages =
        move || cars.with(|page| page.as_ref().map_or(1, |p| p.total_pages.max(1)));
    let loading = state.loading;

    view! {
        <section class="cars-page">
            <FiltersBar
                session=session
                on_apply=on_apply
                on_reset=on_reset
                on_advanced=on_advanced
            />
            <AdvancedFilters modal=modal on_apply=on_advanced_apply />

            <div class="toolbar">
                <span>{summary}</span>
                <select
                    prop:value=move || sort_value(sort.get())
                    on:change=move |ev| on_sort(event_target_value(&ev))
                >
                    {SORT_OPTIONS
                        .into_iter()
                        .map(|(value, label)| {
                            view! { <option value=sort_value(value)>{label}</option> }
                        })
                        .collect_view()}
                </select>
            </div>

            <Show when=move || loading.get()>
                <p class="loading">"Загрузка..."</p>
            </Show>

            <ul class="car-grid">
                <For
                    each=move || {
                        cars.with(|page| page.as_ref().map(|p| p.items.clone()).unwrap_or_default())
                    }
                    key=|car| car.id
                    children=move |car| {
                        let title = car.title();
                        let cover = car.cover_image().map(|src| {
                            let alt = title.clone();
                            view! { <img src=src.to_string() alt=alt /> }
                        });
                        let mileage = car
                            .mileage
                            .map(|km| format!("{km} км"))
                            .unwrap_or_default();
                        view! {
                            <li class="car-card" class:vip=car.is_vip>
                                {cover}
                                <h3>{title}</h3>
                                <strong>{format!("${:.0}", car.price)}</strong>
                                <div>{mileage}</div>
                                <small>{car.location.clone().unwrap_or_default()}</small>
                            </li>
                        }
                    }
                />
            </ul>

            <nav class="pagination">
                <button
                    disabled=move || !has_prev()
                    on:click=move |_| go_to(current_page().saturating_sub(1))
                >
                    "Назад"
                </button>
                <span>{move || format!("{} / {}", current_page(), total_pages())}</span>
                <button
                    disabled=move || !has_next()
                    on:click=move |_| go_to(current_page() + 1)
                >
                    "Вперёд"
                </button>
            </nav>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_value_round_trips_through_select() {
        for (value, _) in SORT_OPTIONS {
            assert_eq!(parse_sort_value(&sort_value(value)), Some(value));
        }
        assert!(parse_sort_value("price").is_none());
    }
}
