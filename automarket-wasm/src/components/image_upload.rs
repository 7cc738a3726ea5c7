use std::time::Duration;

use automarket_core::upload::{
    CaptureSource, DropOutcome, ImageCandidate, UploadProgress, UploadSelection,
};
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::{File, HtmlInputElement};

use crate::api;
use crate::state::AppState;

const PROGRESS_TICK: Duration = Duration::from_millis(200);

fn candidate(file: &File) -> ImageCandidate {
    ImageCandidate::new(file.name(), file.size() as u64).with_mime(file.type_())
}

/// Текст уведомления об отклонённых файлах.
fn rejection_message(outcome: &DropOutcome) -> Option<String> {
    if !outcome.has_rejections() {
        return None;
    }
    let lines: Vec<String> = outcome
        .rejected
        .iter()
        .map(|(name, reason)| format!("{name}: {}", reason.message()))
        .collect();
    Some(lines.join("; "))
}

fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{:.1} МБ", bytes as f64 / MIB as f64)
    } else {
        format!("{} КБ", bytes.div_ceil(1024))
    }
}

fn capture_label(source: CaptureSource) -> &'static str {
    match source {
        CaptureSource::Camera => "Камера",
        CaptureSource::Gallery => "Галерея",
        CaptureSource::Files => "Файлы",
    }
}

/// Загрузка фотографий объявления: выбор, обложка, имитация прогресса.
#[component]
pub(crate) fn ImageUpload(state: AppState) -> impl IntoView {
    let car_id = RwSignal::new(String::new());
    let source = RwSignal::new(CaptureSource::Gallery);
    let selection = RwSignal::new(UploadSelection::default());
    // Сами `File` не `Send`, поэтому живут отдельно от `selection`,
    // в том же порядке.
    let files = StoredValue::new_local(Vec::<File>::new());
    let progress = RwSignal::new(None::<UploadProgress>);

    let on_files = {
        let state = state.clone();
        move |ev: leptos::ev::Event| {
            let input: HtmlInputElement = event_target(&ev);
            let Some(list) = input.files() else {
                return;
            };
            let picked: Vec<File> = (0..list.length()).filter_map(|i| list.get(i)).collect();

            let outcome = selection
                .try_update(|sel| sel.on_drop(picked.iter().map(candidate)))
                .unwrap_or_default();
            if let Some(message) = rejection_message(&outcome) {
                state.set_error(message);
            }

            files.update_value(|kept| {
                let mut pool = std::mem::take(kept);
                pool.extend(picked);
                *kept = selection.with_untracked(|sel| {
                    sel.files()
                        .iter()
                        .filter_map(|c| pool.iter().find(|f| candidate(f).same_file(c)).cloned())
                        .collect()
                });
            });
            input.set_value("");
        }
    };

    let remove = move |index: usize| {
        selection.update(|sel| {
            sel.remove(index);
        });
        files.update_value(|kept| {
            if index < kept.len() {
                kept.remove(index);
            }
        });
    };

    let on_upload = {
        let state = state.clone();
        move |_| {
            state.clear_error();
            let Ok(id) = car_id.get_untracked().trim().parse::<i64>() else {
                state.set_error("Укажите id объявления");
                return;
            };
            if selection.with_untracked(UploadSelection::is_empty) {
                state.set_error("Добавьте хотя бы одну фотографию");
                return;
            }

            let featured = selection.with_untracked(UploadSelection::featured_index);
            let to_send = files.get_value();
            let token = state.token_value();

            progress.set(Some(UploadProgress::new()));
            let ticker = set_interval_with_handle(
                move || {
                    progress.update(|p| {
                        if let Some(p) = p {
                            p.tick();
                        }
                    })
                },
                PROGRESS_TICK,
            )
            .ok();

            state.loading.set(true);
            let state2 = state.clone();
            spawn_local(async move {
                let result =
                    api::upload_car_images(token.as_deref(), id, &to_send, featured).await;
                if let Some(ticker) = ticker {
                    ticker.clear();
                }
                match result {
                    Ok(car) => {
                        progress.update(|p| {
                            if let Some(p) = p {
                                p.finish();
                            }
                        });
                        selection.update(UploadSelection::clear);
                        files.set_value(Vec::new());
                        state2.notify(format!("Фотографии загружены: {}", car.images.len()));
                    }
                    Err(err) => {
                        progress.set(None);
                        state2.set_error(err.to_string());
                    }
                }
                state2.loading.set(false);
            });
        }
    };

    let capture = move || source.get().capture_attr();
    let multiple = move || source.get() != CaptureSource::Camera;
    let counter = move || {
        selection.with(|sel| format!("{} из {}", sel.len(), sel.max_files()))
    };
    let loading = state.loading;

    view! {
        <section class="image-upload">
            <h2>"Фотографии объявления"</h2>
            <label>
                "ID объявления"
                <input
                    type="number"
                    prop:value=move || car_id.get()
                    on:input=move |ev| car_id.set(event_target_value(&ev))
                />
            </label>

            <div class="sources">
                {[CaptureSource::Camera, CaptureSource::Gallery, CaptureSource::Files]
                    .into_iter()
                    .map(|option| {
                        view! {
                            <button
                                type="button"
                                class:active=move || source.get() == option
                                on:click=move |_| source.set(option)
                            >
                                {capture_label(option)}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>

            <input
                type="file"
                accept="image/*"
                multiple=multiple
                capture=capture
                disabled=move || selection.with(|sel| sel.remaining() == 0)
                on:change=on_files
            />
            <small>{counter}</small>

            <ul class="upload-list">
                <For
                    each=move || {
                        selection.with(|sel| {
                            sel.files().iter().cloned().enumerate().collect::<Vec<_>>()
                        })
                    }
                    key=|(index, file)| (*index, file.name.clone(), file.size)
                    children=move |(index, file)| {
                        let is_featured = move || {
                            selection.with(|sel| sel.featured_index() == index)
                        };
                        view! {
                            <li class:featured=is_featured>
                                <span>{file.name.clone()}</span>
                                <small>{format_size(file.size)}</small>
                                <button
                                    type="button"
                                    disabled=is_featured
                                    on:click=move |_| {
                                        selection.update(|sel| {
                                            sel.set_featured(index);
                                        })
                                    }
                                >
                                    {move || if is_featured() { "Обложка" } else { "Сделать обложкой" }}
                                </button>
                                <button type="button" on:click=move |_| remove(index)>
                                    "Удалить"
                                </button>
                            </li>
                        }
                    }
                />
            </ul>

            {move || {
                progress
                    .get()
                    .map(|p| {
                        view! {
                            <div class="progress">
                                <progress max="100" value=p.percent()></progress>
                                <span>{format!("{}%", p.percent())}</span>
                            </div>
                        }
                    })
            }}

            <button type="button" disabled=move || loading.get() on:click=on_upload>
                "Загрузить"
            </button>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use automarket_core::upload::RejectReason;

    use super::*;

    #[test]
    fn rejection_message_lists_each_file() {
        let outcome = DropOutcome {
            accepted: 1,
            rejected: vec![
                ("a.jpg".to_string(), RejectReason::Duplicate),
                ("notes.txt".to_string(), RejectReason::UnsupportedType),
            ],
        };
        let message = rejection_message(&outcome).expect("must describe rejections");
        assert!(message.starts_with("a.jpg: Этот файл уже добавлен"));
        assert!(message.contains("notes.txt"));

        assert!(rejection_message(&DropOutcome::default()).is_none());
    }

    #[test]
    fn format_size_switches_units() {
        assert_eq!(format_size(1500), "2 КБ");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 МБ");
    }
}
