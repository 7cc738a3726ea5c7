use std::future::Future;
use std::time::Duration;

use automarket_core::upload::UploadProgress;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Период тика имитации прогресса.
pub const TICK: Duration = Duration::from_millis(200);

const BAR_TEMPLATE: &str = "{msg} [{bar:30.cyan/blue}] {pos:>3}%";

/// Полоса загрузки в терминале поверх `UploadProgress`.
pub struct UploadBar {
    bar: ProgressBar,
}

impl UploadBar {
    /// Полоса в stderr с подписью `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_bar(ProgressBar::new(100), message)
    }

    fn with_bar(bar: ProgressBar, message: impl Into<String>) -> Self {
        match ProgressStyle::with_template(BAR_TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(err) => debug!(error = %err, "progress template rejected, using default style"),
        }
        bar.set_message(message.into());
        Self { bar }
    }

    /// Переносит состояние имитации на полосу.
    pub fn draw(&self, progress: &UploadProgress) {
        if progress.is_done() {
            self.bar.set_position(u64::from(progress.percent()));
            self.bar.finish_with_message("фотографии загружены");
        } else if progress.is_failed() {
            self.bar.set_position(0);
            self.bar.abandon_with_message("загрузка не удалась");
        } else {
            self.bar.set_position(u64::from(progress.percent()));
        }
    }
}

/// Выполняет загрузку, параллельно двигая полосу прогресса.
///
/// Бэкенд не сообщает реальный прогресс, поэтому полоса растёт по таймеру
/// до 90% и доходит до 100% только после ответа сервера. При ошибке
/// прогресс сбрасывается.
pub async fn with_progress<F, T, E>(
    upload: F,
    tick: Duration,
    mut render: impl FnMut(&UploadProgress),
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let mut progress = UploadProgress::new();
    let mut interval = tokio::time::interval(tick);
    tokio::pin!(upload);

    loop {
        tokio::select! {
            result = &mut upload => {
                match &result {
                    Ok(_) => progress.finish(),
                    Err(_) => progress.fail(),
                }
                render(&progress);
                return result;
            }
            _ = interval.tick() => {
                progress.tick();
                render(&progress);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn progress_climbs_then_completes() {
        let mut seen = Vec::new();
        let result: Result<u8, ()> = with_progress(
            async {
                tokio::time::sleep(Duration::from_millis(60)).await;
                Ok(7)
            },
            Duration::from_millis(5),
            |progress| seen.push(progress.percent()),
        )
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.iter().any(|percent| (1..=UploadProgress::CEILING).contains(percent)));
        assert!(
            seen[..seen.len() - 1]
                .iter()
                .all(|percent| *percent <= UploadProgress::CEILING)
        );
    }

    #[tokio::test]
    async fn failure_resets_progress() {
        let mut last = None;
        let result: Result<(), &str> = with_progress(
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err("boom")
            },
            Duration::from_millis(5),
            |progress| last = Some(*progress),
        )
        .await;

        assert_eq!(result, Err("boom"));
        let last = last.expect("progress must be rendered");
        assert_eq!(last.percent(), 0);
        assert!(!last.is_done());
        assert!(last.is_failed());
    }

    #[test]
    fn upload_bar_follows_progress_and_finishes() {
        let bar = UploadBar::with_bar(ProgressBar::hidden(), "фото");
        let mut progress = UploadProgress::new();
        progress.tick();
        progress.tick();
        bar.draw(&progress);
        assert_eq!(bar.bar.position(), 20);
        assert!(!bar.bar.is_finished());

        progress.finish();
        bar.draw(&progress);
        assert_eq!(bar.bar.position(), 100);
        assert!(bar.bar.is_finished());
        assert_eq!(bar.bar.message(), "фотографии загружены");
    }

    #[test]
    fn upload_bar_is_abandoned_on_failure() {
        let bar = UploadBar::with_bar(ProgressBar::hidden(), "фото");
        let mut progress = UploadProgress::new();
        progress.tick();
        bar.draw(&progress);

        progress.fail();
        bar.draw(&progress);
        assert_eq!(bar.bar.position(), 0);
        assert!(bar.bar.is_finished());
        assert_eq!(bar.bar.message(), "загрузка не удалась");
    }
}
