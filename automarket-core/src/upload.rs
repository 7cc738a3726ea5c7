//! Выбор изображений для загрузки: дедупликация, лимиты, обложка и
//! имитация прогресса.

use serde::{Deserialize, Serialize};

/// Лимит фотографий объявления по умолчанию.
pub const DEFAULT_MAX_FILES: usize = 10;
/// Лимит размера одного файла по умолчанию (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "gif", "heic"];

/// Откуда пришёл файл. На логику отбора не влияет, но фронтенд
/// по-разному открывает диалог выбора.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    Camera,
    Gallery,
    #[default]
    Files,
}

impl CaptureSource {
    /// Значение атрибута `capture` у `<input type="file">`.
    pub fn capture_attr(self) -> Option<&'static str> {
        match self {
            Self::Camera => Some("environment"),
            Self::Gallery | Self::Files => None,
        }
    }
}

/// Кандидат на загрузку.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    pub name: String,
    pub size: u64,
    /// MIME-тип, если браузер/ОС его сообщили.
    #[serde(default)]
    pub mime: Option<String>,
}

impl ImageCandidate {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Тот же файл: совпадают имя и размер.
    pub fn same_file(&self, other: &ImageCandidate) -> bool {
        self.name == other.name && self.size == other.size
    }

    /// Изображение ли это: по MIME, а без него по расширению.
    ///
    /// Пустой MIME (так браузер отдаёт, например, HEIC) считается отсутствующим.
    pub fn is_image(&self) -> bool {
        if let Some(mime) = self.mime.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            return mime.starts_with("image/");
        }
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// Причина отказа в приёме файла.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Duplicate,
    LimitReached,
    TooLarge,
    UnsupportedType,
}

impl RejectReason {
    /// Текст уведомления.
    pub fn message(self) -> &'static str {
        match self {
            Self::Duplicate => "Этот файл уже добавлен",
            Self::LimitReached => "Достигнут лимит количества фотографий",
            Self::TooLarge => "Файл слишком большой",
            Self::UnsupportedType => "Поддерживаются только изображения",
        }
    }
}

/// Результат `UploadSelection::on_drop`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropOutcome {
    /// Сколько файлов принято.
    pub accepted: usize,
    /// Отклонённые файлы с причиной.
    pub rejected: Vec<(String, RejectReason)>,
}

impl DropOutcome {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Набор выбранных изображений.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSelection {
    max_files: usize,
    max_file_size: u64,
    files: Vec<ImageCandidate>,
    featured_index: usize,
}

impl Default for UploadSelection {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE)
    }
}

impl UploadSelection {
    pub fn new(max_files: usize, max_file_size: u64) -> Self {
        Self {
            max_files: max_files.max(1),
            max_file_size,
            files: Vec::new(),
            featured_index: 0,
        }
    }

    pub fn files(&self) -> &[ImageCandidate] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Сколько ещё файлов можно добавить.
    pub fn remaining(&self) -> usize {
        self.max_files.saturating_sub(self.files.len())
    }

    /// Индекс обложки.
    pub fn featured_index(&self) -> usize {
        self.featured_index
    }

    /// Принимает файлы по порядку.
    ///
    /// Дубликат (по имени и размеру) отклоняется, в том числе если он
    /// повторяется внутри одной пачки. После достижения `max_files` все
    /// остальные файлы отклоняются.
    pub fn on_drop<I>(&mut self, candidates: I) -> DropOutcome
    where
        I: IntoIterator<Item = ImageCandidate>,
    {
        let mut outcome = DropOutcome::default();
        for candidate in candidates {
            match self.check(&candidate) {
                Ok(()) => {
                    self.files.push(candidate);
                    outcome.accepted += 1;
                }
                Err(reason) => outcome.rejected.push((candidate.name, reason)),
            }
        }
        outcome
    }

    fn check(&self, candidate: &ImageCandidate) -> Result<(), RejectReason> {
        if !candidate.is_image() {
            return Err(RejectReason::UnsupportedType);
        }
        if self.files.iter().any(|file| file.same_file(candidate)) {
            return Err(RejectReason::Duplicate);
        }
        if self.files.len() >= self.max_files {
            return Err(RejectReason::LimitReached);
        }
        if candidate.size > self.max_file_size {
            return Err(RejectReason::TooLarge);
        }
        Ok(())
    }

    /// Удаляет файл; обложка остаётся на том же фото, а если удалили её
    /// саму, переходит на первое.
    pub fn remove(&mut self, index: usize) -> Option<ImageCandidate> {
        if index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);

        if index == self.featured_index {
            self.featured_index = 0;
        } else if index < self.featured_index {
            self.featured_index -= 1;
        }
        Some(removed)
    }

    /// Делает фото обложкой. Возвращает `false` для несуществующего индекса.
    pub fn set_featured(&mut self, index: usize) -> bool {
        if index >= self.files.len() {
            return false;
        }
        self.featured_index = index;
        true
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.featured_index = 0;
    }
}

/// Слот для одного файла (логотип компании): новый файл заменяет старый.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleSlot {
    file: Option<ImageCandidate>,
    max_file_size: u64,
}

impl SingleSlot {
    pub fn new(max_file_size: u64) -> Self {
        Self {
            file: None,
            max_file_size,
        }
    }

    pub fn file(&self) -> Option<&ImageCandidate> {
        self.file.as_ref()
    }

    /// Ставит файл в слот, возвращая предыдущий.
    pub fn replace(
        &mut self,
        candidate: ImageCandidate,
    ) -> Result<Option<ImageCandidate>, RejectReason> {
        if !candidate.is_image() {
            return Err(RejectReason::UnsupportedType);
        }
        if candidate.size > self.max_file_size {
            return Err(RejectReason::TooLarge);
        }
        Ok(self.file.replace(candidate))
    }

    pub fn take(&mut self) -> Option<ImageCandidate> {
        self.file.take()
    }
}

/// Имитация прогресса загрузки: тикает по таймеру до 90%, а 100% ставится
/// только по факту завершения запроса.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    percent: u8,
    done: bool,
    failed: bool,
}

impl UploadProgress {
    /// Шаг одного тика.
    pub const STEP: u8 = 10;
    /// Потолок имитации.
    pub const CEILING: u8 = 90;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Запрос завершился ошибкой.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Один тик таймера. Возвращает текущее значение.
    pub fn tick(&mut self) -> u8 {
        if !self.done && !self.failed {
            self.percent = self.percent.saturating_add(Self::STEP).min(Self::CEILING);
        }
        self.percent
    }

    /// Запрос завершился.
    pub fn finish(&mut self) {
        self.percent = 100;
        self.done = true;
    }

    /// Запрос упал: прогресс сбрасывается.
    pub fn fail(&mut self) {
        *self = Self {
            failed: true,
            ..Self::default()
        };
    }
}
