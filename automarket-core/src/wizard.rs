//! Мастер создания объявления: основные данные, характеристики, фото,
//! проверка.

use chrono::{Datelike, Utc};

use crate::error::{FormErrors, ValidationError};
use crate::models::{CarSpecification, NewCar};
use crate::upload::UploadSelection;

/// Шаг мастера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Basics,
    Specification,
    Photos,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Basics,
        WizardStep::Specification,
        WizardStep::Photos,
        WizardStep::Review,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Basics => "Основное",
            Self::Specification => "Характеристики",
            Self::Photos => "Фотографии",
            Self::Review => "Проверка",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Собранное объявление: тело запроса + выбранные фото.
#[derive(Debug, Clone, PartialEq)]
pub struct CarDraft {
    pub car: NewCar,
    pub photos: UploadSelection,
}

/// Мастер создания объявления. Поля хранятся как введены.
#[derive(Debug, Clone, PartialEq)]
pub struct CarWizard {
    step: WizardStep,
    furthest: WizardStep,
    current_year: i32,

    pub make: String,
    pub model: String,
    pub year: String,
    pub price: String,
    pub mileage: String,
    pub location: String,
    pub description: String,

    pub specification: CarSpecification,
    pub photos: UploadSelection,
}

impl Default for CarWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl CarWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Basics,
            furthest: WizardStep::Basics,
            current_year: Utc::now().year(),
            make: String::new(),
            model: String::new(),
            year: String::new(),
            price: String::new(),
            mileage: String::new(),
            location: String::new(),
            description: String::new(),
            specification: CarSpecification::default(),
            photos: UploadSelection::default(),
        }
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Самый дальний шаг, до которого пользователь дошёл.
    pub fn furthest(&self) -> WizardStep {
        self.furthest
    }

    pub fn validate_step(&self, step: WizardStep) -> FormErrors {
        let mut errors = FormErrors::new();
        match step {
            WizardStep::Basics => {
                if self.make.trim().is_empty() {
                    errors.push(ValidationError::new("make", "Укажите марку"));
                }
                if self.model.trim().is_empty() {
                    errors.push(ValidationError::new("model", "Укажите модель"));
                }
                match self.year.trim().parse::<i32>() {
                    Ok(year) if (1900..=self.current_year + 1).contains(&year) => {}
                    _ => errors.push(ValidationError::new("year", "Некорректный год выпуска")),
                }
                match self.price.trim().parse::<f64>() {
                    Ok(price) if price.is_finite() && price > 0.0 => {}
                    _ => errors.push(ValidationError::new(
                        "price",
                        "Цена должна быть больше нуля",
                    )),
                }
                let mileage = self.mileage.trim();
                if !mileage.is_empty() && mileage.parse::<u32>().is_err() {
                    errors.push(ValidationError::new("mileage", "Некорректный пробег"));
                }
            }
            WizardStep::Specification => {
                if is_blank(&self.specification.fuel_type) {
                    errors.push(ValidationError::new("fuelType", "Укажите тип топлива"));
                }
                if is_blank(&self.specification.transmission) {
                    errors.push(ValidationError::new(
                        "transmission",
                        "Укажите коробку передач",
                    ));
                }
            }
            WizardStep::Photos => {
                if self.photos.is_empty() {
                    errors.push(ValidationError::new(
                        "images",
                        "Добавьте хотя бы одну фотографию",
                    ));
                }
            }
            WizardStep::Review => {}
        }
        errors
    }

    pub fn validate_all(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        for step in WizardStep::ALL {
            errors.extend(self.validate_step(step));
        }
        errors
    }

    /// Вперёд, если текущий шаг заполнен.
    pub fn next(&mut self) -> Result<WizardStep, FormErrors> {
        self.validate_step(self.step).into_result()?;
        if let Some(next) = WizardStep::ALL.get(self.step.index() + 1) {
            self.step = *next;
            self.furthest = self.furthest.max(*next);
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        let index = self.step.index();
        if index > 0 {
            self.step = WizardStep::ALL[index - 1];
        }
        self.step
    }

    /// Прыжок на уже пройденный шаг. Вперёд дальше `furthest` нельзя.
    pub fn go_to(&mut self, step: WizardStep) -> bool {
        if step > self.furthest {
            return false;
        }
        self.step = step;
        true
    }

    /// Проверяет все шаги и собирает объявление.
    pub fn build(&self) -> Result<CarDraft, FormErrors> {
        self.validate_all().into_result()?;

        let car = NewCar {
            make: self.make.trim().to_string(),
            model: self.model.trim().to_string(),
            year: self.year.trim().parse().unwrap_or_default(),
            price: self.price.trim().parse().unwrap_or_default(),
            mileage: self.mileage.trim().parse().ok(),
            description: non_blank(&self.description),
            location: non_blank(&self.location),
            specification: self.specification.clone(),
        };
        Ok(CarDraft {
            car,
            photos: self.photos.clone(),
        })
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::ImageCandidate;

    fn basics(wizard: &mut CarWizard) {
        wizard.make = "Chevrolet".to_string();
        wizard.model = "Cobalt".to_string();
        wizard.year = "2022".to_string();
        wizard.price = "12500".to_string();
        wizard.mileage = "30000".to_string();
    }

    fn specification(wizard: &mut CarWizard) {
        wizard.specification.fuel_type = Some("petrol".to_string());
        wizard.specification.transmission = Some("automatic".to_string());
    }

    #[test]
    fn basics_step_requires_make_model_year_and_price() {
        let wizard = CarWizard::new().with_current_year(2026);
        let errors = wizard.validate_step(WizardStep::Basics);

        for field in ["make", "model", "year", "price"] {
            assert!(errors.get(field).is_some(), "{field} must be reported");
        }
        assert!(errors.get("mileage").is_none());
    }

    #[test]
    fn year_may_be_next_model_year_but_not_later() {
        let mut wizard = CarWizard::new().with_current_year(2026);
        basics(&mut wizard);
        wizard.year = "2027".to_string();
        assert!(wizard.validate_step(WizardStep::Basics).is_empty());

        wizard.year = "2028".to_string();
        assert!(wizard.validate_step(WizardStep::Basics).get("year").is_some());
    }

    #[test]
    fn next_blocks_on_invalid_step_and_go_to_respects_progress() {
        let mut wizard = CarWizard::new().with_current_year(2026);
        assert!(wizard.next().is_err());
        assert!(!wizard.go_to(WizardStep::Photos));

        basics(&mut wizard);
        assert_eq!(wizard.next().expect("basics valid"), WizardStep::Specification);
        specification(&mut wizard);
        assert_eq!(wizard.next().expect("spec valid"), WizardStep::Photos);

        assert!(wizard.go_to(WizardStep::Basics));
        assert_eq!(wizard.furthest(), WizardStep::Photos);
        assert!(wizard.go_to(WizardStep::Photos));
        assert!(!wizard.go_to(WizardStep::Review));
    }

    #[test]
    fn build_requires_photos_and_keeps_featured_index() {
        let mut wizard = CarWizard::new().with_current_year(2026);
        basics(&mut wizard);
        specification(&mut wizard);

        let errors = wizard.build().expect_err("photos are required");
        assert!(errors.get("images").is_some());

        wizard.photos.on_drop([
            ImageCandidate::new("front.jpg", 10),
            ImageCandidate::new("back.jpg", 20),
        ]);
        wizard.photos.set_featured(1);

        let draft = wizard.build().expect("wizard must be complete");
        assert_eq!(draft.car.make, "Chevrolet");
        assert_eq!(draft.car.price, 12500.0);
        assert_eq!(draft.car.mileage, Some(30000));
        assert!(draft.car.description.is_none());
        assert_eq!(draft.photos.featured_index(), 1);
    }

    #[test]
    fn back_from_first_step_stays_put() {
        let mut wizard = CarWizard::new().with_current_year(2026);
        assert_eq!(wizard.back(), WizardStep::Basics);
        assert_eq!(wizard.step(), WizardStep::Basics);
        assert_eq!(wizard.furthest(), WizardStep::Basics);
    }

    #[test]
    fn edited_earlier_step_blocks_build_after_jump() {
        let mut wizard = CarWizard::new().with_current_year(2026);
        basics(&mut wizard);
        wizard.next().expect("basics valid");
        specification(&mut wizard);
        wizard.next().expect("spec valid");
        wizard.photos.on_drop([ImageCandidate::new("front.jpg", 10)]);
        wizard.next().expect("photos valid");
        assert_eq!(wizard.step(), WizardStep::Review);

        assert!(wizard.go_to(WizardStep::Basics));
        wizard.price = "0".to_string();
        assert!(wizard.go_to(WizardStep::Review));

        let errors = wizard.build().expect_err("invalid price must block build");
        assert!(errors.get("price").is_some());
        assert!(errors.get("make").is_none());
    }
}
