//! Input validation for intake submissions.
//!
//! Validation is presence checks plus the birth-date bound the form enforces. It runs before any
//! store call, so a rejected submission leaves the store untouched.

use crate::model::{AnamnesisAnswers, IntakeForm, NewPatient};
use crate::{IntakeError, IntakeResult, NonEmptyText, PhoneNumber};
use chrono::NaiveDate;

/// A submission that passed validation, split into the patient row and the answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedIntake {
    pub patient: NewPatient,
    pub answers: AnamnesisAnswers,
}

/// Validates a form against the date it is submitted on.
///
/// # Errors
///
/// Returns `IntakeError::InvalidInput` if:
/// - name or phone is blank (both are reported when both are missing),
/// - the birth date is after `today`.
pub fn validate_intake(form: IntakeForm, today: NaiveDate) -> IntakeResult<ValidatedIntake> {
    let name = NonEmptyText::new(&form.name);
    let phone = PhoneNumber::parse(&form.phone);

    let (name, phone) = match (name, phone) {
        (Ok(name), Ok(phone)) => (name, phone),
        (Err(_), Err(_)) => {
            return Err(IntakeError::InvalidInput(
                "name and phone are required".into(),
            ));
        }
        (Err(_), Ok(_)) => return Err(IntakeError::InvalidInput("name is required".into())),
        (Ok(_), Err(_)) => return Err(IntakeError::InvalidInput("phone is required".into())),
    };

    if form.birth_date > today {
        return Err(IntakeError::InvalidInput(
            "birth date cannot be in the future".into(),
        ));
    }

    Ok(ValidatedIntake {
        patient: NewPatient {
            name,
            phone,
            city: optional_text(form.city),
            birth_date: form.birth_date,
        },
        answers: AnamnesisAnswers {
            chronic_illness: form.chronic_illness,
            medications: optional_text(form.medications).unwrap_or_default(),
            allergies: optional_text(form.allergies).unwrap_or_default(),
            goal: form.goal,
        },
    })
}

/// Parses a `YYYY-MM-DD` birth date.
///
/// # Errors
///
/// Returns `IntakeError::InvalidInput` if the value is not a calendar date in that format.
pub fn parse_birth_date(value: &str) -> IntakeResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        IntakeError::InvalidInput(format!(
            "birth date must be a date in YYYY-MM-DD format, got {value:?}"
        ))
    })
}

/// Trim free text, treating blank input as absent.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChronicIllness, Goal};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn form(name: &str, phone: &str) -> IntakeForm {
        IntakeForm {
            name: name.into(),
            phone: phone.into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            city: Some("  Centro ".into()),
            chronic_illness: ChronicIllness::Yes,
            medications: Some("   ".into()),
            allergies: None,
            goal: Goal::Prevention,
        }
    }

    #[test]
    fn test_validate_intake_builds_patient_and_answers() {
        let intake = validate_intake(form(" Ana Silva ", "+55119999"), today())
            .expect("valid form should pass");

        assert_eq!(intake.patient.name.as_str(), "Ana Silva");
        assert_eq!(intake.patient.phone.as_str(), "+55119999");
        assert_eq!(intake.patient.city.as_deref(), Some("Centro"));
        assert_eq!(intake.answers.chronic_illness, ChronicIllness::Yes);
        assert_eq!(intake.answers.medications, "");
        assert_eq!(intake.answers.allergies, "");
        assert_eq!(intake.answers.goal, Goal::Prevention);
    }

    #[test]
    fn test_validate_intake_reports_missing_fields() {
        let both = validate_intake(form("", " "), today()).expect_err("should fail");
        assert_eq!(both.to_string(), "invalid input: name and phone are required");

        let name = validate_intake(form("  ", "+55119999"), today()).expect_err("should fail");
        assert_eq!(name.to_string(), "invalid input: name is required");

        let phone = validate_intake(form("Ana", ""), today()).expect_err("should fail");
        assert_eq!(phone.to_string(), "invalid input: phone is required");
    }

    #[test]
    fn test_validate_intake_rejects_future_birth_date() {
        let mut future = form("Ana", "+55119999");
        future.birth_date = today().succ_opt().unwrap();
        let err = validate_intake(future, today()).expect_err("future birth date should fail");
        assert!(err.to_string().contains("future"));
    }

    #[test]
    fn test_validate_intake_accepts_birth_date_today() {
        let mut newborn = form("Ana", "+55119999");
        newborn.birth_date = today();
        assert!(validate_intake(newborn, today()).is_ok());
    }

    #[test]
    fn test_parse_birth_date() {
        assert_eq!(
            parse_birth_date(" 1990-01-01 ").unwrap(),
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
        );
        assert!(parse_birth_date("01/01/1990").is_err());
        assert!(parse_birth_date("1990-02-30").is_err());
    }
}
