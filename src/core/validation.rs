//! Client-side checks run before anything is sent to the store.
use crate::core::model::{ExpenditureDraft, IncomeRecord, ProfileDraft};
use thiserror::Error;

const ALLOCATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Needs, wants and savings must add up to 100%, got {sum}%")]
    AllocationSum { sum: f64 },
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },
    #[error("{field} must be a non-negative amount, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}

fn check_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidAmount { field, value });
    }
    Ok(())
}

fn check_percent(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::PercentOutOfRange { field, value });
    }
    Ok(())
}

fn check_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

pub fn validate_allocation(needs: f64, wants: f64, savings: f64) -> Result<(), ValidationError> {
    check_percent("Needs %", needs)?;
    check_percent("Wants %", wants)?;
    check_percent("Savings %", savings)?;
    let sum = needs + wants + savings;
    if (sum - 100.0).abs() > ALLOCATION_TOLERANCE {
        return Err(ValidationError::AllocationSum { sum });
    }
    Ok(())
}

pub fn validate_income(record: &IncomeRecord) -> Result<(), ValidationError> {
    check_amount("Monthly income", record.income)?;
    check_amount("Goal", record.goal)?;
    validate_allocation(record.needs, record.wants, record.savings)
}

pub fn validate_expenditure(draft: &ExpenditureDraft) -> Result<(), ValidationError> {
    check_required("Title", &draft.title)?;
    check_amount("Amount", draft.cost)
}

pub fn validate_profile(draft: &ProfileDraft) -> Result<(), ValidationError> {
    check_required("First name", &draft.first_name)?;
    check_required("Username", &draft.username)?;
    check_required("Email", &draft.email)?;
    if !draft.email.contains('@') {
        return Err(ValidationError::InvalidEmail(draft.email.clone()));
    }
    Ok(())
}
