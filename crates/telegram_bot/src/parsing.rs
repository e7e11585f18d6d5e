//! Validation of free-text answers.
//!
//! Every dialogue step that accepts typed text goes through one of these
//! parsers, so the engine only ever receives well-formed input.

use chrono::NaiveDate;
use engine::{
    MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN, MAX_DISPLAY_NAME_LEN, MAX_GOAL_NAME_LEN,
    MIN_GOAL_NAME_LEN, Money,
};

/// Date format used in every prompt: `31.12.2026`.
pub(crate) const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("Сумма указана некорректно. Введите число.")]
    InvalidAmount,
    #[error("Сумма должна быть больше нуля.")]
    NonPositiveAmount,
    #[error("Неверный формат даты. Используйте ДД.ММ.ГГГГ.")]
    InvalidDate,
    #[error("Дата не может быть в прошлом!")]
    PastDate,
    #[error("Значение не может быть пустым.")]
    Empty,
    #[error("Слишком длинный текст (макс. {0} символов).")]
    TooLong(usize),
    #[error("Название должно быть не короче {0} символов.")]
    TooShort(usize),
}

/// A strictly positive amount in major units (`150`, `99,90`).
pub(crate) fn parse_amount(input: &str) -> Result<Money, ParseError> {
    let amount = Money::parse_major(input).map_err(|_| ParseError::InvalidAmount)?;
    if !amount.is_positive() {
        return Err(ParseError::NonPositiveAmount);
    }
    Ok(amount)
}

/// A `DD.MM.YYYY` date that is not before `today`.
pub(crate) fn parse_deadline(input: &str, today: NaiveDate) -> Result<NaiveDate, ParseError> {
    let date =
        NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| ParseError::InvalidDate)?;
    if date < today {
        return Err(ParseError::PastDate);
    }
    Ok(date)
}

fn bounded(input: &str, min: usize, max: usize) -> Result<String, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let len = trimmed.chars().count();
    if len < min {
        return Err(ParseError::TooShort(min));
    }
    if len > max {
        return Err(ParseError::TooLong(max));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn parse_display_name(input: &str) -> Result<String, ParseError> {
    bounded(input, 1, MAX_DISPLAY_NAME_LEN)
}

pub(crate) fn parse_category(input: &str) -> Result<String, ParseError> {
    bounded(input, 1, MAX_CATEGORY_LEN)
}

pub(crate) fn parse_description(input: &str) -> Result<String, ParseError> {
    bounded(input, 1, MAX_DESCRIPTION_LEN)
}

pub(crate) fn parse_goal_name(input: &str) -> Result<String, ParseError> {
    bounded(input, MIN_GOAL_NAME_LEN, MAX_GOAL_NAME_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn amounts_must_be_positive_numbers() {
        assert_eq!(parse_amount("150").unwrap(), Money::new(15_000));
        assert_eq!(parse_amount(" 99,90 ").unwrap(), Money::new(9_990));
        assert_eq!(parse_amount("abc"), Err(ParseError::InvalidAmount));
        assert_eq!(parse_amount("0"), Err(ParseError::NonPositiveAmount));
        assert_eq!(parse_amount("-5"), Err(ParseError::NonPositiveAmount));
    }

    #[test]
    fn deadlines_use_day_month_year_and_reject_the_past() {
        let today = day(2026, 6, 15);
        assert_eq!(parse_deadline("31.12.2026", today).unwrap(), day(2026, 12, 31));
        assert_eq!(parse_deadline("15.06.2026", today).unwrap(), today);
        assert_eq!(parse_deadline("14.06.2026", today), Err(ParseError::PastDate));
        assert_eq!(parse_deadline("2026-12-31", today), Err(ParseError::InvalidDate));
        assert_eq!(parse_deadline("31.02.2026", today), Err(ParseError::InvalidDate));
    }

    #[test]
    fn text_fields_are_trimmed_and_bounded() {
        assert_eq!(parse_category("  Кафе ").unwrap(), "Кафе");
        assert_eq!(parse_category("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_category(&"к".repeat(31)),
            Err(ParseError::TooLong(MAX_CATEGORY_LEN))
        );
        assert!(parse_description(&"д".repeat(200)).is_ok());
        assert_eq!(
            parse_description(&"д".repeat(201)),
            Err(ParseError::TooLong(MAX_DESCRIPTION_LEN))
        );
        assert_eq!(parse_goal_name(" Да "), Err(ParseError::TooShort(3)));
        assert_eq!(parse_goal_name("Дом").unwrap(), "Дом");
        assert_eq!(parse_display_name(" Егор ").unwrap(), "Егор");
    }
}
