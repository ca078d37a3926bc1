// Settai (接待) mode: the operator picks the number the next draw will return.

use std::fmt;
use std::num::{IntErrorKind, ParseIntError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettaiError {
    Empty,
    NotANumber(String),
    OutOfRange { max: u32 },
    AlreadyDrawn(u32),
}

impl fmt::Display for SettaiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "please enter a number"),
            Self::NotANumber(input) => write!(f, "'{input}' is not a valid number"),
            Self::OutOfRange { max } => write!(f, "please enter a number from 1 to {max}"),
            Self::AlreadyDrawn(n) => write!(f, "number {n} has already been drawn, pick another one"),
        }
    }
}

impl std::error::Error for SettaiError {}

/// Parses and checks an operator-entered settai number.
///
/// Checks run in a fixed order: empty input, integer parse, range, then
/// whether the number has already been drawn.
pub fn validate(input: &str, max_number: u32, drawn: &[u32]) -> Result<u32, SettaiError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SettaiError::Empty);
    }

    let value: i64 = input.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => SettaiError::OutOfRange { max: max_number },
        _ => SettaiError::NotANumber(input.to_string()),
    })?;
    if value < 1 || value > i64::from(max_number) {
        return Err(SettaiError::OutOfRange { max: max_number });
    }

    let n = value as u32;
    if drawn.contains(&n) {
        return Err(SettaiError::AlreadyDrawn(n));
    }
    Ok(n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettaiMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl SettaiMessage {
    pub fn set(n: u32) -> Self {
        Self { kind: MessageKind::Success, text: format!("the next draw will return {n}") }
    }

    pub fn cleared() -> Self {
        Self { kind: MessageKind::Info, text: "settai number cleared".to_string() }
    }

    pub fn current(pending: Option<u32>) -> Self {
        let text = match pending {
            Some(n) => format!("currently set: the next draw will return {n}"),
            None => "no settai number is set".to_string(),
        };
        Self { kind: MessageKind::Info, text }
    }

    pub fn rejected(err: &SettaiError) -> Self {
        Self { kind: MessageKind::Error, text: err.to_string() }
    }
}

impl fmt::Display for SettaiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            MessageKind::Success => "ok",
            MessageKind::Error => "error",
            MessageKind::Info => "info",
        };
        write!(f, "[{tag}] {}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_undrawn_in_range() {
        assert_eq!(validate(" 42 ", 75, &[1, 2]), Ok(42));
        assert_eq!(validate("75", 75, &[]), Ok(75));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(validate("", 75, &[]), Err(SettaiError::Empty));
        assert_eq!(validate("   ", 75, &[]), Err(SettaiError::Empty));
    }

    #[test]
    fn test_validate_rejects_non_numbers() {
        assert!(matches!(validate("abc", 75, &[]), Err(SettaiError::NotANumber(_))));
        assert!(matches!(validate("4.5", 75, &[]), Err(SettaiError::NotANumber(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert_eq!(validate("0", 75, &[]), Err(SettaiError::OutOfRange { max: 75 }));
        assert_eq!(validate("-3", 75, &[]), Err(SettaiError::OutOfRange { max: 75 }));
        assert_eq!(validate("76", 75, &[]), Err(SettaiError::OutOfRange { max: 75 }));
    }

    #[test]
    fn test_huge_integers_are_out_of_range() {
        assert_eq!(validate("99999999999999999999", 75, &[]), Err(SettaiError::OutOfRange { max: 75 }));
        assert_eq!(validate("-99999999999999999999", 75, &[]), Err(SettaiError::OutOfRange { max: 75 }));
    }

    #[test]
    fn test_range_is_checked_before_drawn() {
        // 80 is "drawn" but out of range, range wins.
        assert!(matches!(validate("80", 75, &[80]), Err(SettaiError::OutOfRange { .. })));
        assert_eq!(validate("12", 75, &[12]), Err(SettaiError::AlreadyDrawn(12)));
    }

    #[test]
    fn test_message_rendering() {
        assert_eq!(SettaiMessage::set(7).to_string(), "[ok] the next draw will return 7");
        let msg = SettaiMessage::rejected(&SettaiError::OutOfRange { max: 75 });
        assert_eq!(msg.kind, MessageKind::Error);
        assert_eq!(msg.text, "please enter a number from 1 to 75");
        assert_eq!(SettaiMessage::current(None).kind, MessageKind::Info);
    }
}
