//! Operator type rules

use crate::common::{Span, TranslateError, TranslateResult};
use crate::frontend::ast::BinOp;
use crate::types::ValueType;

/// Both operands of a comparison must belong to the same family
pub fn check_comparison(
    op: BinOp,
    left: ValueType,
    right: ValueType,
    span: Span,
) -> TranslateResult<()> {
    if left.is_comparable_with(right) {
        Ok(())
    } else {
        Err(TranslateError::type_mismatch(
            format!("cannot compare {} with {} using '{}'", left, right, op),
            span,
        ))
    }
}

/// Result type of an arithmetic operator
pub fn arithmetic_result(
    op: BinOp,
    left: ValueType,
    right: ValueType,
    span: Span,
) -> TranslateResult<ValueType> {
    use ValueType::{Date, Duration, Number, Time};

    let result = match (op, left, right) {
        (_, Number, Number) => Some(Number),
        (BinOp::Add | BinOp::Sub, Date, Duration) => Some(Date),
        (BinOp::Add | BinOp::Sub, Time, Duration) => Some(Time),
        (BinOp::Add, Duration, Date) => Some(Date),
        (BinOp::Add, Duration, Time) => Some(Time),
        (BinOp::Sub, Date, Date) | (BinOp::Sub, Time, Time) => Some(Duration),
        (BinOp::Add | BinOp::Sub, Duration, Duration) => Some(Duration),
        (BinOp::Mul, Duration, Number) | (BinOp::Mul, Number, Duration) => Some(Duration),
        (BinOp::Div, Duration, Number) => Some(Duration),
        _ => None,
    };

    result.ok_or_else(|| {
        TranslateError::type_mismatch(
            format!("operator '{}' cannot combine {} and {}", op, left, right),
            span,
        )
    })
}

/// `and` / `or` / `not` take booleans only
pub fn check_boolean(ty: ValueType, what: &str, span: Span) -> TranslateResult<()> {
    if ty == ValueType::Boolean {
        Ok(())
    } else {
        Err(TranslateError::type_mismatch(
            format!("{} expects a boolean, found {}", what, ty),
            span,
        ))
    }
}

/// Check that an expression has exactly the expected type
pub fn expect_type(
    expected: ValueType,
    found: ValueType,
    what: &str,
    span: Span,
) -> TranslateResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(TranslateError::type_mismatch(
            format!("{} expects {}, found {}", what, expected, found),
            span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_rules() {
        let span = Span::default();
        assert_eq!(
            arithmetic_result(BinOp::Add, ValueType::Number, ValueType::Number, span).unwrap(),
            ValueType::Number
        );
        assert_eq!(
            arithmetic_result(BinOp::Sub, ValueType::Date, ValueType::Date, span).unwrap(),
            ValueType::Duration
        );
        assert_eq!(
            arithmetic_result(BinOp::Add, ValueType::Date, ValueType::Duration, span).unwrap(),
            ValueType::Date
        );
        assert_eq!(
            arithmetic_result(BinOp::Mul, ValueType::Number, ValueType::Duration, span).unwrap(),
            ValueType::Duration
        );
        assert!(matches!(
            arithmetic_result(BinOp::Add, ValueType::String, ValueType::Number, span),
            Err(TranslateError::TypeMismatch { .. })
        ));
        assert!(arithmetic_result(BinOp::Mul, ValueType::Date, ValueType::Number, span).is_err());
    }

    #[test]
    fn test_comparison_families() {
        let span = Span::default();
        assert!(check_comparison(BinOp::Eq, ValueType::String, ValueType::String, span).is_ok());
        assert!(check_comparison(BinOp::Lt, ValueType::Date, ValueType::Time, span).is_err());
        assert!(check_comparison(BinOp::Eq, ValueType::Node, ValueType::Node, span).is_err());
    }

    #[test]
    fn test_boolean_check() {
        assert!(check_boolean(ValueType::Boolean, "and", Span::default()).is_ok());
        assert!(check_boolean(ValueType::Number, "and", Span::default()).is_err());
    }
}
