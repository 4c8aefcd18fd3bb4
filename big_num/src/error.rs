use thiserror::Error;

/// Failures raised by [`BigInteger`](crate::BigInteger) and [`BigDecimal`](crate::BigDecimal)
/// arithmetic. No operation produces an infinite or NaN value; these are reported here instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Divide by zero")]
    DivideByZero,
    #[error("Division undefined (0/0)")]
    DivisionUndefined,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Division impossible")]
    DivisionImpossible,
    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("Rounding is required, but prohibited")]
    RoundingNecessary,
    #[error("Non-terminating decimal expansion; no exact representable decimal result")]
    NonTerminatingExpansion,
    #[error("Exponent must be non-negative")]
    NegativeExponent,
    #[error("Negative bit address")]
    NegativeBitAddress,
    #[error("Overflow in scale")]
    ExponentOverflow,
    #[error("Underflow in scale")]
    ExponentUnderflow,
    #[error("Value is NaN or infinite")]
    NotFinite,
    #[error("Radix {0} out of range 2..=36")]
    RadixOutOfRange(u32),
    #[error("Sign must be -1, 0 or +1")]
    InvalidSign,
    #[error("Zero sign on non-zero magnitude")]
    ZeroSignOnNonzeroMagnitude,
    #[error(transparent)]
    Parse(#[from] ParseBigNumError),
}

/// Reasons a numeral failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseBigNumError {
    #[error("Empty string")]
    Empty,
    #[error("Radix {0} out of range 2..=36")]
    RadixOutOfRange(u32),
    #[error("No digits in coefficient")]
    NoDigits,
    #[error("Multiple sign characters")]
    MultipleSigns,
    #[error("Illegal embedded sign character")]
    EmbeddedSign,
    #[error("Illegal digit {digit:?} for radix {radix}")]
    InvalidDigit { digit: char, radix: u32 },
    #[error("Missing exponent")]
    MissingExponent,
    #[error("Unused characters at end")]
    UnusedCharacters,
    #[error("Exponent out of range")]
    ExponentOutOfRange,
}

pub type Result<T, E = ArithmeticError> = std::result::Result<T, E>;
