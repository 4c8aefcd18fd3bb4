//! # Context
//! The precision and rounding policy every [`BigDecimal`](crate::BigDecimal) operation is given
//! explicitly. A decimal never remembers the context it was produced under.
//! # Example
//! ```
//! use big_num::{Context, RoundingMode};
//!
//! let c = Context::new(9, RoundingMode::HalfUp);
//! assert_eq!(c, Context::BASIC_DEFAULT);
//! assert_eq!(c.to_string(), "precision=9 roundingMode=HalfUp");
//! ```

use std::fmt::Display;
use std::str::FromStr;

/// How discarded digits affect the retained coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Round away from zero.
    Up,
    /// Truncate, round toward zero.
    Down,
    /// Round toward positive infinity.
    Ceiling,
    /// Round toward negative infinity.
    Floor,
    /// Round to nearest, ties away from zero.
    HalfUp,
    /// Round to nearest, ties toward zero.
    HalfDown,
    /// Round to nearest, ties to the even neighbour.
    HalfEven,
    /// Demand an exact result; any discarded nonzero digit is an error.
    Unnecessary,
}

impl RoundingMode {
    pub const ALL: [RoundingMode; 8] = [
        RoundingMode::Up,
        RoundingMode::Down,
        RoundingMode::Ceiling,
        RoundingMode::Floor,
        RoundingMode::HalfUp,
        RoundingMode::HalfDown,
        RoundingMode::HalfEven,
        RoundingMode::Unnecessary,
    ];

    fn name(self) -> &'static str {
        match self {
            RoundingMode::Up => "Up",
            RoundingMode::Down => "Down",
            RoundingMode::Ceiling => "Ceiling",
            RoundingMode::Floor => "Floor",
            RoundingMode::HalfUp => "HalfUp",
            RoundingMode::HalfDown => "HalfDown",
            RoundingMode::HalfEven => "HalfEven",
            RoundingMode::Unnecessary => "Unnecessary",
        }
    }
}

impl Display for RoundingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the enum spelling (`HalfUp`) as well as the GDA testcase directive
/// spellings (`half_up`, `HALF_UP`), case-insensitively.
impl FromStr for RoundingMode {
    type Err = UnknownRoundingMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        RoundingMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.name().to_ascii_lowercase() == key)
            .ok_or_else(|| UnknownRoundingMode(s.to_string()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown rounding mode {0:?}")]
pub struct UnknownRoundingMode(pub String);

/// Precision (number of significant digits, `0` meaning unbounded) paired with a
/// [`RoundingMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Context {
    precision: u32,
    rounding_mode: RoundingMode,
}

impl Context {
    pub const BASIC_DEFAULT: Context = Context::new(9, RoundingMode::HalfUp);
    pub const DECIMAL32: Context = Context::new(7, RoundingMode::HalfEven);
    pub const DECIMAL64: Context = Context::new(16, RoundingMode::HalfEven);
    pub const DECIMAL128: Context = Context::new(34, RoundingMode::HalfEven);
    /// Exact arithmetic: no rounding ever happens, and operations whose result
    /// cannot be represented exactly fail.
    pub const UNLIMITED: Context = Context::new(0, RoundingMode::HalfUp);

    pub const fn new(precision: u32, rounding_mode: RoundingMode) -> Self {
        Context { precision, rounding_mode }
    }

    /// `precision` digits, rounding half up.
    pub const fn with_precision(precision: u32) -> Self {
        Context::new(precision, RoundingMode::HalfUp)
    }

    /// The GDA "extended" default: `precision` digits, rounding half even.
    pub const fn extended_default(precision: u32) -> Self {
        Context::new(precision, RoundingMode::HalfEven)
    }

    pub const fn precision(&self) -> u32 {
        self.precision
    }

    pub const fn rounding_mode(&self) -> RoundingMode {
        self.rounding_mode
    }

    pub const fn is_unbounded(&self) -> bool {
        self.precision == 0
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "precision={} roundingMode={}", self.precision, self.rounding_mode)
    }
}

#[test]
fn test_presets() {
    assert_eq!(Context::BASIC_DEFAULT, Context::with_precision(9));
    assert_eq!(Context::DECIMAL32, Context::extended_default(7));
    assert_eq!(Context::DECIMAL64.precision(), 16);
    assert_eq!(Context::DECIMAL128.rounding_mode(), RoundingMode::HalfEven);
    assert!(Context::UNLIMITED.is_unbounded());
    assert!(!Context::DECIMAL32.is_unbounded());
}

#[test]
fn test_display() {
    assert_eq!(Context::DECIMAL64.to_string(), "precision=16 roundingMode=HalfEven");
    assert_eq!(RoundingMode::Unnecessary.to_string(), "Unnecessary");
}

#[test]
fn test_rounding_mode_from_str() {
    assert_eq!("half_up".parse(), Ok(RoundingMode::HalfUp));
    assert_eq!("HALF_EVEN".parse(), Ok(RoundingMode::HalfEven));
    assert_eq!("HalfDown".parse(), Ok(RoundingMode::HalfDown));
    assert_eq!("ceiling".parse(), Ok(RoundingMode::Ceiling));
    assert_eq!("floor".parse(), Ok(RoundingMode::Floor));
    assert_eq!("up".parse(), Ok(RoundingMode::Up));
    assert_eq!("down".parse(), Ok(RoundingMode::Down));
    assert!("05up".parse::<RoundingMode>().is_err());
    for mode in RoundingMode::ALL {
        assert_eq!(mode.to_string().parse(), Ok(mode));
    }
}
