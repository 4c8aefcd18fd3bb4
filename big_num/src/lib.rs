//! Big Num \
//! This crate provides:
//! - [`BigInteger`]: Immutable arbitrary-precision integers. All bitwise operations behave as if BigInteger were represented in two's-complement notation.
//! - [`BigDecimal`]: Immutable, arbitrary-precision signed decimal numbers. A BigDecimal consists of an arbitrary precision integer coefficient and a 32-bit integer exponent.
//! - [`Context`] and [`RoundingMode`]: the precision and rounding rule handed to each decimal operation that may round.
//!
//! Failures (division by zero, required but prohibited rounding, exponent overflow) come back as
//! [`ArithmeticError`]; malformed numerals as [`ParseBigNumError`].
//!
//! Feature `rust_decimal` (on by default) adds conversions to and from `rust_decimal::Decimal`,
//! and feature `arb` adds `quickcheck::Arbitrary` impls.

mod big_decimal;
mod big_int;
mod big_num_cache;
mod big_num_constants;
mod context;
mod error;

#[cfg(any(test, feature = "arb"))]
mod arb;

pub use big_decimal::BigDecimal;
pub use big_int::BigInteger;
pub use context::{Context, RoundingMode, UnknownRoundingMode};
pub use error::{ArithmeticError, ParseBigNumError, Result};

#[cfg(test)]
mod tests {
    use crate::{BigDecimal, BigInteger, Context, RoundingMode};

    #[test]
    fn it_works() {
        let a: BigInteger = "10000000000000".parse().unwrap();
        let b: BigInteger = "900000000000".parse().unwrap();
        assert_eq!((&a + &b).to_string(), "10900000000000");
        assert_eq!((&a - &b).to_string(), "9100000000000");
        assert_eq!((&a * &b).to_string(), "9000000000000000000000000");
        assert_eq!((&a / &b).to_string(), "11");
        assert_eq!((&a % &b).to_string(), "100000000000");
        assert_eq!((&a << 10).to_string(), "10240000000000000");
        assert_eq!((&a >> 10).to_string(), "9765625000");

        let c = Context::new(9, RoundingMode::HalfUp);
        let x = BigDecimal::from(a);
        let y = BigDecimal::from(b);
        assert_eq!(x.divide(&y, c).unwrap().to_string(), "11.1111111");
        assert_eq!(x.add(&y, c).unwrap().to_string(), "1.09000000E+13");
    }
}
