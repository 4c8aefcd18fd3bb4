//! # BigDecimal
//! Immutable arbitrary-precision decimal numbers: a [`BigInteger`] coefficient scaled by a power of
//! ten. Rounding only ever happens under a [`Context`] passed to the operation.
//! # Example
//! ```
//! use big_num::{BigDecimal, Context, RoundingMode};
//!
//! let a: BigDecimal = "5.75".parse().unwrap();
//! let b: BigDecimal = "3.3".parse().unwrap();
//! let c = Context::new(9, RoundingMode::HalfUp);
//! assert_eq!(a.add(&b, c).unwrap().to_string(), "9.05");
//!
//! let third = BigDecimal::one().divide(&"3".parse().unwrap(), c).unwrap();
//! assert_eq!(third.to_string(), "0.333333333");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::big_int::BigInteger;
use crate::big_num_cache::*;
use crate::big_num_constants::*;
use crate::context::{Context, RoundingMode};
use crate::error::{ArithmeticError, ParseBigNumError, Result};

/// `coefficient * 10^exponent`. Many representations share one value (`1.0` and `1.00`), so
/// equality and ordering compare numerically; [`is_identical`](BigDecimal::is_identical) compares
/// the representation.
#[derive(Debug, Clone)]
pub struct BigDecimal {
    coeff: BigInteger,
    exp: i32,
}

/// Narrows an exponent computed in 64 bits. A zero coefficient clamps instead of failing.
fn check_exponent(exp: i64, is_zero: bool) -> Result<i32> {
    match i32::try_from(exp) {
        Ok(exp) => Ok(exp),
        Err(_) if is_zero => Ok(if exp > 0 { i32::MAX } else { i32::MIN }),
        Err(_) if exp > 0 => Err(ArithmeticError::ExponentOverflow),
        Err(_) => Err(ArithmeticError::ExponentUnderflow),
    }
}

fn clamp_exponent(exp: i64) -> i32 {
    exp.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Truncating `x / y` corrected by `mode`, plus whether the division was exact.
fn rounding_divide(x: &BigInteger, y: &BigInteger, mode: RoundingMode) -> Result<(BigInteger, bool)> {
    let (q, r) = x.div_rem(y)?;
    if r.is_zero() {
        return Ok((q, true));
    }

    let negative = x.signum() * y.signum() < 0;
    let increment = match mode {
        RoundingMode::Unnecessary => return Err(ArithmeticError::RoundingNecessary),
        RoundingMode::Up => true,
        RoundingMode::Down => false,
        RoundingMode::Ceiling => !negative,
        RoundingMode::Floor => negative,
        RoundingMode::HalfUp | RoundingMode::HalfDown | RoundingMode::HalfEven => {
            match r.shift_left(1).compare_magnitude(y) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => match mode {
                    RoundingMode::HalfUp => true,
                    RoundingMode::HalfDown => false,
                    _ => q.is_odd(),
                },
            }
        }
    };

    let q = match (increment, negative) {
        (false, _) => q,
        (true, false) => &q + &POS_CACHE[1],
        (true, true) => &q + &NEG_CACHE[1],
    };
    Ok((q, false))
}

/// Drops low digits until the coefficient fits the context precision.
fn round_parts(coeff: BigInteger, exp: i64, ctx: Context) -> Result<(BigInteger, i64)> {
    let limit = ctx.precision();
    if limit == 0 {
        return Ok((coeff, exp));
    }
    let precision = coeff.precision();
    if precision <= limit {
        return Ok((coeff, exp));
    }

    let drop = precision - limit;
    let (mut rounded, exact) = rounding_divide(&coeff, &ten_pow(drop as u64), ctx.rounding_mode())?;
    let mut exp = exp + drop as i64;
    // 999 -> 1000: the carried digit is a trailing zero
    if rounded.precision() > limit {
        rounded = rounded.div_rem_nonzero(&POS_CACHE[10]).0;
        exp += 1;
    }
    trace!(drop, exact, %ctx, "rounded coefficient");
    Ok((rounded, exp))
}

fn finish(coeff: BigInteger, exp: i64, ctx: Context) -> Result<BigDecimal> {
    let (coeff, exp) = round_parts(coeff, exp, ctx)?;
    let exp = check_exponent(exp, coeff.is_zero())?;
    Ok(BigDecimal::new(coeff, exp))
}

/// Both coefficients rescaled to the smaller exponent.
fn align(x: &BigDecimal, y: &BigDecimal) -> (BigInteger, BigInteger, i32) {
    let exp = x.exp.min(y.exp);
    (x.coefficient_at(exp), y.coefficient_at(exp), exp)
}

// Construction
impl BigDecimal {
    /// The coefficient for exponent `exp <= self.exp`. A zero never materializes the power of ten.
    fn coefficient_at(&self, exp: i32) -> BigInteger {
        if self.coeff.is_zero() || self.exp == exp {
            return self.coeff.clone();
        }
        &self.coeff * &ten_pow((self.exp as i64 - exp as i64) as u64)
    }

    pub const ZERO: BigDecimal = BigDecimal { coeff: BigInteger::ZERO, exp: 0 };

    pub fn new(coeff: BigInteger, exp: i32) -> Self {
        BigDecimal { coeff, exp }
    }

    pub fn one() -> Self {
        DECIMAL_ONE.clone()
    }

    pub fn ten() -> Self {
        DECIMAL_TEN.clone()
    }

    /// The exact binary value of `v`, then rounded.
    pub fn from_f64_with_context(v: f64, ctx: Context) -> Result<Self> {
        BigDecimal::try_from(v)?.round(ctx)
    }
}

macro_rules! impl_int_to_big_decimal {
    ($($t: ty),*) => {
    $(
    impl From<$t> for BigDecimal {
        fn from(val: $t) -> Self {
            BigDecimal::new(BigInteger::from(val), 0)
        }
    }
    )*
    };
}
impl_int_to_big_decimal!(u8, u16, u32, usize, u64, u128, i8, i16, i32, isize, i64, i128);

impl From<BigInteger> for BigDecimal {
    fn from(val: BigInteger) -> Self {
        BigDecimal::new(val, 0)
    }
}

/// Exact: every finite double is a terminating decimal. `0.1` becomes
/// `0.10000000000000000555111512312578270211815834045410156250`.
impl TryFrom<f64> for BigDecimal {
    type Error = ArithmeticError;

    fn try_from(v: f64) -> Result<Self> {
        if !v.is_finite() {
            return Err(ArithmeticError::NotFinite);
        }
        let bits = v.to_bits();
        let biased_exp = ((bits >> 52) & 0x7ff) as i32;
        let fraction = bits & ((1 << 52) - 1);
        let (significand, shift) = match (biased_exp, fraction) {
            (0, 0) => return Ok(BigDecimal::ZERO),
            (0, _) => (fraction, -1074),
            // powers of two keep a one-digit coefficient
            (_, 0) => (1, biased_exp - 1023),
            _ => (fraction | (1 << 52), biased_exp - 1075),
        };

        let mut coeff = BigInteger::from(significand);
        if v < 0.0 {
            coeff = -coeff;
        }
        if shift < 0 {
            // m * 2^-k == m * 5^k * 10^-k
            let five_pow = POS_CACHE[5].pow(-shift)?;
            Ok(BigDecimal::new(&coeff * &five_pow, shift))
        } else {
            Ok(BigDecimal::new(coeff.shift_left(shift), 0))
        }
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for BigDecimal {
    fn from(v: rust_decimal::Decimal) -> Self {
        BigDecimal::new(BigInteger::from(v.mantissa()), -(v.scale() as i32))
    }
}

// Parsing
impl BigDecimal {
    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`. Either side of the point may be empty but
    /// not both.
    pub fn parse(s: &str) -> std::result::Result<BigDecimal, ParseBigNumError> {
        let bytes = s.as_bytes();
        let len = bytes.len();
        if len == 0 {
            return Err(ParseBigNumError::Empty);
        }
        let scan_digits = |mut pos: usize| {
            while pos < len && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            pos
        };

        let mut pos = 0;
        let negative = bytes[0] == b'-';
        if negative || bytes[0] == b'+' {
            pos = 1;
        }

        let int_start = pos;
        pos = scan_digits(pos);
        let int_digits = &s[int_start..pos];

        let mut frac_digits = "";
        if pos < len && bytes[pos] == b'.' {
            let frac_start = pos + 1;
            pos = scan_digits(frac_start);
            frac_digits = &s[frac_start..pos];
        }

        let mut exponent: i64 = 0;
        if pos < len && (bytes[pos] == b'e' || bytes[pos] == b'E') {
            pos += 1;
            let exp_negative = pos < len && bytes[pos] == b'-';
            if pos < len && (bytes[pos] == b'-' || bytes[pos] == b'+') {
                pos += 1;
            }
            let exp_start = pos;
            pos = scan_digits(pos);
            if exp_start == pos {
                return Err(ParseBigNumError::MissingExponent);
            }
            // saturates, the range check happens once the fraction length is known
            exponent = bytes[exp_start..pos]
                .iter()
                .fold(0_i64, |acc, b| acc.saturating_mul(10).saturating_add((b - b'0') as i64));
            if exp_negative {
                exponent = -exponent;
            }
        }

        if pos != len {
            return Err(ParseBigNumError::UnusedCharacters);
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(ParseBigNumError::NoDigits);
        }

        let digits = [int_digits, frac_digits].concat();
        let mut coeff = BigInteger::from_str_radix(&digits, 10)?;
        if negative {
            coeff = -coeff;
        }
        let exp = exponent.saturating_sub(frac_digits.len() as i64);
        let exp = check_exponent(exp, coeff.is_zero()).map_err(|_| ParseBigNumError::ExponentOutOfRange)?;
        Ok(BigDecimal::new(coeff, exp))
    }

    /// [`parse`](Self::parse) discarding the failure reason.
    pub fn try_parse(s: &str) -> Option<BigDecimal> {
        BigDecimal::parse(s).ok()
    }

    pub fn parse_with_context(s: &str, ctx: Context) -> Result<BigDecimal> {
        BigDecimal::parse(s)?.round(ctx)
    }
}

impl FromStr for BigDecimal {
    type Err = ParseBigNumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        BigDecimal::parse(s)
    }
}

// Rendering
impl BigDecimal {
    /// The GDA scientific form: plain notation while the exponent is not positive and the value
    /// is not too small, `d.dddE±n` otherwise.
    pub fn to_scientific_string(&self) -> String {
        let digits = self.coeff.abs().to_string();
        let coeff_len = digits.len();
        let adjusted = self.adjusted_exponent();

        let mut out = String::with_capacity(coeff_len + 16);
        if self.coeff.is_negative() {
            out.push('-');
        }
        if self.exp <= 0 && adjusted >= -6 {
            let num_dec = self.exp.unsigned_abs() as usize;
            if num_dec == 0 {
                out.push_str(&digits);
            } else if num_dec < coeff_len {
                out.push_str(&digits[..coeff_len - num_dec]);
                out.push('.');
                out.push_str(&digits[coeff_len - num_dec..]);
            } else {
                out.push_str("0.");
                out.extend(std::iter::repeat('0').take(num_dec - coeff_len));
                out.push_str(&digits);
            }
        } else {
            out.push_str(&digits[..1]);
            if coeff_len > 1 {
                out.push('.');
                out.push_str(&digits[1..]);
            }
            out.push('E');
            if adjusted >= 0 {
                out.push('+');
            }
            out.push_str(&adjusted.to_string());
        }
        out
    }

    /// Positional notation with no exponent. A zero with a positive exponent renders as `0`.
    pub fn to_plain_string(&self) -> String {
        if self.coeff.is_zero() && self.exp >= 0 {
            return String::from("0");
        }
        let digits = self.coeff.abs().to_string();
        let mut out = String::new();
        if self.coeff.is_negative() {
            out.push('-');
        }
        if self.exp >= 0 {
            out.push_str(&digits);
            out.extend(std::iter::repeat('0').take(self.exp as usize));
            return out;
        }
        let num_dec = self.exp.unsigned_abs() as usize;
        if num_dec < digits.len() {
            let point = digits.len() - num_dec;
            out.push_str(&digits[..point]);
            out.push('.');
            out.push_str(&digits[point..]);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take(num_dec - digits.len()));
            out.push_str(&digits);
        }
        out
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_scientific_string())
    }
}

// Accessors
impl BigDecimal {
    pub fn coefficient(&self) -> &BigInteger {
        &self.coeff
    }

    pub fn exponent(&self) -> i32 {
        self.exp
    }

    /// Digits in the coefficient, one for zero.
    pub fn precision(&self) -> u32 {
        self.coeff.precision()
    }

    /// Exponent of the most significant digit.
    pub fn adjusted_exponent(&self) -> i64 {
        self.exp as i64 + self.precision() as i64 - 1
    }

    pub fn signum(&self) -> i8 {
        self.coeff.signum()
    }

    pub fn is_zero(&self) -> bool {
        self.coeff.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.coeff.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.coeff.is_negative()
    }

    /// Same coefficient and same exponent, so `1.0` is not identical to `1.00`.
    pub fn is_identical(&self, other: &BigDecimal) -> bool {
        self.exp == other.exp && self.coeff == other.coeff
    }

    /// Compares `|self|` with `|other|`.
    pub fn compare_magnitude(&self, other: &BigDecimal) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        // equal leading digit positions keep the alignment within the coefficient lengths
        match self.adjusted_exponent().cmp(&other.adjusted_exponent()) {
            Ordering::Equal => {
                let (x, y, _) = align(self, other);
                x.compare_magnitude(&y)
            }
            ord => ord,
        }
    }
}

impl PartialEq for BigDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BigDecimal {}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.signum().cmp(&other.signum()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        let ord = self.compare_magnitude(other);
        if self.is_negative() { ord.reverse() } else { ord }
    }
}

// Sign handling and rounding
impl BigDecimal {
    pub fn negate(&self) -> BigDecimal {
        BigDecimal::new(-&self.coeff, self.exp)
    }

    /// `|self|` rounded to the context.
    pub fn abs(&self, ctx: Context) -> Result<BigDecimal> {
        finish(self.coeff.abs(), self.exp as i64, ctx)
    }

    /// `self` rounded to the context.
    pub fn plus(&self, ctx: Context) -> Result<BigDecimal> {
        self.round(ctx)
    }

    /// `-self` rounded to the context.
    pub fn minus(&self, ctx: Context) -> Result<BigDecimal> {
        finish(-&self.coeff, self.exp as i64, ctx)
    }

    /// Rounds the coefficient to at most `ctx.precision()` digits. An unbounded context leaves
    /// the value untouched.
    pub fn round(&self, ctx: Context) -> Result<BigDecimal> {
        finish(self.coeff.clone(), self.exp as i64, ctx)
    }

    /// Removes trailing zeros from the coefficient, raising the exponent to match.
    pub fn strip_trailing_zeros(&self) -> BigDecimal {
        self.clone().strip_zeros_to_match_exponent(i64::MAX)
    }

    fn strip_zeros_to_match_exponent(mut self, preferred: i64) -> BigDecimal {
        let ten = &POS_CACHE[10];
        while (self.exp as i64) < preferred
            && self.exp < i32::MAX
            && !self.coeff.is_odd()
            && self.coeff.compare_magnitude(ten) != Ordering::Less
        {
            let (q, r) = self.coeff.div_rem_nonzero(ten);
            if !r.is_zero() {
                break;
            }
            self.coeff = q;
            self.exp += 1;
        }
        self
    }

    /// Same value with exponent `new_exp`, rounding with `mode` when digits are lost.
    pub fn rescale(&self, new_exp: i32, mode: RoundingMode) -> Result<BigDecimal> {
        let delta = self.exp as i64 - new_exp as i64;
        if delta == 0 {
            return Ok(self.clone());
        }
        if self.coeff.is_zero() {
            return Ok(BigDecimal::new(BigInteger::ZERO, new_exp));
        }
        if delta > 0 {
            return Ok(BigDecimal::new(&self.coeff * &ten_pow(delta as u64), new_exp));
        }

        let decrease = delta.unsigned_abs();
        if (self.precision() as u64) < decrease {
            // every digit is discarded and the discarded part is below one half
            trace!(decrease, "rescale discards the whole coefficient");
            let negative = self.is_negative();
            let increment = match mode {
                RoundingMode::Unnecessary => return Err(ArithmeticError::RoundingNecessary),
                RoundingMode::Up => true,
                RoundingMode::Ceiling => !negative,
                RoundingMode::Floor => negative,
                _ => false,
            };
            let coeff = if increment { BigInteger::from(self.signum()) } else { BigInteger::ZERO };
            return Ok(BigDecimal::new(coeff, new_exp));
        }
        let (coeff, _) = rounding_divide(&self.coeff, &ten_pow(decrease), mode)?;
        Ok(BigDecimal::new(coeff, new_exp))
    }

    /// Rescales to the exponent of `other`. Only [`RoundingMode::Unnecessary`] on an inexact
    /// result fails.
    pub fn quantize(&self, other: &BigDecimal, mode: RoundingMode) -> Result<BigDecimal> {
        self.rescale(other.exp, mode)
    }

    /// [`quantize`](Self::quantize) that also fails when the result needs more digits than the
    /// context allows.
    pub fn quantize_with_context(&self, other: &BigDecimal, ctx: Context) -> Result<BigDecimal> {
        // padding adds exactly `delta` digits, so a too-wide result is known before rescaling
        let delta = self.exp as i64 - other.exp as i64;
        if !ctx.is_unbounded()
            && !self.is_zero()
            && delta > 0
            && self.precision() as i64 + delta > ctx.precision() as i64
        {
            return Err(ArithmeticError::InvalidOperation("quantize result exceeds precision"));
        }
        let result = self.rescale(other.exp, ctx.rounding_mode())?;
        if !ctx.is_unbounded() && result.precision() > ctx.precision() {
            return Err(ArithmeticError::InvalidOperation("quantize result exceeds precision"));
        }
        Ok(result)
    }

    pub fn move_point_left(&self, n: i32) -> Result<BigDecimal> {
        let exp = check_exponent(self.exp as i64 - n as i64, self.is_zero())?;
        Ok(BigDecimal::new(self.coeff.clone(), exp))
    }

    pub fn move_point_right(&self, n: i32) -> Result<BigDecimal> {
        let exp = check_exponent(self.exp as i64 + n as i64, self.is_zero())?;
        Ok(BigDecimal::new(self.coeff.clone(), exp))
    }
}

// Addition, subtraction, multiplication
impl BigDecimal {
    fn add_exact(&self, other: &BigDecimal) -> BigDecimal {
        let (x, y, exp) = align(self, other);
        BigDecimal::new(&x + &y, exp)
    }

    pub fn add(&self, other: &BigDecimal, ctx: Context) -> Result<BigDecimal> {
        if ctx.is_unbounded() {
            return Ok(self.add_exact(other));
        }
        let preferred = self.exp.min(other.exp);
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Ok(BigDecimal::new(BigInteger::ZERO, preferred)),
            (true, false) => return other.round_toward_exponent(preferred, ctx),
            (false, true) => return self.round_toward_exponent(preferred, ctx),
            (false, false) => {}
        }

        let (big, small) = if self.exp >= other.exp { (self, other) } else { (other, self) };
        let (x, y, exp) = match BigDecimal::sticky_operand(big, small, ctx) {
            Some(sticky) => align(big, &sticky),
            None => align(big, small),
        };
        finish(&x + &y, exp as i64, ctx)
    }

    /// When `small` lies wholly below the rounding position of the sum, any one-digit value
    /// three places below that position rounds identically and keeps the alignment short.
    fn sticky_operand(big: &BigDecimal, small: &BigDecimal, ctx: Context) -> Option<BigDecimal> {
        let est_ulp = big.exp as i64 + big.precision() as i64 - ctx.precision() as i64;
        let small_high = small.adjusted_exponent();
        if small_high >= big.exp as i64 - 2 || small_high >= est_ulp - 2 {
            return None;
        }
        let exp = i32::try_from((big.exp as i64).min(est_ulp) - 3).ok()?;
        debug!(small_exponent = small.exp, sticky_exponent = exp, "pre-aligning addend");
        Some(BigDecimal::new(BigInteger::from(small.signum()), exp))
    }

    /// Rounds a nonzero value, then pads it toward `preferred` as far as the precision allows.
    fn round_toward_exponent(&self, preferred: i32, ctx: Context) -> Result<BigDecimal> {
        let result = self.round(ctx)?;
        if result.exp <= preferred {
            return Ok(result);
        }
        let spare_digits = ctx.precision() as i64 - result.precision() as i64;
        let exp_diff = result.exp as i64 - preferred as i64;
        let pad = spare_digits.min(exp_diff);
        if pad <= 0 {
            return Ok(result);
        }
        Ok(BigDecimal::new(&result.coeff * &ten_pow(pad as u64), (result.exp as i64 - pad) as i32))
    }

    pub fn subtract(&self, other: &BigDecimal, ctx: Context) -> Result<BigDecimal> {
        self.add(&other.negate(), ctx)
    }

    pub fn multiply(&self, other: &BigDecimal, ctx: Context) -> Result<BigDecimal> {
        let exp = self.exp as i64 + other.exp as i64;
        finish(&self.coeff * &other.coeff, exp, ctx)
    }
}

// Division
impl BigDecimal {
    /// `self / divisor` rounded to the context. With an unbounded context the quotient must
    /// terminate. Exact quotients come back with the exponent closest to
    /// `self.exponent() - divisor.exponent()`.
    pub fn divide(&self, divisor: &BigDecimal, ctx: Context) -> Result<BigDecimal> {
        if divisor.is_zero() {
            return Err(if self.is_zero() {
                ArithmeticError::DivisionUndefined
            } else {
                ArithmeticError::DivisionByZero
            });
        }
        let preferred = self.exp as i64 - divisor.exp as i64;
        if self.is_zero() {
            return Ok(BigDecimal::new(BigInteger::ZERO, clamp_exponent(preferred)));
        }
        if ctx.is_unbounded() {
            return self.divide_exact(divisor, preferred);
        }

        let xprec = self.precision() as i64;
        let yprec = divisor.precision() as i64;
        let mut x = self.coeff.clone();
        let mut y = divisor.coeff.clone();

        // line up the leading digits; keep x'/y' within (0.1, 1]
        let (xtest, ytest) = match xprec.cmp(&yprec) {
            Ordering::Less => (&x.abs() * &ten_pow((yprec - xprec) as u64), y.abs()),
            Ordering::Greater => (x.abs(), &y.abs() * &ten_pow((xprec - yprec) as u64)),
            Ordering::Equal => (x.abs(), y.abs()),
        };
        let mut adjust = 0;
        if ytest < xtest {
            y = &y * &POS_CACHE[10];
            adjust = 1;
        }

        // the integer quotient gets exactly `precision` digits
        let delta = ctx.precision() as i64 - (xprec - yprec);
        match delta.cmp(&0) {
            Ordering::Greater => x = &x * &ten_pow(delta as u64),
            Ordering::Less => y = &y * &ten_pow(delta.unsigned_abs()),
            Ordering::Equal => {}
        }

        let (quotient, exact) = rounding_divide(&x, &y, ctx.rounding_mode())?;
        let result = finish(quotient, preferred - delta + adjust, ctx)?;
        if exact {
            Ok(result.strip_zeros_to_match_exponent(preferred))
        } else {
            Ok(result)
        }
    }

    fn divide_exact(&self, divisor: &BigDecimal, preferred: i64) -> Result<BigDecimal> {
        // a terminating quotient has at most prec(x) + ceil(10 * prec(y) / 3) digits
        let digits = self.precision() as u64 + (10 * divisor.precision() as u64 + 2) / 3;
        let working = Context::new(digits.min(u32::MAX as u64) as u32, RoundingMode::Unnecessary);
        let quotient = match self.divide(divisor, working) {
            Err(ArithmeticError::RoundingNecessary) => {
                debug!(%working, "quotient does not terminate");
                return Err(ArithmeticError::NonTerminatingExpansion);
            }
            other => other?,
        };
        if preferred < quotient.exp as i64 {
            return quotient.rescale(clamp_exponent(preferred), RoundingMode::Unnecessary);
        }
        Ok(quotient)
    }

    /// The integer part of `self / divisor`, truncated, with exponent zero. Fails with
    /// [`ArithmeticError::DivisionImpossible`] when the result needs more digits than a bounded
    /// context allows.
    pub fn divide_integer(&self, divisor: &BigDecimal, ctx: Context) -> Result<BigDecimal> {
        if divisor.is_zero() {
            return Err(if self.is_zero() {
                ArithmeticError::DivisionUndefined
            } else {
                ArithmeticError::DivisionByZero
            });
        }
        if self.compare_magnitude(divisor) == Ordering::Less {
            return Ok(BigDecimal::ZERO);
        }
        // the quotient has either this many digits or one more
        let min_digits = self.adjusted_exponent() - divisor.adjusted_exponent();
        if !ctx.is_unbounded() && min_digits > ctx.precision() as i64 {
            return Err(ArithmeticError::DivisionImpossible);
        }

        let shift = self.exp as i64 - divisor.exp as i64;
        let (x, y) = if shift >= 0 {
            (&self.coeff * &ten_pow(shift as u64), divisor.coeff.clone())
        } else {
            (self.coeff.clone(), &divisor.coeff * &ten_pow(shift.unsigned_abs()))
        };
        let (q, _) = x.div_rem_nonzero(&y);
        if !ctx.is_unbounded() && q.precision() > ctx.precision() {
            return Err(ArithmeticError::DivisionImpossible);
        }
        Ok(BigDecimal::new(q, 0))
    }

    /// Integer quotient and the exact remainder `self - q * divisor`, which takes the sign of
    /// `self`.
    pub fn div_rem(&self, divisor: &BigDecimal, ctx: Context) -> Result<(BigDecimal, BigDecimal)> {
        let q = self.divide_integer(divisor, ctx)?;
        let product = q.multiply(divisor, Context::UNLIMITED)?;
        let r = self.add_exact(&product.negate());
        Ok((q, r))
    }

    pub fn rem(&self, divisor: &BigDecimal, ctx: Context) -> Result<BigDecimal> {
        Ok(self.div_rem(divisor, ctx)?.1)
    }

    /// `self ^ n`, computed exactly and rounded once. A negative `n` takes the reciprocal of the
    /// exact power through [`divide`](Self::divide), so with an unbounded context it only succeeds
    /// when that reciprocal terminates. `x.pow(0)` is one, including for zero.
    pub fn pow(&self, n: i32, ctx: Context) -> Result<BigDecimal> {
        let mag = n.unsigned_abs();
        if mag > MAX_POWER_EXPONENT as u32 {
            return Err(ArithmeticError::InvalidOperation("power exponent out of range"));
        }
        if !ctx.is_unbounded() && BigInteger::word_precision(mag) > ctx.precision() {
            return Err(ArithmeticError::InvalidOperation("power exponent has too many digits"));
        }
        if n == 0 {
            return Ok(BigDecimal::one());
        }

        let exp = check_exponent(self.exp as i64 * mag as i64, self.is_zero())?;
        let exact = BigDecimal::new(self.coeff.pow(mag as i32)?, exp);
        trace!(n, digits = exact.precision(), "exact power");
        if n > 0 {
            exact.round(ctx)
        } else {
            BigDecimal::one().divide(&exact, ctx)
        }
    }
}

// Conversions
impl BigDecimal {
    /// The integer part, truncated toward zero.
    pub fn to_big_integer(&self) -> BigInteger {
        if self.coeff.is_zero() {
            return BigInteger::ZERO;
        }
        if self.exp >= 0 {
            return &self.coeff * &ten_pow(self.exp as u64);
        }
        let drop = self.exp.unsigned_abs() as u64;
        if drop > self.precision() as u64 {
            return BigInteger::ZERO;
        }
        self.coeff.div_rem_nonzero(&ten_pow(drop)).0
    }

    /// Nearest double; values beyond the `f64` range become infinite.
    pub fn to_f64(&self) -> f64 {
        self.to_scientific_string().parse().unwrap_or(f64::NAN)
    }

    /// Succeeds when the value fits a 96-bit mantissa with at most 28 fractional digits.
    #[cfg(feature = "rust_decimal")]
    pub fn to_decimal(&self) -> Option<rust_decimal::Decimal> {
        const MAX_SCALE: i64 = 28;
        let value = if (self.exp as i64) < -MAX_SCALE {
            self.clone().strip_zeros_to_match_exponent(-MAX_SCALE)
        } else {
            self.clone()
        };
        if (value.exp as i64) < -MAX_SCALE {
            return None;
        }
        let integral = if value.exp > 0 { value.to_big_integer() } else { value.coeff.clone() };
        let mut d = integral.as_decimal()?;
        if value.exp < 0 {
            d.set_scale(value.exp.unsigned_abs()).ok()?;
        }
        Some(d)
    }
}

// Exact operators. These stay out of scope so the context-taking `add` is not shadowed.
impl std::ops::Neg for BigDecimal {
    type Output = BigDecimal;

    fn neg(self) -> Self::Output {
        BigDecimal::new(-self.coeff, self.exp)
    }
}

impl std::ops::Neg for &BigDecimal {
    type Output = BigDecimal;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl BigDecimal {
    /// # Panics
    /// When the exponent sum leaves the `i32` range; use [`multiply`](Self::multiply) to get an
    /// error instead.
    fn mul_or_panic(x: &BigDecimal, y: &BigDecimal) -> BigDecimal {
        match x.multiply(y, Context::UNLIMITED) {
            Ok(product) => product,
            Err(e) => panic!("{}", e),
        }
    }

    fn sub_exact(x: &BigDecimal, y: &BigDecimal) -> BigDecimal {
        x.add_exact(&y.negate())
    }
}

macro_rules! impl_exact_op {
    ($trait: ident, $method: ident, $imp: expr) => {
        impl std::ops::$trait<&BigDecimal> for &BigDecimal {
            type Output = BigDecimal;

            fn $method(self, rhs: &BigDecimal) -> Self::Output {
                $imp(self, rhs)
            }
        }

        impl std::ops::$trait for BigDecimal {
            type Output = BigDecimal;

            fn $method(self, rhs: Self) -> Self::Output {
                $imp(&self, &rhs)
            }
        }
    };
}

impl_exact_op!(Add, add, BigDecimal::add_exact);
impl_exact_op!(Sub, sub, BigDecimal::sub_exact);
impl_exact_op!(Mul, mul, BigDecimal::mul_or_panic);

impl num_traits::Zero for BigDecimal {
    fn zero() -> Self {
        BigDecimal::ZERO
    }

    fn is_zero(&self) -> bool {
        self.coeff.is_zero()
    }
}

impl num_traits::One for BigDecimal {
    fn one() -> Self {
        BigDecimal::one()
    }
}

impl num_traits::ToPrimitive for BigDecimal {
    fn to_i64(&self) -> Option<i64> {
        self.to_big_integer().as_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        self.to_big_integer().as_u64()
    }

    fn to_f64(&self) -> Option<f64> {
        Some(BigDecimal::to_f64(self))
    }
}

#[cfg(test)]
fn dec(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

#[cfg(test)]
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('\'')
}

/// Runs one GDA testcase line such as `addx003 add '5.75' '3.3' -> 9.05`.
#[cfg(test)]
fn check_gda(
    line: &str,
    ctx: Context,
    op: impl Fn(&BigDecimal, &BigDecimal, Context) -> Result<BigDecimal>,
) {
    let atoms: Vec<&str> = line.split_whitespace().collect();
    let lhs = dec(strip_quotes(atoms[2]));
    let rhs = dec(strip_quotes(atoms[3]));
    let expected = strip_quotes(atoms[5]);
    let got = op(&lhs, &rhs, ctx).unwrap_or_else(|e| panic!("{}: {}", line, e));
    assert_eq!(got.to_scientific_string(), expected, "{}", line);
}

#[cfg(test)]
fn check_gda_fails(
    line: &str,
    ctx: Context,
    op: impl Fn(&BigDecimal, &BigDecimal, Context) -> Result<BigDecimal>,
) -> ArithmeticError {
    let atoms: Vec<&str> = line.split_whitespace().collect();
    let lhs = dec(strip_quotes(atoms[2]));
    let rhs = dec(strip_quotes(atoms[3]));
    match op(&lhs, &rhs, ctx) {
        Ok(v) => panic!("{}: expected failure, got {}", line, v),
        Err(e) => e,
    }
}

#[cfg(test)]
fn check_parse(s: &str, coeff: &str, exp: i32, precision: u32) {
    let d = dec(s);
    assert_eq!(d.coefficient(), &coeff.parse::<BigInteger>().unwrap(), "{}", s);
    assert_eq!(d.exponent(), exp, "{}", s);
    assert_eq!(d.precision(), precision, "{}", s);
}

#[test]
fn test_parse() {
    check_parse("0", "0", 0, 1);
    check_parse("0000", "0", 0, 1);
    check_parse("00.00", "0", -2, 1);
    check_parse("0.00", "0", -2, 1);
    check_parse("-0", "0", 0, 1);
    check_parse("-0.00", "0", -2, 1);
    check_parse("0E+7", "0", 7, 1);
    check_parse("-0E-7", "0", -7, 1);
    check_parse("01", "1", 0, 1);
    check_parse("123.", "123", 0, 3);
    check_parse("123.00", "12300", -2, 5);
    check_parse("-123.0", "-1230", -1, 4);
    check_parse("12345678912345678.9", "123456789123456789", -1, 18);
    check_parse(".123456789123456789", "123456789123456789", -18, 18);
    check_parse("-.123456789123456789", "-123456789123456789", -18, 18);
    check_parse("1.23E3", "123", 1, 3);
    check_parse("1.23E+3", "123", 1, 3);
    check_parse("12.3E+7", "123", 6, 3);
    check_parse("0.00123", "123", -5, 3);
    check_parse("-1.23E-12", "-123", -14, 3);
    check_parse("1234.5E-4", "12345", -5, 5);
    check_parse("1.000E-20", "1000", -23, 4);
    check_parse("1.00E20", "100", 18, 3);
    check_parse("1e999999999", "1", 999_999_999, 1);
    check_parse("0e-99999999999", "0", i32::MIN, 1);
}

#[test]
fn test_parse_failures() {
    use ParseBigNumError::*;

    assert_eq!(BigDecimal::parse(""), Err(Empty));
    assert_eq!(BigDecimal::parse("+"), Err(NoDigits));
    assert_eq!(BigDecimal::parse("-"), Err(NoDigits));
    assert_eq!(BigDecimal::parse("."), Err(NoDigits));
    assert_eq!(BigDecimal::parse("-.E5"), Err(NoDigits));
    for s in ["0E", "0e", "0E+", "0E-", "0e+", "0e-"] {
        assert_eq!(BigDecimal::parse(s), Err(MissingExponent), "{}", s);
    }
    assert_eq!(BigDecimal::parse("1.2.3"), Err(UnusedCharacters));
    assert_eq!(BigDecimal::parse("12a"), Err(UnusedCharacters));
    assert_eq!(BigDecimal::parse("1e5 "), Err(UnusedCharacters));
    assert_eq!(BigDecimal::parse("--1"), Err(UnusedCharacters));
    assert_eq!(BigDecimal::parse("1e99999999999"), Err(ExponentOutOfRange));
    assert_eq!(BigDecimal::parse("1.5e-2147483648"), Err(ExponentOutOfRange));
    assert!(BigDecimal::try_parse("1e2147483647").is_some());
    assert!(BigDecimal::try_parse("abc").is_none());

    let c = Context::new(3, RoundingMode::Unnecessary);
    assert_eq!(
        BigDecimal::parse_with_context("1.2345", c).unwrap_err(),
        ArithmeticError::RoundingNecessary
    );
    assert_eq!(
        BigDecimal::parse_with_context("1.2x", c).unwrap_err(),
        ArithmeticError::Parse(UnusedCharacters)
    );
    assert!(BigDecimal::parse_with_context("1.2300", c).unwrap().is_identical(&dec("1.23")));
}

#[test]
fn test_to_scientific_string() {
    let check = |coeff: &str, exp: i32, expected: &str| {
        let d = BigDecimal::new(coeff.parse().unwrap(), exp);
        assert_eq!(d.to_scientific_string(), expected);
        assert_eq!(d.to_string(), expected);
    };
    check("123", 0, "123");
    check("-123", 0, "-123");
    check("123", 1, "1.23E+3");
    check("123", 3, "1.23E+5");
    check("123", -1, "12.3");
    check("123", -5, "0.00123");
    check("123", -10, "1.23E-8");
    check("-123", -12, "-1.23E-10");
    check("0", 0, "0");
    check("0", -2, "0.00");
    check("0", 2, "0E+2");
    check("5", -6, "0.000005");
    check("50", -7, "0.0000050");
    check("5", -7, "5E-7");
    check("123456789", -2, "1234567.89");
    check("-123456789", -2, "-1234567.89");
    check("-5", -6, "-0.000005");
}

#[test]
fn test_to_plain_string() {
    assert_eq!(dec("1.23E+3").to_plain_string(), "1230");
    assert_eq!(dec("-1.23E-8").to_plain_string(), "-0.0000000123");
    assert_eq!(dec("0E+5").to_plain_string(), "0");
    assert_eq!(dec("0.00").to_plain_string(), "0.00");
    assert_eq!(dec("12.345").to_plain_string(), "12.345");
}

#[test]
fn test_precision_and_constants() {
    let p = |s: &str, exp: i32| BigDecimal::new(s.parse().unwrap(), exp).precision();
    assert_eq!(p("0", 0), 1);
    assert_eq!(p("-2", 0), 1);
    assert_eq!(p("999999999", 0), 9);
    assert_eq!(p("1000000000", 0), 10);
    assert_eq!(p("123456789123456789", -12), 18);
    assert_eq!(p("123456789123456789", 40), 18);

    assert!(BigDecimal::ZERO.is_identical(&BigDecimal::new(BigInteger::ZERO, 0)));
    assert_eq!(BigDecimal::one().coefficient(), &BigInteger::from(1));
    assert_eq!(BigDecimal::ten().precision(), 2);
    assert_eq!(BigDecimal::ten().exponent(), 0);
}

#[test]
fn test_compare() {
    assert_eq!(dec("1.0"), dec("1.00"));
    assert!(!dec("1.0").is_identical(&dec("1.00")));
    assert_eq!(dec("0E+5"), dec("-0.000"));
    assert!(dec("-1") < dec("0"));
    assert!(dec("0.1") < dec("1E-0"));
    assert!(dec("-2.5") < dec("-2.4999"));
    assert!(dec("1E+999999999") > dec("99999999999999999999"));
    assert!(dec("-1E+999999999") < dec("-1E-999999999"));
    assert_eq!(dec("123.45").cmp(&dec("12345E-2")), Ordering::Equal);
    assert_eq!(dec("-7").compare_magnitude(&dec("6.99")), Ordering::Greater);
}

#[test]
fn test_round() {
    let check = |s: &str, precision: u32, mode: RoundingMode, coeff: i64, exp: i32| {
        let r = dec(s).round(Context::new(precision, mode)).unwrap();
        assert!(r.is_identical(&BigDecimal::new(coeff.into(), exp)), "{} {} {} -> {:?}", s, precision, mode, r);
    };
    use RoundingMode::*;

    for (precision, coeff, exp) in [(1, 1, 2), (2, 12, 1), (3, 123, 0), (4, 1235, -1), (5, 12346, -2), (6, 123456, -3), (7, 123456, -3)] {
        check("123.456", precision, HalfUp, coeff, exp);
    }
    check("123.456", 0, HalfUp, 123456, -3);

    let table: [(&str, [i64; 7]); 10] = [
        ("5.5", [6, 5, 6, 5, 6, 5, 6]),
        ("2.5", [3, 2, 3, 2, 3, 2, 2]),
        ("1.6", [2, 1, 2, 1, 2, 2, 2]),
        ("1.1", [2, 1, 2, 1, 1, 1, 1]),
        ("1.0", [1, 1, 1, 1, 1, 1, 1]),
        ("-1.0", [-1, -1, -1, -1, -1, -1, -1]),
        ("-1.1", [-2, -1, -1, -2, -1, -1, -1]),
        ("-1.6", [-2, -1, -1, -2, -2, -2, -2]),
        ("-2.5", [-3, -2, -2, -3, -3, -2, -2]),
        ("-5.5", [-6, -5, -5, -6, -6, -5, -6]),
    ];
    for (s, expected) in table {
        for (mode, coeff) in [Up, Down, Ceiling, Floor, HalfUp, HalfDown, HalfEven].into_iter().zip(expected) {
            check(s, 1, mode, coeff, 0);
        }
    }
    check("1.0", 1, Unnecessary, 1, 0);
    check("-1.0", 1, Unnecessary, -1, 0);
    assert_eq!(dec("1.1").round(Context::new(1, Unnecessary)), Err(ArithmeticError::RoundingNecessary));

    check("0.19", 3, Floor, 19, -2);
    check(".190909", 3, Floor, 190, -3);
    check("999.9", 3, Up, 100, 1);
    assert_eq!(dec("999.9").round(Context::new(3, Up)).unwrap().to_string(), "1.00E+3");
    check("0.9999", 2, HalfEven, 10, -1);
}

#[test]
fn test_from_f64() {
    let c9hu = Context::new(9, RoundingMode::HalfUp);
    let check = |v: f64, expected: &str| {
        let d = BigDecimal::from_f64_with_context(v, c9hu).unwrap();
        assert_eq!(d.to_scientific_string(), expected, "{}", v);
        if v != 0.0 {
            let d = BigDecimal::from_f64_with_context(-v, c9hu).unwrap();
            assert_eq!(d.to_scientific_string(), format!("-{}", expected), "{}", -v);
        }
    };
    check(0.0, "0");
    check(1.0, "1");
    check(10.0, "10.0000000");
    check(10000000.0, "10000000.0");
    check(100000000.0, "100000000");
    check(1000000000.0, "1.00000000E+9");
    check(1.0E70, "1.00000000E+70");
    check(0.1, "0.100000000");
    check(0.000001, "0.00000100000000");
    check(0.0000001, "1.00000000E-7");
    check(1.0E-70, "1.00000000E-70");
    check(2.0, "2");
    check(1024.0 * 1024.0, "1048576");
    check(1024.0 * 1024.0 * 1024.0, "1.07374182E+9");
    check(1.0 / 2.0, "0.5");
    check(1.0 / 1024.0, "0.0009765625");
    check(1.0 / 8192.0, "0.000122070313");
    check(1.0 / (1024.0 * 1024.0), "9.53674316E-7");
    check(1.234567896, "1.23456790");
    check(12345678.96, "12345679.0");
    check(123456789.6, "123456790");
    check(0.0000001234567891, "1.23456789E-7");

    assert_eq!(
        BigDecimal::try_from(0.1).unwrap().to_string(),
        "0.10000000000000000555111512312578270211815834045410156250"
    );
    assert_eq!(BigDecimal::try_from(-0.0).unwrap(), BigDecimal::ZERO);
    assert!(BigDecimal::try_from(f64::MIN_POSITIVE / 4.0).unwrap().is_positive());
    assert_eq!(BigDecimal::try_from(f64::NAN), Err(ArithmeticError::NotFinite));
    assert_eq!(BigDecimal::try_from(f64::INFINITY), Err(ArithmeticError::NotFinite));
}

#[cfg(feature = "rust_decimal")]
#[test]
fn test_decimal_conversions() {
    use rust_decimal::Decimal;

    let c = Context::new(9, RoundingMode::HalfUp);
    let check = |v: Decimal, expected: &str| {
        let d = BigDecimal::from(v).round(c).unwrap();
        assert_eq!(d.to_scientific_string(), expected, "{}", v);
    };
    check(Decimal::ZERO, "0");
    check(Decimal::ONE, "1");
    check(Decimal::new(100, 0), "100");
    check(Decimal::new(1000000000, 0), "1.00000000E+9");
    check(Decimal::new(1, 1), "0.1");
    check(Decimal::new(1, 7), "1E-7");
    check(Decimal::new(-1234567896, 9), "-1.23456790");
    check(Decimal::MAX, "7.92281625E+28");

    assert_eq!(dec("1.50").to_decimal(), Some(Decimal::new(150, 2)));
    assert_eq!(dec("-12E+3").to_decimal(), Some(Decimal::new(-12000, 0)));
    assert_eq!(dec("1E-30").to_decimal(), None);
    assert_eq!(dec("1.000E-26").to_decimal(), Some(Decimal::new(1, 26)));
    assert_eq!(dec("1E+29").to_decimal(), None);
}

#[test]
fn test_add() {
    let c6hu = Context::new(6, RoundingMode::HalfUp);
    let c9hu = Context::new(9, RoundingMode::HalfUp);
    let c15hu = Context::new(15, RoundingMode::HalfUp);
    let add = |a: &BigDecimal, b: &BigDecimal, c: Context| a.add(b, c);

    for line in [
        "addx001 add 1       1       ->  2",
        "addx003 add '5.75'  '3.3'   ->  9.05",
        "addx004 add '5'     '-3'    ->  2",
        "addx005 add '-5'    '-3'    ->  -8",
        "addx006 add '-7'    '2.5'   ->  -4.5",
        "addx007 add '0.7'   '0.3'   ->  1.0",
        "addx008 add '1.25'  '1.25'  ->  2.50",
        "addx010 add '1.23456789'  '1.00000011' -> '2.23456800'",
        "addx011 add '0.4444444444'  '0.5555555555' -> '1.00000000' Inexact Rounded",
        "addx013 add '0.4444444444'  '0.5555555550' -> '0.999999999' Inexact Rounded",
        "addx014 add '0.44444444449'    '0' -> '0.444444444' Inexact Rounded",
        "addx017 add '0.4444444445000'  '0' -> '0.444444445' Inexact Rounded",
        "addx021 add 0 1 -> 1",
        "addx030 add 9 1 -> 10",
        "addx031 add '0.9998'  '0.0000' -> '0.9998'",
        "addx033 add '0.9998'  '0.0002' -> '1.0000'",
        "addx035 add '70'  '10000e+9' -> '1.00000000E+13' Inexact Rounded",
        "addx037 add '7000'  '10000e+9' -> '1.00000000E+13' Inexact Rounded",
        "addx038 add '70000'  '10000e+9' -> '1.00000001E+13' Inexact Rounded",
        "addx039 add '700000'  '10000e+9' -> '1.00000007E+13' Rounded",
        "addx040 add '10000e+9'  '70' -> '1.00000000E+13' Inexact Rounded",
        "addx044 add '10000e+9'  '70000' -> '1.00000001E+13' Inexact Rounded",
        "addx053 add '12' '7.00' -> '19.00'",
        "addx054 add '1.3' '-1.07' -> '0.23'",
        "addx055 add '1.3' '-1.30' -> '0.00'",
        "addx056 add '1.3' '-2.07' -> '-0.77'",
        "addx057 add '1E+2' '1E+4' -> '1.01E+4'",
    ] {
        check_gda(line, c9hu, add);
    }
    for line in [
        "addx046 add '10000e+9'  '7' -> '10000000000007'",
        "addx050 add '10000e+9'  '70000' -> '10000000070000'",
        "addx052 add '10000e+9'  '7000000' -> '10000007000000'",
    ] {
        check_gda(line, c15hu, add);
    }
    for line in [
        "addx060 add '10000e+9'  '70000' -> '1.00000E+13' Inexact Rounded",
        "addx061 add 1 '0.0001' -> '1.0001'",
        "addx062 add 1 '0.00001' -> '1.00001'",
        "addx063 add 1 '0.000001' -> '1.00000' Inexact Rounded",
    ] {
        check_gda(line, c6hu, add);
    }

    // zero operands move toward the smaller exponent as far as the precision allows
    assert!(dec("1E+2").add(&dec("0"), c9hu).unwrap().is_identical(&dec("100")));
    assert!(dec("0E+3").add(&dec("0E+1"), c9hu).unwrap().is_identical(&dec("0E+1")));
    assert!(dec("1E+12").add(&dec("0"), c9hu).unwrap().is_identical(&dec("1.00000000E+12")));
    assert_eq!(dec("1E+3").add(&dec("-1"), Context::UNLIMITED).unwrap().to_string(), "999");
}

#[test]
fn test_subtract() {
    let c9hu = Context::new(9, RoundingMode::HalfUp);
    let sub = |a: &BigDecimal, b: &BigDecimal, c: Context| a.subtract(b, c);
    for line in [
        "subx001 subtract  0   0  -> '0'",
        "subx002 subtract  1   1  -> '0'",
        "subx003 subtract  1   2  -> '-1'",
        "subx004 subtract  2   1  -> '1'",
        "subx010 subtract  '5.75' '3.3'  -> '2.45'",
        "subx011 subtract  '5'    '-3'   -> '8'",
        "subx012 subtract  '-5'   '-3'   -> '-2'",
        "subx013 subtract  '-7'   '2.5'  -> '-9.5'",
        "subx014 subtract  '0.7'  '0.3'  -> '0.4'",
        "subx016 subtract  '1.3'  '1.30' -> '0.00'",
        "subx020 subtract  '1.00000000' '0.000000001' -> '0.999999999'",
        "subx021 subtract  '1.00000000' '0.0000000001' -> '1.00000000' Inexact Rounded",
        "subx022 subtract  '10000e+9'  '70' -> '1.00000000E+13' Inexact Rounded",
    ] {
        check_gda(line, c9hu, sub);
    }
}

#[test]
fn test_multiply() {
    let c9hu = Context::new(9, RoundingMode::HalfUp);
    let mul = |a: &BigDecimal, b: &BigDecimal, c: Context| a.multiply(b, c);
    for line in [
        "mulx000 multiply 2      2 -> 4",
        "mulx001 multiply 2      3 -> 6",
        "mulx002 multiply 5      1 -> 5",
        "mulx004 multiply '1.20' 2 -> 2.40",
        "mulx005 multiply '1.20' 0 -> 0.00",
        "mulx006 multiply '1.20' -2 -> -2.40",
        "mulx007 multiply '-1.20' 2 -> -2.40",
        "mulx008 multiply '-1.20' 0 -> 0.00",
        "mulx012 multiply '2.50' '4' -> '10.00'",
        "mulx013 multiply '7.0'  '3' -> '21.0'",
        "mulx016 multiply '1.20' '1.2' -> '1.440'",
        "mulx018 multiply '123456789' '1.00000000' -> '123456789'",
        "mulx019 multiply '123456789' '1.000000009' -> '123456790' Inexact Rounded",
        "mulx020 multiply '1.23456789E+10' '2' -> '2.46913578E+10'",
        "mulx021 multiply '1E+2' '1E+3' -> '1E+5'",
        "mulx022 multiply '1E-9' '1E-9' -> '1E-18'",
    ] {
        check_gda(line, c9hu, mul);
    }
    assert_eq!(
        dec("1E+2147483647").multiply(&dec("1E+1"), c9hu),
        Err(ArithmeticError::ExponentOverflow)
    );
    assert_eq!(
        dec("1E-2147483648").multiply(&dec("0.1"), c9hu),
        Err(ArithmeticError::ExponentUnderflow)
    );
    assert_eq!(dec("0E-2147483648").multiply(&dec("0.1"), c9hu).unwrap().exponent(), i32::MIN);
}

#[test]
fn test_divide() {
    let c9hu = Context::new(9, RoundingMode::HalfUp);
    let div = |a: &BigDecimal, b: &BigDecimal, c: Context| a.divide(b, c);
    for line in [
        "divx001 divide  1     1    ->  1",
        "divx003 divide  1     2    ->  0.5",
        "divx005 divide  0     1    ->  0",
        "divx007 divide  1     3    ->  0.333333333 Inexact Rounded",
        "divx008 divide  2     3    ->  0.666666667 Inexact Rounded",
        "divx011 divide  2.4   -1   ->  -2.4",
        "divx013 divide  -2.4  -1   ->  2.4",
        "divx015 divide  2.400 1    ->  2.400",
        "divx017 divide  2.400 2    ->  1.200",
        "divx018 divide  2.    2    ->  1",
        "divx022 divide  50    20     ->  2.5",
        "divx026 divide  5     2.0    ->  2.5",
        "divx028 divide  5     0.20   ->  25",
        "divx032 divide  1000  1      ->  1000",
        "divx033 divide  1000  100    ->  10",
        "divx040 divide  1     64     ->  0.015625",
        "divx044 divide  1    -16     ->  -0.0625",
        "divx050 divide  1     3      ->  0.333333333 Inexact Rounded",
        "divx051 divide  2     3      ->  0.666666667 Inexact Rounded",
        "divx060 divide  12345  4.999  ->  2469.49390 Inexact Rounded",
        "divx061 divide  12345  4.99   ->  2473.94790 Inexact Rounded",
        "divx070 divide  999999999 1  ->  999999999",
        "divx071 divide  999999999.4 1  ->  999999999 Inexact Rounded",
        "divx072 divide  999999999.5 1  ->  1.00000000E+9 Inexact Rounded",
        "divx080 divide  1E+2  1       ->  1E+2",
        "divx081 divide  1     1E+2    ->  0.01",
        "divx082 divide  1E-2  1E+3    ->  0.00001",
        "divx083 divide  0.00  7       ->  0.00",
        "divx084 divide  0E+5  2E+2    ->  0E+3",
    ] {
        check_gda(line, c9hu, div);
    }

    assert_eq!(check_gda_fails("divx090 divide 0 0 -> NaN", c9hu, div), ArithmeticError::DivisionUndefined);
    assert_eq!(check_gda_fails("divx091 divide 1 0 -> Infinity", c9hu, div), ArithmeticError::DivisionByZero);
    assert_eq!(check_gda_fails("divx092 divide 0.0 0 -> NaN", c9hu, div), ArithmeticError::DivisionUndefined);

    let c = Context::new(9, RoundingMode::Unnecessary);
    assert_eq!(dec("1").divide(&dec("3"), c), Err(ArithmeticError::RoundingNecessary));
}

#[test]
fn test_divide_unbounded() {
    let u = Context::UNLIMITED;
    let div = |a: &str, b: &str| dec(a).divide(&dec(b), u);
    assert_eq!(div("1", "3"), Err(ArithmeticError::NonTerminatingExpansion));
    assert_eq!(div("2", "7"), Err(ArithmeticError::NonTerminatingExpansion));
    assert!(div("1", "8").unwrap().is_identical(&dec("0.125")));
    assert!(div("1", "32").unwrap().is_identical(&dec("0.03125")));
    assert!(div("19", "2.000").unwrap().is_identical(&dec("9.5")));
    assert!(div("6E+5", "2").unwrap().is_identical(&dec("3E+5")));
    assert!(div("600", "2").unwrap().is_identical(&dec("300")));
    assert!(div("0", "5E-3").unwrap().is_identical(&dec("0E+3")));
    assert!(div("1.000", "1").unwrap().is_identical(&dec("1.000")));
    assert_eq!(div("0", "0"), Err(ArithmeticError::DivisionUndefined));
    assert_eq!(div("1", "0"), Err(ArithmeticError::DivisionByZero));
}

#[test]
fn test_divide_integer() {
    let c9hu = Context::new(9, RoundingMode::HalfUp);
    let divint = |a: &BigDecimal, b: &BigDecimal, c: Context| a.divide_integer(b, c);
    for line in [
        "dvix001 divideint  1     1    ->  1",
        "dvix003 divideint  1     2    ->  0",
        "dvix005 divideint  0     1    ->  0",
        "dvix008 divideint  2     3    ->  0",
        "dvix010 divideint  2.4   1    ->  2",
        "dvix011 divideint  2.4   -1   ->  -2",
        "dvix012 divideint  -2.4  1    ->  -2",
        "dvix013 divideint  -2.4  -1   ->  2",
        "dvix014 divideint  2.40  1    ->  2",
        "dvix017 divideint  2.400 2    ->  1",
        "dvix018 divideint  2.    2    ->  1",
        "dvix022 divideint  5     2.0    ->  2",
        "dvix024 divideint  5     0.200  ->  25",
        "dvix040 divideint  1     0.3    ->  3",
        "dvix041 divideint  1     0.03   ->  33",
        "dvix042 divideint  1     0.003  ->  333",
        "dvix050 divideint  999999999  1  ->  999999999",
        "dvix051 divideint  999999999.9  1  ->  999999999",
        "dvix052 divideint  1E+8  1  ->  100000000",
        "dvix053 divideint  0.75  0.25  ->  3",
        "dvix054 divideint  -0.75  0.1  ->  -7",
    ] {
        check_gda(line, c9hu, divint);
    }

    for line in [
        "dvix060 divideint  1E+9  1  ->  NaN Division_impossible",
        "dvix061 divideint  1  0.000000001  ->  NaN Division_impossible",
        "dvix062 divideint  1E+400  1E-400  ->  NaN Division_impossible",
        "dvix063 divideint  9999999999  1  ->  NaN Division_impossible",
    ] {
        assert_eq!(check_gda_fails(line, c9hu, divint), ArithmeticError::DivisionImpossible);
    }
    assert_eq!(check_gda_fails("dvix070 divideint 0 0 -> NaN", c9hu, divint), ArithmeticError::DivisionUndefined);
    assert_eq!(check_gda_fails("dvix071 divideint 1 0 -> Infinity", c9hu, divint), ArithmeticError::DivisionByZero);

    let q = dec("1E+20").divide_integer(&dec("3"), Context::UNLIMITED).unwrap();
    assert_eq!(q.to_string(), "33333333333333333333");
}

#[test]
fn test_div_rem() {
    let c9hu = Context::new(9, RoundingMode::HalfUp);
    let check = |a: &str, b: &str, q: &str, r: &str| {
        let (quotient, remainder) = dec(a).div_rem(&dec(b), c9hu).unwrap();
        assert_eq!(quotient.to_string(), q, "{} / {}", a, b);
        assert_eq!(remainder.to_string(), r, "{} % {}", a, b);
        assert_eq!(dec(a).rem(&dec(b), c9hu).unwrap().to_string(), r);
    };
    check("1", "1", "1", "0");
    check("2", "3", "0", "2");
    check("2.4", "1", "2", "0.4");
    check("-2.4", "1", "-2", "-0.4");
    check("2.40", "1", "2", "0.40");
    check("5", "2.000", "2", "1.000");
    check("10", "0.3", "33", "0.1");
    check("-10", "0.3", "-33", "-0.1");
    check("0.75", "0.25", "3", "0.00");
}

#[test]
fn test_quantize() {
    use RoundingMode::*;
    let check = |a: &str, b: &str, mode: RoundingMode, expected: &str| {
        let got = dec(a).quantize(&dec(b), mode).unwrap();
        assert_eq!(got.to_scientific_string(), expected, "{} {} {}", a, b, mode);
    };

    check("0", "1e0", HalfUp, "0");
    check("1", "1e0", HalfUp, "1");
    check("0.1", "1e+2", HalfUp, "0E+2");
    check("0.1", "1e+1", HalfUp, "0E+1");
    check("0.1", "1e0", HalfUp, "0");
    check("0.1", "1e-1", HalfUp, "0.1");
    check("0.1", "1e-3", HalfUp, "0.100");
    check("0.9", "1e+1", HalfUp, "0E+1");
    check("0.9", "1e+0", HalfUp, "1");
    check("0.9", "1e-3", HalfUp, "0.900");

    check("2.17", "0.001", HalfUp, "2.170");
    check("2.17", "0.01", HalfUp, "2.17");
    check("2.17", "0.1", HalfUp, "2.2");
    check("2.17", "1e+0", HalfUp, "2");
    check("2.17", "1e+1", HalfUp, "0E+1");
    check("-0.1", "1", HalfUp, "0");
    check("0", "1e+5", HalfUp, "0E+5");
    check("217", "1e-1", HalfUp, "217.0");
    check("217", "1e+1", HalfUp, "2.2E+2");
    check("217", "1e+2", HalfUp, "2E+2");
    check("+35236450.6", "1e-2", HalfUp, "35236450.60");
    check("-35236450.6", "1e-2", HalfUp, "-35236450.60");

    check("9.9999", "1e-2", HalfUp, "10.00");
    check("1E+10", "1e-2", HalfUp, "10000000000.00");
    check("0.5", "1", HalfEven, "0");
    check("1.5", "1", HalfEven, "2");
    check("-0.5", "1", HalfUp, "-1");
    check("0.01", "1", Up, "1");
    check("0.01", "1", Ceiling, "1");
    check("-0.01", "1", Ceiling, "0");
    check("-0.01", "1", Floor, "-1");
    check("-0.01", "1", Down, "0");
    check("0.001", "1e+5", Up, "1E+5");

    assert_eq!(dec("2.17").quantize(&dec("0.1"), Unnecessary), Err(ArithmeticError::RoundingNecessary));
    assert_eq!(dec("2.1").quantize(&dec("0.001"), Unnecessary).unwrap().to_string(), "2.100");

    let c9 = Context::new(9, HalfUp);
    assert_eq!(
        dec("1E+10").quantize_with_context(&dec("1e-2"), c9),
        Err(ArithmeticError::InvalidOperation("quantize result exceeds precision"))
    );
    assert_eq!(dec("1.23").quantize_with_context(&dec("1e-5"), c9).unwrap().to_string(), "1.23000");
    assert_eq!(
        BigDecimal::one().quantize_with_context(&dec("1E-999999999"), Context::BASIC_DEFAULT),
        Err(ArithmeticError::InvalidOperation("quantize result exceeds precision"))
    );
    assert!(dec("0")
        .quantize_with_context(&dec("1E-999999999"), c9)
        .unwrap()
        .is_identical(&dec("0E-999999999")));
}

#[test]
fn test_zero_with_huge_exponent() {
    let u = Context::UNLIMITED;
    let huge_zero = dec("0E+999999999");
    assert!(BigDecimal::one().add(&huge_zero, u).unwrap().is_identical(&BigDecimal::one()));
    assert!(huge_zero.add(&BigDecimal::one(), u).unwrap().is_identical(&BigDecimal::one()));
    assert!(BigDecimal::one().subtract(&huge_zero, u).unwrap().is_identical(&BigDecimal::one()));
    assert!((&BigDecimal::one() + &huge_zero).is_identical(&BigDecimal::one()));
    assert!((&huge_zero - &BigDecimal::one()).is_identical(&dec("-1")));
    assert!(dec("0E-999999999").add(&huge_zero, u).unwrap().is_identical(&dec("0E-999999999")));

    let tiny = dec("1E-999999999");
    let rem = tiny.rem(&dec("1E+999999999"), Context::BASIC_DEFAULT).unwrap();
    assert!(rem.is_identical(&tiny));
    let (q, r) = tiny.div_rem(&dec("1E+999999999"), u).unwrap();
    assert!(q.is_zero());
    assert!(r.is_identical(&tiny));

    assert_eq!(huge_zero.to_big_integer(), BigInteger::ZERO);
    assert_eq!(dec("-0E+999999999").to_big_integer(), BigInteger::ZERO);
}

#[test]
fn test_abs_plus_minus() {
    let c9hu = Context::new(9, RoundingMode::HalfUp);
    let c3hu = Context::new(3, RoundingMode::HalfUp);
    assert_eq!(dec("-101").abs(c9hu).unwrap().to_string(), "101");
    assert_eq!(dec("-2.00").abs(c9hu).unwrap().to_string(), "2.00");
    assert_eq!(dec("0E+3").abs(c9hu).unwrap().to_string(), "0E+3");
    assert_eq!(dec("-1234567891").abs(c9hu).unwrap().to_string(), "1.23456789E+9");
    assert_eq!(dec("-0.00001235").abs(c3hu).unwrap().to_string(), "0.0000124");
    assert_eq!(dec("1.2345").plus(c3hu).unwrap().to_string(), "1.23");
    assert_eq!(dec("1.2345").minus(c3hu).unwrap().to_string(), "-1.23");
    assert_eq!(dec("-0").minus(c3hu).unwrap().to_string(), "0");
    assert_eq!((-dec("1.5")).to_string(), "-1.5");
    assert_eq!(dec("1.5").negate().negate(), dec("1.5"));
}

#[test]
fn test_pow() {
    let c9he = Context::new(9, RoundingMode::HalfEven);
    let c16he = Context::new(16, RoundingMode::HalfEven);
    let pow = |a: &BigDecimal, b: &BigDecimal, c: Context| a.pow(b.to_big_integer().as_i32().unwrap(), c);

    for line in [
        "powx002 power    '0'  '1'         -> '0'",
        "powx004 power    '1'  '0'         -> '1'",
        "powx012 power    '2'  '2'         -> '4'",
        "powx020 power    '2'  '10'        -> '1024'",
        "powx025 power    '2'  '31'        -> '2147483648'",
        "powx027 power    '2'  '33'        -> '8589934592'",
        "powx030 power    '2'  '64'        -> '1.844674407370955E+19'",
        "powx040 power    '10' '2'         -> '100'",
        "powx041 power    '10' '22'        -> '1.000000000000000E+22'",
        "powx050 power    '6.0' '2'        -> '36.00'",
        "powx051 power    '-2' '3'         -> '-8'",
        "powx052 power    '0.5' '2'        -> '0.25'",
        "powx060 power    '2'  '-1'        -> '0.5'",
        "powx061 power    '2'  '-2'        -> '0.25'",
        "powx062 power    '10' '-8'        -> '1E-8'",
        "powx063 power    '-2' '-3'        -> '-0.125'",
        "powx064 power    '0' '0'          -> '1'",
    ] {
        check_gda(line, c16he, pow);
    }
    for line in [
        "powx100 power    '2'  '31'        -> '2.14748365E+9' Inexact Rounded",
        "powx101 power    '10' '22'        -> '1.00000000E+22' Rounded",
        "powx102 power    '2'  '-16'       -> '0.0000152587891' Inexact Rounded",
        "powx103 power    '3'  '-1'        -> '0.333333333' Inexact Rounded",
        "powx104 power    '1.1' '10'       -> '2.59374246' Inexact Rounded",
    ] {
        check_gda(line, c9he, pow);
    }

    let c3 = Context::new(3, RoundingMode::HalfUp);
    assert_eq!(
        dec("2").pow(1000, c3),
        Err(ArithmeticError::InvalidOperation("power exponent has too many digits"))
    );
    assert_eq!(
        dec("2").pow(1_000_000_000, c16he),
        Err(ArithmeticError::InvalidOperation("power exponent out of range"))
    );
    assert_eq!(dec("0").pow(-2, c16he), Err(ArithmeticError::DivisionByZero));

    let u = Context::UNLIMITED;
    assert_eq!(dec("1.5").pow(3, u).unwrap().to_string(), "3.375");
    assert_eq!(dec("2").pow(-3, u).unwrap().to_string(), "0.125");
    assert_eq!(dec("3").pow(-1, u), Err(ArithmeticError::NonTerminatingExpansion));
}

#[test]
fn test_move_point() {
    let left = |s: &str, n: i32| dec(s).move_point_left(n).unwrap().to_string();
    let right = |s: &str, n: i32| dec(s).move_point_right(n).unwrap().to_string();

    assert_eq!(left("123456789000", 0), "123456789000");
    assert_eq!(left("123456789000", 1), "12345678900.0");
    assert_eq!(left("123456789000", 12), "0.123456789000");
    assert_eq!(left("123456789000", 13), "0.0123456789000");
    assert_eq!(left("123456789000", -1), "1.23456789000E+12");
    assert_eq!(right("123456789000", 1), "1.23456789000E+12");
    assert_eq!(right("123456789000", -1), "12345678900.0");
    assert_eq!(right("0.0123", 2), "1.23");

    assert_eq!(dec("1E+2147483647").move_point_right(1), Err(ArithmeticError::ExponentOverflow));
    assert_eq!(dec("1E-2147483648").move_point_left(1), Err(ArithmeticError::ExponentUnderflow));
    assert_eq!(dec("0E-2147483648").move_point_left(1).unwrap().exponent(), i32::MIN);
}

#[test]
fn test_conversions() {
    use num_traits::{One, ToPrimitive, Zero};

    assert_eq!(dec("123.99").to_big_integer(), BigInteger::from(123));
    assert_eq!(dec("-123.99").to_big_integer(), BigInteger::from(-123));
    assert_eq!(dec("1.5E+3").to_big_integer(), BigInteger::from(1500));
    assert_eq!(dec("1E-50").to_big_integer(), BigInteger::ZERO);
    assert_eq!(dec("12.5").to_f64(), 12.5);
    assert_eq!(dec("-1E+400").to_f64(), f64::NEG_INFINITY);
    assert_eq!(ToPrimitive::to_i64(&dec("-42.9")), Some(-42));
    assert_eq!(ToPrimitive::to_u64(&dec("-42.9")), None);
    assert!(<BigDecimal as Zero>::zero().is_zero());
    assert_eq!(<BigDecimal as One>::one(), dec("1.000"));
    assert_eq!(BigDecimal::from(-7_i64), dec("-7"));
    assert_eq!(BigDecimal::from(BigInteger::from(12)), dec("12"));
    assert_eq!(dec("1.2300").strip_trailing_zeros().to_string(), "1.23");
    assert_eq!(dec("1200").strip_trailing_zeros().to_string(), "1.2E+3");
    assert!(dec("0.000").strip_trailing_zeros().is_identical(&dec("0.000")));
}

#[test]
fn test_exact_operators() {
    assert!((&dec("1.1") + &dec("2.20")).is_identical(&dec("3.30")));
    assert!((dec("1") - dec("0.001")).is_identical(&dec("0.999")));
    assert!((&dec("1.5") * &dec("-0.20")).is_identical(&dec("-0.300")));
    assert!((dec("1E+5") + dec("1E-5")).is_identical(&dec("100000.00001")));
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};

    use super::BigDecimal;
    use crate::context::{Context, RoundingMode};

    fn scientific_string_round_trips(x: BigDecimal) -> bool {
        let reparsed: BigDecimal = x.to_scientific_string().parse().unwrap();
        reparsed.is_identical(&x)
    }

    fn divide_then_multiply_is_close(a: BigDecimal, b: BigDecimal, ctx: Context) -> TestResult {
        if b.is_zero() || a.is_zero() || ctx.rounding_mode() == RoundingMode::Unnecessary {
            return TestResult::discard();
        }
        let q = a.divide(&b, ctx).unwrap();
        let back = q.multiply(&b, Context::UNLIMITED).unwrap();
        // |q*b - a| <= ulp(q) * |b|
        let ulp = BigDecimal::new(1.into(), q.exponent());
        let bound = ulp.multiply(&b, Context::UNLIMITED).unwrap();
        let err = back.subtract(&a, Context::UNLIMITED).unwrap();
        TestResult::from_bool(err.compare_magnitude(&bound).is_le())
    }

    fn round_respects_precision(x: BigDecimal, ctx: Context) -> TestResult {
        if ctx.rounding_mode() == RoundingMode::Unnecessary {
            return TestResult::discard();
        }
        let r = x.round(ctx).unwrap();
        TestResult::from_bool(r.precision() <= ctx.precision())
    }

    fn bounded_add_matches_exact_then_round(a: BigDecimal, b: BigDecimal, ctx: Context) -> TestResult {
        if ctx.rounding_mode() == RoundingMode::Unnecessary || a.is_zero() || b.is_zero() {
            return TestResult::discard();
        }
        let fast = a.add(&b, ctx).unwrap();
        let slow = (&a + &b).round(ctx).unwrap();
        TestResult::from_bool(fast == slow)
    }

    #[test]
    fn properties() {
        quickcheck(scientific_string_round_trips as fn(BigDecimal) -> bool);
        quickcheck(divide_then_multiply_is_close as fn(BigDecimal, BigDecimal, Context) -> TestResult);
        quickcheck(round_respects_precision as fn(BigDecimal, Context) -> TestResult);
        quickcheck(bounded_add_matches_exact_then_round as fn(BigDecimal, BigDecimal, Context) -> TestResult);
    }
}
