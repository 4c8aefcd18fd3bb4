//! # BigInteger
//! Immutable arbitrary-precision integers in sign-magnitude form. Bitwise operations behave as if
//! the value were stored in infinite two's-complement notation.
//! # Example
//! ```
//! use big_num::BigInteger;
//!
//! let a: BigInteger = "10000000000000".parse().unwrap();
//! let b: BigInteger = "900000000000".parse().unwrap();
//! println!("a + b = {}", &a + &b);
//! println!("a - b = {}", &a - &b);
//! println!("a * b = {}", &a * &b);
//! println!("a / b = {}", &a / &b);
//! println!("a % b = {}", &a % &b);
//! println!("a << 10 = {}", &a << 10);
//! println!("a >> 10 = {}", &a >> 10);
//! assert_eq!(a.to_string_radix(16).unwrap(), "9184E72A000");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::{
    Add, AddAssign,
    Sub, SubAssign,
    Mul, MulAssign,
    Div, DivAssign,
    Rem, RemAssign,
    Shl, ShlAssign,
    Shr, ShrAssign,
    BitAnd, BitOr, BitXor,
    Neg, Not,
};
use std::str::FromStr;

use tracing::trace;

use crate::big_num_cache::*;
use crate::big_num_constants::*;
use crate::error::{ArithmeticError, ParseBigNumError, Result};

macro_rules! skip_leading_zero {
    ($vec: expr) => {
        {
            let mut v: Vec<u32> = $vec;
            let zeros = v.iter().take_while(|x| **x == 0).count();
            if zeros > 0 {
                v.drain(..zeros);
            }
            v
        }
    };
}

macro_rules! bit_length_u32 {
    ($n: expr) => {
        (32 - $n.leading_zeros()) as u64
    };
}

/// Sign and big-endian magnitude. Zero always has `signum == 0` and an empty magnitude, and a
/// nonzero magnitude never starts with a zero word, so derived equality and hashing are by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInteger {
    signum: i8,
    mag: Vec<u32>,
}

// Construction
impl BigInteger {
    pub const ZERO: BigInteger = BigInteger { signum: 0, mag: Vec::new() };

    /// Caller guarantees the magnitude is already canonical.
    pub(crate) fn new(mag: Vec<u32>, signum: i8) -> Self {
        BigInteger { signum, mag }
    }

    pub(crate) fn from_mag(mag: Vec<u32>, signum: i8) -> Self {
        let mag = skip_leading_zero!(mag);
        if mag.is_empty() {
            BigInteger::ZERO
        } else {
            BigInteger::new(mag, signum)
        }
    }

    /// Builds a value from a sign in `-1..=1` and a big-endian magnitude. Leading zero words are
    /// dropped and an all-zero magnitude yields zero whatever the sign.
    pub fn from_parts(signum: i8, mag: &[u32]) -> Result<Self> {
        if !(-1..=1).contains(&signum) {
            return Err(ArithmeticError::InvalidSign);
        }
        let result = BigInteger::from_mag(mag.to_vec(), signum);
        if signum == 0 && !result.mag.is_empty() {
            return Err(ArithmeticError::ZeroSignOnNonzeroMagnitude);
        }
        Ok(result)
    }

    pub(crate) fn value_of(val: u128, signum: i8) -> BigInteger {
        if val == 0 {
            BigInteger::ZERO
        } else if val <= MAX_CONSTANT as u128 {
            if signum > 0 {
                POS_CACHE[val as usize].clone()
            } else {
                NEG_CACHE[val as usize].clone()
            }
        } else {
            let words = vec![(val >> 96) as u32, (val >> 64) as u32, (val >> 32) as u32, val as u32];
            BigInteger::from_mag(words, signum)
        }
    }
}

macro_rules! impl_unsigned_to_big_num {
    ($($u: ty),*) => {
    $(
    impl From<$u> for BigInteger {
        fn from(val: $u) -> Self {
            BigInteger::value_of(val as u128, 1)
        }
    }
    )*
    };
}

macro_rules! impl_signed_to_big_num {
    ($($i: ty),*) => {
    $(
    impl From<$i> for BigInteger {
        fn from(val: $i) -> Self {
            let signum = if val < 0 { -1 } else { 1 };
            BigInteger::value_of(val.unsigned_abs() as u128, signum)
        }
    }
    )*
    };
}
impl_unsigned_to_big_num!(u8, u16, u32, usize, u64, u128);
impl_signed_to_big_num!(i8, i16, i32, isize, i64, i128);

/// Truncates toward zero. NaN and the infinities have no integer value.
impl TryFrom<f64> for BigInteger {
    type Error = ArithmeticError;

    fn try_from(v: f64) -> Result<Self> {
        if !v.is_finite() {
            return Err(ArithmeticError::NotFinite);
        }
        let bits = v.to_bits();
        let biased_exp = ((bits >> 52) & 0x7ff) as i32;
        if biased_exp == 0 {
            // zero or subnormal, both below one
            return Ok(BigInteger::ZERO);
        }
        let significand = (bits & ((1 << 52) - 1)) | (1 << 52);
        let result = BigInteger::from(significand).shift_left(biased_exp - 1075);
        Ok(if v < 0.0 { -result } else { result })
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for BigInteger {
    /// Truncates any fractional digits.
    fn from(v: rust_decimal::Decimal) -> Self {
        let integral = v.mantissa() / 10_i128.pow(v.scale());
        BigInteger::from(integral)
    }
}

// Accessors
impl BigInteger {
    /// `-1`, `0` or `1`.
    pub fn signum(&self) -> i8 {
        self.signum
    }

    /// The big-endian magnitude words, empty for zero.
    pub fn magnitude(&self) -> &[u32] {
        &self.mag
    }

    pub fn is_zero(&self) -> bool {
        self.signum == 0
    }

    pub fn is_positive(&self) -> bool {
        self.signum > 0
    }

    pub fn is_negative(&self) -> bool {
        self.signum < 0
    }

    pub fn is_odd(&self) -> bool {
        self.mag.last().map_or(false, |w| w & 1 == 1)
    }

    /// Number of bits in the minimal two's-complement form, excluding the sign bit.
    pub fn bit_length(&self) -> u64 {
        let Some(&top) = self.mag.first() else {
            return 0;
        };
        let mag_bit_len = ((self.mag.len() as u64 - 1) << 5) + bit_length_u32!(top);
        let is_pow2 = top.count_ones() == 1 && self.mag[1..].iter().all(|w| *w == 0);
        if self.signum < 0 && is_pow2 {
            mag_bit_len - 1
        } else {
            mag_bit_len
        }
    }

    /// Index of the rightmost one bit, `None` for zero.
    pub fn lowest_set_bit(&self) -> Option<u64> {
        let (i, w) = self.mag.iter().rev().enumerate().find(|(_, w)| **w != 0)?;
        Some(((i as u64) << 5) + w.trailing_zeros() as u64)
    }

    /// Number of decimal digits in `|self|`; zero has one digit.
    pub fn precision(&self) -> u32 {
        if self.mag.is_empty() {
            return 1;
        }
        let mut digits = 0;
        let mut work = self.mag.clone();
        while work.len() > 1 {
            BigInteger::divide_one_word_in_place(&mut work, TEN_POW_9);
            digits += 9;
        }
        digits + BigInteger::word_precision(work[0])
    }

    pub(crate) fn word_precision(mut w: u32) -> u32 {
        let mut digits = 1;
        while w >= 10 {
            w /= 10;
            digits += 1;
        }
        digits
    }
}

// Printing
impl BigInteger {
    /// Renders in `radix` (2 to 36) with uppercase letters for digits above nine.
    pub fn to_string_radix(&self, radix: u32) -> Result<String> {
        if !(MIN_RADIX..=MAX_RADIX).contains(&radix) {
            return Err(ArithmeticError::RadixOutOfRange(radix));
        }
        let digits = self.mag_to_string(radix);
        Ok(if self.signum < 0 { format!("-{}", digits) } else { digits })
    }

    /// Peels off one super-radix digit group per division, least significant first.
    fn mag_to_string(&self, radix: u32) -> String {
        if self.signum == 0 {
            return String::from("0");
        }
        let super_radix = SUPER_RADIX[radix as usize];
        let group_len = DIGITS_PER_WORD[radix as usize];

        let mut groups: Vec<u32> = Vec::with_capacity(self.mag.len() * 2);
        let mut work = self.mag.clone();
        while !work.is_empty() {
            groups.push(BigInteger::divide_one_word_in_place(&mut work, super_radix));
        }

        let mut result = String::with_capacity(groups.len() * group_len);
        let mut group_digits: Vec<char> = Vec::with_capacity(group_len);
        for (i, &group) in groups.iter().rev().enumerate() {
            group_digits.clear();
            let mut w = group;
            while w != 0 {
                group_digits.push(DIGITS[(w % radix) as usize] as char);
                w /= radix;
            }
            // pad every group but the leading one
            if i > 0 {
                result.extend(std::iter::repeat('0').take(group_len - group_digits.len()));
            }
            result.extend(group_digits.iter().rev());
        }
        result
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(self.signum >= 0, "", &self.mag_to_string(10))
    }
}

impl fmt::UpperHex for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(self.signum >= 0, "0x", &self.mag_to_string(16))
    }
}

impl fmt::LowerHex for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(self.signum >= 0, "0x", &self.mag_to_string(16).to_ascii_lowercase())
    }
}

impl fmt::Octal for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(self.signum >= 0, "0o", &self.mag_to_string(8))
    }
}

impl fmt::Binary for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(self.signum >= 0, "0b", &self.mag_to_string(2))
    }
}

// Parsing
impl FromStr for BigInteger {
    type Err = ParseBigNumError;

    fn from_str(val: &str) -> std::result::Result<Self, Self::Err> {
        BigInteger::from_str_radix(val, 10)
    }
}

impl BigInteger {
    /// Parses an optionally signed numeral in `radix`. Letters may be either case.
    pub fn from_str_radix(val: &str, radix: u32) -> std::result::Result<BigInteger, ParseBigNumError> {
        if !(MIN_RADIX..=MAX_RADIX).contains(&radix) {
            return Err(ParseBigNumError::RadixOutOfRange(radix));
        }
        let len = val.len();
        if len == 0 {
            return Err(ParseBigNumError::Empty);
        }

        let mut cursor: usize = 0;
        let mut signum: i8 = 1;
        match (val.rfind('+'), val.rfind('-')) {
            (Some(_), Some(_)) => return Err(ParseBigNumError::MultipleSigns),
            (Some(pos), None) | (None, Some(pos)) if pos > 0 => {
                return Err(ParseBigNumError::EmbeddedSign);
            }
            (Some(_), None) => cursor = 1,
            (None, Some(_)) => {
                signum = -1;
                cursor = 1;
            }
            (None, None) => {}
        }

        if cursor == len {
            return Err(ParseBigNumError::NoDigits);
        }
        if let Some(bad) = val[cursor..].chars().find(|c| c.to_digit(radix).is_none()) {
            return Err(ParseBigNumError::InvalidDigit { digit: bad, radix });
        }

        // every remaining byte is an ASCII digit from here on
        let bytes = val.as_bytes();
        while cursor < len && bytes[cursor] == b'0' {
            cursor += 1;
        }
        if cursor == len {
            return Ok(BigInteger::ZERO);
        }

        let num_digits = len - cursor;
        let num_bits = ((num_digits * BITS_PER_DIGIT[radix as usize]) >> 10) + 1;
        let num_words = (num_bits + 31) >> 5;
        let mut magnitude = vec![0u32; num_words];

        let group_len = DIGITS_PER_WORD[radix as usize];
        let group_value = |group: &[u8]| {
            group.iter().fold(0u32, |acc, b| acc * radix + (*b as char).to_digit(radix).unwrap_or(0))
        };

        let mut first_group_len = num_digits % group_len;
        if first_group_len == 0 {
            first_group_len = group_len;
        }
        magnitude[num_words - 1] = group_value(&bytes[cursor..cursor + first_group_len]);
        cursor += first_group_len;

        let super_radix = SUPER_RADIX[radix as usize];
        while cursor < len {
            let group_val = group_value(&bytes[cursor..cursor + group_len]);
            BigInteger::destructive_mul_add(&mut magnitude, super_radix, group_val);
            cursor += group_len;
        }
        Ok(BigInteger::from_mag(magnitude, signum))
    }

    /// [`from_str_radix`](Self::from_str_radix) discarding the failure reason.
    pub fn try_parse(val: &str, radix: u32) -> Option<BigInteger> {
        BigInteger::from_str_radix(val, radix).ok()
    }

    /// `magnitude = magnitude * factor + addend`, in place.
    fn destructive_mul_add(magnitude: &mut [u32], factor: u32, addend: u32) {
        let mut carry = addend as u64;
        for x in magnitude.iter_mut().rev() {
            let product = factor as u64 * *x as u64 + carry;
            *x = product as u32;
            carry = product >> 32;
        }
    }
}

// Comparison
impl BigInteger {
    fn compare_mag(x: &[u32], y: &[u32]) -> Ordering {
        x.len().cmp(&y.len()).then_with(|| x.cmp(y))
    }

    /// Compares `|self|` with `|other|`.
    pub fn compare_magnitude(&self, other: &BigInteger) -> Ordering {
        BigInteger::compare_mag(&self.mag, &other.mag)
    }
}

impl PartialOrd for BigInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.signum.cmp(&other.signum) {
            Ordering::Equal => {}
            ord => return ord,
        }
        let ord = self.compare_magnitude(other);
        if self.signum > 0 { ord } else { ord.reverse() }
    }
}

// Absolute value and negation
impl BigInteger {
    pub fn abs(&self) -> BigInteger {
        if self.signum < 0 { self.negate() } else { self.clone() }
    }

    pub fn negate(&self) -> BigInteger {
        BigInteger::new(self.mag.clone(), -self.signum)
    }
}

impl Neg for BigInteger {
    type Output = BigInteger;

    fn neg(self) -> Self::Output {
        let BigInteger { signum, mag } = self;
        BigInteger { signum: -signum, mag }
    }
}

impl Neg for &BigInteger {
    type Output = BigInteger;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

// Addition and subtraction
impl BigInteger {
    fn add_signed(x: &BigInteger, y: &BigInteger) -> BigInteger {
        if y.signum == 0 {
            return x.clone();
        }
        if x.signum == 0 {
            return y.clone();
        }
        if x.signum == y.signum {
            return BigInteger::new(BigInteger::add_mag(&x.mag, &y.mag), x.signum);
        }
        match BigInteger::compare_mag(&x.mag, &y.mag) {
            Ordering::Less => BigInteger::from_mag(BigInteger::sub_mag(&y.mag, &x.mag), y.signum),
            Ordering::Equal => BigInteger::ZERO,
            Ordering::Greater => BigInteger::from_mag(BigInteger::sub_mag(&x.mag, &y.mag), x.signum),
        }
    }

    fn sub_signed(x: &BigInteger, y: &BigInteger) -> BigInteger {
        if y.signum == 0 {
            return x.clone();
        }
        if x.signum == 0 {
            return y.negate();
        }
        if x.signum != y.signum {
            return BigInteger::new(BigInteger::add_mag(&x.mag, &y.mag), x.signum);
        }
        match BigInteger::compare_mag(&x.mag, &y.mag) {
            Ordering::Less => BigInteger::from_mag(BigInteger::sub_mag(&y.mag, &x.mag), -x.signum),
            Ordering::Equal => BigInteger::ZERO,
            Ordering::Greater => BigInteger::from_mag(BigInteger::sub_mag(&x.mag, &y.mag), x.signum),
        }
    }

    fn add_mag(x: &[u32], y: &[u32]) -> Vec<u32> {
        let (x, y) = if x.len() < y.len() { (y, x) } else { (x, y) };

        let mut result = vec![0u32; x.len() + 1];
        let mut carry: u64 = 0;
        let mut y_index = y.len();
        for x_index in (0..x.len()).rev() {
            let mut sum = x[x_index] as u64 + carry;
            if y_index > 0 {
                y_index -= 1;
                sum += y[y_index] as u64;
            }
            result[x_index + 1] = sum as u32;
            carry = sum >> 32;
        }
        result[0] = carry as u32;
        skip_leading_zero!(result)
    }

    /// `big - little`, requiring `|big| >= |little|`.
    fn sub_mag(big: &[u32], little: &[u32]) -> Vec<u32> {
        let mut result = vec![0u32; big.len()];
        let mut borrow: i64 = 0;
        let mut little_index = little.len();
        for big_index in (0..big.len()).rev() {
            let mut difference = big[big_index] as i64 - borrow;
            if little_index > 0 {
                little_index -= 1;
                difference -= little[little_index] as i64;
            }
            borrow = if difference < 0 { 1 } else { 0 };
            result[big_index] = (difference + (borrow << 32)) as u32;
        }
        skip_leading_zero!(result)
    }

    fn increment_mag(mag: &mut Vec<u32>) {
        for w in mag.iter_mut().rev() {
            let (sum, overflow) = w.overflowing_add(1);
            *w = sum;
            if !overflow {
                return;
            }
        }
        mag.insert(0, 1);
    }
}

// Multiplication
impl BigInteger {
    fn mul_signed(x: &BigInteger, y: &BigInteger) -> BigInteger {
        if x.signum == 0 || y.signum == 0 {
            return BigInteger::ZERO;
        }
        let signum = x.signum * y.signum;
        let mag = if y.mag.len() == 1 {
            BigInteger::mul_by_word(&x.mag, y.mag[0])
        } else if x.mag.len() == 1 {
            BigInteger::mul_by_word(&y.mag, x.mag[0])
        } else {
            BigInteger::mul_to_len(&x.mag, &y.mag)
        };
        BigInteger::from_mag(mag, signum)
    }

    fn mul_by_word(x: &[u32], y: u32) -> Vec<u32> {
        let mut result = vec![0u32; x.len() + 1];
        let mut carry: u64 = 0;
        for x_index in (0..x.len()).rev() {
            let product = x[x_index] as u64 * y as u64 + carry;
            result[x_index + 1] = product as u32;
            carry = product >> 32;
        }
        result[0] = carry as u32;
        result
    }

    /// Schoolbook product into `x.len() + y.len()` words.
    fn mul_to_len(x: &[u32], y: &[u32]) -> Vec<u32> {
        let mut z = vec![0u32; x.len() + y.len()];
        for x_index in (0..x.len()).rev() {
            let mut carry: u64 = 0;
            for y_index in (0..y.len()).rev() {
                let z_index = x_index + y_index + 1;
                let product = x[x_index] as u64 * y[y_index] as u64 + z[z_index] as u64 + carry;
                z[z_index] = product as u32;
                carry = product >> 32;
            }
            z[x_index] = carry as u32;
        }
        z
    }

    pub fn square(&self) -> BigInteger {
        BigInteger::mul_signed(self, self)
    }
}

// Division
impl BigInteger {
    /// Truncating division: the quotient rounds toward zero and the remainder takes the sign of
    /// the dividend, so `self == divisor * q + r` and `|r| < |divisor|`.
    pub fn div_rem(&self, divisor: &BigInteger) -> Result<(BigInteger, BigInteger)> {
        if divisor.signum == 0 {
            return Err(ArithmeticError::DivideByZero);
        }
        Ok(self.div_rem_nonzero(divisor))
    }

    /// [`div_rem`](Self::div_rem) for a divisor already known to be nonzero. A zero divisor
    /// yields `(0, self)`.
    pub(crate) fn div_rem_nonzero(&self, divisor: &BigInteger) -> (BigInteger, BigInteger) {
        if self.signum == 0 || divisor.signum == 0 {
            return (BigInteger::ZERO, self.clone());
        }
        let (q, r) = BigInteger::div_rem_mag(&self.mag, &divisor.mag);
        (
            BigInteger::from_mag(q, self.signum * divisor.signum),
            BigInteger::from_mag(r, self.signum),
        )
    }

    pub fn divide(&self, divisor: &BigInteger) -> Result<BigInteger> {
        Ok(self.div_rem(divisor)?.0)
    }

    pub fn remainder(&self, divisor: &BigInteger) -> Result<BigInteger> {
        Ok(self.div_rem(divisor)?.1)
    }

    /// Requires a nonzero divisor magnitude.
    fn div_rem_mag(x: &[u32], y: &[u32]) -> (Vec<u32>, Vec<u32>) {
        match BigInteger::compare_mag(x, y) {
            Ordering::Less => (Vec::new(), x.to_vec()),
            Ordering::Equal => (vec![1], Vec::new()),
            Ordering::Greater if y.len() == 1 => {
                let mut q = x.to_vec();
                let r = BigInteger::divide_one_word_in_place(&mut q, y[0]);
                (q, vec![r])
            }
            Ordering::Greater => BigInteger::divide_knuth(x, y),
        }
    }

    /// Knuth "The Art Of Computer Programming" Vol.2 section 4.3.1 exercise 16.
    /// Divides in place and returns the remainder.
    fn divide_one_word_in_place(mag: &mut Vec<u32>, divisor: u32) -> u32 {
        let divisor = divisor as u64;
        let mut r: u64 = 0;
        for w in mag.iter_mut() {
            let sum = (r << 32) | *w as u64;
            *w = (sum / divisor) as u32;
            r = sum % divisor;
        }
        let zeros = mag.iter().take_while(|x| **x == 0).count();
        mag.drain(..zeros);
        r as u32
    }

    /// Algorithm D in Knuth "The Art Of Computer Programming" Vol.2 section 4.3.1.
    /// Requires `v.len() >= 2` and `u > v`.
    fn divide_knuth(u: &[u32], v: &[u32]) -> (Vec<u32>, Vec<u32>) {
        trace!(dividend_words = u.len(), divisor_words = v.len(), "knuth division");
        let n = v.len();
        let m = u.len() - n;

        // D1 normalize: shift until the top divisor word has its high bit set,
        // the dividend gains one leading word to hold the spill
        let shift = v[0].leading_zeros();
        let vn = BigInteger::shl_bits(v, shift);
        let vn = &vn[1..];
        let mut un = BigInteger::shl_bits(u, shift);

        let b: u64 = 1 << 32;
        let v0 = vn[0] as u64;
        let v1 = vn[1] as u64;
        let mut q = vec![0u32; m + 1];
        for j in 0..=m {
            // D3 estimate qhat from the top two words, correct it at most twice
            let num = ((un[j] as u64) << 32) | un[j + 1] as u64;
            let mut qhat = num / v0;
            let mut rhat = num % v0;
            while qhat >= b || qhat * v1 > ((rhat << 32) | un[j + 2] as u64) {
                qhat -= 1;
                rhat += v0;
                if rhat >= b {
                    break;
                }
            }
            // D4 multiply and subtract, D6 add back
            if BigInteger::mul_sub(&mut un[j..=j + n], vn, qhat) {
                qhat -= 1;
                BigInteger::add_back(&mut un[j..=j + n], vn);
            }
            q[j] = qhat as u32;
        }

        // D8 unnormalize the remainder
        let r = BigInteger::shr_bits(&un[m + 1..], shift);
        (q, r)
    }

    /// `u -= qhat * v` where `u` is one word longer than `v`; true when the result went negative.
    fn mul_sub(u: &mut [u32], v: &[u32], qhat: u64) -> bool {
        let mut carry: u64 = 0;
        let mut borrow: i64 = 0;
        for i in (0..v.len()).rev() {
            let product = qhat * v[i] as u64 + carry;
            carry = product >> 32;
            let t = u[i + 1] as i64 - borrow - (product & 0xffff_ffff) as i64;
            u[i + 1] = t as u32;
            borrow = if t < 0 { 1 } else { 0 };
        }
        let t = u[0] as i64 - borrow - carry as i64;
        u[0] = t as u32;
        t < 0
    }

    fn add_back(u: &mut [u32], v: &[u32]) {
        let mut carry: u64 = 0;
        for i in (0..v.len()).rev() {
            let sum = u[i + 1] as u64 + v[i] as u64 + carry;
            u[i + 1] = sum as u32;
            carry = sum >> 32;
        }
        u[0] = u[0].wrapping_add(carry as u32);
    }
}

// Gcd and powers
impl BigInteger {
    /// Greatest common divisor, always non-negative; `gcd(0, x) == |x|`.
    pub fn gcd(&self, other: &BigInteger) -> BigInteger {
        let mut a = self.mag.clone();
        let mut b = other.mag.clone();
        while !b.is_empty() {
            let (_, r) = BigInteger::div_rem_mag(&a, &b);
            a = b;
            b = skip_leading_zero!(r);
        }
        BigInteger::from_mag(a, 1)
    }

    /// `self ^ exp` by repeated squaring. `x.pow(0)` is one, including for zero.
    pub fn pow(&self, exp: i32) -> Result<BigInteger> {
        if exp < 0 {
            return Err(ArithmeticError::NegativeExponent);
        }
        if exp == 0 {
            return Ok(BigInteger::value_of(1, 1));
        }
        if self.signum == 0 {
            return Ok(BigInteger::ZERO);
        }
        let mut exp = exp as u32;
        let mut base = self.clone();
        let mut result = BigInteger::value_of(1, 1);
        loop {
            if exp & 1 == 1 {
                result = &result * &base;
            }
            exp >>= 1;
            if exp == 0 {
                break;
            }
            base = base.square();
        }
        Ok(result)
    }

    /// `(self ^ exponent) % modulus`, reducing after every step. The remainders are truncated,
    /// so a negative base can give a negative result.
    pub fn mod_pow(&self, exponent: &BigInteger, modulus: &BigInteger) -> Result<BigInteger> {
        if exponent.signum < 0 {
            return Err(ArithmeticError::NegativeExponent);
        }
        if modulus.signum == 0 {
            return Err(ArithmeticError::DivideByZero);
        }
        if exponent.signum == 0 {
            return Ok(BigInteger::value_of(1, 1));
        }
        if self.signum == 0 {
            return Ok(BigInteger::ZERO);
        }
        let bits = exponent.bit_length();
        let mut base = self.remainder(modulus)?;
        let mut result = BigInteger::value_of(1, 1);
        for i in 0..bits {
            if exponent.mag_bit(i) {
                result = (&result * &base).remainder(modulus)?;
            }
            if i + 1 < bits {
                base = base.square().remainder(modulus)?;
            }
        }
        Ok(result)
    }

    fn mag_bit(&self, n: u64) -> bool {
        let word = (n >> 5) as usize;
        if word >= self.mag.len() {
            return false;
        }
        (self.mag[self.mag.len() - 1 - word] >> (n & 0x1f)) & 1 == 1
    }
}

// Bitwise operations
impl BigInteger {
    /// `len` words of the two's-complement form, most significant first.
    fn to_twos_complement(&self, len: usize) -> Vec<u32> {
        let mut words = vec![0u32; len];
        let offset = len - self.mag.len();
        words[offset..].copy_from_slice(&self.mag);
        if self.signum < 0 {
            BigInteger::negate_in_place(&mut words);
        }
        words
    }

    fn negate_in_place(words: &mut [u32]) {
        let mut carry: u64 = 1;
        for w in words.iter_mut().rev() {
            let sum = (!*w) as u64 + carry;
            *w = sum as u32;
            carry = sum >> 32;
        }
    }

    fn from_twos_complement(mut words: Vec<u32>) -> BigInteger {
        let negative = words.first().map_or(false, |w| w & 0x8000_0000 != 0);
        if negative {
            BigInteger::negate_in_place(&mut words);
            BigInteger::from_mag(words, -1)
        } else {
            BigInteger::from_mag(words, 1)
        }
    }

    /// One guard word above the longer magnitude keeps the sign bit of both operands.
    fn bitwise(&self, other: &BigInteger, op: impl Fn(u32, u32) -> u32) -> BigInteger {
        let len = self.mag.len().max(other.mag.len()) + 1;
        let x = self.to_twos_complement(len);
        let y = other.to_twos_complement(len);
        let words = x.iter().zip(y.iter()).map(|(a, b)| op(*a, *b)).collect();
        BigInteger::from_twos_complement(words)
    }

    pub fn bit_and(&self, other: &BigInteger) -> BigInteger {
        self.bitwise(other, |a, b| a & b)
    }

    pub fn bit_or(&self, other: &BigInteger) -> BigInteger {
        self.bitwise(other, |a, b| a | b)
    }

    pub fn bit_xor(&self, other: &BigInteger) -> BigInteger {
        self.bitwise(other, |a, b| a ^ b)
    }

    /// `self & !other`.
    pub fn and_not(&self, other: &BigInteger) -> BigInteger {
        self.bitwise(other, |a, b| a & !b)
    }

    /// `!self`, which equals `-self - 1`.
    pub fn ones_complement(&self) -> BigInteger {
        let words = self
            .to_twos_complement(self.mag.len() + 1)
            .into_iter()
            .map(|w| !w)
            .collect();
        BigInteger::from_twos_complement(words)
    }

    /// Word `n`, counted from the least significant end, of the infinite two's-complement form.
    fn twos_complement_word(&self, n: usize) -> u32 {
        let len = self.mag.len();
        if n >= len {
            return if self.signum < 0 { u32::MAX } else { 0 };
        }
        let w = self.mag[len - 1 - n];
        if self.signum >= 0 {
            return w;
        }
        let first_nonzero = self.mag.iter().rev().position(|w| *w != 0).unwrap_or(0);
        match n.cmp(&first_nonzero) {
            Ordering::Less => 0,
            Ordering::Equal => w.wrapping_neg(),
            Ordering::Greater => !w,
        }
    }

    pub fn test_bit(&self, n: i32) -> Result<bool> {
        if n < 0 {
            return Err(ArithmeticError::NegativeBitAddress);
        }
        let n = n as usize;
        Ok((self.twos_complement_word(n >> 5) >> (n & 0x1f)) & 1 == 1)
    }

    pub fn set_bit(&self, n: i32) -> Result<BigInteger> {
        if self.test_bit(n)? {
            Ok(self.clone())
        } else {
            self.flip_bit(n)
        }
    }

    pub fn clear_bit(&self, n: i32) -> Result<BigInteger> {
        if self.test_bit(n)? {
            self.flip_bit(n)
        } else {
            Ok(self.clone())
        }
    }

    pub fn flip_bit(&self, n: i32) -> Result<BigInteger> {
        if n < 0 {
            return Err(ArithmeticError::NegativeBitAddress);
        }
        let bit = BigInteger::value_of(1, 1).shl_impl(n as u64);
        Ok(self.bit_xor(&bit))
    }
}

// Shifts
impl BigInteger {
    /// `self * 2^n`; a negative `n` shifts right instead.
    pub fn shift_left(&self, n: i32) -> BigInteger {
        match n.cmp(&0) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => self.shl_impl(n as u64),
            Ordering::Less => self.shr_impl(n.unsigned_abs() as u64),
        }
    }

    /// `floor(self / 2^n)`; a negative `n` shifts left instead.
    pub fn shift_right(&self, n: i32) -> BigInteger {
        match n.cmp(&0) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => self.shr_impl(n as u64),
            Ordering::Less => self.shl_impl(n.unsigned_abs() as u64),
        }
    }

    fn shl_impl(&self, n: u64) -> BigInteger {
        if self.signum == 0 {
            return BigInteger::ZERO;
        }
        let n_words = (n >> 5) as usize;
        let n_bits = (n & 0x1f) as u32;
        let mut mag = if n_bits == 0 {
            self.mag.clone()
        } else {
            BigInteger::shl_bits(&self.mag, n_bits)
        };
        mag.resize(mag.len() + n_words, 0);
        BigInteger::from_mag(mag, self.signum)
    }

    fn shr_impl(&self, n: u64) -> BigInteger {
        if self.signum == 0 {
            return BigInteger::ZERO;
        }
        let n_words = (n >> 5) as usize;
        let n_bits = (n & 0x1f) as u32;
        let len = self.mag.len();
        if n_words >= len {
            return if self.signum > 0 { BigInteger::ZERO } else { NEG_CACHE[1].clone() };
        }

        let kept = &self.mag[..len - n_words];
        let mut mag = if n_bits == 0 {
            kept.to_vec()
        } else {
            BigInteger::shr_bits(kept, n_bits)
        };

        // negative values round toward negative infinity
        if self.signum < 0 {
            let one_lost = self.mag[len - n_words..].iter().any(|w| *w != 0)
                || (n_bits != 0 && kept[kept.len() - 1] << (32 - n_bits) != 0);
            if one_lost {
                BigInteger::increment_mag(&mut mag);
            }
        }
        BigInteger::from_mag(mag, self.signum)
    }

    /// Shifts left by `shift < 32` bits into a vector one word longer.
    fn shl_bits(mag: &[u32], shift: u32) -> Vec<u32> {
        let mut out = vec![0u32; mag.len() + 1];
        if shift == 0 {
            out[1..].copy_from_slice(mag);
            return out;
        }
        let mut carry = 0u32;
        for i in (0..mag.len()).rev() {
            out[i + 1] = (mag[i] << shift) | carry;
            carry = mag[i] >> (32 - shift);
        }
        out[0] = carry;
        out
    }

    /// Shifts right by `shift < 32` bits, keeping the length.
    fn shr_bits(mag: &[u32], shift: u32) -> Vec<u32> {
        if shift == 0 {
            return mag.to_vec();
        }
        let mut out = vec![0u32; mag.len()];
        let mut carry = 0u32;
        for (i, w) in mag.iter().enumerate() {
            out[i] = (w >> shift) | carry;
            carry = w << (32 - shift);
        }
        out
    }
}

// Narrowing conversions
impl BigInteger {
    fn low_u128(&self) -> Option<u128> {
        if self.mag.len() > 4 {
            return None;
        }
        Some(self.mag.iter().fold(0u128, |acc, w| (acc << 32) | *w as u128))
    }

    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_u64().and_then(|v| u32::try_from(v).ok())
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_u128().and_then(|v| u64::try_from(v).ok())
    }

    pub fn as_i128(&self) -> Option<i128> {
        let m = self.low_u128()?;
        if self.signum >= 0 {
            i128::try_from(m).ok()
        } else if m <= 1 << 127 {
            Some(0i128.wrapping_sub(m as i128))
        } else {
            None
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        if self.signum < 0 {
            return None;
        }
        self.low_u128()
    }

    /// Succeeds when the magnitude fits the 96-bit decimal mantissa.
    #[cfg(feature = "rust_decimal")]
    pub fn as_decimal(&self) -> Option<rust_decimal::Decimal> {
        if self.mag.len() > 3 {
            return None;
        }
        let m = self.low_u128()?;
        Some(rust_decimal::Decimal::from_parts(
            m as u32,
            (m >> 32) as u32,
            (m >> 64) as u32,
            self.signum < 0,
            0,
        ))
    }
}

// Operators
macro_rules! impl_bin_op {
    ($trait: ident, $method: ident, $assign_trait: ident, $assign_method: ident, $imp: expr) => {
        impl $trait<&BigInteger> for &BigInteger {
            type Output = BigInteger;

            fn $method(self, rhs: &BigInteger) -> Self::Output {
                $imp(self, rhs)
            }
        }

        impl $trait for BigInteger {
            type Output = BigInteger;

            fn $method(self, rhs: Self) -> Self::Output {
                $imp(&self, &rhs)
            }
        }

        impl $trait<&BigInteger> for BigInteger {
            type Output = BigInteger;

            fn $method(self, rhs: &BigInteger) -> Self::Output {
                $imp(&self, rhs)
            }
        }

        impl $assign_trait for BigInteger {
            fn $assign_method(&mut self, rhs: Self) {
                *self = $imp(self, &rhs);
            }
        }

        impl $assign_trait<&BigInteger> for BigInteger {
            fn $assign_method(&mut self, rhs: &BigInteger) {
                *self = $imp(self, rhs);
            }
        }
    };
}

impl_bin_op!(Add, add, AddAssign, add_assign, BigInteger::add_signed);
impl_bin_op!(Sub, sub, SubAssign, sub_assign, BigInteger::sub_signed);
impl_bin_op!(Mul, mul, MulAssign, mul_assign, BigInteger::mul_signed);
impl_bin_op!(Div, div, DivAssign, div_assign, BigInteger::div_or_panic);
impl_bin_op!(Rem, rem, RemAssign, rem_assign, BigInteger::rem_or_panic);

impl BigInteger {
    /// # Panics
    /// On a zero divisor, like the primitive integers. Use [`div_rem`](Self::div_rem) to get an
    /// error instead.
    fn div_or_panic(x: &BigInteger, y: &BigInteger) -> BigInteger {
        match x.divide(y) {
            Ok(q) => q,
            Err(e) => panic!("{}", e),
        }
    }

    fn rem_or_panic(x: &BigInteger, y: &BigInteger) -> BigInteger {
        match x.remainder(y) {
            Ok(r) => r,
            Err(e) => panic!("{}", e),
        }
    }
}

impl BitAnd<&BigInteger> for &BigInteger {
    type Output = BigInteger;

    fn bitand(self, rhs: &BigInteger) -> Self::Output {
        self.bit_and(rhs)
    }
}

impl BitOr<&BigInteger> for &BigInteger {
    type Output = BigInteger;

    fn bitor(self, rhs: &BigInteger) -> Self::Output {
        self.bit_or(rhs)
    }
}

impl BitXor<&BigInteger> for &BigInteger {
    type Output = BigInteger;

    fn bitxor(self, rhs: &BigInteger) -> Self::Output {
        self.bit_xor(rhs)
    }
}

impl Not for &BigInteger {
    type Output = BigInteger;

    fn not(self) -> Self::Output {
        self.ones_complement()
    }
}

impl Shl<i32> for BigInteger {
    type Output = BigInteger;

    fn shl(self, n: i32) -> Self::Output {
        self.shift_left(n)
    }
}

impl Shl<i32> for &BigInteger {
    type Output = BigInteger;

    fn shl(self, n: i32) -> Self::Output {
        self.shift_left(n)
    }
}

impl ShlAssign<i32> for BigInteger {
    fn shl_assign(&mut self, n: i32) {
        *self = self.shift_left(n);
    }
}

impl Shr<i32> for BigInteger {
    type Output = BigInteger;

    fn shr(self, n: i32) -> Self::Output {
        self.shift_right(n)
    }
}

impl Shr<i32> for &BigInteger {
    type Output = BigInteger;

    fn shr(self, n: i32) -> Self::Output {
        self.shift_right(n)
    }
}

impl ShrAssign<i32> for BigInteger {
    fn shr_assign(&mut self, n: i32) {
        *self = self.shift_right(n);
    }
}

// num-traits integration
impl num_traits::Zero for BigInteger {
    fn zero() -> Self {
        BigInteger::ZERO
    }

    fn is_zero(&self) -> bool {
        self.signum == 0
    }
}

impl num_traits::One for BigInteger {
    fn one() -> Self {
        BigInteger::value_of(1, 1)
    }
}

impl num_traits::Num for BigInteger {
    type FromStrRadixErr = ParseBigNumError;

    fn from_str_radix(s: &str, radix: u32) -> std::result::Result<Self, ParseBigNumError> {
        BigInteger::from_str_radix(s, radix)
    }
}

impl num_traits::Signed for BigInteger {
    fn abs(&self) -> Self {
        BigInteger::abs(self)
    }

    fn abs_sub(&self, other: &Self) -> Self {
        if self <= other { BigInteger::ZERO } else { self - other }
    }

    fn signum(&self) -> Self {
        BigInteger::value_of(self.signum.unsigned_abs() as u128, self.signum)
    }

    fn is_positive(&self) -> bool {
        self.signum > 0
    }

    fn is_negative(&self) -> bool {
        self.signum < 0
    }
}

impl num_traits::ToPrimitive for BigInteger {
    fn to_i64(&self) -> Option<i64> {
        self.as_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        self.as_u64()
    }

    fn to_i128(&self) -> Option<i128> {
        self.as_i128()
    }

    fn to_u128(&self) -> Option<u128> {
        self.as_u128()
    }

    /// Correctly rounded; values beyond the `f64` range become infinite.
    fn to_f64(&self) -> Option<f64> {
        self.to_string().parse().ok()
    }
}

#[cfg(test)]
fn big(s: &str) -> BigInteger {
    s.parse().unwrap()
}

#[cfg(test)]
fn hex(s: &str) -> BigInteger {
    BigInteger::from_str_radix(s, 16).unwrap()
}

#[test]
fn test_from() {
    let big_num: BigInteger = 12_i8.into();
    assert_eq!(big_num.magnitude(), &[12]);
    assert_eq!(big_num.signum(), 1);

    let big_num = BigInteger::from(-12_i64);
    assert_eq!(big_num.magnitude(), &[12]);
    assert_eq!(big_num.signum(), -1);

    let big_num = BigInteger::from(u64::MAX);
    assert_eq!(big_num.magnitude(), &[u32::MAX, u32::MAX]);

    let big_num = BigInteger::from(i64::MIN);
    assert_eq!(big_num.magnitude(), &[0x8000_0000, 0]);
    assert_eq!(big_num.signum(), -1);

    assert_eq!(BigInteger::from(0_u32), BigInteger::ZERO);
    assert_eq!(BigInteger::from(i128::MIN).as_i128(), Some(i128::MIN));
}

#[test]
fn test_from_parts() {
    assert_eq!(BigInteger::from_parts(0, &[]), Ok(BigInteger::ZERO));
    assert_eq!(BigInteger::from_parts(1, &[0, 0, 5]).unwrap().magnitude(), &[5]);
    assert_eq!(BigInteger::from_parts(-1, &[0, 0]), Ok(BigInteger::ZERO));
    assert_eq!(BigInteger::from_parts(2, &[1]), Err(ArithmeticError::InvalidSign));
    assert_eq!(BigInteger::from_parts(0, &[1]), Err(ArithmeticError::ZeroSignOnNonzeroMagnitude));
}

#[test]
fn test_from_f64() {
    assert_eq!(BigInteger::try_from(0.0), Ok(BigInteger::ZERO));
    assert_eq!(BigInteger::try_from(-0.9), Ok(BigInteger::ZERO));
    assert_eq!(BigInteger::try_from(1.0), Ok(BigInteger::from(1)));
    assert_eq!(BigInteger::try_from(-1.0), Ok(BigInteger::from(-1)));
    assert_eq!(BigInteger::try_from(12345678.123), Ok(BigInteger::from(12345678)));
    assert_eq!(BigInteger::try_from(4294967295.0).unwrap().magnitude(), &[0xFFFF_FFFF]);
    assert_eq!(BigInteger::try_from(4294967296.0).unwrap().magnitude(), &[1, 0]);

    let x = BigInteger::try_from(-1.2345678901234569E+300).unwrap();
    assert_eq!(x.signum(), -1);
    assert_eq!(&x.magnitude()[..3], &[0x1D, 0x7EE8BCBB, 0xD3520000]);
    assert_eq!(x.magnitude().len(), 32);
    assert!(x.magnitude()[3..].iter().all(|w| *w == 0));

    for i in 0..1023 {
        let x = BigInteger::try_from(2.0_f64.powi(i)).unwrap();
        assert_eq!(x, BigInteger::from(1) << i);
    }

    assert_eq!(BigInteger::try_from(f64::INFINITY), Err(ArithmeticError::NotFinite));
    assert_eq!(BigInteger::try_from(f64::NEG_INFINITY), Err(ArithmeticError::NotFinite));
    assert_eq!(BigInteger::try_from(f64::NAN), Err(ArithmeticError::NotFinite));
}

#[cfg(feature = "rust_decimal")]
#[test]
fn test_decimal_conversions() {
    use rust_decimal::Decimal;

    assert_eq!(BigInteger::from(Decimal::ZERO), BigInteger::ZERO);
    assert_eq!(BigInteger::from(Decimal::new(9, 1)), BigInteger::ZERO);
    assert_eq!(BigInteger::from(Decimal::new(28077, 2)), BigInteger::from(280));
    assert_eq!(BigInteger::from(Decimal::MAX).magnitude(), &[u32::MAX, u32::MAX, u32::MAX]);
    assert_eq!(BigInteger::from(Decimal::MIN).signum(), -1);

    assert_eq!(BigInteger::ZERO.as_decimal(), Some(Decimal::ZERO));
    assert_eq!(BigInteger::from(1234).as_decimal(), Some(Decimal::new(1234, 0)));
    assert_eq!(BigInteger::from(-1234).as_decimal(), Some(Decimal::new(-1234, 0)));
    assert_eq!(BigInteger::from(Decimal::MAX).as_decimal(), Some(Decimal::MAX));
    assert_eq!(BigInteger::from(Decimal::MIN).as_decimal(), Some(Decimal::MIN));
    assert_eq!(BigInteger::from_parts(1, &[1, 0, 0, 0]).unwrap().as_decimal(), None);
}

#[test]
fn test_parse() {
    assert_eq!(BigInteger::from_str_radix("0", 10), Ok(BigInteger::ZERO));
    assert_eq!(BigInteger::from_str_radix("-0", 10), Ok(BigInteger::ZERO));
    assert_eq!(BigInteger::from_str_radix("0000", 10), Ok(BigInteger::ZERO));
    assert_eq!(BigInteger::from_str_radix("-0000", 10), Ok(BigInteger::ZERO));

    assert_eq!(hex("100").magnitude(), &[0x100]);
    assert_eq!(BigInteger::from_str_radix("100", 2).unwrap().magnitude(), &[4]);
    assert_eq!(BigInteger::from_str_radix("100", 36).unwrap().magnitude(), &[36 * 36]);

    let x = hex("100000000000000000000");
    assert_eq!(x.signum(), 1);
    assert_eq!(x.magnitude(), &[0x00010000, 0, 0]);

    let x = big("123456789012345678901234567890");
    assert_eq!(x.magnitude(), &[0x1, 0x8ee90ff6, 0xc373e0ee, 0x4e3f0ad2]);
    let x = big("-123456789012345678901234567890");
    assert_eq!(x.signum(), -1);
    assert_eq!(x.magnitude(), &[0x1, 0x8ee90ff6, 0xc373e0ee, 0x4e3f0ad2]);
    let x = big("+123456789012345678901234567890");
    assert_eq!(x.signum(), 1);
    assert_eq!(big("1024000001024000001024").magnitude(), &[0x37, 0x82dacf8b, 0xfb280400]);
}

#[test]
fn test_parse_failures() {
    use ParseBigNumError::*;

    assert_eq!(BigInteger::from_str_radix("1", 1), Err(RadixOutOfRange(1)));
    assert_eq!(BigInteger::from_str_radix("1", 37), Err(RadixOutOfRange(37)));
    assert_eq!(BigInteger::from_str_radix("", 10), Err(Empty));
    assert_eq!(BigInteger::from_str_radix("-", 10), Err(NoDigits));
    assert_eq!(BigInteger::from_str_radix("+", 10), Err(NoDigits));
    assert_eq!(BigInteger::from_str_radix("--", 10), Err(EmbeddedSign));
    assert_eq!(BigInteger::from_str_radix("-123-4", 10), Err(EmbeddedSign));
    assert_eq!(BigInteger::from_str_radix("+-1", 10), Err(MultipleSigns));
    assert_eq!(BigInteger::from_str_radix("12a3", 10), Err(InvalidDigit { digit: 'a', radix: 10 }));
    assert_eq!(BigInteger::from_str_radix("1012", 2), Err(InvalidDigit { digit: '2', radix: 2 }));
    assert_eq!(BigInteger::from_str_radix("1018", 8), Err(InvalidDigit { digit: '8', radix: 8 }));
    assert_eq!(BigInteger::from_str_radix("10G8", 16), Err(InvalidDigit { digit: 'G', radix: 16 }));
    assert!(BigInteger::try_parse("AAAAAAAAAAAAAAAAAAAAAAACabBaGe", 16).is_none());
    assert!(BigInteger::try_parse("12 ", 10).is_none());
    assert!(BigInteger::try_parse("١٢", 10).is_none());
}

#[test]
fn test_to_string() {
    let a = big("12345678909876523784950683472613487560983287654321");
    assert_eq!(a.to_string(), "12345678909876523784950683472613487560983287654321");

    let a = hex("fafcfbffaffaffbffbffbffbffbff");
    assert_eq!(a.to_string_radix(16).unwrap(), "FAFCFBFFAFFAFFBFFBFFBFFBFFBFF");
    assert_eq!(format!("{:x}", a), "fafcfbffaffaffbffbffbffbffbff");

    for radix in MIN_RADIX..=MAX_RADIX {
        assert_eq!(BigInteger::ZERO.to_string_radix(radix).unwrap(), "0");
    }
    assert_eq!(BigInteger::ZERO.to_string_radix(1), Err(ArithmeticError::RadixOutOfRange(1)));
    assert_eq!(BigInteger::ZERO.to_string_radix(37), Err(ArithmeticError::RadixOutOfRange(37)));

    assert_eq!(BigInteger::from(4).to_string_radix(2).unwrap(), "100");
    assert_eq!(BigInteger::from(927).to_string_radix(10).unwrap(), "927");
    assert_eq!(BigInteger::from(0xa20f5).to_string_radix(16).unwrap(), "A20F5");
    assert_eq!(BigInteger::from(23 * 26 * 26 + 12 * 26 + 15).to_string_radix(26).unwrap(), "NCF");

    let x = BigInteger::from_parts(-1, &[0x00FEDCBA, 0x12345678, 0x87654321]).unwrap();
    assert_eq!(x.to_string_radix(16).unwrap(), "-FEDCBA1234567887654321");
    let x = BigInteger::from_parts(1, &[0x1, 0x8ee90ff6, 0xc373e0ee, 0x4e3f0ad2]).unwrap();
    assert_eq!(x.to_string(), "123456789012345678901234567890");
    let x = BigInteger::from_parts(1, &[0x37, 0x82dacf8b, 0xfb280400]).unwrap();
    assert_eq!(x.to_string(), "1024000001024000001024");

    assert_eq!(format!("{:>6}", BigInteger::from(-42)), "   -42");
    assert_eq!(format!("{:#o}", BigInteger::from(8)), "0o10");
    assert_eq!(format!("{:b}", BigInteger::from(-5)), "-101");
}

#[test]
fn test_compare() {
    let zero = BigInteger::ZERO;
    let pos = big("123456789012");
    let neg = big("-123456789012");
    assert_eq!(zero.cmp(&BigInteger::ZERO), Ordering::Equal);
    assert!(neg < pos);
    assert!(neg < zero && zero < pos);
    assert!(big("-1") > big("-4294967296"));
    assert!(big("1") < big("4294967296"));
    let a = BigInteger::from_parts(1, &[1, 2, 3]).unwrap();
    let b = BigInteger::from_parts(1, &[1, 2, 4]).unwrap();
    let c = BigInteger::from_parts(1, &[2, 2, 3]).unwrap();
    assert!(a < b && a < c && b < c);
    assert!(-&a > -&b);
    assert_eq!(a.compare_magnitude(&-&a), Ordering::Equal);
}

#[test]
fn test_add_sub() {
    let a = BigInteger::from_parts(1, &[0xFFFF_FFFF, 0xFFFF_FFFF]).unwrap();
    let one = BigInteger::from(1);
    assert_eq!((&a + &one).magnitude(), &[1, 0, 0]);
    assert_eq!(&(&a + &one) - &one, a);
    assert_eq!(&a - &a, BigInteger::ZERO);
    assert_eq!(&-&a + &a, BigInteger::ZERO);
    assert_eq!(&one - &a, -(&a - &one));
    assert_eq!(&BigInteger::ZERO - &a, -&a);
    assert_eq!(&a - &BigInteger::ZERO, a);

    let x = BigInteger::from_parts(1, &[1, 0, 0]).unwrap();
    assert_eq!((&x - &one).magnitude(), &[0xFFFF_FFFF, 0xFFFF_FFFF]);
    assert_eq!(big("5") + big("-7"), big("-2"));
    assert_eq!(big("-5") + big("7"), big("2"));
    assert_eq!(big("-5") - big("-7"), big("2"));
    assert_eq!(big("-5") - big("7"), big("-12"));

    let mut acc = BigInteger::ZERO;
    acc += &one;
    acc -= big("10");
    assert_eq!(acc, big("-9"));
}

#[test]
fn test_mul() {
    assert_eq!(big("0") * big("123"), BigInteger::ZERO);
    assert_eq!(big("-3") * big("-4"), big("12"));
    assert_eq!(big("3") * big("-4"), big("-12"));
    let a = BigInteger::from_parts(1, &[0xFFFF_FFFF, 0xFFFF_FFFF]).unwrap();
    assert_eq!((&a * &a).magnitude(), &[0xFFFF_FFFF, 0xFFFF_FFFE, 0, 1]);
    assert_eq!(
        big("12345678901234567890") * big("98765432109876543210"),
        big("1219326311370217952237463801111263526900")
    );
}

#[test]
fn test_div() {
    // test divide
    let a = big("120");
    let b = big("13");
    let c = big("9");
    assert_eq!(a / b, c);
    // test divide one word
    let a = big("10000000000000000000000000000000000");
    let b = big("1000");
    let c = big("10000000000000000000000000000000");
    assert_eq!(a / b, c);
    // test divide Knuth
    let a = big("124871287894782164876238905710532895792830741278950327951074309571023759712087492109591287094780219747214567876543245678976547897654367543567654678987654321456789087654325678908765432567890876543245678908765432567890876543876543245678907654356789");
    let b = big("5678987654678976543587654678976546789087657876545678976543256789765432456789234567890854376");
    let c = big("21988300642263136800048566126805476040703295625345756336585704044222781621158596876349726562910906651562104831721609088222205401883168960593370061500432215");
    assert_eq!(a / b, c);
}

#[test]
fn test_div_rem_signs() {
    let (q, r) = big("-7").div_rem(&big("2")).unwrap();
    assert_eq!((q, r), (big("-3"), big("-1")));
    let (q, r) = big("7").div_rem(&big("-2")).unwrap();
    assert_eq!((q, r), (big("-3"), big("1")));
    let (q, r) = big("5").div_rem(&big("12345678901234567890")).unwrap();
    assert_eq!((q, r), (BigInteger::ZERO, big("5")));
    let (q, r) = big("-12345678901234567890").div_rem(&big("12345678901234567890")).unwrap();
    assert_eq!((q, r), (big("-1"), BigInteger::ZERO));
    assert_eq!(BigInteger::ZERO.div_rem(&big("3")), Ok((BigInteger::ZERO, BigInteger::ZERO)));
}

#[test]
fn test_divide_by_zero() {
    let five = BigInteger::from_parts(1, &[5]).unwrap();
    let zero = BigInteger::from_parts(0, &[]).unwrap();
    assert_eq!(five.div_rem(&zero), Err(ArithmeticError::DivideByZero));
    assert_eq!(five.divide(&zero), Err(ArithmeticError::DivideByZero));
}

#[test]
#[should_panic(expected = "Divide by zero")]
fn test_divide_operator_by_zero_panics() {
    let _ = big("5") / BigInteger::ZERO;
}

#[test]
fn test_knuth_add_back() {
    // qhat overestimates by one for these operands, exercising the add back step
    let u = BigInteger::from_parts(1, &[0x7fff_ffff, 0x8000_0000, 0x0000_0000, 0x0000_0000]).unwrap();
    let v = BigInteger::from_parts(1, &[0x8000_0000, 0x0000_0000, 0x0000_0001]).unwrap();
    let (q, r) = u.div_rem(&v).unwrap();
    assert_eq!(&(&q * &v) + &r, u);
    assert!(r.compare_magnitude(&v) == Ordering::Less);
    assert_eq!(q.magnitude(), &[0xffff_fffe]);
}

#[test]
fn test_knuth_examples() {
    for m in 2..5 {
        for n in m + 1..m + 5 {
            let bm = BigInteger::from_parts(1, &vec![0x8765_4321; m]).unwrap();
            let bn = BigInteger::from_parts(1, &vec![0x1234_5678; n]).unwrap();
            let add = &bm - &BigInteger::from(0xabcd);
            let x = &(&bm * &bn) + &add;
            let (q, r) = x.div_rem(&bm).unwrap();
            assert_eq!(r, add);
            assert_eq!(q, bn);
        }
    }
}

#[test]
fn test_mod() {
    let a = big("12");
    let b = big("8");
    let r = big("4");
    assert_eq!(a % b, r);

    let a = big("10000000000000000");
    let b = big("10");
    assert_eq!(a % b, BigInteger::ZERO);

    let a = big("23456789873625348759607098765432345678909876325346546543456453573434839063464369876543245");
    let b = big("526738495607659438721653478560954837265378495607");
    let r = big("393707270751296419349581795408095683999332705291");
    assert_eq!(a % b, r);
}

#[test]
fn test_gcd() {
    assert_eq!(big("12").gcd(&big("18")), big("6"));
    assert_eq!(big("-12").gcd(&big("18")), big("6"));
    assert_eq!(big("12").gcd(&big("-18")), big("6"));
    assert_eq!(BigInteger::ZERO.gcd(&big("-7")), big("7"));
    assert_eq!(big("-7").gcd(&BigInteger::ZERO), big("7"));
    assert_eq!(BigInteger::ZERO.gcd(&BigInteger::ZERO), BigInteger::ZERO);

    let two = big("2");
    let three = big("3");
    let a = &two.pow(500).unwrap() * &three.pow(100).unwrap();
    let b = &two.pow(499).unwrap() * &three.pow(120).unwrap();
    assert_eq!(a.gcd(&b), &two.pow(499).unwrap() * &three.pow(100).unwrap());
}

#[test]
fn test_pow() {
    assert_eq!(big("2").pow(-1), Err(ArithmeticError::NegativeExponent));
    assert_eq!(big("12345").pow(0), Ok(big("1")));
    assert_eq!(BigInteger::ZERO.pow(0), Ok(big("1")));
    assert_eq!(BigInteger::ZERO.pow(5), Ok(BigInteger::ZERO));
    assert_eq!(big("3").pow(5), Ok(big("243")));
    assert_eq!(big("-3").pow(3), Ok(big("-27")));
    assert_eq!(big("2").pow(64), Ok(big("18446744073709551616")));
    assert_eq!(big("10").pow(31), Ok(big("10000000000000000000000000000000")));
}

#[test]
fn test_mod_pow() {
    let m = big("1000000007");
    assert_eq!(big("2").mod_pow(&big("-1"), &m), Err(ArithmeticError::NegativeExponent));
    assert_eq!(big("2").mod_pow(&big("3"), &BigInteger::ZERO), Err(ArithmeticError::DivideByZero));
    assert_eq!(big("2").mod_pow(&BigInteger::ZERO, &m), Ok(big("1")));
    assert_eq!(BigInteger::ZERO.mod_pow(&big("3"), &m), Ok(BigInteger::ZERO));
    assert_eq!(big("3").mod_pow(&big("5"), &big("7")), Ok(big("5")));
    assert_eq!(big("2").mod_pow(&big("64"), &big("1000")), Ok(big("616")));
    assert_eq!(big("-2").mod_pow(&big("3"), &big("5")), Ok(big("-3")));
    let x = big("123456789123456789");
    assert_eq!(x.mod_pow(&big("37"), &m), Ok(&x.pow(37).unwrap() % &m));
    assert_eq!(x.mod_pow(&big("37"), &m), Ok(big("241591323")));
}

#[test]
fn test_bitwise() {
    let x = hex("ACACACACCACACACAACACACACCACACACA");
    let y = hex("ACACACACCACACACA00000000");
    let (nx, ny) = (-&x, -&y);

    assert_eq!(&x & &y, hex("888888888888888800000000"));
    assert_eq!(&x | &y, hex("ACACACACEEEEEEEEEEEEEEEECACACACA"));
    assert_eq!(&x ^ &y, hex("ACACACAC6666666666666666CACACACA"));
    assert_eq!(x.and_not(&y), hex("ACACACAC4242424224242424CACACACA"));

    assert_eq!(&x & &ny, hex("ACACACAC424242422424242400000000"));
    assert_eq!(&x | &ny, hex("-242424244242424135353536"));
    assert_eq!(&x ^ &ny, hex("-ACACACAC666666666666666535353536"));
    assert_eq!(x.and_not(&ny), hex("8888888888888888CACACACA"));

    assert_eq!(&nx & &y, hex("242424244242424200000000"));
    assert_eq!(&nx | &y, hex("-ACACACAC4242424224242424CACACACA"));
    assert_eq!(&nx ^ &y, hex("-ACACACAC6666666666666666CACACACA"));
    assert_eq!(nx.and_not(&y), hex("-ACACACACEEEEEEEEEEEEEEEECACACACA"));

    assert_eq!(&nx & &ny, hex("-ACACACACEEEEEEEEEEEEEEEE00000000"));
    assert_eq!(&nx | &ny, hex("-8888888888888888CACACACA"));
    assert_eq!(&nx ^ &ny, hex("ACACACAC666666666666666535353536"));
    assert_eq!(nx.and_not(&ny), hex("242424244242424135353536"));

    assert_eq!(!&x, hex("-ACACACACCACACACAACACACACCACACACB"));
    assert_eq!(!&nx, hex("ACACACACCACACACAACACACACCACACAC9"));
    assert_eq!(!&BigInteger::ZERO, big("-1"));
    assert_eq!(!&big("-1"), BigInteger::ZERO);
    assert_eq!(&big("-1") & &x, x);
    assert_eq!(&BigInteger::ZERO | &nx, nx);
}

#[test]
fn test_single_bit() {
    let x = BigInteger::from_parts(1, &[0xAAAAAAAA, 0xAAAAAAAA]).unwrap();
    for i in 0..64 {
        assert_eq!(x.test_bit(i), Ok(i % 2 != 0));
    }
    assert_eq!(x.test_bit(1000), Ok(false));

    let nx = -&x;
    assert_eq!(nx.test_bit(0), Ok(false));
    assert_eq!(nx.test_bit(1), Ok(true));
    for i in 2..64 {
        assert_eq!(nx.test_bit(i), Ok(i % 2 == 0));
    }
    assert_eq!(nx.test_bit(1000), Ok(true));
    assert_eq!(x.test_bit(-1), Err(ArithmeticError::NegativeBitAddress));

    let p = hex("FFFF0000FFFF0000");
    let np = -&p;
    assert_eq!(p.set_bit(56), Ok(p.clone()));
    assert_eq!(p.set_bit(39), Ok(hex("FFFF0080FFFF0000")));
    assert_eq!(p.set_bit(99).unwrap().magnitude(), &[8, 0, 0xFFFF0000, 0xFFFF0000]);
    assert_eq!(np.set_bit(39), Ok(np.clone()));
    assert_eq!(np.set_bit(56), Ok(hex("-FEFF0000FFFF0000")));
    assert_eq!(np.set_bit(99), Ok(np.clone()));

    assert_eq!(p.clear_bit(56), Ok(hex("FEFF0000FFFF0000")));
    assert_eq!(p.clear_bit(39), Ok(p.clone()));
    assert_eq!(p.clear_bit(99), Ok(p.clone()));
    assert_eq!(np.clear_bit(39), Ok(hex("-FFFF0080FFFF0000")));
    assert_eq!(np.clear_bit(56), Ok(np.clone()));
    assert_eq!(np.clear_bit(100), Ok(hex("-1000000000FFFF0000FFFF0000")));

    assert_eq!(p.flip_bit(99), Ok(hex("800000000FFFF0000FFFF0000")));
    assert_eq!(np.flip_bit(99), Ok(hex("-800000000FFFF0000FFFF0000")));
    assert_eq!(p.flip_bit(-3), Err(ArithmeticError::NegativeBitAddress));
}

#[test]
fn test_shift() {
    let digits = [0xC1F0F1CD_u32, 0xB38F4F83, 0x01234678];
    let x = BigInteger::from_parts(1, &digits).unwrap();
    let nx = -&x;

    assert_eq!(BigInteger::ZERO.shift_left(10), BigInteger::ZERO);
    assert_eq!(x.shift_left(0), x);
    assert_eq!(x.shift_left(-7), x.shift_right(7));
    assert_eq!(x.shift_right(-7), x.shift_left(7));
    assert_eq!(x.shift_left(64).magnitude(), &[0xC1F0F1CD, 0xB38F4F83, 0x01234678, 0, 0]);
    assert_eq!(nx.shift_left(64).signum(), -1);
    assert_eq!(x.shift_left(7), hex("60F878E6D9C7A7C18091A33C00"));

    assert_eq!(x.shift_right(64).magnitude(), &[0xC1F0F1CD]);
    assert_eq!(x.shift_right(7), hex("183E1E39B671E9F0602468C"));
    assert_eq!(x.shift_right(39), hex("183E1E39B671E9F"));

    // arithmetic shift rounds negative values toward negative infinity
    assert_eq!(nx.shift_right(7), hex("-183E1E39B671E9F0602468D"));
    assert_eq!(nx.shift_right(39), hex("-183E1E39B671EA0"));
    assert_eq!(nx.shift_right(96), big("-1"));
    assert_eq!(nx.shift_right(200), big("-1"));
    assert_eq!(x.shift_right(96), BigInteger::ZERO);
    assert_eq!(big("-4").shift_right(1), big("-2"));
    assert_eq!(big("-4294967296").shift_right(32), big("-1"));
    assert_eq!(big("1").shift_left(i32::MIN), BigInteger::ZERO);
    assert_eq!(big("-1").shift_left(i32::MIN), big("-1"));

    let mut y = x.clone();
    y <<= 3;
    y >>= 3;
    assert_eq!(y, x);
}

#[test]
fn test_precision() {
    for i in -9..=9 {
        assert_eq!(BigInteger::from(i).precision(), 1);
    }
    for v in [-99, -50, -11, -10, 10, 11, 50, 99] {
        assert_eq!(BigInteger::from(v).precision(), 2);
    }
    for v in [-999, -509, -101, -100, 100, 101, 500, 999] {
        assert_eq!(BigInteger::from(v).precision(), 3);
    }
    let mut nines = String::new();
    let mut ten_pow = String::from("1");
    for i in 1..30 {
        nines.push('9');
        ten_pow.push('0');
        assert_eq!(big(&nines).precision(), i);
        assert_eq!(big(&ten_pow).precision(), i + 1);
    }
    assert_eq!(BigInteger::from_parts(1, &[0xFFFF_FFFF]).unwrap().precision(), 10);
    assert_eq!(BigInteger::from_parts(1, &[1, 0]).unwrap().precision(), 10);
}

#[test]
fn test_narrowing() {
    let p = |s: i8, m: &[u32]| BigInteger::from_parts(s, m).unwrap();

    assert_eq!(BigInteger::ZERO.as_i32(), Some(0));
    assert_eq!(p(-1, &[0x80000001]).as_i32(), None);
    assert_eq!(p(1, &[0x80000000]).as_i32(), None);
    assert_eq!(p(-1, &[0x80000000]).as_i32(), Some(i32::MIN));
    assert_eq!(big("-100").as_i32(), Some(-100));
    assert_eq!(p(1, &[1, 0]).as_i32(), None);

    assert_eq!(p(-1, &[0x80000001]).as_i64(), Some(i32::MIN as i64 - 1));
    assert_eq!(p(1, &[0x80000000]).as_i64(), Some(0x80000000));
    assert_eq!(p(-1, &[0x80000000, 1]).as_i64(), None);
    assert_eq!(p(1, &[0x80000000, 0]).as_i64(), None);
    assert_eq!(p(-1, &[0x80000000, 0]).as_i64(), Some(i64::MIN));
    assert_eq!(big("-123456789123456").as_i64(), Some(-123456789123456));
    assert_eq!(p(1, &[1, 0, 0]).as_i64(), None);

    assert_eq!(big("-1").as_u32(), None);
    assert_eq!(BigInteger::ZERO.as_u32(), Some(0));
    assert_eq!(p(1, &[0xFFFFFFFF]).as_u32(), Some(u32::MAX));
    assert_eq!(p(1, &[1, 0]).as_u32(), None);

    assert_eq!(big("-1").as_u64(), None);
    assert_eq!(p(1, &[0xFFFFFFFF, 0xFFFFFFFF]).as_u64(), Some(u64::MAX));
    assert_eq!(p(1, &[1, 0, 0]).as_u64(), None);
}

#[test]
fn test_bit_length_and_lowest_set_bit() {
    assert_eq!(BigInteger::ZERO.bit_length(), 0);
    assert_eq!(big("1").bit_length(), 1);
    assert_eq!(big("255").bit_length(), 8);
    assert_eq!(big("-256").bit_length(), 8);
    assert_eq!(big("-257").bit_length(), 9);
    assert_eq!(big("4294967296").bit_length(), 33);

    assert_eq!(BigInteger::ZERO.lowest_set_bit(), None);
    assert_eq!(big("12").lowest_set_bit(), Some(2));
    assert_eq!(big("-4294967296").lowest_set_bit(), Some(32));
}

#[test]
fn test_num_traits() {
    use num_traits::{Num, One, Signed, ToPrimitive, Zero};

    assert!(<BigInteger as Zero>::zero().is_zero());
    assert_eq!(<BigInteger as One>::one(), big("1"));
    assert_eq!(<BigInteger as Num>::from_str_radix("-ff", 16), Ok(big("-255")));
    assert_eq!(Signed::signum(&big("-42")), big("-1"));
    assert_eq!(Signed::abs_sub(&big("3"), &big("5")), BigInteger::ZERO);
    assert_eq!(Signed::abs_sub(&big("5"), &big("3")), big("2"));
    assert_eq!(big("12345678901234567890").to_u64(), Some(12345678901234567890));
    assert_eq!(big("-2").to_u64(), None);
    assert_eq!(big("123456789").to_f64(), Some(123456789.0));
    assert_eq!(big("-1").pow(2).unwrap().to_f64(), Some(1.0));
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};

    use super::BigInteger;

    quickcheck! {
        fn gcd_divides_both(a: BigInteger, b: BigInteger) -> TestResult {
            if a.is_zero() && b.is_zero() {
                return TestResult::discard();
            }
            let g = a.gcd(&b);
            let (qa, ra) = a.div_rem(&g).unwrap();
            let (qb, rb) = b.div_rem(&g).unwrap();
            TestResult::from_bool(
                g.is_positive() && ra.is_zero() && rb.is_zero() && qa.gcd(&qb) == BigInteger::from(1)
            )
        }

        fn div_rem_contract(a: BigInteger, b: BigInteger) -> TestResult {
            if b.is_zero() {
                return TestResult::discard();
            }
            let (q, r) = a.div_rem(&b).unwrap();
            let sign_ok = r.is_zero() || r.signum() == a.signum();
            TestResult::from_bool(
                &(&q * &b) + &r == a && r.compare_magnitude(&b).is_lt() && sign_ok
            )
        }

        fn flip_twice_is_identity(x: BigInteger, i: u16) -> bool {
            let i = i as i32;
            x.flip_bit(i).unwrap().flip_bit(i).unwrap() == x
        }

        fn set_then_test(x: BigInteger, i: u16) -> bool {
            let i = i as i32;
            x.set_bit(i).unwrap().test_bit(i).unwrap()
                && !x.clear_bit(i).unwrap().test_bit(i).unwrap()
        }

        fn shift_symmetry(x: BigInteger, n: i16) -> bool {
            let n = n as i32;
            x.shift_left(n) == x.shift_right(-n)
        }

        fn shift_right_is_floor_division(x: BigInteger, n: u8) -> bool {
            let d = BigInteger::from(1).shift_left(n as i32);
            let (q, r) = x.div_rem(&d).unwrap();
            let floor = if r.is_negative() { &q - &BigInteger::from(1) } else { q };
            x.shift_right(n as i32) == floor
        }

        fn not_is_neg_minus_one(x: BigInteger) -> bool {
            x.ones_complement() == &(-&x) - &BigInteger::from(1)
        }

        fn precision_counts_digits(x: BigInteger) -> bool {
            let digits = x.abs().to_string().len() as u32;
            x.precision() == digits
        }

        fn radix_round_trip(x: BigInteger, radix: u8) -> bool {
            let radix = 2 + (radix as u32) % 35;
            let s = x.to_string_radix(radix).unwrap();
            BigInteger::from_str_radix(&s, radix) == Ok(x)
        }
    }
}
