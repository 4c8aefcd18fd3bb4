use lazy_static::*;

use crate::big_decimal::BigDecimal;
use crate::big_int::BigInteger;
use crate::big_num_constants::*;

lazy_static! {
    pub static ref POS_CACHE: Vec<BigInteger> = (0..=MAX_CONSTANT as u32)
        .map(|v| BigInteger::from_mag(vec![v], 1))
        .collect();
    pub static ref NEG_CACHE: Vec<BigInteger> = (0..=MAX_CONSTANT as u32)
        .map(|v| BigInteger::from_mag(vec![v], -1))
        .collect();
    /// `10^0` through `10^MAX_CACHED_POWER_OF_TEN`.
    pub static ref POWERS_OF_TEN: Vec<BigInteger> = (0..=MAX_CACHED_POWER_OF_TEN as u32)
        .map(|n| BigInteger::from(10_u128.pow(n)))
        .collect();
    pub static ref DECIMAL_ONE: BigDecimal = BigDecimal::new(BigInteger::from(1), 0);
    pub static ref DECIMAL_TEN: BigDecimal = BigDecimal::new(BigInteger::from(10), 0);
}

/// `10^n`, from the cache when small enough.
pub fn ten_pow(mut n: u64) -> BigInteger {
    if n <= MAX_CACHED_POWER_OF_TEN as u64 {
        return POWERS_OF_TEN[n as usize].clone();
    }
    let mut result = POWERS_OF_TEN[0].clone();
    let mut base = POWERS_OF_TEN[1].clone();
    loop {
        if n & 1 == 1 {
            result = &result * &base;
        }
        n >>= 1;
        if n == 0 {
            return result;
        }
        base = base.square();
    }
}

#[test]
fn test_caches() {
    assert!(POS_CACHE[0].is_zero());
    assert!(NEG_CACHE[0].is_zero());
    assert_eq!(POS_CACHE[16].magnitude(), &[16]);
    assert_eq!(NEG_CACHE[7].signum(), -1);
    assert_eq!(ten_pow(0), BigInteger::from(1));
    assert_eq!(ten_pow(27).to_string(), format!("1{}", "0".repeat(27)));
    assert_eq!(ten_pow(60).to_string(), format!("1{}", "0".repeat(60)));
}
