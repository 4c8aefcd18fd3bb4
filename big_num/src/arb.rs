use quickcheck::{Arbitrary, Gen};

use crate::big_decimal::BigDecimal;
use crate::big_int::BigInteger;
use crate::context::{Context, RoundingMode};

impl Arbitrary for BigInteger {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = *g.choose(&[0, 1, 1, 2, 3, 5]).unwrap_or(&1);
        let mag: Vec<u32> = (0..len).map(|_| u32::arbitrary(g)).collect();
        let signum = if bool::arbitrary(g) { -1 } else { 1 };
        BigInteger::from_mag(mag, signum)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let signum = self.signum();
        Box::new(
            self.magnitude()
                .to_vec()
                .shrink()
                .map(move |mag| BigInteger::from_mag(mag, signum)),
        )
    }
}

impl Arbitrary for BigDecimal {
    fn arbitrary(g: &mut Gen) -> Self {
        // one or two words keep divisions and alignments quick
        let len = *g.choose(&[0, 1, 1, 2]).unwrap_or(&1);
        let mag: Vec<u32> = (0..len).map(|_| u32::arbitrary(g)).collect();
        let signum = if bool::arbitrary(g) { -1 } else { 1 };
        let exp = i8::arbitrary(g) as i32 % 40;
        BigDecimal::new(BigInteger::from_mag(mag, signum), exp)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let exp = self.exponent();
        Box::new(self.coefficient().shrink().map(move |coeff| BigDecimal::new(coeff, exp)))
    }
}

impl Arbitrary for RoundingMode {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&RoundingMode::ALL).unwrap_or(&RoundingMode::HalfUp)
    }
}

impl Arbitrary for Context {
    fn arbitrary(g: &mut Gen) -> Self {
        let precision = 1 + u32::arbitrary(g) % 40;
        Context::new(precision, RoundingMode::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let mode = self.rounding_mode();
        Box::new(
            (self.precision() - 1)
                .shrink()
                .map(move |p| Context::new(p + 1, mode)),
        )
    }
}
