pub const DIGITS: [u8; 36] = *b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const MIN_RADIX: u32 = 2;

pub const MAX_RADIX: u32 = 36;

/// Number of radix digits that always fit in one `u32` word.
pub const DIGITS_PER_WORD: [usize; 37] = [
    0, 0,
    31, 20, 15, 13, 12, 11, 10, 10, 9, 9, 8, 8, 8, 8, 7, 7, 7, 7,
    7, 7, 7, 7, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6
];

/// `radix ^ DIGITS_PER_WORD[radix]`, the base used when converting a group of digits at a time.
pub const SUPER_RADIX: [u32; 37] = [
    0, 0,
    0x80000000, 0xCFD41B91, 0x40000000, 0x48C27395, 0x81BF1000,
    0x75DB9C97, 0x40000000, 0xCFD41B91, 0x3B9ACA00, 0x8C8B6D2B,
    0x19A10000, 0x309F1021, 0x57F6C100, 0x98C29B81, 0x10000000,
    0x18754571, 0x247DBC80, 0x3547667B, 0x4C4B4000, 0x6B5A6E1D,
    0x94ACE180, 0xCAF18367, 0x0B640000, 0x0E8D4A51, 0x1269AE40,
    0x17179149, 0x1CB91000, 0x23744899, 0x2B73A840, 0x34E63B41,
    0x40000000, 0x4CFA3CC1, 0x5C13D840, 0x6D91B519, 0x81BF1000
];

/// `log2(radix) * 1024`, rounded up, used to size a magnitude before parsing.
pub const BITS_PER_DIGIT: [usize; 37] = [
    0, 0,
    1024, 1624, 2048, 2378, 2648, 2875, 3072, 3247, 3402, 3543, 3672,
    3790, 3899, 4001, 4096, 4186, 4271, 4350, 4426, 4498, 4567, 4633,
    4696, 4756, 4814, 4870, 4923, 4975, 5025, 5074, 5120, 5166, 5210,
    5253, 5295
];

pub const MAX_CONSTANT: usize = 16;

/// `10^9`, the largest power of ten in a `u32`.
pub const TEN_POW_9: u32 = 1_000_000_000;

pub const MAX_CACHED_POWER_OF_TEN: usize = 27;

/// Largest magnitude a power operand may take, per X3.274.
pub const MAX_POWER_EXPONENT: i32 = 999_999_999;
