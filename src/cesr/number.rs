use crate::cesr::{num_dex, BaseMatter};
use crate::errors::MatterError;
use crate::Matter;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Byte length carried by each Number derivation code, ordered smallest first.
const NUM_CODE_SIZES: &[(&str, usize)] = &[
    (num_dex::SHORT, 2),
    (num_dex::LONG, 4),
    (num_dex::TALL, 5),
    (num_dex::BIG, 8),
    (num_dex::LARGE, 11),
    (num_dex::GREAT, 14),
    (num_dex::HUGE, 16),
    (num_dex::VAST, 17),
];

/// Number represents ordinal counting values (sequence numbers, first-seen
/// ordinals, witness thresholds) as fixed-size big-endian unsigned integers.
pub struct Number {
    base: BaseMatter,
}

#[allow(dead_code)]
impl Number {
    /// Builds a Number using the smallest code able to hold `num`.
    pub fn from_num(num: &BigUint) -> Result<Self, MatterError> {
        let needed = num.to_bytes_be().len();
        let code = NUM_CODE_SIZES
            .iter()
            .find(|(_, sz)| needed <= *sz)
            .map(|(c, _)| *c)
            .ok_or_else(|| {
                MatterError::InvalidVarRawSize(format!(
                    "Number too large for any supported code: {} bytes",
                    needed
                ))
            })?;
        Self::from_num_and_code(num, code)
    }

    /// Builds a Number using an explicit derivation code.
    pub fn from_num_and_code(num: &BigUint, code: &str) -> Result<Self, MatterError> {
        let size = NUM_CODE_SIZES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, sz)| *sz)
            .ok_or_else(|| MatterError::InvalidCode(format!("Unsupported Number code={}", code)))?;

        let be = num.to_bytes_be();
        if be.len() > size {
            return Err(MatterError::InvalidVarRawSize(format!(
                "Number {} does not fit in code={} ({} bytes)",
                num, code, size
            )));
        }

        let mut raw = vec![0u8; size];
        raw[size - be.len()..].copy_from_slice(&be);

        Ok(Self {
            base: BaseMatter::new(Some(&raw), Some(code), None, None)?,
        })
    }

    /// Parses a Number from a lowercase hex string with no leading zeros, the
    /// wire form used for event `s` and `bt` fields.
    pub fn from_numh(numh: &str) -> Result<Self, MatterError> {
        let trimmed = numh.trim_start_matches('0');
        let hex = if trimmed.is_empty() { "0" } else { trimmed };
        let value = u128::from_str_radix(hex, 16)
            .map_err(|_| MatterError::ValueError(format!("Invalid numh={}", numh)))?;
        Self::from_num(&BigUint::from(value))
    }

    /// Returns the numeric value, truncated to 128 bits.
    pub fn num(&self) -> u128 {
        let raw = self.base.raw();
        let mut value: u128 = 0;
        for &b in raw.iter() {
            value = (value << 8) | b as u128;
        }
        value
    }

    /// Returns the lowercase hex representation with no leading zeros.
    pub fn numh(&self) -> String {
        format!("{:x}", self.num())
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        let v = if value < 0 { 0u64 } else { value as u64 };
        Number::from_num(&BigUint::from(v)).expect("i64 always fits in Number")
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::from_num(&BigUint::from(value)).expect("u64 always fits in Number")
    }
}

impl Matter for Number {
    fn code(&self) -> &str {
        self.base.code()
    }
    fn raw(&self) -> &[u8] {
        self.base.raw()
    }
    fn qb64(&self) -> String {
        self.base.qb64()
    }
    fn qb2(&self) -> Vec<u8> {
        self.base.qb2()
    }
    fn is_transferable(&self) -> bool {
        self.base.is_transferable()
    }
    fn is_digestive(&self) -> bool {
        self.base.is_digestive()
    }
    fn is_prefixive(&self) -> bool {
        self.base.is_prefixive()
    }
    fn is_special(&self) -> bool {
        self.base.is_special()
    }
}

#[allow(dead_code)]
fn _num_to_usize(n: &Number) -> Option<usize> {
    n.num().to_usize()
}
