use crate::cesr::{num_dex, BaseMatter, Parsable};
use crate::errors::MatterError;
use crate::Matter;

/// Seqner represents a sequence number or first-seen ordinal as a 16-byte
/// big-endian unsigned integer (same raw size/code as a Salt_128/Number-Huge).
#[derive(Debug, Clone)]
pub struct Seqner {
    base: BaseMatter,
}

#[allow(dead_code)]
impl Seqner {
    /// Creates a Seqner from a sequence number.
    pub fn from_sn(sn: u64) -> Self {
        let raw = (sn as u128).to_be_bytes().to_vec();
        Self {
            base: BaseMatter::new(Some(&raw), Some(num_dex::HUGE), None, None)
                .expect("sn always fits in 16 bytes"),
        }
    }

    /// Creates a Seqner from a lowercase hex string with no leading zeros.
    pub fn from_snh(snh: &str) -> Result<Self, MatterError> {
        let trimmed = snh.trim_start_matches('0');
        let hex = if trimmed.is_empty() { "0" } else { trimmed };
        let sn = u64::from_str_radix(hex, 16)
            .map_err(|_| MatterError::ValueError(format!("Invalid snh={}", snh)))?;
        Ok(Self::from_sn(sn))
    }

    /// Creates a Seqner from an already-qualified qb64 string.
    pub fn from_qb64(qb64: &str) -> Result<Self, MatterError> {
        let base = BaseMatter::from_qb64(qb64)?;
        if base.code() != num_dex::HUGE {
            return Err(MatterError::UnsupportedCodeError(String::from(base.code())));
        }
        Ok(Self { base })
    }

    /// Returns the sequence number.
    pub fn sn(&self) -> u64 {
        let raw = self.base.raw();
        let mut bytes = [0u8; 16];
        bytes[16 - raw.len()..].copy_from_slice(raw);
        u128::from_be_bytes(bytes) as u64
    }

    /// Returns lowercase hex string representation with no leading zeros.
    pub fn snh(&self) -> String {
        format!("{:x}", self.sn())
    }
}

impl Matter for Seqner {
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

impl Parsable for Seqner {
    fn from_qb64b(data: &mut Vec<u8>, strip: Option<bool>) -> Result<Self, MatterError> {
        let base = BaseMatter::from_qb64b(data, strip)?;
        if base.code() != num_dex::HUGE {
            return Err(MatterError::UnsupportedCodeError(String::from(base.code())));
        }
        Ok(Self { base })
    }

    fn from_qb2(data: &mut Vec<u8>, strip: Option<bool>) -> Result<Self, MatterError> {
        let base = BaseMatter::from_qb2(data, strip)?;
        if base.code() != num_dex::HUGE {
            return Err(MatterError::UnsupportedCodeError(String::from(base.code())));
        }
        Ok(Self { base })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_sn_roundtrip() {
        let sqr = Seqner::from_sn(20);
        assert_eq!(sqr.sn(), 20);
        assert_eq!(sqr.qb64(), "0AAAAAAAAAAAAAAAAAAAAAAU");
    }

    #[test]
    fn from_snh_roundtrip() {
        let sqr = Seqner::from_snh("14").unwrap();
        assert_eq!(sqr.sn(), 20);
    }
}
