use crate::cesr::{decode_b64, encode_b64, mtr_dex, BaseMatter, Parsable};
use crate::errors::MatterError;
use crate::Matter;
use chrono::{DateTime, SecondsFormat, Utc};

/// Dater represents an RFC-3339 datetime stamp.
///
/// The 32-char ISO-8601 microsecond text (with an explicit `+00:00` offset
/// rather than `Z`, so every stamp is exactly 32 characters) is not valid
/// Base64 on its own — `:`, `.` and `+` aren't in the alphabet — so it is
/// substituted into Base64-safe characters before being decoded to the 24
/// raw bytes that code `1AAG` carries.
#[derive(Debug, Clone)]
pub struct Dater {
    base: BaseMatter,
}

fn to_b64_safe(dts: &str) -> String {
    dts.replace(':', "c").replace('.', "d").replace('+', "p")
}

fn from_b64_safe(safe: &str) -> String {
    safe.replace('c', ":").replace('d', ".").replace('p', "+")
}

#[allow(dead_code)]
impl Dater {
    /// Creates a Dater from a `DateTime<Utc>`, normalized to microsecond
    /// precision with an explicit `+00:00` offset.
    pub fn from_dt(dt: DateTime<Utc>) -> Self {
        let dts = dt.to_rfc3339_opts(SecondsFormat::Micros, false);
        let safe = to_b64_safe(&dts);
        let raw = decode_b64(&safe).expect("substituted datetime text is valid base64");

        Self {
            base: BaseMatter::new(Some(&raw), Some(mtr_dex::DATE_TIME), None, None)
                .expect("24 raw bytes always fit DATE_TIME code"),
        }
    }

    /// Parses a Dater from an RFC-3339 datetime string.
    pub fn from_dts(dts: &str) -> Result<Self, MatterError> {
        let dt = DateTime::parse_from_rfc3339(dts)
            .map_err(|e| MatterError::ValueError(format!("Invalid datetime={}: {}", dts, e)))?
            .with_timezone(&Utc);
        Ok(Self::from_dt(dt))
    }

    /// Creates a Dater from an already-qualified qb64 string.
    pub fn from_qb64(qb64: &str) -> Result<Self, MatterError> {
        let base = BaseMatter::from_qb64(qb64)?;
        if base.code() != mtr_dex::DATE_TIME {
            return Err(MatterError::UnsupportedCodeError(String::from(base.code())));
        }
        Ok(Self { base })
    }

    /// Returns the RFC-3339 datetime string.
    pub fn dts(&self) -> String {
        let safe = encode_b64(self.base.raw());
        from_b64_safe(&safe)
    }

    /// Returns the datetime as a `DateTime<Utc>`.
    pub fn dt(&self) -> Result<DateTime<Utc>, MatterError> {
        DateTime::parse_from_rfc3339(&self.dts())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| MatterError::InvalidFormat)
    }
}

impl Matter for Dater {
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

impl Parsable for Dater {
    fn from_qb64b(data: &mut Vec<u8>, strip: Option<bool>) -> Result<Self, MatterError> {
        let base = BaseMatter::from_qb64b(data, strip)?;
        if base.code() != mtr_dex::DATE_TIME {
            return Err(MatterError::UnsupportedCodeError(String::from(base.code())));
        }
        Ok(Self { base })
    }

    fn from_qb2(data: &mut Vec<u8>, strip: Option<bool>) -> Result<Self, MatterError> {
        let base = BaseMatter::from_qb2(data, strip)?;
        if base.code() != mtr_dex::DATE_TIME {
            return Err(MatterError::UnsupportedCodeError(String::from(base.code())));
        }
        Ok(Self { base })
    }
}
