use crate::cesr::{num_dex, BaseMatter};
use crate::errors::MatterError;
use crate::Matter;
use num_bigint::BigUint;
use num_rational::Ratio;
use std::fmt;

/// TholderSith is the as-given signing threshold, in whichever form it
/// arrived on the wire: a plain count, a lowercase hex count, a JSON-encoded
/// fractional weight list, or an already-parsed weight list.
#[derive(Debug, Clone, PartialEq)]
pub enum TholderSith {
    Integer(u32),
    HexString(String),
    Json(String),
    Weights(Vec<Vec<String>>),
}

impl fmt::Display for TholderSith {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TholderSith::Integer(n) => write!(f, "{:x}", n),
            TholderSith::HexString(s) => write!(f, "{}", s),
            TholderSith::Json(s) => write!(f, "{}", s),
            TholderSith::Weights(w) => {
                let value = serde_json::to_string(w).unwrap_or_default();
                write!(f, "{}", value)
            }
        }
    }
}

impl TholderSith {
    /// Builds a TholderSith from a key state notice field value, which is
    /// either a hex-count string or a JSON array (possibly nested) of
    /// fractional weight strings.
    pub fn from_sad_value(value: crate::keri::core::serdering::SadValue) -> Result<Self, MatterError> {
        use crate::keri::core::serdering::SadValue;
        match value {
            SadValue::String(s) => {
                if s.trim_start().starts_with('[') {
                    TholderSith::from_json(&s)
                } else {
                    Ok(TholderSith::HexString(s))
                }
            }
            SadValue::Array(_) => {
                let json = serde_json::to_string(&value).map_err(|e| {
                    MatterError::ValueError(format!("Invalid weighted sith array: {}", e))
                })?;
                TholderSith::from_json(&json)
            }
            _ => Err(MatterError::ValueError(
                "Unsupported sith value for Tholder".to_string(),
            )),
        }
    }

    fn from_json(json: &str) -> Result<Self, MatterError> {
        let parsed: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| MatterError::ValueError(format!("Invalid sith JSON={}: {}", json, e)))?;
        let clauses = parse_weight_clauses(&parsed)?;
        Ok(TholderSith::Weights(clauses))
    }
}

fn parse_weight_clauses(value: &serde_json::Value) -> Result<Vec<Vec<String>>, MatterError> {
    let arr = value
        .as_array()
        .ok_or_else(|| MatterError::ValueError("Weighted sith must be a JSON array".to_string()))?;
    if arr.is_empty() {
        return Err(MatterError::ValueError("Empty weighted sith".to_string()));
    }
    // A flat list of weights, e.g. ["1/2", "1/2", "1"], is a single clause.
    if arr.iter().all(|v| v.is_string()) {
        let clause = arr
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        return Ok(vec![clause]);
    }
    // Otherwise a list of clauses, each a list of weights.
    arr.iter()
        .map(|clause| {
            clause
                .as_array()
                .ok_or_else(|| MatterError::ValueError("Malformed weighted sith clause".to_string()))?
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(|s| s.to_string())
                        .ok_or_else(|| MatterError::ValueError("Weight must be a string".to_string()))
                })
                .collect::<Result<Vec<String>, MatterError>>()
        })
        .collect()
}

fn parse_weight(w: &str) -> Result<Ratio<i64>, MatterError> {
    if let Some((num, den)) = w.split_once('/') {
        let n: i64 = num
            .trim()
            .parse()
            .map_err(|_| MatterError::ValueError(format!("Invalid weight numerator={}", w)))?;
        let d: i64 = den
            .trim()
            .parse()
            .map_err(|_| MatterError::ValueError(format!("Invalid weight denominator={}", w)))?;
        if d == 0 {
            return Err(MatterError::ValueError(format!("Zero weight denominator={}", w)));
        }
        Ok(Ratio::new(n, d))
    } else {
        let n: i64 = w
            .trim()
            .parse()
            .map_err(|_| MatterError::ValueError(format!("Invalid weight={}", w)))?;
        Ok(Ratio::from_integer(n))
    }
}

/// TholderThold is the normalized signing threshold: either a plain integer
/// count, or a list of weighted clauses that each must individually sum to
/// at least one.
#[derive(Debug, Clone, PartialEq)]
pub enum TholderThold {
    Integer(usize),
    Weighted(Vec<Vec<Ratio<i64>>>),
}

/// Tholder evaluates whether a set of signing key indices satisfies a
/// signing threshold, either a simple numeric count or fractional weighted
/// clauses over disjoint ranges of key indices.
#[derive(Debug, Clone)]
pub struct Tholder {
    sith: TholderSith,
    thold: TholderThold,
    size: usize,
    base: Option<BaseMatter>,
}

impl Default for Tholder {
    fn default() -> Self {
        Tholder::new(None, None, Some(TholderSith::Integer(1)))
            .expect("default threshold of 1 is always valid")
    }
}

#[allow(dead_code)]
impl Tholder {
    /// Builds a Tholder either from already-qualified CESR material (`raw`
    /// or `qb64`, carrying an integer threshold as a Number) or from a
    /// TholderSith value.
    pub fn new(
        raw: Option<&[u8]>,
        qb64: Option<&str>,
        sith: Option<TholderSith>,
    ) -> Result<Self, MatterError> {
        let sith = match sith {
            Some(sith) => sith,
            None => {
                let base = if let Some(qb64) = qb64 {
                    BaseMatter::from_qb64(qb64)?
                } else if let Some(raw) = raw {
                    BaseMatter::new(Some(raw), Some(num_dex::HUGE), None, None)?
                } else {
                    return Err(MatterError::ValueError(
                        "Missing sith for Tholder".to_string(),
                    ));
                };
                let num = bytes_to_u128(base.raw());
                return Ok(Tholder {
                    sith: TholderSith::HexString(format!("{:x}", num)),
                    thold: TholderThold::Integer(num as usize),
                    size: num as usize,
                    base: Some(base),
                });
            }
        };

        match &sith {
            TholderSith::Integer(n) => {
                let n = *n as usize;
                if n < 1 {
                    return Err(MatterError::ValueError(
                        "Invalid sith = 0, must be >= 1".to_string(),
                    ));
                }
                let base = BaseMatter::new(
                    Some(&BigUint::from(n as u64).to_bytes_be()),
                    Some(num_dex::HUGE),
                    None,
                    None,
                )?;
                Ok(Tholder {
                    sith,
                    thold: TholderThold::Integer(n),
                    size: n,
                    base: Some(base),
                })
            }
            TholderSith::HexString(s) => {
                let trimmed = s.trim_start_matches('0');
                let hex = if trimmed.is_empty() { "0" } else { trimmed };
                let n = usize::from_str_radix(hex, 16)
                    .map_err(|_| MatterError::ValueError(format!("Invalid sith hex={}", s)))?;
                if n < 1 {
                    return Err(MatterError::ValueError(
                        "Invalid sith = 0, must be >= 1".to_string(),
                    ));
                }
                let base = BaseMatter::new(
                    Some(&BigUint::from(n as u64).to_bytes_be()),
                    Some(num_dex::HUGE),
                    None,
                    None,
                )?;
                Ok(Tholder {
                    sith,
                    thold: TholderThold::Integer(n),
                    size: n,
                    base: Some(base),
                })
            }
            TholderSith::Json(s) => {
                let parsed: serde_json::Value = serde_json::from_str(s)
                    .map_err(|e| MatterError::ValueError(format!("Invalid sith JSON={}: {}", s, e)))?;
                let clauses = parse_weight_clauses(&parsed)?;
                Self::from_weight_clauses(sith.clone(), clauses)
            }
            TholderSith::Weights(clauses) => Self::from_weight_clauses(sith.clone(), clauses.clone()),
        }
    }

    fn from_weight_clauses(
        sith: TholderSith,
        clauses: Vec<Vec<String>>,
    ) -> Result<Self, MatterError> {
        let mut weighted = Vec::with_capacity(clauses.len());
        let mut total = 0usize;
        for clause in &clauses {
            let mut ratios = Vec::with_capacity(clause.len());
            for w in clause {
                ratios.push(parse_weight(w)?);
            }
            total += ratios.len();
            weighted.push(ratios);
        }
        Ok(Tholder {
            sith,
            thold: TholderThold::Weighted(weighted),
            size: total,
            base: None,
        })
    }

    /// Parses a Tholder from its textual sith representation (hex count or
    /// JSON weight list).
    pub fn from_str(ths: &str) -> Result<Self, MatterError> {
        let sith = if ths.trim_start().starts_with('[') {
            TholderSith::Json(ths.to_string())
        } else {
            TholderSith::HexString(ths.to_string())
        };
        Tholder::new(None, None, Some(sith))
    }

    /// Returns the number of key indices this threshold ranges over.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the integer threshold value, if this is not a weighted
    /// threshold.
    pub fn num(&self) -> Option<u128> {
        match &self.thold {
            TholderThold::Integer(n) => Some(*n as u128),
            TholderThold::Weighted(_) => None,
        }
    }

    /// Returns the as-given sith value.
    pub fn sith(&self) -> TholderSith {
        self.sith.clone()
    }

    /// Returns the normalized threshold.
    pub fn thold(&self) -> &TholderThold {
        &self.thold
    }

    /// Returns whether the given signing key indices satisfy the threshold.
    pub fn satisfy(&self, indices: &[usize]) -> bool {
        match &self.thold {
            TholderThold::Integer(n) => {
                let mut unique: Vec<usize> = indices.to_vec();
                unique.sort_unstable();
                unique.dedup();
                unique.len() >= *n
            }
            TholderThold::Weighted(clauses) => {
                let mut offset = 0usize;
                for clause in clauses {
                    let sum: Ratio<i64> = indices
                        .iter()
                        .filter(|&&i| i >= offset && i < offset + clause.len())
                        .map(|&i| clause[i - offset])
                        .sum();
                    if sum < Ratio::from_integer(1) {
                        return false;
                    }
                    offset += clause.len();
                }
                true
            }
        }
    }
}

fn bytes_to_u128(raw: &[u8]) -> u128 {
    let mut value: u128 = 0;
    for &b in raw.iter() {
        value = (value << 8) | b as u128;
    }
    value
}

#[allow(dead_code)]
impl Matter for Tholder {
    fn code(&self) -> &str {
        self.base.as_ref().map(|b| b.code()).unwrap_or(num_dex::HUGE)
    }
    fn raw(&self) -> &[u8] {
        self.base.as_ref().map(|b| b.raw()).unwrap_or(&[])
    }
    fn qb64(&self) -> String {
        self.base.as_ref().map(|b| b.qb64()).unwrap_or_default()
    }
    fn qb2(&self) -> Vec<u8> {
        self.base.as_ref().map(|b| b.qb2()).unwrap_or_default()
    }
    fn is_transferable(&self) -> bool {
        self.base.as_ref().map(|b| b.is_transferable()).unwrap_or(false)
    }
    fn is_digestive(&self) -> bool {
        self.base.as_ref().map(|b| b.is_digestive()).unwrap_or(false)
    }
    fn is_prefixive(&self) -> bool {
        self.base.as_ref().map(|b| b.is_prefixive()).unwrap_or(false)
    }
    fn is_special(&self) -> bool {
        self.base.as_ref().map(|b| b.is_special()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_threshold_satisfies() {
        let tholder = Tholder::new(None, None, Some(TholderSith::Integer(2))).unwrap();
        assert_eq!(tholder.size(), 2);
        assert_eq!(tholder.num(), Some(2));
        assert!(!tholder.satisfy(&[0]));
        assert!(tholder.satisfy(&[0, 1]));
        assert!(tholder.satisfy(&[0, 1, 2]));
    }

    #[test]
    fn hex_string_threshold() {
        let tholder = Tholder::new(None, None, Some(TholderSith::HexString("2".to_string()))).unwrap();
        assert_eq!(tholder.num(), Some(2));
    }

    #[test]
    fn weighted_single_clause() {
        let tholder = Tholder::new(
            None,
            None,
            Some(TholderSith::Weights(vec![vec![
                "1/2".to_string(),
                "1/2".to_string(),
                "1/2".to_string(),
            ]])),
        )
        .unwrap();
        assert_eq!(tholder.size(), 3);
        assert!(tholder.num().is_none());
        assert!(!tholder.satisfy(&[0]));
        assert!(tholder.satisfy(&[0, 1]));
    }

    #[test]
    fn weighted_multi_clause_disjoint_ranges() {
        let tholder = Tholder::new(
            None,
            None,
            Some(TholderSith::Weights(vec![
                vec!["1/2".to_string(), "1/2".to_string()],
                vec!["1".to_string()],
            ])),
        )
        .unwrap();
        assert_eq!(tholder.size(), 3);
        assert!(!tholder.satisfy(&[0]));
        assert!(!tholder.satisfy(&[0, 1]));
        assert!(tholder.satisfy(&[0, 1, 2]));
    }

    #[test]
    fn from_str_hex() {
        let tholder = Tholder::from_str("2").unwrap();
        assert_eq!(tholder.num(), Some(2));
    }
}
