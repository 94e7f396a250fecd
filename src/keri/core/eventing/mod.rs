pub mod escrowing;
pub mod incept;
pub mod interact;
pub mod kever;
pub mod kevery;
pub mod query;
pub mod receipt;
pub mod reply;
pub mod rotate;
pub mod state;

use crate::cesr::cigar::Cigar;
use crate::cesr::counting::{ctr_dex_1_0, BaseCounter, Counter};
use crate::cesr::indexing::siger::Siger;
use crate::cesr::indexing::Indexer;
use crate::cesr::seqner::Seqner;
use crate::cesr::verfer::Verfer;
use crate::keri::core::serdering::{Serder, SerderKERI};
use crate::keri::KERIError;
use crate::Matter;
use std::collections::HashSet;

pub use incept::*;
pub use kever::Kever;
pub use reply::ReplyEventBuilder;

// Determine threshold representations based on intive flag
const MAX_INT_THOLD: u128 = 1 << 32; // values at or below this stay a bare integer on the wire

fn ample(n: usize) -> usize {
    // Implementation for ample - computes witness threshold
    std::cmp::max(1, (n as f64 / 2.0).ceil() as usize)
}

fn is_digest_code(code: &str) -> bool {
    // Check if code is in DigDex
    ["E", "S", "X"].contains(&code)
}

fn is_prefix_code(code: &str) -> bool {
    // Check if code is in PreDex
    ["A", "B", "C", "D"].contains(&code)
}

/// A seal anchoring a message to a point in an identifier's KEL, used to
/// endorse replies, queries and receipts with the endorser's key state.
#[derive(Debug, Clone)]
pub enum Seal {
    SealEvent(SealEvent),
    SealLast(SealLast),
}

/// Seal referencing a specific (prefix, sn, digest) establishment event.
#[derive(Debug, Clone)]
pub struct SealEvent {
    pub i: String,
    pub s: String,
    pub d: String,
}

impl SealEvent {
    pub fn new(i: String, s: String, d: String) -> Self {
        Self { i, s, d }
    }
}

/// Seal referencing only a prefix, meaning "whatever its last establishment
/// event turns out to be" (resolved by the recipient).
#[derive(Debug, Clone)]
pub struct SealLast {
    pub i: String,
}

impl SealLast {
    pub fn new(i: String) -> Self {
        Self { i }
    }
}

/// Verifies each siger's signature against the verfer at its index,
/// deduplicating repeated signatures (by qb64 text) before verifying.
///
/// Returns the verified, deduplicated sigers together with the signing
/// indices that were verified. Sigers whose index has no matching verfer,
/// or whose signature fails to verify, are silently dropped (per KERI
/// semantics a partial set of verified signatures may still satisfy a
/// threshold later on).
pub fn verify_sigs(
    raw: &[u8],
    sigers: Vec<Siger>,
    verfers: &[Verfer],
) -> Result<(Vec<Siger>, Vec<usize>), KERIError> {
    let mut seen = HashSet::new();
    let mut verified: Vec<Siger> = Vec::new();
    let mut indices: Vec<usize> = Vec::new();

    for siger in sigers {
        let qb64 = siger.qb64();
        if !seen.insert(qb64) {
            continue; // duplicate signature, already considered
        }

        let index = siger.index() as usize;
        let verfer = match verfers.get(index) {
            Some(verfer) => verfer,
            None => continue, // no verifier at this index, can't verify
        };

        match verfer.verify(siger.raw(), raw) {
            Ok(true) => {
                indices.push(index);
                verified.push(siger);
            }
            Ok(false) | Err(_) => continue,
        }
    }

    Ok((verified, indices))
}

/// Appends a qualified-base64 counter of the given code and item count
/// followed by the raw (already qb64-encoded) bytes of each item to `atc`.
fn append_counted_group(atc: &mut Vec<u8>, code: &str, items: &[Vec<u8>]) -> Result<(), KERIError> {
    let counter = BaseCounter::from_code_and_count(Some(code), Some(items.len() as u64), None)
        .map_err(|e| KERIError::ValidationError(format!("{}", e)))?
        .qb64b();
    atc.extend_from_slice(&counter);
    for item in items {
        atc.extend_from_slice(item);
    }
    Ok(())
}

/// Assembles a complete CESR message: the event body followed by its
/// attachment group (signatures, witness signatures, seal and/or
/// non-transferable receipt couples), mirroring the attachment layout that
/// `Baser::clone_evt_msg` replays out of the database.
///
/// `seal` anchors `sigers` to the signer's own key state (used for replies,
/// queries and receipts signed by a transferable identifier); it is ignored
/// when `sigers` is absent or empty.
pub fn messagize(
    serder: &SerderKERI,
    sigers: Option<&[Siger]>,
    seal: Option<Seal>,
    wigers: Option<&[Siger]>,
    cigars: Option<&[Cigar]>,
    pipelined: bool,
) -> Result<Vec<u8>, KERIError> {
    let mut msg = serder.raw().to_vec();
    let mut atc = Vec::<u8>::new();

    if let Some(sigers) = sigers {
        if !sigers.is_empty() {
            let sig_items: Vec<Vec<u8>> = sigers.iter().map(|s| s.qb64b()).collect();

            match seal {
                Some(Seal::SealEvent(se)) => {
                    let mut group = Vec::new();
                    group.extend_from_slice(se.i.as_bytes());
                    let seqner = Seqner::from_snh(&se.s)
                        .map_err(|e| KERIError::ValidationError(format!("{}", e)))?;
                    group.extend_from_slice(&seqner.qb64b());
                    group.extend_from_slice(se.d.as_bytes());
                    append_counted_group(
                        &mut group,
                        ctr_dex_1_0::CONTROLLER_IDX_SIGS,
                        &sig_items,
                    )?;

                    let counter = BaseCounter::from_code_and_count(
                        Some(ctr_dex_1_0::TRANS_IDX_SIG_GROUPS),
                        Some(1),
                        None,
                    )
                    .map_err(|e| KERIError::ValidationError(format!("{}", e)))?
                    .qb64b();
                    atc.extend_from_slice(&counter);
                    atc.extend_from_slice(&group);
                }
                Some(Seal::SealLast(sl)) => {
                    let mut group = Vec::new();
                    group.extend_from_slice(sl.i.as_bytes());
                    append_counted_group(
                        &mut group,
                        ctr_dex_1_0::CONTROLLER_IDX_SIGS,
                        &sig_items,
                    )?;

                    let counter = BaseCounter::from_code_and_count(
                        Some(ctr_dex_1_0::TRANS_LAST_IDX_SIG_GROUPS),
                        Some(1),
                        None,
                    )
                    .map_err(|e| KERIError::ValidationError(format!("{}", e)))?
                    .qb64b();
                    atc.extend_from_slice(&counter);
                    atc.extend_from_slice(&group);
                }
                None => {
                    append_counted_group(&mut atc, ctr_dex_1_0::CONTROLLER_IDX_SIGS, &sig_items)?;
                }
            }
        }
    }

    if let Some(wigers) = wigers {
        if !wigers.is_empty() {
            let wig_items: Vec<Vec<u8>> = wigers.iter().map(|w| w.qb64b()).collect();
            append_counted_group(&mut atc, ctr_dex_1_0::WITNESS_IDX_SIGS, &wig_items)?;
        }
    }

    if let Some(cigars) = cigars {
        if !cigars.is_empty() {
            let mut coup_items: Vec<Vec<u8>> = Vec::with_capacity(cigars.len());
            for cigar in cigars {
                let verfer = cigar.verfer.as_ref().ok_or_else(|| {
                    KERIError::ValidationError("Cigar missing verfer".to_string())
                })?;
                let mut coup = verfer.qb64b();
                coup.extend_from_slice(&cigar.qb64b());
                coup_items.push(coup);
            }
            append_counted_group(&mut atc, ctr_dex_1_0::NON_TRANS_RECEIPT_COUPLES, &coup_items)?;
        }
    }

    if atc.is_empty() {
        return Ok(msg);
    }

    if pipelined {
        if atc.len() % 4 != 0 {
            return Err(KERIError::ValidationError(format!(
                "Invalid attachments size={}, nonintegral quadlets.",
                atc.len()
            )));
        }
        let pcnt = BaseCounter::from_code_and_count(
            Some(ctr_dex_1_0::ATTACHMENT_GROUP),
            Some((atc.len() / 4) as u64),
            None,
        )
        .map_err(|e| KERIError::ValidationError(format!("{}", e)))?
        .qb64b();
        msg.extend_from_slice(&pcnt);
    }

    msg.extend_from_slice(&atc);
    Ok(msg)
}
