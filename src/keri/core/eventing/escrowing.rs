use crate::cesr::cigar::Cigar;
use crate::cesr::indexing::siger::Siger;
use crate::cesr::indexing::Indexer;
use crate::cesr::seqner::Seqner;
use crate::cesr::verfer::Verfer;
use crate::keri::core::eventing::kevery::Kevery;
use crate::keri::core::serdering::{Serder, SerderKERI};
use crate::keri::db::dbing::keys::dg_key;
use crate::keri::KERIError;
use crate::Matter;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Parses a single IoDupSuber branch item's split key (as returned by
/// `get_item_iter`) back into `(pre, sn)`. The suber's internal separator
/// splits the original `sn_key(pre, sn)` bytes into exactly these two parts.
fn split_pre_sn(keys: &[Vec<u8>]) -> Result<(String, u64), KERIError> {
    let pre = keys
        .first()
        .ok_or_else(|| KERIError::DatabaseError("Escrow key missing pre part".to_string()))?;
    let sn_hex = keys
        .get(1)
        .ok_or_else(|| KERIError::DatabaseError("Escrow key missing sn part".to_string()))?;

    let pre = String::from_utf8(pre.clone())
        .map_err(|_| KERIError::ValueError("Invalid UTF-8 in escrow pre".to_string()))?;
    let sn_hex = String::from_utf8(sn_hex.clone())
        .map_err(|_| KERIError::ValueError("Invalid UTF-8 in escrow sn".to_string()))?;
    let sn = u64::from_str_radix(&sn_hex, 16)
        .map_err(|e| KERIError::ValueError(format!("Invalid hex sn {}: {}", sn_hex, e)))?;

    Ok((pre, sn))
}

/// Whether the entry at `dgkey` is older than `timeout` seconds, based on its
/// recorded escrow datetime in `.dtss`. Missing datetime counts as stale so a
/// corrupted escrow entry does not linger forever.
fn is_stale<'db>(kevery: &Kevery<'db>, dgkey: &[u8], timeout: u64) -> bool {
    let dts = match kevery.db.dtss.get::<_, Vec<u8>>(&[dgkey]) {
        Ok(dts) => dts,
        Err(_) => return true,
    };
    let raw = match dts.first() {
        Some(raw) => raw,
        None => return true,
    };
    let dt_str = match String::from_utf8(raw.clone()) {
        Ok(s) => s,
        Err(_) => return true,
    };
    let dt = match DateTime::parse_from_rfc3339(&dt_str) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => return true,
    };

    (Utc::now() - dt).num_seconds() > timeout as i64
}

impl<'db> Kevery<'db> {
    /// Re-drive all five escrow classes. Mirrors the pattern of the KERI
    /// reference implementation's escrow processing loop: each escrow class
    /// is processed independently and a failure in one does not prevent the
    /// others from running.
    pub fn process_escrows(&mut self) {
        if let Err(e) = self.process_out_of_orders() {
            warn!("Kevery: error processing out-of-order escrows: {}", e);
        }
        if let Err(e) = self.process_partials() {
            warn!("Kevery: error processing partially signed escrows: {}", e);
        }
        if let Err(e) = self.process_partially_witnessed() {
            warn!(
                "Kevery: error processing partially witnessed escrows: {}",
                e
            );
        }
        if let Err(e) = self.process_duplicitous() {
            warn!("Kevery: error processing likely duplicitous escrows: {}", e);
        }
        if let Err(e) = self.process_unverified_receipts() {
            warn!("Kevery: error processing unverified receipt escrows: {}", e);
        }
        if let Err(e) = self.process_unverified_witness_receipts() {
            warn!(
                "Kevery: error processing unverified witness receipt escrows: {}",
                e
            );
        }
        if let Err(e) = self.process_unverified_trans_receipts() {
            warn!(
                "Kevery: error processing unverified transferable receipt escrows: {}",
                e
            );
        }
    }

    /// Shared re-drive walk for the three event-escrow classes (oots, pses,
    /// pwes, ldes) which all store a dup set of event SAIDs keyed by
    /// `sn_key(pre, sn)`, with the event raw/sigs/wigs/dts stashed under
    /// `dg_key(pre, said)`. `still_waiting` decides, from the error returned
    /// by re-processing the event, whether the entry should remain escrowed
    /// (true) or be dropped (false); success always removes the entry.
    fn redrive_event_escrow(
        &mut self,
        table: &str,
        timeout: u64,
        still_waiting: impl Fn(&KERIError) -> bool,
    ) -> Result<(), KERIError> {
        let items = match table {
            "oots" => self.db.oots.get_item_iter::<&str>(&[], false)?,
            "pses" => self.db.pses.get_item_iter::<&str>(&[], false)?,
            "pwes" => self.db.pwes.get_item_iter::<&str>(&[], false)?,
            "ldes" => self.db.ldes.get_item_iter::<&str>(&[], false)?,
            _ => unreachable!("unknown event escrow table"),
        };

        for (keys, val) in items {
            let (pre, sn) = match split_pre_sn(&keys) {
                Ok(v) => v,
                Err(e) => {
                    debug!("Kevery: skipping malformed {} escrow key: {}", table, e);
                    continue;
                }
            };
            let said = match String::from_utf8(val.clone()) {
                Ok(s) => s,
                Err(_) => {
                    debug!("Kevery: skipping malformed {} escrow value at pre={}", table, pre);
                    continue;
                }
            };

            let dgkey = dg_key(&pre, &said);

            if is_stale(self, &dgkey, timeout) {
                info!(
                    "Kevery: timed out {} escrow entry pre={} sn={} dig={}",
                    table, pre, sn, said
                );
                self.remove_event_escrow(table, &pre, sn, &said)?;
                continue;
            }

            let raw = match self.db.evts.get::<_, Vec<u8>>(&[&dgkey])? {
                Some(raw) => raw,
                None => {
                    debug!(
                        "Kevery: missing escrowed event bytes for {} pre={} dig={}, dropping",
                        table, pre, said
                    );
                    self.remove_event_escrow(table, &pre, sn, &said)?;
                    continue;
                }
            };

            let sigers: Vec<Siger> = self
                .db
                .sigs
                .get::<_, Vec<u8>>(&[&dgkey])?
                .into_iter()
                .filter_map(|b| String::from_utf8(b).ok())
                .filter_map(|q| Siger::from_qb64(&q, None).ok())
                .collect();

            let wigers: Vec<Siger> = self
                .db
                .wigs
                .get::<_, Vec<u8>>(&[&dgkey])?
                .into_iter()
                .filter_map(|b| String::from_utf8(b).ok())
                .filter_map(|q| Siger::from_qb64(&q, None).ok())
                .collect();

            let serder = match SerderKERI::from_raw(&raw, None) {
                Ok(s) => s,
                Err(e) => {
                    debug!(
                        "Kevery: could not parse escrowed event for {} pre={} dig={}: {:?}, dropping",
                        table, pre, said, e
                    );
                    self.remove_event_escrow(table, &pre, sn, &said)?;
                    continue;
                }
            };

            let result = self.process_event(
                serder,
                sigers,
                if wigers.is_empty() { None } else { Some(wigers) },
                None,
                None,
                None,
                None,
                None,
                None,
            );

            match result {
                Ok(()) => {
                    debug!(
                        "Kevery: {} escrow entry resolved pre={} sn={} dig={}",
                        table, pre, sn, said
                    );
                    self.remove_event_escrow(table, &pre, sn, &said)?;
                }
                Err(e) if still_waiting(&e) => {
                    debug!(
                        "Kevery: {} escrow entry still waiting pre={} sn={} dig={}: {}",
                        table, pre, sn, said, e
                    );
                }
                Err(e) => {
                    info!(
                        "Kevery: {} escrow entry failed pre={} sn={} dig={}: {}, dropping",
                        table, pre, sn, said, e
                    );
                    self.remove_event_escrow(table, &pre, sn, &said)?;
                }
            }
        }

        Ok(())
    }

    fn remove_event_escrow(
        &self,
        table: &str,
        pre: &str,
        sn: u64,
        said: &str,
    ) -> Result<(), KERIError> {
        let snk = crate::keri::db::dbing::keys::sn_key(pre, sn);
        let removed = match table {
            "oots" => self.db.oots.rem(&[snk], Some(&said.to_string()))?,
            "pses" => self.db.pses.rem(&[snk], Some(&said.to_string()))?,
            "pwes" => self.db.pwes.rem(&[snk], Some(&said.to_string()))?,
            "ldes" => self.db.ldes.rem(&[snk], Some(&said.to_string()))?,
            _ => unreachable!("unknown event escrow table"),
        };
        if !removed {
            debug!(
                "Kevery: {} escrow entry already absent pre={} sn={} dig={}",
                table, pre, sn, said
            );
        }
        Ok(())
    }

    /// Re-drive fully signed events whose prior event was not yet in the KEL
    /// when first seen. Still out-of-order keeps the entry; anything else
    /// (success included) removes it.
    fn process_out_of_orders(&mut self) -> Result<(), KERIError> {
        self.redrive_event_escrow("oots", Self::TIMEOUT_OOE, |e| {
            matches!(e, KERIError::OutOfOrderError(_))
        })
    }

    /// Re-drive events that were short of required controller signatures, a
    /// delegation approval, or some other "may resolve later" condition.
    fn process_partials(&mut self) -> Result<(), KERIError> {
        self.redrive_event_escrow("pses", Self::TIMEOUT_PSE, |e| {
            matches!(
                e,
                KERIError::MissingSignatureError(_) | KERIError::MissingDelegationError(_)
            )
        })
    }

    /// Re-drive events that were short of required witness receipts.
    fn process_partially_witnessed(&mut self) -> Result<(), KERIError> {
        self.redrive_event_escrow("pwes", Self::TIMEOUT_PWE, |e| {
            matches!(e, KERIError::MissingWitnessSignatureError(_))
        })
    }

    /// Re-drive likely duplicitous events. A duplicitous event re-processed
    /// unchanged raises `LikelyDuplicitousError` again (harmlessly re-adding
    /// the same escrow dup, a no-op under `IoDupSuber`'s dedup), so it stays
    /// escrowed until some other resolution (e.g. a recovery rotation)
    /// changes the outcome.
    fn process_duplicitous(&mut self) -> Result<(), KERIError> {
        self.redrive_event_escrow("ldes", Self::TIMEOUT_LDE, |e| {
            matches!(e, KERIError::LikelyDuplicitousError(_))
        })
    }

    /// Re-drive nontransferable (watcher) receipts whose receipted event was
    /// not yet known. Entries are triples
    /// `ediger.qb64().sprefixer.qb64().cigar.qb64()` keyed by `sn_key(pre, sn)`.
    fn process_unverified_receipts(&mut self) -> Result<(), KERIError> {
        let items = self.db.ures.get_item_iter::<&str>(&[], false)?;

        for (keys, val) in items {
            let (pre, sn) = match split_pre_sn(&keys) {
                Ok(v) => v,
                Err(e) => {
                    debug!("Kevery: skipping malformed ures escrow key: {}", e);
                    continue;
                }
            };
            let triple = match String::from_utf8(val) {
                Ok(s) => s,
                Err(_) => continue,
            };
            let parts: Vec<&str> = triple.split('.').collect();
            if parts.len() != 3 {
                debug!("Kevery: malformed ures escrow entry pre={}: {}", pre, triple);
                self.remove_ures_entry(&pre, sn, &triple)?;
                continue;
            }
            let (said, sprefixer_qb64, cigar_qb64) = (parts[0], parts[1], parts[2]);

            let dgkey = dg_key(&pre, said);
            if is_stale(self, &dgkey, Self::TIMEOUT_URE) {
                info!(
                    "Kevery: timed out unverified receipt escrow pre={} sn={} dig={}",
                    pre, sn, said
                );
                self.remove_ures_entry(&pre, sn, &triple)?;
                continue;
            }

            let snk = crate::keri::db::dbing::keys::sn_key(&pre, sn);
            let ldig = match self.db.kels.get_last::<_, Vec<u8>>(&[&snk])? {
                Some(d) => match String::from_utf8(d) {
                    Ok(s) => s,
                    Err(_) => continue,
                },
                None => {
                    debug!(
                        "Kevery: ures escrow still waiting on event pre={} sn={}",
                        pre, sn
                    );
                    continue;
                }
            };

            let verfer = match Verfer::from_qb64(sprefixer_qb64) {
                Ok(v) => v,
                Err(_) => {
                    self.remove_ures_entry(&pre, sn, &triple)?;
                    continue;
                }
            };
            let cigar = match Cigar::from_qb64(cigar_qb64, Some(verfer)) {
                Ok(c) => c,
                Err(_) => {
                    self.remove_ures_entry(&pre, sn, &triple)?;
                    continue;
                }
            };

            let ldgkey = dg_key(&pre, &ldig);
            let raw = match self.db.evts.get::<_, Vec<u8>>(&[&ldgkey])? {
                Some(raw) => raw,
                None => {
                    self.remove_ures_entry(&pre, sn, &triple)?;
                    continue;
                }
            };
            let lserder = match SerderKERI::from_raw(&raw, None) {
                Ok(s) => s,
                Err(_) => {
                    self.remove_ures_entry(&pre, sn, &triple)?;
                    continue;
                }
            };

            if !lserder.compare_said(said) {
                debug!(
                    "Kevery: ures escrow entry stale, event changed pre={} sn={}",
                    pre, sn
                );
                self.remove_ures_entry(&pre, sn, &triple)?;
                continue;
            }

            match cigar.verfer.as_ref().unwrap().verify(&cigar.raw(), &lserder.raw()) {
                Ok(true) => {
                    let couple = [cigar.verfer.as_ref().unwrap().qb64().as_bytes(), cigar.qb64().as_bytes()].concat();
                    self.db.rcts.add(&[&ldgkey], &couple)?;
                    self.remove_ures_entry(&pre, sn, &triple)?;
                }
                Ok(false) | Err(_) => {
                    self.remove_ures_entry(&pre, sn, &triple)?;
                }
            }
        }

        Ok(())
    }

    fn remove_ures_entry(&self, pre: &str, sn: u64, val: &str) -> Result<(), KERIError> {
        let snk = crate::keri::db::dbing::keys::sn_key(pre, sn);
        self.db.ures.rem(&[snk], Some(&val.to_string()))?;
        Ok(())
    }

    /// Re-drive witness receipts whose receipted event was not yet known.
    /// Entries are pairs `ediger.qb64().wiger.qb64()` keyed by
    /// `sn_key(pre, sn)`. The wiger's own index resolves against the
    /// witness list current for the event once it's known.
    fn process_unverified_witness_receipts(&mut self) -> Result<(), KERIError> {
        let items = self.db.uwes.get_item_iter::<&str>(&[], false)?;

        for (keys, val) in items {
            let (pre, sn) = match split_pre_sn(&keys) {
                Ok(v) => v,
                Err(e) => {
                    debug!("Kevery: skipping malformed uwes escrow key: {}", e);
                    continue;
                }
            };
            let pair = match String::from_utf8(val) {
                Ok(s) => s,
                Err(_) => continue,
            };
            let parts: Vec<&str> = pair.split('.').collect();
            if parts.len() != 2 {
                debug!("Kevery: malformed uwes escrow entry pre={}: {}", pre, pair);
                self.remove_uwes_entry(&pre, sn, &pair)?;
                continue;
            }
            let (said, wiger_qb64) = (parts[0], parts[1]);

            let dgkey = dg_key(&pre, said);
            if is_stale(self, &dgkey, Self::TIMEOUT_UWE) {
                info!(
                    "Kevery: timed out unverified witness receipt escrow pre={} sn={} dig={}",
                    pre, sn, said
                );
                self.remove_uwes_entry(&pre, sn, &pair)?;
                continue;
            }

            let snk = crate::keri::db::dbing::keys::sn_key(&pre, sn);
            let ldig = match self.db.kels.get_last::<_, Vec<u8>>(&[&snk])? {
                Some(d) => match String::from_utf8(d) {
                    Ok(s) => s,
                    Err(_) => continue,
                },
                None => {
                    debug!(
                        "Kevery: uwes escrow still waiting on event pre={} sn={}",
                        pre, sn
                    );
                    continue;
                }
            };

            let ldgkey = dg_key(&pre, &ldig);
            let raw = match self.db.evts.get::<_, Vec<u8>>(&[&ldgkey])? {
                Some(raw) => raw,
                None => {
                    self.remove_uwes_entry(&pre, sn, &pair)?;
                    continue;
                }
            };
            let lserder = match SerderKERI::from_raw(&raw, None) {
                Ok(s) => s,
                Err(_) => {
                    self.remove_uwes_entry(&pre, sn, &pair)?;
                    continue;
                }
            };

            if !lserder.compare_said(said) {
                self.remove_uwes_entry(&pre, sn, &pair)?;
                continue;
            }

            let wiger = match Siger::from_qb64(wiger_qb64, None) {
                Ok(w) => w,
                Err(_) => {
                    self.remove_uwes_entry(&pre, sn, &pair)?;
                    continue;
                }
            };

            let wits = self.fetch_witness_state(&pre, sn)?;
            if wiger.index() as usize >= wits.len() {
                self.remove_uwes_entry(&pre, sn, &pair)?;
                continue;
            }
            let wit_verfer = match Verfer::from_qb64(&wits[wiger.index() as usize]) {
                Ok(v) => v,
                Err(_) => {
                    self.remove_uwes_entry(&pre, sn, &pair)?;
                    continue;
                }
            };
            if wit_verfer.is_transferable() {
                self.remove_uwes_entry(&pre, sn, &pair)?;
                continue;
            }

            match wit_verfer.verify(&wiger.raw(), &lserder.raw()) {
                Ok(true) => {
                    self.db.wigs.add(&[&ldgkey], &wiger.qb64().as_bytes())?;
                    self.remove_uwes_entry(&pre, sn, &pair)?;
                }
                Ok(false) | Err(_) => {
                    self.remove_uwes_entry(&pre, sn, &pair)?;
                }
            }
        }

        Ok(())
    }

    fn remove_uwes_entry(&self, pre: &str, sn: u64, val: &str) -> Result<(), KERIError> {
        let snk = crate::keri::db::dbing::keys::sn_key(pre, sn);
        self.db.uwes.rem(&[snk], Some(&val.to_string()))?;
        Ok(())
    }

    /// Re-drive transferable validator receipts. Entries are quintuples
    /// `ediger.qb64().sprefixer.qb64().sseqner.qb64().sdiger.qb64().siger.qb64()`
    /// keyed by `sn_key(pre, sn)` of the receipted event.
    fn process_unverified_trans_receipts(&mut self) -> Result<(), KERIError> {
        let items = self.db.vres.get_item_iter::<&str>(&[], false)?;

        for (keys, val) in items {
            let (pre, sn) = match split_pre_sn(&keys) {
                Ok(v) => v,
                Err(e) => {
                    debug!("Kevery: skipping malformed vres escrow key: {}", e);
                    continue;
                }
            };
            let quint = match String::from_utf8(val) {
                Ok(s) => s,
                Err(_) => continue,
            };
            let parts: Vec<&str> = quint.split('.').collect();
            if parts.len() != 5 {
                debug!("Kevery: malformed vres escrow entry pre={}: {}", pre, quint);
                self.remove_vres_entry(&pre, sn, &quint)?;
                continue;
            }
            let (said, seal_i, seal_s_qb64, seal_d, siger_qb64) =
                (parts[0], parts[1], parts[2], parts[3], parts[4]);

            let dgkey = dg_key(&pre, said);
            if is_stale(self, &dgkey, Self::TIMEOUT_VRE) {
                info!(
                    "Kevery: timed out unverified trans receipt escrow pre={} sn={} dig={}",
                    pre, sn, said
                );
                self.remove_vres_entry(&pre, sn, &quint)?;
                continue;
            }

            let snk = crate::keri::db::dbing::keys::sn_key(&pre, sn);
            let ldig = match self.db.kels.get_last::<_, Vec<u8>>(&[&snk])? {
                Some(d) => match String::from_utf8(d) {
                    Ok(s) => s,
                    Err(_) => continue,
                },
                None => {
                    debug!(
                        "Kevery: vres escrow still waiting on receipted event pre={} sn={}",
                        pre, sn
                    );
                    continue;
                }
            };

            let ldgkey = dg_key(&pre, &ldig);
            let lraw = match self.db.evts.get::<_, Vec<u8>>(&[&ldgkey])? {
                Some(raw) => raw,
                None => {
                    self.remove_vres_entry(&pre, sn, &quint)?;
                    continue;
                }
            };
            let lserder = match SerderKERI::from_raw(&lraw, None) {
                Ok(s) => s,
                Err(_) => {
                    self.remove_vres_entry(&pre, sn, &quint)?;
                    continue;
                }
            };
            if !lserder.compare_said(said) {
                self.remove_vres_entry(&pre, sn, &quint)?;
                continue;
            }

            let seqner = match Seqner::from_qb64(seal_s_qb64) {
                Ok(s) => s,
                Err(_) => {
                    self.remove_vres_entry(&pre, sn, &quint)?;
                    continue;
                }
            };

            let ssn_key = crate::keri::db::dbing::keys::sn_key(seal_i, seqner.sn());
            let sdig = match self.db.kels.get_last::<_, Vec<u8>>(&[&ssn_key])? {
                Some(d) => match String::from_utf8(d) {
                    Ok(s) => s,
                    Err(_) => continue,
                },
                None => {
                    debug!(
                        "Kevery: vres escrow still waiting on validator est. event pre={}",
                        seal_i
                    );
                    continue;
                }
            };

            let sdgkey = dg_key(seal_i, &sdig);
            let sraw = match self.db.evts.get::<_, Vec<u8>>(&[&sdgkey])? {
                Some(raw) => raw,
                None => {
                    self.remove_vres_entry(&pre, sn, &quint)?;
                    continue;
                }
            };
            let sserder = match SerderKERI::from_raw(&sraw, None) {
                Ok(s) => s,
                Err(_) => {
                    self.remove_vres_entry(&pre, sn, &quint)?;
                    continue;
                }
            };
            if !sserder.compare_said(seal_d) {
                self.remove_vres_entry(&pre, sn, &quint)?;
                continue;
            }

            let verfers = sserder.verfers().unwrap_or_default();
            if verfers.is_empty() {
                self.remove_vres_entry(&pre, sn, &quint)?;
                continue;
            }

            let siger = match Siger::from_qb64(siger_qb64, None) {
                Ok(s) => s,
                Err(_) => {
                    self.remove_vres_entry(&pre, sn, &quint)?;
                    continue;
                }
            };
            if siger.index() as usize >= verfers.len() {
                self.remove_vres_entry(&pre, sn, &quint)?;
                continue;
            }
            let verfer = &verfers[siger.index() as usize];

            match verfer.verify(&siger.raw(), &lserder.raw()) {
                Ok(true) => {
                    let sealet = [seal_i.as_bytes(), &seqner.qb64b(), seal_d.as_bytes()].concat();
                    let quadruple = [sealet, siger.qb64b()].concat();
                    self.db.vrcs.add(&[&ldgkey], &quadruple)?;
                    self.remove_vres_entry(&pre, sn, &quint)?;
                }
                Ok(false) | Err(_) => {
                    self.remove_vres_entry(&pre, sn, &quint)?;
                }
            }
        }

        Ok(())
    }

    fn remove_vres_entry(&self, pre: &str, sn: u64, val: &str) -> Result<(), KERIError> {
        let snk = crate::keri::db::dbing::keys::sn_key(pre, sn);
        self.db.vres.rem(&[snk], Some(&val.to_string()))?;
        Ok(())
    }
}
