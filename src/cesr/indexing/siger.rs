use crate::cesr::indexing::{BaseIndexer, Indexer};
use crate::cesr::verfer::Verfer;
use crate::errors::MatterError;

///  Siger is Indexer subclass holding an indexed signature with verfer property.
///  From Indexer .raw is signature and .code is signature cipher suite
///  Adds .verfer property to hold Verfer instance of associated verifier public key
///  Verfer's .raw as verifier key and .code is verifier cipher suite.
#[derive(Debug, Clone)]
pub struct Siger {
    base: BaseIndexer,
    verfer: Option<Verfer>,
}

impl Siger {
    pub fn new(
        raw: Option<&[u8]>,
        code: Option<&str>,
        index: Option<u32>,
        ondex: Option<u32>,
        verfer: Option<Verfer>,
    ) -> Result<Self, MatterError> {
        let base = BaseIndexer::new(raw, code, index, ondex)?;
        Ok(Self { base, verfer })
    }

    pub fn from_qb64(qb64: &str, verfer: Option<Verfer>) -> Result<Self, MatterError> {
        let base = BaseIndexer::from_qb64(qb64)?;
        Ok(Self { base, verfer })
    }

    pub fn from_qb64b(data: &mut Vec<u8>, strip: Option<bool>) -> Result<Self, MatterError> {
        let base = <BaseIndexer as crate::cesr::Parsable>::from_qb64b(data, strip)?;
        Ok(Self { base, verfer: None })
    }

    pub fn verfer(&self) -> Option<&Verfer> {
        self.verfer.as_ref()
    }

    pub fn set_verfer(&mut self, verfer: Verfer) {
        self.verfer = Some(verfer);
    }
}

impl Indexer for Siger {
    fn code(&self) -> &str { self.base.code() }
    fn raw(&self) -> &[u8] { self.base.raw() }
    fn qb64(&self) -> String { self.base.qb64() }
    fn qb64b(&self) -> Vec<u8> { self.base.qb64b() }
    fn qb2(&self) -> Vec<u8> { self.base.qb2() }
    fn full_size(&self) -> u32 { self.base.full_size() }
    fn index(&self) -> u32 { self.base.index() }
    fn ondex(&self) -> u32 { self.base.ondex() }
}
