use crate::cesr::BaseMatter;
use crate::Matter;

///  Prefixer is Matter subclass for autonomic identifier AID prefix
pub struct Prefixer {
    base: BaseMatter,
}

impl Prefixer {

}

impl Matter for Prefixer {
    fn code(&self) -> &str { self.base.code() }
    fn raw(&self) -> &[u8] { self.base.raw() }
    fn qb64(&self) -> String { self.base.qb64() }
    fn qb2(&self) -> Vec<u8> { self.base.qb2() }
    fn is_transferable(&self) -> bool { self.base.is_transferable() }
    fn is_digestive(&self) -> bool { self.base.is_digestive() }
    fn is_prefixive(&self) -> bool { self.base.is_prefixive() }
    fn is_special(&self) -> bool { self.base.is_special() }
}
