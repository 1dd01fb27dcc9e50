use std::fmt::{self, Display};

use crate::consts::IUPAC_NUCLEOTIDES;
use crate::errors::{CoreError, CoreResult};

///
/// Position-only key, shared by every allele called at one base.
///
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Clone, Copy)]
pub struct SiteKey {
    pub pos: u32,
}

impl SiteKey {
    ///
    /// Create a new site key, checking the position lies on the genome.
    ///
    /// # Arguments
    /// - pos: one-based position
    /// - genome_length: length of the mitochondrial reference
    pub fn new(pos: u32, genome_length: u32) -> CoreResult<Self> {
        if pos == 0 || pos > genome_length {
            return Err(CoreError::PositionOutOfRange { pos, genome_length });
        }
        Ok(SiteKey { pos })
    }
}

impl Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pos)
    }
}

///
/// Allele-specific key: position, reference allele and one alternate allele.
///
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Clone)]
pub struct GenomicKey {
    pub pos: u32,
    pub reference: String,
    pub alternate: String,
}

impl GenomicKey {
    pub fn new(pos: u32, reference: &str, alternate: &str, genome_length: u32) -> CoreResult<Self> {
        let site = SiteKey::new(pos, genome_length)?;
        Ok(GenomicKey {
            pos: site.pos,
            reference: normalize_allele(reference)?,
            alternate: normalize_allele(alternate)?,
        })
    }

    pub fn site(&self) -> SiteKey {
        SiteKey { pos: self.pos }
    }
}

impl Display for GenomicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}>{}", self.pos, self.reference, self.alternate)
    }
}

/// Upper-case an allele and check it only holds IUPAC nucleotide codes.
pub fn normalize_allele(allele: &str) -> CoreResult<String> {
    let upper = allele.trim().to_ascii_uppercase();
    if upper.is_empty() || !upper.chars().all(|c| IUPAC_NUCLEOTIDES.contains(c)) {
        return Err(CoreError::InvalidAllele(allele.to_string()));
    }
    Ok(upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::consts::MT_GENOME_LENGTH;

    #[rstest]
    #[case(1)]
    #[case(3243)]
    #[case(16569)]
    fn test_site_key_in_range(#[case] pos: u32) {
        let key = SiteKey::new(pos, MT_GENOME_LENGTH).unwrap();
        assert_eq!(key.pos, pos);
    }

    #[rstest]
    #[case(0)]
    #[case(16570)]
    fn test_site_key_out_of_range(#[case] pos: u32) {
        let result = SiteKey::new(pos, MT_GENOME_LENGTH);
        assert!(matches!(
            result,
            Err(CoreError::PositionOutOfRange { .. })
        ));
    }

    #[rstest]
    fn test_genomic_key_normalizes_case() {
        let key = GenomicKey::new(3243, "a", "g", MT_GENOME_LENGTH).unwrap();
        assert_eq!(key.reference, "A");
        assert_eq!(key.alternate, "G");
        assert_eq!(key.to_string(), "3243:A>G");
        assert_eq!(key.site(), SiteKey { pos: 3243 });
    }

    #[rstest]
    #[case("")]
    #[case("<DEL>")]
    #[case("*")]
    #[case("AXT")]
    fn test_genomic_key_rejects_invalid_alleles(#[case] alt: &str) {
        let result = GenomicKey::new(3243, "A", alt, MT_GENOME_LENGTH);
        assert!(matches!(result, Err(CoreError::InvalidAllele(_))));
    }
}
