/// Length of the revised Cambridge Reference Sequence (rCRS, NC_012920).
pub const MT_GENOME_LENGTH: u32 = 16569;

/// Number of bases the shifted reference is rotated by.
pub const DEFAULT_SHIFT: u32 = 8569;

/// Canonical-coordinate interval the canonical alignment is trusted for (closed).
pub const CANONICAL_TRUSTED_START: u32 = 577;
pub const CANONICAL_TRUSTED_END: u32 = 16023;

/// Shifted-coordinate interval the shifted alignment is trusted for (closed).
/// Maps back onto [16024, 16569] and [1, 576].
pub const SHIFTED_TRUSTED_START: u32 = 8024;
pub const SHIFTED_TRUSTED_END: u32 = 9145;

/// Calling intervals handed to Mutect2.
pub const NON_CONTROL_REGION: &str = "chrM:576-16024";
pub const CONTROL_REGION: &str = "chrM:8025-9144";

pub const DEFAULT_MT_CONTIG: &str = "chrM";
pub const MT_CONTIG_NAMES: [&str; 2] = ["MT", "chrM"];

pub const DEFAULT_HOMOPLASMY_THRESHOLD: f64 = 0.95;

pub const SNPEFF_DB: &str = "NC_012920";

/// IUPAC nucleotide codes accepted in REF/ALT alleles.
pub const IUPAC_NUCLEOTIDES: &str = "ACGTURYSWKMBDHVN";

/// Tokens treated as a missing value in annotation tables.
pub const NULL_TOKENS: [&str; 6] = ["", ".", "NA", "nan", "NaN", "None"];
