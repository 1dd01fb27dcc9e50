//! Minimal VCF reading and writing: enough to inject INFO fields and set
//! sample genotypes on a single-sample call-set while keeping every other
//! column as written.
pub mod header;
pub mod reader;
pub mod record;
pub mod writer;

// re-exports
pub use self::header::VcfHeader;
pub use self::reader::{VcfReader, read_records};
pub use self::record::VariantRecord;
pub use self::writer::VcfWriter;
