pub mod key;
pub mod value;

// re-export for cleaner imports
pub use self::key::{GenomicKey, SiteKey};
pub use self::value::{FieldDefinition, FieldType, FieldValue};
