use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Position {pos} is outside the mitochondrial genome [1, {genome_length}]")]
    PositionOutOfRange { pos: u32, genome_length: u32 },

    #[error("Invalid allele '{0}': expected a non-empty IUPAC nucleotide string")]
    InvalidAllele(String),

    #[error("Unknown mitochondrial reference: {0}. Expected one of: rcrs, rsrs")]
    UnknownReference(String),

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("Can't parse '{value}' as {expected}")]
    InvalidValue { value: String, expected: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
