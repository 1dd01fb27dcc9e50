use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::NULL_TOKENS;
use crate::errors::{CoreError, CoreResult};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Float,
    Integer,
}

impl FromStr for FieldType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "float" => Ok(FieldType::Float),
            "integer" => Ok(FieldType::Integer),
            _ => Err(CoreError::UnknownFieldType(s.to_string())),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "String",
            FieldType::Float => "Float",
            FieldType::Integer => "Integer",
        };
        write!(f, "{}", name)
    }
}

///
/// A single non-null annotation value. Nulls are modelled as `Option::None`
/// by the tables holding these.
///
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Float(f64),
    Integer(i64),
}

impl FieldValue {
    ///
    /// Parse a raw table cell into a typed value.
    ///
    /// Returns `Ok(None)` for the null tokens (`""`, `.`, `NA`, `nan`, ...).
    pub fn parse(raw: &str, field_type: FieldType) -> CoreResult<Option<FieldValue>> {
        let raw = raw.trim();
        if NULL_TOKENS.contains(&raw) {
            return Ok(None);
        }

        let invalid = || CoreError::InvalidValue {
            value: raw.to_string(),
            expected: field_type.to_string(),
        };

        let value = match field_type {
            FieldType::String => FieldValue::String(raw.to_string()),
            FieldType::Float => FieldValue::Float(raw.parse::<f64>().map_err(|_| invalid())?),
            FieldType::Integer => match raw.parse::<i64>() {
                Ok(v) => FieldValue::Integer(v),
                // integer columns with gaps are often written as floats, e.g. `12.0`
                Err(_) => {
                    let v = raw.parse::<f64>().map_err(|_| invalid())?;
                    if v.fract() != 0.0 {
                        return Err(invalid());
                    }
                    FieldValue::Integer(v as i64)
                }
            },
        };

        Ok(Some(value))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::String(_) => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
        }
    }
}

///
/// Definition of one injected annotation field, rendered as a VCF
/// `##INFO` header line.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub id: String,
    pub number: String,
    pub field_type: FieldType,
    pub description: String,
}

impl FieldDefinition {
    pub fn new(id: &str, field_type: FieldType, description: &str) -> Self {
        FieldDefinition {
            id: id.to_string(),
            number: "1".to_string(),
            field_type,
            description: description.to_string(),
        }
    }

    pub fn info_line(&self) -> String {
        format!(
            "##INFO=<ID={},Number={},Type={},Description=\"{}\">",
            self.id,
            self.number,
            self.field_type,
            self.description.replace('"', "\\\"")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", FieldType::Float)]
    #[case(".", FieldType::String)]
    #[case("NA", FieldType::Integer)]
    #[case("nan", FieldType::Float)]
    fn test_null_tokens(#[case] raw: &str, #[case] field_type: FieldType) {
        assert_eq!(FieldValue::parse(raw, field_type).unwrap(), None);
    }

    #[rstest]
    fn test_typed_values() {
        assert_eq!(
            FieldValue::parse("0.97", FieldType::Float).unwrap(),
            Some(FieldValue::Float(0.97))
        );
        assert_eq!(
            FieldValue::parse("12.0", FieldType::Integer).unwrap(),
            Some(FieldValue::Integer(12))
        );
        assert_eq!(
            FieldValue::parse("MT-TL1", FieldType::String).unwrap(),
            Some(FieldValue::String("MT-TL1".to_string()))
        );
    }

    #[rstest]
    fn test_invalid_values() {
        assert!(FieldValue::parse("high", FieldType::Float).is_err());
        assert!(FieldValue::parse("1.5", FieldType::Integer).is_err());
    }

    #[rstest]
    fn test_info_line() {
        let def = FieldDefinition::new("LOCUS", FieldType::String, "Variant locus/gene");
        assert_eq!(
            def.info_line(),
            "##INFO=<ID=LOCUS,Number=1,Type=String,Description=\"Variant locus/gene\">"
        );
    }
}
