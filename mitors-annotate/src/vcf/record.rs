use std::fmt::Write as _;

pub const GENOTYPE_KEY: &str = "GT";
pub const ALLELE_FRACTION_KEY: &str = "AF";
pub const MISSING: &str = ".";

///
/// One VCF data line.
///
/// INFO entries keep their file order; a flag entry has no value. Sample
/// columns are stored as one value per FORMAT key.
///
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    pub chrom: String,
    pub pos: u32,
    pub id: String,
    pub reference: String,
    pub alternates: Vec<String>,
    pub qual: String,
    pub filter: String,
    pub info: Vec<(String, Option<String>)>,
    pub format: Vec<String>,
    pub samples: Vec<Vec<String>>,
}

impl VariantRecord {
    ///
    /// Parse a tab separated data line.
    ///
    pub fn from_line(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.trim_end_matches(['\n', '\r']).split('\t').collect();
        if fields.len() < 8 {
            return Err(format!("expected at least 8 columns, found {}", fields.len()));
        }

        let pos = fields[1]
            .parse::<u32>()
            .map_err(|_| format!("invalid POS '{}'", fields[1]))?;

        let alternates = match fields[4] {
            MISSING => vec![],
            alts => alts.split(',').map(|a| a.to_string()).collect(),
        };

        let info = match fields[7] {
            MISSING | "" => vec![],
            info => info
                .split(';')
                .filter(|entry| !entry.is_empty())
                .map(|entry| match entry.split_once('=') {
                    Some((key, value)) => (key.to_string(), Some(value.to_string())),
                    None => (entry.to_string(), None),
                })
                .collect(),
        };

        let format = match fields.get(8) {
            Some(format) => format.split(':').map(|k| k.to_string()).collect(),
            None => vec![],
        };

        let samples = fields
            .iter()
            .skip(9)
            .map(|sample| sample.split(':').map(|v| v.to_string()).collect())
            .collect();

        Ok(VariantRecord {
            chrom: fields[0].to_string(),
            pos,
            id: fields[2].to_string(),
            reference: fields[3].to_string(),
            alternates,
            qual: fields[5].to_string(),
            filter: fields[6].to_string(),
            info,
            format,
            samples,
        })
    }

    pub fn to_line(&self) -> String {
        let mut line = String::new();

        let alts = if self.alternates.is_empty() {
            MISSING.to_string()
        } else {
            self.alternates.join(",")
        };

        let info = if self.info.is_empty() {
            MISSING.to_string()
        } else {
            self.info
                .iter()
                .map(|(key, value)| match value {
                    Some(value) => format!("{}={}", key, value),
                    None => key.clone(),
                })
                .collect::<Vec<String>>()
                .join(";")
        };

        let _ = write!(
            line,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom, self.pos, self.id, self.reference, alts, self.qual, self.filter, info
        );

        if !self.format.is_empty() {
            let _ = write!(line, "\t{}", self.format.join(":"));
            for sample in &self.samples {
                let _ = write!(line, "\t{}", sample.join(":"));
            }
        }

        line
    }

    pub fn info_value(&self, key: &str) -> Option<&str> {
        self.info
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Set an INFO value, replacing an existing entry with the same key.
    pub fn set_info(&mut self, key: &str, value: &str) {
        let value = Some(encode_info_value(value));
        match self.info.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.info.push((key.to_string(), value)),
        }
    }

    pub fn sample_value(&self, sample: usize, key: &str) -> Option<&str> {
        let idx = self.format.iter().position(|k| k == key)?;
        self.samples
            .get(sample)?
            .get(idx)
            .map(|v| v.as_str())
            .filter(|v| *v != MISSING)
    }

    /// First value of the sample's `AF` field, if it is a fraction in [0, 1].
    pub fn allele_fraction(&self, sample: usize) -> Option<f64> {
        self.sample_value(sample, ALLELE_FRACTION_KEY)?
            .split(',')
            .next()?
            .parse::<f64>()
            .ok()
            .filter(|af| (0.0..=1.0).contains(af))
    }

    pub fn genotype(&self, sample: usize) -> Option<&str> {
        self.sample_value(sample, GENOTYPE_KEY)
    }

    ///
    /// Set the genotype of a sample. `GT` is added as the first FORMAT key
    /// when the record has none.
    ///
    pub fn set_genotype(&mut self, sample: usize, genotype: &str) {
        let idx = match self.format.iter().position(|k| k == GENOTYPE_KEY) {
            Some(idx) => idx,
            None => {
                self.format.insert(0, GENOTYPE_KEY.to_string());
                for values in self.samples.iter_mut() {
                    values.insert(0, MISSING.to_string());
                }
                0
            }
        };

        if let Some(values) = self.samples.get_mut(sample) {
            if values.len() <= idx {
                values.resize(idx + 1, MISSING.to_string());
            }
            values[idx] = genotype.to_string();
        }
    }
}

///
/// Percent-encode the characters that may not appear in an INFO value.
///
pub fn encode_info_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => encoded.push_str("%25"),
            ';' => encoded.push_str("%3B"),
            '=' => encoded.push_str("%3D"),
            ',' => encoded.push_str("%2C"),
            '\t' => encoded.push_str("%09"),
            '\n' => encoded.push_str("%0A"),
            '\r' => encoded.push_str("%0D"),
            c => encoded.push(c),
        }
    }
    encoded
}

pub fn decode_info_value(value: &str) -> String {
    let mut decoded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(idx) = rest.find('%') {
        decoded.push_str(&rest[..idx]);
        let code = rest
            .get(idx + 1..idx + 3)
            .filter(|c| c.chars().all(|ch| ch.is_ascii_hexdigit()));
        match code.and_then(|c| u8::from_str_radix(c, 16).ok()) {
            Some(byte) if byte.is_ascii() => {
                decoded.push(byte as char);
                rest = &rest[idx + 3..];
            }
            _ => {
                decoded.push('%');
                rest = &rest[idx + 1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}
