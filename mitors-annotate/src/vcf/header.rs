use std::io::Write;

use mitors_core::FieldDefinition;

pub const INFO_PREFIX: &str = "##INFO=<ID=";
pub const COLUMN_PREFIX: &str = "#CHROM";

///
/// VCF header: the `##` meta lines and the `#CHROM` column line.
///
#[derive(Debug, Clone, PartialEq)]
pub struct VcfHeader {
    pub meta: Vec<String>,
    pub columns: Vec<String>,
}

impl VcfHeader {
    pub fn new(meta: Vec<String>, column_line: &str) -> Self {
        VcfHeader {
            meta,
            columns: column_line.split('\t').map(|c| c.to_string()).collect(),
        }
    }

    pub fn sample_names(&self) -> &[String] {
        self.columns.get(9..).unwrap_or(&[])
    }

    fn info_index(&self, id: &str) -> Option<usize> {
        self.meta.iter().position(|line| {
            line.strip_prefix(INFO_PREFIX)
                .and_then(|rest| rest.split([',', '>']).next())
                == Some(id)
        })
    }

    pub fn has_info(&self, id: &str) -> bool {
        self.info_index(id).is_some()
    }

    ///
    /// Declare an INFO field. An existing declaration with the same id is
    /// replaced; new ones go after the last INFO line.
    ///
    pub fn add_info_line(&mut self, field: &FieldDefinition) {
        let line = field.info_line();

        if let Some(idx) = self.info_index(&field.id) {
            self.meta[idx] = line;
            return;
        }

        let last_info = self
            .meta
            .iter()
            .rposition(|l| l.starts_with(INFO_PREFIX));
        match last_info {
            Some(idx) => self.meta.insert(idx + 1, line),
            None => self.meta.push(line),
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for line in &self.meta {
            writeln!(writer, "{}", line)?;
        }
        writeln!(writer, "{}", self.columns.join("\t"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mitors_core::FieldType;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn header() -> VcfHeader {
        VcfHeader::new(
            vec![
                "##fileformat=VCFv4.2".to_string(),
                "##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Depth\">".to_string(),
                "##contig=<ID=chrM,length=16569>".to_string(),
            ],
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA12878",
        )
    }

    #[rstest]
    fn test_add_info_line_after_last_info(header: VcfHeader) {
        let mut header = header;
        header.add_info_line(&FieldDefinition::new("LOCUS", FieldType::String, "Variant locus/gene"));

        assert_eq!(
            header.meta[2],
            "##INFO=<ID=LOCUS,Number=1,Type=String,Description=\"Variant locus/gene\">"
        );
        assert_eq!(header.meta.len(), 4);
        assert!(header.has_info("LOCUS"));
        assert!(!header.has_info("LOC"));
    }

    #[rstest]
    fn test_add_info_line_replaces_existing(header: VcfHeader) {
        let mut header = header;
        header.add_info_line(&FieldDefinition::new("DP", FieldType::Float, "Mean depth"));

        assert_eq!(header.meta.len(), 3);
        assert!(header.meta[1].contains("Type=Float"));
    }

    #[rstest]
    fn test_sample_names(header: VcfHeader) {
        assert_eq!(header.sample_names(), ["NA12878".to_string()]);
    }
}
