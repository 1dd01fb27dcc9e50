use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    let reader = BufReader::new(file);

    Ok(reader)
}

///
/// Build `<out_dir>/<prefix><suffix><ext>`.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use mitors_core::utils::create_output_path;
///
/// let path = create_output_path("NA12878", Path::new("out"), "_annotated", ".vcf");
/// assert_eq!(path, PathBuf::from("out/NA12878_annotated.vcf"));
/// ```
pub fn create_output_path(prefix: &str, out_dir: &Path, suffix: &str, ext: &str) -> PathBuf {
    out_dir.join(format!("{}{}{}", prefix, suffix, ext))
}

/// File name without its last extension, e.g. `sample.bam` -> `sample`.
pub fn file_basename(path: &Path) -> String {
    path.file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default()
        .to_string()
}

/// Parent directory of a file, `.` for bare file names.
pub fn file_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Append an extra extension, e.g. `out.vcf` -> `out.vcf.idx`.
pub fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(ext);
    PathBuf::from(name)
}

///
/// Return the subset of `files` that are not regular files on disk.
///
pub fn missing_files<P: AsRef<Path>>(files: &[P]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|f| f.as_ref())
        .filter(|f| !f.is_file())
        .map(Path::to_path_buf)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_dynamic_reader_plain_and_gzipped() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("depth.bed");
        std::fs::write(&plain, "chrM\t0\t5\t10\n").unwrap();

        let gzipped = dir.path().join("depth.bed.gz");
        let mut encoder = GzEncoder::new(File::create(&gzipped).unwrap(), Compression::default());
        encoder.write_all(b"chrM\t0\t5\t10\n").unwrap();
        encoder.finish().unwrap();

        for path in [plain, gzipped] {
            let lines: Vec<String> = get_dynamic_reader(&path)
                .unwrap()
                .lines()
                .map(|l| l.unwrap())
                .collect();
            assert_eq!(lines, vec!["chrM\t0\t5\t10".to_string()]);
        }
    }

    #[rstest]
    fn test_dynamic_reader_missing_file() {
        assert!(get_dynamic_reader(Path::new("does/not/exist.bed")).is_err());
    }

    #[rstest]
    fn test_path_helpers() {
        let bam = Path::new("data/bams/NA12878.bam");
        assert_eq!(file_basename(bam), "NA12878");
        assert_eq!(file_directory(bam), PathBuf::from("data/bams"));
        assert_eq!(file_directory(Path::new("NA12878.bam")), PathBuf::from("."));
        assert_eq!(
            with_appended_extension(Path::new("out/x.vcf"), ".idx"),
            PathBuf::from("out/x.vcf.idx")
        );
    }

    #[rstest]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.vcf");
        std::fs::write(&present, "").unwrap();
        let absent = dir.path().join("absent.vcf");

        assert_eq!(missing_files(&[&present, &absent]), vec![absent]);
    }
}
