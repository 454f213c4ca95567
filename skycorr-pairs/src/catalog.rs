//! Catalog file loading and writing.
//!
//! Catalogs are whitespace-separated text, one source per line, with `#`
//! comment lines skipped. Files ending in `.gz` are transparently
//! gzip-decompressed on read. Column positions are caller-configurable since
//! survey dumps rarely agree on layout.
//!
//! [`write_precomputed`] / [`read_precomputed`] round-trip the six-column
//! record format of [`Source`]'s `Display` impl, so the trig columns are
//! computed once and reused across runs.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use skycorr_core::{CorrError, Source};
use skycorr_cosmo::{Cosmology, RedshiftSource};

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn open_catalog(path: &Path) -> Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open catalog file: {:?}", path))?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn parse_column(cols: &[&str], index: usize, line_no: usize, path: &Path) -> Result<f64> {
    let raw = cols.get(index).ok_or_else(|| {
        CorrError::data_error(
            &path.display().to_string(),
            "parse",
            &format!(
                "line {}: missing column {} ({} present)",
                line_no,
                index,
                cols.len()
            ),
        )
    })?;
    let value = raw.parse::<f64>().map_err(|_| {
        CorrError::data_error(
            &path.display().to_string(),
            "parse",
            &format!("line {}: bad float {:?}", line_no, raw),
        )
    })?;
    Ok(value)
}

/// Reads `(ra, dec)` columns from a text catalog into sources.
pub fn read_sources(path: impl AsRef<Path>, ra_col: usize, dec_col: usize) -> Result<Vec<Source>> {
    read_sources_filtered(path, ra_col, dec_col, |_| true)
}

/// [`read_sources`] with a row filter applied to the split columns before
/// parsing. Rows the filter rejects are skipped without error.
pub fn read_sources_filtered<F>(
    path: impl AsRef<Path>,
    ra_col: usize,
    dec_col: usize,
    filter: F,
) -> Result<Vec<Source>>
where
    F: Fn(&[&str]) -> bool,
{
    let path = path.as_ref();
    let reader = open_catalog(path)?;
    let mut sources = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read from {:?}", path))?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let cols: Vec<&str> = line.split_whitespace().collect();
        if !filter(&cols) {
            continue;
        }

        let ra = parse_column(&cols, ra_col, line_no + 1, path)?;
        let dec = parse_column(&cols, dec_col, line_no + 1, path)?;
        sources.push(Source::new(ra, dec));
    }

    Ok(sources)
}

/// Reads `(ra, dec, z)` columns, decorating each source with its comoving
/// distance under `cosmology`.
pub fn read_redshift_sources(
    path: impl AsRef<Path>,
    ra_col: usize,
    dec_col: usize,
    z_col: usize,
    cosmology: &Cosmology,
) -> Result<Vec<RedshiftSource>> {
    let path = path.as_ref();
    let reader = open_catalog(path)?;
    let mut sources = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read from {:?}", path))?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let cols: Vec<&str> = line.split_whitespace().collect();
        let ra = parse_column(&cols, ra_col, line_no + 1, path)?;
        let dec = parse_column(&cols, dec_col, line_no + 1, path)?;
        let z = parse_column(&cols, z_col, line_no + 1, path)?;

        let source = RedshiftSource::new(ra, dec, z, cosmology)
            .with_context(|| format!("{:?} line {}: distance integration failed", path, line_no + 1))?;
        sources.push(source);
    }

    Ok(sources)
}

/// Appends `.gz` unless the path already carries it.
fn ensure_gz(path: &Path) -> PathBuf {
    if is_gzip(path) {
        path.to_path_buf()
    } else {
        let mut name = OsString::from(path.as_os_str());
        name.push(".gz");
        PathBuf::from(name)
    }
}

/// Writes sources as a gzip'd precomputed-record catalog.
///
/// The output path gets a `.gz` suffix if it lacks one. Returns the path
/// actually written.
pub fn write_precomputed(path: impl AsRef<Path>, sources: &[Source]) -> Result<PathBuf> {
    let path = ensure_gz(path.as_ref());
    let file =
        File::create(&path).with_context(|| format!("Failed to create catalog file: {:?}", path))?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

    for source in sources {
        writeln!(encoder, "{}", source)
            .with_context(|| format!("Failed to write to {:?}", path))?;
    }
    encoder
        .finish()
        .with_context(|| format!("Failed to finish gzip stream for {:?}", path))?;

    Ok(path)
}

/// Reads a precomputed-record catalog written by [`write_precomputed`].
///
/// The stored trig columns are trusted as-is; nothing is recomputed.
pub fn read_precomputed(path: impl AsRef<Path>) -> Result<Vec<Source>> {
    let path = path.as_ref();
    let reader = open_catalog(path)?;
    let mut sources = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read from {:?}", path))?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 6 {
            return Err(CorrError::data_error(
                &path.display().to_string(),
                "parse",
                &format!(
                    "line {}: expected 6 precomputed columns, found {}",
                    line_no + 1,
                    cols.len()
                ),
            )
            .into());
        }

        let mut values = [0.0f64; 6];
        for (value, col) in values.iter_mut().zip(&cols) {
            *value = col
                .parse()
                .with_context(|| format!("{:?} line {}: bad float {:?}", path, line_no + 1, col))?;
        }
        sources.push(Source::from_precomputed(
            values[0], values[1], values[2], values[3], values[4], values[5],
        ));
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("skycorr_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_read_sources_skips_comments_and_blanks() {
        let path = scratch_path("plain.dat");
        fs::write(&path, "# header\n10.0 20.0\n\n30.0 -40.0 extra\n").unwrap();

        let sources = read_sources(&path, 0, 1).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].ra, 10.0);
        assert_eq!(sources[1].dec, -40.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_sources_column_selection() {
        let path = scratch_path("cols.dat");
        fs::write(&path, "x 10.0 20.0\nx 11.0 21.0\n").unwrap();

        let sources = read_sources(&path, 1, 2).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].ra, 11.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_sources_filtered() {
        let path = scratch_path("filter.dat");
        fs::write(&path, "10.0 20.0 keep\n11.0 21.0 drop\n").unwrap();

        let sources = read_sources_filtered(&path, 0, 1, |cols| cols[2] == "keep").unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].ra, 10.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_sources_bad_float_is_error() {
        let path = scratch_path("bad.dat");
        fs::write(&path, "10.0 not-a-number\n").unwrap();

        assert!(read_sources(&path, 0, 1).is_err());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_precomputed_roundtrip() {
        let path = scratch_path("precomputed");
        let original = vec![
            Source::new(113.663293553, 32.0010041224),
            Source::new(247.25, -55.5),
        ];

        let written = write_precomputed(&path, &original).unwrap();
        assert!(is_gzip(&written));

        let restored = read_precomputed(&written).unwrap();
        assert_eq!(restored.len(), original.len());
        for (a, b) in original.iter().zip(&restored) {
            assert!((a.ra - b.ra).abs() < 1e-9);
            assert!((a.dec - b.dec).abs() < 1e-9);
            assert!((a.cos_dec - b.cos_dec).abs() < 1e-11);
        }

        let _ = fs::remove_file(&written);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = read_sources("/nonexistent/skycorr.dat", 0, 1).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
