//! Bundled asciimoji table for the picker and its tests.
//!
//! Rows live in `data/asciimoji.tsv` (`keyword<TAB>text`, one header row) and are
//! compiled into the crate. The table is parsed once, on first access, and keeps
//! file order.

use once_cell::sync::Lazy;

const ASCIIMOJI_TSV: &str = include_str!("../data/asciimoji.tsv");

static ASCIIMOJI: Lazy<Vec<(String, String)>> = Lazy::new(|| {
    parse(ASCIIMOJI_TSV).expect("bundled asciimoji table is well-formed")
});

/// All bundled `(keyword, text)` pairs, in file order.
pub fn dataset() -> &'static [(String, String)] {
    &ASCIIMOJI
}

fn parse(source: &str) -> Result<Vec<(String, String)>, csv::Error> {
    // Kaomoji are full of quotes and backslashes, so the file is read without quoting.
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .from_reader(source.as_bytes())
        .deserialize()
        .collect()
}
