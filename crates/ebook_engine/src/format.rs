/// An ebook format the external converter understands, with the file
/// extensions (lower-case, dot included) that identify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertibleFormat {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

impl ConvertibleFormat {
    pub const fn new(name: &'static str, extensions: &'static [&'static str]) -> Self {
        Self { name, extensions }
    }

    /// Extension written for converted files, without the leading dot.
    ///
    /// This is the lower-cased format name, which is also the first entry of
    /// `extensions` for every format in [`FORMATS`].
    pub fn target_extension(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    pub fn matches_extension(&self, ext_with_dot: &str) -> bool {
        self.extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext_with_dot))
    }
}

pub const FORMATS: &[ConvertibleFormat] = &[
    ConvertibleFormat::new("EPUB", &[".epub"]),
    ConvertibleFormat::new("MOBI", &[".mobi"]),
    ConvertibleFormat::new("AZW3", &[".azw3", ".azw"]),
    ConvertibleFormat::new("PDF", &[".pdf"]),
    ConvertibleFormat::new("DOCX", &[".docx"]),
    ConvertibleFormat::new("TXT", &[".txt"]),
    ConvertibleFormat::new("HTML", &[".html", ".htm"]),
    ConvertibleFormat::new("FB2", &[".fb2"]),
    ConvertibleFormat::new("LIT", &[".lit"]),
    ConvertibleFormat::new("PDB", &[".pdb"]),
    ConvertibleFormat::new("RTF", &[".rtf"]),
    ConvertibleFormat::new("SNB", &[".snb"]),
    ConvertibleFormat::new("TCR", &[".tcr"]),
    ConvertibleFormat::new("HTMLZ", &[".htmlz"]),
    ConvertibleFormat::new("TXTZ", &[".txtz"]),
    ConvertibleFormat::new("CBZ", &[".cbz"]),
    ConvertibleFormat::new("CBR", &[".cbr"]),
    ConvertibleFormat::new("CBC", &[".cbc"]),
    ConvertibleFormat::new("ODT", &[".odt"]),
];

/// Case-insensitive lookup by format name.
pub fn find_format(name: &str) -> Option<&'static ConvertibleFormat> {
    FORMATS
        .iter()
        .find(|format| format.name.eq_ignore_ascii_case(name.trim()))
}

pub fn format_names() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().map(|format| format.name)
}

/// Formats named in `names`, in table order. Unknown names select nothing.
pub fn formats_named<S: AsRef<str>>(names: &[S]) -> Vec<&'static ConvertibleFormat> {
    FORMATS
        .iter()
        .filter(|format| {
            names
                .iter()
                .any(|name| format.name.eq_ignore_ascii_case(name.as_ref().trim()))
        })
        .collect()
}
