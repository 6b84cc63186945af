/// Literal marker that precedes every inline binary fragment in instrument
/// output, e.g. `FLOATLE-stream/deflate:base64^Y2AAAQ4n...`.
pub const FRAGMENT_TAG: &str = "base64^";

// ---------------------------------------------------------------------------
// Fragment – one base64 run found in the raw record
// ---------------------------------------------------------------------------

/// One contiguous base64 run, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    sequence_index: usize,
    encoded_text: String,
}

impl Fragment {
    pub(crate) fn new(sequence_index: usize, encoded_text: impl Into<String>) -> Self {
        Self {
            sequence_index,
            encoded_text: encoded_text.into(),
        }
    }

    /// 1-based position of discovery.
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    pub fn encoded_text(&self) -> &str {
        &self.encoded_text
    }
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='
}

/// Extract all fragments tagged with [`FRAGMENT_TAG`].
pub fn extract_fragments(raw: &str) -> Vec<Fragment> {
    extract_fragments_with_tag(raw, FRAGMENT_TAG)
}

/// Extract every maximal base64 run that directly follows `tag`.
///
/// Control characters are removed before scanning: instruments use CR/LF
/// and other C0 bytes as record delimiters, and a payload that was wrapped
/// across lines must be joined back into one run. Empty runs are skipped
/// and do not consume a sequence index.
pub fn extract_fragments_with_tag(raw: &str, tag: &str) -> Vec<Fragment> {
    if tag.is_empty() {
        return Vec::new();
    }

    let clean: String = raw.chars().filter(|c| !c.is_control()).collect();

    let mut fragments = Vec::new();
    let mut rest = clean.as_str();
    while let Some(pos) = rest.find(tag) {
        let after = &rest[pos + tag.len()..];
        let run_len = after
            .char_indices()
            .find(|&(_, c)| !is_base64_char(c))
            .map(|(i, _)| i)
            .unwrap_or(after.len());

        if run_len > 0 {
            fragments.push(Fragment::new(fragments.len() + 1, &after[..run_len]));
        }
        rest = &after[run_len..];
    }
    fragments
}
