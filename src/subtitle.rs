use std::sync::LazyLock;

use regex::Regex;

static SEQUENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid sequence regex"));

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}:\d{2}:\d{2},\d{3} --> \d{2}:\d{2}:\d{2},\d{3}$")
        .expect("valid timestamp regex")
});

/// Whether a line carries subtitle text, as opposed to a blank separator,
/// a cue number or a `HH:MM:SS,mmm --> HH:MM:SS,mmm` timing line.
pub fn is_translatable(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !SEQUENCE_PATTERN.is_match(trimmed) && !TIMESTAMP_PATTERN.is_match(trimmed)
}

/// Join a multi-line translation into one line so the cue keeps its line count
pub fn single_line(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line of the document together with its position in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub index: usize,
    pub text: String,
}

impl LineRecord {
    /// Text handed to the translator, without a carriage return left over from CRLF files
    pub fn payload(&self) -> &str {
        self.text.strip_suffix('\r').unwrap_or(&self.text)
    }
}

/// SubRip file held as raw lines. Line count and order never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleDocument {
    lines: Vec<String>,
}

impl SubtitleDocument {
    /// Split on `\n`; a trailing newline yields a final empty line so it survives reassembly.
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines that take part in translation, in file order
    pub fn translatable_lines(&self) -> Vec<LineRecord> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_translatable(line))
            .map(|(index, line)| LineRecord {
                index,
                text: line.clone(),
            })
            .collect()
    }

    /// Overwrite the given positions, keeping a CR line ending where the original had one.
    /// Indices outside the document are ignored.
    pub fn reassemble<I>(&mut self, translated: I)
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        for (index, text) in translated {
            let Some(line) = self.lines.get_mut(index) else {
                continue;
            };
            *line = if line.ends_with('\r') {
                format!("{}\r", text)
            } else {
                text
            };
        }
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}
