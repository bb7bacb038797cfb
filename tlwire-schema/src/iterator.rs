//! Iterator that drives [`crate::parse_tl_file`].

use crate::entry::{EntryKind, SchemaEntry};
use crate::errors::ParseError;
use crate::text::parse_definition;

pub(crate) struct TlIterator<'a> {
    lines: std::str::Lines<'a>,
    /// Current section; flips on `---functions---`.
    kind: EntryKind,
    /// Accumulates multi-line definitions (lines without `;` terminator).
    pending: String,
}

impl<'a> TlIterator<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            lines: src.lines(),
            kind: EntryKind::Constructor,
            pending: String::new(),
        }
    }

    fn handle_separator(&mut self, line: &str) -> bool {
        match line {
            "---functions---" => { self.kind = EntryKind::Method;      true }
            "---types---"     => { self.kind = EntryKind::Constructor; true }
            _ => false,
        }
    }
}

impl Iterator for TlIterator<'_> {
    type Item = Result<SchemaEntry, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // A line may close one definition and hold several more.
            if let Some(end) = self.pending.find(';') {
                let raw: String = self.pending.drain(..=end).collect();
                let raw = raw.trim().trim_end_matches(';').trim();
                if raw.is_empty() {
                    continue;
                }
                let result = parse_definition(raw, self.kind);
                if let Err(e) = &result {
                    log::debug!("[tlwire] rejected `.tl` definition `{raw}`: {e}");
                }
                return Some(result);
            }

            let line = self.lines.next()?;
            let trimmed = line.split("//").next().unwrap_or_default().trim();
            if trimmed.is_empty() {
                continue;
            }
            if self.handle_separator(trimmed) {
                continue;
            }

            self.pending.push(' ');
            self.pending.push_str(trimmed);
        }
    }
}
