use crate::core::formats::traits::{FormatRead, FormatWrite};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::warn;

/// Default number of indices per emitted row, matching the usual GMX layout.
pub const DEFAULT_ROW_WIDTH: usize = 15;

#[derive(Debug, Error)]
pub enum NdxError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: NdxParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum NdxParseErrorKind {
    #[error("Invalid atom index (value: '{value}')")]
    InvalidInt { value: String },
    #[error("Group header must be enclosed in '[' and ']'")]
    UnterminatedHeader,
    #[error("Atom indices appear before any group header")]
    OrphanIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGroup {
    pub name: String,
    pub indexes: Vec<usize>,
}

/// Named groups of 1-based atom indices, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexGroups {
    groups: Vec<IndexGroup>,
}

impl IndexGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexGroup> {
        self.groups.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&IndexGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Looks a group up by its 1-based position, the numbering shown to users.
    pub fn by_ordinal(&self, ordinal: usize) -> Option<&IndexGroup> {
        ordinal.checked_sub(1).and_then(|i| self.groups.get(i))
    }

    /// Inserts or replaces a group. An existing group with the same name is
    /// removed first, so the name ends up exactly once, at the end of the
    /// insertion order.
    pub fn set(&mut self, name: &str, indexes: Vec<usize>) {
        self.groups.retain(|g| g.name != name);
        self.groups.push(IndexGroup {
            name: name.to_string(),
            indexes,
        });
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.name != name);
        self.groups.len() != before
    }

    /// Drops every group whose name is not in `names`.
    pub fn keep_only(&mut self, names: &[String]) {
        self.groups.retain(|g| names.iter().any(|n| n == &g.name));
    }

    fn push_parsed(&mut self, group: IndexGroup) {
        if self.contains(&group.name) {
            warn!(
                "Duplicate group name '{}'; dropping the earlier definition",
                group.name
            );
            self.groups.retain(|g| g.name != group.name);
        }
        self.groups.push(group);
    }

    /// Canonical textual form with up to `per_row` indices per row, each
    /// right-aligned in a 4-column field.
    pub fn format_with_columns(&self, per_row: usize) -> String {
        let per_row = per_row.max(1);
        let mut out = String::new();
        for group in &self.groups {
            out.push_str(&format!("[ {} ]\n", group.name));
            for chunk in group.indexes.chunks(per_row) {
                let row: Vec<String> = chunk.iter().map(|i| format!("{:>4}", i)).collect();
                out.push_str(&row.join(" "));
                out.push('\n');
            }
        }
        out
    }
}

impl FormatRead for IndexGroups {
    type Error = NdxError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let mut groups = Self::new();
        let mut current: Option<IndexGroup> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }

            if trimmed.starts_with('[') {
                let Some(name) = trimmed
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                else {
                    return Err(NdxError::Parse {
                        line: line_num,
                        kind: NdxParseErrorKind::UnterminatedHeader,
                    });
                };
                if let Some(done) = current.take() {
                    groups.push_parsed(done);
                }
                current = Some(IndexGroup {
                    name: name.trim().to_string(),
                    indexes: Vec::new(),
                });
                continue;
            }

            let Some(group) = current.as_mut() else {
                return Err(NdxError::Parse {
                    line: line_num,
                    kind: NdxParseErrorKind::OrphanIndex,
                });
            };
            for token in trimmed.split_whitespace() {
                let index = token.parse::<usize>().map_err(|_| NdxError::Parse {
                    line: line_num,
                    kind: NdxParseErrorKind::InvalidInt {
                        value: token.to_string(),
                    },
                })?;
                group.indexes.push(index);
            }
        }

        if let Some(done) = current.take() {
            groups.push_parsed(done);
        }
        Ok(groups)
    }
}

impl FormatWrite for IndexGroups {
    type Error = NdxError;

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        writer.write_all(self.format_with_columns(DEFAULT_ROW_WIDTH).as_bytes())?;
        Ok(())
    }
}
