use crate::core::formats::traits::{FormatRead, FormatWrite};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XvgError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: XvgParseErrorKind,
    },
    #[error("Missing required content: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum XvgParseErrorKind {
    #[error("Invalid float in column {column} (value: '{value}')")]
    InvalidFloat { column: usize, value: String },
    #[error("Row has {found} columns, expected {expected}")]
    RowShape { expected: usize, found: usize },
}

/// A named, axis-labeled numeric table parsed from an XVG file.
///
/// Column 0 is the x axis. `heads` carries one display label per column,
/// derived by pairing the legends with fragments of the y-axis label.
/// `row_tags` is non-empty only when every data row ends in a single
/// non-numeric token (the residue-name column of a dihedral table); it then
/// has exactly `row_count` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XvgData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legends: Vec<String>,
    pub column_count: usize,
    pub row_count: usize,
    pub columns: Vec<Vec<f64>>,
    pub heads: Vec<String>,
    pub row_tags: Vec<String>,
}

fn quoted_content(text: &str) -> Option<&str> {
    let start = text.find('"')?;
    let end = text.rfind('"')?;
    if end > start {
        Some(&text[start + 1..end])
    } else {
        None
    }
}

fn is_series_legend(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('s') && chars.as_str().chars().all(|c| c.is_ascii_digit())
        && token.len() > 1
}

impl XvgData {
    /// Builds a table directly from columns, deriving `heads` the same way
    /// the parser does. Used by analytics that synthesize new tables.
    pub fn from_columns(
        title: &str,
        x_label: &str,
        y_label: &str,
        legends: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Self {
        let column_count = columns.len();
        let row_count = columns.first().map_or(0, |c| c.len());
        let heads = derive_heads(x_label, y_label, &legends, column_count);
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            legends,
            column_count,
            row_count,
            columns,
            heads,
            row_tags: Vec::new(),
        }
    }

    /// True when the table carries a trailing textual column per row.
    pub fn has_row_tags(&self) -> bool {
        !self.row_tags.is_empty()
    }
}

/// Derives the per-column display labels.
///
/// The first head is the x label. The y label is split on commas into
/// fragments: when the fragment count equals the legend count each legend is
/// concatenated with its fragment; when exactly one fragment is a
/// parenthesised unit it is appended to every legend; otherwise the legends
/// stand alone. Missing trailing labels are synthesized so the result always
/// has `column_count` entries.
fn derive_heads(
    x_label: &str,
    y_label: &str,
    legends: &[String],
    column_count: usize,
) -> Vec<String> {
    let mut heads = Vec::with_capacity(column_count);
    heads.push(x_label.to_string());

    if legends.is_empty() {
        if column_count >= 2 {
            heads.push(y_label.to_string());
        }
    } else {
        let fragments: Vec<&str> = y_label.split(',').collect();
        let parenthesised: Vec<&str> = fragments
            .iter()
            .map(|f| f.trim())
            .filter(|f| f.starts_with('(') && f.ends_with(')') && f.len() >= 2)
            .collect();

        if fragments.len() == legends.len() {
            for (legend, fragment) in legends.iter().zip(fragments.iter()) {
                heads.push(format!("{} {}", legend, fragment.trim()));
            }
        } else if parenthesised.len() == 1 {
            for legend in legends {
                heads.push(format!("{} {}", legend, parenthesised[0]));
            }
        } else {
            heads.extend(legends.iter().cloned());
        }
    }

    while heads.len() < column_count {
        heads.push(format!("{} s{}", y_label, heads.len() - 1));
    }
    heads.truncate(column_count);
    heads
}

impl FormatRead for XvgData {
    type Error = XvgError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let mut title = String::new();
        let mut x_label = String::new();
        let mut y_label = String::new();
        let mut legends: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();
        let mut row_tags: Vec<String> = Vec::new();
        let mut has_tags = false;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('&') {
                continue;
            }

            if let Some(directive) = trimmed.strip_prefix('@') {
                let directive = directive.trim_start();
                let mut tokens = directive.split_whitespace();
                match tokens.next() {
                    Some("title") => {
                        if let Some(content) = quoted_content(directive) {
                            title = content.to_string();
                        }
                    }
                    Some("xaxis") if tokens.next() == Some("label") => {
                        if let Some(content) = quoted_content(directive) {
                            x_label = content.to_string();
                        }
                    }
                    Some("yaxis") if tokens.next() == Some("label") => {
                        if let Some(content) = quoted_content(directive) {
                            y_label = content.to_string();
                        }
                    }
                    Some(series)
                        if is_series_legend(series) && tokens.next() == Some("legend") =>
                    {
                        if let Some(content) = quoted_content(directive) {
                            legends.push(content.to_string());
                        }
                    }
                    _ => {}
                }
                continue;
            }

            let tokens: Vec<&str> = trimmed.split_whitespace().collect();

            if columns.is_empty() {
                // The first data row fixes the table shape. A non-numeric
                // trailing token defines the tag column.
                let mut values = Vec::with_capacity(tokens.len());
                for (idx, token) in tokens.iter().enumerate() {
                    match token.parse::<f64>() {
                        Ok(v) => values.push(v),
                        Err(_) if idx == tokens.len() - 1 && idx > 0 => {
                            has_tags = true;
                            row_tags.push(token.to_string());
                        }
                        Err(_) => {
                            return Err(XvgError::Parse {
                                line: line_num,
                                kind: XvgParseErrorKind::InvalidFloat {
                                    column: idx + 1,
                                    value: token.to_string(),
                                },
                            });
                        }
                    }
                }
                columns = values.iter().map(|&v| vec![v]).collect();
                continue;
            }

            let expected = columns.len() + usize::from(has_tags);
            if tokens.len() != expected {
                return Err(XvgError::Parse {
                    line: line_num,
                    kind: XvgParseErrorKind::RowShape {
                        expected,
                        found: tokens.len(),
                    },
                });
            }
            for (idx, column) in columns.iter_mut().enumerate() {
                let token = tokens[idx];
                let value = token.parse::<f64>().map_err(|_| XvgError::Parse {
                    line: line_num,
                    kind: XvgParseErrorKind::InvalidFloat {
                        column: idx + 1,
                        value: token.to_string(),
                    },
                })?;
                column.push(value);
            }
            if has_tags {
                row_tags.push(tokens[expected - 1].to_string());
            }
        }

        if columns.is_empty() {
            return Err(XvgError::MissingRecord("numeric data rows".into()));
        }

        let column_count = columns.len();
        let row_count = columns[0].len();
        let heads = derive_heads(&x_label, &y_label, &legends, column_count);

        Ok(Self {
            title,
            x_label,
            y_label,
            legends,
            column_count,
            row_count,
            columns,
            heads,
            row_tags,
        })
    }
}

impl FormatWrite for XvgData {
    type Error = XvgError;

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "# this file was created by DIT")?;
        writeln!(writer, "@    title \"{}\"", self.title)?;
        writeln!(writer, "@    xaxis  label \"{}\"", self.x_label)?;
        writeln!(writer, "@    yaxis  label \"{}\"", self.y_label)?;
        writeln!(writer, "@TYPE xy")?;
        writeln!(writer, "@ legend on")?;
        writeln!(writer, "@ legend box on")?;
        writeln!(writer, "@ legend loctype view")?;
        writeln!(writer, "@ legend 0.78, 0.8")?;
        writeln!(writer, "@ legend length {}", self.column_count - 1)?;
        for (i, head) in self.heads.iter().skip(1).enumerate() {
            writeln!(writer, "@ s{} legend \"{}\"", i, head)?;
        }

        for row in 0..self.row_count {
            for column in &self.columns {
                write!(writer, "{:16.6}", column[row])?;
            }
            if self.has_row_tags() {
                write!(writer, " {}", self.row_tags[row])?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}
