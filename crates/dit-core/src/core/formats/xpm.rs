use crate::core::formats::traits::{FormatRead, FormatWrite};
use crate::core::utils::colormap;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;
use tracing::warn;

const PALETTE_SIZE: usize = 64;
const PALETTE_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

#[derive(Debug, Error)]
pub enum XpmError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: XpmParseErrorKind,
    },
    #[error("Inconsistent structure: {0}")]
    Structure(String),
    #[error("Frame title '{title}' does not match 't= <integer> ps'")]
    InvalidFrameTitle { title: String },
    #[error("Unknown colormap id: {0}")]
    UnknownColormap(String),
    #[error("Palette refresh requires a Continuous matrix")]
    NotContinuous,
}

#[derive(Debug, Error)]
pub enum XpmParseErrorKind {
    #[error("Invalid integer (value: '{value}')")]
    InvalidInt { value: String },
    #[error("Invalid float (value: '{value}')")]
    InvalidFloat { value: String },
    #[error("Geometry line must carry 'width height color_count chars_per_pixel'")]
    GeometryShape,
    #[error("Malformed color entry: '{content}'")]
    ColorEntry { content: String },
    #[error("Pixel row has {found} characters, expected {expected}")]
    PixelRowWidth { expected: usize, found: usize },
    #[error("Pixel token '{token}' is not declared in the color table")]
    UnknownPixelToken { token: String },
    #[error("More than {height} pixel rows in a matrix of height {height}")]
    ExtraPixelRow { height: usize },
    #[error("Unknown matrix type '{value}'")]
    InvalidType { value: String },
    #[error("{axis}-axis has {found} ticks, expected {expected} or {}", expected + 1)]
    AxisLength {
        axis: char,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpmKind {
    Continuous,
    Discrete,
}

/// A categorical or continuous pixel matrix with a per-token legend.
///
/// `chars`, `colors` and `notes` are parallel sequences indexed by the same
/// integer; tokens keep their verbatim characters (a token may start with a
/// space when `chars_per_pixel > 1`), so lookups scan by position instead of
/// going through a trimmed map. Row 0 of both matrices is the top of the
/// image and `y_axis` runs top-to-bottom, i.e. decreasing.
///
/// `value_matrix` carries the numeric reading of each pixel: the note value
/// for Continuous matrices, the color-table index for Discrete ones. Bulk
/// operations rewrite `dot_matrix` and the palette from values, never the
/// other way around.
#[derive(Debug, Clone, PartialEq)]
pub struct XpmMatrix {
    pub title: String,
    pub legend: String,
    pub kind: XpmKind,
    pub x_label: String,
    pub y_label: String,
    pub width: usize,
    pub height: usize,
    pub color_count: usize,
    pub chars_per_pixel: usize,
    pub chars: Vec<String>,
    pub colors: Vec<String>,
    pub notes: Vec<String>,
    pub x_axis: Vec<f64>,
    pub y_axis: Vec<f64>,
    pub dot_matrix: Vec<Vec<String>>,
    pub value_matrix: Vec<Vec<f64>>,
}

fn quoted_content(text: &str) -> Option<&str> {
    let start = text.find('"')?;
    let rest = &text[start + 1..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

fn comment_body(line: &str) -> Option<&str> {
    line.strip_prefix("/*")
        .and_then(|s| s.strip_suffix("*/"))
        .map(str::trim)
}

fn parse_axis_ticks(
    text: &str,
    line: usize,
    ticks: &mut Vec<f64>,
) -> Result<(), XpmError> {
    for token in text.split_whitespace() {
        let value = token.parse::<f64>().map_err(|_| XpmError::Parse {
            line,
            kind: XpmParseErrorKind::InvalidFloat {
                value: token.to_string(),
            },
        })?;
        ticks.push(value);
    }
    Ok(())
}

/// Reduces `dim + 1` tick edges to `dim` midpoints; `dim` ticks pass through.
fn reduce_axis(ticks: Vec<f64>, dim: usize, axis: char) -> Result<Vec<f64>, XpmError> {
    if ticks.len() == dim {
        return Ok(ticks);
    }
    if ticks.len() == dim + 1 {
        warn!(
            "{}-axis carries {} ticks for {} pixels; reducing to interval midpoints",
            axis,
            ticks.len(),
            dim
        );
        return Ok(ticks.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect());
    }
    Err(XpmError::Structure(format!(
        "{}-axis has {} ticks, expected {} or {}",
        axis,
        ticks.len(),
        dim,
        dim + 1
    )))
}

pub(crate) fn palette_token(index: usize, chars_per_pixel: usize) -> String {
    let c = PALETTE_ALPHABET[index % PALETTE_ALPHABET.len()] as char;
    std::iter::repeat(c).take(chars_per_pixel).collect()
}

impl XpmMatrix {
    /// Builds a Continuous matrix from raw values, generating the palette via
    /// [`XpmMatrix::refresh_by_values`]. `value_matrix` rows are ordered
    /// top-to-bottom and `y_axis` must already be decreasing.
    pub fn continuous_from_values(
        title: &str,
        legend: &str,
        x_label: &str,
        y_label: &str,
        x_axis: Vec<f64>,
        y_axis: Vec<f64>,
        value_matrix: Vec<Vec<f64>>,
        colormap_id: &str,
        precision: u32,
    ) -> Result<Self, XpmError> {
        let width = x_axis.len();
        let height = y_axis.len();
        if value_matrix.len() != height
            || value_matrix.iter().any(|row| row.len() != width)
        {
            return Err(XpmError::Structure(format!(
                "value matrix does not have shape {}x{}",
                width, height
            )));
        }

        let mut matrix = Self {
            title: title.to_string(),
            legend: legend.to_string(),
            kind: XpmKind::Continuous,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            width,
            height,
            color_count: 0,
            chars_per_pixel: 1,
            chars: Vec::new(),
            colors: Vec::new(),
            notes: Vec::new(),
            x_axis,
            y_axis,
            dot_matrix: Vec::new(),
            value_matrix,
        };
        matrix.refresh_by_values(colormap_id, precision)?;
        Ok(matrix)
    }

    pub fn is_shape_compatible(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.kind == other.kind
    }

    /// Regenerates the palette and `dot_matrix` from `value_matrix`.
    ///
    /// The value range is sampled into at most 64 levels; each level gets a
    /// repeated-character token, an interpolated color from the requested
    /// colormap, and a note formatted to `precision` decimals. Pixels map to
    /// the nearest level. `value_matrix` itself is never altered.
    pub fn refresh_by_values(
        &mut self,
        colormap_id: &str,
        precision: u32,
    ) -> Result<(), XpmError> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for row in &self.value_matrix {
            for &v in row {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(XpmError::Structure(
                "cannot derive a palette from an empty value matrix".into(),
            ));
        }
        self.refresh_with_range(colormap_id, precision, min, max)
    }

    /// Same as [`XpmMatrix::refresh_by_values`] but with an imposed value
    /// range; values outside `[min, max]` clamp to the nearest level.
    pub fn refresh_with_range(
        &mut self,
        colormap_id: &str,
        precision: u32,
        min: f64,
        max: f64,
    ) -> Result<(), XpmError> {
        if self.kind != XpmKind::Continuous {
            return Err(XpmError::NotContinuous);
        }
        let anchors = colormap::lookup(colormap_id)
            .ok_or_else(|| XpmError::UnknownColormap(colormap_id.to_string()))?;

        let level_count = if max > min { PALETTE_SIZE } else { 1 };
        let mut levels = Vec::with_capacity(level_count);
        let mut chars = Vec::with_capacity(level_count);
        let mut colors = Vec::with_capacity(level_count);
        let mut notes = Vec::with_capacity(level_count);
        for i in 0..level_count {
            let t = if level_count == 1 {
                0.5
            } else {
                i as f64 / (level_count - 1) as f64
            };
            let value = if level_count == 1 {
                min
            } else {
                min + (max - min) * t
            };
            levels.push(value);
            chars.push(palette_token(i, self.chars_per_pixel));
            colors.push(colormap::sample(anchors, t));
            notes.push(format!("{:.*}", precision as usize, value));
        }

        let dot_matrix = self
            .value_matrix
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&v| {
                        let index = if max > min {
                            (((v - min) / (max - min)) * (level_count - 1) as f64).round()
                                as usize
                        } else {
                            0
                        };
                        chars[index.min(level_count - 1)].clone()
                    })
                    .collect()
            })
            .collect();

        self.color_count = level_count;
        self.chars = chars;
        self.colors = colors;
        self.notes = notes;
        self.dot_matrix = dot_matrix;
        Ok(())
    }

    /// Numeric reading of the note at palette position `index`.
    pub fn note_value(&self, index: usize) -> Option<f64> {
        match self.kind {
            XpmKind::Continuous => self.notes.get(index)?.trim().parse().ok(),
            XpmKind::Discrete => (index < self.color_count).then_some(index as f64),
        }
    }
}

impl FormatRead for XpmMatrix {
    type Error = XpmError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let mut title = String::new();
        let mut legend = String::new();
        let mut x_label = String::new();
        let mut y_label = String::new();
        let mut kind: Option<XpmKind> = None;
        let mut geometry: Option<(usize, usize, usize, usize)> = None;
        let mut chars: Vec<String> = Vec::new();
        let mut colors: Vec<String> = Vec::new();
        let mut notes: Vec<String> = Vec::new();
        let mut x_ticks: Vec<f64> = Vec::new();
        let mut y_ticks: Vec<f64> = Vec::new();
        let mut dot_matrix: Vec<Vec<String>> = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with("/*") {
                let Some(body) = comment_body(trimmed) else {
                    continue;
                };
                if let Some(rest) = body.strip_prefix("title:") {
                    title = quoted_content(rest).unwrap_or("").to_string();
                } else if let Some(rest) = body.strip_prefix("legend:") {
                    legend = quoted_content(rest).unwrap_or("").to_string();
                } else if let Some(rest) = body.strip_prefix("x-label:") {
                    x_label = quoted_content(rest).unwrap_or("").to_string();
                } else if let Some(rest) = body.strip_prefix("y-label:") {
                    y_label = quoted_content(rest).unwrap_or("").to_string();
                } else if let Some(rest) = body.strip_prefix("type:") {
                    let value = quoted_content(rest).unwrap_or("").to_string();
                    kind = Some(match value.as_str() {
                        "Continuous" => XpmKind::Continuous,
                        "Discrete" => XpmKind::Discrete,
                        _ => {
                            return Err(XpmError::Parse {
                                line: line_num,
                                kind: XpmParseErrorKind::InvalidType { value },
                            });
                        }
                    });
                } else if let Some(rest) = body.strip_prefix("x-axis:") {
                    parse_axis_ticks(rest, line_num, &mut x_ticks)?;
                } else if let Some(rest) = body.strip_prefix("y-axis:") {
                    parse_axis_ticks(rest, line_num, &mut y_ticks)?;
                }
                continue;
            }

            if !trimmed.starts_with('"') {
                // Array declaration, closing brace, or other C scaffolding.
                continue;
            }
            let Some(quoted) = quoted_content(trimmed) else {
                continue;
            };

            let Some((width, height, color_count, cpp)) = geometry else {
                let tokens: Vec<&str> = quoted.split_whitespace().collect();
                if tokens.len() != 4 {
                    return Err(XpmError::Parse {
                        line: line_num,
                        kind: XpmParseErrorKind::GeometryShape,
                    });
                }
                let mut values = [0usize; 4];
                for (slot, token) in values.iter_mut().zip(&tokens) {
                    *slot = token.parse().map_err(|_| XpmError::Parse {
                        line: line_num,
                        kind: XpmParseErrorKind::InvalidInt {
                            value: token.to_string(),
                        },
                    })?;
                }
                geometry = Some((values[0], values[1], values[2], values[3]));
                continue;
            };

            if chars.len() < color_count {
                let char_count = quoted.chars().count();
                if char_count < cpp {
                    return Err(XpmError::Parse {
                        line: line_num,
                        kind: XpmParseErrorKind::ColorEntry {
                            content: quoted.to_string(),
                        },
                    });
                }
                let split_at = quoted
                    .char_indices()
                    .nth(cpp)
                    .map_or(quoted.len(), |(i, _)| i);
                let token = &quoted[..split_at];
                let mut rest = quoted[split_at..].split_whitespace();
                let color = match (rest.next(), rest.next()) {
                    (Some("c"), Some(color)) if color.starts_with('#') => color,
                    _ => {
                        return Err(XpmError::Parse {
                            line: line_num,
                            kind: XpmParseErrorKind::ColorEntry {
                                content: quoted.to_string(),
                            },
                        });
                    }
                };
                let after_quotes = &trimmed[trimmed.find('"').map_or(0, |i| i + 1)..];
                let note = after_quotes
                    .find('"')
                    .map(|i| &after_quotes[i + 1..])
                    .and_then(|tail| tail.find("/*").map(|i| &tail[i..]))
                    .and_then(quoted_content)
                    .unwrap_or("");

                chars.push(token.to_string());
                colors.push(color.to_string());
                notes.push(note.to_string());
                continue;
            }

            if dot_matrix.len() == height {
                return Err(XpmError::Parse {
                    line: line_num,
                    kind: XpmParseErrorKind::ExtraPixelRow { height },
                });
            }
            let pixels: Vec<char> = quoted.chars().collect();
            if pixels.len() != width * cpp {
                return Err(XpmError::Parse {
                    line: line_num,
                    kind: XpmParseErrorKind::PixelRowWidth {
                        expected: width * cpp,
                        found: pixels.len(),
                    },
                });
            }
            let mut row = Vec::with_capacity(width);
            for token_chars in pixels.chunks(cpp) {
                let token: String = token_chars.iter().collect();
                if !chars.contains(&token) {
                    return Err(XpmError::Parse {
                        line: line_num,
                        kind: XpmParseErrorKind::UnknownPixelToken { token },
                    });
                }
                row.push(token);
            }
            dot_matrix.push(row);
        }

        let (width, height, color_count, chars_per_pixel) =
            geometry.ok_or_else(|| XpmError::Structure("missing matrix geometry".into()))?;
        if chars.len() != color_count {
            return Err(XpmError::Structure(format!(
                "expected {} color entries, found {}",
                color_count,
                chars.len()
            )));
        }
        if dot_matrix.len() != height {
            return Err(XpmError::Structure(format!(
                "expected {} pixel rows, found {}",
                height,
                dot_matrix.len()
            )));
        }
        let kind =
            kind.ok_or_else(|| XpmError::Structure("missing type declaration".into()))?;

        let levels: Vec<f64> = match kind {
            XpmKind::Continuous => notes
                .iter()
                .map(|note| {
                    note.trim().parse::<f64>().map_err(|_| {
                        XpmError::Structure(format!(
                            "continuous note '{}' is not numeric",
                            note
                        ))
                    })
                })
                .collect::<Result<_, _>>()?,
            XpmKind::Discrete => (0..color_count).map(|i| i as f64).collect(),
        };

        let value_matrix = dot_matrix
            .iter()
            .map(|row| {
                row.iter()
                    .map(|token| {
                        let index = chars
                            .iter()
                            .position(|c| c == token)
                            .unwrap_or_default();
                        levels[index]
                    })
                    .collect()
            })
            .collect();

        let x_axis = reduce_axis(x_ticks, width, 'x')?;
        let mut y_axis = reduce_axis(y_ticks, height, 'y')?;
        // Source files list y ticks bottom-up; flip so index 0 is the top row.
        y_axis.reverse();

        Ok(Self {
            title,
            legend,
            kind,
            x_label,
            y_label,
            width,
            height,
            color_count,
            chars_per_pixel,
            chars,
            colors,
            notes,
            x_axis,
            y_axis,
            dot_matrix,
            value_matrix,
        })
    }
}

impl FormatWrite for XpmMatrix {
    type Error = XpmError;

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "/* XPM */")?;
        writeln!(writer, "static char * gromacs_xpm[] = {{")?;
        writeln!(
            writer,
            "\"{} {} {} {}\",",
            self.width, self.height, self.color_count, self.chars_per_pixel
        )?;
        for i in 0..self.color_count {
            writeln!(
                writer,
                "\"{} c {} \" /* \"{}\" */,",
                self.chars[i], self.colors[i], self.notes[i]
            )?;
        }
        let type_name = match self.kind {
            XpmKind::Continuous => "Continuous",
            XpmKind::Discrete => "Discrete",
        };
        writeln!(writer, "/* title:   \"{}\" */", self.title)?;
        writeln!(writer, "/* legend:  \"{}\" */", self.legend)?;
        writeln!(writer, "/* x-label: \"{}\" */", self.x_label)?;
        writeln!(writer, "/* y-label: \"{}\" */", self.y_label)?;
        writeln!(writer, "/* type:    \"{}\" */", type_name)?;

        let x_line: Vec<String> = self.x_axis.iter().map(|v| v.to_string()).collect();
        writeln!(writer, "/* x-axis:  {} */", x_line.join(" "))?;
        let y_line: Vec<String> =
            self.y_axis.iter().rev().map(|v| v.to_string()).collect();
        writeln!(writer, "/* y-axis:  {} */", y_line.join(" "))?;

        for (i, row) in self.dot_matrix.iter().enumerate() {
            let pixels: String = row.concat();
            if i + 1 < self.height {
                writeln!(writer, "\"{}\",", pixels)?;
            } else {
                writeln!(writer, "\"{}\"", pixels)?;
            }
        }
        writeln!(writer, "}};")?;
        Ok(())
    }
}

/// Frames of a concatenated multi-frame XPM file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct XpmFrameSeries {
    pub frames: Vec<XpmMatrix>,
}

impl XpmFrameSeries {
    /// Time stamps parsed from per-frame titles of the form `t= <integer> ps`.
    pub fn times(&self) -> Result<Vec<i64>, XpmError> {
        self.frames
            .iter()
            .map(|frame| parse_frame_time(&frame.title))
            .collect()
    }
}

fn parse_frame_time(title: &str) -> Result<i64, XpmError> {
    let malformed = || XpmError::InvalidFrameTitle {
        title: title.to_string(),
    };
    let tokens: Vec<&str> = title.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        let number = if *token == "t=" {
            tokens.get(i + 1).copied()
        } else {
            token.strip_prefix("t=").filter(|rest| !rest.is_empty())
        };
        if let Some(number) = number {
            let unit_at = if *token == "t=" { i + 2 } else { i + 1 };
            if tokens.get(unit_at).copied() != Some("ps") {
                return Err(malformed());
            }
            return number.parse().map_err(|_| malformed());
        }
    }
    Err(malformed())
}

impl FormatRead for XpmFrameSeries {
    type Error = XpmError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let mut frames = Vec::new();
        for chunk in content.split("/* XPM */") {
            if chunk.trim().is_empty() {
                continue;
            }
            let framed = format!("/* XPM */{}", chunk);
            let mut cursor = io::Cursor::new(framed);
            frames.push(XpmMatrix::read_from(&mut cursor)?);
        }
        if frames.is_empty() {
            return Err(XpmError::Structure("no XPM frames in input".into()));
        }
        Ok(Self { frames })
    }
}
