//! Formatter - compiled line templates
//!
//! Templates are parsed once at configure time. Both placeholder styles are
//! accepted and may be mixed:
//!
//! | field      | brace form                   | percent form       |
//! |------------|------------------------------|--------------------|
//! | timestamp  | `{timestamp}` / `{asctime}`  | `%(asctime)s`      |
//! | logger     | `{name}`                     | `%(name)s`         |
//! | severity   | `{level}` / `{levelname}`    | `%(levelname)s`    |
//! | message    | `{message}`                  | `%(message)s`      |
//!
//! `{{`, `}}` and `%%` render as literal `{`, `}` and `%`.

use chrono::format::{Item, StrftimeItems};
use contracts::{ContractError, LogRecord, DEFAULT_DATEFMT, DEFAULT_FORMAT};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp,
    Name,
    Level,
    Message,
}

/// A compiled formatter template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    segments: Vec<Segment>,
    datefmt: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            segments: vec![Segment::Message],
            datefmt: DEFAULT_DATEFMT.to_string(),
        }
    }
}

impl Formatter {
    /// Compile a template.
    ///
    /// `field` names the config location used in error messages.
    ///
    /// # Errors
    /// Unknown placeholders, unterminated placeholders and invalid `datefmt`
    /// patterns are reported as validation errors.
    pub fn compile(
        field: &str,
        template: &str,
        datefmt: Option<&str>,
    ) -> Result<Self, ContractError> {
        let datefmt = datefmt.unwrap_or(DEFAULT_DATEFMT);
        if StrftimeItems::new(datefmt).any(|item| matches!(item, Item::Error)) {
            return Err(ContractError::config_validation(
                format!("{field}.datefmt"),
                format!("invalid date format '{datefmt}'"),
            ));
        }

        let segments = parse_template(template)
            .map_err(|message| ContractError::config_validation(format!("{field}.format"), message))?;

        Ok(Self {
            segments,
            datefmt: datefmt.to_string(),
        })
    }

    /// The default `{message}` formatter
    pub fn plain() -> Self {
        Self::default()
    }

    /// Render a record as one line
    pub fn render(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(64 + record.message.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Timestamp => {
                    // datefmt was checked in compile, so Display cannot fail
                    let _ = write!(line, "{}", record.timestamp.format(&self.datefmt));
                }
                Segment::Name => line.push_str(&record.logger_name),
                Segment::Level => line.push_str(record.severity.as_str()),
                Segment::Message => line.push_str(&record.message),
            }
        }
        line
    }
}

fn placeholder(name: &str) -> Result<Segment, String> {
    match name {
        "timestamp" | "asctime" => Ok(Segment::Timestamp),
        "name" => Ok(Segment::Name),
        "level" | "levelname" => Ok(Segment::Level),
        "message" => Ok(Segment::Message),
        other => Err(format!("unknown placeholder '{other}'")),
    }
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn parse_template(template: &str) -> Result<Vec<Segment>, String> {
    if template.is_empty() {
        return parse_template(DEFAULT_FORMAT);
    }

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let rest = &template[pos + 1..];
                let end = rest
                    .find('}')
                    .ok_or_else(|| format!("unterminated placeholder at offset {pos}"))?;
                let segment = placeholder(rest[..end].trim())?;
                flush(&mut literal, &mut segments);
                segments.push(segment);
                for _ in 0..=end {
                    chars.next();
                }
            }
            '%' if matches!(chars.peek(), Some((_, '%'))) => {
                chars.next();
                literal.push('%');
            }
            '%' if matches!(chars.peek(), Some((_, '('))) => {
                let rest = &template[pos + 2..];
                let end = rest
                    .find(")s")
                    .ok_or_else(|| format!("unterminated placeholder at offset {pos}"))?;
                let segment = placeholder(&rest[..end])?;
                flush(&mut literal, &mut segments);
                segments.push(segment);
                // skip "(" + name + ")s"
                for _ in 0..end + 3 {
                    chars.next();
                }
            }
            other => literal.push(other),
        }
    }
    flush(&mut literal, &mut segments);

    Ok(segments)
}
