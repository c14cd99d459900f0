//!
//! # JSON path
//!
//! Minimal path expressions used to locate scale fields inside schemaless documents.
//! Supports `.field`, `[index]` and `['quoted.key']` segments, optionally wrapped in
//! `{...}` and prefixed with `$`.
//!
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;
use std::str::FromStr;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JsonPathError {
    #[error("empty json path")]
    Empty,
    #[error("unexpected character '{found}' at {position} in json path {path}")]
    UnexpectedChar {
        path: String,
        position: usize,
        found: char,
    },
    #[error("unterminated segment in json path {0}")]
    Unterminated(String),
    #[error("invalid index '{index}' in json path {path}")]
    InvalidIndex { path: String, index: String },
    #[error("{path}: {reason}")]
    CannotSet { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Field(name) if name.contains('.') || name.contains('[') => {
                write!(f, "['{}']", name)
            }
            Self::Field(name) => write!(f, ".{}", name),
            Self::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn parse(expression: &str) -> Result<Self, JsonPathError> {
        let mut body = expression.trim();
        if let Some(inner) = body.strip_prefix('{') {
            body = inner
                .strip_suffix('}')
                .ok_or_else(|| JsonPathError::Unterminated(expression.to_owned()))?
                .trim();
        }
        if let Some(inner) = body.strip_prefix('$') {
            body = inner;
        }
        if body.is_empty() {
            return Err(JsonPathError::Empty);
        }

        let mut segments = vec![];
        let mut chars = body.char_indices().peekable();
        while let Some((position, c)) = chars.next() {
            match c {
                '.' => {
                    let name = take_field(&mut chars);
                    if name.is_empty() {
                        return Err(JsonPathError::UnexpectedChar {
                            path: expression.to_owned(),
                            position,
                            found: c,
                        });
                    }
                    segments.push(PathSegment::Field(name));
                }
                '[' => segments.push(take_bracket(&mut chars, expression)?),
                // bare leading field, e.g. `spec.replicas`
                _ if segments.is_empty() && position == 0 => {
                    let mut name = c.to_string();
                    name.push_str(&take_field(&mut chars));
                    segments.push(PathSegment::Field(name));
                }
                _ => {
                    return Err(JsonPathError::UnexpectedChar {
                        path: expression.to_owned(),
                        position,
                        found: c,
                    })
                }
            }
        }

        Ok(Self { segments })
    }

    /// path made of plain field segments
    pub fn from_fields(fields: &[&str]) -> Self {
        Self {
            segments: fields
                .iter()
                .map(|field| PathSegment::Field((*field).to_owned()))
                .collect(),
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// value at this path, None if any segment is missing
    pub fn find<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |current, segment| match segment {
                PathSegment::Field(name) => current.as_object()?.get(name),
                PathSegment::Index(index) => current.as_array()?.get(*index),
            })
    }

    /// Store `value` at this path. Missing objects along the way are created,
    /// array elements must already exist.
    pub fn set(&self, document: &mut Value, value: Value) -> Result<(), JsonPathError> {
        let mut current = document;
        for (depth, segment) in self.segments.iter().enumerate() {
            let last = depth + 1 == self.segments.len();
            current = match segment {
                PathSegment::Field(name) => {
                    if current.is_null() {
                        *current = Value::Object(Map::new());
                    }
                    let object = current
                        .as_object_mut()
                        .ok_or_else(|| self.cannot_set(depth, "not an object"))?;
                    object.entry(name.clone()).or_insert(Value::Null)
                }
                PathSegment::Index(index) => current
                    .as_array_mut()
                    .ok_or_else(|| self.cannot_set(depth, "not an array"))?
                    .get_mut(*index)
                    .ok_or_else(|| self.cannot_set(depth, "index out of bounds"))?,
            };
            if last {
                *current = value;
                return Ok(());
            }
        }
        Err(JsonPathError::Empty)
    }

    fn cannot_set(&self, depth: usize, reason: &str) -> JsonPathError {
        let prefix: String = self.segments[..depth]
            .iter()
            .map(|s| s.to_string())
            .collect();
        JsonPathError::CannotSet {
            path: format!("{{{}}}", prefix),
            reason: reason.to_owned(),
        }
    }
}

fn take_field(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut name = String::new();
    while let Some((_, c)) = chars.peek() {
        if *c == '.' || *c == '[' {
            break;
        }
        name.push(*c);
        chars.next();
    }
    name
}

fn take_bracket(
    chars: &mut Peekable<CharIndices<'_>>,
    expression: &str,
) -> Result<PathSegment, JsonPathError> {
    let mut content = String::new();
    let mut quote: Option<char> = None;
    while let Some((position, c)) = chars.next() {
        match (quote, c) {
            (None, ']') => return bracket_segment(content, expression),
            (None, '\'') | (None, '"') if content.is_empty() => {
                quote = Some(c);
                content.push(c);
            }
            (None, _) => {
                if !c.is_ascii_digit() {
                    return Err(JsonPathError::UnexpectedChar {
                        path: expression.to_owned(),
                        position,
                        found: c,
                    });
                }
                content.push(c);
            }
            (Some(open), _) if c == open => {
                content.push(c);
                // a quoted name closes the bracket
                match chars.next() {
                    Some((_, ']')) => return bracket_segment(content, expression),
                    Some((position, found)) => {
                        return Err(JsonPathError::UnexpectedChar {
                            path: expression.to_owned(),
                            position,
                            found,
                        })
                    }
                    None => break,
                }
            }
            (Some(_), _) => content.push(c),
        }
    }
    Err(JsonPathError::Unterminated(expression.to_owned()))
}

fn bracket_segment(content: String, expression: &str) -> Result<PathSegment, JsonPathError> {
    if content.len() >= 2 && (content.starts_with('\'') || content.starts_with('"')) {
        return Ok(PathSegment::Field(
            content[1..content.len() - 1].to_owned(),
        ));
    }
    content
        .parse::<usize>()
        .map(PathSegment::Index)
        .map_err(|_| JsonPathError::InvalidIndex {
            path: expression.to_owned(),
            index: content,
        })
}

impl FromStr for JsonPath {
    type Err = JsonPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        write!(f, "}}")
    }
}
