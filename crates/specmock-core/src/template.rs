//! Templated URL paths such as `/pets/{petId}`.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static VARIABLE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^{}]*)\{([^{}]+)\}([^{}]*)$").expect("valid segment pattern")
});

/// One `/`-delimited piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// `{name}` with optional literal text around it in the same segment.
    Variable {
        name: String,
        prefix: String,
        suffix: String,
    },
}

impl Segment {
    fn bind<'c>(&self, concrete: &'c str) -> Option<Option<&'c str>> {
        match self {
            Segment::Literal(literal) => (literal == concrete).then_some(None),
            Segment::Variable { prefix, suffix, .. } => {
                let value = concrete.strip_prefix(prefix.as_str())?;
                let value = value.strip_suffix(suffix.as_str())?;
                (!value.is_empty()).then_some(Some(value))
            }
        }
    }
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template, rejecting unbalanced braces and segments holding
    /// more than one variable.
    pub fn parse(raw: &str) -> Result<Self> {
        let location = format!("#/paths/{raw}");

        let mut open = false;
        for c in raw.chars() {
            match c {
                '{' if open => return Err(Error::malformed(&location, "nested '{' in path")),
                '{' => open = true,
                '}' if !open => return Err(Error::malformed(&location, "unmatched '}' in path")),
                '}' => open = false,
                '/' if open => {
                    return Err(Error::malformed(&location, "path variable spans a '/'"));
                }
                _ => {}
            }
        }
        if open {
            return Err(Error::malformed(&location, "unclosed '{' in path"));
        }

        let segments = raw
            .split('/')
            .map(|segment| {
                if !segment.contains('{') {
                    return Ok(Segment::Literal(segment.to_string()));
                }
                let caps = VARIABLE_SEGMENT.captures(segment).ok_or_else(|| {
                    Error::malformed(
                        &location,
                        format!("segment '{segment}' must hold exactly one named variable"),
                    )
                })?;
                Ok(Segment::Variable {
                    prefix: caps[1].to_string(),
                    name: caps[2].to_string(),
                    suffix: caps[3].to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of variable segments; fewer means more specific.
    pub fn variable_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Variable { .. }))
            .count()
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a concrete path, returning the bound variables in template
    /// order. Segments are percent-decoded after splitting, so `%2F` binds
    /// inside a single variable.
    pub fn match_path(&self, concrete: &str) -> Option<IndexMap<String, String>> {
        let parts: Vec<&str> = concrete.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = IndexMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            let part = percent_decode_str(part).decode_utf8_lossy();
            if let Some(value) = segment.bind(&part)?
                && let Segment::Variable { name, .. } = segment
            {
                params.insert(name.clone(), value.to_string());
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
