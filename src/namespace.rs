//!
//! Validated, dot-delimited namespace paths.
//!
//! A namespace such as `app.model.42.field` is a sequence of opaque segments. The only
//! reserved segment is [`WILDCARD`], which matches exactly one arbitrary segment.

use crate::error::NspError;

/// The reserved wildcard segment.
pub const WILDCARD: &str = "*";

/// Segment separator.
pub const SEPARATOR: char = '.';

/// A parsed, lower-cased namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    /// Parses and normalises a namespace string.
    ///
    /// Segments are lower-cased. An empty string, an empty segment (including leading,
    /// trailing or doubled dots) and a segment that embeds `*` next to other characters
    /// are rejected.
    ///
    /// # Errors
    /// `NspError::InvalidNamespace` describing the first problem found.
    pub fn parse(raw: &str) -> Result<Self, NspError> {
        if raw.is_empty() {
            return Err(NspError::invalid_namespace(raw, "namespace is empty"));
        }
        let segments = raw
            .split(SEPARATOR)
            .enumerate()
            .map(|(idx, seg)| validate_segment(raw, idx, seg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Namespace { segments })
    }

    /// Builds a namespace from already split segments, validating each one.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, NspError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<String> = segments.into_iter().map(|s| s.as_ref().to_string()).collect();
        let joined = raw.join(".");
        if raw.is_empty() {
            return Err(NspError::invalid_namespace(&joined, "namespace is empty"));
        }
        let segments = raw
            .iter()
            .enumerate()
            .map(|(idx, seg)| {
                if seg.contains(SEPARATOR) {
                    return Err(NspError::invalid_namespace(
                        &joined,
                        format!("segment '{}' contains a separator", seg),
                    ));
                }
                validate_segment(&joined, idx, seg)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Namespace { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a parsed namespace.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if any segment is the wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| s == WILDCARD)
    }

    /// Appends a single segment (e.g. a field name).
    ///
    /// # Errors
    /// `NspError::Usage` if `segment` would add more or fewer than one segment.
    pub fn child(&self, segment: &str) -> Result<Namespace, NspError> {
        if segment.contains(SEPARATOR) || segment.is_empty() {
            return Err(NspError::Usage(format!(
                "'{}' must be exactly one namespace segment",
                segment
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(validate_segment(segment, 0, segment)?);
        Ok(Namespace { segments })
    }

    /// Returns true if `self`, read as a pattern, matches the leading segments of `concrete`.
    ///
    /// Each `*` in the pattern matches exactly one segment. `concrete` may be longer than the
    /// pattern. This is the match behind [`crate::tree::NamespaceTree::check_ambiguous`].
    pub fn is_prefix_pattern_of(&self, concrete: &Namespace) -> bool {
        pattern_matches_prefix(&self.segments, &concrete.segments)
    }
}

/// Segment-wise prefix match where `*` in `pattern` stands for any one segment.
pub(crate) fn pattern_matches_prefix<P, C>(pattern: &[P], concrete: &[C]) -> bool
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    concrete.len() >= pattern.len()
        && pattern
            .iter()
            .zip(concrete.iter())
            .all(|(p, c)| p.as_ref() == WILDCARD || p.as_ref() == c.as_ref())
}

fn validate_segment(raw: &str, idx: usize, seg: &str) -> Result<String, NspError> {
    if seg.is_empty() {
        return Err(NspError::invalid_namespace(
            raw,
            format!("empty segment at position {}", idx),
        ));
    }
    if seg != WILDCARD && seg.contains('*') {
        return Err(NspError::invalid_namespace(
            raw,
            format!("segment '{}' mixes a wildcard with other characters", seg),
        ));
    }
    Ok(seg.to_lowercase())
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl std::str::FromStr for Namespace {
    type Err = NspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::parse(s)
    }
}

impl TryFrom<String> for Namespace {
    type Error = NspError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Namespace::parse(&value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.to_string()
    }
}
