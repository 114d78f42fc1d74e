// ============================================================================
// subject-store - Path Accessor
// String-path get/set over nested JSON containers
// ============================================================================
//
// Used by string-selector lenses and by the watched store's cursors.
// A selector is parsed once into segments; `get` recovers from every
// failure with a default, `set` returns a new root and leaves the input
// untouched.
// ============================================================================

mod access;
mod parse;

use std::fmt;

use crate::core::error::PathError;

pub use access::{get, get_mut, get_ref, set, set_in_place, try_set, MAX_ARRAY_PADDING};

// =============================================================================
// SEGMENT
// =============================================================================

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object key. On an array, a decimal key works as an index.
    Key(String),
    /// Bracketed numeric index. On an object, it works as the key with the
    /// same digits.
    Index(usize),
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(index) => write!(f, "[{index}]"),
            Segment::Key(key) if is_plain_name(key) => write!(f, ".{key}"),
            Segment::Key(key) if key.contains('\'') => write!(f, "[\"{key}\"]"),
            Segment::Key(key) => write!(f, "['{key}']"),
        }
    }
}

fn is_plain_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
}

// =============================================================================
// PATH
// =============================================================================

/// A selector into a nested value.
///
/// Built from a selector string (`"a.b[2]['c']"`), a literal index, or a
/// list of keys. A string that fails to parse still forms a `Path`: the error
/// surfaces when the path is used, and an object key spelled exactly like the
/// string is still reachable through it.
///
/// # Example
///
/// ```
/// use subject_store::path::{Path, Segment};
///
/// let path = Path::from("todos[1].done");
/// assert_eq!(
///     path.segments().unwrap(),
///     &[Segment::from("todos"), Segment::Index(1), Segment::from("done")]
/// );
/// assert_eq!(path.to_string(), "todos[1].done");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// The selector text, tried as a single object key first
    literal: Option<String>,
    segments: Result<Vec<Segment>, PathError>,
}

impl Path {
    /// Parse a selector, failing on malformed input.
    pub fn parse(selector: &str) -> Result<Self, PathError> {
        let path = Self::from(selector);
        path.segments()?;
        Ok(path)
    }

    /// A path made of the given segments.
    pub fn from_segments(segments: impl IntoIterator<Item = Segment>) -> Self {
        Self {
            literal: None,
            segments: Ok(segments.into_iter().collect()),
        }
    }

    /// The empty path, addressing the root itself.
    pub fn root() -> Self {
        Self::from_segments(Vec::<Segment>::new())
    }

    /// The parsed segments.
    pub fn segments(&self) -> Result<&[Segment], PathError> {
        self.segments.as_deref().map_err(Clone::clone)
    }

    /// The selector text this path was built from, if any.
    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    /// A new path one segment deeper.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let segments = self.segments.clone().map(|mut segments| {
            segments.push(segment.into());
            segments
        });
        Self {
            literal: None,
            segments,
        }
    }
}

impl From<&str> for Path {
    fn from(selector: &str) -> Self {
        Self {
            literal: Some(selector.to_string()),
            segments: parse::parse_segments(selector),
        }
    }
}

impl From<String> for Path {
    fn from(selector: String) -> Self {
        Self::from(selector.as_str())
    }
}

impl From<&String> for Path {
    fn from(selector: &String) -> Self {
        Self::from(selector.as_str())
    }
}

impl From<usize> for Path {
    fn from(index: usize) -> Self {
        Self::from_segments([Segment::Index(index)])
    }
}

impl From<&[&str]> for Path {
    fn from(keys: &[&str]) -> Self {
        Self::from_segments(keys.iter().map(|&key| Segment::from(key)))
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(keys: [&str; N]) -> Self {
        Self::from_segments(keys.map(Segment::from))
    }
}

impl From<Vec<String>> for Path {
    fn from(keys: Vec<String>) -> Self {
        Self::from_segments(keys.into_iter().map(Segment::Key))
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self::from_segments(segments)
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(segments) = &self.segments else {
            return f.write_str(self.literal.as_deref().unwrap_or_default());
        };
        for (i, segment) in segments.iter().enumerate() {
            let text = segment.to_string();
            // No leading dot on the first key
            f.write_str(if i == 0 { text.trim_start_matches('.') } else { &text })?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
