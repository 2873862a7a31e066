//! Document paths
//!
//! A [`Path`] addresses a node inside a document tree. Each segment is
//! either an object field name, a numeric array index, or a keyed array
//! segment (`{_key: "..."}`) that keeps pointing at the same item when the
//! array is reordered.
//!
//! Index segments are fragile under reordering; they are only produced for
//! array items that carry no `_key`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ============================================================================
// PATH SEGMENT
// ============================================================================

/// One step in a [`Path`].
///
/// Ordering compares field names and item keys as text and indices
/// numerically; across kinds, keys sort before indices before keyed items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object field name.
    Key(String),
    /// Position inside an array.
    Index(usize),
    /// Array item addressed by its stable `_key`.
    Keyed {
        /// The item key.
        #[serde(rename = "_key")]
        key: String,
    },
}

impl PathSegment {
    /// Creates a keyed segment (`{_key: key}`).
    pub fn keyed(key: impl Into<String>) -> Self {
        Self::Keyed { key: key.into() }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Keyed { key } => write!(f, "[_key==\"{key}\"]"),
        }
    }
}

// ============================================================================
// PATH
// ============================================================================

/// An ordered sequence of [`PathSegment`]s. The empty path is the root.
///
/// Paths order segment by segment, so a path sorts right before its children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(SmallVec<[PathSegment; 4]>);

impl Path {
    /// The root path.
    #[must_use]
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    /// Returns a new path with `segment` appended.
    #[must_use = "child() returns a new path"]
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut next = self.clone();
        next.0.push(segment.into());
        next
    }

    /// Returns `self` followed by every segment of `relative`.
    #[must_use = "concat() returns a new path"]
    pub fn concat(&self, relative: &Path) -> Self {
        let mut next = self.clone();
        next.0.extend(relative.0.iter().cloned());
        next
    }

    /// Appends a segment in place.
    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    /// The segments of this path.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns the last segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(SmallVec::from_vec(segments))
    }
}

impl fmt::Display for Path {
    /// Renders `title.items[_key=="a"].tags[2]`; the root renders as `<root>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 && matches!(segment, PathSegment::Key(_)) {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Builds a [`Path`] from segment expressions.
///
/// ```rust,ignore
/// use lattice_validator::path;
/// use lattice_validator::foundation::PathSegment;
///
/// let p = path!["items", PathSegment::keyed("a"), "tags", 2];
/// assert_eq!(p.to_string(), r#"items[_key=="a"].tags[2]"#);
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::foundation::Path::root()
    };
    ($($segment:expr),+ $(,)?) => {
        <$crate::foundation::Path as ::std::iter::FromIterator<$crate::foundation::PathSegment>>::from_iter([
            $($crate::foundation::PathSegment::from($segment)),+
        ])
    };
}
