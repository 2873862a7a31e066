//! Core result types shared by every part of the engine
//!
//! - **Paths**: [`Path`], [`PathSegment`]
//! - **Errors and markers**: [`ValidationError`], [`ValidationMarker`], [`Level`]
//! - **Validator results**: [`Verdict`] and the marker converter [`to_markers`]
//! - **Equality**: [`deep_equals`], the `_key`-tolerant comparison used by
//!   `valid` and `unique`
//!
//! # Examples
//!
//! ```rust,ignore
//! use lattice_validator::foundation::{to_markers, Level, Verdict};
//! use lattice_validator::path;
//!
//! let markers = to_markers(Verdict::from("Required"), Level::Error, &path!["title"])?;
//! assert_eq!(markers[0].path, path!["title"]);
//! ```

pub mod equality;
pub mod error;
pub mod path;
pub mod verdict;

pub use equality::deep_equals;
pub use error::{Level, Operation, ValidationError, ValidationMarker, sort_markers};
pub use path::{Path, PathSegment};
pub use verdict::{Verdict, to_markers};
