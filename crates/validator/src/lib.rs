//! # lattice-validator
//!
//! Schema-driven validation for structured JSON documents.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lattice_validator::prelude::*;
//! use std::sync::Arc;
//!
//! let schema = Schema::builder()
//!     .define(
//!         TypeDef::document("post")
//!             .field("title", TypeDef::of("string").validation(Validation::rule(|r| r.required().max(80))))
//!             .field("homepage", TypeDef::of("url")),
//!     )
//!     .build()?;
//!
//! let validator = DocumentValidator::new(Arc::new(schema))?;
//! let markers = validator.validate(&document).await;
//! ```
//!
//! ## Layers
//!
//! - [`rule`]: the immutable [`Rule`](rule::Rule) builder and rule execution.
//! - [`validators`]: the per-type validator tables and the semantic
//!   validators (slug, reference, block).
//! - [`schema`]: the schema type graph the engine walks.
//! - [`normalize`]: derives the rules of each schema type.
//! - [`document`]: walks documents concurrently and collects markers.
//! - [`foundation`]: paths, markers and the conversion of validator
//!   results into markers.

pub mod config;
pub mod document;
pub mod error;
pub mod foundation;
pub mod normalize;
pub mod prelude;
pub mod rule;
pub mod schema;
pub mod validators;
