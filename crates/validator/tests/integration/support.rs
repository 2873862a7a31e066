//! Shared helpers.

use lattice_validator::prelude::*;
use std::sync::Arc;

/// Compiles a schema, panicking on definition errors.
pub fn compile(builder: SchemaBuilder) -> Arc<Schema> {
    Arc::new(builder.build().expect("schema should compile"))
}

/// A validator over `builder` with default options.
pub fn validator(builder: SchemaBuilder) -> DocumentValidator {
    DocumentValidator::new(compile(builder)).expect("rules should build")
}

/// `(path, level, message)` triples, in marker order.
pub fn summary(markers: &[ValidationMarker]) -> Vec<(Path, Level, String)> {
    markers
        .iter()
        .map(|marker| (marker.path.clone(), marker.level, marker.message().to_owned()))
        .collect()
}

/// Validation requiring a value.
pub fn required() -> Validation {
    Validation::rule(Rule::required)
}
