//! Integration tests for lattice-validator.

mod collaborators;
mod concurrency;
mod document;
mod rule_builder;
mod support;
