//! String constraints
//!
//! Length limits count characters. Every check except `presence` passes on
//! an empty string; requiring content is the job of `required()`.

use super::{Check, format_number};
use crate::foundation::Verdict;
use crate::rule::{Bound, Casing, Constraint, Presence, RegexConstraint, UriConstraint};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

pub(super) fn validate(constraint: &Constraint, check: &Check<'_>) -> Option<Verdict> {
    let text = check.value.and_then(Value::as_str).filter(|text| !text.is_empty());
    let verdict = match constraint {
        Constraint::Presence(Presence::Required) => match text {
            Some(_) => Verdict::Valid,
            None if matches!(check.value, Some(value) if !value.is_null() && !value.is_string()) => {
                Verdict::Valid
            }
            None => check.fail("Required"),
        },
        Constraint::Min(bound) => length(check, text, bound, |len, b| len >= b, |b| {
            format!("Must be at least {b} characters long")
        }),
        Constraint::Max(bound) => length(check, text, bound, |len, b| len <= b, |b| {
            format!("Must be at most {b} characters long")
        }),
        Constraint::Length(bound) => length(check, text, bound, |len, b| len == b, |b| {
            format!("Must be exactly {b} characters long")
        }),
        Constraint::StringCasing(casing) => match text {
            Some(text) if !has_casing(text, *casing) => check.fail(match casing {
                Casing::Uppercase => "Must be all uppercase letters",
                Casing::Lowercase => "Must be all lowercase letters",
            }),
            _ => Verdict::Valid,
        },
        Constraint::Regex(regex) => match text {
            Some(text) => matches_pattern(check, text, regex),
            None => Verdict::Valid,
        },
        Constraint::Email => match text {
            Some(text) if !EMAIL_REGEX.is_match(text) => check.fail("Must be a valid email address"),
            _ => Verdict::Valid,
        },
        Constraint::Uri(uri) => match text {
            Some(text) => match check_uri(text, uri) {
                Ok(()) => Verdict::Valid,
                Err(problem) => check.fail(problem),
            },
            None => Verdict::Valid,
        },
        _ => return None,
    };
    Some(verdict)
}

fn length(
    check: &Check<'_>,
    text: Option<&str>,
    bound: &Bound,
    holds: impl Fn(f64, f64) -> bool,
    message: impl Fn(String) -> String,
) -> Verdict {
    let limit = bound.resolve(check.parent()).and_then(Value::as_f64);
    match (text, limit) {
        (Some(text), Some(limit)) if !holds(text.chars().count() as f64, limit) => {
            check.fail(message(format_number(limit)))
        }
        _ => Verdict::Valid,
    }
}

fn has_casing(text: &str, casing: Casing) -> bool {
    match casing {
        Casing::Uppercase => text == text.to_uppercase(),
        Casing::Lowercase => text == text.to_lowercase(),
    }
}

fn matches_pattern(check: &Check<'_>, text: &str, regex: &RegexConstraint) -> Verdict {
    let matched = regex.pattern.is_match(text);
    if matched != regex.invert {
        return Verdict::Valid;
    }
    let name = regex.display_name();
    check.fail(if regex.invert {
        format!("Should not match \"{name}\"-pattern")
    } else {
        format!("Does not match \"{name}\"-pattern")
    })
}

fn check_uri(text: &str, options: &UriConstraint) -> Result<(), &'static str> {
    match Url::parse(text) {
        Ok(url) => {
            if options.relative_only {
                return Err("Only relative URLs are allowed");
            }
            if !options.allow_credentials && (!url.username().is_empty() || url.password().is_some()) {
                return Err("Username/password not allowed");
            }
            if !options.schemes.iter().any(|scheme| scheme.matches(url.scheme())) {
                return Err("Does not match allowed protocols/schemes");
            }
            Ok(())
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if !options.allow_relative {
                return Err("Relative URLs are not allowed");
            }
            let base = Url::parse("http://relative.invalid/").map_err(|_| "Not a valid URL")?;
            base.join(text).map(|_| ()).map_err(|_| "Not a valid URL")
        }
        Err(_) => Err("Not a valid URL"),
    }
}
