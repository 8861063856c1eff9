//! `${name}` interpolation for command templates
//!
//! - `${name}` is replaced from the variable table
//! - unknown names are left verbatim, so `${...}` meant for a downstream tool survives
//! - `$${` is an escaped `${` and is never substituted
//!
//! The escape is implemented with the NUL character as a sentinel. A process
//! command line cannot carry NUL, so it never occurs in a legal template or
//! value; inputs that do contain it are rejected instead of interpolated.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// `${name}` with names made of letters, digits, `_`, `.` and `-`
static VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.\-]*)\}").expect("Invalid variable regex"));

const ESCAPED_OPEN: &str = "$${";
const SENTINEL: char = '\0';

/// Input contains the reserved sentinel character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedCharacter;

/// Interpolate `template` with `vars`
///
/// Fails only if the template or a variable value contains NUL.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> Result<String, ReservedCharacter> {
    if template.contains(SENTINEL) || vars.values().any(|v| v.contains(SENTINEL)) {
        return Err(ReservedCharacter);
    }

    let protected = template.replace(ESCAPED_OPEN, &SENTINEL.to_string());

    let substituted = VAR_RE.replace_all(&protected, |caps: &regex::Captures| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => value.clone(),
            None => {
                tracing::debug!("Variable '{}' is not defined, leaving it as is", name);
                caps[0].to_string()
            }
        }
    });

    Ok(substituted.replace(SENTINEL, "${"))
}
