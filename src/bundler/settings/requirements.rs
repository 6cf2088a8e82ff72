//! Interpreter dependency requirements.

use crate::bundler::{Error, Result};
use std::fmt;

/// Comparison operators accepted in a version constraint, longest first so
/// `===` wins over `==`.
const OPERATORS: [&str; 8] = ["===", "~=", "==", "!=", "<=", ">=", "<", ">"];

/// One `{package, version constraint}` pair, e.g. `pydantic>=2.0`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Requirement {
    /// Distribution name
    pub package: String,
    /// Operator and version, e.g. `>=2.0`; `None` accepts any version
    pub constraint: Option<String>,
}

impl Requirement {
    /// Parses a single `package<op>version` line.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let split_at = OPERATORS.iter().filter_map(|op| line.find(op)).min();

        let (package, constraint) = match split_at {
            Some(idx) => {
                let (package, constraint) = line.split_at(idx);
                (package.trim(), Some(constraint.replace(' ', "")))
            }
            None => (line, None),
        };

        let valid_name = !package.is_empty()
            && package
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '[' | ']' | ','));
        if !valid_name {
            return Err(Error::GenericError(format!("invalid requirement: {line:?}")));
        }
        if let Some(c) = &constraint {
            let version = OPERATORS
                .iter()
                .find_map(|op| c.strip_prefix(op))
                .unwrap_or_default();
            if version.is_empty() {
                return Err(Error::GenericError(format!(
                    "requirement {line:?} has an operator but no version"
                )));
            }
        }

        Ok(Self {
            package: package.to_string(),
            constraint,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{}{}", self.package, c),
            None => f.write_str(&self.package),
        }
    }
}

/// Ordered dependency list shared by the build-time install and the
/// launcher's reinstall.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequirementsSpec {
    entries: Vec<Requirement>,
}

impl RequirementsSpec {
    /// Builds a spec from configuration strings, preserving order.
    pub fn parse_all<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| Requirement::parse(&l))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Requirements in declaration order.
    pub fn entries(&self) -> &[Requirement] {
        &self.entries
    }

    /// True when nothing needs installing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the `requirements.txt` body, one entry per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }
}
