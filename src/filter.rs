//! Module: Filter
//! But: Address matching rules (contains, prefix, suffix, regex).

use regex::{Regex, RegexBuilder};

use crate::error::FilterError;

/// How a multi-valued `contains` list is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainsMode {
    /// At least one listed substring must appear.
    #[default]
    Any,
    /// Every listed substring must appear.
    All,
}

/// Raw filter input, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Comma-separated substrings.
    pub contains: String,
    /// Strict contains mode.
    /// NB: Accepted for compatibility, it does not change the result. Use
    /// `contains_all` for "every substring must appear".
    pub strict: bool,
    pub contains_all: bool,
    pub prefix: String,
    pub suffix: String,
    pub regex: String,
    pub ignore_case: bool,
}

/// Immutable address predicate, built once per run.
///
/// Each criterion is either inactive (`None`, vacuously satisfied) or active;
/// an address matches when every active criterion holds.
#[derive(Debug, Clone, Default)]
pub struct FilterPredicate {
    contains: Option<Vec<String>>,
    contains_mode: ContainsMode,
    prefix: Option<String>,
    suffix: Option<String>,
    regex: Option<Regex>,
    ignore_case: bool,
}

impl FilterPredicate {
    pub fn new(options: FilterOptions) -> Result<Self, FilterError> {
        let fold = |s: &str| {
            if options.ignore_case {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };

        // "".split(',') yields [""]: that is "no constraint", not "matches anything".
        let items: Vec<String> = options.contains.split(',').map(fold).collect();
        let contains = match items.as_slice() {
            [] => None,
            [only] if only.is_empty() => None,
            _ => Some(items),
        };

        // Fold before normalizing so "0XAB" under ignore_case becomes "0xab".
        let prefix = Some(add_0x_prefix(&fold(&options.prefix))).filter(|p| !p.is_empty());
        let suffix = Some(fold(&options.suffix)).filter(|s| !s.is_empty());

        let regex = if options.regex.is_empty() {
            None
        } else {
            let compiled = RegexBuilder::new(&options.regex)
                .case_insensitive(options.ignore_case)
                .build()
                .map_err(|source| FilterError::InvalidRegex {
                    pattern: options.regex.clone(),
                    source,
                })?;
            Some(compiled)
        };

        Ok(Self {
            contains,
            contains_mode: if options.contains_all {
                ContainsMode::All
            } else {
                ContainsMode::Any
            },
            prefix,
            suffix,
            regex,
            ignore_case: options.ignore_case,
        })
    }

    /// True when no criterion is active.
    pub fn is_empty(&self) -> bool {
        self.contains.is_none() && self.prefix.is_none() && self.suffix.is_none() && self.regex.is_none()
    }

    pub fn contains_mode(&self) -> ContainsMode {
        self.contains_mode
    }

    pub fn matches(&self, address: &str) -> bool {
        let folded;
        let candidate = if self.ignore_case {
            folded = address.to_lowercase();
            folded.as_str()
        } else {
            address
        };

        let contains_match = self.contains.as_ref().is_none_or(|items| match self.contains_mode {
            ContainsMode::Any => items.iter().any(|c| candidate.contains(c.as_str())),
            ContainsMode::All => items.iter().all(|c| candidate.contains(c.as_str())),
        });
        let prefix_match = self.prefix.as_ref().is_none_or(|p| candidate.starts_with(p.as_str()));
        let suffix_match = self.suffix.as_ref().is_none_or(|s| candidate.ends_with(s.as_str()));
        let regex_match = self.regex.as_ref().is_none_or(|r| r.is_match(address));

        contains_match && prefix_match && suffix_match && regex_match
    }
}

/// Prepends "0x" unless already present. Empty stays empty.
pub fn add_0x_prefix(s: &str) -> String {
    if s.is_empty() || s.starts_with("0x") {
        s.to_string()
    } else {
        format!("0x{s}")
    }
}
