// src/core/condition.rs

use std::collections::BTreeMap;

/// Constraints attached to a setting, such as `[arch=arm*][sdk=iphoneos*]`.
///
/// The same type doubles as the evaluation context: a setting's condition matches a
/// context when every constrained key is present in the context and its glob pattern
/// matches the context's value. An empty condition matches every context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    values: BTreeMap<String, String>,
}

impl Condition {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if this condition is satisfied by `context`.
    pub fn matches(&self, context: &Self) -> bool {
        self.values.iter().all(|(key, pattern)| {
            context
                .values
                .get(key)
                .is_some_and(|actual| wildcard_match(pattern, actual))
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Condition {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Glob match supporting `*` (any run of characters) and `?` (one character).
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || Some(&c) == text.get(t) => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, consumed)) => {
                    p = star + 1;
                    t = consumed + 1;
                    backtrack = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }

    pattern.iter().skip(p).all(|&c| c == '*')
}
