// src/core/setting.rs

use crate::core::condition::Condition;
use crate::core::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A single build setting assignment: `NAME[cond=pattern] = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    name: String,
    condition: Condition,
    value: Value,
}

impl Setting {
    pub fn new(name: impl Into<String>, condition: Condition, value: Value) -> Self {
        Self {
            name: name.into(),
            condition,
            value,
        }
    }

    /// An unconditional setting whose value is taken literally, without parsing references.
    pub fn create(name: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::new(name, Condition::empty(), Value::string(literal))
    }

    /// An unconditional setting whose value text is parsed for references.
    pub fn parse_pair(name: impl Into<String>, value: &str) -> Self {
        Self::new(name, Condition::empty(), Value::parse(value))
    }

    /// Parses one assignment line.
    ///
    /// Conditions may be written as separate groups (`[arch=*][sdk=iphoneos*]`) or as a
    /// comma separated group (`[arch=*,sdk=iphoneos*]`). Whitespace around the name and
    /// the value is trimmed.
    ///
    /// # Returns
    ///
    /// `None` when the line has no `=`, when a condition group is unterminated or lacks
    /// its own `=`, when conditions are not followed by an assignment, or when the
    /// name is empty.
    pub fn parse(line: &str) -> Option<Self> {
        let equal = line.find('=')?;
        let bracket = line.find('[').filter(|&open| open < equal);

        let (name, condition, value) = match bracket {
            Some(open) => {
                let (name, groups) = line.split_at(open);
                let (conditions, rest) = parse_condition_groups(groups)?;
                let value = rest.trim_start().strip_prefix('=')?;
                (name, Condition::new(conditions), value)
            }
            None => {
                let (name, value) = line.split_at(equal);
                (name, Condition::empty(), value.get(1..).unwrap_or_default())
            }
        };

        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Self::new(name, condition, Value::parse(value.trim())))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns `true` if this setting assigns `name` under the evaluation `context`.
    pub fn matches(&self, name: &str, context: &Condition) -> bool {
        self.name == name && self.condition.matches(context)
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (key, pattern) in self.condition.values() {
            write!(f, "[{key}={pattern}]")?;
        }
        write!(f, " = {}", self.value.raw())
    }
}

/// Consumes consecutive `[k=v,...]` groups, returning the collected constraints and
/// the text after the last group.
fn parse_condition_groups(mut rest: &str) -> Option<(BTreeMap<String, String>, &str)> {
    let mut conditions = BTreeMap::new();

    while let Some(group) = rest.trim_start().strip_prefix('[') {
        let close = group.find(']')?;
        let (body, tail) = group.split_at(close);

        for clause in body.split(',') {
            let (key, pattern) = clause.split_once('=')?;
            conditions.insert(key.trim().to_string(), pattern.trim().to_string());
        }

        rest = tail.get(1..).unwrap_or_default();
    }

    Some((conditions, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> Setting {
        Setting::parse(line).unwrap()
    }

    #[test]
    fn test_parse_basic() {
        let basic = parsed("OTHER_CFLAGS = -Werror");
        assert_eq!(basic.name(), "OTHER_CFLAGS");
        assert_eq!(basic.value(), &Value::parse("-Werror"));
        assert!(basic.condition().is_empty());

        let round = parsed("NAME = VALUE");
        assert_eq!(round, Setting::create("NAME", "VALUE"));
    }

    #[test]
    fn test_parse_empty_values() {
        let empty = parsed("CUSTOM = ");
        assert_eq!(empty.name(), "CUSTOM");
        assert_eq!(empty.value(), &Value::empty());

        let spacing = parsed("  SETTING   =    ");
        assert_eq!(spacing.name(), "SETTING");
        assert_eq!(spacing.value(), &Value::empty());
    }

    #[test]
    fn test_parse_references() {
        let var = parsed("WITH_VAR = $(inherited) $(SETTING)");
        assert_eq!(var.value(), &Value::parse("$(inherited) $(SETTING)"));

        let braces = parsed("WITH_VAR = ${inherited} ${SETTING}");
        assert_eq!(braces.value(), &Value::parse("$(inherited) $(SETTING)"));

        let nested = parsed("WITH_VAR = $(VALUE_$(SETTING))");
        assert_eq!(nested.value(), &Value::parse("$(VALUE_$(SETTING))"));
    }

    #[test]
    fn test_parse_conditions() {
        let cond = parsed("CONDITION[arch=*] = value");
        assert_eq!(cond.name(), "CONDITION");
        assert_eq!(cond.value(), &Value::string("value"));
        assert_eq!(cond.condition().values().len(), 1);
        assert_eq!(cond.condition().values().get("arch").map(String::as_str), Some("*"));

        let cond2 = parsed("CONDITION[arch=*][sdk=*some*] = value");
        assert_eq!(cond2.condition().values().len(), 2);
        assert_eq!(
            cond2.condition().values().get("sdk").map(String::as_str),
            Some("*some*")
        );

        let alt = parsed("CONDITION[arch=*,sdk=ansdk*] = value");
        assert_eq!(alt.condition().values().len(), 2);
        assert_eq!(alt.condition().values().get("sdk").map(String::as_str), Some("ansdk*"));
        assert_eq!(alt.value(), &Value::string("value"));
    }

    #[test]
    fn test_parse_failures() {
        assert!(Setting::parse("NAME_ONLY").is_none());
        assert!(Setting::parse("NAME[arch=*]").is_none());
        assert!(Setting::parse("NAME[arch] = value").is_none());
        assert!(Setting::parse("NAME[arch=* = value").is_none());
        assert!(Setting::parse(" = value").is_none());
    }

    #[test]
    fn test_brackets_inside_value_are_not_conditions() {
        let setting = parsed("FLAGS = -D[x]");
        assert_eq!(setting.name(), "FLAGS");
        assert!(setting.condition().is_empty());
        assert_eq!(setting.value(), &Value::string("-D[x]"));
    }

    #[test]
    fn test_matches_under_context() {
        let setting = parsed("FLAGS[sdk=iphone*] = -mios");
        let iphone: Condition = [("sdk", "iphoneos9.0")].into_iter().collect();
        assert!(setting.matches("FLAGS", &iphone));
        assert!(!setting.matches("FLAGS", &Condition::empty()));
        assert!(!setting.matches("OTHER", &iphone));
    }

    #[test]
    fn test_display() {
        assert_eq!(parsed("A[arch=x] = $(B)").to_string(), "A[arch=x] = $(B)");
    }
}
