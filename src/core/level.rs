// src/core/level.rs

use crate::core::condition::Condition;
use crate::core::setting::Setting;
use crate::core::value::Value;

/// One configuration layer: an ordered list of settings from a single source such as
/// an xcconfig file, the command line, or a tool's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Level {
    settings: Vec<Setting>,
}

impl Level {
    pub fn new(settings: Vec<Setting>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Looks up the value this level assigns to `name` under `context`.
    ///
    /// Every entry is kept, so when a name is assigned more than once the last
    /// matching entry wins, the same way a later line in an xcconfig file overrides
    /// an earlier one.
    pub fn get(&self, name: &str, context: &Condition) -> Option<&Value> {
        self.settings
            .iter()
            .rev()
            .find(|setting| setting.matches(name, context))
            .map(Setting::value)
    }
}

impl FromIterator<Setting> for Level {
    fn from_iter<I: IntoIterator<Item = Setting>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing() {
        let level = Level::new(vec![Setting::create("ONE", "1")]);
        assert_eq!(level.get("TWO", &Condition::empty()), None);
    }

    #[test]
    fn test_later_entry_wins() {
        let level: Level = ["A = first", "A = second"]
            .into_iter()
            .filter_map(Setting::parse)
            .collect();
        assert_eq!(level.settings().len(), 2);
        assert_eq!(level.get("A", &Condition::empty()), Some(&Value::string("second")));
    }

    #[test]
    fn test_conditional_entries() {
        let level: Level = ["CC = cc", "CC[arch=arm64] = arm-cc"]
            .into_iter()
            .filter_map(Setting::parse)
            .collect();
        let arm: Condition = [("arch", "arm64")].into_iter().collect();
        let x86: Condition = [("arch", "x86_64")].into_iter().collect();
        assert_eq!(level.get("CC", &arm), Some(&Value::string("arm-cc")));
        assert_eq!(level.get("CC", &x86), Some(&Value::string("cc")));
        assert_eq!(level.get("CC", &Condition::empty()), Some(&Value::string("cc")));
    }
}
