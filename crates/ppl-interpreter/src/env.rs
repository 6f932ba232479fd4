//! Register environment of one execution instance.

use std::collections::HashMap;

/// Name of the register a program leaves its result in.
pub const OUTPUT: &str = "y";

/// Name of the `i`-th (1-based) input register.
pub fn input_name(i: usize) -> String {
    format!("x{}", i)
}

/// Register name -> value. Registers come into existence on first
/// assignment; reading an absent one is an error for the caller to raise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    vars: HashMap<String, i64>,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `values` to `x1..xn` and nothing else.
    pub fn with_inputs(values: &[i64]) -> Self {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (input_name(i + 1), *v))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.vars.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn set(&mut self, name: &str, value: i64) {
        match self.vars.get_mut(name) {
            Some(v) => *v = value,
            None => {
                self.vars.insert(name.to_string(), value);
            }
        }
    }

    /// Sets `name` to 0 only if it is absent.
    pub fn init(&mut self, name: &str) {
        if !self.vars.contains_key(name) {
            self.vars.insert(name.to_string(), 0);
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All registers sorted by name.
    pub fn snapshot(&self) -> Vec<(String, i64)> {
        let mut v: Vec<(String, i64)> = self.vars.iter().map(|(k, v)| (k.clone(), *v)).collect();
        v.sort_by(|a, b| a.0.cmp(&b.0));
        v
    }
}

impl FromIterator<(String, i64)> for Registers {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self { vars: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_are_numbered_from_one() {
        let regs = Registers::with_inputs(&[5, 7]);
        assert_eq!(regs.get("x1"), Some(5));
        assert_eq!(regs.get("x2"), Some(7));
        assert_eq!(regs.get("x0"), None);
        assert_eq!(regs.len(), 2);
    }

    #[test]
    fn init_keeps_existing_values() {
        let mut regs = Registers::new();
        regs.init("a");
        assert_eq!(regs.get("a"), Some(0));
        regs.set("a", 4);
        regs.init("a");
        assert_eq!(regs.get("a"), Some(4));
    }

    #[test]
    fn snapshot_is_sorted() {
        let mut regs = Registers::new();
        regs.set("y", 1);
        regs.set("a", 2);
        regs.set("x1", 3);
        let names: Vec<String> = regs.snapshot().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "x1", "y"]);
    }
}
