//! Command aliases

use super::parse::escape_arg;
use std::collections::BTreeMap;

/// Alias name → source string, kept sorted for dumps.
#[derive(Debug, Clone, Default)]
pub struct AliasSet {
    map: BTreeMap<String, String>,
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl AliasSet {
    pub fn new() -> Self {
        AliasSet::default()
    }

    pub fn add(&mut self, name: &str, value: &str) -> Result<(), String> {
        if !valid_name(name) {
            return Err(format!("Invalid alias name: {name}"));
        }
        self.map.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }

    pub fn find(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// Parser-compatible dump, one `alias` command per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.map {
            out.push_str(&format!("alias {} {}\n", name, escape_arg(value)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_find_remove() {
        let mut a = AliasSet::new();
        a.add("q", "quit").unwrap();
        assert_eq!(a.find("q"), Some("quit"));
        assert!(a.remove("q"));
        assert!(!a.remove("q"));
        assert_eq!(a.find("q"), None);
    }

    #[test]
    fn test_name_validation() {
        let mut a = AliasSet::new();
        assert!(a.add("save-all", "save; quit").is_ok());
        assert!(a.add("", "x").is_err());
        assert!(a.add("has space", "x").is_err());
        assert!(a.add("semi;colon", "x").is_err());
    }

    #[test]
    fn test_dump_is_sorted_and_quoted() {
        let mut a = AliasSet::new();
        a.add("w", "save").unwrap();
        a.add("q", "quit -f").unwrap();
        assert_eq!(a.dump(), "alias q 'quit -f'\nalias w save\n");
    }
}
