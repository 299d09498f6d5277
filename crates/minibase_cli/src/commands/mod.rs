//! CLI command implementations.

pub mod delete;
pub mod get;
pub mod insert;
pub mod inspect;
pub mod update;

use minibase_core::{Collection, Config, CoreResult, Value};
use std::path::PathBuf;

/// The collection a command operates on.
pub struct Target {
    /// Parent directory of the collection.
    pub dir: PathBuf,
    /// Collection name.
    pub name: String,
    /// Collection configuration.
    pub config: Config,
}

impl Target {
    /// Opens the collection, resuming identifiers after those on disk.
    pub fn open(&self) -> CoreResult<Collection> {
        Collection::open(&self.name, &self.dir, self.config.clone())
    }
}

/// Parses `name=value` arguments.
///
/// The value is read as JSON when it parses (`30`, `true`, `[1,2]`,
/// `"quoted"`), otherwise it is kept as text.
pub fn parse_fields(args: &[String]) -> Result<Vec<(String, Value)>, String> {
    args.iter()
        .map(|arg| {
            let (name, raw) = arg
                .split_once('=')
                .ok_or_else(|| format!("expected name=value, got '{arg}'"))?;
            if name.is_empty() {
                return Err(format!("empty field name in '{arg}'"));
            }
            let value = serde_json::from_str::<Value>(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string()));
            Ok((name.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn parses_json_and_text() {
        let fields = parse_fields(&args(&["age=30", "name=Sajith", "ok=true", "tags=[1,2]"])).unwrap();
        assert_eq!(fields[0], ("age".to_string(), Value::Integer(30)));
        assert_eq!(fields[1], ("name".to_string(), Value::from("Sajith")));
        assert_eq!(fields[2], ("ok".to_string(), Value::Bool(true)));
        assert_eq!(
            fields[3].1,
            Value::Sequence(vec![Value::Integer(1), Value::Integer(2)])
        );
    }

    #[test]
    fn value_may_contain_equals() {
        let fields = parse_fields(&args(&["expr=a=b"])).unwrap();
        assert_eq!(fields[0].1, Value::from("a=b"));
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_fields(&args(&["novalue"])).is_err());
        assert!(parse_fields(&args(&["=x"])).is_err());
    }
}
