//! Argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kvcache")]
#[command(about = "Talk to the configured Redis cache")]
pub struct Args {
    /// Configuration file (defaults to $KVCACHE_CONFIG, then ./config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check the cache answers
    Ping,

    /// Print the value stored at KEY
    Get { key: String },

    /// Store VALUE at KEY with the configured expiration
    Set { key: String, value: String },

    /// Write FIELD=VALUE pairs into hash NAME
    Hset {
        name: String,
        #[arg(required = true, value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Print every field of hash NAME as JSON
    HgetAll { name: String },

    /// Connect, then report handle state and generation
    State,
}

/// Split `FIELD=VALUE` on the first `=`
///
/// # Errors
///
/// Returns a message when no `=` is present or the field is empty.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(format!("expected FIELD=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let args = Args::try_parse_from(["kvcache", "get", "session:1"]).unwrap();
        assert_eq!(args.command, Command::Get { key: "session:1".to_string() });
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_hset_pairs() {
        let args = Args::try_parse_from([
            "kvcache", "--config", "/etc/kvcache.yaml", "hset", "user:1", "name=alice", "eq=a=b",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("/etc/kvcache.yaml")));
        assert_eq!(
            args.command,
            Command::Hset {
                name: "user:1".to_string(),
                fields: vec![
                    ("name".to_string(), "alice".to_string()),
                    ("eq".to_string(), "a=b".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_hset_requires_fields() {
        assert!(Args::try_parse_from(["kvcache", "hset", "user:1"]).is_err());
        assert!(Args::try_parse_from(["kvcache", "hset", "user:1", "novalue"]).is_err());
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("a=").unwrap(), ("a".to_string(), String::new()));
        assert!(parse_field("=1").is_err());
    }

    #[test]
    fn test_kebab_case_subcommand() {
        let args = Args::try_parse_from(["kvcache", "hget-all", "m"]).unwrap();
        assert_eq!(args.command, Command::HgetAll { name: "m".to_string() });
    }
}
