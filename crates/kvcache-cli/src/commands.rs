//! Command execution.

use kvcache_client::{CacheError, CacheManager, Connector, Result};
use std::collections::{BTreeMap, HashMap};

use crate::cli::Command;

/// What a command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text for stdout
    Output(String),
    /// The key does not exist
    Missing(String),
}

/// Run one command against the manager
///
/// # Errors
///
/// Any cache error other than a missing key, which becomes [`Outcome::Missing`].
pub async fn execute<S: Connector, C: Connector>(
    manager: &CacheManager<S, C>,
    command: &Command,
) -> Result<Outcome> {
    match command {
        Command::Ping => {
            manager.ping().await?;
            Ok(Outcome::Output("PONG".to_string()))
        }
        Command::Get { key } => match manager.retrieve(key).await {
            Ok(value) => Ok(Outcome::Output(value)),
            Err(CacheError::NotFound { key }) => Ok(Outcome::Missing(key)),
            Err(e) => Err(e),
        },
        Command::Set { key, value } => {
            manager.store(key, value).await?;
            Ok(Outcome::Output("OK".to_string()))
        }
        Command::Hset { name, fields } => {
            let fields: HashMap<&str, &str> = fields
                .iter()
                .map(|(field, value)| (field.as_str(), value.as_str()))
                .collect();
            manager.store_map(name, &fields).await?;
            Ok(Outcome::Output(format!("{} field(s) written", fields.len())))
        }
        Command::HgetAll { name } => {
            let fields = manager.retrieve_map(name).await?;
            Ok(Outcome::Output(render_map(fields)))
        }
        Command::State => {
            manager.ping().await?;
            let kind = manager.active_kind();
            let state = manager.state(kind).await;
            Ok(Outcome::Output(format!(
                "{kind}: {state:?} (generation {})",
                manager.generation(kind)
            )))
        }
    }
}

/// Pretty JSON with fields in key order
#[must_use]
pub fn render_map(fields: HashMap<String, String>) -> String {
    let sorted: BTreeMap<String, String> = fields.into_iter().collect();
    serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvcache_client::HandleKind;
    use kvcache_client::testing::{FakeConnector, FakeStore};
    use kvcache_config::RedisSettings;

    fn manager() -> CacheManager<FakeConnector, FakeConnector> {
        let store = FakeStore::default();
        let settings = RedisSettings {
            health_check_interval: 0,
            ..RedisSettings::default()
        };
        CacheManager::with_connectors(
            settings,
            FakeConnector::new(HandleKind::SingleNode, store.clone()),
            FakeConnector::new(HandleKind::Cluster, store),
        )
    }

    fn output(text: &str) -> Outcome {
        Outcome::Output(text.to_string())
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let manager = manager();
        let get = Command::Get {
            key: "session:1".to_string(),
        };

        let outcome = execute(&manager, &get).await.unwrap();
        assert_eq!(outcome, Outcome::Missing("session:1".to_string()));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let manager = manager();
        let set = Command::Set {
            key: "session:1".to_string(),
            value: "alice".to_string(),
        };
        let get = Command::Get {
            key: "session:1".to_string(),
        };

        assert_eq!(execute(&manager, &set).await.unwrap(), output("OK"));
        assert_eq!(execute(&manager, &get).await.unwrap(), output("alice"));
    }

    #[tokio::test]
    async fn test_hset_counts_unique_fields() {
        let manager = manager();
        let hset = Command::Hset {
            name: "user:7".to_string(),
            fields: vec![
                ("a".to_string(), "1".to_string()),
                ("a".to_string(), "2".to_string()),
                ("b".to_string(), "3".to_string()),
            ],
        };
        let hgetall = Command::HgetAll {
            name: "user:7".to_string(),
        };

        let outcome = execute(&manager, &hset).await.unwrap();
        assert_eq!(outcome, output("2 field(s) written"));

        let Outcome::Output(rendered) = execute(&manager, &hgetall).await.unwrap() else {
            panic!("hget-all never reports a missing hash");
        };
        let fields: BTreeMap<String, String> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["b"], "3");
    }

    #[tokio::test]
    async fn test_ping_and_state() {
        let manager = manager();

        assert_eq!(execute(&manager, &Command::Ping).await.unwrap(), output("PONG"));

        let Outcome::Output(state) = execute(&manager, &Command::State).await.unwrap() else {
            panic!("state always produces output");
        };
        assert!(state.contains("Connected"), "{state}");
        assert!(state.contains("generation 1"), "{state}");
    }

    #[test]
    fn test_render_map_is_sorted() {
        let fields = HashMap::from([
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ]);

        assert_eq!(render_map(fields), "{\n  \"a\": \"1\",\n  \"b\": \"2\"\n}");
    }

    #[test]
    fn test_render_empty_map() {
        assert_eq!(render_map(HashMap::new()), "{}");
    }
}
