//! Person lookups backing the route.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A person as returned by the person lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    /// Random number in `0..=99`.
    pub random_number: u32,
    /// When the lookup resolved.
    pub resolve_at: DateTime<Utc>,
}

impl Person {
    fn resolved_now(name: &str) -> Self {
        Self {
            name: name.to_string(),
            random_number: rand::thread_rng().gen_range(0..100),
            resolve_at: Utc::now(),
        }
    }

    /// Resolve time as an ISO-8601 string with milliseconds.
    pub fn resolve_at_iso(&self) -> String {
        self.resolve_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Look up a person immediately.
pub async fn person_server_fn(name: &str) -> anyhow::Result<Person> {
    Ok(Person::resolved_now(name))
}

/// Look up a person after `delay`.
pub async fn slow_server_fn(name: &str, delay: Duration) -> anyhow::Result<Person> {
    tokio::time::sleep(delay).await;
    Ok(Person::resolved_now(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_person_fields() {
        let person = person_server_fn("John Doe").await.unwrap();
        assert_eq!(person.name, "John Doe");
        assert!(person.random_number < 100);
        assert!(person.resolve_at_iso().ends_with('Z'));

        let json = serde_json::to_value(&person).unwrap();
        assert!(json.get("randomNumber").is_some());
        assert!(json.get("resolveAt").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_waits() {
        let start = tokio::time::Instant::now();
        let person = slow_server_fn("Tanner Linsley", Duration::from_millis(1000))
            .await
            .unwrap();
        assert_eq!(person.name, "Tanner Linsley");
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }
}
