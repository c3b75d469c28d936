use bson::{doc, Document};
use futures::stream::StreamExt;
use mongodb::options::{ClientOptions, Credential, ResolverConfig};
use mongodb::{Client, Cursor, Database};
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::config::MongoConfig;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::time::DateRange;

/// Open a client with the configured pool and credentials and return the
/// application database. Repositories share the returned handle.
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("StorefrontAdmin".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));
    client_options.server_selection_timeout =
        Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    let database = client.database(&config.database);
    database.run_command(doc! { "ping": 1 }, None).await?;
    info!(database = %config.database, "Connected to MongoDB");
    Ok(database)
}

/// Drain a cursor, failing on the first document that does not deserialize.
pub(crate) async fn collect<T>(mut cursor: Cursor<T>, what: &str) -> RepositoryResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut records = Vec::new();
    while let Some(record) = cursor.next().await {
        match record {
            Ok(r) => records.push(r),
            Err(e) => {
                error!("Failed to deserialize {}: {}", what, e);
                return Err(RepositoryError::serialization(format!("Failed to deserialize {}: {}", what, e)));
            }
        }
    }
    Ok(records)
}

/// `createdAt` filter for an inclusive day range; empty when unbounded.
pub(crate) fn created_within(range: &DateRange) -> Document {
    let mut bounds = Document::new();
    if let Some(lower) = range.lower_bound() {
        bounds.insert("$gte", lower);
    }
    if let Some(upper) = range.upper_bound() {
        bounds.insert("$lt", upper);
    }
    if bounds.is_empty() {
        Document::new()
    } else {
        doc! { "createdAt": bounds }
    }
}

/// Escape user text for use inside a `$regex`.
pub(crate) fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_within_bounds() {
        let range = DateRange::parse(Some("2026-01-01"), Some("2026-01-31")).unwrap();
        assert_eq!(
            created_within(&range),
            doc! { "createdAt": { "$gte": "2026-01-01T00:00:00.000Z", "$lt": "2026-02-01T00:00:00.000Z" } }
        );
        assert!(created_within(&DateRange::default()).is_empty());
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("a.b(c)"), "a\\.b\\(c\\)");
        assert_eq!(escape_regex("plain"), "plain");
    }
}
