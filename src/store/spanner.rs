use anyhow::{Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::Code;
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::key::Key;
use gcloud_spanner::mutation::{delete, insert_or_update};
use gcloud_spanner::statement::Statement;
use std::sync::Arc;

use super::KvStore;
use crate::config::SpannerConfig;

const TABLE: &str = "kv_entries";

/// Shareable Spanner-backed key-value store for use across async handlers
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
}

impl SpannerStore {
    /// Create a new Spanner store from configuration
    ///
    /// The gcloud-spanner library automatically detects the
    /// SPANNER_EMULATOR_HOST environment variable and connects to
    /// the emulator when set, or production Spanner otherwise.
    ///
    /// This function also performs auto-provisioning: it will automatically
    /// create the instance, database, and table if they don't exist.
    pub async fn from_config(config: &SpannerConfig) -> Result<Self> {
        auto_provision(config).await?;

        let database_path = config.database_path();

        match &config.emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        // ClientConfig::default() automatically uses SPANNER_EMULATOR_HOST if set
        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        Ok(Self {
            inner: Arc::new(client),
        })
    }
}

#[async_trait]
impl KvStore for SpannerStore {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();

        let mutation = insert_or_update(TABLE, &["kv_key", "kv_value"], &[&key, &value]);

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to write key to Spanner")?;

        tracing::debug!("Upserted key: {}", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();

        let mut statement = Statement::new("SELECT kv_value FROM kv_entries WHERE kv_key = @key");
        statement.add_param("key", &key);

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to read key from Spanner")?;

        if let Some(row) = result_set.next().await? {
            let value: String = row.column_by_name("kv_value")?;
            tracing::debug!("Read key: {}", key);
            Ok(Some(value))
        } else {
            tracing::debug!("Key not found: {}", key);
            Ok(None)
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.to_string();

        let mut statement = Statement::new(
            "SELECT kv_key FROM kv_entries WHERE STARTS_WITH(kv_key, @prefix) ORDER BY kv_key ASC",
        );
        statement.add_param("prefix", &prefix);

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction for list")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to list keys from Spanner")?;

        let mut keys = Vec::new();
        while let Some(row) = result_set.next().await? {
            let key: String = row.column_by_name("kv_key")?;
            keys.push(key);
        }

        tracing::debug!("Listed {} keys with prefix: {}", keys.len(), prefix);
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();

        self.inner
            .apply(vec![delete(TABLE, Key::new(&key))])
            .await
            .context("Failed to delete key from Spanner")?;

        tracing::debug!("Deleted key: {}", key);
        Ok(())
    }
}

/// Automatically provision Spanner instance, database, and table
///
/// Checks whether the configured resources exist and creates them if needed,
/// so local development against the emulator needs no setup.
async fn auto_provision(config: &SpannerConfig) -> Result<()> {
    tracing::info!("Starting auto-provisioning checks...");

    let admin_client = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    let project_path = format!("projects/{}", config.project);
    let instance_path = format!("{}/instances/{}", project_path, config.instance);
    let database_path = config.database_path();

    ensure_instance_exists(&admin_client, config, &project_path, &instance_path).await?;
    ensure_database_exists(&admin_client, &instance_path, &database_path).await?;
    ensure_table_exists(&admin_client, &database_path).await?;

    tracing::info!("Auto-provisioning complete");
    Ok(())
}

async fn ensure_instance_exists(
    admin_client: &AdminClient,
    config: &SpannerConfig,
    project_path: &str,
    instance_path: &str,
) -> Result<()> {
    let get_request = GetInstanceRequest {
        name: instance_path.to_string(),
        field_mask: None,
    };

    match admin_client.instance().get_instance(get_request, None).await {
        Ok(_) => {
            tracing::info!("Instance already exists: {}", instance_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Instance not found, creating: {}", instance_path);

            let instance_config = if config.emulator_host.is_some() {
                format!("{}/instanceConfigs/emulator-config", project_path)
            } else {
                format!("{}/instanceConfigs/regional-us-central1", project_path)
            };

            let create_request = CreateInstanceRequest {
                parent: project_path.to_string(),
                instance_id: config.instance.clone(),
                instance: Some(Instance {
                    name: instance_path.to_string(),
                    config: instance_config,
                    display_name: format!("{} instance", config.instance),
                    node_count: 1,
                    ..Default::default()
                }),
            };

            let mut operation = admin_client
                .instance()
                .create_instance(create_request, None)
                .await
                .context("Failed to start instance creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create instance")?;

            tracing::info!("Instance created successfully: {}", instance_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check instance existence: {}",
            e.message()
        )),
    }
}

async fn ensure_database_exists(
    admin_client: &AdminClient,
    instance_path: &str,
    database_path: &str,
) -> Result<()> {
    let get_request = GetDatabaseRequest {
        name: database_path.to_string(),
    };

    match admin_client
        .database()
        .get_database(get_request, None)
        .await
    {
        Ok(_) => {
            tracing::info!("Database already exists: {}", database_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Database not found, creating: {}", database_path);

            let database_id = database_path
                .split('/')
                .next_back()
                .context("Invalid database path")?;

            let create_request = CreateDatabaseRequest {
                parent: instance_path.to_string(),
                create_statement: format!("CREATE DATABASE `{}`", database_id),
                extra_statements: vec![],
                encryption_config: None,
                database_dialect: 1, // Google Standard SQL
                proto_descriptors: vec![],
            };

            let mut operation = admin_client
                .database()
                .create_database(create_request, None)
                .await
                .context("Failed to start database creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create database")?;

            tracing::info!("Database created successfully: {}", database_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check database existence: {}",
            e.message()
        )),
    }
}

async fn ensure_table_exists(admin_client: &AdminClient, database_path: &str) -> Result<()> {
    let get_ddl_request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl_response = admin_client
        .database()
        .get_database_ddl(get_ddl_request, None)
        .await
        .context("Failed to get database DDL")?;

    let table_exists = ddl_response
        .into_inner()
        .statements
        .iter()
        .any(|stmt| stmt.contains("CREATE TABLE kv_entries") || stmt.contains("CREATE TABLE `kv_entries`"));

    if table_exists {
        tracing::info!("Table '{}' already exists", TABLE);
        return Ok(());
    }

    tracing::info!("Table '{}' not found, creating...", TABLE);

    // Keys sort byte-wise under STRING ordering, which the prefix listing relies on
    let create_table_ddl = r#"
CREATE TABLE kv_entries (
    kv_key STRING(MAX) NOT NULL,
    kv_value STRING(MAX) NOT NULL,
) PRIMARY KEY (kv_key)
"#
    .trim()
    .to_string();

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![create_table_ddl],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Table '{}' created successfully", TABLE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_env::lock_env;

    fn emulator_config(instance: &str, database: &str) -> SpannerConfig {
        SpannerConfig {
            emulator_host: Some("localhost:9010".to_string()),
            project: "test-project".to_string(),
            instance: instance.to_string(),
            database: database.to_string(),
        }
    }

    #[test]
    fn test_store_is_clonable_and_send_sync() {
        // Handlers share the store through Arc<dyn KvStore>
        fn assert_traits<T: Clone + Send + Sync + 'static>() {}
        assert_traits::<SpannerStore>();
    }

    #[tokio::test]
    async fn test_store_against_emulator() {
        // Held for the whole test so config tests cannot clear the emulator host
        let _env = lock_env();
        unsafe {
            std::env::set_var("SPANNER_EMULATOR_HOST", "localhost:9010");
        }

        let result = SpannerStore::from_config(&emulator_config(
            "kv-store-test-instance",
            "kv-store-test-db",
        ))
        .await;

        unsafe {
            std::env::remove_var("SPANNER_EMULATOR_HOST");
        }

        let store = match result {
            Ok(store) => store,
            Err(e) => {
                // Emulator not running; the error should still carry context
                let error_msg = e.to_string();
                assert!(
                    error_msg.contains("Failed to create Spanner")
                        || error_msg.contains("Failed to start")
                        || error_msg.contains("Failed to check")
                        || error_msg.contains("Failed to get"),
                    "Error should have context: {}",
                    error_msg
                );
                return;
            }
        };

        let org = format!("org-{}", uuid::Uuid::new_v4());
        let first = format!("{org}:a:2024-01-01T00:00:00.000Z");
        let second = format!("{org}:a:2024-01-02T00:00:00.000Z");

        store.put(&second, "2").await.unwrap();
        store.put(&first, "1").await.unwrap();

        let keys = store.list(&format!("{org}:")).await.unwrap();
        assert_eq!(keys, vec![first.clone(), second.clone()]);
        assert_eq!(store.get(&second).await.unwrap(), Some("2".to_string()));

        store.delete(&first).await.unwrap();
        store.delete(&second).await.unwrap();
        assert!(store.list(&format!("{org}:")).await.unwrap().is_empty());
    }
}
