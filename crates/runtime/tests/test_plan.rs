use std::path::Path;

use anyhow::{Context, Result};
use noor_config::AppConfig;
use noor_database::{CreateUserRequest, UserRepository};
use noor_runtime::BackendServices;
use tempfile::TempDir;

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, max_connections: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = max_connections;
    config
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("init.db");
    let config = build_config(sqlite_url(&db_path), 4);

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let table: String = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'user_preferences'",
    )
    .fetch_one(&services.db_pool)
    .await?;

    assert_eq!("user_preferences", table);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_exposes_preference_store() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(sqlite_url(&temp_dir.path().join("store.db")), 2);

    let services = BackendServices::initialise(&config).await?;
    let user = UserRepository::new(services.db_pool.clone())
        .create(&CreateUserRequest {
            username: "runtime".to_string(),
            email: None,
        })
        .await?;

    let preference = services.preferences.get_or_create(user.id).await?;
    assert_eq!(preference.user_id, user.id);
    assert_eq!(preference.theme, "light");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_reports_unreachable_database() {
    let config = build_config("sqlite:///nonexistent-noor-dir/nested/runtime.db".into(), 1);

    let error = match BackendServices::initialise(&config).await {
        Ok(_) => panic!("expected initialisation to fail"),
        Err(error) => error,
    };
    let message = format!("{error:?}");
    assert!(
        message.contains("failed to initialise database"),
        "expected database context, got {message}"
    );
}
