//! One-time admin provisioning.
//!
//! Admins cannot self-register through the API; this binary inserts one
//! directly into the database. Re-running against an existing admin email is
//! reported, not treated as a failure.

use anyhow::Context;

use courseforge_auth::{Role, hash_password};
use courseforge_store::{NewUser, PostgresStore, Store, StoreError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    courseforge_observability::init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string());
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@gmail.com".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    let store = PostgresStore::connect(&database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    let password_hash = hash_password(&password).context("failed to hash admin password")?;
    let admin = NewUser {
        name,
        email: email.clone(),
        password_hash,
        role: Role::Admin,
        approved: true,
    };

    match store.insert_user(admin).await {
        Ok(user) => tracing::info!(id = %user.id, %email, "admin created successfully"),
        Err(StoreError::Conflict(_)) => tracing::warn!(%email, "admin already exists"),
        Err(e) => return Err(e).context("failed to insert admin"),
    }

    Ok(())
}
