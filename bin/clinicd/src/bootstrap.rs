//! Bootstrap — first-start checks, role documents, and the admin account.
//!
//! When clinicd starts:
//! 1. Verify the config has an admin password hash — if not, refuse to start.
//! 2. Seed the role documents in KV.
//! 3. Ensure the `admin` login account exists.

use std::sync::Arc;

use clinic_core::{Role, now_rfc3339};
use tracing::info;

use crate::accounts::AccountStore;
use crate::config::ServerConfig;

/// Every role the system knows, with a short description seeded into KV.
const ROLES: &[(Role, &str)] = &[
    (Role::Admin, "Full access to every module"),
    (Role::Doctor, "Patient care, prescriptions, lab test requests"),
    (Role::LabTechnician, "Lab inventory and test execution"),
    (Role::Patient, "Own records, appointments, and results"),
    (Role::Pharmacist, "Pharmacy inventory and prescription reads"),
    (Role::Staff, "Front-desk records and scheduling"),
];

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.admin.password_hash.is_empty() {
        anyhow::bail!(
            "No admin password hash found in configuration.\n\
             Generate one with an argon2id tool and set [admin] password_hash."
        );
    }
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Seed one KV document per role. Existing documents are left alone.
pub fn ensure_role_docs(kv: &Arc<dyn clinic_kv::KVStore>) -> anyhow::Result<()> {
    for (role, description) in ROLES {
        let key = format!("auth/roles/{}", role.as_str());
        match kv.get(&key) {
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => {
                let doc = serde_json::json!({
                    "id": role.as_str(),
                    "description": description,
                    "created_at": now_rfc3339(),
                });
                let data = serde_json::to_vec(&doc)?;
                kv.set(&key, &data)
                    .map_err(|e| anyhow::anyhow!("failed to seed role {}: {}", role, e))?;
                info!("Seeded role document: {}", role);
            }
        }
    }
    Ok(())
}

/// Ensure the `admin` account exists, created from the configured hash.
pub fn ensure_admin_account(
    accounts: &AccountStore,
    config: &ServerConfig,
) -> anyhow::Result<()> {
    if accounts.find_by_username("admin")?.is_some() {
        info!("admin account already exists");
        return Ok(());
    }

    // Insert directly with the pre-hashed password from the config.
    let account = crate::accounts::Account {
        id: clinic_core::new_id(),
        username: "admin".to_string(),
        password_hash: config.admin.password_hash.clone(),
        role: Role::Admin,
        name: "Administrator".to_string(),
        subject_id: None,
        create_at: now_rfc3339(),
    };
    accounts.insert_raw(&account)?;
    info!("Created admin account");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminConfig, JwtConfig, StorageConfig};

    fn config(hash: &str) -> ServerConfig {
        ServerConfig {
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
            },
            jwt: JwtConfig {
                secret: "test".to_string(),
                expire_secs: 3600,
            },
            admin: AdminConfig {
                password_hash: hash.to_string(),
            },
        }
    }

    #[test]
    fn verify_config_empty_hash() {
        assert!(verify_config(&config("")).is_err());
        assert!(verify_config(&config("$argon2id$...")).is_ok());
    }

    #[test]
    fn role_docs_are_seeded_once() {
        let dir = tempfile::tempdir().unwrap();
        let kv: Arc<dyn clinic_kv::KVStore> = Arc::new(
            clinic_kv::RedbStore::open(&dir.path().join("kv.redb")).unwrap(),
        );

        ensure_role_docs(&kv).unwrap();
        let roles = kv.scan("auth/roles/").unwrap();
        assert_eq!(roles.len(), ROLES.len());

        // Second run leaves the documents untouched.
        ensure_role_docs(&kv).unwrap();
        assert_eq!(kv.scan("auth/roles/").unwrap().len(), ROLES.len());
    }

    #[test]
    fn admin_account_created_once() {
        let sql = Arc::new(clinic_sql::SqliteStore::open_in_memory().unwrap());
        let accounts = AccountStore::new(sql).unwrap();
        let config = config("$argon2id$fake-hash");

        ensure_admin_account(&accounts, &config).unwrap();
        let admin = accounts.find_by_username("admin").unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.password_hash, "$argon2id$fake-hash");

        ensure_admin_account(&accounts, &config).unwrap();
        assert_eq!(accounts.list(10, 0).unwrap().total, 1);
    }
}
