pub mod admin;
pub mod member;
pub mod public;
pub mod supervisor;

use std::collections::HashMap;

use axum::extract::Multipart;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AppRole;
use crate::db::models::profile::Profile;
use crate::error::ApiError;

/// Resolve a user's role from the roles table. Lookup failures resolve to
/// the base role rather than erroring: a broken roles table must never lock
/// members out of their own account, it only costs elevated access.
pub async fn resolve_role(pool: &PgPool, user_id: Uuid) -> AppRole {
    let lookup = sqlx::query_scalar::<_, AppRole>("SELECT role FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await;

    match lookup {
        Ok(Some(role)) => role,
        Ok(None) => AppRole::User,
        Err(e) => {
            tracing::warn!(
                "Role lookup failed for {}, falling back to base role: {}",
                user_id,
                e
            );
            AppRole::User
        }
    }
}

/// Session payload shared by login and the session endpoint: identity plus
/// derived role flags so clients never compute capabilities themselves.
pub fn session_payload(profile: &Profile, role: AppRole) -> Value {
    json!({
        "user": profile,
        "role": role,
        "is_admin": role.can_administer(),
        "is_super_admin": role.is_super_admin(),
    })
}

/// A multipart form reduced to its text fields and at most one file part.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<(String, Vec<u8>)>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn require_field(&self, name: &str) -> Result<&str, ApiError> {
        self.field(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("Missing field: {}", name)))
    }

    pub fn bool_field(&self, name: &str) -> bool {
        matches!(self.field(name), Some("true") | Some("1") | Some("on"))
    }
}

pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(part) = multipart.next_field().await? {
        match part.file_name() {
            Some(filename) => {
                let filename = filename.to_string();
                let bytes = part.bytes().await?;
                form.file = Some((filename, bytes.to_vec()));
            }
            None => {
                let name = part.name().unwrap_or_default().to_string();
                let value = part.text().await?;
                if !name.is_empty() {
                    form.fields.insert(name, value);
                }
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_field_accepts_common_truthy_spellings() {
        let mut form = UploadForm::default();
        form.fields.insert("show_as_popup".into(), "true".into());
        form.fields.insert("is_active".into(), "no".into());
        assert!(form.bool_field("show_as_popup"));
        assert!(!form.bool_field("is_active"));
        assert!(!form.bool_field("absent"));
    }

    #[test]
    fn require_field_rejects_empty_values() {
        let mut form = UploadForm::default();
        form.fields.insert("title".into(), "".into());
        assert!(form.require_field("title").is_err());
        form.fields.insert("title".into(), "Night ride".into());
        assert_eq!(form.require_field("title").unwrap(), "Night ride");
    }
}
