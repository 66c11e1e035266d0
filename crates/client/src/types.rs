//! Request/response shapes exchanged with the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use itematic_auth::{Role, UserPatch};
use itematic_core::{BranchId, CategoryId, CompanyId, ItemId, UserId};

use crate::errors::ApiError;

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Username/password pair sent to the credential exchange.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful credential exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Company
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nif: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCompany {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nif: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct NewAdminUser {
    pub name: String,
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for NewAdminUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewAdminUser")
            .field("name", &self.name)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Sign-up payload: a company and its first administrator.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyRegistration {
    pub company: NewCompany,
    pub admin_user: NewAdminUser,
}

// ─────────────────────────────────────────────────────────────────────────────
// Branches
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

/// Create/update body for a branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchInput {
    pub name: String,
    pub address: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// A user account as listed by the user-management endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    /// Missing, blank or non-string roles read as `None`.
    #[serde(default, deserialize_with = "itematic_auth::roles::lenient_role")]
    pub role: Option<Role>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Refresh the signed-in user's session from an edited account.
impl From<UserAccount> for UserPatch {
    fn from(account: UserAccount) -> Self {
        Self {
            name: Some(account.name),
            username: Some(account.username),
            role: account.role,
            company_id: account.company_id,
            branch_id: Some(account.branch_id),
            ..UserPatch::default()
        }
    }
}

#[derive(Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub branch_id: Option<BranchId>,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("branch_id", &self.branch_id)
            .finish_non_exhaustive()
    }
}

/// Self-service profile update. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Administrative update. Only changed fields are sent; `branch_id` may be
/// sent as `null` to lift a user's branch scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<Option<BranchId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl AdminUserUpdate {
    /// Record a branch change only when it differs from the current one.
    pub fn branch_if_changed(mut self, current: Option<BranchId>, requested: Option<BranchId>) -> Self {
        if current != requested {
            self.branch_id = Some(requested);
        }
        self
    }

    /// Record an activation change only when it differs from the current one.
    pub fn active_if_changed(mut self, current: Option<bool>, requested: bool) -> Self {
        if current != Some(requested) {
            self.is_active = Some(requested);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Items
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// Uploaded item picture.
#[derive(Clone)]
pub struct ItemImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl core::fmt::Debug for ItemImage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ItemImage")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Create/update body for an item, sent as `multipart/form-data`.
#[derive(Debug, Clone, Default)]
pub struct ItemForm {
    pub name: String,
    pub sku: String,
    pub unit: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub brand: Option<String>,
    /// Remote image to link; ignored when `image` is set.
    pub image_url: Option<String>,
    pub image: Option<ItemImage>,
    /// Only sent on update.
    pub is_active: Option<bool>,
}

impl ItemForm {
    /// Text fields in the order they are sent. Empty optionals are omitted.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("sku", self.sku.clone()),
            ("unit", self.unit.clone()),
        ];
        if let Some(description) = self.description.as_ref().filter(|d| !d.is_empty()) {
            fields.push(("description", description.clone()));
        }
        if let Some(price) = self.price {
            fields.push(("price", price.to_string()));
        }
        if let Some(brand) = self.brand.as_ref().filter(|b| !b.is_empty()) {
            fields.push(("brand", brand.clone()));
        }
        if self.image.is_none() {
            if let Some(url) = self.image_url.as_ref().filter(|u| !u.is_empty()) {
                fields.push(("image_url_form", url.clone()));
            }
        }
        if let Some(active) = self.is_active {
            fields.push(("is_active", active.to_string()));
        }
        fields
    }

    pub fn into_multipart(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.text_fields() {
            form = form.text(name, value);
        }
        if let Some(image) = self.image {
            let part = reqwest::multipart::Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime)
                .map_err(|e| ApiError::Form(format!("image mime type: {e}")))?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Categories
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    pub name: String,
    pub color: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("alice", "correct-pw");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("alice"));
        assert!(!dbg.contains("correct-pw"));
    }

    #[test]
    fn token_type_defaults_to_bearer() {
        let grant: TokenGrant = serde_json::from_value(json!({"access_token": "tok"})).unwrap();
        assert_eq!(grant.token_type, "bearer");
    }

    #[test]
    fn admin_update_sends_only_changes() {
        let update = AdminUserUpdate {
            name: Some("Bob".to_string()),
            ..AdminUserUpdate::default()
        }
        .branch_if_changed(Some(BranchId::new(2)), Some(BranchId::new(2)))
        .active_if_changed(Some(true), true);

        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"name": "Bob"}));
    }

    #[test]
    fn admin_update_can_clear_branch() {
        let update = AdminUserUpdate::default().branch_if_changed(Some(BranchId::new(2)), None);
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"branch_id": null}));
        assert!(!update.is_empty());
        assert!(AdminUserUpdate::default().is_empty());
    }

    #[test]
    fn user_update_skips_unset_fields() {
        let update = UserUpdate {
            password: Some("new-password".to_string()),
            ..UserUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"password": "new-password"})
        );
    }

    #[test]
    fn new_user_sends_null_branch() {
        let user = NewUser {
            name: "Eve".to_string(),
            username: "eve".to_string(),
            password: "password1".to_string(),
            role: Role::new("employee"),
            branch_id: None,
        };
        let body = serde_json::to_value(&user).unwrap();
        assert_eq!(body["role"], "EMPLOYEE");
        assert_eq!(body["branch_id"], json!(null));
    }

    #[test]
    fn item_form_fields() {
        let form = ItemForm {
            name: "Drill".to_string(),
            sku: "DRL01".to_string(),
            unit: "unit".to_string(),
            price: Some(19.5),
            brand: Some(String::new()),
            image_url: Some("https://img.example/drill.png".to_string()),
            is_active: Some(false),
            ..ItemForm::default()
        };
        let names: Vec<&str> = form.text_fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["name", "sku", "unit", "price", "image_url_form", "is_active"]);
    }

    #[test]
    fn uploaded_image_replaces_linked_url() {
        let form = ItemForm {
            image_url: Some("https://img.example/drill.png".to_string()),
            image: Some(ItemImage {
                file_name: "drill.png".to_string(),
                mime: "image/png".to_string(),
                bytes: vec![1, 2, 3],
            }),
            ..ItemForm::default()
        };
        assert!(form.text_fields().iter().all(|(n, _)| *n != "image_url_form"));
        assert!(form.into_multipart().is_ok());
    }

    #[test]
    fn item_deserializes_with_defaults() {
        let item: Item = serde_json::from_value(json!({
            "id": 4,
            "name": "Drill",
            "sku": "DRL01",
            "created_at": "2025-03-01T10:00:00Z",
        }))
        .unwrap();
        assert!(item.is_active);
        assert_eq!(item.price, None);
        assert!(item.created_at.is_some());
    }

    #[test]
    fn odd_account_roles_read_as_absent() {
        let accounts: Vec<UserAccount> = serde_json::from_value(json!([
            {"id": 1, "role": ""},
            {"id": 2, "role": 5},
            {"id": 3, "role": "employee"},
        ]))
        .unwrap();
        assert_eq!(accounts[0].role, None);
        assert_eq!(accounts[1].role, None);
        assert_eq!(accounts[2].role, Some(Role::EMPLOYEE));

        let mut user = itematic_auth::SessionUser::new(UserId::new(1), CompanyId::new(9)).with_role("EMPLOYEE");
        user.apply(UserPatch::from(accounts[0].clone()));
        assert_eq!(user.role, Some(Role::EMPLOYEE));
        assert!(!itematic_auth::has_role(Some(&user), ""));
    }

    #[test]
    fn account_patch_replaces_scope() {
        let account: UserAccount = serde_json::from_value(json!({
            "id": 1, "name": "Alice", "username": "alice", "role": "manager", "branch_id": null
        }))
        .unwrap();
        let patch = UserPatch::from(account);
        assert_eq!(patch.role, Some(Role::MANAGER));
        assert_eq!(patch.branch_id, Some(None));
        assert_eq!(patch.company_id, None);
    }
}
