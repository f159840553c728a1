// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lead::Department;

/// Claims we care about inside the bearer token. The token is issued by the
/// external identity provider; everything else in it is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub oid: Option<String>,
}

/// Identity decoded from the token, shown in the UI header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: Option<String>,
    pub name: String,
    pub username: Option<String>,
}

/// What the token store persists: the raw token, its expiry, and the decoded
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub identity: UserIdentity,
}

/// Result of the external role lookup, consumed only to pick the initial
/// department context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleContext {
    pub is_admin: bool,
    pub is_sale: bool,
    pub user_id: Option<String>,
    pub roles: Vec<String>,
}

impl RoleContext {
    /// Admins start with no department selected and choose one explicitly;
    /// everyone else lands in their own department.
    pub fn initial_department(&self) -> Option<Department> {
        if self.is_admin {
            None
        } else if self.is_sale {
            Some(Department::Sale)
        } else {
            Some(Department::Marketing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(is_admin: bool, is_sale: bool) -> RoleContext {
        RoleContext {
            is_admin,
            is_sale,
            user_id: None,
            roles: vec![],
        }
    }

    #[test]
    fn admin_starts_without_a_department() {
        assert_eq!(context(true, true).initial_department(), None);
    }

    #[test]
    fn non_admins_land_in_their_department() {
        assert_eq!(
            context(false, true).initial_department(),
            Some(Department::Sale)
        );
        assert_eq!(
            context(false, false).initial_department(),
            Some(Department::Marketing)
        );
    }
}
