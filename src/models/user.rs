use serde::{Deserialize, Serialize};

use super::Record;
use crate::list::criteria::{Filter, contains_ci};

/// Roles allowed to use the back office.
pub const ADMIN_ROLES: &[&str] = &["admin", "super_admin"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        ADMIN_ROLES.contains(&self.role.as_str())
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == "super_admin"
    }

    /// Only a super admin may toggle another admin's status.
    pub fn can_toggle(&self, target: &User) -> bool {
        self.is_super_admin() && target.role == "admin"
    }
}

impl Record for User {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn label(&self) -> &str {
        if self.full_name.is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

/// Search over name and email, exact role, and active/inactive status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub search: String,
    pub role: Option<String>,
    pub active: Option<bool>,
}

impl Filter<User> for UserFilter {
    fn matches(&self, item: &User) -> bool {
        (contains_ci(&item.full_name, &self.search) || contains_ci(&item.email, &self.search))
            && self.role.as_deref().is_none_or(|role| item.role == role)
            && self.active.is_none_or(|active| item.is_active == active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str, role: &str, active: bool) -> User {
        User {
            id: Some(email.to_string()),
            email: email.to_string(),
            full_name: name.to_string(),
            role: role.to_string(),
            is_active: active,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_user_deserialize() {
        let json = r#"{"id": "u1", "email": "admin@kasi.market", "fullName": "Admin Principal", "role": "super_admin", "isActive": true}"#;
        let u: User = serde_json::from_str(json).unwrap();
        assert!(u.is_admin());
        assert!(u.is_super_admin());
        assert_eq!(u.label(), "Admin Principal");
    }

    #[test]
    fn test_label_falls_back_to_email() {
        let u = user("", "nobody@kasi.market", "user", true);
        assert_eq!(u.label(), "nobody@kasi.market");
        assert!(!u.is_admin());
    }

    #[test]
    fn test_can_toggle_only_admins_as_super_admin() {
        let boss = user("Boss", "boss@k", "super_admin", true);
        let admin = user("Ad", "ad@k", "admin", true);
        let customer = user("Cu", "cu@k", "user", true);
        assert!(boss.can_toggle(&admin));
        assert!(!boss.can_toggle(&customer));
        assert!(!admin.can_toggle(&admin));
    }

    #[test]
    fn test_filter_role_and_status() {
        let active_admin = user("Aminata", "ami@k", "admin", true);
        let inactive_admin = user("Bakary", "bak@k", "admin", false);
        let filter = UserFilter {
            search: String::new(),
            role: Some("admin".into()),
            active: Some(true),
        };
        assert!(filter.matches(&active_admin));
        assert!(!filter.matches(&inactive_admin));
    }

    #[test]
    fn test_filter_search_name_or_email() {
        let u = user("Aminata Diallo", "ami@kasi.market", "admin", true);
        let by_name = UserFilter {
            search: "diallo".into(),
            ..Default::default()
        };
        let by_email = UserFilter {
            search: "ami@".into(),
            ..Default::default()
        };
        assert!(by_name.matches(&u));
        assert!(by_email.matches(&u));
    }
}
