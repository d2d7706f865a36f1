//! Capability names
//!
//! Staff accounts hold a subset of these; admins implicitly hold all of them.

pub const BRANCHES: &str = "branches";
pub const STUDENTS: &str = "students";
pub const COLLECTIONS: &str = "collections";

/// Grants every capability
pub const ALL: &str = "all";

/// Capabilities that can be granted to a staff account
pub const ALL_PERMISSIONS: &[&str] = &[BRANCHES, STUDENTS, COLLECTIONS];

/// Validate if a permission string is known
pub fn is_valid_permission(permission: &str) -> bool {
    ALL_PERMISSIONS.contains(&permission) || permission == ALL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_permissions() {
        assert!(is_valid_permission("students"));
        assert!(is_valid_permission("all"));
        assert!(!is_valid_permission("students:*"));
        assert!(!is_valid_permission("users"));
    }
}
