//! Permission scopes.
//!
//! Scopes are free-form, colon-namespaced strings such as `filesystem:read`.
//! They are compared for equality only; there is no hierarchy and no
//! wildcard matching.

/// Scopes in `required` that are absent from `granted`, in `required` order.
pub fn missing_permissions(required: &[String], granted: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|scope| !granted.contains(scope))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_nothing_required() {
        assert!(
            missing_permissions(&[], &scopes(&["filesystem:read"]))
                .is_empty()
        );
    }

    #[test]
    fn test_superset_granted() {
        let required = scopes(&["filesystem:read"]);
        let granted = scopes(&["net:fetch", "filesystem:read"]);
        assert!(missing_permissions(&required, &granted).is_empty());
    }

    #[test]
    fn test_missing_reported_in_order() {
        let required = scopes(&["filesystem:read", "filesystem:write", "net:fetch"]);
        let granted = scopes(&["filesystem:write"]);
        assert_eq!(
            missing_permissions(&required, &granted),
            scopes(&["filesystem:read", "net:fetch"])
        );
    }

    #[test]
    fn test_no_wildcards_or_hierarchy() {
        let required = scopes(&["filesystem:read"]);
        assert_eq!(
            missing_permissions(&required, &scopes(&["filesystem:*", "filesystem"])),
            required
        );
    }
}
