// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Permission Evaluator (C3) — §4.3. Pure functions, no I/O: owner/admin/role
//! checks over an in-memory [`Principal`] and a resource's owner/required-role
//! fields. Neither `evaluate` nor `filter` ever caches a decision.

use std::collections::BTreeSet;

/// The distinguished role value granting universal read/write.
pub const ADMIN_ROLE: &str = "mcp.admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// An authenticated caller: user id plus role values (§10 Identity
/// Forwarding reconstructs this from headers when there is no local
/// identity-provider handshake).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, roles: impl IntoIterator<Item = String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: roles.into_iter().map(|r| r.trim().to_lowercase()).collect(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(ADMIN_ROLE)
    }

    fn holds_any(&self, required: &BTreeSet<String>) -> bool {
        required.iter().any(|r| self.roles.contains(r))
    }
}

/// Anything the evaluator needs to know about a resource: who owns it and
/// which roles grant non-owner read access.
pub trait Owned {
    fn created_by(&self) -> &str;
    fn required_roles(&self) -> &BTreeSet<String>;
}

/// Rules evaluated in order, first match wins (§4.3):
/// 1. owner always allowed,
/// 2. admin always allowed,
/// 3. Read with an empty `requiredRoles` is allowed to anyone,
/// 4. Read with a non-empty `requiredRoles` is allowed iff roles intersect,
/// 5. Write otherwise denied.
pub fn evaluate<R: Owned>(principal: &Principal, resource: &R, op: Operation) -> bool {
    if principal.user_id == resource.created_by() {
        return true;
    }
    if principal.is_admin() {
        return true;
    }
    match op {
        Operation::Read => {
            resource.required_roles().is_empty() || principal.holds_any(resource.required_roles())
        }
        Operation::Write => false,
    }
}

/// Collection form: same rule per element, preserving input order, dropping
/// elements that fail.
pub fn filter<R: Owned>(resources: Vec<R>, principal: &Principal, op: Operation) -> Vec<R> {
    resources
        .into_iter()
        .filter(|r| evaluate(principal, r, op))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Resource {
        created_by: String,
        required_roles: BTreeSet<String>,
    }

    impl Owned for Resource {
        fn created_by(&self) -> &str {
            &self.created_by
        }
        fn required_roles(&self) -> &BTreeSet<String> {
            &self.required_roles
        }
    }

    fn resource(owner: &str, roles: &[&str]) -> Resource {
        Resource {
            created_by: owner.to_string(),
            required_roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn owner_can_read_and_write() {
        let p = Principal::new("u1", []);
        let r = resource("u1", &["reader"]);
        assert!(evaluate(&p, &r, Operation::Read));
        assert!(evaluate(&p, &r, Operation::Write));
    }

    #[test]
    fn admin_can_read_and_write_anything() {
        let p = Principal::new("u2", ["MCP.Admin".to_string()]);
        let r = resource("u1", &["reader"]);
        assert!(evaluate(&p, &r, Operation::Read));
        assert!(evaluate(&p, &r, Operation::Write));
    }

    #[test]
    fn non_owner_never_writes() {
        let p = Principal::new("u2", ["reader".to_string()]);
        let r = resource("u1", &["reader"]);
        assert!(!evaluate(&p, &r, Operation::Write));
    }

    #[test]
    fn empty_required_roles_allows_any_reader() {
        let p = Principal::new("u2", []);
        let r = resource("u1", &[]);
        assert!(evaluate(&p, &r, Operation::Read));
    }

    #[test]
    fn role_holder_can_read_role_gated_resource() {
        let p = Principal::new("u2", ["reader".to_string()]);
        let r = resource("u1", &["reader"]);
        assert!(evaluate(&p, &r, Operation::Read));

        let p_guest = Principal::new("u2", ["guest".to_string()]);
        assert!(!evaluate(&p_guest, &r, Operation::Read));
    }

    #[test]
    fn filter_preserves_order_and_drops_forbidden() {
        let p = Principal::new("u2", ["reader".to_string()]);
        let resources = vec![
            resource("u1", &[]),
            resource("u1", &["admin-only"]),
            resource("u2", &["anything"]),
        ];
        let visible = filter(resources, &p, Operation::Read);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].created_by, "u1");
        assert_eq!(visible[1].created_by, "u2");
    }
}
