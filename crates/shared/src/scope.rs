//! Trusted tenant scope supplied by the authorization layer.

use serde::{Deserialize, Serialize};

use crate::types::{ActorId, CampusId, OrganizationId};

/// The finance scope a caller operates under.
///
/// Supplied by the (out-of-scope) tenant/authorization collaborator and
/// trusted as-is: the engine performs no independent authorization. A campus
/// scope narrows queries to one campus; a unit path narrows them to the
/// subtree rooted at that path (campus paths are prefix-matched against it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceScope {
    /// The organization every query is bounded by.
    pub organization_id: OrganizationId,
    /// Optional single-campus restriction.
    pub campus_id: Option<CampusId>,
    /// Optional unit-subtree restriction (full unit path prefix).
    pub unit_path: Option<String>,
    /// The acting user, for audit attribution on events.
    pub actor_id: Option<ActorId>,
}

impl FinanceScope {
    /// Creates an organization-wide scope.
    #[must_use]
    pub const fn organization(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            campus_id: None,
            unit_path: None,
            actor_id: None,
        }
    }

    /// Narrows the scope to a single campus.
    #[must_use]
    pub const fn for_campus(mut self, campus_id: CampusId) -> Self {
        self.campus_id = Some(campus_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_scope_is_unrestricted() {
        let scope = FinanceScope::organization(OrganizationId::new());
        assert!(scope.campus_id.is_none());
        assert!(scope.unit_path.is_none());
    }

    #[test]
    fn test_for_campus_narrows() {
        let campus = CampusId::new();
        let scope = FinanceScope::organization(OrganizationId::new()).for_campus(campus);
        assert_eq!(scope.campus_id, Some(campus));
    }
}
