//! Project roles and actor capabilities.
//!
//! Role/ownership enforcement is primarily the storage layer's job;
//! the API layer resolves a member's role per project and derives an
//! explicit capability set from it. Guard bypasses are capability
//! flags, never inline role string comparisons.

use serde::{Deserialize, Serialize};

/// A user's role within one project.
///
/// Roles are ordered from lowest to highest privilege.
/// Higher roles can perform all actions of lower roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    /// Can only view project data.
    Viewer = 0,
    /// Can ingest and edit draft invoices, and resubmit rejected ones.
    Submitter = 1,
    /// Can allocate amounts against budget lines and approve drafts.
    LineProducer = 2,
    /// Can finalize or reject approved invoices; may fast-path the review queue.
    Producer = 3,
}

impl ProjectRole {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "submitter" => Some(Self::Submitter),
            "line_producer" => Some(Self::LineProducer),
            "producer" => Some(Self::Producer),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Submitter => "submitter",
            Self::LineProducer => "line_producer",
            Self::Producer => "producer",
        }
    }

    /// Whether the role may ingest documents and edit draft invoices.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        *self >= Self::Submitter
    }

    /// Whether the role may create/remove allocations and approve drafts.
    #[must_use]
    pub fn can_allocate(&self) -> bool {
        *self >= Self::LineProducer
    }

    /// Whether the role may finalize or reject approved invoices.
    #[must_use]
    pub fn can_review(&self) -> bool {
        *self >= Self::Producer
    }

    /// Derives the capability set carried into lifecycle transitions.
    #[must_use]
    pub const fn capabilities(&self) -> ActorCapabilities {
        ActorCapabilities {
            skip_balance_check: matches!(self, Self::Producer),
        }
    }
}

/// Explicit capability flags carried into lifecycle guards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorCapabilities {
    /// Approve a draft without re-checking allocation balance.
    ///
    /// Producers working the review queue act on invoices whose prior
    /// approved state already implied a balance check; the fast path is
    /// intentional, not an oversight.
    pub skip_balance_check: bool,
}

impl ActorCapabilities {
    /// Capability set with every flag cleared.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            skip_balance_check: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(ProjectRole::parse("viewer"), Some(ProjectRole::Viewer));
        assert_eq!(
            ProjectRole::parse("SUBMITTER"),
            Some(ProjectRole::Submitter)
        );
        assert_eq!(
            ProjectRole::parse("line_producer"),
            Some(ProjectRole::LineProducer)
        );
        assert_eq!(ProjectRole::parse("Producer"), Some(ProjectRole::Producer));
        assert_eq!(ProjectRole::parse("accountant"), None);
    }

    #[test]
    fn test_role_ordering() {
        assert!(ProjectRole::Viewer < ProjectRole::Submitter);
        assert!(ProjectRole::Submitter < ProjectRole::LineProducer);
        assert!(ProjectRole::LineProducer < ProjectRole::Producer);
    }

    #[test]
    fn test_role_permissions() {
        assert!(!ProjectRole::Viewer.can_submit());
        assert!(ProjectRole::Submitter.can_submit());
        assert!(!ProjectRole::Submitter.can_allocate());
        assert!(ProjectRole::LineProducer.can_allocate());
        assert!(!ProjectRole::LineProducer.can_review());
        assert!(ProjectRole::Producer.can_review());
    }

    #[test]
    fn test_only_producer_skips_balance_check() {
        assert!(ProjectRole::Producer.capabilities().skip_balance_check);
        assert!(!ProjectRole::LineProducer.capabilities().skip_balance_check);
        assert!(!ProjectRole::Submitter.capabilities().skip_balance_check);
        assert_eq!(
            ActorCapabilities::none(),
            ProjectRole::Viewer.capabilities()
        );
    }
}
