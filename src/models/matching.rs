use serde::Serialize;
use uuid::Uuid;

/// Where a supplier invoice belongs. At most one target id exists by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget {
    Project(Uuid),
    Packing(Uuid),
    LargeProject(Uuid),
    Unmatched,
}

impl MatchTarget {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            MatchTarget::Project(id) | MatchTarget::Packing(id) | MatchTarget::LargeProject(id) => {
                Some(*id)
            }
            MatchTarget::Unmatched => None,
        }
    }

    /// Invoice table a match is persisted into. Large projects share the
    /// packing invoice table.
    pub fn table_name(&self) -> Option<&'static str> {
        match self {
            MatchTarget::Project(_) => Some("project_invoices"),
            MatchTarget::Packing(_) | MatchTarget::LargeProject(_) => Some("packing_invoices"),
            MatchTarget::Unmatched => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, MatchTarget::Unmatched)
    }
}

/// Which strategy produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    BookingAssignedProject,
    BookingLinkedProject,
    ProjectName,
    PackingName,
    LargeProjectName,
    None,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::BookingAssignedProject => "booking_assigned_project",
            MatchType::BookingLinkedProject => "booking_linked_project",
            MatchType::ProjectName => "project_name",
            MatchType::PackingName => "packing_name",
            MatchType::LargeProjectName => "large_project_name",
            MatchType::None => "none",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategies the matcher can try, in the order it tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    BookingReference,
    ProjectName,
    PackingName,
    LargeProjectName,
}

/// Result of running the strategy chain over one payload.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub target: MatchTarget,
    /// Organization of the matched entity. `None` when unmatched.
    pub organization_id: Option<Uuid>,
    pub match_type: MatchType,
    /// Human-readable decision trace.
    pub match_detail: String,
    /// Strategies attempted, in order.
    pub attempts: Vec<MatchStrategy>,
}

impl MatchOutcome {
    pub fn unmatched(match_detail: String, attempts: Vec<MatchStrategy>) -> Self {
        Self {
            target: MatchTarget::Unmatched,
            organization_id: None,
            match_type: MatchType::None,
            match_detail,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_tables() {
        let id = Uuid::new_v4();
        assert_eq!(MatchTarget::Project(id).table_name(), Some("project_invoices"));
        assert_eq!(MatchTarget::Packing(id).table_name(), Some("packing_invoices"));
        assert_eq!(MatchTarget::LargeProject(id).table_name(), Some("packing_invoices"));
        assert_eq!(MatchTarget::Unmatched.table_name(), None);
        assert_eq!(MatchTarget::LargeProject(id).id(), Some(id));
        assert!(!MatchTarget::Unmatched.is_matched());
    }

    #[test]
    fn test_match_type_wire_names() {
        assert_eq!(
            serde_json::to_value(MatchType::BookingAssignedProject).unwrap(),
            "booking_assigned_project"
        );
        assert_eq!(MatchType::LargeProjectName.to_string(), "large_project_name");
        assert_eq!(serde_json::to_value(MatchType::None).unwrap(), "none");
    }
}
