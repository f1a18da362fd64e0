use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Application role. Stored in `user_roles.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    Projekt,
    Lager,
}

impl AppRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Admin => "admin",
            AppRole::Projekt => "projekt",
            AppRole::Lager => "lager",
        }
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(AppRole::Admin),
            "projekt" => Ok(AppRole::Projekt),
            "lager" => Ok(AppRole::Lager),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Legacy hint for which part of the application the user is heading to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetView {
    Planning,
    Warehouse,
}

impl FromStr for TargetView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planning" => Ok(TargetView::Planning),
            "warehouse" => Ok(TargetView::Warehouse),
            other => Err(format!("unknown target view '{other}'")),
        }
    }
}

/// Role set to apply after a verified SSO handshake.
///
/// A non-empty role list from the hub is authoritative and is filtered to
/// known roles. Without one, the target view decides: `warehouse` maps to
/// `lager`, `planning` to `projekt`, and no hint grants both.
pub fn resolve_roles(explicit: Option<&[String]>, target_view: Option<TargetView>) -> Vec<AppRole> {
    if let Some(roles) = explicit.filter(|r| !r.is_empty()) {
        let resolved: BTreeSet<AppRole> = roles
            .iter()
            .filter_map(|role| match role.parse::<AppRole>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping unknown role from hub payload");
                    None
                }
            })
            .collect();
        return resolved.into_iter().collect();
    }

    match target_view {
        Some(TargetView::Warehouse) => vec![AppRole::Lager],
        Some(TargetView::Planning) => vec![AppRole::Projekt],
        None => vec![AppRole::Projekt, AppRole::Lager],
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(Some(vec!["projekt"]), None, vec![AppRole::Projekt])]
    #[case(Some(vec!["lager", "ADMIN", "lager"]), Some(TargetView::Planning), vec![AppRole::Admin, AppRole::Lager])]
    #[case(Some(vec!["superuser", "projekt"]), None, vec![AppRole::Projekt])]
    #[case(Some(vec!["superuser"]), Some(TargetView::Warehouse), vec![])]
    #[case(Some(vec![]), Some(TargetView::Warehouse), vec![AppRole::Lager])]
    #[case(None, Some(TargetView::Planning), vec![AppRole::Projekt])]
    #[case(None, None, vec![AppRole::Projekt, AppRole::Lager])]
    fn test_resolve_roles(
        #[case] explicit: Option<Vec<&str>>,
        #[case] view: Option<TargetView>,
        #[case] expected: Vec<AppRole>,
    ) {
        let explicit = explicit.map(|v| strings(&v));
        assert_eq!(resolve_roles(explicit.as_deref(), view), expected);
    }

    #[test]
    fn test_role_round_trip_names() {
        for role in [AppRole::Admin, AppRole::Projekt, AppRole::Lager] {
            assert_eq!(role.as_str().parse::<AppRole>().unwrap(), role);
        }
        assert!("owner".parse::<AppRole>().is_err());
    }

    #[test]
    fn test_target_view_parse() {
        assert_eq!("Warehouse".parse::<TargetView>().unwrap(), TargetView::Warehouse);
        assert!("dashboard".parse::<TargetView>().is_err());
    }
}
