use serde::{Deserialize, Serialize};

use super::AppError;

/// Caller role, resolved outside the core and passed in explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Studio owner: unrestricted
    Admin,
    /// Reception staff: manages students, charges and payments but cannot see
    /// revenue or delete records
    FrontDesk,
}

/// Operations that are restricted to some roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewFinancials,
    ExportCash,
    DeleteStudent,
    DeleteCharge,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::FrontDesk => "front-desk",
        }
    }

    /// Whether this role may perform `action`. Every pair is listed so a new
    /// action has to be placed explicitly.
    pub fn can(&self, action: Action) -> bool {
        match (self, action) {
            (Role::Admin, _) => true,
            (Role::FrontDesk, Action::ViewFinancials) => false,
            (Role::FrontDesk, Action::ExportCash) => false,
            (Role::FrontDesk, Action::DeleteStudent) => false,
            (Role::FrontDesk, Action::DeleteCharge) => false,
        }
    }

    pub fn require(&self, action: Action) -> Result<(), AppError> {
        if self.can(action) {
            Ok(())
        } else {
            tracing::warn!(role = self.as_str(), action = %action, "permission denied");
            Err(AppError::PermissionDenied {
                role: *self,
                action,
            })
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "front-desk" | "frontdesk" | "front_desk" | "reception" => Ok(Role::FrontDesk),
            other => Err(format!(
                "unknown role '{}' (expected admin or front-desk)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Action::ViewFinancials => "view financial reports",
            Action::ExportCash => "export cash records",
            Action::DeleteStudent => "delete students",
            Action::DeleteCharge => "delete charges",
        };
        write!(f, "{}", text)
    }
}
