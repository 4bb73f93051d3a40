//! Authenticated-request claims and the account role vocabulary.
//!
//! The binary validates bearer tokens and injects [`Claims`] into request
//! extensions; business modules read them for allow-list checks and
//! role-based visibility filtering. Neither side depends on how tokens are
//! minted.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Account role. Every API route group is gated by an allow-list of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    LabTechnician,
    Patient,
    Pharmacist,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::LabTechnician => "lab_technician",
            Self::Patient => "patient",
            Self::Pharmacist => "pharmacist",
            Self::Staff => "staff",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "doctor" => Some(Self::Doctor),
            "lab_technician" => Some(Self::LabTechnician),
            "patient" => Some(Self::Patient),
            "pharmacist" => Some(Self::Pharmacist),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims payload carried on every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: account id. For patient accounts this is the patient
    /// record id; for doctor accounts the doctor record id.
    pub sub: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: Role,
    /// Session id.
    pub sid: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Check the caller's role against an allow-list.
    ///
    /// Admin passes every check.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ServiceError> {
        if self.role == Role::Admin || allowed.contains(&self.role) {
            return Ok(());
        }
        Err(ServiceError::PermissionDenied(format!(
            "role {} is not allowed here",
            self.role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: "u1".into(),
            name: "Test".into(),
            role,
            sid: "s1".into(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn role_string_roundtrip() {
        for role in [
            Role::Admin,
            Role::Doctor,
            Role::LabTechnician,
            Role::Patient,
            Role::Pharmacist,
            Role::Staff,
        ] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
            let json = serde_json::to_string(&role).unwrap();
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(role, back);
        }
        assert_eq!(Role::from_str("superuser"), None);
    }

    #[test]
    fn role_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::LabTechnician).unwrap(),
            "\"lab_technician\""
        );
    }

    #[test]
    fn require_allows_listed_role() {
        assert!(claims(Role::Doctor).require(&[Role::Doctor, Role::Staff]).is_ok());
    }

    #[test]
    fn require_rejects_unlisted_role() {
        let err = claims(Role::Patient).require(&[Role::Doctor]).unwrap_err();
        assert_eq!(err.error_code(), "PERMISSION_DENIED");
    }

    #[test]
    fn admin_bypasses_all_checks() {
        assert!(claims(Role::Admin).require(&[]).is_ok());
        assert!(claims(Role::Admin).require(&[Role::Patient]).is_ok());
    }
}
