use crate::errors::AppError;

/// Role carried by the token's `role` claim. The claim is free-form on the
/// wire; it is decoded into this closed set exactly once at the
/// authentication boundary. Unknown or absent roles map to `Unassigned`,
/// which satisfies no capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Staff,
    Admin,
    Unassigned,
}

impl Role {
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim {
            Some("STUDENT") => Role::Student,
            Some("STAFF") => Role::Staff,
            Some("ADMIN") => Role::Admin,
            _ => Role::Unassigned,
        }
    }
}

/// Permission level required by an endpoint, least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Student,
    Staff,
    Admin,
}

impl Capability {
    /// Whether `role` satisfies this capability. Higher roles subsume lower
    /// ones; there is no implicit elevation the other way.
    pub fn allows(self, role: Role) -> bool {
        match self {
            Capability::Student => matches!(role, Role::Student | Role::Staff | Role::Admin),
            Capability::Staff => matches!(role, Role::Staff | Role::Admin),
            Capability::Admin => matches!(role, Role::Admin),
        }
    }
}

/// The authenticated identity for the duration of one request. Derived from
/// a verified token, never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i64,
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn is_staff(&self) -> bool {
        Capability::Staff.allows(self.role)
    }
}

/// Explicit gate invoked at the start of each handler: no principal is an
/// authentication failure (401), a principal without the required role is a
/// permission failure (403).
pub fn require(
    principal: Option<&Principal>,
    capability: Capability,
) -> Result<&Principal, AppError> {
    let principal =
        principal.ok_or_else(|| AppError::unauthorized("authentication required"))?;

    if capability.allows(principal.role) {
        Ok(principal)
    } else {
        Err(AppError::permission_denied(
            "role does not satisfy the required capability",
        ))
    }
}
