//! Typed request actors.
//!
//! A request is authorized once at the boundary, producing a typed
//! [`Shopper`] or [`Vendor`] capability that the core operations take by
//! reference. Core code never inspects a role string.

use common::UserId;
use serde::{Deserialize, Serialize};

use crate::error::RoleError;

/// The role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Shopper,
    Vendor,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Shopper => write!(f, "shopper"),
            Role::Vendor => write!(f, "vendor"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // "user" is the legacy name for the shopper role.
            "shopper" | "user" => Ok(Role::Shopper),
            "vendor" => Ok(Role::Vendor),
            other => Err(format!("unknown role: {other:?}")),
        }
    }
}

/// An authenticated caller before capability narrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    id: UserId,
    role: Role,
}

impl Actor {
    /// Creates an actor from an authenticated user id and role.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns the user id.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Narrows the actor to the shopper capability.
    pub fn require_shopper(self) -> Result<Shopper, RoleError> {
        match self.role {
            Role::Shopper => Ok(Shopper(self.id)),
            Role::Vendor => Err(RoleError::Forbidden {
                required: Role::Shopper,
                actual: self.role,
            }),
        }
    }

    /// Narrows the actor to the vendor capability.
    pub fn require_vendor(self) -> Result<Vendor, RoleError> {
        match self.role {
            Role::Vendor => Ok(Vendor(self.id)),
            Role::Shopper => Err(RoleError::Forbidden {
                required: Role::Vendor,
                actual: self.role,
            }),
        }
    }
}

/// Proof that the caller holds the shopper role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shopper(UserId);

impl Shopper {
    /// Returns the shopper's user id.
    pub fn id(&self) -> UserId {
        self.0
    }
}

/// Proof that the caller holds the vendor role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vendor(UserId);

impl Vendor {
    /// Returns the vendor's user id.
    pub fn id(&self) -> UserId {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopper_narrowing() {
        let id = UserId::new();
        let shopper = Actor::new(id, Role::Shopper).require_shopper().unwrap();
        assert_eq!(shopper.id(), id);
    }

    #[test]
    fn test_vendor_cannot_pose_as_shopper() {
        let actor = Actor::new(UserId::new(), Role::Vendor);
        let err = actor.require_shopper().unwrap_err();
        assert!(matches!(
            err,
            RoleError::Forbidden {
                required: Role::Shopper,
                ..
            }
        ));
    }

    #[test]
    fn test_shopper_cannot_pose_as_vendor() {
        let actor = Actor::new(UserId::new(), Role::Shopper);
        assert!(actor.require_vendor().is_err());
    }

    #[test]
    fn test_role_parsing_accepts_legacy_name() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::Shopper);
        assert_eq!("shopper".parse::<Role>().unwrap(), Role::Shopper);
        assert_eq!("vendor".parse::<Role>().unwrap(), Role::Vendor);
        assert!("admin".parse::<Role>().is_err());
    }
}
