//! Profile models for athletes and physiotherapists.

use serde::{Deserialize, Serialize};

/// Account role, carried in the session token and used for route guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Athlete,
    Physio,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Athlete => "athlete",
            Role::Physio => "physio",
        }
    }
}

/// Athlete profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteProfile {
    /// Identity provider uid (also used as document ID)
    pub uid: String,
    /// Display name
    pub name: String,
    /// Email address used for sign-in
    pub email: String,
    /// Age in years
    pub age: u32,
    /// Primary sport (e.g. "Football")
    pub sport: String,
    /// When the account was registered
    pub created_at: String,
}

/// Physiotherapist profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysioProfile {
    /// Identity provider uid (also used as document ID)
    pub uid: String,
    /// Display name
    pub name: String,
    /// Email address used for sign-in
    pub email: String,
    /// Clinical specialization (e.g. "Sports Injury")
    pub specialization: String,
    /// Professional license number
    pub license_number: String,
    /// When the account was registered
    pub created_at: String,
}
