use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    #[display("user")]
    User = 0,
    #[display("admin")]
    Admin = 1,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Role for a stored id; `None` for ids this build does not know
    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(UserRole::User),
            1 => Some(UserRole::Admin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}
