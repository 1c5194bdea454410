use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! code_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i32);
    };
}

code_newtype!(RequestCode);

impl RequestCode {
    pub const CAMERA_PERMISSIONS: RequestCode = RequestCode(1);
}

/// A single named permission the platform may grant or deny.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    pub const CAMERA: &'static str = "android.permission.CAMERA";
    pub const READ_EXTERNAL_STORAGE: &'static str = "android.permission.READ_EXTERNAL_STORAGE";
    pub const WRITE_EXTERNAL_STORAGE: &'static str = "android.permission.WRITE_EXTERNAL_STORAGE";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn camera() -> Self {
        Self::new(Self::CAMERA)
    }

    pub fn read_storage() -> Self {
        Self::new(Self::READ_EXTERNAL_STORAGE)
    }

    pub fn write_storage() -> Self {
        Self::new(Self::WRITE_EXTERNAL_STORAGE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOutcome {
    Granted,
    Denied,
}

impl PermissionOutcome {
    /// Platform constant reported for a granted permission.
    pub const PLATFORM_GRANTED: i32 = 0;

    pub fn from_platform(grant_result: i32) -> Self {
        if grant_result == Self::PLATFORM_GRANTED {
            Self::Granted
        } else {
            Self::Denied
        }
    }

    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    AwaitingPermission,
    Terminated,
}

impl SessionState {
    pub fn is_terminated(self) -> bool {
        self == Self::Terminated
    }
}
