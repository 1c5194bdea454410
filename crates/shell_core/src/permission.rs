//! Tracks the capabilities the view needs and classifies request results.

use std::collections::HashSet;

use shared::{
    domain::{Capability, PermissionOutcome, RequestCode},
    error::ShellError,
    protocol::PermissionRequestResult,
};
use tracing::{debug, info, warn};

/// Platform permission subsystem.
pub trait PermissionPlatform {
    fn check_permission(&self, capability: &Capability) -> PermissionOutcome;
    fn should_show_rationale(&self, capability: &Capability) -> bool;
    /// Starts an asynchronous request round. The result is delivered later as
    /// a `SessionEvent::PermissionResult` carrying `request_code`.
    fn request_permissions(&mut self, request_code: RequestCode, capabilities: &[Capability]);
}

/// Ordered, non-empty, duplicate-free set of required capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSet {
    capabilities: Vec<Capability>,
}

impl PermissionSet {
    pub fn new(capabilities: Vec<Capability>) -> Result<Self, ShellError> {
        if capabilities.is_empty() {
            return Err(ShellError::InvalidPermissionSet(
                "at least one capability is required".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(capabilities.len());
        for capability in &capabilities {
            if !seen.insert(capability) {
                return Err(ShellError::InvalidPermissionSet(format!(
                    "duplicate capability {capability}"
                )));
            }
        }
        Ok(Self { capabilities })
    }

    /// Camera plus external storage read/write.
    pub fn camera_default() -> Self {
        Self {
            capabilities: vec![
                Capability::camera(),
                Capability::read_storage(),
                Capability::write_storage(),
            ],
        }
    }

    pub fn as_slice(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    /// The session must end after one notice.
    Abort { denied: Vec<Capability> },
    /// Not this gate's request; hand it to the fallback handler.
    Ignore,
}

impl Decision {
    pub fn into_result(self, request_code: RequestCode) -> Result<(), ShellError> {
        match self {
            Decision::Proceed => Ok(()),
            Decision::Abort { denied } => Err(ShellError::PermissionDenied { denied }),
            Decision::Ignore => Err(ShellError::UnrecognizedRequest { request_code }),
        }
    }
}

pub struct PermissionGate {
    required: PermissionSet,
    request_code: RequestCode,
    outstanding: bool,
}

impl PermissionGate {
    pub fn new(required: PermissionSet, request_code: RequestCode) -> Self {
        Self {
            required,
            request_code,
            outstanding: false,
        }
    }

    pub fn required(&self) -> &PermissionSet {
        &self.required
    }

    pub fn request_code(&self) -> RequestCode {
        self.request_code
    }

    pub fn has_outstanding_request(&self) -> bool {
        self.outstanding
    }

    pub fn all_granted(&self, platform: &dyn PermissionPlatform) -> bool {
        self.required
            .as_slice()
            .iter()
            .all(|capability| platform.check_permission(capability).is_granted())
    }

    pub fn should_explain_rationale(&self, platform: &dyn PermissionPlatform) -> bool {
        self.required
            .as_slice()
            .iter()
            .any(|capability| platform.should_show_rationale(capability))
    }

    /// Requests every required capability not currently granted and returns
    /// them. Nothing is requested when everything is already granted.
    pub fn request_missing(&mut self, platform: &mut dyn PermissionPlatform) -> Vec<Capability> {
        let missing: Vec<Capability> = self
            .required
            .as_slice()
            .iter()
            .filter(|capability| !platform.check_permission(capability).is_granted())
            .cloned()
            .collect();
        if missing.is_empty() {
            debug!("all required permissions already granted");
            return missing;
        }

        info!(
            request_code = self.request_code.0,
            count = missing.len(),
            "requesting missing permissions"
        );
        platform.request_permissions(self.request_code, &missing);
        self.outstanding = true;
        missing
    }

    pub fn handle_request_result(&mut self, result: &PermissionRequestResult) -> Decision {
        if result.request_code != self.request_code {
            debug!(
                request_code = result.request_code.0,
                expected = self.request_code.0,
                "permission result belongs to another request"
            );
            return Decision::Ignore;
        }
        self.outstanding = false;

        if result.outcomes.is_empty() {
            warn!(
                request_code = result.request_code.0,
                "permission request returned no outcomes; treating as interrupted"
            );
            return Decision::Proceed;
        }

        let denied = result.denied();
        if denied.is_empty() {
            Decision::Proceed
        } else {
            warn!(denied = denied.len(), "required permission denied");
            Decision::Abort { denied }
        }
    }
}

#[cfg(test)]
#[path = "tests/permission_tests.rs"]
mod tests;
