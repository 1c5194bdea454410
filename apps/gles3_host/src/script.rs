//! Recorded session scripts replayed by the desktop host.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Capability, PermissionOutcome},
    protocol::SessionEvent,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionScript {
    /// Capabilities already granted when the session starts.
    pub granted: Vec<Capability>,
    /// Capabilities whose prior denial asks for a rationale.
    pub rationale: Vec<Capability>,
    /// How the permission dialog answers a request. Absent entries are denied.
    /// When empty, requests are left unanswered and results must be scripted.
    pub answers: BTreeMap<Capability, PermissionOutcome>,
    pub events: Vec<SessionEvent>,
}

impl SessionScript {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("failed to parse session script")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read session script '{}'", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in '{}'", path.display()))
    }
}
