//! Desktop stand-ins for the platform permission dialog and the activity window.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
    rc::Rc,
};

use crossbeam_channel::Sender;
use serde::Serialize;
use shared::{
    domain::{Capability, PermissionOutcome, RequestCode},
    protocol::{PermissionRequestResult, SessionEvent},
};
use shell_core::{ActivityHost, PermissionPlatform};
use tracing::{info, warn};

use crate::script::SessionScript;

pub struct ScriptedPlatform {
    granted: HashSet<Capability>,
    rationale: HashSet<Capability>,
    answers: BTreeMap<Capability, PermissionOutcome>,
    callback_tx: Sender<SessionEvent>,
}

impl ScriptedPlatform {
    pub fn new(script: &SessionScript, callback_tx: Sender<SessionEvent>) -> Self {
        Self {
            granted: script.granted.iter().cloned().collect(),
            rationale: script.rationale.iter().cloned().collect(),
            answers: script.answers.clone(),
            callback_tx,
        }
    }
}

impl PermissionPlatform for ScriptedPlatform {
    fn check_permission(&self, capability: &Capability) -> PermissionOutcome {
        if self.granted.contains(capability) {
            PermissionOutcome::Granted
        } else {
            PermissionOutcome::Denied
        }
    }

    fn should_show_rationale(&self, capability: &Capability) -> bool {
        self.rationale.contains(capability)
    }

    fn request_permissions(&mut self, request_code: RequestCode, capabilities: &[Capability]) {
        if self.answers.is_empty() {
            info!(
                request_code = request_code.0,
                "permission dialog shown; waiting for scripted result"
            );
            return;
        }

        let outcomes: Vec<(Capability, PermissionOutcome)> = capabilities
            .iter()
            .map(|capability| {
                let outcome = self
                    .answers
                    .get(capability)
                    .copied()
                    .unwrap_or(PermissionOutcome::Denied);
                (capability.clone(), outcome)
            })
            .collect();
        for (capability, outcome) in &outcomes {
            if outcome.is_granted() {
                self.granted.insert(capability.clone());
            }
        }

        let result = PermissionRequestResult::new(request_code, outcomes);
        if self
            .callback_tx
            .try_send(SessionEvent::PermissionResult(result))
            .is_err()
        {
            warn!("permission callback queue closed; result lost");
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct HostReport {
    pub notices: Vec<String>,
    pub rationale_requests: usize,
    pub finished: bool,
    pub forwarded_results: usize,
}

/// Logs notices instead of drawing them and records what happened.
pub struct ConsoleHost {
    report: Rc<RefCell<HostReport>>,
}

impl ConsoleHost {
    pub fn new(report: Rc<RefCell<HostReport>>) -> Self {
        Self { report }
    }
}

impl ActivityHost for ConsoleHost {
    fn show_notice(&mut self, text: &str) {
        warn!(notice = text, "toast");
        self.report.borrow_mut().notices.push(text.to_string());
    }

    fn finish(&mut self) {
        info!("activity finishing");
        self.report.borrow_mut().finished = true;
    }

    fn forward_permission_result(&mut self, result: &PermissionRequestResult) {
        info!(
            request_code = result.request_code.0,
            "permission result passed to default handler"
        );
        self.report.borrow_mut().forwarded_results += 1;
    }

    fn show_rationale(&mut self, capabilities: &[Capability]) {
        info!(count = capabilities.len(), "showing permission rationale");
        self.report.borrow_mut().rationale_requests += 1;
    }
}
