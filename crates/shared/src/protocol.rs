use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Capability, PermissionOutcome, RequestCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionAction {
    Down,
    Move,
    Up,
    Cancel,
    PointerDown,
    PointerUp,
}

/// One raw pointer sample. `event_time_ms` is platform uptime in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub action: MotionAction,
    pub x: f32,
    pub y: f32,
    pub event_time_ms: u64,
}

impl MotionEvent {
    pub fn new(action: MotionAction, x: f32, y: f32, event_time_ms: u64) -> Self {
        Self {
            action,
            x,
            y,
            event_time_ms,
        }
    }

    pub fn down(x: f32, y: f32, event_time_ms: u64) -> Self {
        Self::new(MotionAction::Down, x, y, event_time_ms)
    }

    pub fn moved(x: f32, y: f32, event_time_ms: u64) -> Self {
        Self::new(MotionAction::Move, x, y, event_time_ms)
    }

    pub fn up(x: f32, y: f32, event_time_ms: u64) -> Self {
        Self::new(MotionAction::Up, x, y, event_time_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequestResult {
    pub request_code: RequestCode,
    pub outcomes: Vec<(Capability, PermissionOutcome)>,
}

impl PermissionRequestResult {
    pub fn new(request_code: RequestCode, outcomes: Vec<(Capability, PermissionOutcome)>) -> Self {
        Self {
            request_code,
            outcomes,
        }
    }

    /// Builds a result from the platform's parallel permission/grant arrays.
    /// Extra entries on either side are dropped.
    pub fn from_parallel(
        request_code: RequestCode,
        permissions: &[String],
        grant_results: &[i32],
    ) -> Self {
        if permissions.len() != grant_results.len() {
            warn!(
                permissions = permissions.len(),
                grant_results = grant_results.len(),
                "permission result arrays differ in length; truncating"
            );
        }
        let outcomes = permissions
            .iter()
            .zip(grant_results)
            .map(|(name, result)| {
                (
                    Capability::new(name.clone()),
                    PermissionOutcome::from_platform(*result),
                )
            })
            .collect();
        Self {
            request_code,
            outcomes,
        }
    }

    pub fn denied(&self) -> Vec<Capability> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_granted())
            .map(|(capability, _)| capability.clone())
            .collect()
    }
}

/// Messages delivered into the controller's single input queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    Create,
    Pause,
    Resume,
    Touch(MotionEvent),
    Tick { now_ms: u64 },
    PermissionResult(PermissionRequestResult),
    Destroy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_arrays_map_zero_to_granted() {
        let result = PermissionRequestResult::from_parallel(
            RequestCode::CAMERA_PERMISSIONS,
            &[
                Capability::CAMERA.to_string(),
                Capability::READ_EXTERNAL_STORAGE.to_string(),
            ],
            &[0, -1],
        );
        assert_eq!(
            result.outcomes,
            vec![
                (Capability::camera(), PermissionOutcome::Granted),
                (Capability::read_storage(), PermissionOutcome::Denied),
            ]
        );
        assert_eq!(result.denied(), vec![Capability::read_storage()]);
    }

    #[test]
    fn parallel_arrays_of_unequal_length_are_truncated() {
        let result = PermissionRequestResult::from_parallel(
            RequestCode(7),
            &[Capability::CAMERA.to_string()],
            &[0, 0, -1],
        );
        assert_eq!(result.outcomes.len(), 1);
        assert!(result.denied().is_empty());
    }

    #[test]
    fn session_events_use_adjacent_tagging() {
        let raw = r#"[
            {"type": "create"},
            {"type": "touch", "payload": {"action": "down", "x": 1.0, "y": 2.0, "event_time_ms": 5}},
            {"type": "tick", "payload": {"now_ms": 400}},
            {"type": "permission_result", "payload": {
                "request_code": 1,
                "outcomes": [["android.permission.CAMERA", "denied"]]
            }}
        ]"#;
        let events: Vec<SessionEvent> = serde_json::from_str(raw).expect("parse events");
        assert_eq!(events[0], SessionEvent::Create);
        assert_eq!(events[1], SessionEvent::Touch(MotionEvent::down(1.0, 2.0, 5)));
        assert_eq!(events[2], SessionEvent::Tick { now_ms: 400 });
        match &events[3] {
            SessionEvent::PermissionResult(result) => {
                assert_eq!(result.request_code, RequestCode::CAMERA_PERMISSIONS);
                assert_eq!(result.denied(), vec![Capability::camera()]);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
