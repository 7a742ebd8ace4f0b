use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire form of a workflow status as stored in annotation custom data.
///
/// Review hosts have written statuses in two encodings over time: small
/// integers for the clarification lifecycle and strings for the newer
/// change-notice states. Both forms are accepted on input and preserved on
/// output; comparison is strict on value *and* type, so the string `"1"` is
/// not the number `1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusCode {
    Number(u8),
    Text(String),
}

impl StatusCode {
    pub fn text(s: impl Into<String>) -> Self {
        StatusCode::Text(s.into())
    }

    pub fn to_value(&self) -> Value {
        match self {
            StatusCode::Number(n) => Value::from(*n),
            StatusCode::Text(s) => Value::from(s.as_str()),
        }
    }
}

/// Canonical workflow status, normalized from either wire encoding.
///
/// `Worked` (wire `2`) and `WorkedLegacy` (wire `"worked"`) stay separate
/// variants: the role-2 clarification view renders them differently, so
/// collapsing them would change behavior for stored annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStatus {
    /// Wire `"none"`, the perpetual default for fresh annotations.
    None,
    /// Wire `1`.
    Open,
    /// Wire `2`.
    Worked,
    /// Wire `3`.
    Closed,
    /// Wire `9`.
    Irrelevant,
    /// Wire `"created"`.
    Created,
    /// Wire `"rejected"`.
    Rejected,
    /// Wire `"worked"`.
    WorkedLegacy,
}

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 8] = [
        WorkflowStatus::None,
        WorkflowStatus::Open,
        WorkflowStatus::Worked,
        WorkflowStatus::Closed,
        WorkflowStatus::Irrelevant,
        WorkflowStatus::Created,
        WorkflowStatus::Rejected,
        WorkflowStatus::WorkedLegacy,
    ];

    /// Normalize a wire code into the canonical form. Unknown codes map to
    /// `None` (the option), which downstream projectors treat as "render
    /// nothing" rather than an error.
    pub fn from_code(code: &StatusCode) -> Option<WorkflowStatus> {
        match code {
            StatusCode::Number(1) => Some(WorkflowStatus::Open),
            StatusCode::Number(2) => Some(WorkflowStatus::Worked),
            StatusCode::Number(3) => Some(WorkflowStatus::Closed),
            StatusCode::Number(9) => Some(WorkflowStatus::Irrelevant),
            StatusCode::Number(_) => None,
            StatusCode::Text(s) => match s.as_str() {
                "none" => Some(WorkflowStatus::None),
                "created" => Some(WorkflowStatus::Created),
                "rejected" => Some(WorkflowStatus::Rejected),
                "worked" => Some(WorkflowStatus::WorkedLegacy),
                _ => None,
            },
        }
    }

    /// Strict-typed parse straight from a custom-data value.
    pub fn from_value(value: &Value) -> Option<WorkflowStatus> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .and_then(|n| Self::from_code(&StatusCode::Number(n))),
            Value::String(s) => Self::from_code(&StatusCode::text(s.clone())),
            _ => None,
        }
    }

    /// Round-trip back to the wire encoding the variant came from.
    pub fn to_code(self) -> StatusCode {
        match self {
            WorkflowStatus::None => StatusCode::text("none"),
            WorkflowStatus::Open => StatusCode::Number(1),
            WorkflowStatus::Worked => StatusCode::Number(2),
            WorkflowStatus::Closed => StatusCode::Number(3),
            WorkflowStatus::Irrelevant => StatusCode::Number(9),
            WorkflowStatus::Created => StatusCode::text("created"),
            WorkflowStatus::Rejected => StatusCode::text("rejected"),
            WorkflowStatus::WorkedLegacy => StatusCode::text("worked"),
        }
    }
}

/// The three SWG workflow types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    Clarification,
    Modification,
    Revision,
}

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 3] = [
        WorkflowKind::Clarification,
        WorkflowKind::Modification,
        WorkflowKind::Revision,
    ];

    /// Parse the `SWGtype` custom-data string. `"changeNotification"` is a
    /// legacy alias for `Modification` found on annotations written by older
    /// hosts. Anything unrecognized (including the empty string) is `None`,
    /// which suppresses every workflow widget for the annotation.
    pub fn parse(s: &str) -> Option<WorkflowKind> {
        match s {
            "clarification" => Some(WorkflowKind::Clarification),
            "modification" | "changeNotification" => Some(WorkflowKind::Modification),
            "revision" => Some(WorkflowKind::Revision),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowKind::Clarification => "clarification",
            WorkflowKind::Modification => "modification",
            WorkflowKind::Revision => "revision",
        }
    }

    /// Human-facing name used on the type trigger and popup options.
    pub fn display_name(self) -> &'static str {
        match self {
            WorkflowKind::Clarification => "Clarification",
            WorkflowKind::Modification => "Change notice",
            WorkflowKind::Revision => "Revision",
        }
    }
}
