use super::status::{WorkflowKind, WorkflowStatus};

/// Short opaque string identifying a requested workflow transition. Passed
/// verbatim to the host's transition handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionToken {
    ClarifyWork,
    ClarifyReject,
    ClarifyToRevision,
    ClarifyShow,
    ClarifyCreate,
    ModifyCreate,
    ModifyShow,
    RevisionCreate,
}

impl ActionToken {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionToken::ClarifyWork => "clarify-work",
            ActionToken::ClarifyReject => "clarify-reject",
            ActionToken::ClarifyToRevision => "clarify-to-revision",
            ActionToken::ClarifyShow => "clarify-show",
            ActionToken::ClarifyCreate => "clarify-create",
            ActionToken::ModifyCreate => "modify-create",
            ActionToken::ModifyShow => "modify-show",
            ActionToken::RevisionCreate => "revision-create",
        }
    }
}

/// New (status, kind) pair an action applies when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub status: WorkflowStatus,
    pub kind: WorkflowKind,
}

/// Visual variant of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStyle {
    Agree,
    Disagree,
    ChangeType,
    Clarification,
    Modification,
}

/// One renderable workflow action: a label, an optional hover title, an
/// optional status transition and an optional token for the host handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub label: String,
    pub title: Option<&'static str>,
    pub token: Option<ActionToken>,
    pub transition: Option<StatusTransition>,
    pub style: ActionStyle,
}

/// Ordered action list projected for one (role, kind, status) tuple.
///
/// `break_after` marks a visual group break following the action at that
/// index. `placeholder` covers the one tuple that renders an explicitly
/// present but contentless container; it is a no-op render, distinct from
/// not rendering at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionSet {
    pub actions: Vec<ActionDescriptor>,
    pub break_after: Option<usize>,
    pub placeholder: bool,
}

impl ActionSet {
    pub fn empty() -> Self {
        ActionSet::default()
    }

    pub fn placeholder() -> Self {
        ActionSet {
            placeholder: true,
            ..ActionSet::default()
        }
    }

    /// Whether the set occupies space on screen at all.
    pub fn renders(&self) -> bool {
        self.placeholder || !self.actions.is_empty()
    }
}

/// The dual outbound contract: a status-transition handler and an action
/// handler, both independently optional. Absent handlers are no-ops.
#[derive(Default)]
pub struct WorkflowCallbacks<'a> {
    pub on_status_change: Option<&'a mut dyn FnMut(WorkflowStatus, WorkflowKind)>,
    pub on_action: Option<&'a mut dyn FnMut(&str, ActionToken)>,
}

impl WorkflowCallbacks<'_> {
    pub fn none() -> Self {
        WorkflowCallbacks::default()
    }
}

/// Fire the callbacks for an activated action: the status transition first,
/// then the action token, matching the order the buttons wire them in.
pub fn dispatch(action: &ActionDescriptor, annotation_id: &str, callbacks: &mut WorkflowCallbacks) {
    if let Some(transition) = action.transition {
        if let Some(on_status_change) = callbacks.on_status_change.as_mut() {
            on_status_change(transition.status, transition.kind);
        }
    }
    if let Some(token) = action.token {
        if let Some(on_action) = callbacks.on_action.as_mut() {
            on_action(annotation_id, token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agree_action() -> ActionDescriptor {
        ActionDescriptor {
            label: "Agree".to_string(),
            title: None,
            token: Some(ActionToken::ClarifyWork),
            transition: Some(StatusTransition {
                status: WorkflowStatus::Worked,
                kind: WorkflowKind::Clarification,
            }),
            style: ActionStyle::Agree,
        }
    }

    #[test]
    fn dispatch_fires_status_then_token() {
        let trace: std::cell::RefCell<Vec<String>> = std::cell::RefCell::new(Vec::new());
        {
            let mut on_status = |status: WorkflowStatus, kind: WorkflowKind| {
                trace.borrow_mut().push(format!("status:{status:?}/{kind:?}"));
            };
            let mut on_action = |id: &str, token: ActionToken| {
                trace
                    .borrow_mut()
                    .push(format!("action:{id}/{}", token.as_str()));
            };
            let mut callbacks = WorkflowCallbacks {
                on_status_change: Some(&mut on_status),
                on_action: Some(&mut on_action),
            };
            dispatch(&agree_action(), "ann-7", &mut callbacks);
        }
        assert_eq!(
            trace.into_inner(),
            vec![
                "status:Worked/Clarification".to_string(),
                "action:ann-7/clarify-work".to_string(),
            ]
        );
    }

    #[test]
    fn dispatch_without_callbacks_is_a_noop() {
        dispatch(&agree_action(), "ann-7", &mut WorkflowCallbacks::none());
    }

    #[test]
    fn dispatch_skips_absent_parts() {
        let mut statuses = 0usize;
        let mut tokens = 0usize;
        let action = ActionDescriptor {
            token: None,
            ..agree_action()
        };
        {
            let mut on_status = |_: WorkflowStatus, _: WorkflowKind| statuses += 1;
            let mut on_action = |_: &str, _: ActionToken| tokens += 1;
            let mut callbacks = WorkflowCallbacks {
                on_status_change: Some(&mut on_status),
                on_action: Some(&mut on_action),
            };
            dispatch(&action, "ann-1", &mut callbacks);
        }
        assert_eq!((statuses, tokens), (1, 0));
    }
}
