use notokrat::overlay::{Bounds, OverlayPosition, RightEdge, Size, overlay_position};
use notokrat::workflow::{
    ActionToken, StatusIcon, TypeSelector, UserRole, WorkflowCallbacks, WorkflowKind,
    WorkflowStatus, dispatch, project, status_icon,
};

#[test]
fn unenumerated_tuples_project_empty() {
    // rejected clarifications for role 2, created revisions everywhere,
    // legacy "worked" change notices: all silently empty
    let cases = [
        (UserRole::Role2, WorkflowKind::Clarification, WorkflowStatus::Rejected),
        (UserRole::Role2, WorkflowKind::Revision, WorkflowStatus::Created),
        (UserRole::Role3, WorkflowKind::Revision, WorkflowStatus::Open),
        (UserRole::Role4, WorkflowKind::Modification, WorkflowStatus::None),
        (UserRole::Role5, WorkflowKind::Modification, WorkflowStatus::Rejected),
    ];
    for (role, kind, status) in cases {
        let set = project(role, Some(kind), Some(status), "7");
        assert!(!set.renders(), "{role:?}/{kind:?}/{status:?}");
    }
}

#[test]
fn role2_open_clarification_has_the_documented_four_actions() {
    let set = project(
        UserRole::Role2,
        Some(WorkflowKind::Clarification),
        Some(WorkflowStatus::Open),
        "31",
    );
    assert_eq!(set.actions.len(), 4);
    assert_eq!(set.actions[0].label, "Agree");
    assert_eq!(set.actions[1].label, "Close");
    assert_eq!(set.actions[2].label, "Convert to revision");
    assert!(set.actions[3].label.contains("/ 31"));

    let closed = project(
        UserRole::Role2,
        Some(WorkflowKind::Clarification),
        Some(WorkflowStatus::Closed),
        "31",
    );
    assert_eq!(closed.actions.len(), 1);
    assert_eq!(closed.actions[0].token, Some(ActionToken::ClarifyShow));
}

#[test]
fn agree_fires_status_change_then_action_token() {
    let set = project(
        UserRole::Role2,
        Some(WorkflowKind::Clarification),
        Some(WorkflowStatus::Open),
        "31",
    );
    let order: std::cell::RefCell<Vec<&'static str>> = std::cell::RefCell::new(Vec::new());
    let mut seen_status = None;
    let mut seen_token = None;
    {
        let mut on_status = |status, kind| {
            order.borrow_mut().push("status");
            seen_status = Some((status, kind));
        };
        let mut on_action = |_: &str, token| {
            order.borrow_mut().push("action");
            seen_token = Some(token);
        };
        let mut callbacks = WorkflowCallbacks {
            on_status_change: Some(&mut on_status),
            on_action: Some(&mut on_action),
        };
        dispatch(&set.actions[0], "ann-31", &mut callbacks);
    }
    assert_eq!(order.into_inner(), vec!["status", "action"]);
    assert_eq!(
        seen_status,
        Some((WorkflowStatus::Worked, WorkflowKind::Clarification))
    );
    assert_eq!(seen_token, Some(ActionToken::ClarifyWork));
}

#[test]
fn type_selector_walks_its_two_states() {
    let mut selector = TypeSelector::new(false);
    assert!(!selector.is_open());
    selector.activate();
    assert!(selector.is_open());

    // outside pointer interaction
    let outcome = selector.handle_click(0, 0, "a1", &mut WorkflowCallbacks::none());
    assert_eq!(outcome, notokrat::workflow::SelectorClick::ClosedOutside);
    assert!(!selector.is_open());

    // selecting an option also closes and emits the right token
    selector.activate();
    let mut token = None;
    {
        let mut on_action = |_: &str, t| token = Some(t);
        let mut callbacks = WorkflowCallbacks {
            on_status_change: None,
            on_action: Some(&mut on_action),
        };
        selector.select(
            notokrat::workflow::TypeOption::Modification,
            "a1",
            &mut callbacks,
        );
    }
    assert!(!selector.is_open());
    assert_eq!(token, Some(ActionToken::ModifyCreate));
}

#[test]
fn icon_selection_follows_the_status() {
    assert_eq!(
        status_icon(Some(WorkflowKind::Modification), Some(WorkflowStatus::Closed)),
        Some(StatusIcon::Completed)
    );
    assert_eq!(
        status_icon(Some(WorkflowKind::Clarification), Some(WorkflowStatus::Closed)),
        Some(StatusIcon::Cancelled)
    );
    assert_eq!(
        status_icon(Some(WorkflowKind::Revision), Some(WorkflowStatus::Rejected)),
        Some(StatusIcon::Cancelled)
    );
    assert_eq!(
        status_icon(Some(WorkflowKind::Clarification), Some(WorkflowStatus::Irrelevant)),
        Some(StatusIcon::Close)
    );
}

#[test]
fn overlay_matches_the_documented_arithmetic() {
    // trigger at left=500, viewport 600 wide, overlay 150 wide
    let position = overlay_position(
        Some(Bounds {
            left: 500,
            top: 10,
            width: 40,
            height: 10,
        }),
        Some(Size {
            width: 150,
            height: 60,
        }),
        Size {
            width: 600,
            height: 400,
        },
        false,
    );
    assert_eq!(position.left, 444);

    let missing = overlay_position(
        None,
        Some(Size {
            width: 150,
            height: 60,
        }),
        Size {
            width: 600,
            height: 400,
        },
        false,
    );
    assert_eq!(
        missing,
        OverlayPosition {
            left: -9999,
            right: RightEdge::Auto,
            top: 0
        }
    );
}

#[test]
fn projection_has_no_hidden_state() {
    for role in UserRole::ALL {
        for kind in WorkflowKind::ALL {
            for status in WorkflowStatus::ALL {
                let first = project(role, Some(kind), Some(status), "9");
                let second = project(role, Some(kind), Some(status), "9");
                assert_eq!(first, second);
            }
        }
    }
}
