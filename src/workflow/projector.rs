use super::action::{ActionDescriptor, ActionSet, ActionStyle, ActionToken, StatusTransition};
use super::role::UserRole;
use super::status::{WorkflowKind, WorkflowStatus};

use super::status::WorkflowStatus::{
    Closed, Created, Irrelevant, Open, Rejected, Worked, WorkedLegacy,
};

/// Project the workflow action buttons for one annotation as seen by `role`.
///
/// Pure function of its inputs; callers re-derive the set on every render.
/// Any (role, kind, status) tuple outside the tables below projects to the
/// empty set: nothing is rendered, nothing is raised, nothing is logged.
/// A missing kind suppresses every role's view.
pub fn project(
    role: UserRole,
    kind: Option<WorkflowKind>,
    status: Option<WorkflowStatus>,
    number: &str,
) -> ActionSet {
    let (Some(kind), Some(status)) = (kind, status) else {
        return ActionSet::empty();
    };

    match role {
        UserRole::Role1 => ActionSet::empty(),
        UserRole::Role2 => project_role2(kind, status, number),
        UserRole::Role3 | UserRole::Role4 | UserRole::Role5 => {
            project_shared(role, kind, status, number)
        }
    }
}

fn project_role2(kind: WorkflowKind, status: WorkflowStatus, number: &str) -> ActionSet {
    match kind {
        WorkflowKind::Clarification => match status {
            Open | Worked => ActionSet {
                actions: vec![
                    agree(),
                    close(),
                    clarify_to_revision(),
                    clarify_show(status, number),
                ],
                break_after: Some(1),
                placeholder: false,
            },
            WorkedLegacy => ActionSet {
                actions: vec![agree(), close(), clarify_show(status, number)],
                break_after: Some(1),
                placeholder: false,
            },
            WorkflowStatus::None => ActionSet {
                actions: vec![agree(), close(), clarify_show(status, number)],
                break_after: None,
                placeholder: false,
            },
            Closed | Irrelevant => ActionSet {
                actions: vec![clarify_show(status, number)],
                ..ActionSet::default()
            },
            _ => ActionSet::empty(),
        },
        WorkflowKind::Revision => match status {
            WorkflowStatus::None => ActionSet {
                actions: vec![ActionDescriptor {
                    label: "Disagree".to_string(),
                    title: Some("Create revision"),
                    token: None,
                    transition: Some(StatusTransition {
                        status: Rejected,
                        kind: WorkflowKind::Revision,
                    }),
                    style: ActionStyle::Disagree,
                }],
                ..ActionSet::default()
            },
            _ => ActionSet::empty(),
        },
        WorkflowKind::Modification => match status {
            WorkflowStatus::None => ActionSet {
                actions: vec![ActionDescriptor {
                    label: "Change notice / No.".to_string(),
                    title: None,
                    token: Some(ActionToken::ModifyCreate),
                    transition: None,
                    style: ActionStyle::Modification,
                }],
                ..ActionSet::default()
            },
            Open | Created | Worked | Closed | Irrelevant => ActionSet {
                actions: vec![modify_show(format!("Change notice / {number}"), None)],
                ..ActionSet::default()
            },
            _ => ActionSet::empty(),
        },
    }
}

/// Roles 3, 4 and 5 share one table; role 5 only changes the hover title of
/// the change-notice button depending on status.
fn project_shared(
    role: UserRole,
    kind: WorkflowKind,
    status: WorkflowStatus,
    number: &str,
) -> ActionSet {
    match kind {
        WorkflowKind::Clarification => match status {
            Created | WorkflowStatus::None | Open | Worked | Rejected | Closed | Irrelevant => {
                ActionSet {
                    actions: vec![ActionDescriptor {
                        label: format!("Clarification / {number}"),
                        title: Some("Show clarification"),
                        token: Some(ActionToken::ClarifyShow),
                        transition: None,
                        style: ActionStyle::Clarification,
                    }],
                    ..ActionSet::default()
                }
            }
            _ => ActionSet::empty(),
        },
        WorkflowKind::Revision => match status {
            // An explicitly present but contentless container.
            WorkflowStatus::None => ActionSet::placeholder(),
            _ => ActionSet::empty(),
        },
        WorkflowKind::Modification => match status {
            Created | Open | Worked | Closed | Irrelevant => {
                let title = if role == UserRole::Role5 && status == Created {
                    "Create change notice"
                } else {
                    "Show change notice"
                };
                ActionSet {
                    actions: vec![modify_show(format!("Change notice / {number}"), Some(title))],
                    ..ActionSet::default()
                }
            }
            _ => ActionSet::empty(),
        },
    }
}

fn agree() -> ActionDescriptor {
    ActionDescriptor {
        label: "Agree".to_string(),
        title: Some("Clarify change notice"),
        token: Some(ActionToken::ClarifyWork),
        transition: Some(StatusTransition {
            status: Worked,
            kind: WorkflowKind::Clarification,
        }),
        style: ActionStyle::Agree,
    }
}

fn close() -> ActionDescriptor {
    ActionDescriptor {
        label: "Close".to_string(),
        title: Some("Close clarification"),
        token: Some(ActionToken::ClarifyReject),
        transition: Some(StatusTransition {
            status: Closed,
            kind: WorkflowKind::Clarification,
        }),
        style: ActionStyle::Disagree,
    }
}

fn clarify_to_revision() -> ActionDescriptor {
    ActionDescriptor {
        label: "Convert to revision".to_string(),
        title: Some("Clarification to revision"),
        token: Some(ActionToken::ClarifyToRevision),
        transition: None,
        style: ActionStyle::ChangeType,
    }
}

fn clarify_show(status: WorkflowStatus, number: &str) -> ActionDescriptor {
    // Open phrasing keeps the separator before the number.
    let label = if status == Open {
        format!("Clarification / {number} show")
    } else {
        format!("Clarification {number} show")
    };
    ActionDescriptor {
        label,
        title: Some("Show clarification"),
        token: Some(ActionToken::ClarifyShow),
        transition: None,
        style: ActionStyle::Clarification,
    }
}

fn modify_show(label: String, title: Option<&'static str>) -> ActionDescriptor {
    ActionDescriptor {
        label,
        title,
        token: Some(ActionToken::ModifyShow),
        transition: None,
        style: ActionStyle::Modification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::action::{WorkflowCallbacks, dispatch};

    fn set(role: UserRole, kind: WorkflowKind, status: WorkflowStatus) -> ActionSet {
        project(role, Some(kind), Some(status), "12")
    }

    #[test]
    fn missing_kind_projects_nothing_for_any_role() {
        for role in UserRole::ALL {
            for status in WorkflowStatus::ALL {
                let set = project(role, None, Some(status), "12");
                assert!(!set.renders(), "{role:?}/{status:?}");
            }
        }
    }

    #[test]
    fn role2_clarification_open_has_four_actions_in_order() {
        let set = set(UserRole::Role2, WorkflowKind::Clarification, Open);
        let labels: Vec<&str> = set.actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Agree", "Close", "Convert to revision", "Clarification / 12 show"]
        );
        assert_eq!(set.break_after, Some(1));

        let tokens: Vec<_> = set.actions.iter().map(|a| a.token).collect();
        assert_eq!(
            tokens,
            vec![
                Some(ActionToken::ClarifyWork),
                Some(ActionToken::ClarifyReject),
                Some(ActionToken::ClarifyToRevision),
                Some(ActionToken::ClarifyShow),
            ]
        );
    }

    #[test]
    fn role2_show_label_phrasing_distinguishes_open_from_worked() {
        let open = set(UserRole::Role2, WorkflowKind::Clarification, Open);
        let worked = set(UserRole::Role2, WorkflowKind::Clarification, Worked);
        let open_show = &open.actions[3].label;
        let worked_show = &worked.actions[3].label;
        assert!(open_show.contains("/ 12"), "{open_show}");
        assert!(!worked_show.contains('/'), "{worked_show}");
        assert_ne!(open_show, worked_show);
    }

    #[test]
    fn role2_clarification_worked_legacy_drops_revision_conversion() {
        let set = set(UserRole::Role2, WorkflowKind::Clarification, WorkedLegacy);
        let labels: Vec<&str> = set.actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Agree", "Close", "Clarification 12 show"]);
        assert_eq!(set.break_after, Some(1));
    }

    #[test]
    fn role2_clarification_none_has_three_actions_without_break() {
        let set = set(
            UserRole::Role2,
            WorkflowKind::Clarification,
            WorkflowStatus::None,
        );
        assert_eq!(set.actions.len(), 3);
        assert_eq!(set.break_after, None);
    }

    #[test]
    fn role2_clarification_closed_shows_only_show() {
        for status in [Closed, Irrelevant] {
            let set = set(UserRole::Role2, WorkflowKind::Clarification, status);
            assert_eq!(set.actions.len(), 1, "{status:?}");
            assert_eq!(set.actions[0].token, Some(ActionToken::ClarifyShow));
        }
    }

    #[test]
    fn role2_revision_none_is_a_local_only_transition() {
        let set = set(UserRole::Role2, WorkflowKind::Revision, WorkflowStatus::None);
        assert_eq!(set.actions.len(), 1);
        let action = &set.actions[0];
        assert_eq!(action.token, None);
        assert_eq!(
            action.transition,
            Some(StatusTransition {
                status: Rejected,
                kind: WorkflowKind::Revision,
            })
        );
    }

    #[test]
    fn role2_modification_table() {
        let create = set(
            UserRole::Role2,
            WorkflowKind::Modification,
            WorkflowStatus::None,
        );
        assert_eq!(create.actions[0].token, Some(ActionToken::ModifyCreate));

        for status in [Open, Created, Worked, Closed, Irrelevant] {
            let set = set(UserRole::Role2, WorkflowKind::Modification, status);
            assert_eq!(set.actions.len(), 1, "{status:?}");
            assert_eq!(set.actions[0].token, Some(ActionToken::ModifyShow));
            assert!(set.actions[0].label.contains("12"));
        }

        assert!(!set(UserRole::Role2, WorkflowKind::Modification, WorkedLegacy).renders());
        assert!(!set(UserRole::Role2, WorkflowKind::Modification, Rejected).renders());
    }

    #[test]
    fn shared_roles_clarification_always_shows() {
        for role in [UserRole::Role3, UserRole::Role4, UserRole::Role5] {
            for status in [
                Created,
                WorkflowStatus::None,
                Open,
                Worked,
                Rejected,
                Closed,
                Irrelevant,
            ] {
                let set = set(role, WorkflowKind::Clarification, status);
                assert_eq!(set.actions.len(), 1, "{role:?}/{status:?}");
                assert_eq!(set.actions[0].label, "Clarification / 12");
            }
            // the string "worked" form never matched for these roles
            assert!(!set(role, WorkflowKind::Clarification, WorkedLegacy).renders());
        }
    }

    #[test]
    fn shared_roles_revision_none_renders_an_empty_container() {
        for role in [UserRole::Role3, UserRole::Role4, UserRole::Role5] {
            let set = set(role, WorkflowKind::Revision, WorkflowStatus::None);
            assert!(set.actions.is_empty());
            assert!(set.placeholder);
            assert!(set.renders());

            assert!(!set2_renders(role, WorkflowKind::Revision, Open));
        }
    }

    fn set2_renders(role: UserRole, kind: WorkflowKind, status: WorkflowStatus) -> bool {
        set(role, kind, status).renders()
    }

    #[test]
    fn role5_title_wording_depends_on_status() {
        let created = set(UserRole::Role5, WorkflowKind::Modification, Created);
        assert_eq!(created.actions[0].title, Some("Create change notice"));
        let open = set(UserRole::Role5, WorkflowKind::Modification, Open);
        assert_eq!(open.actions[0].title, Some("Show change notice"));

        // roles 3 and 4 never use the create wording
        let created34 = set(UserRole::Role3, WorkflowKind::Modification, Created);
        assert_eq!(created34.actions[0].title, Some("Show change notice"));
    }

    #[test]
    fn role1_projects_nothing() {
        for kind in WorkflowKind::ALL {
            for status in WorkflowStatus::ALL {
                assert!(!set(UserRole::Role1, kind, status).renders());
            }
        }
    }

    #[test]
    fn unmatched_tuples_are_silently_empty() {
        // enumerate the full domain and pin the exact set of rendering tuples
        let mut rendering = 0usize;
        for role in UserRole::ALL {
            for kind in WorkflowKind::ALL {
                for status in WorkflowStatus::ALL {
                    if set(role, kind, status).renders() {
                        rendering += 1;
                    }
                }
            }
        }
        // role2: 6 clarification + 1 revision + 6 modification = 13
        // roles 3/4/5: 7 clarification + 1 revision placeholder + 5 modification = 13 each
        assert_eq!(rendering, 13 + 3 * 13);
    }

    #[test]
    fn projection_is_idempotent() {
        for role in UserRole::ALL {
            for kind in WorkflowKind::ALL {
                for status in WorkflowStatus::ALL {
                    let first = set(role, kind, status);
                    let second = set(role, kind, status);
                    assert_eq!(first, second);
                }
            }
        }
    }

    #[test]
    fn agree_dispatch_fires_both_handlers_in_order() {
        let set = set(UserRole::Role2, WorkflowKind::Clarification, Open);
        let trace: std::cell::RefCell<Vec<String>> = std::cell::RefCell::new(Vec::new());
        {
            let mut on_status = |status: WorkflowStatus, kind: WorkflowKind| {
                trace.borrow_mut().push(format!("{status:?}/{kind:?}"));
            };
            let mut on_action = |id: &str, token: ActionToken| {
                trace.borrow_mut().push(format!("{id}:{}", token.as_str()));
            };
            let mut callbacks = WorkflowCallbacks {
                on_status_change: Some(&mut on_status),
                on_action: Some(&mut on_action),
            };
            dispatch(&set.actions[0], "a1", &mut callbacks);
        }
        assert_eq!(
            trace.into_inner(),
            vec!["Worked/Clarification".to_string(), "a1:clarify-work".to_string()]
        );
    }
}
