use log::debug;

use crate::engine::{AnnotationEvent, ChangeAction, DocumentEngine};
use crate::notification::NotificationManager;

/// Apply the panel's annotation-changed policies to one engine event.
///
/// Deleting a note surfaces its replies through a notification instead of
/// deleting them. Newly added annotations (not imported, not replies) can be
/// auto-selected when the host enabled that behavior.
pub fn on_annotation_changed(
    event: &AnnotationEvent,
    engine: &mut DocumentEngine,
    notifications: &mut NotificationManager,
    select_annotation_on_creation: bool,
) {
    match event.action {
        ChangeAction::Delete => notify_detached_replies(event, engine, notifications),
        ChangeAction::Add => {
            if select_annotation_on_creation && !event.info.imported {
                if let Some(first) = event.annotations.first() {
                    if !first.is_reply() {
                        debug!("selecting newly created annotation {}", first.id);
                        engine.select_annotation(&first.id);
                    }
                }
            }
        }
        ChangeAction::Modify => {}
    }
}

fn notify_detached_replies(
    event: &AnnotationEvent,
    engine: &DocumentEngine,
    notifications: &mut NotificationManager,
) {
    for annotation in &event.annotations {
        let replies = engine.replies_of(&annotation.id);
        if replies.is_empty() {
            continue;
        }
        notifications.warn(format!(
            "Note {} deleted, {} replies kept",
            annotation.id,
            replies.len()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Annotation;

    fn engine_with_thread() -> DocumentEngine {
        let mut engine = DocumentEngine::new("doc.pdf");
        engine.add_annotations(
            vec![
                Annotation::new("a1", "mk", 1, "root"),
                Annotation::new("r1", "rb", 1, "reply one").reply_to("a1"),
                Annotation::new("r2", "rb", 1, "reply two").reply_to("a1"),
            ],
            true,
        );
        engine.take_events();
        engine
    }

    #[test]
    fn delete_surfaces_kept_replies() {
        let mut engine = engine_with_thread();
        let mut notifications = NotificationManager::new();

        engine.delete_annotations(&["a1".to_string()]);
        for event in engine.take_events() {
            on_annotation_changed(&event, &mut engine, &mut notifications, false);
        }

        let current = notifications.current().expect("notification expected");
        assert!(current.message.contains("a1"));
        assert!(current.message.contains('2'));
        // the replies themselves are untouched
        assert!(engine.annotation("r1").is_some());
    }

    #[test]
    fn delete_without_replies_stays_quiet() {
        let mut engine = DocumentEngine::new("doc.pdf");
        engine.add_annotations(vec![Annotation::new("a1", "mk", 1, "root")], true);
        engine.take_events();
        let mut notifications = NotificationManager::new();

        engine.delete_annotations(&["a1".to_string()]);
        for event in engine.take_events() {
            on_annotation_changed(&event, &mut engine, &mut notifications, false);
        }
        assert!(notifications.current().is_none());
    }

    #[test]
    fn fresh_annotations_are_selected_when_enabled() {
        let mut engine = engine_with_thread();
        engine.add_annotations(vec![Annotation::new("a9", "mk", 2, "new note")], false);
        let events = engine.take_events();
        let mut notifications = NotificationManager::new();

        for event in &events {
            on_annotation_changed(event, &mut engine, &mut notifications, true);
        }
        assert_eq!(engine.selected_annotation(), Some("a9"));
    }

    #[test]
    fn imported_and_reply_annotations_are_not_selected() {
        let mut engine = engine_with_thread();
        let mut notifications = NotificationManager::new();

        engine.add_annotations(vec![Annotation::new("a9", "mk", 2, "imported")], true);
        for event in engine.take_events() {
            on_annotation_changed(&event, &mut engine, &mut notifications, true);
        }
        assert_eq!(engine.selected_annotation(), None);

        engine.add_annotations(
            vec![Annotation::new("r9", "mk", 2, "reply").reply_to("a1")],
            false,
        );
        for event in engine.take_events() {
            on_annotation_changed(&event, &mut engine, &mut notifications, true);
        }
        assert_eq!(engine.selected_annotation(), None);
    }

    #[test]
    fn selection_stays_off_when_disabled() {
        let mut engine = engine_with_thread();
        let mut notifications = NotificationManager::new();
        engine.add_annotations(vec![Annotation::new("a9", "mk", 2, "new note")], false);
        for event in engine.take_events() {
            on_annotation_changed(&event, &mut engine, &mut notifications, false);
        }
        assert_eq!(engine.selected_annotation(), None);
    }
}
