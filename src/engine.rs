use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fs;
use std::path::Path;

use crate::workflow::{StatusTransition, WorkflowKind, WorkflowStatus};

/// Custom-data keys the review workflow stores on an annotation.
pub const KEY_TYPE: &str = "SWGtype";
pub const KEY_STATUS: &str = "SWGstatus";
pub const KEY_NUMBER: &str = "SWGnumber";
pub const KEY_PANEL: &str = "SWGpanel";
pub const KEY_DOCUMENT_NAME: &str = "SWGdocumentName";

const KEY_REDACTION_MARK: &str = "redactionMark";

/// A comment/markup anchored to a document location. Owned by the document
/// engine; the panel reads it and writes back only through the engine's
/// update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub author: String,
    #[serde(default)]
    pub contents: String,
    #[serde(default = "default_page")]
    pub page: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    custom: HashMap<String, Value>,
}

fn default_page() -> u32 {
    1
}

impl Annotation {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        page: u32,
        contents: impl Into<String>,
    ) -> Self {
        Annotation {
            id: id.into(),
            author: author.into(),
            contents: contents.into(),
            page,
            created_at: Utc::now(),
            in_reply_to: None,
            custom: HashMap::new(),
        }
    }

    pub fn reply_to(mut self, parent_id: impl Into<String>) -> Self {
        self.in_reply_to = Some(parent_id.into());
        self
    }

    pub fn is_reply(&self) -> bool {
        self.in_reply_to.is_some()
    }

    pub fn get_custom_data(&self, key: &str) -> Option<&Value> {
        self.custom.get(key)
    }

    pub fn custom_text(&self, key: &str) -> Option<&str> {
        self.custom.get(key).and_then(Value::as_str)
    }

    pub fn set_custom_data(&mut self, key: impl Into<String>, value: Value) {
        self.custom.insert(key.into(), value);
    }

    pub fn with_custom_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set_custom_data(key, value);
        self
    }

    /// Workflow type, normalized; absent or unrecognized yields `None`.
    pub fn workflow_kind(&self) -> Option<WorkflowKind> {
        self.custom_text(KEY_TYPE).and_then(WorkflowKind::parse)
    }

    /// Workflow status, normalized from either wire encoding.
    pub fn workflow_status(&self) -> Option<WorkflowStatus> {
        self.get_custom_data(KEY_STATUS)
            .and_then(WorkflowStatus::from_value)
    }

    /// Display number (ticket number); empty when unassigned.
    pub fn workflow_number(&self) -> &str {
        self.custom_text(KEY_NUMBER).unwrap_or("")
    }

    /// Free-text panel label, rendered verbatim.
    pub fn panel_text(&self) -> &str {
        self.custom_text(KEY_PANEL).unwrap_or("")
    }

    pub fn workflow_document_name(&self) -> Option<&str> {
        self.custom_text(KEY_DOCUMENT_NAME)
    }

    /// Write a status transition into the custom data, keeping the wire
    /// encoding each status variant came from.
    pub fn apply_transition(&mut self, transition: StatusTransition) {
        self.set_custom_data(KEY_STATUS, transition.status.to_code().to_value());
        self.set_custom_data(KEY_TYPE, Value::from(transition.kind.as_str()));
    }

    pub fn is_redaction_mark(&self) -> bool {
        self.get_custom_data(KEY_REDACTION_MARK)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Add,
    Modify,
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeInfo {
    pub imported: bool,
}

/// One annotation-changed notification from the engine.
#[derive(Debug, Clone)]
pub struct AnnotationEvent {
    pub annotations: Vec<Annotation>,
    pub action: ChangeAction,
    pub info: ChangeInfo,
}

/// In-process stand-in for the external document engine: owns the
/// annotations, the selection, the page inventory and the one-shot
/// document-loaded gate. Mutations queue `AnnotationEvent`s that the app
/// drains once per loop turn.
pub struct DocumentEngine {
    document_name: String,
    annotations: Vec<Annotation>,
    selected: Option<String>,
    page_count: Option<u32>,
    redacted_pages: BTreeSet<u32>,
    events: VecDeque<AnnotationEvent>,
    redaction_seq: u32,
}

impl DocumentEngine {
    pub fn new(document_name: impl Into<String>) -> Self {
        DocumentEngine {
            document_name: document_name.into(),
            annotations: Vec::new(),
            selected: None,
            page_count: None,
            redacted_pages: BTreeSet::new(),
            events: VecDeque::new(),
            redaction_seq: 0,
        }
    }

    /// Load a review sidecar file: document name, page count and the
    /// annotation snapshot handed over by the review host.
    pub fn from_review_file(path: &Path) -> Result<DocumentEngine> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read review file {}", path.display()))?;
        let review: ReviewFile =
            serde_yaml::from_str(&content).context("Failed to parse review YAML")?;
        let mut engine = DocumentEngine::new(review.document);
        engine.add_annotations(review.annotations, true);
        engine.finish_loading(review.pages);
        Ok(engine)
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    /// One-shot document-loaded notification. The first call fixes the page
    /// count; later calls are ignored.
    pub fn finish_loading(&mut self, pages: u32) {
        if self.page_count.is_none() {
            debug!("document '{}' loaded with {} pages", self.document_name, pages);
            self.page_count = Some(pages);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.page_count.is_some()
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    pub fn add_annotations(&mut self, annotations: Vec<Annotation>, imported: bool) {
        if annotations.is_empty() {
            return;
        }
        self.annotations.extend(annotations.iter().cloned());
        self.events.push_back(AnnotationEvent {
            annotations,
            action: ChangeAction::Add,
            info: ChangeInfo { imported },
        });
    }

    /// Replace the stored annotation with the same id and notify listeners.
    pub fn update_annotation(&mut self, annotation: Annotation) {
        let Some(slot) = self.annotations.iter_mut().find(|a| a.id == annotation.id) else {
            warn!("update for unknown annotation {}", annotation.id);
            return;
        };
        *slot = annotation.clone();
        self.events.push_back(AnnotationEvent {
            annotations: vec![annotation],
            action: ChangeAction::Modify,
            info: ChangeInfo::default(),
        });
    }

    /// Delete the given annotations. Replies are left in place; the
    /// delete-policy layer decides what to surface about them.
    pub fn delete_annotations(&mut self, ids: &[String]) {
        let mut removed = Vec::new();
        self.annotations.retain(|a| {
            if ids.contains(&a.id) {
                removed.push(a.clone());
                false
            } else {
                true
            }
        });
        if removed.is_empty() {
            return;
        }
        if self
            .selected
            .as_ref()
            .is_some_and(|id| removed.iter().any(|a| &a.id == id))
        {
            self.selected = None;
        }
        self.events.push_back(AnnotationEvent {
            annotations: removed,
            action: ChangeAction::Delete,
            info: ChangeInfo::default(),
        });
    }

    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn select_annotation(&mut self, id: &str) {
        if self.annotation(id).is_some() {
            self.selected = Some(id.to_string());
        }
    }

    pub fn selected_annotation(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Root annotations (not replies, not redaction marks), in document
    /// order: page first, then creation time.
    pub fn roots(&self) -> Vec<&Annotation> {
        let mut roots: Vec<&Annotation> = self
            .annotations
            .iter()
            .filter(|a| !a.is_reply() && !a.is_redaction_mark())
            .collect();
        roots.sort_by(|a, b| a.page.cmp(&b.page).then(a.created_at.cmp(&b.created_at)));
        roots
    }

    /// Replies to an annotation, oldest first.
    pub fn replies_of(&self, id: &str) -> Vec<&Annotation> {
        let mut replies: Vec<&Annotation> = self
            .annotations
            .iter()
            .filter(|a| a.in_reply_to.as_deref() == Some(id))
            .collect();
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        replies
    }

    /// Create one redaction-mark annotation per page.
    pub fn mark_pages_for_redaction(&mut self, pages: &[u32]) {
        let marks: Vec<Annotation> = pages
            .iter()
            .map(|&page| {
                self.redaction_seq += 1;
                Annotation::new(
                    format!("redaction-p{}-{}", page, self.redaction_seq),
                    "redaction",
                    page,
                    "",
                )
                .with_custom_data(KEY_REDACTION_MARK, Value::from(true))
            })
            .collect();
        self.add_annotations(marks, false);
    }

    /// Apply redactions to the given pages.
    pub fn redact_pages(&mut self, pages: &[u32]) {
        self.redacted_pages.extend(pages.iter().copied());
    }

    pub fn redacted_pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.redacted_pages.iter().copied()
    }

    /// Drain the pending annotation-changed notifications.
    pub fn take_events(&mut self) -> Vec<AnnotationEvent> {
        self.events.drain(..).collect()
    }
}

#[derive(Serialize, Deserialize)]
struct ReviewFile {
    document: String,
    pages: u32,
    #[serde(default)]
    annotations: Vec<Annotation>,
}
