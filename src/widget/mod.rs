pub mod redaction_popup;
