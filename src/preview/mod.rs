// src/preview/mod.rs
use crate::extract::Outcome;
use crate::table::{HeaderList, Record};

/// How the current result is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Table,
    Json,
}

/// The result currently on screen. Each input event builds a new value from
/// the dispatcher's [`Outcome`]; the caller swaps its held state for it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreviewState {
    pub headers: HeaderList,
    pub rows: Vec<Record>,
    pub error: Option<String>,
    pub view: ViewMode,
}

impl PreviewState {
    pub fn apply(&self, outcome: Outcome) -> PreviewState {
        match outcome {
            Outcome::Cleared => PreviewState::default(),
            Outcome::Parsed(table) => PreviewState {
                headers: table.headers,
                rows: table.rows,
                error: None,
                view: ViewMode::Table,
            },
            // keeps whichever view the user had picked
            Outcome::Failed(failure) => PreviewState {
                headers: Vec::new(),
                rows: Vec::new(),
                error: Some(failure.to_string()),
                view: self.view,
            },
        }
    }

    pub fn with_view(&self, view: ViewMode) -> PreviewState {
        PreviewState {
            view,
            ..self.clone()
        }
    }

    pub fn with_error(&self, error: Option<String>) -> PreviewState {
        PreviewState {
            error,
            ..self.clone()
        }
    }

    pub fn has_data(&self) -> bool {
        !self.headers.is_empty()
    }

    /// Saving is offered as soon as anything was recovered, even a header-only table.
    pub fn can_save(&self) -> bool {
        !self.headers.is_empty() || !self.rows.is_empty()
    }
}
