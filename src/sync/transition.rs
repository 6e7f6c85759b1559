//! # Transitions
//!
//! Every CRUD operation reports its progress as a sequence of transitions: one `Start`,
//! then exactly one `Success` or `Error`. Each transition is tagged with the resource name
//! so reducers for other resources can ignore it.
//!
//! Transitions also have a string type name of the form `{RESOURCE}_{OPERATION}_{PHASE}`
//! (`PHOTOS_FETCH_START`), for consumers that route on strings.

use super::{CrudError, Record};
use crate::transport::ErrorInfo;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Fetch => "FETCH",
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    Success,
    Error,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Start => "START",
            Phase::Success => "SUCCESS",
            Phase::Error => "ERROR",
        }
    }
}

/// Operation and phase of a transition, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionKind {
    pub operation: Operation,
    pub phase: Phase,
}

impl TransitionKind {
    pub fn new(operation: Operation, phase: Phase) -> Self {
        Self { operation, phase }
    }

    pub fn type_name(&self, resource_name: &str) -> String {
        format!(
            "{}_{}_{}",
            resource_name.to_uppercase(),
            self.operation.as_str(),
            self.phase.as_str()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    FetchStart,
    FetchSuccess {
        records: Vec<Record>,
        received_at: DateTime<Utc>,
        /// Replace the stored items instead of merging.
        replace: bool,
    },
    FetchError {
        error: ErrorInfo,
    },
    CreateStart {
        record: Record,
    },
    /// `cid` is the client id the record was optimistically stored under.
    CreateSuccess {
        record: Record,
        cid: Option<Value>,
    },
    CreateError {
        error: CrudError,
        record: Record,
    },
    UpdateStart {
        record: Record,
    },
    UpdateSuccess {
        record: Record,
        id: Option<Value>,
    },
    UpdateError {
        error: CrudError,
        record: Record,
    },
    DeleteStart {
        record: Record,
    },
    DeleteSuccess {
        record: Record,
    },
    DeleteError {
        error: CrudError,
        record: Record,
    },
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        use Operation::*;
        use Phase::*;

        let (operation, phase) = match self {
            Transition::FetchStart => (Fetch, Start),
            Transition::FetchSuccess { .. } => (Fetch, Success),
            Transition::FetchError { .. } => (Fetch, Error),
            Transition::CreateStart { .. } => (Create, Start),
            Transition::CreateSuccess { .. } => (Create, Success),
            Transition::CreateError { .. } => (Create, Error),
            Transition::UpdateStart { .. } => (Update, Start),
            Transition::UpdateSuccess { .. } => (Update, Success),
            Transition::UpdateError { .. } => (Update, Error),
            Transition::DeleteStart { .. } => (Delete, Start),
            Transition::DeleteSuccess { .. } => (Delete, Success),
            Transition::DeleteError { .. } => (Delete, Error),
        };
        TransitionKind::new(operation, phase)
    }
}

/// A transition tagged with the resource it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    pub resource_name: String,
    pub transition: Transition,
}

impl TransitionRecord {
    pub fn new(resource_name: impl Into<String>, transition: Transition) -> Self {
        Self {
            resource_name: resource_name.into(),
            transition,
        }
    }

    pub fn kind(&self) -> TransitionKind {
        self.transition.kind()
    }

    pub fn type_name(&self) -> String {
        self.kind().type_name(&self.resource_name)
    }
}

impl fmt::Display for TransitionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// The twelve type names for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTypes {
    pub fetch_start: String,
    pub fetch_success: String,
    pub fetch_error: String,
    pub create_start: String,
    pub create_success: String,
    pub create_error: String,
    pub update_start: String,
    pub update_success: String,
    pub update_error: String,
    pub delete_start: String,
    pub delete_success: String,
    pub delete_error: String,
}

impl TransitionTypes {
    pub fn all(&self) -> [&str; 12] {
        [
            &self.fetch_start,
            &self.fetch_success,
            &self.fetch_error,
            &self.create_start,
            &self.create_success,
            &self.create_error,
            &self.update_start,
            &self.update_success,
            &self.update_error,
            &self.delete_start,
            &self.delete_success,
            &self.delete_error,
        ]
    }
}

pub fn transition_types_for(resource_name: &str) -> TransitionTypes {
    let name = |operation, phase| TransitionKind::new(operation, phase).type_name(resource_name);
    use Operation::*;
    use Phase::*;

    TransitionTypes {
        fetch_start: name(Fetch, Start),
        fetch_success: name(Fetch, Success),
        fetch_error: name(Fetch, Error),
        create_start: name(Create, Start),
        create_success: name(Create, Success),
        create_error: name(Create, Error),
        update_start: name(Update, Start),
        update_success: name(Update, Success),
        update_error: name(Update, Error),
        delete_start: name(Delete, Start),
        delete_success: name(Delete, Success),
        delete_error: name(Delete, Error),
    }
}

/// Builds [`TransitionRecord`]s for one resource.
#[derive(Debug, Clone)]
pub struct TransitionCreators {
    resource_name: String,
}

impl TransitionCreators {
    pub fn for_resource(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    fn tag(&self, transition: Transition) -> TransitionRecord {
        TransitionRecord::new(self.resource_name.clone(), transition)
    }

    pub fn fetch_start(&self) -> TransitionRecord {
        self.tag(Transition::FetchStart)
    }

    pub fn fetch_success(
        &self,
        records: Vec<Record>,
        received_at: DateTime<Utc>,
        replace: bool,
    ) -> TransitionRecord {
        self.tag(Transition::FetchSuccess {
            records,
            received_at,
            replace,
        })
    }

    pub fn fetch_error(&self, error: ErrorInfo) -> TransitionRecord {
        self.tag(Transition::FetchError { error })
    }

    pub fn create_start(&self, record: Record) -> TransitionRecord {
        self.tag(Transition::CreateStart { record })
    }

    pub fn create_success(&self, record: Record, cid: Option<Value>) -> TransitionRecord {
        self.tag(Transition::CreateSuccess { record, cid })
    }

    pub fn create_error(&self, error: CrudError, record: Record) -> TransitionRecord {
        self.tag(Transition::CreateError { error, record })
    }

    pub fn update_start(&self, record: Record) -> TransitionRecord {
        self.tag(Transition::UpdateStart { record })
    }

    pub fn update_success(&self, record: Record, id: Option<Value>) -> TransitionRecord {
        self.tag(Transition::UpdateSuccess { record, id })
    }

    pub fn update_error(&self, error: CrudError, record: Record) -> TransitionRecord {
        self.tag(Transition::UpdateError { error, record })
    }

    pub fn delete_start(&self, record: Record) -> TransitionRecord {
        self.tag(Transition::DeleteStart { record })
    }

    pub fn delete_success(&self, record: Record) -> TransitionRecord {
        self.tag(Transition::DeleteSuccess { record })
    }

    pub fn delete_error(&self, error: CrudError, record: Record) -> TransitionRecord {
        self.tag(Transition::DeleteError { error, record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        let types = transition_types_for("somePhotos");
        assert_eq!(types.fetch_start, "SOMEPHOTOS_FETCH_START");
        assert_eq!(types.update_success, "SOMEPHOTOS_UPDATE_SUCCESS");
        assert_eq!(types.delete_error, "SOMEPHOTOS_DELETE_ERROR");

        let all = types.all();
        let mut unique = all.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn test_creators_tag_resource() {
        let creators = TransitionCreators::for_resource("photos");
        let start = creators.fetch_start();
        assert_eq!(start.resource_name, "photos");
        assert_eq!(start.type_name(), "PHOTOS_FETCH_START");
        assert_eq!(start.kind(), TransitionKind::new(Operation::Fetch, Phase::Start));

        let done = creators.delete_success(Record::new());
        assert_eq!(done.to_string(), transition_types_for("photos").delete_success);
    }
}
