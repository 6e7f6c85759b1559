use super::TransitionRecord;

/// Sink for transitions emitted by the CRUD operations.
///
/// Any `Fn(TransitionRecord)` closure is a sink. The state store's client is another.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, transition: TransitionRecord);
}

impl<F> Dispatch for F
where
    F: Fn(TransitionRecord) + Send + Sync,
{
    fn dispatch(&self, transition: TransitionRecord) {
        self(transition)
    }
}
