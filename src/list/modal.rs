/// The modals a list view can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    BulkScope,
    ConfirmDelete,
    Filter,
    Create,
    Edit,
}

/// Called right before a modal opens so the renderer can record where the
/// list sits on screen. Modals are positioned against that snapshot rather
/// than against the element that opened them.
pub trait BoundsSnapshot {
    fn request_bounds_snapshot(&mut self, modal: ModalKind);
}

/// Collects the requests so a handler can turn them into response headers.
impl BoundsSnapshot for Vec<ModalKind> {
    fn request_bounds_snapshot(&mut self, modal: ModalKind) {
        self.push(modal);
    }
}
