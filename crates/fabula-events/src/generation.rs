#![forbid(unsafe_code)]

/// Events emitted while a book's generation job runs on the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// The generation request was issued.
    Started,

    /// Snapshot of per-scene completion, taken once per status poll.
    ///
    /// A scene counts as complete when its image is done and, if audio was
    /// requested, its audio is done too.
    Progress {
        completed_scenes: usize,
        total_scenes: usize,
        percent: f32,
    },

    /// The backend reported the whole book as generated.
    Completed,
}
