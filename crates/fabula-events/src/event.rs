#![forbid(unsafe_code)]

use crate::{GenerationEvent, UploadEvent};

/// Unified event for the fabula pipeline.
///
/// Hierarchical: each phase has its own variant with a sub-enum.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Resource upload event.
    Upload(UploadEvent),
    /// Generation progress event.
    Generation(GenerationEvent),
}

impl From<UploadEvent> for Event {
    fn from(e: UploadEvent) -> Self {
        Self::Upload(e)
    }
}

impl From<GenerationEvent> for Event {
    fn from(e: GenerationEvent) -> Self {
        Self::Generation(e)
    }
}

#[cfg(test)]
mod tests {
    use fabula_core::ResourceKind;
    use rstest::rstest;

    use super::*;

    fn is_started_scene_2(event: &UploadEvent) -> bool {
        matches!(
            event,
            UploadEvent::Started {
                scene_number: 2,
                kind: ResourceKind::Image,
            }
        )
    }

    fn is_falling_back(event: &UploadEvent) -> bool {
        matches!(event, UploadEvent::FallingBack { .. })
    }

    #[rstest]
    #[case(
        UploadEvent::Started { scene_number: 2, kind: ResourceKind::Image },
        is_started_scene_2
    )]
    #[case(
        UploadEvent::FallingBack { scene_number: 7, kind: ResourceKind::Audio },
        is_falling_back
    )]
    fn upload_event_into_event(
        #[case] upload_event: UploadEvent,
        #[case] check: fn(&UploadEvent) -> bool,
    ) {
        let event: Event = upload_event.into();
        assert!(matches!(event, Event::Upload(inner) if check(&inner)));
    }

    #[test]
    fn generation_event_into_event() {
        let event: Event = GenerationEvent::Completed.into();
        assert!(matches!(event, Event::Generation(GenerationEvent::Completed)));
    }
}
