use crate::{
    archive::{relabel, take_out, upsert, ArchiveError, ArchiveStore},
    timeline::{Timeline, TimelineId},
};

/// Keeps takes in memory only; everything is gone when it is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<Timeline>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArchiveStore for MemoryArchive {
    fn list(&self) -> Result<Vec<Timeline>, ArchiveError> {
        Ok(self.entries.clone())
    }

    fn save(&mut self, timeline: Timeline) -> Result<(), ArchiveError> {
        upsert(&mut self.entries, timeline);
        Ok(())
    }

    fn remove(&mut self, id: TimelineId) -> Result<Timeline, ArchiveError> {
        take_out(&mut self.entries, id)
    }

    fn update_name_and_annotation(
        &mut self,
        id: TimelineId,
        name: String,
        annotation: Option<String>,
    ) -> Result<(), ArchiveError> {
        relabel(&mut self.entries, id, name, annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{Pitch, TimelineEvent};

    fn take(name: &str) -> Timeline {
        Timeline::new(name, vec![TimelineEvent::note_on(0, Pitch(60))])
    }

    #[test]
    fn keeps_insertion_order() {
        let mut archive = MemoryArchive::new();
        for name in ["one", "two", "three"] {
            archive.save(take(name)).unwrap();
        }
        let names: Vec<_> = archive.list().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut archive = MemoryArchive::new();
        let stray = take("stray");
        assert!(matches!(
            archive.remove(stray.id),
            Err(ArchiveError::NotFound(id)) if id == stray.id
        ));
        assert!(archive
            .update_name_and_annotation(stray.id, "x".into(), None)
            .is_err());
    }

    #[test]
    fn relabel_touches_only_name_and_annotation() {
        let mut archive = MemoryArchive::new();
        let original = take("User Mix 1");
        archive.save(original.clone()).unwrap();
        archive
            .update_name_and_annotation(original.id, "Lullaby".into(), Some("calm".into()))
            .unwrap();

        let stored = archive.get(original.id).unwrap();
        assert_eq!(stored.name, "Lullaby");
        assert_eq!(stored.annotation.as_deref(), Some("calm"));
        assert_eq!(stored.events, original.events);
    }
}
