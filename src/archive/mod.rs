//! Where finished takes live.
//!
//! [`ArchiveStore`] is the whole contract the engine relies on. Two stores
//! ship with the crate: [`MemoryArchive`] for tests and throwaway sessions,
//! and [`JsonArchive`], which keeps one JSON file per namespace on disk.
//! Both list takes in the order they were saved.

mod json;
mod memory;

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::timeline::{Timeline, TimelineError, TimelineId};

pub use json::JsonArchive;
pub use memory::MemoryArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("no archived take with id {0}")]
    NotFound(TimelineId),
    #[error("invalid archive namespace {0:?}")]
    InvalidNamespace(String),
    #[error("archive i/o failed on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archive file {path} is not valid")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("archived take {id} in {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        id: TimelineId,
        #[source]
        source: TimelineError,
    },
}

/// A durable, ordered collection of named takes.
pub trait ArchiveStore {
    /// Every take, oldest first.
    fn list(&self) -> Result<Vec<Timeline>, ArchiveError>;

    /// Add a take. Saving an id that already exists replaces it in place.
    fn save(&mut self, timeline: Timeline) -> Result<(), ArchiveError>;

    /// Delete a take and return it.
    fn remove(&mut self, id: TimelineId) -> Result<Timeline, ArchiveError>;

    fn update_name_and_annotation(
        &mut self,
        id: TimelineId,
        name: String,
        annotation: Option<String>,
    ) -> Result<(), ArchiveError>;

    fn get(&self, id: TimelineId) -> Result<Timeline, ArchiveError> {
        self.list()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(ArchiveError::NotFound(id))
    }
}

impl<A: ArchiveStore + ?Sized> ArchiveStore for Box<A> {
    fn list(&self) -> Result<Vec<Timeline>, ArchiveError> {
        (**self).list()
    }

    fn save(&mut self, timeline: Timeline) -> Result<(), ArchiveError> {
        (**self).save(timeline)
    }

    fn remove(&mut self, id: TimelineId) -> Result<Timeline, ArchiveError> {
        (**self).remove(id)
    }

    fn update_name_and_annotation(
        &mut self,
        id: TimelineId,
        name: String,
        annotation: Option<String>,
    ) -> Result<(), ArchiveError> {
        (**self).update_name_and_annotation(id, name, annotation)
    }

    fn get(&self, id: TimelineId) -> Result<Timeline, ArchiveError> {
        (**self).get(id)
    }
}

// List edits shared by both stores.

fn upsert(entries: &mut Vec<Timeline>, timeline: Timeline) {
    match entries.iter_mut().find(|t| t.id == timeline.id) {
        Some(existing) => *existing = timeline,
        None => entries.push(timeline),
    }
}

fn take_out(entries: &mut Vec<Timeline>, id: TimelineId) -> Result<Timeline, ArchiveError> {
    let index = entries
        .iter()
        .position(|t| t.id == id)
        .ok_or(ArchiveError::NotFound(id))?;
    Ok(entries.remove(index))
}

fn relabel(
    entries: &mut [Timeline],
    id: TimelineId,
    name: String,
    annotation: Option<String>,
) -> Result<(), ArchiveError> {
    let timeline = entries
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(ArchiveError::NotFound(id))?;
    timeline.name = name;
    timeline.annotation = annotation;
    Ok(())
}
