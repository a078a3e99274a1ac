use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    archive::{relabel, take_out, upsert, ArchiveError, ArchiveStore},
    timeline::{Timeline, TimelineId},
};

/// Takes stored as a JSON array in `<dir>/<namespace>.json`.
///
/// The file is read once on open and rewritten on every change: the new
/// contents go to a sibling temp file which is then renamed over the old
/// one, so a crash mid-write leaves the previous version intact. The
/// in-memory copy only changes after the write succeeds.
#[derive(Debug)]
pub struct JsonArchive {
    path: PathBuf,
    entries: Vec<Timeline>,
}

impl JsonArchive {
    pub const DEFAULT_NAMESPACE: &'static str = "performances";

    pub fn open(dir: impl AsRef<Path>, namespace: &str) -> Result<Self, ArchiveError> {
        if namespace.is_empty()
            || namespace.starts_with('.')
            || namespace.contains(['/', '\\'])
        {
            return Err(ArchiveError::InvalidNamespace(namespace.to_owned()));
        }

        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ArchiveError::Io {
            path: dir.to_owned(),
            source,
        })?;

        let path = dir.join(format!("{namespace}.json"));
        let entries: Vec<Timeline> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| ArchiveError::Json {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(ArchiveError::Io { path, source }),
        };
        for timeline in &entries {
            timeline.validate().map_err(|source| ArchiveError::Corrupt {
                path: path.clone(),
                id: timeline.id,
                source,
            })?;
        }

        tracing::debug!(path = %path.display(), takes = entries.len(), "archive opened");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `edit` to a copy of the entries, persist the copy, then adopt it.
    fn commit<T>(
        &mut self,
        edit: impl FnOnce(&mut Vec<Timeline>) -> Result<T, ArchiveError>,
    ) -> Result<T, ArchiveError> {
        let mut next = self.entries.clone();
        let out = edit(&mut next)?;
        self.write(&next)?;
        self.entries = next;
        Ok(out)
    }

    fn write(&self, entries: &[Timeline]) -> Result<(), ArchiveError> {
        let bytes = serde_json::to_vec_pretty(entries).map_err(|source| ArchiveError::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|source| ArchiveError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

impl ArchiveStore for JsonArchive {
    fn list(&self) -> Result<Vec<Timeline>, ArchiveError> {
        Ok(self.entries.clone())
    }

    fn save(&mut self, timeline: Timeline) -> Result<(), ArchiveError> {
        let id = timeline.id;
        self.commit(|entries| {
            upsert(entries, timeline);
            Ok(())
        })?;
        tracing::info!(%id, path = %self.path.display(), "take archived");
        Ok(())
    }

    fn remove(&mut self, id: TimelineId) -> Result<Timeline, ArchiveError> {
        let removed = self.commit(|entries| take_out(entries, id))?;
        tracing::info!(%id, "take removed from archive");
        Ok(removed)
    }

    fn update_name_and_annotation(
        &mut self,
        id: TimelineId,
        name: String,
        annotation: Option<String>,
    ) -> Result<(), ArchiveError> {
        self.commit(|entries| relabel(entries, id, name, annotation))
    }

    fn get(&self, id: TimelineId) -> Result<Timeline, ArchiveError> {
        self.entries
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ArchiveError::NotFound(id))
    }
}
