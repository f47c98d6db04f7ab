//! Flat-file persistence.
//!
//! All projects share one CSV with a single header row. The store is
//! denormalized: every row repeats its project's metadata, so a load
//! re-verifies that the metadata agrees across rows and fails with
//! `CorruptData` when it does not. Row order is append order; nothing ever
//! rewrites history except wholesale project deletion.
//!
//! Columns, exactly: `Project ID, Timestamp, Words Remaining, Start Date,
//! Goal Date, Word Goal`. Timestamps are RFC 3339 UTC; dates are ISO 8601.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::project::{ProjectMetadata, Sample};

const EXPECTED_HEADER: [&str; 6] = [
    "Project ID",
    "Timestamp",
    "Words Remaining",
    "Start Date",
    "Goal Date",
    "Word Goal",
];

/// One persisted row: a sample plus its project's repeated metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SampleRow {
    #[serde(rename = "Project ID")]
    project_id: String,
    #[serde(rename = "Timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "Words Remaining")]
    words_remaining: i64,
    #[serde(rename = "Start Date")]
    start_date: NaiveDate,
    #[serde(rename = "Goal Date")]
    goal_date: NaiveDate,
    #[serde(rename = "Word Goal")]
    word_goal: i64,
}

impl SampleRow {
    fn new(metadata: &ProjectMetadata, sample: &Sample) -> Self {
        Self {
            project_id: metadata.project_id.clone(),
            timestamp: sample.timestamp,
            words_remaining: sample.words_remaining,
            start_date: metadata.start_date,
            goal_date: metadata.goal_date,
            word_goal: metadata.word_goal,
        }
    }

    fn metadata(&self) -> ProjectMetadata {
        ProjectMetadata {
            project_id: self.project_id.clone(),
            start_date: self.start_date,
            goal_date: self.goal_date,
            word_goal: self.word_goal,
        }
    }

    fn sample(&self) -> Sample {
        Sample {
            timestamp: self.timestamp,
            words_remaining: self.words_remaining,
        }
    }
}

/// CSV-backed store for every project's samples.
///
/// The data-file path is injected at construction; the store never assumes a
/// working-directory-relative filename.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every distinct project id, sorted. Empty when the file does not exist.
    pub fn list_project_ids(&self) -> Result<BTreeSet<String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }
        let rows = self.read_rows()?;
        Ok(rows.into_iter().map(|row| row.project_id).collect())
    }

    /// Full row set for one project, in file (and therefore append) order.
    ///
    /// Returns `None` when the id is absent or the file does not exist yet.
    /// Fails with `CorruptData` when metadata fields disagree across the
    /// project's rows.
    pub fn load_project(
        &self,
        project_id: &str,
    ) -> Result<Option<(ProjectMetadata, Vec<Sample>)>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut metadata: Option<ProjectMetadata> = None;
        let mut samples = Vec::new();
        for row in self.read_rows()? {
            if row.project_id != project_id {
                continue;
            }
            let row_metadata = row.metadata();
            match &metadata {
                None => metadata = Some(row_metadata),
                Some(first) if *first != row_metadata => {
                    return Err(StoreError::corrupt(
                        &self.path,
                        format!(
                            "metadata disagrees across rows for project '{project_id}': \
                             {first:?} vs {row_metadata:?}"
                        ),
                    ));
                }
                Some(_) => {}
            }
            samples.push(row.sample());
        }

        Ok(metadata.map(|m| (m, samples)))
    }

    /// Like `load_project`, but selecting an absent project is an error.
    pub fn open_project(
        &self,
        project_id: &str,
    ) -> Result<(ProjectMetadata, Vec<Sample>), StoreError> {
        self.load_project(project_id)?
            .ok_or_else(|| StoreError::NotFound {
                project_id: project_id.to_string(),
            })
    }

    /// Append one or more samples for a project, creating the file (with its
    /// header row) on first use. Existing rows are never reordered or
    /// rewritten.
    pub fn append_samples(
        &self,
        metadata: &ProjectMetadata,
        samples: &[Sample],
    ) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        }

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for sample in samples {
            writer
                .serialize(SampleRow::new(metadata, sample))
                .map_err(|e| self.classify(e))?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            project_id = %metadata.project_id,
            appended = samples.len(),
            path = %self.path.display(),
            "appended samples"
        );
        Ok(())
    }

    /// Remove every row belonging to `project_id`, leaving all other rows in
    /// their original order. A no-op when the id (or the file) is absent, so
    /// deletion is idempotent.
    pub fn delete_project(&self, project_id: &str) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }

        let rows = self.read_rows()?;
        if !rows.iter().any(|row| row.project_id == project_id) {
            return Ok(());
        }

        let kept: Vec<SampleRow> = rows
            .into_iter()
            .filter(|row| row.project_id != project_id)
            .collect();

        let mut writer = csv::Writer::from_path(&self.path).map_err(|e| self.classify(e))?;
        if kept.is_empty() {
            // serde-driven header emission needs at least one record, so
            // write the header record explicitly for an otherwise empty file.
            writer
                .write_record(EXPECTED_HEADER)
                .map_err(|e| self.classify(e))?;
        }
        for row in kept {
            writer.serialize(row).map_err(|e| self.classify(e))?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(project_id, path = %self.path.display(), "deleted project rows");
        Ok(())
    }

    fn read_rows(&self) -> Result<Vec<SampleRow>, StoreError> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| self.classify(e))?;

        let header = reader.headers().map_err(|e| self.classify(e))?;
        if header.iter().ne(EXPECTED_HEADER) {
            return Err(StoreError::corrupt(
                &self.path,
                format!("unexpected header row: {header:?}"),
            ));
        }

        let mut rows = Vec::new();
        for row in reader.deserialize::<SampleRow>() {
            rows.push(row.map_err(|e| self.classify(e))?);
        }
        Ok(rows)
    }

    /// Underlying i/o failures stay `Io`; everything else (wrong column
    /// count, unparseable timestamps, non-numeric counts) is `CorruptData`.
    fn classify(&self, err: csv::Error) -> StoreError {
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => StoreError::Io {
                path: self.path.clone(),
                source,
            },
            _ => StoreError::CorruptData {
                path: self.path.clone(),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use crate::error::StoreError;
    use crate::project::{ProjectMetadata, Sample};

    use super::Store;

    fn metadata(id: &str) -> ProjectMetadata {
        ProjectMetadata::new(
            id,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
            10_000,
        )
        .expect("valid metadata")
    }

    fn sample(day: u32, words_remaining: i64) -> Sample {
        Sample {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 20, 0, 0).unwrap(),
            words_remaining,
        }
    }

    #[test]
    fn list_is_empty_when_file_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("missing.csv"));
        assert!(store.list_project_ids().expect("list").is_empty());
    }

    #[test]
    fn first_append_creates_file_with_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        let store = Store::new(&path);

        store
            .append_samples(&metadata("novel"), &[sample(1, 10_000)])
            .expect("append");

        let raw = fs::read_to_string(&path).expect("read");
        let mut lines = raw.lines();
        assert_eq!(
            lines.next(),
            Some("Project ID,Timestamp,Words Remaining,Start Date,Goal Date,Word Goal")
        );
        assert_eq!(lines.clone().count(), 1);
        assert!(lines.next().unwrap().starts_with("novel,2024-01-01T20:00:00"));
    }

    #[test]
    fn append_to_existing_file_does_not_repeat_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("data.csv"));
        let meta = metadata("novel");

        store.append_samples(&meta, &[sample(1, 10_000)]).expect("first");
        store.append_samples(&meta, &[sample(2, 9_000)]).expect("second");

        let raw = fs::read_to_string(store.path()).expect("read");
        let headers = raw
            .lines()
            .filter(|line| line.starts_with("Project ID"))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(raw.lines().count(), 3);
    }

    #[test]
    fn load_ignores_other_projects_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("data.csv"));

        store.append_samples(&metadata("a"), &[sample(1, 10_000)]).expect("a1");
        store.append_samples(&metadata("b"), &[sample(1, 10_000)]).expect("b1");
        store.append_samples(&metadata("a"), &[sample(2, 8_000)]).expect("a2");
        store.append_samples(&metadata("b"), &[sample(3, 7_500)]).expect("b2");

        let (meta, samples) = store.load_project("a").expect("load").expect("present");
        assert_eq!(meta.project_id, "a");
        assert_eq!(
            samples,
            vec![sample(1, 10_000), sample(2, 8_000)],
            "rows must come back in append order, without b's rows"
        );
    }

    #[test]
    fn load_absent_project_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("data.csv"));
        store
            .append_samples(&metadata("novel"), &[sample(1, 10_000)])
            .expect("append");

        assert!(store.load_project("essay").expect("load").is_none());
        assert!(
            Store::new(dir.path().join("other.csv"))
                .load_project("novel")
                .expect("load")
                .is_none()
        );
    }

    #[test]
    fn open_project_fails_on_absent_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("data.csv"));
        store
            .append_samples(&metadata("novel"), &[sample(1, 10_000)])
            .expect("append");

        let err = store.open_project("essay").expect_err("absent id must fail");
        assert!(matches!(err, StoreError::NotFound { ref project_id } if project_id == "essay"));
    }

    #[test]
    fn metadata_disagreement_is_corrupt_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        fs::write(
            &path,
            "Project ID,Timestamp,Words Remaining,Start Date,Goal Date,Word Goal\n\
             novel,2024-01-01T00:00:00Z,10000,2024-01-01,2024-01-11,10000\n\
             novel,2024-01-02T00:00:00Z,9000,2024-01-01,2024-01-12,10000\n",
        )
        .expect("seed");

        let err = Store::new(&path)
            .load_project("novel")
            .expect_err("disagreeing goal dates must fail");
        assert!(matches!(err, StoreError::CorruptData { .. }));
    }

    #[test]
    fn non_numeric_word_count_is_corrupt_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        fs::write(
            &path,
            "Project ID,Timestamp,Words Remaining,Start Date,Goal Date,Word Goal\n\
             novel,2024-01-01T00:00:00Z,lots,2024-01-01,2024-01-11,10000\n",
        )
        .expect("seed");

        let err = Store::new(&path)
            .load_project("novel")
            .expect_err("non-numeric count must fail");
        assert!(matches!(err, StoreError::CorruptData { .. }));
    }

    #[test]
    fn wrong_header_is_corrupt_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        fs::write(&path, "Id,When,Left\nnovel,2024-01-01T00:00:00Z,10\n").expect("seed");

        let err = Store::new(&path)
            .list_project_ids()
            .expect_err("foreign schema must fail");
        assert!(matches!(err, StoreError::CorruptData { .. }));
    }

    #[test]
    fn delete_removes_only_the_named_project() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("data.csv"));

        store.append_samples(&metadata("a"), &[sample(1, 10_000)]).expect("a1");
        store.append_samples(&metadata("b"), &[sample(1, 10_000), sample(2, 9_000)]).expect("b");
        store.append_samples(&metadata("a"), &[sample(3, 6_000)]).expect("a2");

        store.delete_project("a").expect("delete");

        let ids = store.list_project_ids().expect("list");
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["b".to_string()]);
        let (_, samples) = store.load_project("b").expect("load").expect("b remains");
        assert_eq!(samples, vec![sample(1, 10_000), sample(2, 9_000)]);
    }

    #[test]
    fn delete_of_absent_project_leaves_file_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("data.csv"));
        store
            .append_samples(&metadata("novel"), &[sample(1, 10_000)])
            .expect("append");

        let before = fs::read_to_string(store.path()).expect("read");
        store.delete_project("ghost").expect("idempotent delete");
        let after = fs::read_to_string(store.path()).expect("read");
        assert_eq!(before, after, "no-op delete must not rewrite the file");

        // Absent file is also fine.
        Store::new(store.path().join("nope.csv"))
            .delete_project("ghost")
            .expect("delete against missing file");
    }

    #[test]
    fn delete_last_project_leaves_header_only_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("data.csv"));
        store
            .append_samples(&metadata("novel"), &[sample(1, 10_000)])
            .expect("append");

        store.delete_project("novel").expect("delete");
        assert!(store.list_project_ids().expect("list").is_empty());

        // And the store keeps working for new appends afterwards.
        store
            .append_samples(&metadata("essay"), &[sample(2, 10_000)])
            .expect("append after wipe");
        let raw = fs::read_to_string(store.path()).expect("read");
        assert_eq!(raw.lines().count(), 2);
    }
}
