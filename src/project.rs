//! In-memory project state.
//!
//! A project is immutable metadata plus an append-only sequence of samples.
//! The first sample always carries `words_remaining == word_goal`; every
//! later one is derived from the writer's reported running total. Nothing in
//! a sequence is ever edited in place; a correction is just another sample.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::schedule;

/// Fixed-at-creation project attributes, repeated on every persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub project_id: String,
    pub start_date: NaiveDate,
    pub goal_date: NaiveDate,
    pub word_goal: i64,
}

impl ProjectMetadata {
    /// Build and validate metadata for a new project.
    ///
    /// The goal date must fall strictly after the start date so the ideal
    /// line has a positive slope, and the word goal must be non-negative.
    pub fn new(
        project_id: impl Into<String>,
        start_date: NaiveDate,
        goal_date: NaiveDate,
        word_goal: i64,
    ) -> Result<Self, SessionError> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(SessionError::InvalidInput {
                message: "project id must not be empty".to_string(),
            });
        }
        if word_goal < 0 {
            return Err(SessionError::InvalidInput {
                message: format!("word goal must be non-negative, got {word_goal}"),
            });
        }
        if goal_date <= start_date {
            return Err(SessionError::InvalidRange {
                message: format!(
                    "goal date {goal_date} must be strictly after start date {start_date}"
                ),
            });
        }
        Ok(Self {
            project_id,
            start_date,
            goal_date,
            word_goal,
        })
    }

    /// Midnight UTC on the start date, the timestamp a seed sample gets when
    /// the writer picked an explicit start date.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start_date.and_time(NaiveTime::MIN).and_utc()
    }
}

/// One timestamped observation of words-remaining.
///
/// `words_remaining` may legitimately go negative (the writer blew past the
/// goal) or increase (the writer cut words in an edit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub words_remaining: i64,
}

/// Derived progress view; computed on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub words_remaining: i64,
    pub fraction_complete: f64,
    pub ahead_of_schedule: bool,
}

/// One project held in memory for the lifetime of an interactive session.
#[derive(Debug, Clone)]
pub struct ProjectSession {
    metadata: ProjectMetadata,
    samples: Vec<Sample>,
}

impl ProjectSession {
    /// Start a brand-new project with a single seed sample at `started_at`.
    ///
    /// Callers pass midnight on the chosen start date, or the current instant
    /// when the writer gave no explicit start date.
    pub fn create(metadata: ProjectMetadata, started_at: DateTime<Utc>) -> Self {
        let seed = Sample {
            timestamp: started_at,
            words_remaining: metadata.word_goal,
        };
        Self {
            metadata,
            samples: vec![seed],
        }
    }

    /// Wrap previously persisted data without modification.
    pub fn hydrate(metadata: ProjectMetadata, samples: Vec<Sample>) -> Result<Self, SessionError> {
        if samples.is_empty() {
            return Err(SessionError::InvalidInput {
                message: format!(
                    "persisted project '{}' has no samples",
                    metadata.project_id
                ),
            });
        }
        Ok(Self { metadata, samples })
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn last_sample(&self) -> &Sample {
        // Both constructors guarantee at least one sample.
        &self.samples[self.samples.len() - 1]
    }

    /// The running total the writer last reported.
    pub fn last_reported_total(&self) -> i64 {
        self.metadata.word_goal - self.last_sample().words_remaining
    }

    /// Record a new running total and return the appended sample for
    /// persistence.
    ///
    /// The remaining count is always `word_goal - current_total`, independent
    /// of prior history. No monotonicity is enforced; totals can shrink after
    /// an edit pass.
    pub fn record_progress(&mut self, current_total_words_written: i64) -> Sample {
        self.record_progress_at(current_total_words_written, Utc::now())
    }

    pub fn record_progress_at(
        &mut self,
        current_total_words_written: i64,
        at: DateTime<Utc>,
    ) -> Sample {
        let sample = Sample {
            timestamp: at,
            words_remaining: self.metadata.word_goal - current_total_words_written,
        };
        self.samples.push(sample);
        sample
    }

    /// Current standing against the ideal line, evaluated now.
    pub fn current_progress(&self) -> Progress {
        self.current_progress_at(Utc::now())
    }

    pub fn current_progress_at(&self, now: DateTime<Utc>) -> Progress {
        let words_remaining = self.last_sample().words_remaining;
        let fraction_complete = if self.metadata.word_goal == 0 {
            1.0
        } else {
            (self.metadata.word_goal - words_remaining) as f64 / self.metadata.word_goal as f64
        };
        Progress {
            words_remaining,
            fraction_complete,
            ahead_of_schedule: schedule::on_schedule(
                self.metadata.start_date,
                self.metadata.goal_date,
                self.metadata.word_goal,
                words_remaining,
                now,
            ),
        }
    }
}
