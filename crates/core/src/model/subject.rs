use std::collections::HashSet;

use thiserror::Error;

use crate::catalog::SubjectIcon;
use crate::model::ids::{MarkerId, SubjectId};
use crate::progress;

/// Longest subject name accepted by the editor, in characters.
pub const MAX_NAME_CHARS: usize = 50;
/// Longest level marker label accepted by the editor, in characters.
pub const MAX_LABEL_CHARS: usize = 20;
/// Upper bound for target and marker hours.
pub const MAX_HOURS: f64 = 9999.0;
/// Maximum number of level markers per subject.
pub const MAX_LEVEL_MARKERS: usize = 5;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Structural problems found when rebuilding a subject from storage.
///
/// These are deliberately looser than editor validation: a record that was
/// valid when written stays loadable even if, for instance, its target was
/// later lowered below one of its markers.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject id cannot be empty")]
    EmptyId,

    #[error("level marker id cannot be empty")]
    EmptyMarkerId,

    #[error("total hours must be a finite, non-negative number (got {0})")]
    InvalidTotalHours(f64),

    #[error("target hours must be a finite, positive number (got {0})")]
    InvalidTargetHours(f64),

    #[error("level marker hours must be a finite number (got {0})")]
    InvalidMarkerHours(f64),

    #[error("duplicate level marker id: {0}")]
    DuplicateMarkerId(String),
}

//
// ─── LEVEL MARKER ──────────────────────────────────────────────────────────────
//

/// A labeled milestone at a specific hour count within a subject's target.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelMarker {
    id: MarkerId,
    label: String,
    hours: f64,
}

impl LevelMarker {
    pub(crate) fn new(id: MarkerId, label: String, hours: f64) -> Self {
        Self { id, label, hours }
    }

    /// Rebuild a marker read back from storage.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if the id is blank or the hours are not finite.
    pub fn from_persisted(
        id: MarkerId,
        label: impl Into<String>,
        hours: f64,
    ) -> Result<Self, SubjectError> {
        if id.as_str().trim().is_empty() {
            return Err(SubjectError::EmptyMarkerId);
        }
        if !hours.is_finite() {
            return Err(SubjectError::InvalidMarkerHours(hours));
        }
        Ok(Self {
            id,
            label: label.into(),
            hours,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &MarkerId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn hours(&self) -> f64 {
        self.hours
    }
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// A user-defined topic of study with a progress goal.
///
/// New subjects are produced by [`crate::editor::SubjectEditor`]; the only
/// mutation available afterwards is [`StudySubject::log_hours`].
#[derive(Debug, Clone, PartialEq)]
pub struct StudySubject {
    id: SubjectId,
    name: String,
    color: String,
    icon: String,
    total_hours: f64,
    target_hours: f64,
    level_markers: Vec<LevelMarker>,
}

impl StudySubject {
    pub(crate) fn new(
        id: SubjectId,
        name: String,
        color: String,
        icon: String,
        total_hours: f64,
        target_hours: f64,
        level_markers: Vec<LevelMarker>,
    ) -> Self {
        Self {
            id,
            name,
            color,
            icon,
            total_hours,
            target_hours,
            level_markers,
        }
    }

    /// Rebuild a subject read back from storage.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` when the record is structurally unusable: a
    /// blank id, a negative or non-finite total, a non-positive target, or
    /// duplicate marker ids.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SubjectId,
        name: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
        total_hours: f64,
        target_hours: f64,
        level_markers: Vec<LevelMarker>,
    ) -> Result<Self, SubjectError> {
        if id.as_str().trim().is_empty() {
            return Err(SubjectError::EmptyId);
        }
        if !total_hours.is_finite() || total_hours < 0.0 {
            return Err(SubjectError::InvalidTotalHours(total_hours));
        }
        if !target_hours.is_finite() || target_hours <= 0.0 {
            return Err(SubjectError::InvalidTargetHours(target_hours));
        }
        let mut seen = HashSet::with_capacity(level_markers.len());
        for marker in &level_markers {
            if !seen.insert(marker.id().as_str()) {
                return Err(SubjectError::DuplicateMarkerId(marker.id().to_string()));
            }
        }

        Ok(Self::new(
            id,
            name.into(),
            color.into(),
            icon.into(),
            total_hours,
            target_hours,
            level_markers,
        ))
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// The raw icon key as stored.
    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// The icon key resolved against the catalog, falling back to the default.
    #[must_use]
    pub fn icon_kind(&self) -> SubjectIcon {
        SubjectIcon::resolve(&self.icon)
    }

    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.total_hours
    }

    #[must_use]
    pub fn target_hours(&self) -> f64 {
        self.target_hours
    }

    #[must_use]
    pub fn level_markers(&self) -> &[LevelMarker] {
        &self.level_markers
    }

    /// Progress towards the target, in percent, capped at 100.
    #[must_use]
    pub fn fill_percentage(&self) -> f64 {
        progress::fill_percentage(self.total_hours, self.target_hours)
    }

    #[must_use]
    pub fn remaining_hours(&self) -> f64 {
        (self.target_hours - self.total_hours).max(0.0)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_hours >= self.target_hours
    }

    /// Markers whose hours have been reached by the current total.
    pub fn reached_markers(&self) -> impl Iterator<Item = &LevelMarker> {
        self.level_markers
            .iter()
            .filter(|m| m.hours <= self.total_hours)
    }

    /// The lowest marker not yet reached, if any.
    #[must_use]
    pub fn next_marker(&self) -> Option<&LevelMarker> {
        self.level_markers
            .iter()
            .filter(|m| m.hours > self.total_hours)
            .min_by(|a, b| a.hours.total_cmp(&b.hours))
    }

    /// Add logged study time, clamping the total at the target.
    ///
    /// Returns the hours actually added, which is smaller than `hours` when
    /// the clamp kicks in and zero once the target is reached. Non-positive
    /// or non-finite input is ignored.
    pub fn log_hours(&mut self, hours: f64) -> f64 {
        if !hours.is_finite() || hours <= 0.0 {
            return 0.0;
        }
        let before = self.total_hours;
        self.total_hours = self.target_hours.min(self.total_hours + hours);
        (self.total_hours - before).max(0.0)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
