//! Subject editor: validates and normalizes raw form input into a
//! [`StudySubject`].
//!
//! The editor is pure apart from id generation, which goes through an
//! injected [`IdSource`]. Rejections are returned as [`EditorError`] and never
//! touch external state.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::catalog::{DEFAULT_ICON, DEFAULT_SUBJECT_COLOR};
use crate::id_source::IdSource;
use crate::model::{
    LevelMarker, MAX_HOURS, MAX_LABEL_CHARS, MAX_LEVEL_MARKERS, MAX_NAME_CHARS, MarkerId,
    StudySubject, SubjectId,
};

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// A level marker as typed into the form.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDraft {
    pub id: Option<MarkerId>,
    pub label: String,
    pub hours: f64,
}

impl MarkerDraft {
    #[must_use]
    pub fn new(label: impl Into<String>, hours: f64) -> Self {
        Self {
            id: None,
            label: label.into(),
            hours,
        }
    }
}

/// Candidate subject record.
///
/// `id` and `total_hours` are only set when editing an existing subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectDraft {
    pub id: Option<SubjectId>,
    pub total_hours: Option<f64>,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub target_hours: f64,
    pub level_markers: Vec<MarkerDraft>,
}

impl SubjectDraft {
    /// Form defaults for a brand-new subject.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            id: None,
            total_hours: None,
            name: String::new(),
            color: DEFAULT_SUBJECT_COLOR.to_string(),
            icon: DEFAULT_ICON.name().to_string(),
            target_hours: 100.0,
            level_markers: vec![MarkerDraft::new("Basic", 40.0)],
        }
    }

    /// Pre-fill a draft from an existing subject for editing.
    #[must_use]
    pub fn from_subject(subject: &StudySubject) -> Self {
        Self {
            id: Some(subject.id().clone()),
            total_hours: Some(subject.total_hours()),
            name: subject.name().to_string(),
            color: subject.color().to_string(),
            icon: subject.icon().to_string(),
            target_hours: subject.target_hours(),
            level_markers: subject
                .level_markers()
                .iter()
                .map(|m| MarkerDraft {
                    id: Some(m.id().clone()),
                    label: m.label().to_string(),
                    hours: m.hours(),
                })
                .collect(),
        }
    }

    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        for marker in &mut self.level_markers {
            marker.label = marker.label.trim().to_string();
        }
        self
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Location of a problem within a [`SubjectDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Name,
    Color,
    Icon,
    TargetHours,
    LevelMarkers,
    MarkerLabel(usize),
    MarkerHours(usize),
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Name => f.write_str("name"),
            FieldPath::Color => f.write_str("color"),
            FieldPath::Icon => f.write_str("icon"),
            FieldPath::TargetHours => f.write_str("targetHours"),
            FieldPath::LevelMarkers => f.write_str("levelMarkers"),
            FieldPath::MarkerLabel(i) => write!(f, "levelMarkers.{i}.label"),
            FieldPath::MarkerHours(i) => write!(f, "levelMarkers.{i}.hours"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: FieldPath,
    pub message: String,
}

/// Ordered field path → message list, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, path: FieldPath, message: impl Into<String>) {
        self.0.push(FieldError {
            path,
            message: message.into(),
        });
    }

    /// First message recorded for `path`.
    #[must_use]
    pub fn get(&self, path: FieldPath) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.path, err.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EditorError {
    #[error("invalid subject: {0}")]
    Fields(FieldErrors),

    #[error("Marker \"{label}\" ({hours}h) cannot exceed target hours ({target}h).")]
    MarkerExceedsTarget {
        index: usize,
        label: String,
        hours: f64,
        target: f64,
    },
}

impl EditorError {
    /// Flattens any rejection into the field path → message shape.
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            EditorError::Fields(errors) => errors.clone(),
            EditorError::MarkerExceedsTarget { index, .. } => {
                let mut errors = FieldErrors::default();
                errors.push(FieldPath::MarkerHours(*index), self.to_string());
                errors
            }
        }
    }
}

//
// ─── VALIDATION ────────────────────────────────────────────────────────────────
//

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn check_hours(
    errors: &mut FieldErrors,
    path: FieldPath,
    hours: f64,
    positive_message: &'static str,
) {
    if !hours.is_finite() {
        errors.push(path, "Expected a number");
    } else if hours <= 0.0 {
        errors.push(path, positive_message);
    } else if hours > MAX_HOURS {
        errors.push(path, "Max 9999 hours");
    }
}

/// Per-field checks. Marker uniqueness only runs once every marker is
/// individually valid, and label uniqueness is reported ahead of hours.
fn check_fields(draft: &SubjectDraft) -> FieldErrors {
    let mut errors = FieldErrors::default();

    let name_len = draft.name.chars().count();
    if name_len == 0 {
        errors.push(FieldPath::Name, "Name is required");
    } else if name_len > MAX_NAME_CHARS {
        errors.push(FieldPath::Name, "Name too long");
    }

    if !is_hex_color(&draft.color) {
        errors.push(FieldPath::Color, "Invalid color format");
    }

    if draft.icon.is_empty() {
        errors.push(FieldPath::Icon, "Icon is required");
    }

    check_hours(
        &mut errors,
        FieldPath::TargetHours,
        draft.target_hours,
        "Target hours must be positive",
    );

    if draft.level_markers.len() > MAX_LEVEL_MARKERS {
        errors.push(FieldPath::LevelMarkers, "Maximum 5 level markers");
    }
    let before_markers = errors.len();
    for (i, marker) in draft.level_markers.iter().enumerate() {
        let label_len = marker.label.chars().count();
        if label_len == 0 {
            errors.push(FieldPath::MarkerLabel(i), "Label is required");
        } else if label_len > MAX_LABEL_CHARS {
            errors.push(FieldPath::MarkerLabel(i), "Label too long");
        }
        check_hours(
            &mut errors,
            FieldPath::MarkerHours(i),
            marker.hours,
            "Hours must be positive",
        );
    }

    if errors.len() == before_markers {
        let mut labels = HashSet::with_capacity(draft.level_markers.len());
        let labels_unique = draft
            .level_markers
            .iter()
            .all(|m| labels.insert(m.label.to_lowercase()));
        if !labels_unique {
            errors.push(
                FieldPath::LevelMarkers,
                "Level marker labels must be unique.",
            );
        } else {
            let mut hours = HashSet::with_capacity(draft.level_markers.len());
            let hours_unique = draft
                .level_markers
                .iter()
                .all(|m| hours.insert(m.hours.to_bits()));
            if !hours_unique {
                errors.push(
                    FieldPath::LevelMarkers,
                    "Level marker hours must be unique.",
                );
            }
        }
    }

    errors
}

/// Runs every editor rule against a draft without producing a subject.
///
/// # Errors
///
/// Returns `EditorError::Fields` for per-field problems, or
/// `EditorError::MarkerExceedsTarget` when the fields are valid but a marker
/// lies beyond the target.
pub fn validate(draft: &SubjectDraft) -> Result<(), EditorError> {
    let errors = check_fields(draft);
    if !errors.is_empty() {
        return Err(EditorError::Fields(errors));
    }

    if let Some((index, marker)) = draft
        .level_markers
        .iter()
        .enumerate()
        .find(|(_, m)| m.hours > draft.target_hours)
    {
        return Err(EditorError::MarkerExceedsTarget {
            index,
            label: marker.label.clone(),
            hours: marker.hours,
            target: draft.target_hours,
        });
    }

    Ok(())
}

//
// ─── EDITOR ────────────────────────────────────────────────────────────────────
//

/// Turns drafts into finalized subjects.
#[derive(Debug, Clone, Default)]
pub struct SubjectEditor {
    ids: IdSource,
}

impl SubjectEditor {
    #[must_use]
    pub fn new(ids: IdSource) -> Self {
        Self { ids }
    }

    /// Validate, normalize and finalize a draft.
    ///
    /// Assigns a fresh subject id when the draft has none, keeps the draft's
    /// `total_hours` when editing (zero otherwise), and gives every marker
    /// without a usable id a fresh one.
    ///
    /// # Errors
    ///
    /// Returns `EditorError` if any rule fails; nothing is generated in that
    /// case.
    pub fn submit(&self, draft: SubjectDraft) -> Result<StudySubject, EditorError> {
        let draft = draft.normalized();
        validate(&draft)?;

        let id = draft
            .id
            .filter(|id| !id.as_str().trim().is_empty())
            .unwrap_or_else(|| self.ids.next_subject_id());
        let total_hours = draft
            .total_hours
            .filter(|h| h.is_finite() && *h >= 0.0)
            .unwrap_or(0.0);

        let mut seen = HashSet::with_capacity(draft.level_markers.len());
        let level_markers = draft
            .level_markers
            .into_iter()
            .map(|m| {
                let id = m
                    .id
                    .filter(|id| !id.as_str().trim().is_empty())
                    .filter(|id| seen.insert(id.clone()))
                    .unwrap_or_else(|| self.ids.next_marker_id());
                LevelMarker::new(id, m.label, m.hours)
            })
            .collect();

        Ok(StudySubject::new(
            id,
            draft.name,
            draft.color,
            draft.icon,
            total_hours,
            draft.target_hours,
            level_markers,
        ))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
