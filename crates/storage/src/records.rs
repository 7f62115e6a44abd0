use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use valley_core::model::{LevelMarker, MarkerId, StudySubject, SubjectError, SubjectId};

/// Persisted shape of a level marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelMarkerRecord {
    pub id: String,
    pub label: String,
    pub hours: f64,
}

/// Persisted shape for a subject.
///
/// Field names follow the stored JSON layout (`totalHours`, `levelMarkers`,
/// ...), keeping the domain `StudySubject` free of storage concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub total_hours: f64,
    pub target_hours: f64,
    pub level_markers: Vec<LevelMarkerRecord>,
}

impl SubjectRecord {
    #[must_use]
    pub fn from_subject(subject: &StudySubject) -> Self {
        Self {
            id: subject.id().to_string(),
            name: subject.name().to_owned(),
            color: subject.color().to_owned(),
            icon: subject.icon().to_owned(),
            total_hours: subject.total_hours(),
            target_hours: subject.target_hours(),
            level_markers: subject
                .level_markers()
                .iter()
                .map(|m| LevelMarkerRecord {
                    id: m.id().to_string(),
                    label: m.label().to_owned(),
                    hours: m.hours(),
                })
                .collect(),
        }
    }

    /// Convert the record back into a domain `StudySubject`.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if the record is structurally unusable.
    pub fn into_subject(self) -> Result<StudySubject, SubjectError> {
        let level_markers = self
            .level_markers
            .into_iter()
            .map(|m| LevelMarker::from_persisted(MarkerId::new(m.id), m.label, m.hours))
            .collect::<Result<Vec<_>, _>>()?;

        StudySubject::from_persisted(
            SubjectId::new(self.id),
            self.name,
            self.color,
            self.icon,
            self.total_hours,
            self.target_hours,
            level_markers,
        )
    }
}

/// Why a stored collection could not be turned back into subjects.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("subject #{index} is invalid: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: SubjectError,
    },

    #[error("duplicate subject id: {0}")]
    DuplicateId(String),
}

/// Parse and validate a stored collection.
///
/// # Errors
///
/// Returns `DecodeError` for malformed JSON, structurally invalid records, or
/// repeated subject ids.
pub fn decode_collection(raw: &str) -> Result<Vec<StudySubject>, DecodeError> {
    let records: Vec<SubjectRecord> = serde_json::from_str(raw)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut subjects = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        if !seen.insert(record.id.clone()) {
            return Err(DecodeError::DuplicateId(record.id));
        }
        let subject = record
            .into_subject()
            .map_err(|source| DecodeError::Invalid { index, source })?;
        subjects.push(subject);
    }
    Ok(subjects)
}

/// Serialize the whole collection as a JSON array.
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn encode_collection(subjects: &[StudySubject]) -> Result<String, serde_json::Error> {
    let records: Vec<SubjectRecord> = subjects.iter().map(SubjectRecord::from_subject).collect();
    serde_json::to_string(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use valley_core::IdSource;
    use valley_core::editor::{MarkerDraft, SubjectDraft, SubjectEditor};

    fn sample() -> Vec<StudySubject> {
        let editor = SubjectEditor::new(IdSource::sequence("r"));
        let mut a = SubjectDraft::blank();
        a.name = "Programming".into();
        a.total_hours = Some(25.5);
        a.target_hours = 200.0;
        a.level_markers = vec![
            MarkerDraft::new("Basics", 50.0),
            MarkerDraft::new("Expert", 200.0),
        ];
        let mut b = SubjectDraft::blank();
        b.name = "Guitar".into();
        b.level_markers.clear();
        vec![editor.submit(a).unwrap(), editor.submit(b).unwrap()]
    }

    #[test]
    fn encode_then_decode_is_lossless() {
        let subjects = sample();
        let raw = encode_collection(&subjects).unwrap();
        let decoded = decode_collection(&raw).unwrap();
        assert_eq!(decoded, subjects);
    }

    #[test]
    fn encodes_camel_case_layout() {
        let raw = encode_collection(&sample()[..1]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], "r-1");
        assert_eq!(first["totalHours"], 25.5);
        assert_eq!(first["targetHours"], 200.0);
        assert_eq!(first["levelMarkers"][0]["label"], "Basics");
        assert_eq!(first["levelMarkers"][0]["hours"], 50.0);
    }

    #[test]
    fn decodes_integer_hours_written_by_other_clients() {
        let raw = r##"[{"id":"a","name":"Guitar","color":"#FFDAB9","icon":"Music2",
            "totalHours":5,"targetHours":100,
            "levelMarkers":[{"id":"m","label":"Chords","hours":20}]}]"##;
        let decoded = decode_collection(raw).unwrap();
        assert_eq!(decoded.len(), 1);
        assert!((decoded[0].level_markers()[0].hours() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_missing_fields_and_duplicates() {
        let missing = r#"[{"id":"a","name":"Guitar"}]"#;
        assert!(matches!(decode_collection(missing), Err(DecodeError::Json(_))));

        let dup = r##"[
            {"id":"a","name":"A","color":"#000000","icon":"Star","totalHours":0,"targetHours":1,"levelMarkers":[]},
            {"id":"a","name":"B","color":"#000000","icon":"Star","totalHours":0,"targetHours":1,"levelMarkers":[]}
        ]"##;
        assert!(matches!(decode_collection(dup), Err(DecodeError::DuplicateId(id)) if id == "a"));

        let negative = r##"[{"id":"a","name":"A","color":"#000000","icon":"Star","totalHours":-1,"targetHours":1,"levelMarkers":[]}]"##;
        assert!(matches!(
            decode_collection(negative),
            Err(DecodeError::Invalid { index: 0, .. })
        ));
    }
}
