use valley_core::editor::{EditorError, MarkerDraft, SubjectDraft, SubjectEditor};
use valley_core::model::StudySubject;

fn seed_draft(
    name: &str,
    color: &str,
    icon: &str,
    total_hours: f64,
    target_hours: f64,
    markers: [(&str, f64); 3],
) -> SubjectDraft {
    SubjectDraft {
        id: None,
        total_hours: Some(total_hours),
        name: name.to_string(),
        color: color.to_string(),
        icon: icon.to_string(),
        target_hours,
        level_markers: markers
            .into_iter()
            .map(|(label, hours)| MarkerDraft::new(label, hours))
            .collect(),
    }
}

/// The example subjects shown on first launch.
#[must_use]
pub fn seed_drafts() -> Vec<SubjectDraft> {
    vec![
        seed_draft(
            "Programming",
            "#ADD8E6",
            "Code2",
            25.0,
            200.0,
            [("Basics", 50.0), ("Advanced", 120.0), ("Expert", 200.0)],
        ),
        seed_draft(
            "Illustration",
            "#E6E6FA",
            "Palette",
            70.0,
            150.0,
            [("Beginner", 40.0), ("Intermediate", 90.0), ("Pro", 150.0)],
        ),
        seed_draft(
            "Guitar",
            "#FFDAB9",
            "Music2",
            5.0,
            100.0,
            [("Chords", 20.0), ("Songs", 60.0), ("Mastery", 100.0)],
        ),
    ]
}

/// Runs the seed drafts through the editor, assigning fresh ids.
///
/// # Errors
///
/// Returns `EditorError` if a seed draft fails validation.
pub fn seed_subjects(editor: &SubjectEditor) -> Result<Vec<StudySubject>, EditorError> {
    seed_drafts()
        .into_iter()
        .map(|draft| editor.submit(draft))
        .collect()
}
