mod ids;
mod subject;
mod theme;

pub use ids::{MarkerId, ParseIdError, SubjectId};

pub use subject::{
    LevelMarker, MAX_HOURS, MAX_LABEL_CHARS, MAX_LEVEL_MARKERS, MAX_NAME_CHARS, StudySubject,
    SubjectError,
};
pub use theme::{ParseThemeError, Theme};
