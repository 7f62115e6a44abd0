//! Fixed keys of the key-value layout.

/// Whole subject collection, serialized as a JSON array.
pub const SUBJECTS_KEY: &str = "studyValleySubjects";

/// Raw copy of a collection value that failed to load.
pub const CORRUPT_SUBJECTS_KEY: &str = "studyValleySubjects.corrupt";

/// Theme preference, `"dark"` or `"light"`.
pub const THEME_KEY: &str = "theme";
