//! Text and JSON rendering for command output.

use std::fmt::Write as _;

use serde_json::{Value, json};
use storage::records::SubjectRecord;
use valley_core::catalog::{PASTEL_COLORS, SubjectIcon, color_name};
use valley_core::editor::EditorError;
use valley_core::model::{StudySubject, Theme};
use valley_core::progress::{format_hours, marker_position};

const BAR_WIDTH: usize = 20;

/// Fixed-width progress tube, e.g. `[#####...............]`.
pub fn progress_bar(percentage: f64) -> String {
    let clamped = percentage.clamp(0.0, 100.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn headline(subject: &StudySubject) -> String {
    format!(
        "{} {}  {} {:>5.1}%  {} / {}",
        subject.icon_kind().glyph(),
        subject.name(),
        progress_bar(subject.fill_percentage()),
        subject.fill_percentage(),
        format_hours(subject.total_hours()),
        format_hours(subject.target_hours()),
    )
}

fn marker_lines(out: &mut String, subject: &StudySubject) {
    for marker in subject.level_markers() {
        let reached = marker.hours() <= subject.total_hours();
        let _ = writeln!(
            out,
            "    {} {} ({})",
            if reached { "✓" } else { "·" },
            marker.label(),
            format_hours(marker.hours()),
        );
    }
}

pub fn subject_list(subjects: &[StudySubject]) -> String {
    if subjects.is_empty() {
        return "No subjects yet. Create one with `study-valley create`.\n".to_string();
    }
    let mut out = String::new();
    for subject in subjects {
        let _ = writeln!(out, "{}", headline(subject));
        let _ = writeln!(out, "    id: {}", subject.id());
        marker_lines(&mut out, subject);
    }
    out
}

pub fn subject_detail(subject: &StudySubject) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", headline(subject));
    let _ = writeln!(out, "  id:        {}", subject.id());
    let _ = writeln!(
        out,
        "  color:     {}{}",
        subject.color(),
        color_name(subject.color()).map_or_else(String::new, |n| format!(" ({n})")),
    );
    let _ = writeln!(out, "  icon:      {}", subject.icon_kind().name());
    if subject.is_complete() {
        let _ = writeln!(out, "  status:    complete");
    } else {
        let _ = writeln!(
            out,
            "  remaining: {}",
            format_hours(subject.remaining_hours())
        );
    }
    if let Some(next) = subject.next_marker() {
        let _ = writeln!(
            out,
            "  next:      {} at {}",
            next.label(),
            format_hours(next.hours())
        );
    }
    if !subject.level_markers().is_empty() {
        let _ = writeln!(out, "  markers:");
        for marker in subject.level_markers() {
            let position =
                marker_position(marker.hours(), subject.target_hours()).unwrap_or(0.0);
            let reached = marker.hours() <= subject.total_hours();
            let _ = writeln!(
                out,
                "    {} {:<20} {:>8}  at {:.0}% of the tube",
                if reached { "✓" } else { "·" },
                marker.label(),
                format_hours(marker.hours()),
                position,
            );
        }
    }
    out
}

pub fn catalog_text() -> String {
    let mut out = String::from("Colors:\n");
    for color in PASTEL_COLORS {
        let _ = writeln!(out, "  {}  {}", color.value, color.name);
    }
    out.push_str("Icons:\n");
    for icon in SubjectIcon::ALL {
        let _ = writeln!(out, "  {}  {}", icon.glyph(), icon.name());
    }
    out
}

/// One line per field problem, in form order.
pub fn validation_message(err: &EditorError) -> String {
    let lines: Vec<String> = err
        .field_errors()
        .iter()
        .map(|e| format!("  {}: {}", e.path, e.message))
        .collect();
    format!("subject was not saved:\n{}", lines.join("\n"))
}

// ─── JSON ──────────────────────────────────────────────────────────────────────

pub fn subject_json(subject: &StudySubject) -> Value {
    let mut value = json!(SubjectRecord::from_subject(subject));
    if let Value::Object(map) = &mut value {
        map.insert("fillPercentage".into(), json!(subject.fill_percentage()));
        map.insert("isComplete".into(), json!(subject.is_complete()));
    }
    value
}

pub fn subjects_json(subjects: &[StudySubject]) -> Value {
    Value::Array(subjects.iter().map(subject_json).collect())
}

pub fn theme_json(theme: Theme) -> Value {
    json!({ "theme": theme.as_str() })
}

pub fn catalog_json() -> Value {
    json!({
        "colors": PASTEL_COLORS
            .iter()
            .map(|c| json!({ "name": c.name, "value": c.value }))
            .collect::<Vec<_>>(),
        "icons": SubjectIcon::ALL.iter().map(|i| i.name()).collect::<Vec<_>>(),
    })
}
