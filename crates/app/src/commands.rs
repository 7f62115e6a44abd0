use anyhow::{Context, bail};
use log::debug;
use serde_json::{Value, json};
use services::{
    AddTimeOutcome, AppServices, IgnoredReason, Persistence, RemoveOutcome, StoreError,
    UpsertKind, UpsertOutcome,
};
use valley_core::editor::{MarkerDraft, SubjectDraft};
use valley_core::model::{StudySubject, SubjectId, Theme};
use valley_core::progress::{
    QUICK_ADD_HALF_HOUR, QUICK_ADD_HOUR, format_hours, parse_custom_hours,
};

use crate::cli::{
    AddTimeArgs, Commands, CreateArgs, EditArgs, MarkerArg, OutputFormat, ThemeAction,
};
use crate::render;

/// Run one parsed command against the assembled services.
pub async fn dispatch(
    command: Commands,
    app: &AppServices,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        Commands::List => {
            let subjects = app.subjects().subjects()?;
            emit(format, render::subjects_json(&subjects), || {
                render::subject_list(&subjects)
            });
        }
        Commands::Show { id } => {
            let subject = find(app, &id)?;
            emit(format, render::subject_json(&subject), || {
                render::subject_detail(&subject)
            });
        }
        Commands::Create(args) => {
            let outcome = submit(app, create_draft(args)).await?;
            report_upsert(format, &outcome);
        }
        Commands::Edit(args) => {
            let current = find(app, &args.id)?;
            let outcome = submit(app, edit_draft(&current, args)).await?;
            report_upsert(format, &outcome);
        }
        Commands::AddTime(args) => add_time(app, args, format).await?,
        Commands::Remove { id } => match app.subjects().remove(&id).await? {
            RemoveOutcome::Removed(persistence) => {
                warn_unsaved(&persistence);
                emit(format, json!({ "removed": id.as_str() }), || {
                    format!("Removed {id}\n")
                });
            }
            RemoveOutcome::NotFound => bail!("no subject with id {id}"),
        },
        Commands::Theme { action } => {
            let themes = app.theme();
            let theme = match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => themes.load().await?,
                ThemeAction::Dark => themes.set(Theme::Dark).await?,
                ThemeAction::Light => themes.set(Theme::Light).await?,
                ThemeAction::Toggle => themes.toggle().await?,
            };
            emit(format, render::theme_json(theme), || format!("{theme}\n"));
        }
        Commands::Catalog => emit(format, render::catalog_json(), render::catalog_text),
    }
    Ok(())
}

fn emit(format: OutputFormat, json: Value, text: impl FnOnce() -> String) {
    match format {
        OutputFormat::Json => println!("{json}"),
        OutputFormat::Text => print!("{}", text()),
    }
}

fn warn_unsaved(persistence: &Persistence) {
    if let Persistence::Failed(reason) = persistence {
        eprintln!("warning: change kept for this run only, saving failed: {reason}");
    }
}

fn find(app: &AppServices, id: &SubjectId) -> anyhow::Result<StudySubject> {
    app.subjects()
        .get(id)?
        .with_context(|| format!("no subject with id {id}"))
}

async fn submit(app: &AppServices, draft: SubjectDraft) -> anyhow::Result<UpsertOutcome> {
    match app.subjects().submit(draft).await {
        Ok(outcome) => Ok(outcome),
        Err(StoreError::Validation(err)) => bail!(render::validation_message(&err)),
        Err(err) => Err(err.into()),
    }
}

fn report_upsert(format: OutputFormat, outcome: &UpsertOutcome) {
    warn_unsaved(&outcome.persistence);
    let verb = match outcome.kind {
        UpsertKind::Created => "Created",
        UpsertKind::Updated => "Updated",
    };
    emit(format, render::subject_json(&outcome.subject), || {
        format!(
            "{verb} {}\n{}",
            outcome.subject.id(),
            render::subject_detail(&outcome.subject)
        )
    });
}

fn create_draft(args: CreateArgs) -> SubjectDraft {
    let mut draft = SubjectDraft::blank();
    draft.name = args.name;
    draft.target_hours = args.target;
    if let Some(color) = args.color {
        draft.color = color;
    }
    if let Some(icon) = args.icon {
        draft.icon = icon;
    }
    if args.no_markers {
        draft.level_markers.clear();
    } else if !args.markers.is_empty() {
        draft.level_markers = args.markers.into_iter().map(marker_draft).collect();
    }
    draft
}

/// Overlay the provided flags on the current subject. Replacement markers
/// whose label matches an existing one keep that marker's id.
fn edit_draft(current: &StudySubject, args: EditArgs) -> SubjectDraft {
    let mut draft = SubjectDraft::from_subject(current);
    if let Some(name) = args.name {
        draft.name = name;
    }
    if let Some(target) = args.target {
        draft.target_hours = target;
    }
    if let Some(color) = args.color {
        draft.color = color;
    }
    if let Some(icon) = args.icon {
        draft.icon = icon;
    }
    if args.clear_markers {
        draft.level_markers.clear();
    } else if !args.markers.is_empty() {
        draft.level_markers = args
            .markers
            .into_iter()
            .map(|arg| {
                let wanted = arg.label.trim().to_lowercase();
                let id = current
                    .level_markers()
                    .iter()
                    .find(|m| m.label().to_lowercase() == wanted)
                    .map(|m| m.id().clone());
                MarkerDraft {
                    id,
                    ..marker_draft(arg)
                }
            })
            .collect();
    }
    draft
}

fn marker_draft(arg: MarkerArg) -> MarkerDraft {
    MarkerDraft::new(arg.label, arg.hours)
}

async fn add_time(
    app: &AppServices,
    args: AddTimeArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let hours = if args.half_hour {
        Some(QUICK_ADD_HALF_HOUR)
    } else if args.hour {
        Some(QUICK_ADD_HOUR)
    } else {
        args.hours.as_deref().and_then(parse_custom_hours)
    };
    let Some(hours) = hours else {
        debug!("ignoring unparseable amount {:?}", args.hours);
        emit(format, json!({ "ignored": "invalid amount" }), || {
            "Nothing logged: enter a positive number of hours.\n".to_string()
        });
        return Ok(());
    };

    match app.subjects().add_time(&args.id, hours).await? {
        AddTimeOutcome::Updated {
            total_hours,
            added,
            persistence,
        } => {
            warn_unsaved(&persistence);
            let subject = find(app, &args.id)?;
            emit(format, render::subject_json(&subject), || {
                format!(
                    "Logged {} on {} (now {} of {}, {:.1}%)\n",
                    format_hours(added),
                    subject.name(),
                    format_hours(total_hours),
                    format_hours(subject.target_hours()),
                    subject.fill_percentage(),
                )
            });
        }
        AddTimeOutcome::Ignored(IgnoredReason::UnknownSubject) => {
            bail!("no subject with id {}", args.id)
        }
        AddTimeOutcome::Ignored(IgnoredReason::NonPositiveHours) => {
            emit(format, json!({ "ignored": "non-positive amount" }), || {
                "Nothing logged: enter a positive number of hours.\n".to_string()
            });
        }
    }
    Ok(())
}
