#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod seed;
pub mod subject_store;
pub mod theme_service;

pub use valley_core::IdSource;

pub use app_services::AppServices;
pub use error::{AppServicesError, StoreError, ThemeServiceError};
pub use subject_store::{
    AddTimeOutcome, IgnoredReason, LoadReport, LoadSource, Persistence, RemoveOutcome,
    SubjectStore, UpsertKind, UpsertOutcome,
};
pub use theme_service::ThemeService;
