#![forbid(unsafe_code)]

pub mod catalog;
pub mod editor;
pub mod id_source;
pub mod model;
pub mod progress;

pub use id_source::IdSource;
