//! User settings: the persisted model, the options editor and export/import.

pub mod editor;
pub mod model;
pub mod transfer;

pub use editor::SettingsEditor;
pub use model::{Blacklist, ResolvedTheme, Settings, Theme};
pub use transfer::ExportDocument;
