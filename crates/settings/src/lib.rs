pub mod preferences;

pub use preferences::{
    ChatPreferences, Preferences, PreferencesError, PreferencesStore, ProjectDefaults,
};
