mod settings;

pub use settings::{
    AsrSettings, BackendSetting, PreprocessingSettings, ScratchSettings, ServerSettings,
    Settings, SettingsError,
};
