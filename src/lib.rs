// src/lib.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

// --- Declare modules ---
mod config;
pub mod controller;
pub mod db;
pub mod form;
pub mod map;
pub mod presentation;
pub mod storage;
pub mod workout;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, ConfigError, MapConfig, PopupConfig, StandardColor, Theme,
};
pub use controller::{PendingAction, UiEvent, WorkoutController};
pub use db::{get_data_dir, get_db_path as get_db_path_util, DbError, SqliteStore};
pub use form::{FieldMessage, FormField, FormMode, FormRejection, FormView};
pub use map::{
    FixedLocation, Geolocation, GeolocationError, HeadlessMap, MapWidget, MarkerHandle,
    PanOptions, PopupOptions,
};
pub use presentation::{ListItem, Metric, SortState, Toolbar, WorkoutEntryView, WorkoutList};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use workout::{
    Coords, SortOrder, ValidationError, VariantInput, Workout, WorkoutError, WorkoutInput,
    WorkoutKind, WorkoutStore, WorkoutType,
};

/// Configuration and file locations shared by the front ends.
pub struct AppService {
    pub config: Config,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService {
    /// Loads the configuration and resolves the database location.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination or loading fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;

        Ok(Self {
            config,
            db_path,
            config_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Opens the workout database and builds a controller over it, with the
    /// saved workouts restored.
    /// # Errors
    /// Returns `anyhow::Error` if the database cannot be opened.
    pub fn open_controller<M: MapWidget>(&self) -> Result<WorkoutController<SqliteStore, M>> {
        let store = SqliteStore::open(&self.db_path)
            .with_context(|| format!("Failed to open database at {:?}", self.db_path))?;
        Ok(WorkoutController::new(self.config.clone(), store))
    }

    /// The position source configured for this machine.
    #[must_use]
    pub fn geolocation(&self) -> FixedLocation {
        FixedLocation(self.config.home_location)
    }
}
