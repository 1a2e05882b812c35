// src/storage.rs
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::workout::{Coords, VariantInput, Workout, WorkoutKind, WorkoutType};

/// Key under which the workout collection is saved.
pub const WORKOUTS_KEY: &str = "workouts";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend failed: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Failed to serialize workouts (JSON): {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String-keyed string storage, the shape of a browser's local storage.
pub trait KeyValueStore {
    /// # Errors
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// # Errors
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// # Errors
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Non-durable store for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// The persisted field bundle of one workout. Only state is stored; the
/// variant is rebuilt from `type` on load. The marker never appears here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedWorkout {
    pub id: String,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub description: String,
    pub distance: f64,
    pub duration: f64,
    pub location_coords: Coords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Local>>,
}

impl From<&Workout> for PersistedWorkout {
    fn from(workout: &Workout) -> Self {
        Self {
            id: workout.id.clone(),
            workout_type: workout.workout_type(),
            description: workout.description.clone(),
            distance: workout.distance,
            duration: workout.duration,
            location_coords: workout.coords,
            cadence: workout.cadence(),
            pace: workout.pace(),
            elevation: workout.elevation(),
            speed: workout.speed(),
            date: workout.created,
        }
    }
}

impl PersistedWorkout {
    /// Rebuilds the workout variant from the type tag. Derived metrics are
    /// recomputed rather than read back. Returns `None` when the bundle lacks
    /// the field its type requires.
    #[must_use]
    pub fn into_workout(self) -> Option<Workout> {
        let variant = match self.workout_type {
            WorkoutType::Running => VariantInput::Running {
                cadence: self.cadence?,
            },
            WorkoutType::Cycling => VariantInput::Cycling {
                elevation: self.elevation?,
            },
        };
        Some(Workout {
            kind: WorkoutKind::derive(variant, self.distance, self.duration),
            id: self.id,
            description: self.description,
            distance: self.distance,
            duration: self.duration,
            coords: self.location_coords,
            created: self.date,
            marker: None,
        })
    }
}

/// Writes the full collection under `WORKOUTS_KEY`.
/// # Errors
/// Returns `StorageError` if serialization or the backend write fails.
pub fn save<'a, S, I>(store: &mut S, workouts: I) -> Result<(), StorageError>
where
    S: KeyValueStore + ?Sized,
    I: IntoIterator<Item = &'a Workout>,
{
    let bundles: Vec<PersistedWorkout> = workouts.into_iter().map(PersistedWorkout::from).collect();
    let json = serde_json::to_string(&bundles)?;
    store.set(WORKOUTS_KEY, &json)?;
    debug!(count = bundles.len(), "saved workouts");
    Ok(())
}

/// Reads the saved collection. A missing key yields an empty collection.
/// Unreadable data or a value that isn't a JSON array is logged and also
/// yields an empty collection; a single malformed record is skipped.
pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Workout> {
    let raw = match store.get(WORKOUTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "could not read saved workouts, starting empty");
            return Vec::new();
        }
    };

    // Parsed record by record so one bad bundle can't take the rest with it
    let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "saved workouts are corrupt, starting empty");
            return Vec::new();
        }
    };

    let workouts: Vec<Workout> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let bundle: PersistedWorkout = match serde_json::from_value(record) {
                Ok(bundle) => bundle,
                Err(e) => {
                    warn!(index, error = %e, "skipping unreadable saved workout");
                    return None;
                }
            };
            let id = bundle.id.clone();
            let restored = bundle.into_workout();
            if restored.is_none() {
                warn!(%id, "skipping saved workout without its variant field");
            }
            restored
        })
        .collect();
    debug!(count = workouts.len(), "loaded workouts");
    workouts
}

/// Drops the saved collection entirely.
/// # Errors
/// Returns `StorageError` if the backend write fails.
pub fn clear<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StorageError> {
    store.remove(WORKOUTS_KEY)
}
