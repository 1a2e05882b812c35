// src/workout.rs
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::map::MarkerHandle;

/// Ids are the trailing ten digits of the creation timestamp in milliseconds.
const ID_MODULUS: i64 = 10_000_000_000;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Running,
    Cycling,
}

impl WorkoutType {
    /// Capitalized name, the token used in descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Running => Self::Cycling,
            Self::Cycling => Self::Running,
        }
    }
}

// Lowercase, matches the persisted tag
impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Cycling => write!(f, "cycling"),
        }
    }
}

/// A latitude/longitude pair. Serialized as `[lat, lng]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// NaN or infinite coordinates can't be stored: JSON writes them as `null`.
    /// # Errors
    /// Returns `ValidationError::NotFinite` naming the offending axis.
    pub fn validate(&self) -> Result<(), ValidationError> {
        finite("latitude", self.lat)?;
        finite("longitude", self.lng)
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(value: Coords) -> Self {
        [value.lat, value.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be a positive number (got {value})")]
    NotPositive { field: &'static str, value: f64 },
}

#[derive(Error, Debug)]
pub enum WorkoutError {
    #[error("Invalid workout input: {0}")]
    Validation(#[from] ValidationError),
    #[error("Workout not found: ID {0}")]
    NotFound(String),
}

/// The variant-specific user input: cadence for runs, elevation gain for rides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariantInput {
    Running { cadence: f64 },
    Cycling { elevation: f64 },
}

/// Everything the form hands to the store for a create or an edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutInput {
    pub distance: f64,
    pub duration: f64,
    pub variant: VariantInput,
}

impl WorkoutInput {
    #[must_use]
    pub const fn running(distance: f64, duration: f64, cadence: f64) -> Self {
        Self {
            distance,
            duration,
            variant: VariantInput::Running { cadence },
        }
    }

    #[must_use]
    pub const fn cycling(distance: f64, duration: f64, elevation: f64) -> Self {
        Self {
            distance,
            duration,
            variant: VariantInput::Cycling { elevation },
        }
    }

    #[must_use]
    pub const fn workout_type(&self) -> WorkoutType {
        match self.variant {
            VariantInput::Running { .. } => WorkoutType::Running,
            VariantInput::Cycling { .. } => WorkoutType::Cycling,
        }
    }

    /// Distance, duration and cadence must be finite and positive.
    /// Elevation only has to be finite.
    /// # Errors
    /// Returns the first offending field as a `ValidationError`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("distance", self.distance)?;
        positive("duration", self.duration)?;
        match self.variant {
            VariantInput::Running { cadence } => positive("cadence", cadence),
            VariantInput::Cycling { elevation } => finite("elevation", elevation),
        }
    }

    fn kind(&self) -> WorkoutKind {
        WorkoutKind::derive(self.variant, self.distance, self.duration)
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

/// Minutes per kilometre.
#[must_use]
pub fn pace(distance: f64, duration: f64) -> f64 {
    duration / distance
}

/// Kilometres per hour.
#[must_use]
pub fn speed(distance: f64, duration: f64) -> f64 {
    distance / (duration / 60.0)
}

/// `"Running on April 14"`.
#[must_use]
pub fn describe(workout_type: WorkoutType, created: &DateTime<Local>) -> String {
    format!("{} on {}", workout_type.label(), created.format("%B %-d"))
}

/// Variant state. Exactly one pair of variant fields exists at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutKind {
    Running { cadence: f64, pace: f64 },
    Cycling { elevation: f64, speed: f64 },
}

impl WorkoutKind {
    /// Builds the variant and computes its derived metric.
    #[must_use]
    pub fn derive(variant: VariantInput, distance: f64, duration: f64) -> Self {
        match variant {
            VariantInput::Running { cadence } => Self::Running {
                cadence,
                pace: pace(distance, duration),
            },
            VariantInput::Cycling { elevation } => Self::Cycling {
                elevation,
                speed: speed(distance, duration),
            },
        }
    }

    #[must_use]
    pub const fn workout_type(&self) -> WorkoutType {
        match self {
            Self::Running { .. } => WorkoutType::Running,
            Self::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: String,
    pub description: String,
    pub distance: f64,
    pub duration: f64,
    pub coords: Coords,
    /// `None` for records restored from saves that predate the `date` field.
    pub created: Option<DateTime<Local>>,
    pub kind: WorkoutKind,
    /// Handle to the marker owned by the map widget. Never persisted.
    pub marker: Option<MarkerHandle>,
}

impl Workout {
    #[must_use]
    pub const fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    #[must_use]
    pub const fn cadence(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { cadence, .. } => Some(cadence),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    #[must_use]
    pub const fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { pace, .. } => Some(pace),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    #[must_use]
    pub const fn elevation(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { elevation, .. } => Some(elevation),
            WorkoutKind::Running { .. } => None,
        }
    }

    #[must_use]
    pub const fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { speed, .. } => Some(speed),
            WorkoutKind::Running { .. } => None,
        }
    }

    /// The values a form needs to be pre-filled with for an edit.
    #[must_use]
    pub const fn to_input(&self) -> WorkoutInput {
        let variant = match self.kind {
            WorkoutKind::Running { cadence, .. } => VariantInput::Running { cadence },
            WorkoutKind::Cycling { elevation, .. } => VariantInput::Cycling { elevation },
        };
        WorkoutInput {
            distance: self.distance,
            duration: self.duration,
            variant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Descending,
    Ascending,
}

/// The authoritative, insertion-ordered workout collection.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Workouts in creation order.
    #[must_use]
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Workout> {
        self.workouts.iter()
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.workouts.iter().position(|w| w.id == id)
    }

    /// Validates the input and appends a new workout.
    /// # Errors
    /// Returns `ValidationError` if any field is out of range.
    pub fn create(
        &mut self,
        input: WorkoutInput,
        coords: Coords,
        created: DateTime<Local>,
    ) -> Result<&Workout, ValidationError> {
        input.validate()?;
        coords.validate()?;

        let workout = Workout {
            id: self.next_id(&created),
            description: describe(input.workout_type(), &created),
            distance: input.distance,
            duration: input.duration,
            coords,
            created: Some(created),
            kind: input.kind(),
            marker: None,
        };
        debug!(id = %workout.id, kind = %workout.workout_type(), "created workout");
        self.workouts.push(workout);
        let last = self.workouts.len() - 1;
        Ok(&self.workouts[last])
    }

    /// Overwrites the editable fields of a workout. A type change replaces the
    /// variant and swaps the type token in the description; id, coordinates
    /// and creation date are kept.
    /// # Errors
    /// - `WorkoutError::Validation` if the input is out of range.
    /// - `WorkoutError::NotFound` if no workout has this id.
    pub fn edit(&mut self, id: &str, input: WorkoutInput) -> Result<&Workout, WorkoutError> {
        input.validate()?;
        let index = self
            .position(id)
            .ok_or_else(|| WorkoutError::NotFound(id.to_string()))?;

        let workout = &mut self.workouts[index];
        let old_type = workout.workout_type();
        let new_type = input.workout_type();
        if old_type != new_type {
            workout.description = workout
                .description
                .replacen(old_type.label(), new_type.label(), 1);
        }
        workout.distance = input.distance;
        workout.duration = input.duration;
        workout.kind = input.kind();
        debug!(id, from = %old_type, to = %new_type, "edited workout");
        Ok(&self.workouts[index])
    }

    /// Removes a workout. Unknown ids are a no-op and yield `None`.
    pub fn delete(&mut self, id: &str) -> Option<Workout> {
        let index = self.position(id)?;
        Some(self.workouts.remove(index))
    }

    /// Empties the collection and hands back the removed workouts.
    pub fn delete_all(&mut self) -> Vec<Workout> {
        std::mem::take(&mut self.workouts)
    }

    /// A distance-ordered view. Stored order is left untouched; ties keep
    /// creation order.
    #[must_use]
    pub fn sorted_by_distance(&self, order: SortOrder) -> Vec<&Workout> {
        let mut view: Vec<&Workout> = self.workouts.iter().collect();
        match order {
            SortOrder::Descending => view.sort_by(|a, b| b.distance.total_cmp(&a.distance)),
            SortOrder::Ascending => view.sort_by(|a, b| a.distance.total_cmp(&b.distance)),
        }
        view
    }

    /// Replaces the whole collection, e.g. with records loaded from storage.
    pub fn restore(&mut self, workouts: Vec<Workout>) {
        self.workouts = workouts;
    }

    /// Records the marker placed for a workout. Returns the previous handle.
    pub fn set_marker(&mut self, id: &str, marker: MarkerHandle) -> Option<MarkerHandle> {
        let index = self.position(id)?;
        self.workouts[index].marker.replace(marker)
    }

    pub fn take_marker(&mut self, id: &str) -> Option<MarkerHandle> {
        let index = self.position(id)?;
        self.workouts[index].marker.take()
    }

    fn next_id(&self, created: &DateTime<Local>) -> String {
        let mut candidate = created.timestamp_millis().rem_euclid(ID_MODULUS);
        loop {
            let id = format!("{candidate:010}");
            if self.find(&id).is_none() {
                return id;
            }
            candidate = (candidate + 1) % ID_MODULUS;
        }
    }
}
