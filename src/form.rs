// src/form.rs
use std::time::{Duration, Instant};

use crate::workout::{VariantInput, Workout, WorkoutInput, WorkoutType};

pub const MSG_FIELD_EMPTY: &str = "Field is empty";
pub const MSG_POSITIVE_EXPECTED: &str = "Positive number expected";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl FormField {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Distance => "Distance (km)",
            Self::Duration => "Duration (min)",
            Self::Cadence => "Cadence (step/min)",
            Self::Elevation => "Elev Gain (m)",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Inline validation message anchored to one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMessage {
    pub field: FormField,
    pub text: &'static str,
}

/// Why a submission was refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormRejection {
    pub invalid: Vec<FormField>,
    pub message: FieldMessage,
}

/// Retained state of the workout form: raw text inputs plus the visual state
/// a front end needs to draw it.
#[derive(Clone, Debug)]
pub struct FormView {
    pub visible: bool,
    pub mode: FormMode,
    pub workout_type: WorkoutType,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
    pub invalid: Vec<FormField>,
    pub message: Option<FieldMessage>,
    pub focus: Option<FormField>,
    hidden_at: Option<Instant>,
}

impl Default for FormView {
    fn default() -> Self {
        Self {
            visible: false,
            mode: FormMode::Create,
            workout_type: WorkoutType::Running,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
            invalid: Vec::new(),
            message: None,
            focus: None,
            hidden_at: None,
        }
    }
}

impl FormView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The fields shown for the selected type, in tab order.
    #[must_use]
    pub const fn fields(&self) -> [FormField; 3] {
        match self.workout_type {
            WorkoutType::Running => [FormField::Distance, FormField::Duration, FormField::Cadence],
            WorkoutType::Cycling => [FormField::Distance, FormField::Duration, FormField::Elevation],
        }
    }

    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Distance => &self.distance,
            FormField::Duration => &self.duration,
            FormField::Cadence => &self.cadence,
            FormField::Elevation => &self.elevation,
        }
    }

    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Distance => &mut self.distance,
            FormField::Duration => &mut self.duration,
            FormField::Cadence => &mut self.cadence,
            FormField::Elevation => &mut self.elevation,
        }
    }

    /// Replaces a field's text and clears its error state.
    pub fn set_value(&mut self, field: FormField, value: impl Into<String>) {
        *self.value_mut(field) = value.into();
        self.clear_error(field);
    }

    pub fn clear_error(&mut self, field: FormField) {
        self.invalid.retain(|f| *f != field);
        if self.message.as_ref().is_some_and(|m| m.field == field) {
            self.message = None;
        }
    }

    /// Switches between cadence and elevation. A pending message on the hidden
    /// field goes away with it.
    pub fn set_type(&mut self, workout_type: WorkoutType) {
        if self.workout_type == workout_type {
            return;
        }
        self.workout_type = workout_type;
        let hidden = match workout_type {
            WorkoutType::Running => FormField::Elevation,
            WorkoutType::Cycling => FormField::Cadence,
        };
        self.clear_error(hidden);
        if self.focus == Some(hidden) {
            self.focus = Some(self.fields()[2]);
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.hidden_at = None;
        self.focus = Some(FormField::Distance);
    }

    /// Hides the form at once. It reads as "settling" until the reset delay
    /// has passed; purely cosmetic.
    pub fn hide(&mut self, now: Instant) {
        if self.visible {
            self.hidden_at = Some(now);
        }
        self.visible = false;
        self.focus = None;
    }

    #[must_use]
    pub fn is_settling(&self, now: Instant, delay: Duration) -> bool {
        self.hidden_at
            .is_some_and(|at| now.saturating_duration_since(at) < delay)
    }

    pub fn clear_fields(&mut self) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
    }

    /// Back to create mode with empty inputs and no error marks.
    pub fn reset(&mut self) {
        self.mode = FormMode::Create;
        self.clear_fields();
        self.invalid.clear();
        self.message = None;
    }

    /// Loads a workout's values for editing.
    pub fn prefill(&mut self, workout: &Workout) {
        self.reset();
        self.mode = FormMode::Edit;
        self.workout_type = workout.workout_type();
        self.distance = workout.distance.to_string();
        self.duration = workout.duration.to_string();
        match workout.to_input().variant {
            VariantInput::Running { cadence } => self.cadence = cadence.to_string(),
            VariantInput::Cycling { elevation } => self.elevation = elevation.to_string(),
        }
    }

    /// Parses and checks the visible fields. Distance, duration and cadence
    /// must be positive numbers; elevation any finite number.
    /// # Errors
    /// Returns a `FormRejection` naming every invalid field and the message
    /// for the first one.
    pub fn read_input(&self) -> Result<WorkoutInput, FormRejection> {
        let [distance_field, duration_field, variant_field] = self.fields();
        let mut invalid = Vec::new();
        let mut first_blank = None;

        let mut check = |field: FormField, needs_positive: bool| -> Option<f64> {
            let raw = self.value(field).trim();
            let parsed = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && (!needs_positive || *v > 0.0));
            if parsed.is_none() {
                if invalid.is_empty() {
                    first_blank = Some(raw.is_empty());
                }
                invalid.push(field);
            }
            parsed
        };

        let distance = check(distance_field, true);
        let duration = check(duration_field, true);
        let variant_value = check(variant_field, variant_field == FormField::Cadence);

        match (distance, duration, variant_value) {
            (Some(distance), Some(duration), Some(value)) => Ok(match self.workout_type {
                WorkoutType::Running => WorkoutInput::running(distance, duration, value),
                WorkoutType::Cycling => WorkoutInput::cycling(distance, duration, value),
            }),
            _ => {
                let text = if first_blank == Some(true) {
                    MSG_FIELD_EMPTY
                } else {
                    MSG_POSITIVE_EXPECTED
                };
                let message = FieldMessage {
                    field: invalid[0],
                    text,
                };
                Err(FormRejection { invalid, message })
            }
        }
    }

    /// Marks the invalid fields, anchors the message and focuses the first
    /// offender.
    pub fn apply_rejection(&mut self, rejection: FormRejection) {
        self.focus = Some(rejection.message.field);
        self.invalid = rejection.invalid;
        self.message = Some(rejection.message);
    }
}
