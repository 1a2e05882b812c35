// src/presentation.rs
use crate::config::PopupConfig;
use crate::map::PopupOptions;
use crate::workout::{Workout, WorkoutKind, WorkoutType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metric {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

/// Everything needed to draw one workout in the list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkoutEntryView {
    pub id: String,
    pub workout_type: WorkoutType,
    pub title: String,
    pub icon: &'static str,
    /// Distance, duration, then the two variant metrics.
    pub metrics: [Metric; 4],
}

impl From<&Workout> for WorkoutEntryView {
    fn from(workout: &Workout) -> Self {
        let workout_type = workout.workout_type();
        // Inputs are shown as entered, derived values to two decimals
        let (rate, extra) = match workout.kind {
            WorkoutKind::Running { cadence, pace } => (
                Metric {
                    icon: "⚡️",
                    value: format!("{pace:.2}"),
                    unit: "min/km",
                },
                Metric {
                    icon: "🦶🏼",
                    value: cadence.to_string(),
                    unit: "spm",
                },
            ),
            WorkoutKind::Cycling { elevation, speed } => (
                Metric {
                    icon: "⚡️",
                    value: format!("{speed:.2}"),
                    unit: "km/h",
                },
                Metric {
                    icon: "⛰",
                    value: elevation.to_string(),
                    unit: "m",
                },
            ),
        };

        Self {
            id: workout.id.clone(),
            workout_type,
            title: workout.description.clone(),
            icon: workout_type.icon(),
            metrics: [
                Metric {
                    icon: workout_type.icon(),
                    value: workout.distance.to_string(),
                    unit: "km",
                },
                Metric {
                    icon: "⏱",
                    value: workout.duration.to_string(),
                    unit: "min",
                },
                rate,
                extra,
            ],
        }
    }
}

/// Popup for a workout's map marker.
#[must_use]
pub fn marker_popup(workout: &Workout, config: &PopupConfig) -> PopupOptions {
    let workout_type = workout.workout_type();
    PopupOptions {
        content: format!("{} {}", workout_type.icon(), workout.description),
        max_width: config.max_width,
        min_width: config.min_width,
        auto_close: false,
        close_on_click: false,
        class_name: format!("{workout_type}-popup"),
        workout_type,
    }
}

#[must_use]
pub fn delete_question(workout: &Workout) -> String {
    format!("Are you sure you want to delete {}?", workout.description)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListItem {
    Workout {
        entry: WorkoutEntryView,
        hidden: bool,
    },
    /// Inline yes/no prompt rendered right after the entry it targets.
    DeletePrompt { workout_id: String, question: String },
}

impl ListItem {
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        match self {
            Self::Workout { hidden, .. } => !*hidden,
            Self::DeletePrompt { .. } => true,
        }
    }
}

/// The rendered workout list, top to bottom.
#[derive(Clone, Debug, Default)]
pub struct WorkoutList {
    items: Vec<ListItem>,
}

impl WorkoutList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &ListItem> {
        self.items.iter().filter(|item| item.is_visible())
    }

    pub fn entries(&self) -> impl Iterator<Item = &WorkoutEntryView> {
        self.items.iter().filter_map(|item| match item {
            ListItem::Workout { entry, .. } => Some(entry),
            ListItem::DeletePrompt { .. } => None,
        })
    }

    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&WorkoutEntryView> {
        self.entries().find(|entry| entry.id == id)
    }

    #[must_use]
    pub fn is_hidden(&self, id: &str) -> bool {
        self.items.iter().any(|item| {
            matches!(item, ListItem::Workout { entry, hidden } if entry.id == id && *hidden)
        })
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| matches!(item, ListItem::Workout { entry, .. } if entry.id == id))
    }

    /// Puts a new entry at the top of the list, right below the form.
    pub fn prepend(&mut self, entry: WorkoutEntryView) {
        self.items.insert(
            0,
            ListItem::Workout {
                entry,
                hidden: false,
            },
        );
    }

    /// Drops every item and renders the given entries top to bottom.
    pub fn render_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = WorkoutEntryView>,
    {
        self.items = entries
            .into_iter()
            .map(|entry| ListItem::Workout {
                entry,
                hidden: false,
            })
            .collect();
    }

    /// Swaps an entry in place: the new one goes right after the old one,
    /// then the old one is removed. Returns `false` if the id isn't listed.
    pub fn replace(&mut self, entry: WorkoutEntryView) -> bool {
        let Some(index) = self.position(&entry.id) else {
            return false;
        };
        self.items.insert(
            index + 1,
            ListItem::Workout {
                entry,
                hidden: false,
            },
        );
        self.items.remove(index);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.items.remove(index);
        true
    }

    pub fn hide(&mut self, id: &str) {
        self.set_hidden(|entry_id| entry_id == id, true);
    }

    pub fn hide_all(&mut self) {
        self.set_hidden(|_| true, true);
    }

    pub fn show_all(&mut self) {
        self.set_hidden(|_| true, false);
    }

    fn set_hidden(&mut self, matches: impl Fn(&str) -> bool, value: bool) {
        for item in &mut self.items {
            if let ListItem::Workout { entry, hidden } = item {
                if matches(&entry.id) {
                    *hidden = value;
                }
            }
        }
    }

    pub fn insert_prompt_after(&mut self, workout_id: &str, question: String) {
        let index = self.position(workout_id).map_or(self.items.len(), |i| i + 1);
        self.items.insert(
            index,
            ListItem::DeletePrompt {
                workout_id: workout_id.to_string(),
                question,
            },
        );
    }

    pub fn remove_prompts(&mut self) {
        self.items
            .retain(|item| !matches!(item, ListItem::DeletePrompt { .. }));
    }

    #[must_use]
    pub fn has_prompt(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, ListItem::DeletePrompt { .. }))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    Unsorted,
    Sorted,
}

/// Sort / delete-all buttons and the delete-all prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Toolbar {
    pub visible: bool,
    pub sort: SortState,
    pub delete_all_prompt: bool,
}

impl Toolbar {
    /// The buttons only make sense with more than one workout.
    pub fn sync(&mut self, workout_count: usize) {
        self.visible = workout_count > 1;
    }
}
