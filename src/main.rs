//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdin, stdout, Write};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use mapty_lib::{
    AppService, Coords, FormField, HeadlessMap, ListItem, PendingAction, SortOrder, SqliteStore,
    Theme, UiEvent, WorkoutController, WorkoutEntryView, WorkoutType,
};

type Controller = WorkoutController<SqliteStore, HeadlessMap>;

fn main() -> Result<()> {
    let cli_args = cli::parse_args(); // Parse arguments once
    init_logging(cli_args.verbose, cli_args.quiet);

    match cli_args.command {
        cli::Commands::GenerateCompletion { shell } => {
            let mut cmd = cli::build_cli_command();
            let bin_name = cmd.get_name().to_string();

            eprintln!("Generating completion script for {shell}...");
            clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        }
        cli::Commands::DbPath => {
            let service = init_service()?;
            println!("Database file is located at: {:?}", service.get_db_path());
        }
        cli::Commands::ConfigPath => {
            let service = init_service()?;
            println!("Config file is located at: {:?}", service.get_config_path());
        }
        cli::Commands::Add {
            type_,
            lat,
            lng,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            let mut controller = open_controller()?;
            controller.handle(UiEvent::MapClicked(Coords::new(lat, lng)))?;
            controller.handle(UiEvent::TypeChanged(cli_type_to_lib(type_)))?;
            fill_field(&mut controller, FormField::Distance, Some(distance))?;
            fill_field(&mut controller, FormField::Duration, Some(duration))?;
            fill_field(&mut controller, FormField::Cadence, cadence)?;
            fill_field(&mut controller, FormField::Elevation, elevation)?;
            controller.handle(UiEvent::Submit)?;
            check_form_accepted(&controller)?;

            if let Some(workout) = controller.workouts().workouts().last() {
                println!(
                    "Successfully logged '{}' at {} ID: {}",
                    workout.description, workout.coords, workout.id
                );
            }
        }
        cli::Commands::Edit {
            id,
            type_,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            let mut controller = open_controller()?;
            controller.handle(UiEvent::EditClicked(id.clone()))?;
            if !matches!(controller.pending(), PendingAction::Edit { .. }) {
                bail!("Workout not found: ID {id}");
            }
            if let Some(type_) = type_ {
                controller.handle(UiEvent::TypeChanged(cli_type_to_lib(type_)))?;
            }
            fill_field(&mut controller, FormField::Distance, distance)?;
            fill_field(&mut controller, FormField::Duration, duration)?;
            fill_field(&mut controller, FormField::Cadence, cadence)?;
            fill_field(&mut controller, FormField::Elevation, elevation)?;
            controller.handle(UiEvent::Submit)?;
            check_form_accepted(&controller)?;

            if let Some(workout) = controller.workouts().find(&id) {
                println!("Successfully updated workout ID {id}: '{}'", workout.description);
            }
        }
        cli::Commands::Delete { id, yes } => {
            let mut controller = open_controller()?;
            controller.handle(UiEvent::DeleteClicked(id.clone()))?;
            if !matches!(controller.pending(), PendingAction::DeleteOne { .. }) {
                bail!("Workout not found: ID {id}");
            }
            let question = controller
                .list()
                .items()
                .iter()
                .find_map(|item| match item {
                    ListItem::DeletePrompt { question, .. } => Some(question.clone()),
                    ListItem::Workout { .. } => None,
                })
                .unwrap_or_else(|| format!("Delete workout {id}?"));
            let confirmed = yes || prompt_yes_no(&question)?;
            controller.handle(UiEvent::Confirm(confirmed))?;
            if confirmed {
                println!("Successfully deleted workout ID {id}.");
            } else {
                println!("Deletion cancelled.");
            }
        }
        cli::Commands::DeleteAll { yes } => {
            let mut controller = open_controller()?;
            controller.handle(UiEvent::DeleteAllClicked)?;
            if controller.pending() != &PendingAction::DeleteAll {
                println!("No workouts to delete.");
                return Ok(());
            }
            let count = controller.workouts().len();
            let confirmed =
                yes || prompt_yes_no(&format!("Are you sure you want to delete all {count} workouts?"))?;
            controller.handle(UiEvent::Confirm(confirmed))?;
            if confirmed {
                println!("Successfully deleted {count} workout(s).");
            } else {
                println!("Deletion cancelled.");
            }
        }
        cli::Commands::List { sort, export_csv } => {
            let controller = open_controller()?;
            let entries: Vec<WorkoutEntryView> = match sort {
                Some(sort) => {
                    let order = match sort {
                        cli::SortCli::Desc => SortOrder::Descending,
                        cli::SortCli::Asc => SortOrder::Ascending,
                    };
                    controller
                        .workouts()
                        .sorted_by_distance(order)
                        .into_iter()
                        .map(WorkoutEntryView::from)
                        .collect()
                }
                None => controller.list().entries().cloned().collect(),
            };

            if entries.is_empty() {
                println!("No workouts logged yet.");
            } else if export_csv {
                print_workouts_csv(&controller, &entries)?;
            } else {
                print_workout_table(&controller, &entries);
            }
        }
        cli::Commands::Pan { id } => {
            let mut controller = open_controller()?;
            if let Some(notice) = controller.notice() {
                bail!("{notice}");
            }
            if controller.workouts().find(&id).is_none() {
                bail!("Workout not found: ID {id}");
            }
            controller.handle(UiEvent::WorkoutClicked(id))?;
            if let Some(center) = controller.map().and_then(|map| map.center) {
                println!("Map centered on {center}");
            }
        }
    }

    Ok(())
}

fn init_service() -> Result<AppService> {
    AppService::initialize().context("Failed to initialize application service")
}

/// Opens the saved workouts. Markers only live for this process, but placing
/// them keeps the controller's bookkeeping identical to the interactive front
/// end.
fn open_controller() -> Result<Controller> {
    let service = init_service()?;
    let mut controller: Controller = service.open_controller()?;
    if let Err(e) = controller.attach_map(HeadlessMap::new(), &mut service.geolocation()) {
        warn!(error = %e, "continuing without a map");
    }
    Ok(controller)
}

/// Initialize logging to stderr.
///
/// Default level is WARN; `-v` => INFO, `-vv` => DEBUG, `-vvv` => TRACE,
/// `-q` => ERROR. `RUST_LOG` overrides everything.
fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-1 => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mapty={level},mapty_lib={level}")));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .compact()
        .init();
}

fn cli_type_to_lib(cli_type: cli::WorkoutTypeCli) -> WorkoutType {
    match cli_type {
        cli::WorkoutTypeCli::Running => WorkoutType::Running,
        cli::WorkoutTypeCli::Cycling => WorkoutType::Cycling,
    }
}

fn fill_field(controller: &mut Controller, field: FormField, value: Option<String>) -> Result<()> {
    if let Some(value) = value {
        controller.handle(UiEvent::FieldChanged(field, value))?;
    }
    Ok(())
}

/// A rejected form stays open with a message on the first bad field.
fn check_form_accepted(controller: &Controller) -> Result<()> {
    let form = controller.form();
    if let Some(message) = &form.message {
        let invalid: Vec<&str> = form.invalid.iter().map(|f| f.label()).collect();
        bail!(
            "{}: {} (invalid: {})",
            message.field.label(),
            message.text,
            invalid.join(", ")
        );
    }
    Ok(())
}

fn prompt_yes_no(question: &str) -> Result<bool> {
    print!("{question} [y/N]: ");
    io::stdout().flush()?;
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn type_color(theme: &Theme, workout_type: WorkoutType) -> Color {
    theme.color_for(workout_type).into()
}

fn print_workout_table(controller: &Controller, entries: &[WorkoutEntryView]) {
    let theme = &controller.config().theme;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Workout").add_attribute(Attribute::Bold),
            Cell::new("Distance").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
            Cell::new("Pace/Speed").add_attribute(Attribute::Bold),
            Cell::new("Cadence/Elev").add_attribute(Attribute::Bold),
            Cell::new("Location").add_attribute(Attribute::Bold),
        ]);

    for entry in entries {
        let location = controller
            .workouts()
            .find(&entry.id)
            .map_or_else(String::new, |w| w.coords.to_string());
        let metric_cells = entry
            .metrics
            .iter()
            .map(|m| Cell::new(format!("{} {} {}", m.icon, m.value, m.unit)));
        let mut row = vec![
            Cell::new(&entry.id),
            Cell::new(format!("{} {}", entry.icon, entry.title))
                .fg(type_color(theme, entry.workout_type)),
        ];
        row.extend(metric_cells);
        row.push(Cell::new(location));
        table.add_row(row);
    }
    println!("{table}");
}

fn print_workouts_csv(controller: &Controller, entries: &[WorkoutEntryView]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record([
        "id",
        "type",
        "description",
        "distance_km",
        "duration_min",
        "pace_min_per_km",
        "cadence_spm",
        "speed_km_per_h",
        "elevation_m",
        "lat",
        "lng",
    ])?;

    let opt = |v: Option<f64>| v.map_or_else(String::new, |v| v.to_string());
    for entry in entries {
        let Some(workout) = controller.workouts().find(&entry.id) else {
            continue;
        };
        writer.write_record([
            workout.id.clone(),
            workout.workout_type().to_string(),
            workout.description.clone(),
            workout.distance.to_string(),
            workout.duration.to_string(),
            opt(workout.pace()),
            opt(workout.cadence()),
            opt(workout.speed()),
            opt(workout.elevation()),
            workout.coords.lat.to_string(),
            workout.coords.lng.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
