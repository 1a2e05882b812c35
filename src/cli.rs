// src/cli.rs
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log running and cycling workouts against map locations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v, -vv). Defaults to WARN.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q).
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkoutTypeCli {
    Running,
    Cycling,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortCli {
    /// Longest distance first
    Desc,
    /// Shortest distance first
    Asc,
}

// Numeric inputs are taken as text so they go through the same form
// validation as the interactive front end.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a workout at a map location
    Add {
        /// Type of workout
        #[arg(value_enum)]
        type_: WorkoutTypeCli,
        /// Latitude of the workout location
        #[arg(long, allow_negative_numbers = true, value_parser = parse_coordinate)]
        lat: f64,
        /// Longitude of the workout location
        #[arg(long, allow_negative_numbers = true, value_parser = parse_coordinate)]
        lng: f64,
        /// Distance in km
        #[arg(short, long, allow_hyphen_values = true)]
        distance: String,
        /// Duration in minutes
        #[arg(short = 't', long, allow_hyphen_values = true)]
        duration: String,
        /// Cadence in steps/min (running)
        #[arg(short, long, allow_hyphen_values = true)]
        cadence: Option<String>,
        /// Elevation gain in meters, may be negative (cycling)
        #[arg(short, long, allow_hyphen_values = true)]
        elevation: Option<String>,
    },
    /// Edit a logged workout. Omitted values are kept.
    Edit {
        /// ID of the workout to edit
        id: String,
        /// Change the workout type
        #[arg(long = "type", value_enum)]
        type_: Option<WorkoutTypeCli>,
        #[arg(short, long, allow_hyphen_values = true)]
        distance: Option<String>,
        #[arg(short = 't', long, allow_hyphen_values = true)]
        duration: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        cadence: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        elevation: Option<String>,
    },
    /// Delete a workout
    Delete {
        /// ID of the workout to delete
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every workout
    DeleteAll {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List workouts, newest first
    List {
        /// Order by distance instead
        #[arg(short, long, value_enum)]
        sort: Option<SortCli>,
        /// Write CSV to stdout instead of a table
        #[arg(long)]
        export_csv: bool,
    },
    /// Show where the map would pan to for a workout
    Pan {
        /// ID of the workout
        id: String,
    },
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Generate shell completion script
    GenerateCompletion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// f64's parser also takes "NaN" and "inf", which can't be saved
pub fn parse_coordinate(s: &str) -> Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{s}' is not a finite coordinate"))
    }
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

// Used by completion generation
pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate_rejects_non_finite() {
        assert_eq!(parse_coordinate("-33.92"), Ok(-33.92));
        assert_eq!(parse_coordinate(" 18.42 "), Ok(18.42));
        assert!(parse_coordinate("NaN").is_err());
        assert!(parse_coordinate("inf").is_err());
        assert!(parse_coordinate("-infinity").is_err());
        assert!(parse_coordinate("north").is_err());
    }

    #[test]
    fn test_add_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "mapty", "add", "running", "--lat", "-33.92", "--lng", "-18.42", "-d", "5", "-t", "25",
            "-c", "170",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { type_, lat, lng, .. } => {
                assert_eq!(type_, WorkoutTypeCli::Running);
                assert_eq!(lat, -33.92);
                assert_eq!(lng, -18.42);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_add_rejects_nan_latitude() {
        let result = Cli::try_parse_from([
            "mapty", "add", "cycling", "--lat", "NaN", "--lng", "0", "-d", "20", "-t", "60", "-e",
            "100",
        ]);
        assert!(result.is_err());
    }
}
