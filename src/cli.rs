use crate::database_factory::DatabaseConfig;
use crate::quiz_item::GameMode;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Quiz mode selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Find places on the map or name highlighted ones
    Map,
    /// Name places from their photos
    Image,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Map => GameMode::Map,
            ModeArg::Image => GameMode::Image,
        }
    }
}

/// Local landmarks quiz using spaced repetition learning
#[derive(Parser, Debug, Clone)]
#[command(name = "Map Quiz")]
#[command(about = "Learn local places with spaced repetition", long_about = None)]
#[command(version)]
pub struct Args {
    /// Use in-memory database for testing
    #[arg(long, help = "Use in-memory database for testing")]
    pub test: bool,

    /// Custom database file path
    #[arg(long, value_name = "PATH", help = "Use custom database file path")]
    pub db_path: Option<PathBuf>,

    /// Override current date for testing (YYYY-MM-DD format)
    #[arg(
        long,
        value_name = "DATE",
        help = "Override current date (YYYY-MM-DD format)"
    )]
    pub override_date: Option<String>,

    /// Seed file to import before the session
    #[arg(long, value_name = "FILE", help = "Import quiz items from a JSON seed file")]
    pub seed: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Map)]
    pub mode: ModeArg,

    /// Maximum number of questions in the session
    #[arg(long, default_value_t = 10)]
    pub questions: usize,

    /// Fixed random seed for reproducible question order
    #[arg(long, value_name = "N")]
    pub rng_seed: Option<u64>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the override_date argument if provided
    pub fn validate_override_date(&self) -> Result<Option<NaiveDate>, String> {
        match &self.override_date {
            Some(date_str) => NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| {
                    format!(
                        "Invalid date format for --override-date: '{}'. Expected YYYY-MM-DD",
                        date_str
                    )
                }),
            None => Ok(None),
        }
    }

    /// Builds the database configuration these arguments describe
    pub fn database_config(&self) -> Result<DatabaseConfig, String> {
        let mut builder = DatabaseConfig::builder().override_date(self.validate_override_date()?);
        if self.test {
            builder = builder.test_mode();
        }
        if let Some(path) = &self.db_path {
            builder = builder.path(path.to_string_lossy());
        }
        Ok(builder.build())
    }
}
