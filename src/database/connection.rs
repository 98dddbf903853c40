use crate::error::Result;
use log::debug;
use rusqlite::Connection;

// Embed migrations from the migrations directory
refinery::embed_migrations!("migrations");

/// Opens the SQLite file (or `:memory:`) and brings the schema up to date
pub fn init_connection(db_path: &str) -> Result<Connection> {
    let mut conn = Connection::open(db_path)?;

    let report = migrations::runner().run(&mut conn)?;
    debug!(
        "Applied {} migration(s) to {}",
        report.applied_migrations().len(),
        db_path
    );

    Ok(conn)
}
