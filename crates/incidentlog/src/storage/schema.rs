//! `SQLite` schema definitions for incidentlog.
//!
//! The table name and column layout match the seed database shipped with the
//! mobile client, so a seed copied verbatim is readable without changes.

/// Name of the records table.
pub const RECORDS_TABLE: &str = "Agentes";

/// SQL statement to create the records table.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS Agentes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT,
    title TEXT,
    description TEXT,
    photo TEXT,
    audio TEXT
)
";

/// Column list used by every read, in `row_to_record` order.
pub const RECORD_COLUMNS: &str = "id, date, title, description, photo, audio";
