//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` row struct converting into the matching `fleetflow_core::fleet` record
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` list query with optional filters

pub mod driver;
pub mod maintenance;
pub mod trip;
pub mod vehicle;

use std::str::FromStr;

use fleetflow_core::error::CoreError;

/// Parse a stored label column, surfacing bad values as a decode error.
pub(crate) fn decode_label<T>(column: &'static str, value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = CoreError>,
{
    value.parse().map_err(|err: CoreError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    })
}
