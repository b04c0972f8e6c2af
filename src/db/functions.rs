//! Scalar SQL functions registered on every connection.

use crate::indices::{de_martonne, MonthlyTemperatures, PetFormula};
use crate::utils::constants::{FN_CALC_PET, FN_MARTONNE_INDEX, FN_PARSE_DOUBLE};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Error as SqlError};
use std::sync::Arc;

/// Register `parse_double`, `martonne_index` and `calc_pet` on `conn`.
pub fn register_all(conn: &Connection, pet: Arc<dyn PetFormula>) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function(FN_PARSE_DOUBLE, 1, flags, |ctx| {
        parse_double(ctx.get_raw(0))
    })?;

    conn.create_scalar_function(FN_MARTONNE_INDEX, 2, flags, |ctx| {
        let precipitation: Option<f64> = ctx.get(0)?;
        let temperature: Option<f64> = ctx.get(1)?;
        Ok(de_martonne(precipitation, temperature))
    })?;

    conn.create_scalar_function(FN_CALC_PET, 12, flags, move |ctx| {
        let months = monthly_arguments(ctx)?;
        Ok(pet.annual_pet(&months))
    })?;

    Ok(())
}

/// Strict text-to-float cast: NULL stays NULL, numbers pass through,
/// text must parse as a float after trimming or the statement fails.
fn parse_double(value: ValueRef<'_>) -> rusqlite::Result<Option<f64>> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(i as f64)),
        ValueRef::Real(f) => Ok(Some(f)),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| user_error(e.to_string()))?;
            text.trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| user_error(format!("invalid input for type double: {:?}", text)))
        }
        ValueRef::Blob(_) => Err(user_error("cannot cast blob to double".to_string())),
    }
}

fn monthly_arguments(ctx: &Context<'_>) -> rusqlite::Result<MonthlyTemperatures> {
    let mut months: MonthlyTemperatures = [None; 12];
    for (idx, slot) in months.iter_mut().enumerate() {
        *slot = ctx.get(idx)?;
    }
    Ok(months)
}

fn user_error(message: String) -> SqlError {
    SqlError::UserFunctionError(message.into())
}
