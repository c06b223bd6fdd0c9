//! Bind SeaQuery values as sqlx arguments.

use anyhow::anyhow;
use sea_query::{Value, Values};
use sqlx::Arguments;
use sqlx::postgres::PgArguments;

use super::StoreError;

/// Convert the values of a built statement into PostgreSQL arguments, in placeholder order.
pub(crate) fn pg_arguments(values: Values) -> Result<PgArguments, StoreError> {
    let mut args = PgArguments::default();
    for value in values.0 {
        let added = match value {
            Value::Bool(v) => args.add(v),
            Value::Int(v) => args.add(v),
            Value::BigInt(v) => args.add(v),
            // LIMIT/OFFSET; page sizes are capped far below i64::MAX.
            Value::BigUnsigned(v) => args.add(v.map(|n| i64::try_from(n).unwrap_or(i64::MAX))),
            Value::Double(v) => args.add(v),
            Value::String(v) => args.add(v.map(|s| *s)),
            Value::ChronoDateTimeUtc(v) => args.add(v.map(|ts| *ts)),
            other => {
                return Err(StoreError::Other(anyhow!(
                    "unsupported bind value: {other:?}"
                )));
            }
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}
