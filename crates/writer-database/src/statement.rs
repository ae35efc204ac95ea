//! Running request SQL with positional parameters.
//!
//! Mirrors what a `database/sql`-style `Exec` does against SQLite: the SQL
//! text may hold several statements, each statement takes as many leading
//! parameters as it has placeholders, and any rows produced are read to the
//! end and dropped.

use crate::SqlParam;
use rusqlite::{Batch, Connection, Statement};

/// What a request did to the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecSummary {
    /// Statements stepped to completion.
    pub statements: usize,
    /// Rows changed by statements that return no columns.
    pub rows_changed: u64,
    /// Rows produced (and discarded) by row-returning statements.
    pub rows_returned: u64,
}

/// Guards a writing statement that runs while params are still unclaimed.
const GUARD_BEGIN: &str = "SAVEPOINT writer_leftover_params";
const GUARD_RELEASE: &str = "RELEASE writer_leftover_params";
const GUARD_ROLLBACK: &str =
    "ROLLBACK TO writer_leftover_params; RELEASE writer_leftover_params";

/// Execute `sql` against `conn`, binding `params` positionally.
///
/// Fails with [`rusqlite::Error::InvalidParameterCount`] when the params run
/// out before a statement's placeholders are filled, or when params remain
/// after the last statement. Either way the mismatched statement leaves no
/// effect; statements before it in the same text keep theirs.
pub fn execute_with_params(
    conn: &Connection,
    sql: &str,
    params: &[SqlParam],
) -> rusqlite::Result<ExecSummary> {
    let mut summary = ExecSummary::default();
    let mut remaining = params;
    let mut batch = Batch::new(conn, sql);
    let mut next = batch.next()?;

    while let Some(mut stmt) = next {
        let wanted = stmt.parameter_count();
        if remaining.len() < wanted {
            let consumed = params.len() - remaining.len();
            return Err(rusqlite::Error::InvalidParameterCount(
                params.len(),
                consumed + wanted,
            ));
        }

        let (bound, rest) = remaining.split_at(wanted);
        for (index, param) in bound.iter().enumerate() {
            stmt.raw_bind_parameter(index + 1, param)?;
        }
        remaining = rest;

        if remaining.is_empty() || stmt.readonly() {
            step(&mut stmt, &mut summary)?;
            drop(stmt);
            next = batch.next()?;
            continue;
        }

        // Only a following statement can claim the rest of the params, and
        // it cannot be prepared before this one runs (it may depend on it).
        conn.execute_batch(GUARD_BEGIN)?;
        let stepped = step(&mut stmt, &mut summary);
        drop(stmt);
        if let Err(e) = stepped {
            conn.execute_batch(GUARD_ROLLBACK)?;
            return Err(e);
        }

        match batch.next() {
            Ok(Some(following)) => {
                conn.execute_batch(GUARD_RELEASE)?;
                next = Some(following);
            }
            Ok(None) => {
                conn.execute_batch(GUARD_ROLLBACK)?;
                return Err(leftover(params, remaining));
            }
            Err(e) => {
                conn.execute_batch(GUARD_RELEASE)?;
                return Err(e);
            }
        }
    }

    if !remaining.is_empty() {
        return Err(leftover(params, remaining));
    }

    Ok(summary)
}

fn step(stmt: &mut Statement<'_>, summary: &mut ExecSummary) -> rusqlite::Result<()> {
    if stmt.column_count() == 0 {
        summary.rows_changed += stmt.raw_execute()? as u64;
    } else {
        let mut rows = stmt.raw_query();
        while rows.next()?.is_some() {
            summary.rows_returned += 1;
        }
    }
    summary.statements += 1;
    Ok(())
}

fn leftover(params: &[SqlParam], remaining: &[SqlParam]) -> rusqlite::Error {
    rusqlite::Error::InvalidParameterCount(params.len(), params.len() - remaining.len())
}
