//! Tabular writer: renders a [`Table`] as a CSV attachment.

use std::borrow::Cow;

use axum::{
    body::Bytes,
    http::{header, StatusCode},
    response::Response,
};

use civicstats_core::report::{Cell, Table};

use crate::error::AppError;

/// Sanitize a CSV field value against formula injection.
///
/// Spreadsheet apps (Excel, Google Sheets, LibreOffice) interpret values that
/// begin with `=`, `+`, `-`, `@`, TAB, or CR as formula expressions. Prepending
/// a single quote (`'`) causes them to treat the value as a literal string.
fn sanitize_csv_field(val: &str) -> Cow<'_, str> {
    if val.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        Cow::Owned(format!("'{val}"))
    } else {
        Cow::Borrowed(val)
    }
}

/// Header row then one record per table row. Only label cells are
/// sanitized; keys and counts are written verbatim so they match the
/// compact form.
pub fn build_csv(table: &Table) -> anyhow::Result<Vec<u8>> {
    let mut wtr =
        csv::Writer::from_writer(Vec::with_capacity(table.rows.len().saturating_mul(64)));

    wtr.write_record(&table.headers)
        .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;

    for row in &table.rows {
        let fields: Vec<Cow<'_, str>> = row
            .iter()
            .map(|cell| match cell {
                Cell::Label(text) => sanitize_csv_field(text),
                Cell::Key(_) | Cell::Count(_) => cell.as_field(),
            })
            .collect();
        wtr.write_record(fields.iter().map(|f| f.as_ref()))
            .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;
    }

    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush failed: {e}"))
}

pub fn build_csv_response(filename: &str, csv_bytes: Bytes) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(csv_bytes))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("response build failed: {e}")))
}

/// Render `table` and wrap it in an attachment response.
pub fn table_response(filename: &str, table: &Table) -> Result<Response, AppError> {
    let csv_bytes = Bytes::from(build_csv(table)?);
    build_csv_response(filename, csv_bytes)
}
