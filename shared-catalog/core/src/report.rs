// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::record::CatalogRecord;
use std::io::{self, Write};

pub const HEADER: &str = "Catalog:";

pub fn format_record(record: &CatalogRecord) -> String {
    format!(
        "{}, row={}, shelf={}, book={}",
        record.id, record.row, record.shelf, record.slot
    )
}

/// Writes the header followed by one line per record
pub fn render_catalog<W: Write>(records: &[CatalogRecord], out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", HEADER)?;
    for record in records {
        writeln!(out, "{}", format_record(record))?;
    }
    out.flush()
}
