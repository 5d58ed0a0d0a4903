// src/export/report_xlsx.rs
//
// Turns a partition's completed records into the occupant shortlist
// spreadsheet: one row per qualifying match, column layout fixed by the
// downstream consumers of these reports.

use crate::domain::record::ListingRecord;
use crate::export::ExportError;
use log::{info, warn};
use rand::Rng;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const HEADERS: [&str; 23] = [
    "Id",
    "Tot Hits",
    "Tot Apartments",
    "Address",
    "City",
    "Bostadstyp",
    "Area",
    "Extra Area",
    "Floor",
    "Name",
    "Kön",
    "Personnr",
    "Ålder",
    "Phone 1",
    "Phone 2",
    "Phone 3",
    "Phone 4",
    "Phone 5",
    "Phone 6",
    "Apartment",
    "Type",
    "Publish Date",
    "Sold",
];

/// Records contributing more rows than this are dropped wholesale; a
/// shortlist that long has stopped being a shortlist.
const MAX_ROWS_PER_RECORD: usize = 8;

const MAX_SAVE_ATTEMPTS: u32 = 3;

/// One spreadsheet row: a qualifying match in the context of its record.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub id: String,
    pub total_hits: usize,
    pub total_apartments: usize,
    pub address: String,
    pub city: String,
    pub house_type: String,
    pub area: Option<f64>,
    pub extra_area: Option<f64>,
    pub floor: Option<i64>,
    pub name: String,
    pub gender: String,
    pub person_number: String,
    pub age: Option<i64>,
    pub phones: [String; 6],
    /// Rendered as "lgh {code}", empty when the match had no apartment.
    pub apartment: String,
    pub match_type: &'static str,
    pub publication_date: String,
    pub sold_date: String,
}

/// Shapes one record into its report rows. Only complete records with at
/// least one match contribute; over-long records yield nothing.
pub(crate) fn report_rows(record: &ListingRecord) -> Vec<ReportRow> {
    let matches = match &record.matches {
        Some(matches) if record.complete && !matches.is_empty() => matches,
        _ => return Vec::new(),
    };

    let distinct_apartments: HashSet<&str> = matches
        .iter()
        .filter_map(|m| m.apartment.as_deref())
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .collect();

    let mut rows = Vec::new();
    for m in matches {
        let apartment_code = m.apartment.as_deref().unwrap_or("").trim();

        rows.push(ReportRow {
            id: record.id.clone(),
            total_hits: matches.len(),
            total_apartments: if apartment_code.is_empty() {
                1
            } else {
                distinct_apartments.len()
            },
            address: record.street_address.clone(),
            city: record.city.clone(),
            house_type: record.house_type.clone(),
            area: record.area,
            extra_area: record.extra_area,
            floor: record.floor,
            name: m.name.clone(),
            gender: m.gender.clone().unwrap_or_default(),
            person_number: m.person_number.clone().unwrap_or_default(),
            age: m.age,
            phones: phone_columns(&m.phone_numbers),
            apartment: if apartment_code.is_empty() {
                String::new()
            } else {
                format!("lgh {apartment_code}")
            },
            match_type: if m.full_match { "Full" } else { "Partial" },
            publication_date: record.publication_date.clone(),
            sold_date: record.sold_date.clone().unwrap_or_default(),
        });
    }

    if rows.len() > MAX_ROWS_PER_RECORD {
        return Vec::new();
    }
    rows
}

/// Pads or truncates to exactly six phone columns.
pub(crate) fn phone_columns(phones: &[String]) -> [String; 6] {
    let mut columns: [String; 6] = Default::default();
    for (slot, phone) in columns.iter_mut().zip(phones) {
        *slot = phone.clone();
    }
    columns
}

/// Writes the location report: header row frozen, autofilter over the
/// populated range, saved as `{report_dir}/{location_name}.xlsx` with a
/// bounded jittered retry since the file may be open in a spreadsheet app.
pub fn write_report(
    records: &BTreeMap<String, ListingRecord>,
    location_name: &str,
    report_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let rows: Vec<ReportRow> = records.values().flat_map(report_rows).collect();

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let xlsx = |e: XlsxError| ExportError::Xlsx(e.to_string());

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).map_err(xlsx)?;
    }

    for (i, row) in rows.iter().enumerate() {
        write_row(worksheet, (i + 1) as u32, row)?;
    }

    worksheet.set_freeze_panes(1, 0).map_err(xlsx)?;
    worksheet
        .autofilter(0, 0, rows.len() as u32, (HEADERS.len() - 1) as u16)
        .map_err(xlsx)?;

    fs::create_dir_all(report_dir).map_err(|e| ExportError::Io(e.to_string()))?;
    let path = report_dir.join(format!("{location_name}.xlsx"));

    let mut last_err = None;
    for attempt in 1..=MAX_SAVE_ATTEMPTS {
        match workbook.save(&path) {
            Ok(()) => {
                info!("report saved as: {}", path.display());
                return Ok(path);
            }
            Err(e) => {
                warn!(
                    "could not save \"{}\" (attempt {attempt}): {e}. retrying...",
                    path.display()
                );
                last_err = Some(e);
                if attempt < MAX_SAVE_ATTEMPTS {
                    let pause = rand::thread_rng().gen_range(2..=5);
                    std::thread::sleep(Duration::from_secs(pause));
                }
            }
        }
    }

    Err(ExportError::Xlsx(
        last_err.map(|e| e.to_string()).unwrap_or_default(),
    ))
}

fn write_row(worksheet: &mut Worksheet, r: u32, row: &ReportRow) -> Result<(), ExportError> {
    let xlsx = |e: XlsxError| ExportError::Xlsx(e.to_string());

    worksheet.write_string(r, 0, &row.id).map_err(xlsx)?;
    worksheet
        .write_number(r, 1, row.total_hits as f64)
        .map_err(xlsx)?;
    worksheet
        .write_number(r, 2, row.total_apartments as f64)
        .map_err(xlsx)?;
    worksheet.write_string(r, 3, &row.address).map_err(xlsx)?;
    worksheet.write_string(r, 4, &row.city).map_err(xlsx)?;
    worksheet.write_string(r, 5, &row.house_type).map_err(xlsx)?;

    if let Some(area) = row.area {
        worksheet.write_number(r, 6, area).map_err(xlsx)?;
    }
    if let Some(extra_area) = row.extra_area {
        worksheet.write_number(r, 7, extra_area).map_err(xlsx)?;
    }
    if let Some(floor) = row.floor {
        worksheet.write_number(r, 8, floor as f64).map_err(xlsx)?;
    }

    worksheet.write_string(r, 9, &row.name).map_err(xlsx)?;
    worksheet.write_string(r, 10, &row.gender).map_err(xlsx)?;
    worksheet
        .write_string(r, 11, &row.person_number)
        .map_err(xlsx)?;
    if let Some(age) = row.age {
        worksheet.write_number(r, 12, age as f64).map_err(xlsx)?;
    }

    for (i, phone) in row.phones.iter().enumerate() {
        worksheet
            .write_string(r, 13 + i as u16, phone)
            .map_err(xlsx)?;
    }

    worksheet.write_string(r, 19, &row.apartment).map_err(xlsx)?;
    worksheet.write_string(r, 20, row.match_type).map_err(xlsx)?;
    worksheet
        .write_string(r, 21, &row.publication_date)
        .map_err(xlsx)?;
    worksheet.write_string(r, 22, &row.sold_date).map_err(xlsx)?;

    Ok(())
}
