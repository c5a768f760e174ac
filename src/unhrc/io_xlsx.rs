// The vote store, as an Excel workbook with one worksheet per table.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use snafu::{OptionExt, ResultExt};

use crate::unhrc::{
    io_common::{assemble_resolutions, parse_vote_date, ResolutionRow, VoteRow},
    *,
};

pub fn read_workbook(
    path: &str,
    resolutions_sheet: &str,
    votes_sheet: &str,
) -> UnhrcResult<Vec<Resolution>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let resolutions_range = get_range(&mut workbook, path, resolutions_sheet)?;
    let votes_range = get_range(&mut workbook, path, votes_sheet)?;

    let mut resolution_rows: Vec<ResolutionRow> = Vec::new();
    // The first row is the header.
    for (idx, row) in resolutions_range.rows().enumerate().skip(1) {
        let lineno = idx + 1;
        debug!("read_workbook: resolutions: {:?} {:?}", lineno, row);
        if row.iter().all(|c| *c == DataType::Empty) {
            continue;
        }
        let name = read_cell_string(row.get(0), resolutions_sheet, lineno)?;
        let date = read_cell_date(row.get(1), resolutions_sheet, lineno)?;
        resolution_rows.push(ResolutionRow {
            name,
            date,
            summary: read_cell_string(row.get(2), resolutions_sheet, lineno)?,
            agenda: read_cell_string(row.get(3), resolutions_sheet, lineno)?,
        });
    }

    let mut vote_rows: Vec<VoteRow> = Vec::new();
    for (idx, row) in votes_range.rows().enumerate().skip(1) {
        let lineno = idx + 1;
        if row.iter().all(|c| *c == DataType::Empty) {
            continue;
        }
        vote_rows.push(VoteRow {
            lineno,
            resolution: read_cell_string(row.get(0), votes_sheet, lineno)?,
            country: read_cell_string(row.get(1), votes_sheet, lineno)?,
            vote: read_cell_string(row.get(2), votes_sheet, lineno)?,
        });
    }
    info!(
        "read_workbook: {} resolutions, {} votes",
        resolution_rows.len(),
        vote_rows.len()
    );
    assemble_resolutions(&resolution_rows, &vote_rows)
}

fn get_range(
    workbook: &mut Xlsx<std::io::BufReader<std::fs::File>>,
    path: &str,
    name: &str,
) -> UnhrcResult<Range<DataType>> {
    workbook
        .worksheet_range(name)
        .context(MissingWorksheetSnafu { name })?
        .context(OpeningExcelSnafu { path })
}

fn read_cell_string(cell: Option<&DataType>, name: &str, lineno: usize) -> UnhrcResult<String> {
    match cell {
        Some(DataType::String(s)) => Ok(s.trim().to_string()),
        Some(DataType::Int(i)) => Ok(i.to_string()),
        Some(DataType::Float(f)) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        Some(DataType::Float(f)) => Ok(f.to_string()),
        Some(DataType::Empty) | None => Ok("".to_string()),
        Some(x) => ExcelWrongCellTypeSnafu {
            name,
            lineno,
            content: format!("{:?}", x),
        }
        .fail(),
    }
}

// Excel counts the days from 1899-12-30. Its last date is 9999-12-31.
const EXCEL_MAX_SERIAL: f64 = 2958465.0;

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial >= EXCEL_MAX_SERIAL + 1.0 {
        return None;
    }
    let days = chrono::Duration::try_days(serial.trunc() as i64)?;
    NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.checked_add_signed(days))
}

fn read_cell_date(cell: Option<&DataType>, name: &str, lineno: usize) -> UnhrcResult<NaiveDate> {
    match cell {
        Some(DataType::String(s)) => parse_vote_date(s),
        Some(DataType::DateTime(f)) | Some(DataType::Float(f)) => {
            excel_serial_to_date(*f).context(ExcelWrongCellTypeSnafu {
                name,
                lineno,
                content: format!("{:?}", f),
            })
        }
        x => ExcelWrongCellTypeSnafu {
            name,
            lineno,
            content: format!("{:?}", x),
        }
        .fail(),
    }
}
