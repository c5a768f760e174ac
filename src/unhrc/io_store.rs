// The normalized vote store: two CSV tables in a directory.

use std::io::{Read, Write};

use snafu::{OptionExt, ResultExt};

use crate::unhrc::{
    io_common::{assemble_resolutions, parse_vote_date, ResolutionRow, VoteRow, STORE_DATE_FORMAT},
    *,
};

pub const RESOLUTIONS_FILE: &str = "resolutions.csv";
pub const VOTES_FILE: &str = "votes.csv";

pub fn read_store(dir: &str) -> UnhrcResult<Vec<Resolution>> {
    let resolutions_p = join_path(Path::new(dir), RESOLUTIONS_FILE);
    let votes_p = join_path(Path::new(dir), VOTES_FILE);
    info!("Attempting to read vote store {:?}", dir);
    let resolutions_f = fs::File::open(&resolutions_p).context(OpeningFileSnafu {
        path: resolutions_p.clone(),
    })?;
    let votes_f = fs::File::open(&votes_p).context(OpeningFileSnafu {
        path: votes_p.clone(),
    })?;
    read_store_from(resolutions_f, votes_f)
}

pub fn read_store_from<R1: Read, R2: Read>(resolutions: R1, votes: R2) -> UnhrcResult<Vec<Resolution>> {
    let mut resolution_rows: Vec<ResolutionRow> = Vec::new();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(resolutions);
    for (idx, line_r) in rdr.records().enumerate() {
        // Line 1 is the header.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_store_from: resolutions: {:?} {:?}", lineno, line);
        let name = line.get(0).context(CsvLineToShortSnafu { lineno })?;
        let date_s = line.get(1).context(CsvLineToShortSnafu { lineno })?;
        resolution_rows.push(ResolutionRow {
            name: name.to_string(),
            date: parse_vote_date(date_s)?,
            summary: line.get(2).unwrap_or("").to_string(),
            agenda: line.get(3).unwrap_or("").to_string(),
        });
    }

    let mut vote_rows: Vec<VoteRow> = Vec::new();
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(votes);
    for (idx, line_r) in rdr.records().enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {})?;
        let get = |i: usize| -> UnhrcResult<String> {
            Ok(line.get(i).context(CsvLineToShortSnafu { lineno })?.to_string())
        };
        vote_rows.push(VoteRow {
            lineno,
            resolution: get(0)?,
            country: get(1)?,
            vote: get(2)?,
        });
    }
    info!(
        "read_store_from: {} resolutions, {} votes",
        resolution_rows.len(),
        vote_rows.len()
    );
    assemble_resolutions(&resolution_rows, &vote_rows)
}

/// Replaces the content of the store with the given resolutions.
pub fn write_store(dir: &str, resolutions: &[Resolution]) -> UnhrcResult<()> {
    fs::create_dir_all(dir).context(WritingFileSnafu { path: dir })?;
    let resolutions_p = join_path(Path::new(dir), RESOLUTIONS_FILE);
    let votes_p = join_path(Path::new(dir), VOTES_FILE);
    info!("Writing vote store to {:?}", dir);
    let resolutions_f = fs::File::create(&resolutions_p).context(WritingFileSnafu {
        path: resolutions_p.clone(),
    })?;
    let votes_f = fs::File::create(&votes_p).context(WritingFileSnafu {
        path: votes_p.clone(),
    })?;
    write_store_to(resolutions_f, votes_f, resolutions)
        .context(CsvWriteSnafu { path: dir })
}

pub fn write_store_to<W1: Write, W2: Write>(
    resolutions_w: W1,
    votes_w: W2,
    resolutions: &[Resolution],
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(resolutions_w);
    wtr.write_record(["name", "vote_date", "summary", "agenda"])?;
    for r in resolutions.iter() {
        let date = r.date.format(STORE_DATE_FORMAT).to_string();
        wtr.write_record([
            r.name.as_str(),
            date.as_str(),
            r.summary.as_str(),
            r.agenda.as_str(),
        ])?;
    }
    wtr.flush()?;

    let mut wtr = csv::Writer::from_writer(votes_w);
    wtr.write_record(["resolution_name", "country_short", "vote"])?;
    for r in resolutions.iter() {
        for cv in r.votes.iter() {
            wtr.write_record([r.name.as_str(), cv.country.as_str(), cv.vote.record_name()])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
