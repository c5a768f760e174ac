// Primitives shared by the readers and the writers.

use snafu::{OptionExt, ResultExt};
use std::collections::HashMap;

use crate::unhrc::*;

/// How dates are written in the vote store.
pub const STORE_DATE_FORMAT: &str = "%Y/%m/%d";
/// How dates are written in the summary.
pub const SUMMARY_DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", STORE_DATE_FORMAT, "%Y%m%d"];

/// Parses a vote date in any of the formats found in the records and in the store.
pub fn parse_vote_date(value: &str) -> UnhrcResult<NaiveDate> {
    let s = value.trim();
    let mut last_err: Option<chrono::ParseError> = None;
    for fmt in DATE_FORMATS.iter() {
        match NaiveDate::parse_from_str(s, fmt) {
            Ok(d) => return Ok(d),
            Err(e) => last_err = Some(e),
        }
    }
    match last_err {
        Some(e) => Err(e).context(InvalidDateSnafu { value }),
        None => whatever!("No date format to parse {:?}", value),
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// A line of the resolutions table, in any of the store formats.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResolutionRow {
    pub name: String,
    pub date: NaiveDate,
    pub summary: String,
    pub agenda: String,
}

/// A line of the votes table, in any of the store formats.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRow {
    pub lineno: usize,
    pub resolution: String,
    pub country: String,
    pub vote: String,
}

/// Groups the votes under their resolutions.
///
/// The resolutions keep the order of the table. Votes for unknown resolutions and
/// repeated votes are ignored.
pub fn assemble_resolutions(
    resolution_rows: &[ResolutionRow],
    vote_rows: &[VoteRow],
) -> UnhrcResult<Vec<Resolution>> {
    let mut res: Vec<Resolution> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in resolution_rows.iter() {
        if positions.contains_key(&row.name) {
            warn!(
                "Resolution {} already in the resolutions table, is it a duplicate? Ignoring it",
                row.name
            );
            continue;
        }
        positions.insert(row.name.clone(), res.len());
        res.push(Resolution::new(
            &row.name,
            row.date,
            &row.summary,
            &row.agenda,
        ));
    }

    for row in vote_rows.iter() {
        let pos = match positions.get(&row.resolution) {
            Some(pos) => *pos,
            None => {
                warn!(
                    "Line {}: vote of {} for unknown resolution {}. Ignoring it",
                    row.lineno, row.country, row.resolution
                );
                continue;
            }
        };
        let vote = Vote::from_record_value(&row.vote).context(UnknownVoteCodeSnafu {
            resolution: row.resolution.clone(),
            country: row.country.clone(),
            value: row.vote.clone(),
        })?;
        if !res[pos].add_vote(&row.country, vote) {
            warn!(
                "Line {}: vote already recorded for {} on resolution {}, is it a duplicate? Ignoring it",
                row.lineno, row.country, row.resolution
            );
        }
    }
    debug!("assemble_resolutions: {} resolutions", res.len());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn vote_row(lineno: usize, resolution: &str, country: &str, vote: &str) -> VoteRow {
        VoteRow {
            lineno,
            resolution: resolution.to_string(),
            country: country.to_string(),
            vote: vote.to_string(),
        }
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_vote_date("2011-03-25").unwrap(), day("2011-03-25"));
        assert_eq!(parse_vote_date("2011/03/25").unwrap(), day("2011-03-25"));
        assert_eq!(parse_vote_date(" 20110325 ").unwrap(), day("2011-03-25"));
        assert!(matches!(
            parse_vote_date("25 March 2011"),
            Err(UnhrcError::InvalidDate { .. })
        ));
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/data/votes.xml"), "votes.xml");
        assert_eq!(simplify_file_name("votes.xml"), "votes.xml");
    }

    #[test]
    fn assemble() {
        let resolutions = vec![
            ResolutionRow {
                name: "R1".to_string(),
                date: day("2012-03-22"),
                summary: "s1".to_string(),
                agenda: "".to_string(),
            },
            ResolutionRow {
                name: "R2".to_string(),
                date: day("2012-03-23"),
                summary: "s2".to_string(),
                agenda: "".to_string(),
            },
        ];
        let votes = vec![
            vote_row(2, "R1", "CHN", "YES"),
            vote_row(3, "R1", "USA", "N"),
            vote_row(4, "R2", "USA", "ABSTAIN"),
            vote_row(5, "R3", "USA", "YES"),
            vote_row(6, "R1", "CHN", "NO"),
        ];
        let res = assemble_resolutions(&resolutions, &votes).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(
            res[0].votes,
            vec![
                CountryVote {
                    country: "CHN".to_string(),
                    vote: Vote::Yes
                },
                CountryVote {
                    country: "USA".to_string(),
                    vote: Vote::No
                }
            ]
        );
        assert_eq!(res[1].votes.len(), 1);
    }

    #[test]
    fn unknown_vote() {
        let resolutions = vec![ResolutionRow {
            name: "R1".to_string(),
            date: day("2012-03-22"),
            summary: "".to_string(),
            agenda: "".to_string(),
        }];
        let votes = vec![vote_row(2, "R1", "CHN", "maybe")];
        match assemble_resolutions(&resolutions, &votes) {
            Err(UnhrcError::UnknownVoteCode {
                resolution,
                country,
                value,
            }) => {
                assert_eq!(resolution, "R1");
                assert_eq!(country, "CHN");
                assert_eq!(value, "maybe");
            }
            x => panic!("unexpected {:?}", x),
        }
    }
}
