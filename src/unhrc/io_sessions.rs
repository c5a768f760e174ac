// Outputs of the reconstruction: the JSON summary and the session tables.

use std::io::Write;

use serde_json::json;
use snafu::ResultExt;

use crate::unhrc::{
    io_common::{simplify_file_name, STORE_DATE_FORMAT, SUMMARY_DATE_FORMAT},
    *,
};

pub const SESSIONS_FILE: &str = "sessions.csv";
pub const SESSION_MEMBERS_FILE: &str = "session_members.csv";
pub const RESOLUTION_SESSIONS_FILE: &str = "resolution_sessions.csv";

fn sessions_to_json(result: &SessionResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for session in result.sessions.iter() {
        let members: Vec<&String> = session.members.iter().collect();
        let resolutions: Vec<&String> = session.resolutions.iter().collect();
        l.push(json!({
            "index": session.index,
            "firstVote": session.first_vote.format(SUMMARY_DATE_FORMAT).to_string(),
            "lastVote": session.last_vote.format(SUMMARY_DATE_FORMAT).to_string(),
            "members": members,
            "resolutions": resolutions,
        }));
    }
    l
}

fn flagged_to_json(result: &SessionResult) -> Vec<JSValue> {
    result
        .flagged
        .iter()
        .map(|f| {
            json!({
                "resolution": f.resolution_id,
                "date": f.date.format(SUMMARY_DATE_FORMAT).to_string(),
                "conflictingSession": f.conflicting_session,
            })
        })
        .collect()
}

pub fn build_summary_js(settings: &RunSettings, result: &SessionResult) -> JSValue {
    json!({
        "config": {
            "source": simplify_file_name(&settings.input),
            "provider": settings.provider,
        },
        "sessions": sessions_to_json(result),
        "flagged": flagged_to_json(result),
    })
}

/// Replaces the session tables of the store.
pub fn write_session_tables(dir: &str, result: &SessionResult) -> UnhrcResult<()> {
    fs::create_dir_all(dir).context(WritingFileSnafu { path: dir })?;
    info!("Writing session tables to {:?}", dir);
    let create = |name: &str| -> UnhrcResult<fs::File> {
        let p = join_path(Path::new(dir), name);
        fs::File::create(&p).context(WritingFileSnafu { path: p.clone() })
    };
    let sessions_f = create(SESSIONS_FILE)?;
    let members_f = create(SESSION_MEMBERS_FILE)?;
    let resolutions_f = create(RESOLUTION_SESSIONS_FILE)?;
    write_session_tables_to(sessions_f, members_f, resolutions_f, result)
        .context(CsvWriteSnafu { path: dir })
}

pub fn write_session_tables_to<W1: Write, W2: Write, W3: Write>(
    sessions_w: W1,
    members_w: W2,
    resolutions_w: W3,
    result: &SessionResult,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(sessions_w);
    wtr.write_record(["session_number", "first_vote", "last_vote"])?;
    for s in result.sessions.iter() {
        wtr.write_record([
            s.index.to_string(),
            s.first_vote.format(STORE_DATE_FORMAT).to_string(),
            s.last_vote.format(STORE_DATE_FORMAT).to_string(),
        ])?;
    }
    wtr.flush()?;

    let mut wtr = csv::Writer::from_writer(members_w);
    wtr.write_record(["session_number", "country_short"])?;
    for s in result.sessions.iter() {
        let index = s.index.to_string();
        for m in s.members.iter() {
            wtr.write_record([index.as_str(), m.as_str()])?;
        }
    }
    wtr.flush()?;

    let mut wtr = csv::Writer::from_writer(resolutions_w);
    wtr.write_record(["resolution_name", "session_number"])?;
    for s in result.sessions.iter() {
        let index = s.index.to_string();
        for r in s.resolutions.iter() {
            wtr.write_record([r.as_str(), index.as_str()])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn result() -> SessionResult {
        SessionResult {
            sessions: vec![Session {
                index: 1,
                members: ["USA", "FRA"].iter().map(|s| s.to_string()).collect(),
                resolutions: ["R1", "R2"].iter().map(|s| s.to_string()).collect(),
                first_vote: day("2020-01-01"),
                last_vote: day("2020-06-01"),
            }],
            flagged: vec![FlaggedResolution {
                resolution_id: "R3".to_string(),
                date: day("2020-07-01"),
                conflicting_session: 1,
            }],
        }
    }

    #[test]
    fn summary() {
        let settings = RunSettings {
            provider: "marc".to_string(),
            input: "/tmp/data/votes.xml".to_string(),
            store: None,
            out: None,
            reference: None,
            resolutions_worksheet: "resolutions".to_string(),
            votes_worksheet: "votes".to_string(),
            rules: SessionRules::DEFAULT_RULES,
        };
        let js = build_summary_js(&settings, &result());
        assert_eq!(
            js,
            json!({
                "config": {"source": "votes.xml", "provider": "marc"},
                "sessions": [{
                    "index": 1,
                    "firstVote": "2020-01-01",
                    "lastVote": "2020-06-01",
                    "members": ["FRA", "USA"],
                    "resolutions": ["R1", "R2"]
                }],
                "flagged": [{
                    "resolution": "R3",
                    "date": "2020-07-01",
                    "conflictingSession": 1
                }]
            })
        );
    }

    #[test]
    fn tables() {
        let mut sessions_buf: Vec<u8> = Vec::new();
        let mut members_buf: Vec<u8> = Vec::new();
        let mut resolutions_buf: Vec<u8> = Vec::new();
        write_session_tables_to(
            &mut sessions_buf,
            &mut members_buf,
            &mut resolutions_buf,
            &result(),
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(sessions_buf).unwrap(),
            "session_number,first_vote,last_vote\n1,2020/01/01,2020/06/01\n"
        );
        assert_eq!(
            String::from_utf8(members_buf).unwrap(),
            "session_number,country_short\n1,FRA\n1,USA\n"
        );
        assert_eq!(
            String::from_utf8(resolutions_buf).unwrap(),
            "resolution_name,session_number\nR1,1\nR2,1\n"
        );
    }
}
