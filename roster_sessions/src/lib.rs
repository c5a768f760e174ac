mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};

use std::collections::BTreeSet;

pub use crate::config::*;

use crate::builder::Builder;

// **** Private structures ****

/// Canonical, order-independent key of a roster.
///
/// The members are sorted, each one prefixed by its length so that no
/// separator inside a code can make two rosters collide, and the result is
/// hashed.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub(crate) struct Fingerprint(String);

impl Fingerprint {
    pub(crate) fn of(roster: &BTreeSet<String>) -> Fingerprint {
        // BTreeSet iterates in sorted order.
        let canonical: String = roster
            .iter()
            .map(|c| format!("{}:{}|", c.len(), c))
            .collect();
        Fingerprint(sha256::digest(canonical.as_str()))
    }

    pub(crate) fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

/// Runs the session reconstruction over a stream of resolutions.
///
/// Arguments:
/// * `stream` the resolutions, in non-decreasing date order
/// * `rules` what to do when a roster regression is found
///
/// The sessions are returned in the order in which their roster was first
/// seen.
pub fn reconstruct_sessions<I>(stream: I, rules: &SessionRules) -> Result<SessionResult, SessionErrors>
where
    I: IntoIterator<Item = ResolutionRoster>,
{
    info!("reconstruct_sessions: rules: {:?}", rules);
    let mut builder = Builder::new(rules);
    let mut num_records: usize = 0;
    for record in stream {
        num_records += 1;
        let step = builder.add_resolution(&record)?;
        debug!(
            "reconstruct_sessions: {} -> {:?}",
            record.resolution_id, step
        );
    }
    let res = builder.finish();
    info!(
        "reconstruct_sessions: {} resolutions, {} sessions, {} flagged",
        num_records,
        res.sessions.len(),
        res.flagged.len()
    );
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rr(id: &str, date: &str, countries: &[&str]) -> ResolutionRoster {
        ResolutionRoster::new(id, day(date), countries.iter().copied())
    }

    fn set(xs: &[&str]) -> BTreeSet<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_stream() {
        init();
        let res = reconstruct_sessions(vec![], &SessionRules::DEFAULT_RULES).unwrap();
        assert!(res.sessions.is_empty());
        assert!(res.flagged.is_empty());
    }

    #[test]
    fn single_resolution() {
        init();
        let res = reconstruct_sessions(
            vec![rr("R1", "2020-01-01", &["USA", "FRA"])],
            &SessionRules::DEFAULT_RULES,
        )
        .unwrap();
        assert_eq!(res.sessions.len(), 1);
        let s = &res.sessions[0];
        assert_eq!(s.index, 1);
        assert_eq!(s.first_vote, s.last_vote);
        assert_eq!(s.resolutions, set(&["R1"]));
    }

    #[test]
    fn single_session() {
        init();
        let res = reconstruct_sessions(
            vec![
                rr("R1", "2020-01-01", &["USA", "FRA"]),
                rr("R2", "2020-06-01", &["USA", "FRA"]),
            ],
            &SessionRules::DEFAULT_RULES,
        )
        .unwrap();
        assert_eq!(
            res.sessions,
            vec![Session {
                index: 1,
                members: set(&["USA", "FRA"]),
                resolutions: set(&["R1", "R2"]),
                first_vote: day("2020-01-01"),
                last_vote: day("2020-06-01"),
            }]
        );
    }

    #[test]
    fn membership_change() {
        init();
        let res = reconstruct_sessions(
            vec![
                rr("R1", "2020-01-01", &["USA", "FRA"]),
                rr("R2", "2021-01-01", &["USA", "FRA", "DEU"]),
            ],
            &SessionRules::DEFAULT_RULES,
        )
        .unwrap();
        assert_eq!(
            res.sessions,
            vec![
                Session {
                    index: 1,
                    members: set(&["USA", "FRA"]),
                    resolutions: set(&["R1"]),
                    first_vote: day("2020-01-01"),
                    last_vote: day("2020-01-01"),
                },
                Session {
                    index: 2,
                    members: set(&["USA", "FRA", "DEU"]),
                    resolutions: set(&["R2"]),
                    first_vote: day("2021-01-01"),
                    last_vote: day("2021-01-01"),
                }
            ]
        );
    }

    #[test]
    fn roster_order_does_not_matter() {
        init();
        let res = reconstruct_sessions(
            vec![
                rr("R1", "2020-01-01", &["USA", "FRA", "DEU"]),
                rr("R2", "2020-01-02", &["DEU", "USA", "FRA"]),
                rr("R3", "2020-01-03", &["FRA", "DEU", "USA", "FRA"]),
            ],
            &SessionRules::DEFAULT_RULES,
        )
        .unwrap();
        assert_eq!(res.sessions.len(), 1);
        assert_eq!(res.sessions[0].resolutions, set(&["R1", "R2", "R3"]));
    }

    #[test]
    fn regression_is_an_error() {
        init();
        let res = reconstruct_sessions(
            vec![
                rr("R1", "2020-01-01", &["A", "B", "C"]),
                rr("R2", "2020-02-01", &["A", "B"]),
                rr("R3", "2020-03-01", &["A", "B", "C"]),
            ],
            &SessionRules::DEFAULT_RULES,
        );
        assert_eq!(
            res,
            Err(SessionErrors::RosterRegression {
                resolution_id: "R3".to_string(),
                date: day("2020-03-01"),
                conflicting_session: 1,
            })
        );
    }

    #[test]
    fn regression_skipped() {
        init();
        let rules = SessionRules {
            regression_policy: RegressionPolicy::SkipResolution,
        };
        let res = reconstruct_sessions(
            vec![
                rr("R1", "2020-01-01", &["A", "B", "C"]),
                rr("R2", "2020-02-01", &["A", "B"]),
                rr("R3", "2020-03-01", &["A", "B", "C"]),
                rr("R4", "2020-04-01", &["A", "B"]),
            ],
            &rules,
        )
        .unwrap();
        assert_eq!(res.sessions.len(), 2);
        assert_eq!(res.sessions[0].resolutions, set(&["R1"]));
        // The skipped resolution does not break the run of the second session.
        assert_eq!(res.sessions[1].resolutions, set(&["R2", "R4"]));
        assert_eq!(res.sessions[1].last_vote, day("2020-04-01"));
        assert_eq!(
            res.flagged,
            vec![FlaggedResolution {
                resolution_id: "R3".to_string(),
                date: day("2020-03-01"),
                conflicting_session: 1,
            }]
        );
    }

    #[test]
    fn empty_roster_is_a_session() {
        init();
        let res = reconstruct_sessions(
            vec![
                rr("R1", "2020-01-01", &[]),
                rr("R2", "2020-01-02", &["USA"]),
            ],
            &SessionRules::DEFAULT_RULES,
        )
        .unwrap();
        assert_eq!(res.sessions.len(), 2);
        assert!(res.sessions[0].members.is_empty());
        assert_eq!(res.sessions[1].index, 2);
    }

    #[test]
    fn same_day_different_rosters() {
        init();
        let res = reconstruct_sessions(
            vec![
                rr("R1", "2020-01-01", &["USA", "FRA"]),
                rr("R2", "2020-01-01", &["USA", "FRA", "DEU"]),
                rr("R3", "2020-01-01", &["USA", "FRA", "DEU"]),
            ],
            &SessionRules::DEFAULT_RULES,
        )
        .unwrap();
        assert_eq!(res.sessions.len(), 2);
        assert_eq!(res.sessions[1].resolutions, set(&["R2", "R3"]));
    }

    // A larger stream to check the structural properties together.
    fn long_stream() -> Vec<ResolutionRoster> {
        let rosters: Vec<&[&str]> = vec![
            &["ARG", "BRA", "CHN"][..],
            &["ARG", "BRA", "CHN", "DEU"][..],
            &["BRA", "CHN", "DEU"][..],
            &["BRA", "CHN", "DEU", "EGY"][..],
        ];
        let mut res: Vec<ResolutionRoster> = Vec::new();
        let start = day("2010-01-01");
        for (block, roster) in rosters.iter().enumerate() {
            for i in 0..5 {
                let idx = block * 5 + i;
                res.push(ResolutionRoster::new(
                    &format!("A/HRC/RES/{}", idx),
                    start + chrono::Duration::days((idx * 7) as i64),
                    roster.iter().copied(),
                ));
            }
        }
        res
    }

    #[test]
    fn deterministic() {
        init();
        let a = reconstruct_sessions(long_stream(), &SessionRules::DEFAULT_RULES).unwrap();
        let b = reconstruct_sessions(long_stream(), &SessionRules::DEFAULT_RULES).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn partition_and_dates() {
        init();
        let input = long_stream();
        let res = reconstruct_sessions(input.clone(), &SessionRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.sessions.len(), 4);
        assert_eq!(res.num_resolutions(), input.len());

        let mut seen: HashSet<String> = HashSet::new();
        for s in res.sessions.iter() {
            for r in s.resolutions.iter() {
                assert!(seen.insert(r.clone()), "{} in two sessions", r);
            }
        }
        for r in input.iter() {
            assert!(seen.contains(&r.resolution_id));
            let s = res.session_of(&r.resolution_id).unwrap();
            assert!(s.first_vote <= r.date && r.date <= s.last_vote);
        }

        let mut member_sets: HashSet<BTreeSet<String>> = HashSet::new();
        for (idx, s) in res.sessions.iter().enumerate() {
            assert_eq!(s.index, (idx + 1) as u32);
            assert!(s.first_vote <= s.last_vote);
            assert!(member_sets.insert(s.members.clone()));
        }
    }

    #[test]
    fn fingerprint_is_unambiguous() {
        assert_eq!(
            Fingerprint::of(&set(&["USA", "FRA"])),
            Fingerprint::of(&set(&["FRA", "USA"]))
        );
        assert_ne!(
            Fingerprint::of(&set(&["A|B"])),
            Fingerprint::of(&set(&["A", "B"]))
        );
        assert_ne!(Fingerprint::of(&set(&[])), Fingerprint::of(&set(&[""])));
    }
}
