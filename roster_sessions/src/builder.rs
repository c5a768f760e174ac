use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

pub use crate::config::*;
use crate::Fingerprint;

/// A builder that reconstructs the sessions one resolution at a time.
///
/// It holds all the state of one reconstruction: it should be created for a
/// run and dropped (or finished) after it.
///
/// ```
/// use chrono::NaiveDate;
/// use roster_sessions::builder::Builder;
/// use roster_sessions::{ResolutionRoster, SessionRules, SessionStep};
/// # use roster_sessions::SessionErrors;
///
/// let mut builder = Builder::new(&SessionRules::DEFAULT_RULES);
/// let date = NaiveDate::from_ymd_opt(2006, 6, 30).unwrap();
///
/// let step = builder.add_resolution(&ResolutionRoster::new("A/HRC/RES/1/1", date, ["CAN", "ZAF"]))?;
/// assert_eq!(step, SessionStep::Opened(1));
///
/// let res = builder.finish();
/// assert_eq!(res.sessions.len(), 1);
///
/// # Ok::<(), SessionErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: SessionRules,
    // In index order.
    pub(crate) _sessions: Vec<Session>,
    // Position of the session in _sessions.
    pub(crate) _by_fingerprint: HashMap<Fingerprint, usize>,
    pub(crate) _previous: Option<Fingerprint>,
    pub(crate) _last_date: Option<NaiveDate>,
    pub(crate) _flagged: Vec<FlaggedResolution>,
}

impl Builder {
    pub fn new(rules: &SessionRules) -> Builder {
        Builder {
            _rules: rules.clone(),
            _sessions: Vec::new(),
            _by_fingerprint: HashMap::new(),
            _previous: None,
            _last_date: None,
            _flagged: Vec::new(),
        }
    }

    /// Attributes one resolution to a session.
    ///
    /// If an error is returned, the state of the builder is unchanged and the
    /// caller may keep adding resolutions.
    pub fn add_resolution(&mut self, record: &ResolutionRoster) -> Result<SessionStep, SessionErrors> {
        let fp = Fingerprint::of(&record.roster);

        if let Some(last_date) = self._last_date {
            if record.date < last_date {
                warn!(
                    "add_resolution: resolution {} is dated {} but follows a vote on {}",
                    record.resolution_id, record.date, last_date
                );
            }
        }

        // This roster was already seen, then the membership changed, and now it is back.
        // E.g. [a,b,c] -> [a,b] -> [a,b,c]
        let existing: Option<usize> = self._by_fingerprint.get(&fp).copied();
        if self._previous.as_ref() != Some(&fp) {
            if let Some(pos) = existing {
                let conflicting_session = self._sessions[pos].index;
                warn!(
                    "add_resolution: roster regression on resolution {} ({}): roster {} of session #{} seen again",
                    record.resolution_id,
                    record.date,
                    fp.short(),
                    conflicting_session
                );
                return match self._rules.regression_policy {
                    RegressionPolicy::Abort => Err(SessionErrors::RosterRegression {
                        resolution_id: record.resolution_id.clone(),
                        date: record.date,
                        conflicting_session,
                    }),
                    RegressionPolicy::SkipResolution => {
                        self._flagged.push(FlaggedResolution {
                            resolution_id: record.resolution_id.clone(),
                            date: record.date,
                            conflicting_session,
                        });
                        self.advance_date(record.date);
                        Ok(SessionStep::Flagged(conflicting_session))
                    }
                };
            }
        }

        let step = match existing {
            Some(pos) => {
                let session = &mut self._sessions[pos];
                session.resolutions.insert(record.resolution_id.clone());
                session.last_vote = session.last_vote.max(record.date);
                debug!(
                    "add_resolution: resolution {} added to session #{}",
                    record.resolution_id, session.index
                );
                SessionStep::Extended(session.index)
            }
            None => {
                let index = (self._sessions.len() + 1) as u32;
                info!(
                    "New session #{} on {}, resolution {}, members: {}",
                    index,
                    record.date,
                    record.resolution_id,
                    record
                        .roster
                        .iter()
                        .cloned()
                        .collect::<Vec<String>>()
                        .join(", ")
                );
                let mut resolutions: BTreeSet<String> = BTreeSet::new();
                resolutions.insert(record.resolution_id.clone());
                self._sessions.push(Session {
                    index,
                    members: record.roster.clone(),
                    resolutions,
                    first_vote: record.date,
                    last_vote: record.date,
                });
                self._by_fingerprint
                    .insert(fp.clone(), self._sessions.len() - 1);
                SessionStep::Opened(index)
            }
        };

        self._previous = Some(fp);
        self.advance_date(record.date);
        Ok(step)
    }

    /// The session the last attributed resolution went to. It may still grow.
    pub fn open_session(&self) -> Option<&Session> {
        self._previous
            .as_ref()
            .and_then(|fp| self._by_fingerprint.get(fp))
            .map(|&pos| &self._sessions[pos])
    }

    pub fn finish(self) -> SessionResult {
        SessionResult {
            sessions: self._sessions,
            flagged: self._flagged,
        }
    }

    fn advance_date(&mut self, date: NaiveDate) {
        self._last_date = Some(self._last_date.map_or(date, |d| d.max(date)));
    }
}
