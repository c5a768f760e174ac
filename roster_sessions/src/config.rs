// ********* Input data structures ***********

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDate;

/// One resolution as seen by the reconstruction: its identifier, the date of
/// the vote and the set of countries that cast any vote on it.
///
/// The records are expected in non-decreasing date order. Validating the
/// identifier and the date is the job of whoever produces the records.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResolutionRoster {
    pub resolution_id: String,
    pub date: NaiveDate,
    pub roster: BTreeSet<String>,
}

impl ResolutionRoster {
    pub fn new<I, S>(resolution_id: &str, date: NaiveDate, countries: I) -> ResolutionRoster
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResolutionRoster {
            resolution_id: resolution_id.to_string(),
            date,
            roster: countries.into_iter().map(|c| c.into()).collect(),
        }
    }
}

// ******** Output data structures *********

/// A contiguous period of stable Council membership.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Session {
    /// 1-based, in order of first appearance.
    pub index: u32,
    pub members: BTreeSet<String>,
    pub resolutions: BTreeSet<String>,
    pub first_vote: NaiveDate,
    pub last_vote: NaiveDate,
}

/// A resolution that was kept out of every session because its roster
/// regressed to the roster of an earlier session.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FlaggedResolution {
    pub resolution_id: String,
    pub date: NaiveDate,
    pub conflicting_session: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SessionResult {
    /// In index order.
    pub sessions: Vec<Session>,
    /// Only filled with the `SkipResolution` policy.
    pub flagged: Vec<FlaggedResolution>,
}

impl SessionResult {
    /// The session a resolution was attributed to, if any.
    #[cfg(test)]
    pub(crate) fn session_of(&self, resolution_id: &str) -> Option<&Session> {
        self.sessions
            .iter()
            .find(|s| s.resolutions.contains(resolution_id))
    }

    /// The number of resolutions attributed to a session.
    pub fn num_resolutions(&self) -> usize {
        self.sessions
            .iter()
            .map(|s| s.resolutions.len())
            .sum::<usize>()
    }
}

/// What happened to a resolution fed to the builder.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SessionStep {
    /// A new session was created for this roster.
    Opened(u32),
    /// The resolution continues the current session.
    Extended(u32),
    /// The resolution regressed to the roster of the given session and was
    /// set aside.
    Flagged(u32),
}

/// Errors that prevent the reconstruction from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SessionErrors {
    /// A roster came back after the membership changed away from it.
    ///
    /// This is either a genuine re-admission of the exact same members or,
    /// more likely, a resolution in between that forgot one of the voters.
    RosterRegression {
        resolution_id: String,
        date: NaiveDate,
        conflicting_session: u32,
    },
}

impl Error for SessionErrors {}

impl Display for SessionErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionErrors::RosterRegression {
                resolution_id,
                date,
                conflicting_session,
            } => write!(
                f,
                "resolution {} voted on {}: its roster matches session #{} which already ended",
                resolution_id, date, conflicting_session
            ),
        }
    }
}

// ********* Configuration **********

/// What to do when a roster regression is detected.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RegressionPolicy {
    /// Return the error to the caller. Nothing is merged.
    Abort,
    /// Keep the resolution out of all sessions and report it in
    /// `SessionResult::flagged`.
    SkipResolution,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SessionRules {
    pub regression_policy: RegressionPolicy,
}

impl SessionRules {
    pub const DEFAULT_RULES: SessionRules = SessionRules {
        regression_policy: RegressionPolicy::Abort,
    };
}

impl Default for SessionRules {
    fn default() -> Self {
        SessionRules::DEFAULT_RULES
    }
}
