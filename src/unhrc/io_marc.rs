// Reader for the MARC 21 slim XML export of the voting records.

use serde::Deserialize;
use snafu::{OptionExt, ResultExt};

use crate::unhrc::{io_common::parse_vote_date, *};

const TAG_SYMBOL: &str = "791";
const TAG_DATE: &str = "269";
const TAG_TITLE: &str = "245";
const TAG_AGENDA: &str = "991";
const TAG_VOTE: &str = "967";

pub fn read_marc(path: &str) -> UnhrcResult<Vec<Resolution>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read_marc: read {} bytes from {:?}", contents.len(), path);
    parse_marc(contents.as_str())
}

pub fn parse_marc(contents: &str) -> UnhrcResult<Vec<Resolution>> {
    let collection: MarcCollection = quick_xml::de::from_str(contents).context(ParsingXmlSnafu {})?;
    info!("parse_marc: {} records", collection.records.len());
    let mut res: Vec<Resolution> = Vec::new();
    for (idx, record) in collection.records.iter().enumerate() {
        res.push(record_to_resolution(record, idx + 1)?);
    }
    Ok(res)
}

fn record_to_resolution(record: &MarcRecord, record_idx: usize) -> UnhrcResult<Resolution> {
    let name = record
        .first_subfield(TAG_SYMBOL, "a")
        .context(MissingMarcFieldSnafu {
            record_idx,
            tag: TAG_SYMBOL,
            code: "a",
        })?;
    let date_s = record
        .first_subfield(TAG_DATE, "a")
        .context(MissingMarcFieldSnafu {
            record_idx,
            tag: TAG_DATE,
            code: "a",
        })?;
    let date = parse_vote_date(date_s)?;
    let summary: String = record.fields(TAG_TITLE).map(|f| f.text()).collect();
    let agenda: String = record.fields(TAG_AGENDA).map(|f| f.text()).collect();

    let mut resolution = Resolution::new(name, date, &summary, &agenda);

    for field in record.fields(TAG_VOTE) {
        let country = match field.subfield("b") {
            Some(c) => c,
            None => {
                warn!(
                    "Record #{}: vote without a country in resolution {}. Ignoring it",
                    record_idx, name
                );
                continue;
            }
        };
        if country.chars().count() != 3 {
            warn!(
                "Illegal country name {:?} in resolution {}. Ignoring it",
                country, name
            );
            continue;
        }
        let vote = match field.subfield("d") {
            Some(v) => Vote::from_record_value(v).context(UnknownVoteCodeSnafu {
                resolution: name,
                country,
                value: v,
            })?,
            None => {
                warn!(
                    "In {}, {} was missing a voting intention. Recording it as not voting",
                    name, country
                );
                Vote::NoVote
            }
        };
        if !resolution.add_vote(country, vote) {
            warn!(
                "Vote already recorded for {} on resolution {}, is it a duplicate? Ignoring it",
                country, name
            );
        }
    }
    debug!(
        "record_to_resolution: {} on {}: {} votes",
        resolution.name,
        resolution.date,
        resolution.votes.len()
    );
    Ok(resolution)
}

#[derive(Debug, Clone, Deserialize)]
struct MarcCollection {
    #[serde(rename = "record", default)]
    records: Vec<MarcRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct MarcRecord {
    #[serde(rename = "datafield", default)]
    datafields: Vec<MarcDatafield>,
}

impl MarcRecord {
    fn fields<'a>(&'a self, tag: &'static str) -> impl Iterator<Item = &'a MarcDatafield> + 'a {
        self.datafields.iter().filter(move |f| f.tag == tag)
    }

    fn first_subfield(&self, tag: &'static str, code: &str) -> Option<&str> {
        self.fields(tag).find_map(|f| f.subfield(code))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct MarcDatafield {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "subfield", default)]
    subfields: Vec<MarcSubfield>,
}

impl MarcDatafield {
    fn subfield(&self, code: &str) -> Option<&str> {
        self.subfields
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.value.as_str())
    }

    // All the subfields, concatenated.
    fn text(&self) -> String {
        self.subfields.iter().map(|s| s.value.as_str()).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct MarcSubfield {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "$text", default)]
    value: String,
}
