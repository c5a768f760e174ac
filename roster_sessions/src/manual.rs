/*!

This is the long-form manual for `roster_sessions` and `unhrcnominate`.

## Sessions

The Human Rights Council does not publish, alongside its roll-call votes, which
countries were members when a vote was taken. Every recorded vote however lists
all the members, including the ones that abstained or did not vote. The set of
countries listed on a resolution (its *roster*) is therefore used as a proxy
for the membership at that date.

A *session* is a maximal run of consecutive resolutions sharing exactly the same
roster. Sessions are numbered from 1, in the order in which their roster first
appears. Each session records its members, its resolutions and the dates of its
first and last votes.

If a roster comes back after the membership changed away from it, for example

```text
[ARG, BRA, CHN] -> [ARG, BRA] -> [ARG, BRA, CHN]
```

the reconstruction stops with a `RosterRegression` error naming the resolution
and the session whose roster reappeared. This almost always means that a voter
was forgotten in the resolution in the middle. With the `skip` policy
(`--on-regression skip`), the offending resolution is instead left out of all
sessions and reported in the `flagged` list of the summary.

## Input formats

### `marc`

The MARC 21 (slim) XML export of the voting records of the UN Human Rights
Office library. The following fields are read from every `record`:

| field | subfield | content                                    |
|-------|----------|--------------------------------------------|
| 791   | a        | resolution symbol                          |
| 269   | a        | date of the vote (`YYYY-MM-DD`)            |
| 245   | all      | summary                                    |
| 991   | all      | agenda item                                |
| 967   | b        | country code (3 letters, one per field)    |
| 967   | d        | vote: `Y`, `N`, `A` or `.` (did not vote)  |

Country codes that do not have 3 letters are ignored. A country without a vote
is recorded as not voting.

### `csv`

A directory holding the normalized vote store:

```text
resolutions.csv: name,vote_date,summary,agenda
A/HRC/RES/7/1,2008/03/27,Right to food,Item 3

votes.csv: resolution_name,country_short,vote
A/HRC/RES/7/1,CAN,NO
A/HRC/RES/7/1,CHN,YES
```

Dates are written `YYYY/MM/DD`. Votes are written `YES`, `NO`, `ABSTAIN` or
`NO_VOTE`; the one-letter codes of the MARC export are accepted as well.

### `xlsx`

An Excel workbook with two worksheets (by default `resolutions` and `votes`)
holding the same columns as the CSV store, with a header row. Dates may be
either text or Excel dates.

## Outputs

The summary is a JSON document:

```text
{
  "config": { "provider": "marc", "source": "votes.xml" },
  "flagged": [],
  "sessions": [
    {
      "firstVote": "2008-03-27",
      "index": 1,
      "lastVote": "2008-06-18",
      "members": ["CAN", "CHN"],
      "resolutions": ["A/HRC/RES/7/1"]
    }
  ]
}
```

When a store directory is given, the normalized vote store is written there as
well as the session tables `sessions.csv`, `session_members.csv` and
`resolution_sessions.csv`.

## Configuration

All the options can be given in a JSON file passed with `--config`. Paths are
relative to the directory of the configuration file. Command line flags take
precedence.

```text
{
  "outputSettings": {
    "summaryFile": "sessions.json",
    "storeDirectory": "store"
  },
  "inputSource": {
    "provider": "marc",
    "filePath": "votes.xml"
  },
  "rules": {
    "onRosterRegression": "abort"
  }
}
```

For the `xlsx` provider, `resolutionsWorksheetName` and `votesWorksheetName`
select the worksheets.

 */
