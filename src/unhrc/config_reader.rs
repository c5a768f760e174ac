use crate::unhrc::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "summaryFile")]
    pub summary_file: Option<String>,
    #[serde(rename = "storeDirectory")]
    pub store_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InputSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    // Only for the xlsx provider
    #[serde(rename = "resolutionsWorksheetName")]
    pub resolutions_worksheet_name: Option<String>,
    #[serde(rename = "votesWorksheetName")]
    pub votes_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct RulesConfig {
    #[serde(rename = "onRosterRegression")]
    pub on_roster_regression: Option<String>,
}

impl RulesConfig {
    pub fn regression_policy(&self) -> UnhrcResult<RegressionPolicy> {
        match self.on_roster_regression.as_deref() {
            None => Ok(SessionRules::DEFAULT_RULES.regression_policy),
            Some(p) => parse_regression_policy(p),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnhrcConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "inputSource")]
    pub input_source: Option<InputSource>,
    #[serde(default)]
    pub rules: RulesConfig,
}

pub fn parse_regression_policy(policy: &str) -> UnhrcResult<RegressionPolicy> {
    match policy {
        "abort" => Ok(RegressionPolicy::Abort),
        "skip" | "skipResolution" => Ok(RegressionPolicy::SkipResolution),
        _ => UnknownPolicySnafu { policy }.fail(),
    }
}

pub fn parse_config(contents: &str) -> UnhrcResult<UnhrcConfig> {
    serde_json::from_str(contents).context(ParsingJsonSnafu {})
}

pub fn read_config(path: &str) -> UnhrcResult<UnhrcConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config = parse_config(contents.as_str())?;
    info!("config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> UnhrcResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}
