use clap::Parser;

/// Reconstructs the membership sessions of the UN Human Rights Council from its roll-call votes.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the input, the outputs and the rules.
    /// For more information about the file format, read the manual of the roster_sessions crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, unhrcnominate will
    /// check that the computed sessions match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the sessions will be written in JSON format
    /// to the given location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file or directory path) The voting records to read: a MARC XML file, a vote store directory or
    /// an Excel workbook. Setting this option overrides what may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default marc) The type of the input: marc, csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (directory path, optional) Where to write the normalized vote store and the session tables.
    #[clap(short, long, value_parser)]
    pub store: Option<String>,

    /// (default abort) What to do when a roster comes back after the membership changed: abort or skip.
    #[clap(long, value_parser)]
    pub on_regression: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
