use clap::{Parser, Subcommand};

/// This is a tool to run declarative site surveys: it validates and stores submissions,
/// and computes the results of each survey.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, default config/survey_configurations.json) The file containing the configurations of all the
    /// surveys. For more information about the file format, read the documentation of the survey_tally crate.
    #[clap(short, long, value_parser, default_value = "config/survey_configurations.json")]
    pub config: String,

    /// (file path, default survey_store.json) The JSON file holding the record types and the stored submissions.
    /// It is created if it does not exist.
    #[clap(short, long, value_parser, default_value = "survey_store.json")]
    pub store: String,

    /// (url) The home page of the site. Visitors are sent back there after a submission when the form does not say
    /// where to go.
    #[clap(long, value_parser, default_value = "http://localhost/")]
    pub home_url: String,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Registers the record types of all the configured surveys.
    Register,

    /// Describes the fields of a survey form.
    Form {
        /// The identifier of the survey.
        #[clap(value_parser)]
        survey: String,
        /// (file path, 'stdout' or empty) Where to write the description.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },

    /// Validates a submitted form and stores it.
    Submit {
        /// (URL-encoded form body) The submitted form, for example 'survey_slug=feedback&q_rating=5'.
        #[clap(short, long, value_parser)]
        data: Option<String>,
        /// (file path) A JSON object with the submitted fields. Arrays hold the values of checkboxes.
        #[clap(long, value_parser)]
        data_file: Option<String>,
    },

    /// Computes the results of a survey.
    Results {
        /// The identifier of the survey.
        #[clap(value_parser)]
        survey: String,
        /// (file path, 'stdout' or empty) If specified, the results will be written in JSON format to the given location.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) A reference file containing results in JSON format. If provided, sitesurvey will
        /// check that the computed results match the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },

    /// Lists the latest submissions of a survey.
    Entries {
        /// The identifier of the survey.
        #[clap(value_parser)]
        survey: String,
        /// (default 10) The number of submissions to list.
        #[clap(short, long, value_parser, default_value_t = 10)]
        number: usize,
        /// (asc or desc, default desc) List the oldest or the most recent submissions first.
        #[clap(long, value_parser, default_value = "desc")]
        order: String,
    },
}
