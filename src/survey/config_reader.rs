use log::{debug, info, warn};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::{prelude::*, Snafu};
use std::fs;
use std::path::Path;

use survey_tally::sanitize::sanitize_key;
use survey_tally::*;

pub const DEFAULT_SUPPORTS: [&str; 3] = ["title", "editor", "custom-fields"];

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LoadError {
    #[snafu(display("survey configuration file not found at {path}"))]
    SourceMissing { path: String },
    #[snafu(display("could not read survey configuration file {path}"))]
    SourceUnreadable {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("error decoding survey configuration file {path}"))]
    MalformedSource {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("survey configuration file {path} contains no survey"))]
    EmptyCollection { path: String },
    #[snafu(display("{section:?} not found in the configuration of survey {identifier:?}"))]
    MissingSection { section: String, identifier: String },
    #[snafu(display("{section:?} is malformed in the configuration of survey {identifier:?}"))]
    MalformedSection {
        source: serde_json::Error,
        section: String,
        identifier: String,
    },
    #[snafu(display("invalid questions in the configuration of survey {identifier:?}"))]
    InvalidQuestions {
        source: QuestionSetError,
        identifier: String,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;

pub const POST_TYPE_SECTION: &str = "post_type_definition";
pub const QUESTIONS_SECTION: &str = "survey_questions_config";

/// One element of the configuration file.
///
/// The sections are kept as raw JSON so that a malformed section only
/// affects the survey it belongs to.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    pub slug_identifier: Option<String>,
    pub post_type_definition: Option<JSValue>,
    pub survey_questions_config: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PostTypeConfig {
    pub slug: Option<String>,
    pub name_plural: Option<String>,
    pub name_singular: Option<String>,
    pub menu_name_main: Option<String>,
    pub public: Option<bool>,
    pub supports: Option<Vec<String>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub label: Option<String>,
    pub form_label: Option<String>,
    pub form_type: Option<String>,
    pub form_options: Option<IndexMap<String, JSValue>>,
    pub options: Option<IndexMap<String, JSValue>>,
    pub required: Option<bool>,
    pub legend: Option<String>,
    #[serde(rename = "type")]
    pub display_type: Option<String>,
}

/// A survey ready to be used: its record type and its questions.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Schema {
    pub identifier: String,
    pub record_type: RecordTypeDefinition,
    pub questions: QuestionSet,
}

fn js_label(v: &JSValue) -> String {
    match v {
        JSValue::String(s) => s.clone(),
        JSValue::Null => String::new(),
        x => x.to_string(),
    }
}

fn option_pairs(m: &Option<IndexMap<String, JSValue>>) -> Option<Vec<(String, String)>> {
    m.as_ref()
        .map(|m| m.iter().map(|(k, v)| (k.clone(), js_label(v))).collect())
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|x| !x.trim().is_empty()).cloned()
}

impl QuestionConfig {
    pub fn to_definition(&self, key: &str) -> QuestionDefinition {
        QuestionDefinition {
            key: key.to_string(),
            label: non_empty(&self.label),
            form_label: non_empty(&self.form_label),
            form_type: FormType::parse(self.form_type.as_deref()),
            options: option_pairs(&self.form_options),
            display_options: option_pairs(&self.options),
            required: self.required.unwrap_or(false),
            legend: non_empty(&self.legend),
            results_display: non_empty(&self.display_type)
                .map(|t| ResultsDisplayType::parse(t.as_str())),
        }
    }
}

impl PostTypeConfig {
    /// Missing names are left empty: they are rejected at registration.
    pub fn to_definition(&self) -> RecordTypeDefinition {
        let slug = self.slug.as_deref().map(sanitize_key).unwrap_or_default();
        let name_plural = self.name_plural.clone().unwrap_or_default();
        RecordTypeDefinition {
            slug,
            name_singular: self.name_singular.clone().unwrap_or_default(),
            menu_label: non_empty(&self.menu_name_main).unwrap_or_else(|| name_plural.clone()),
            name_plural,
            is_public: self.public.unwrap_or(false),
            supports_fields: self
                .supports
                .clone()
                .unwrap_or_else(|| DEFAULT_SUPPORTS.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// Reads all the surveys of a configuration file.
pub fn read_collection(path: &str) -> LoadResult<Vec<SurveyConfig>> {
    if !Path::new(path).exists() {
        return SourceMissingSnafu { path }.fail();
    }
    let contents = fs::read_to_string(path).context(SourceUnreadableSnafu { path })?;
    let collection: Vec<SurveyConfig> =
        serde_json::from_str(contents.as_str()).context(MalformedSourceSnafu { path })?;
    if collection.is_empty() {
        return EmptyCollectionSnafu { path }.fail();
    }
    debug!(
        "read_collection: {:?}: {} surveys",
        path,
        collection.len()
    );
    Ok(collection)
}

/// The survey with the given identifier, or the first one of the
/// collection if there is none.
pub fn select_survey<'a>(collection: &'a [SurveyConfig], identifier: &str) -> Option<&'a SurveyConfig> {
    let found = collection
        .iter()
        .find(|c| c.slug_identifier.as_deref() == Some(identifier));
    match found {
        Some(c) => Some(c),
        None => {
            let first = collection.first();
            if first.is_some() {
                warn!(
                    "select_survey: survey {:?} not found, falling back to the first configuration",
                    identifier
                );
            }
            first
        }
    }
}

pub fn read_post_type(value: &JSValue, identifier: &str) -> LoadResult<PostTypeConfig> {
    PostTypeConfig::deserialize(value).context(MalformedSectionSnafu {
        section: POST_TYPE_SECTION,
        identifier,
    })
}

fn read_questions(value: &JSValue, identifier: &str) -> LoadResult<QuestionSet> {
    let configs = IndexMap::<String, QuestionConfig>::deserialize(value).context(
        MalformedSectionSnafu {
            section: QUESTIONS_SECTION,
            identifier,
        },
    )?;
    let questions: Vec<QuestionDefinition> = configs
        .iter()
        .map(|(key, q)| q.to_definition(key))
        .collect();
    QuestionSet::new(questions).context(InvalidQuestionsSnafu { identifier })
}

/// Builds the schema of one element of the configuration file.
pub fn schema_from_config(config: &SurveyConfig, identifier: &str) -> LoadResult<Schema> {
    let identifier = config
        .slug_identifier
        .clone()
        .unwrap_or_else(|| identifier.to_string());
    let post_type = match &config.post_type_definition {
        Some(v) => read_post_type(v, &identifier)?,
        None => {
            return MissingSectionSnafu {
                section: POST_TYPE_SECTION,
                identifier,
            }
            .fail()
        }
    };
    let questions = match &config.survey_questions_config {
        Some(v) => read_questions(v, &identifier)?,
        None => {
            return MissingSectionSnafu {
                section: QUESTIONS_SECTION,
                identifier,
            }
            .fail()
        }
    };
    Ok(Schema {
        identifier,
        record_type: post_type.to_definition(),
        questions,
    })
}

/// Loads one survey from a configuration file.
///
/// When no survey has the requested identifier, the first survey of the
/// file is used and a warning is logged.
pub fn load_schema(path: &str, identifier: &str) -> LoadResult<Schema> {
    let collection = read_collection(path)?;
    let config = match select_survey(&collection, identifier) {
        Some(c) => c,
        None => return EmptyCollectionSnafu { path }.fail(),
    };
    let schema = schema_from_config(config, identifier)?;
    info!(
        "load_schema: survey {:?}: record type {:?}, {} questions",
        schema.identifier,
        schema.record_type.slug,
        schema.questions.len()
    );
    Ok(schema)
}
