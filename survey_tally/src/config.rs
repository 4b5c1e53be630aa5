// ********* Schema data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// Prefix of the submitted form field carrying the answer to a question.
pub const FIELD_PREFIX: &str = "q_";

/// Prefix of the metadata key under which an answer is stored.
pub const META_PREFIX: &str = "ans_";

/// Checkbox answers are packed into a `u32`; the top bit is kept clear so
/// that stored masks also fit a signed 32-bit integer.
pub const MAX_CHECKBOX_OPTIONS: usize = 31;

/// The name of the form field for a question key.
pub fn field_name(key: &str) -> String {
    format!("{}{}", FIELD_PREFIX, key)
}

/// The metadata key used to persist the answer to a question key.
pub fn meta_key(key: &str) -> String {
    format!("{}{}", META_PREFIX, key)
}

/// The kind of input widget a question is answered with.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum FormType {
    Text,
    Textarea,
    Select,
    Radio,
    /// Multiple selection. Answers are stored as a bit mask.
    Checkbox,
    Email,
    Number,
    /// Anything else found in a schema. Treated like plain text.
    Other(String),
}

impl FormType {
    /// Parses the `form_type` of a question. A missing value means `text`.
    pub fn parse(s: Option<&str>) -> FormType {
        match s {
            None | Some("text") => FormType::Text,
            Some("textarea") => FormType::Textarea,
            Some("select") => FormType::Select,
            Some("radio") => FormType::Radio,
            Some("checkbox") => FormType::Checkbox,
            Some("email") => FormType::Email,
            Some("number") => FormType::Number,
            Some(x) => FormType::Other(x.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FormType::Text => "text",
            FormType::Textarea => "textarea",
            FormType::Select => "select",
            FormType::Radio => "radio",
            FormType::Checkbox => "checkbox",
            FormType::Email => "email",
            FormType::Number => "number",
            FormType::Other(x) => x.as_str(),
        }
    }

    /// True for the widgets that pick among predefined options.
    pub fn has_options(&self) -> bool {
        matches!(self, FormType::Select | FormType::Radio | FormType::Checkbox)
    }
}

/// How the answers to a question are presented in the results.
///
/// This is independent from the [FormType]: a radio question may be shown
/// as a bar chart, a text question as a list.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum ResultsDisplayType {
    BarChart,
    Radio,
    Checkbox,
    TextList,
    Other(String),
}

impl ResultsDisplayType {
    pub fn parse(s: &str) -> ResultsDisplayType {
        match s {
            "bar_chart" => ResultsDisplayType::BarChart,
            "radio" => ResultsDisplayType::Radio,
            "checkbox" => ResultsDisplayType::Checkbox,
            "text_list" => ResultsDisplayType::TextList,
            x => ResultsDisplayType::Other(x.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResultsDisplayType::BarChart => "bar_chart",
            ResultsDisplayType::Radio => "radio",
            ResultsDisplayType::Checkbox => "checkbox",
            ResultsDisplayType::TextList => "text_list",
            ResultsDisplayType::Other(x) => x.as_str(),
        }
    }

    /// The display types rendered as a chart of vote counts.
    pub fn is_chart(&self) -> bool {
        matches!(
            self,
            ResultsDisplayType::BarChart | ResultsDisplayType::Radio | ResultsDisplayType::Checkbox
        )
    }
}

/// One question of a survey.
///
/// The order of `options` is significant: for checkboxes it defines the
/// bit position of each option in the stored mask.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionDefinition {
    pub key: String,
    /// Label shown in the results.
    pub label: Option<String>,
    /// Label shown next to the input in the form.
    pub form_label: Option<String>,
    pub form_type: FormType,
    /// (value, label) pairs offered in the form.
    pub options: Option<Vec<(String, String)>>,
    /// (value, label) pairs used to label the results, if they differ from
    /// the form options.
    pub display_options: Option<Vec<(String, String)>>,
    pub required: bool,
    pub legend: Option<String>,
    pub results_display: Option<ResultsDisplayType>,
}

impl QuestionDefinition {
    pub fn new(key: &str, form_type: FormType) -> QuestionDefinition {
        QuestionDefinition {
            key: key.to_string(),
            label: None,
            form_label: None,
            form_type,
            options: None,
            display_options: None,
            required: false,
            legend: None,
            results_display: None,
        }
    }

    pub fn with_label(self, label: &str) -> QuestionDefinition {
        QuestionDefinition {
            label: Some(label.to_string()),
            ..self
        }
    }

    pub fn with_options(self, options: &[(&str, &str)]) -> QuestionDefinition {
        QuestionDefinition {
            options: Some(
                options
                    .iter()
                    .map(|(v, l)| (v.to_string(), l.to_string()))
                    .collect(),
            ),
            ..self
        }
    }

    pub fn with_display(self, display: ResultsDisplayType) -> QuestionDefinition {
        QuestionDefinition {
            results_display: Some(display),
            ..self
        }
    }

    pub fn with_legend(self, legend: &str) -> QuestionDefinition {
        QuestionDefinition {
            legend: Some(legend.to_string()),
            ..self
        }
    }

    pub fn required(self) -> QuestionDefinition {
        QuestionDefinition {
            required: true,
            ..self
        }
    }

    /// The label used when reporting a problem with this field to the
    /// person filling in the form.
    pub fn error_label(&self) -> String {
        match self.form_label.as_ref().or(self.label.as_ref()) {
            Some(l) => l.clone(),
            None => self.spaced_key(),
        }
    }

    /// The label used when no option of a required choice was selected.
    /// The results label is not considered.
    pub fn choice_error_label(&self) -> String {
        match self.form_label.as_ref() {
            Some(l) => l.clone(),
            None => self.spaced_key(),
        }
    }

    fn spaced_key(&self) -> String {
        let spaced = self.key.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(c) => c.to_uppercase().chain(chars).collect(),
            None => spaced,
        }
    }

    /// The label shown next to the input in the form.
    pub fn input_label(&self) -> String {
        self.form_label
            .as_ref()
            .or(self.label.as_ref())
            .cloned()
            .unwrap_or_else(|| self.key.clone())
    }
}

/// Problems in a question set that are detected when it is built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum QuestionSetError {
    DuplicateKey(String),
    TooManyCheckboxOptions { key: String, count: usize },
}

impl Error for QuestionSetError {}

impl Display for QuestionSetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionSetError::DuplicateKey(k) => write!(f, "duplicate question key {:?}", k),
            QuestionSetError::TooManyCheckboxOptions { key, count } => write!(
                f,
                "checkbox question {:?} has {} options, at most {} are supported",
                key, count, MAX_CHECKBOX_OPTIONS
            ),
        }
    }
}

/// The ordered questions of a survey. Keys are unique.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct QuestionSet {
    questions: Vec<QuestionDefinition>,
}

impl QuestionSet {
    pub fn new(questions: Vec<QuestionDefinition>) -> Result<QuestionSet, QuestionSetError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for q in questions.iter() {
            if !seen.insert(q.key.as_str()) {
                return Err(QuestionSetError::DuplicateKey(q.key.clone()));
            }
            if q.form_type == FormType::Checkbox {
                let count = q.options.as_ref().map(|o| o.len()).unwrap_or(0);
                if count > MAX_CHECKBOX_OPTIONS {
                    return Err(QuestionSetError::TooManyCheckboxOptions {
                        key: q.key.clone(),
                        count,
                    });
                }
            }
        }
        Ok(QuestionSet { questions })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuestionDefinition> {
        self.questions.iter()
    }

    pub fn get(&self, key: &str) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.key == key)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// The record type holding the submissions of one survey.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RecordTypeDefinition {
    pub slug: String,
    pub name_plural: String,
    pub name_singular: String,
    pub menu_label: String,
    pub is_public: bool,
    pub supports_fields: Vec<String>,
}

// ******** Answers *********

/// A resolved answer, ready to be stored.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AnswerValue {
    Text(String),
    /// Bit `i` is set when the option at position `i` was selected.
    Mask(u32),
}

impl Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerValue::Text(s) => write!(f, "{}", s),
            AnswerValue::Mask(m) => write!(f, "{}", m),
        }
    }
}

/// The answers of one accepted submission, in question order.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ValidatedAnswerSet {
    pub answers: Vec<(String, AnswerValue)>,
}

impl ValidatedAnswerSet {
    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FieldErrorKind {
    Required,
    /// A required checkbox question with no selection.
    RequiredChoice,
    InvalidEmail,
}

/// A problem with one field of a submission.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FieldError {
    /// The question key.
    pub field: String,
    pub label: String,
    pub kind: FieldErrorKind,
}

impl Error for FieldError {}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FieldErrorKind::Required => write!(f, "{} is a required field.", self.label),
            FieldErrorKind::RequiredChoice => write!(
                f,
                "{} is a required field (choose at least one option).",
                self.label
            ),
            FieldErrorKind::InvalidEmail => {
                write!(f, "{} is not a valid email address.", self.label)
            }
        }
    }
}

// ******** Results *********

/// The series label of the chart of a question without a label.
pub const DEFAULT_SERIES_LABEL: &str = "Count";

/// Vote counts for one question, ready to be charted.
///
/// `labels` and `counts` have the same length and are index-aligned.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
    pub series_label: String,
    pub total_entries: u64,
}

impl ChartData {
    /// The share of entries for each label, in percent.
    ///
    /// For checkboxes the shares do not sum to 100 since an entry can select
    /// several options.
    pub fn percentages(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|c| {
                if self.total_entries == 0 {
                    0.0
                } else {
                    (*c as f64) * 100.0 / (self.total_entries as f64)
                }
            })
            .collect()
    }
}

/// The free-text answers to one question, in storage order.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TextListing {
    pub answers: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Aggregate {
    Chart(ChartData),
    TextList(TextListing),
}

/// Errors that prevent the answers of one question from being summarized.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AggregationError {
    /// A checkbox question without options: bits cannot be mapped to labels.
    NoOptionsDefined,
    /// No option mapping and no usable answer to use as a label.
    NoLabelsResolved,
    NoDisplayType,
    UnsupportedDisplayType(String),
}

impl Error for AggregationError {}

impl Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationError::NoOptionsDefined => write!(f, "no options defined"),
            AggregationError::NoLabelsResolved => write!(f, "no labels resolved"),
            AggregationError::NoDisplayType => write!(f, "no results display type"),
            AggregationError::UnsupportedDisplayType(t) => {
                write!(f, "unsupported results display type {:?}", t)
            }
        }
    }
}

/// A message shown in place of the results of a question, or of a survey.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReportNotice {
    NoResultsYet,
    NoAnswersYet,
    InsufficientData,
    UnknownDisplayType(String),
}

impl Display for ReportNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportNotice::NoResultsYet => write!(f, "No survey results are available yet."),
            ReportNotice::NoAnswersYet => write!(f, "No answers yet for this question."),
            ReportNotice::InsufficientData => {
                write!(f, "Insufficient data for a chart for this question.")
            }
            ReportNotice::UnknownDisplayType(t) => {
                write!(f, "Unknown display type ({}) for this question.", t)
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum QuestionResult {
    Chart(ChartData),
    TextList(TextListing),
    Notice(ReportNotice),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionReport {
    pub key: String,
    pub label: String,
    pub result: QuestionResult,
}

/// The results of a whole survey.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyReport {
    pub total_entries: u64,
    pub notice: Option<ReportNotice>,
    pub questions: Vec<QuestionReport>,
}

impl SurveyReport {
    pub fn charts(&self) -> Vec<&ChartData> {
        self.questions
            .iter()
            .filter_map(|q| match &q.result {
                QuestionResult::Chart(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn text_lists(&self) -> Vec<&TextListing> {
        self.questions
            .iter()
            .filter_map(|q| match &q.result {
                QuestionResult::TextList(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}
