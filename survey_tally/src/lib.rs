mod bitmask;
pub mod builder;
mod config;
pub mod manual;
pub mod sanitize;

use log::{debug, info, warn};

use std::collections::HashMap;

pub use crate::bitmask::OptionIndex;
pub use crate::builder::RawSubmission;
pub use crate::config::*;
use crate::sanitize::*;

/// Validates a submission against the questions of a survey.
///
/// All the questions are checked before deciding: the errors are returned
/// together, in question order. On success the answer set holds exactly
/// one entry per question.
///
/// Checkbox answers are packed into a bit mask following the option order
/// (see [OptionIndex]). Selected values that are not options are dropped.
pub fn validate(
    questions: &QuestionSet,
    raw: &RawSubmission,
) -> Result<ValidatedAnswerSet, Vec<FieldError>> {
    debug!("validate: {} questions", questions.len());
    let mut answers: Vec<(String, AnswerValue)> = Vec::new();
    let mut errors: Vec<FieldError> = Vec::new();

    for q in questions.iter() {
        let name = field_name(&q.key);
        let res = if q.form_type == FormType::Checkbox {
            validate_checkbox(q, raw.values(&name))
        } else {
            validate_single(q, raw.single(&name))
        };
        match res {
            Ok(v) => answers.push((q.key.clone(), v)),
            Err(e) => {
                debug!("validate: field {:?}: {:?}", q.key, e.kind);
                errors.push(e)
            }
        }
    }

    if errors.is_empty() {
        Ok(ValidatedAnswerSet { answers })
    } else {
        info!("validate: submission rejected with {} errors", errors.len());
        Err(errors)
    }
}

fn field_error(q: &QuestionDefinition, kind: FieldErrorKind) -> FieldError {
    let label = match kind {
        FieldErrorKind::RequiredChoice => q.choice_error_label(),
        _ => q.error_label(),
    };
    FieldError {
        field: q.key.clone(),
        label,
        kind,
    }
}

fn validate_checkbox(q: &QuestionDefinition, values: &[String]) -> Result<AnswerValue, FieldError> {
    let selected: Vec<String> = values
        .iter()
        .map(|v| sanitize_text_field(v))
        .filter(|v| !v.is_empty())
        .collect();
    if q.required && selected.is_empty() {
        return Err(field_error(q, FieldErrorKind::RequiredChoice));
    }
    let mask = match q.options.as_deref() {
        Some(options) => {
            let index = OptionIndex::new(options);
            let (mask, unknown) = index.encode(selected.iter().map(|s| s.as_str()));
            for u in unknown {
                warn!(
                    "validate: invalid checkbox value {:?} submitted for field {:?}",
                    u, q.key
                );
            }
            mask
        }
        None => {
            warn!("validate: no options defined for checkbox field {:?}", q.key);
            0
        }
    };
    Ok(AnswerValue::Mask(mask))
}

fn validate_single(q: &QuestionDefinition, value: Option<&str>) -> Result<AnswerValue, FieldError> {
    let value = value.map(|v| v.trim()).unwrap_or("");
    if value.is_empty() {
        return if q.required {
            Err(field_error(q, FieldErrorKind::Required))
        } else {
            Ok(AnswerValue::Text(String::new()))
        };
    }
    let sanitized = match q.form_type {
        FormType::Email => {
            let email = sanitize_email(value);
            if email.is_empty() {
                return Err(field_error(q, FieldErrorKind::InvalidEmail));
            }
            email
        }
        FormType::Textarea => sanitize_textarea_field(value),
        _ => sanitize_text_field(value),
    };
    Ok(AnswerValue::Text(sanitized))
}

/// Summarizes the stored answers to one question.
///
/// Arguments:
/// * `question` the question, with its results display type
/// * `raw_answers` the stored values, in storage order
/// * `total_entries` the number of submissions of the survey
pub fn aggregate(
    question: &QuestionDefinition,
    raw_answers: &[String],
    total_entries: u64,
) -> Result<Aggregate, AggregationError> {
    match &question.results_display {
        None => Err(AggregationError::NoDisplayType),
        Some(d) if d.is_chart() => {
            chart_data(question, raw_answers, total_entries).map(Aggregate::Chart)
        }
        Some(ResultsDisplayType::TextList) => Ok(Aggregate::TextList(text_listing(raw_answers))),
        Some(d) => Err(AggregationError::UnsupportedDisplayType(
            d.as_str().to_string(),
        )),
    }
}

fn parse_mask(question: &QuestionDefinition, value: &str) -> u32 {
    match value.trim().parse::<u32>() {
        Ok(m) => m,
        Err(_) => {
            warn!(
                "aggregate: non-numeric value {:?} found in answers for checkbox question {:?}",
                value, question.key
            );
            0
        }
    }
}

// Counts per answer value, in the order values are first seen.
fn compute_tally(question: &QuestionDefinition, raw_answers: &[String]) -> Result<Vec<(String, u64)>, AggregationError> {
    if question.form_type == FormType::Checkbox {
        let options = match question.options.as_deref() {
            Some(o) if !o.is_empty() => o,
            _ => {
                warn!(
                    "aggregate: no options defined for checkbox question {:?}",
                    question.key
                );
                return Err(AggregationError::NoOptionsDefined);
            }
        };
        let index = OptionIndex::new(options);
        let mut counts: Vec<u64> = vec![0; index.len()];
        for v in raw_answers.iter() {
            index.tally(parse_mask(question, v), &mut counts);
        }
        return Ok(index.keys().iter().cloned().zip(counts).collect());
    }

    let mut tally: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for v in raw_answers.iter() {
        match positions.get(v.as_str()) {
            Some(idx) => tally[*idx].1 += 1,
            None => {
                positions.insert(v.as_str(), tally.len());
                tally.push((v.clone(), 1));
            }
        }
    }
    Ok(tally)
}

fn chart_data(
    question: &QuestionDefinition,
    raw_answers: &[String],
    total_entries: u64,
) -> Result<ChartData, AggregationError> {
    let tally = compute_tally(question, raw_answers)?;
    debug!("chart_data: {:?}: tally: {:?}", question.key, tally);

    let label_source = question
        .display_options
        .as_ref()
        .filter(|o| !o.is_empty())
        .or(question.options.as_ref().filter(|o| !o.is_empty()));

    let (labels, counts): (Vec<String>, Vec<u64>) = match label_source {
        Some(options) => options
            .iter()
            .map(|(value, label)| {
                let count = tally
                    .iter()
                    .find(|(v, _)| v == value)
                    .map(|(_, c)| *c)
                    .unwrap_or(0);
                (label.clone(), count)
            })
            .unzip(),
        None => {
            debug!(
                "chart_data: no options for question {:?}, using the answers as labels",
                question.key
            );
            tally.into_iter().filter(|(v, _)| !v.is_empty()).unzip()
        }
    };

    if labels.is_empty() {
        return Err(AggregationError::NoLabelsResolved);
    }
    Ok(ChartData {
        labels,
        counts,
        series_label: question
            .label
            .clone()
            .unwrap_or_else(|| DEFAULT_SERIES_LABEL.to_string()),
        total_entries,
    })
}

/// The non-blank answers, trimmed, in storage order.
pub fn text_listing(raw_answers: &[String]) -> TextListing {
    TextListing {
        answers: raw_answers
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Gathers the answers of all the entries, per question key.
///
/// Only the metadata keys carrying an answer (see [meta_key]) are read.
/// Within a question, answers keep the order of the entries.
pub fn collect_answers(entries: &[Vec<(String, String)>]) -> HashMap<String, Vec<String>> {
    let mut res: HashMap<String, Vec<String>> = HashMap::new();
    for meta in entries.iter() {
        for (k, v) in meta.iter() {
            if let Some(key) = k.strip_prefix(META_PREFIX) {
                res.entry(key.to_string()).or_default().push(v.clone());
            }
        }
    }
    res
}

/// Builds the results of a survey from the answers of all its entries.
///
/// Questions without a label or a display type are not part of the results.
/// A question that cannot be summarized is reported with a notice, and
/// does not prevent the others from being reported.
pub fn build_report(
    questions: &QuestionSet,
    answers: &HashMap<String, Vec<String>>,
    total_entries: u64,
) -> SurveyReport {
    info!(
        "build_report: {} entries, {} questions",
        total_entries,
        questions.len()
    );
    if total_entries == 0 {
        return SurveyReport {
            total_entries,
            notice: Some(ReportNotice::NoResultsYet),
            questions: Vec::new(),
        };
    }

    let mut reports: Vec<QuestionReport> = Vec::new();
    for q in questions.iter() {
        let (label, display) = match (&q.label, &q.results_display) {
            (Some(l), Some(d)) => (l, d),
            _ => {
                debug!("build_report: skipping incomplete question {:?}", q.key);
                continue;
            }
        };
        let result = match answers.get(&q.key) {
            None => QuestionResult::Notice(ReportNotice::NoAnswersYet),
            Some(vals) => match aggregate(q, vals, total_entries) {
                Ok(Aggregate::Chart(c)) => QuestionResult::Chart(c),
                Ok(Aggregate::TextList(t)) => QuestionResult::TextList(t),
                Err(AggregationError::UnsupportedDisplayType(_)) => QuestionResult::Notice(
                    ReportNotice::UnknownDisplayType(display.as_str().to_string()),
                ),
                Err(e) => {
                    warn!("build_report: no chart for question {:?}: {}", q.key, e);
                    QuestionResult::Notice(ReportNotice::InsufficientData)
                }
            },
        };
        reports.push(QuestionReport {
            key: q.key.clone(),
            label: label.clone(),
            result,
        });
    }
    SurveyReport {
        total_entries,
        notice: None,
        questions: reports,
    }
}

/// Consecutive questions sharing the same legend.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LegendGroup<'a> {
    pub legend: Option<&'a str>,
    pub questions: Vec<&'a QuestionDefinition>,
}

/// Groups the questions for display. Only consecutive questions are
/// grouped: a legend that reappears later opens a new group.
pub fn legend_groups(questions: &QuestionSet) -> Vec<LegendGroup<'_>> {
    let mut groups: Vec<LegendGroup<'_>> = Vec::new();
    for q in questions.iter() {
        let legend = q.legend.as_deref();
        match groups.last_mut() {
            Some(g) if g.legend == legend => g.questions.push(q),
            _ => groups.push(LegendGroup {
                legend,
                questions: vec![q],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rating() -> QuestionDefinition {
        QuestionDefinition::new("rating", FormType::Radio)
            .with_label("Rating")
            .with_options(&[("1", "Poor"), ("5", "Great")])
            .with_display(ResultsDisplayType::BarChart)
            .required()
    }

    fn topics() -> QuestionDefinition {
        QuestionDefinition::new("topics", FormType::Checkbox)
            .with_label("Topics")
            .with_options(&[("tech", "Tech"), ("art", "Art")])
            .with_display(ResultsDisplayType::Checkbox)
    }

    fn strings(vals: &[&str]) -> Vec<String> {
        vals.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_required_radio() {
        init();
        let qs = QuestionSet::new(vec![rating()]).unwrap();
        let errors = validate(&qs, &RawSubmission::new()).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError {
                field: "rating".to_string(),
                label: "Rating".to_string(),
                kind: FieldErrorKind::Required
            }]
        );
        assert_eq!(errors[0].to_string(), "Rating is a required field.");
    }

    #[test]
    fn checkbox_selection_is_bit_packed() {
        init();
        let qs = QuestionSet::new(vec![topics()]).unwrap();
        let raw = RawSubmission::new().with("q_topics[]", "art");
        let answers = validate(&qs, &raw).unwrap();
        assert_eq!(answers.get("topics"), Some(&AnswerValue::Mask(2)));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn optional_checkbox_without_selection_is_zero() {
        let qs = QuestionSet::new(vec![topics()]).unwrap();
        let answers = validate(&qs, &RawSubmission::new()).unwrap();
        assert_eq!(answers.get("topics"), Some(&AnswerValue::Mask(0)));
    }

    #[test]
    fn unknown_checkbox_values_are_dropped() {
        init();
        let qs = QuestionSet::new(vec![topics()]).unwrap();
        let raw = RawSubmission::new()
            .with("q_topics", "tech")
            .with("q_topics", "knitting");
        let answers = validate(&qs, &raw).unwrap();
        assert_eq!(answers.get("topics"), Some(&AnswerValue::Mask(1)));
    }

    #[test]
    fn required_checkbox_without_selection() {
        let qs = QuestionSet::new(vec![topics().required()]).unwrap();
        let errors = validate(&qs, &RawSubmission::new()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, FieldErrorKind::RequiredChoice);
        assert_eq!(
            errors[0].to_string(),
            "Topics is a required field (choose at least one option)."
        );
    }

    #[test]
    fn required_checkbox_is_named_after_its_key() {
        let q = QuestionDefinition::new("fav_topics", FormType::Checkbox)
            .with_label("Topics")
            .with_options(&[("tech", "Tech")])
            .required();
        let qs = QuestionSet::new(vec![q]).unwrap();
        let errors = validate(&qs, &RawSubmission::new()).unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "Fav topics is a required field (choose at least one option)."
        );
    }

    #[test]
    fn checkbox_without_options_is_zero() {
        init();
        let q = QuestionDefinition::new("tags", FormType::Checkbox);
        let qs = QuestionSet::new(vec![q]).unwrap();
        let raw = RawSubmission::new().with("q_tags", "a");
        let answers = validate(&qs, &raw).unwrap();
        assert_eq!(answers.get("tags"), Some(&AnswerValue::Mask(0)));
    }

    #[test]
    fn errors_are_accumulated_in_question_order() {
        let qs = QuestionSet::new(vec![
            QuestionDefinition::new("first_name", FormType::Text).required(),
            QuestionDefinition::new("comment", FormType::Textarea),
            topics().required(),
            QuestionDefinition::new("mail", FormType::Email),
            rating(),
        ])
        .unwrap();
        let raw = RawSubmission::new()
            .with("q_first_name", "   ")
            .with("q_mail", "nope");
        let errors = validate(&qs, &raw).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["first_name", "topics", "mail", "rating"]);
        assert_eq!(errors[0].to_string(), "First name is a required field.");
        assert_eq!(errors[2].kind, FieldErrorKind::InvalidEmail);
    }

    #[test]
    fn complete_submission_has_one_answer_per_question() {
        let mut comment = QuestionDefinition::new("comment", FormType::Textarea);
        comment.form_label = Some("Anything else?".to_string());
        let qs = QuestionSet::new(vec![
            rating(),
            topics().required(),
            comment,
            QuestionDefinition::new("nickname", FormType::parse(None)),
            QuestionDefinition::new("mail", FormType::Email).required(),
            QuestionDefinition::new("age", FormType::Number),
        ])
        .unwrap();
        let raw = RawSubmission::new()
            .with("q_rating", " 5 ")
            .with("q_topics[]", "tech")
            .with("q_topics[]", "art")
            .with("q_comment", "Nice\n<b>site</b>")
            .with("q_mail", "me@example.com")
            .with("q_extra", "ignored");
        let answers = validate(&qs, &raw).unwrap();
        assert_eq!(answers.len(), qs.len());
        assert_eq!(answers.get("rating"), Some(&AnswerValue::Text("5".to_string())));
        assert_eq!(answers.get("topics"), Some(&AnswerValue::Mask(3)));
        assert_eq!(
            answers.get("comment"),
            Some(&AnswerValue::Text("Nice\nsite".to_string()))
        );
        assert_eq!(answers.get("nickname"), Some(&AnswerValue::Text(String::new())));
        assert_eq!(answers.get("age"), Some(&AnswerValue::Text(String::new())));
        let keys: Vec<&str> = answers.answers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["rating", "topics", "comment", "nickname", "mail", "age"]);
    }

    #[test]
    fn checkbox_masks_are_decoded_per_option() {
        init();
        let res = aggregate(&topics(), &strings(&["2", "3", "0"]), 3).unwrap();
        match res {
            Aggregate::Chart(c) => {
                assert_eq!(c.labels, strings(&["Tech", "Art"]));
                assert_eq!(c.counts, vec![1, 2]);
                assert_eq!(c.series_label, "Topics");
                assert_eq!(c.total_entries, 3);
            }
            x => panic!("unexpected aggregate {:?}", x),
        }
    }

    #[test]
    fn non_numeric_masks_count_as_nothing() {
        init();
        let res = aggregate(&topics(), &strings(&["abc", "1"]), 2).unwrap();
        assert_eq!(
            res,
            Aggregate::Chart(ChartData {
                labels: strings(&["Tech", "Art"]),
                counts: vec![1, 0],
                series_label: "Topics".to_string(),
                total_entries: 2,
            })
        );
    }

    #[test]
    fn series_label_follows_question_label() {
        let q = rating().with_label("Overall rating");
        match aggregate(&q, &strings(&["5"]), 1).unwrap() {
            Aggregate::Chart(c) => assert_eq!(c.series_label, "Overall rating"),
            x => panic!("unexpected aggregate {:?}", x),
        }
        let mut unlabelled = rating();
        unlabelled.label = None;
        match aggregate(&unlabelled, &strings(&["5"]), 1).unwrap() {
            Aggregate::Chart(c) => {
                assert_eq!(c.series_label, "Count");
                assert_eq!(c.counts, vec![0, 1]);
            }
            x => panic!("unexpected aggregate {:?}", x),
        }
    }

    #[test]
    fn options_without_votes_are_kept_in_order() {
        let q = QuestionDefinition::new("pick", FormType::Select)
            .with_label("Pick")
            .with_options(&[("a", "A"), ("b", "B"), ("c", "C")])
            .with_display(ResultsDisplayType::BarChart);
        let res = aggregate(&q, &strings(&["b", "a", "b"]), 3).unwrap();
        match res {
            Aggregate::Chart(c) => {
                assert_eq!(c.labels, strings(&["A", "B", "C"]));
                assert_eq!(c.counts, vec![1, 2, 0]);
            }
            x => panic!("unexpected aggregate {:?}", x),
        }
    }

    #[test]
    fn display_options_take_precedence() {
        let mut q = rating();
        q.display_options = Some(vec![
            ("5".to_string(), "Great!".to_string()),
            ("1".to_string(), "Poor :(".to_string()),
        ]);
        let res = aggregate(&q, &strings(&["1", "5", "5"]), 3).unwrap();
        match res {
            Aggregate::Chart(c) => {
                assert_eq!(c.labels, strings(&["Great!", "Poor :("]));
                assert_eq!(c.counts, vec![2, 1]);
            }
            x => panic!("unexpected aggregate {:?}", x),
        }
    }

    #[test]
    fn answers_become_labels_without_options() {
        init();
        let q = QuestionDefinition::new("city", FormType::Text)
            .with_label("City")
            .with_display(ResultsDisplayType::BarChart);
        let res = aggregate(&q, &strings(&["Lyon", "", "Oslo", "Lyon"]), 4).unwrap();
        match res {
            Aggregate::Chart(c) => {
                assert_eq!(c.labels, strings(&["Lyon", "Oslo"]));
                assert_eq!(c.counts, vec![2, 1]);
                assert_eq!(c.percentages(), vec![50.0, 25.0]);
            }
            x => panic!("unexpected aggregate {:?}", x),
        }
        assert_eq!(
            aggregate(&q, &strings(&["", ""]), 2),
            Err(AggregationError::NoLabelsResolved)
        );
    }

    #[test]
    fn checkbox_without_options_cannot_be_charted() {
        init();
        let q = QuestionDefinition::new("tags", FormType::Checkbox)
            .with_label("Tags")
            .with_display(ResultsDisplayType::BarChart);
        assert_eq!(
            aggregate(&q, &strings(&["3"]), 1),
            Err(AggregationError::NoOptionsDefined)
        );
    }

    #[test]
    fn text_list_filters_blank_answers() {
        let q = QuestionDefinition::new("comment", FormType::Textarea)
            .with_label("Comment")
            .with_display(ResultsDisplayType::TextList);
        let res = aggregate(&q, &strings(&["  zebra ", "", "  ", "apple"]), 4).unwrap();
        assert_eq!(
            res,
            Aggregate::TextList(TextListing {
                answers: strings(&["zebra", "apple"])
            })
        );
    }

    #[test]
    fn encode_then_aggregate() {
        let qs = QuestionSet::new(vec![QuestionDefinition::new("pick", FormType::Checkbox)
            .with_label("Pick")
            .with_options(&[("a", "A"), ("b", "B"), ("c", "C")])
            .with_display(ResultsDisplayType::Checkbox)])
        .unwrap();
        let raw = RawSubmission::new().with("q_pick", "a").with("q_pick", "c");
        let answers = validate(&qs, &raw).unwrap();
        let stored = answers.get("pick").map(|v| v.to_string()).unwrap();
        assert_eq!(stored, "5");
        let q = qs.get("pick").unwrap();
        match aggregate(q, &[stored], 1).unwrap() {
            Aggregate::Chart(c) => assert_eq!(c.counts, vec![1, 0, 1]),
            x => panic!("unexpected aggregate {:?}", x),
        }
    }

    #[test]
    fn report_degrades_per_question() {
        init();
        let broken = QuestionDefinition::new("tags", FormType::Checkbox)
            .with_label("Tags")
            .with_display(ResultsDisplayType::BarChart);
        let odd = QuestionDefinition::new("mood", FormType::Text)
            .with_label("Mood")
            .with_display(ResultsDisplayType::parse("pie_chart"));
        let hidden = QuestionDefinition::new("internal", FormType::Text);
        let qs = QuestionSet::new(vec![rating(), broken, odd, hidden, topics()]).unwrap();
        let entries = vec![
            vec![
                ("ans_rating".to_string(), "5".to_string()),
                ("ans_tags".to_string(), "1".to_string()),
                ("ans_mood".to_string(), "ok".to_string()),
                ("_edit_lock".to_string(), "x".to_string()),
            ],
            vec![("ans_rating".to_string(), "1".to_string())],
        ];
        let answers = collect_answers(&entries);
        assert_eq!(answers.get("rating"), Some(&strings(&["5", "1"])));
        assert!(!answers.contains_key("_edit_lock"));

        let report = build_report(&qs, &answers, 2);
        assert_eq!(report.total_entries, 2);
        assert_eq!(report.notice, None);
        let keys: Vec<&str> = report.questions.iter().map(|q| q.key.as_str()).collect();
        assert_eq!(keys, vec!["rating", "tags", "mood", "topics"]);
        assert_eq!(
            report.questions[1].result,
            QuestionResult::Notice(ReportNotice::InsufficientData)
        );
        assert_eq!(
            report.questions[2].result,
            QuestionResult::Notice(ReportNotice::UnknownDisplayType("pie_chart".to_string()))
        );
        assert_eq!(
            report.questions[3].result,
            QuestionResult::Notice(ReportNotice::NoAnswersYet)
        );
        assert_eq!(report.charts().len(), 1);
        assert_eq!(report.charts()[0].counts, vec![1, 1]);
        assert!(report.text_lists().is_empty());
    }

    #[test]
    fn empty_survey_report() {
        let qs = QuestionSet::new(vec![rating()]).unwrap();
        let report = build_report(&qs, &HashMap::new(), 0);
        assert_eq!(report.notice, Some(ReportNotice::NoResultsYet));
        assert!(report.questions.is_empty());
    }

    #[test]
    fn consecutive_legends_are_grouped() {
        let qs = QuestionSet::new(vec![
            rating().with_legend("About you"),
            topics().with_legend("About you"),
            QuestionDefinition::new("comment", FormType::Textarea),
            QuestionDefinition::new("mail", FormType::Email).with_legend("About you"),
        ])
        .unwrap();
        let groups = legend_groups(&qs);
        let shape: Vec<(Option<&str>, usize)> =
            groups.iter().map(|g| (g.legend, g.questions.len())).collect();
        assert_eq!(
            shape,
            vec![(Some("About you"), 2), (None, 1), (Some("About you"), 1)]
        );
    }

    #[test]
    fn question_set_rejects_bad_schemas() {
        assert_eq!(
            QuestionSet::new(vec![rating(), rating()]),
            Err(QuestionSetError::DuplicateKey("rating".to_string()))
        );
        let many: Vec<(String, String)> = (0..32).map(|i| (i.to_string(), i.to_string())).collect();
        let mut q = topics();
        q.options = Some(many);
        assert_eq!(
            QuestionSet::new(vec![q]),
            Err(QuestionSetError::TooManyCheckboxOptions {
                key: "topics".to_string(),
                count: 32
            })
        );
    }
}
