use log::{debug, info, warn};

use serde_json::json;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;
use text_diff::print_diff;

use survey_tally::sanitize::sanitize_key;
use survey_tally::*;

use crate::survey::config_reader::Schema;
use crate::survey::store::RecordSummary;
use crate::survey::*;

pub fn chart_id(key: &str) -> String {
    format!("chart_{}", sanitize_key(key))
}

pub fn results_title(total_entries: u64) -> String {
    format!("Site Evaluation Results ({} entries)", total_entries)
}

fn question_result_to_json(q: &QuestionReport) -> JSValue {
    match &q.result {
        QuestionResult::Chart(c) => json!({
            "key": q.key,
            "label": q.label,
            "chart": {
                "id": chart_id(&q.key),
                "type": "bar",
                "labels": c.labels,
                "data": c.counts,
                "datasetLabel": c.series_label,
                "percentages": c.percentages(),
            }
        }),
        QuestionResult::TextList(t) => json!({
            "key": q.key,
            "label": q.label,
            "answers": t.answers,
        }),
        QuestionResult::Notice(n) => json!({
            "key": q.key,
            "label": q.label,
            "notice": n.to_string(),
        }),
    }
}

pub fn report_to_json(identifier: &str, report: &SurveyReport) -> JSValue {
    let mut js = json!({
        "survey": identifier,
        "title": results_title(report.total_entries),
        "totalEntries": report.total_entries,
        "questions": report.questions.iter().map(question_result_to_json).collect::<Vec<JSValue>>(),
    });
    if let Some(n) = &report.notice {
        js["notice"] = json!(n.to_string());
    }
    js
}

fn field_to_json(q: &QuestionDefinition) -> JSValue {
    let options: Vec<JSValue> = q
        .options
        .iter()
        .flatten()
        .map(|(value, label)| json!({"value": value, "label": label}))
        .collect();
    json!({
        "name": field_name(&q.key),
        "label": q.input_label(),
        "type": q.form_type.as_str(),
        "required": q.required,
        "options": options,
    })
}

/// The fields of a form, grouped by legend.
pub fn form_to_json(schema: &Schema) -> JSValue {
    let groups: Vec<JSValue> = legend_groups(&schema.questions)
        .iter()
        .map(|g| {
            json!({
                "legend": g.legend,
                "fields": g.questions.iter().map(|q| field_to_json(q)).collect::<Vec<JSValue>>(),
            })
        })
        .collect();
    json!({
        "survey": schema.identifier,
        "hidden": {SURVEY_SLUG_FIELD: schema.identifier},
        "groups": groups,
    })
}

pub fn entries_to_json(identifier: &str, entries: &[RecordSummary]) -> JSValue {
    let l: Vec<JSValue> = entries
        .iter()
        .map(|e| json!({"id": e.id, "title": e.title, "created": e.created}))
        .collect();
    json!({"survey": identifier, "entries": l})
}

pub fn outcome_to_json(outcome: &SubmissionOutcome) -> JSValue {
    match outcome {
        SubmissionOutcome::Accepted {
            record_id,
            redirect_url,
        } => json!({
            "status": "accepted",
            "recordId": record_id,
            "redirectUrl": redirect_url.as_str(),
        }),
        SubmissionOutcome::Rejected { errors } => json!({
            "status": "rejected",
            "errors": errors
                .iter()
                .map(|e| json!({"field": e.field, "message": e.to_string()}))
                .collect::<Vec<JSValue>>(),
        }),
    }
}

pub fn read_json(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_json: {:?}: {} bytes", path, contents.len());
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Writes a document to a file, or to the standard output if `out` is
/// missing or `stdout`. Returns the pretty-printed document.
pub fn write_output(js: &JSValue, out: Option<&str>) -> SurveyResult<String> {
    let pretty = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    match out {
        None | Some("stdout") => println!("{}", pretty),
        Some(path) => {
            info!("write_output: writing to {:?}", path);
            fs::write(path, &pretty).context(OpeningJsonSnafu { path })?;
        }
    }
    Ok(pretty)
}

/// Fails if the document differs from the reference file. The
/// differences are printed.
pub fn check_reference(pretty: &str, reference_path: &str) -> SurveyResult<()> {
    let reference = read_json(reference_path)?;
    let pretty_reference = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    if pretty_reference != pretty {
        warn!("Found differences with the reference {:?}", reference_path);
        print_diff(pretty_reference.as_str(), pretty, "\n");
        whatever!("Difference detected between the output and the reference {}", reference_path)
    }
    Ok(())
}
