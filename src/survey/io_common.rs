use chrono::{DateTime, Local};
use serde_json::Value as JSValue;
use url::Url;

use survey_tally::RawSubmission;

pub const SUCCESS_ARG: &str = "survey_success";
pub const ERROR_ARG: &str = "survey_error";

pub fn submission_title(now: &DateTime<Local>) -> String {
    format!(
        "Survey Submission - {}",
        now.format("%d-%m-%Y %H:%M:%S")
    )
}

/// Where to send the visitor after an accepted submission.
///
/// `redirect_to` and `referer` may be absolute or relative to `home`. The
/// status arguments of an earlier submission are replaced.
pub fn redirect_url(
    home: &Url,
    redirect_to: Option<&str>,
    referer: Option<&str>,
) -> Result<Url, url::ParseError> {
    let target = [redirect_to, referer]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty());
    let mut url = match target {
        Some(t) => home.join(t)?,
        None => home.clone(),
    };
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != SUCCESS_ARG && k != ERROR_ARG)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(SUCCESS_ARG, "true");
    Ok(url)
}

/// Reads a URL-encoded form body.
pub fn parse_form_body(body: &str) -> RawSubmission {
    RawSubmission::from_pairs(
        url::form_urlencoded::parse(body.trim().as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned())),
    )
}

/// Reads a form submitted as a JSON object. Arrays are repeated values.
pub fn parse_form_json(js: &JSValue) -> Option<RawSubmission> {
    let obj = js.as_object()?;
    let mut raw = RawSubmission::new();
    for (name, value) in obj.iter() {
        match value {
            JSValue::Array(vals) => {
                for v in vals.iter() {
                    if let Some(s) = scalar(v) {
                        raw.add(name, s);
                    }
                }
            }
            v => {
                if let Some(s) = scalar(v) {
                    raw.add(name, s);
                }
            }
        }
    }
    Some(raw)
}

fn scalar(v: &JSValue) -> Option<String> {
    match v {
        JSValue::String(s) => Some(s.clone()),
        JSValue::Number(n) => Some(n.to_string()),
        JSValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
