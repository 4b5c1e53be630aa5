use log::{debug, error, info, warn};

use chrono::Local;
use snafu::{prelude::*, Snafu};
use url::Url;

use survey_tally::sanitize::sanitize_key;
use survey_tally::*;

pub mod config_reader;
pub mod io_common;
pub mod io_json;
pub mod registrar;
pub mod store;

use crate::survey::config_reader::*;
use crate::survey::io_common::*;
use crate::survey::registrar::*;
use crate::survey::store::*;

/// The hidden form field naming the submitted survey.
pub const SURVEY_SLUG_FIELD: &str = "survey_slug";
pub const REDIRECT_FIELD: &str = "redirect_to";
pub const REFERER_FIELD: &str = "_referer";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SurveyError {
    #[snafu(display("could not load survey {identifier:?}"))]
    Loading {
        source: LoadError,
        identifier: String,
    },
    #[snafu(display("could not read survey configurations"))]
    LoadingCollection { source: LoadError },
    #[snafu(display("could not register record type"))]
    Registration { source: RegistrationError },
    #[snafu(display("storage failure"))]
    Storage { source: StorageError },
    #[snafu(display("the submission does not name a survey"))]
    MissingSurveySlug {},
    #[snafu(display("survey {identifier:?} has no record type"))]
    MissingRecordType { identifier: String },
    #[snafu(display("invalid url {url:?}"))]
    InvalidUrl {
        source: url::ParseError,
        url: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl SurveyError {
    /// The message for the person using the site. Details are only logged.
    pub fn user_message(&self) -> &'static str {
        match self {
            SurveyError::MissingSurveySlug {} => {
                "Error: Critical survey information (slug) is missing. Cannot process submission."
            }
            SurveyError::Loading { .. } | SurveyError::LoadingCollection { .. } => {
                "Error: Survey configuration could not be loaded for the provided slug."
            }
            SurveyError::MissingRecordType { .. } => {
                "A critical error occurred while trying to save your feedback due to missing configuration. Please contact the site administrator."
            }
            SurveyError::Registration { .. } | SurveyError::Storage { .. } => {
                "An error occurred while processing your feedback. Please try again later."
            }
            _ => "An unexpected error occurred.",
        }
    }
}

pub type SurveyResult<T> = Result<T, SurveyError>;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SubmissionOutcome {
    Accepted { record_id: RecordId, redirect_url: Url },
    /// Nothing was stored.
    Rejected { errors: Vec<FieldError> },
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ListOrder {
    /// Oldest first.
    Asc,
    /// Most recent first.
    Desc,
}

impl ListOrder {
    pub fn parse(s: &str) -> Option<ListOrder> {
        match s.to_lowercase().as_str() {
            "asc" => Some(ListOrder::Asc),
            "desc" => Some(ListOrder::Desc),
            _ => None,
        }
    }
}

fn stored<T>(r: StorageResult<T>) -> SurveyResult<T> {
    r.map_err(|e| {
        error!("storage failure: {:?}", e);
        e
    })
    .context(StorageSnafu {})
}

/// The surveys of a site, with the store holding their submissions.
pub struct SurveySite<S> {
    config_path: String,
    home_url: Url,
    registrar: Registrar,
    store: S,
}

impl<S: SubmissionStore + RecordTypeHost> SurveySite<S> {
    pub fn new(config_path: &str, home_url: &str, store: S) -> SurveyResult<SurveySite<S>> {
        let home_url = Url::parse(home_url).context(InvalidUrlSnafu { url: home_url })?;
        Ok(SurveySite {
            config_path: config_path.to_string(),
            home_url,
            registrar: Registrar::new(),
            store,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The schema of a survey. The identifier is sanitized like a slug first.
    pub fn load(&self, identifier: &str) -> SurveyResult<Schema> {
        let identifier = sanitize_key(identifier);
        load_schema(&self.config_path, &identifier).context(LoadingSnafu { identifier })
    }

    /// Registers the record types of all the configured surveys.
    pub fn register_all(
        &mut self,
    ) -> SurveyResult<Vec<(String, Result<RegistrationOutcome, RegistrationError>)>> {
        let collection = read_collection(&self.config_path).context(LoadingCollectionSnafu {})?;
        Ok(self.registrar.register_all(&mut self.store, &collection))
    }

    /// Validates a submitted form and stores it when it is valid.
    pub fn handle_submission(&mut self, raw: &RawSubmission) -> SurveyResult<SubmissionOutcome> {
        let slug = raw
            .single(SURVEY_SLUG_FIELD)
            .map(sanitize_key)
            .filter(|s| !s.is_empty())
            .context(MissingSurveySlugSnafu {})?;
        let schema = self.load(&slug)?;

        let answers = match validate(&schema.questions, raw) {
            Ok(a) => a,
            Err(errors) => {
                info!(
                    "handle_submission: {:?}: rejected with {} errors",
                    schema.identifier,
                    errors.len()
                );
                return Ok(SubmissionOutcome::Rejected { errors });
            }
        };

        let record_type = &schema.record_type;
        if record_type.slug.is_empty() {
            return MissingRecordTypeSnafu {
                identifier: schema.identifier.clone(),
            }
            .fail();
        }
        self.registrar
            .register(&mut self.store, record_type)
            .context(RegistrationSnafu {})?;

        let title = submission_title(&Local::now());
        // A draft until every answer is attached: results only read published records.
        let record_id = stored(self.store.create_record(
            &record_type.slug,
            &title,
            RecordStatus::Draft,
        ))?;
        for (key, value) in answers.answers.iter() {
            stored(
                self.store
                    .attach_metadata(record_id, &meta_key(key), &value.to_string()),
            )?;
        }
        stored(self.store.set_status(record_id, RecordStatus::Publish))?;
        info!(
            "handle_submission: {:?}: stored record #{} with {} answers",
            schema.identifier,
            record_id,
            answers.len()
        );

        let redirect_url = match redirect_url(
            &self.home_url,
            raw.single(REDIRECT_FIELD),
            raw.single(REFERER_FIELD),
        ) {
            Ok(u) => u,
            Err(e) => {
                warn!("handle_submission: invalid redirect target ({}), using the home url", e);
                redirect_url(&self.home_url, None, None).context(InvalidUrlSnafu {
                    url: self.home_url.as_str(),
                })?
            }
        };
        Ok(SubmissionOutcome::Accepted {
            record_id,
            redirect_url,
        })
    }

    /// The published answers of a survey, summarized per question.
    pub fn render_results(&self, identifier: &str) -> SurveyResult<(Schema, SurveyReport)> {
        let schema = self.load(identifier)?;
        if schema.record_type.slug.is_empty() {
            return MissingRecordTypeSnafu {
                identifier: schema.identifier.clone(),
            }
            .fail();
        }
        let ids = stored(
            self.store
                .list_records(&schema.record_type.slug, RecordStatus::Publish),
        )?;
        let mut entries: Vec<Vec<(String, String)>> = Vec::new();
        for id in ids.iter() {
            entries.push(stored(self.store.read_metadata(*id))?);
        }
        debug!(
            "render_results: {:?}: {} entries",
            schema.identifier,
            entries.len()
        );
        let answers = collect_answers(&entries);
        let report = build_report(&schema.questions, &answers, entries.len() as u64);
        Ok((schema, report))
    }

    /// The latest (or earliest) published submissions of a survey.
    pub fn list_entries(
        &self,
        identifier: &str,
        number: usize,
        order: ListOrder,
    ) -> SurveyResult<Vec<RecordSummary>> {
        let schema = self.load(identifier)?;
        let mut ids = stored(
            self.store
                .list_records(&schema.record_type.slug, RecordStatus::Publish),
        )?;
        if order == ListOrder::Desc {
            ids.reverse();
        }
        let mut res = Vec::new();
        for id in ids.into_iter().take(number) {
            res.push(stored(self.store.read_record(id))?);
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/survey_configurations.json"
    );

    fn site() -> SurveySite<MemoryStore> {
        let _ = env_logger::builder().is_test(true).try_init();
        SurveySite::new(FIXTURE, "https://example.org/", MemoryStore::new()).unwrap()
    }

    fn valid_submission() -> RawSubmission {
        RawSubmission::new()
            .with("survey_slug", "site_feedback")
            .with("q_overall_rating", "5")
            .with("q_topics[]", "design")
            .with("q_topics[]", "content")
            .with("q_comment", "Lovely <b>site</b>")
            .with("_referer", "/feedback?survey_error=1")
    }

    #[test]
    fn accepted_submission_is_stored() {
        let mut site = site();
        let outcome = site.handle_submission(&valid_submission()).unwrap();
        let (record_id, url) = match outcome {
            SubmissionOutcome::Accepted {
                record_id,
                redirect_url,
            } => (record_id, redirect_url),
            x => panic!("unexpected outcome {:?}", x),
        };
        assert_eq!(
            url.as_str(),
            "https://example.org/feedback?survey_success=true"
        );
        let store = site.store();
        assert!(store.record_type_exists("site_feedback_entry"));
        let record = store.read_record(record_id).unwrap();
        assert!(record.title.starts_with("Survey Submission - "));
        assert_eq!(record.status, RecordStatus::Publish);
        let meta = store.read_metadata(record_id).unwrap();
        assert_eq!(
            meta,
            vec![
                ("ans_overall_rating".to_string(), "5".to_string()),
                ("ans_topics".to_string(), "5".to_string()),
                ("ans_comment".to_string(), "Lovely site".to_string()),
                ("ans_email".to_string(), "".to_string()),
            ]
        );
    }

    #[test]
    fn rejected_submission_stores_nothing() {
        let mut site = site();
        let raw = RawSubmission::new()
            .with("survey_slug", "site_feedback")
            .with("q_email", "not an address");
        match site.handle_submission(&raw).unwrap() {
            SubmissionOutcome::Rejected { errors } => {
                let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                assert_eq!(
                    messages,
                    vec![
                        "How would you rate this site? is a required field.",
                        "What were you looking for? is a required field (choose at least one option).",
                        "Email is not a valid email address.",
                    ]
                );
            }
            x => panic!("unexpected outcome {:?}", x),
        }
        assert!(!site.store().record_type_exists("site_feedback_entry"));
    }

    #[test]
    fn submission_without_survey() {
        let mut site = site();
        let err = site
            .handle_submission(&RawSubmission::new().with("q_comment", "hi"))
            .unwrap_err();
        assert!(matches!(err, SurveyError::MissingSurveySlug {}));
        assert!(err.user_message().contains("slug"));
    }

    #[test]
    fn results_after_submissions() {
        let mut site = site();
        site.handle_submission(&valid_submission()).unwrap();
        site.handle_submission(
            &RawSubmission::new()
                .with("survey_slug", "site_feedback")
                .with("q_overall_rating", "2")
                .with("q_topics", "content"),
        )
        .unwrap();

        let (schema, report) = site.render_results("site_feedback").unwrap();
        assert_eq!(schema.identifier, "site_feedback");
        assert_eq!(report.total_entries, 2);
        let charts = report.charts();
        assert_eq!(charts.len(), 2);
        assert_eq!(
            charts[0].labels,
            vec!["Poor", "Fair", "Good", "Very good", "Excellent"]
        );
        assert_eq!(charts[0].counts, vec![0, 1, 0, 0, 1]);
        assert_eq!(charts[1].labels, vec!["Design", "Navigation", "Content"]);
        assert_eq!(charts[1].counts, vec![1, 0, 2]);
        assert_eq!(
            report.text_lists()[0].answers,
            vec!["Lovely site".to_string()]
        );
    }

    #[test]
    fn results_without_entries() {
        let site = site();
        let (_, report) = site.render_results("site_feedback").unwrap();
        assert_eq!(report.notice, Some(ReportNotice::NoResultsYet));
    }

    #[test]
    fn identifiers_are_sanitized_before_lookup() {
        let site = site();
        let (schema, _) = site.render_results("Event_Poll").unwrap();
        assert_eq!(schema.identifier, "event_poll");
        assert_eq!(site.load("EVENT_POLL ").unwrap().identifier, "event_poll");
    }

    #[test]
    fn entries_are_listed_in_order() {
        let mut site = site();
        let mut ids = Vec::new();
        for _ in 0..3 {
            match site.handle_submission(&valid_submission()).unwrap() {
                SubmissionOutcome::Accepted { record_id, .. } => ids.push(record_id),
                x => panic!("unexpected outcome {:?}", x),
            }
        }
        let latest: Vec<RecordId> = site
            .list_entries("site_feedback", 2, ListOrder::Desc)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(latest, vec![ids[2], ids[1]]);
        let oldest: Vec<RecordId> = site
            .list_entries("site_feedback", 5, ListOrder::Asc)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(oldest, ids);
    }

    #[test]
    fn register_every_survey() {
        let mut site = site();
        let res = site.register_all().unwrap();
        let slugs: Vec<&str> = res.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(slugs, vec!["site_feedback_entry", "event_poll_entry"]);
        assert!(res.iter().all(|(_, r)| r.is_ok()));
        let again = site.register_all().unwrap();
        assert!(again
            .iter()
            .all(|(_, r)| matches!(r, Ok(RegistrationOutcome::AlreadyRegistered))));
    }

    /// Fails on the given call to `attach_metadata`.
    struct FailingStore {
        inner: MemoryStore,
        fail_at: usize,
        attached: usize,
    }

    impl SubmissionStore for FailingStore {
        fn create_record(
            &mut self,
            record_type: &str,
            title: &str,
            status: RecordStatus,
        ) -> StorageResult<RecordId> {
            self.inner.create_record(record_type, title, status)
        }

        fn attach_metadata(&mut self, id: RecordId, key: &str, value: &str) -> StorageResult<()> {
            self.attached += 1;
            if self.attached == self.fail_at {
                return Err(StorageError::WritingStore {
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                    path: "store.json".to_string(),
                });
            }
            self.inner.attach_metadata(id, key, value)
        }

        fn set_status(&mut self, id: RecordId, status: RecordStatus) -> StorageResult<()> {
            self.inner.set_status(id, status)
        }

        fn list_records(&self, record_type: &str, status: RecordStatus) -> StorageResult<Vec<RecordId>> {
            self.inner.list_records(record_type, status)
        }

        fn read_metadata(&self, id: RecordId) -> StorageResult<Vec<(String, String)>> {
            self.inner.read_metadata(id)
        }

        fn read_record(&self, id: RecordId) -> StorageResult<RecordSummary> {
            self.inner.read_record(id)
        }
    }

    impl RecordTypeHost for FailingStore {
        fn record_type_exists(&self, slug: &str) -> bool {
            self.inner.record_type_exists(slug)
        }

        fn register_record_type(&mut self, def: &survey_tally::RecordTypeDefinition) -> StorageResult<()> {
            self.inner.register_record_type(def)
        }
    }

    #[test]
    fn partially_stored_submission_is_not_published() {
        let store = FailingStore {
            inner: MemoryStore::new(),
            fail_at: 2,
            attached: 0,
        };
        let mut site = SurveySite::new(FIXTURE, "https://example.org/", store).unwrap();
        let err = site.handle_submission(&valid_submission()).unwrap_err();
        assert!(matches!(err, SurveyError::Storage { .. }));

        let (_, report) = site.render_results("site_feedback").unwrap();
        assert_eq!(report.total_entries, 0);
        assert_eq!(report.notice, Some(ReportNotice::NoResultsYet));
        assert!(site
            .list_entries("site_feedback", 5, ListOrder::Desc)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn invalid_home_url() {
        assert!(matches!(
            SurveySite::new(FIXTURE, "not a url", MemoryStore::new()),
            Err(SurveyError::InvalidUrl { .. })
        ));
    }
}
