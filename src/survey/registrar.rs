use log::{debug, error, info, warn};

use snafu::{prelude::*, Snafu};
use std::collections::HashSet;

use survey_tally::RecordTypeDefinition;

use crate::survey::config_reader::{read_post_type, SurveyConfig};
use crate::survey::store::{RecordTypeHost, StorageError};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RegistrationError {
    #[snafu(display("record type definition is missing the field {field:?}"))]
    MissingField { field: String },
    #[snafu(display("the host refused to register record type {slug:?}"))]
    HostRefused { source: StorageError, slug: String },
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RegistrationOutcome {
    Registered,
    /// Already registered earlier by this registrar.
    AlreadyRegistered,
    /// Registered in the host by someone else.
    ExistsInHost,
}

/// Registers record types at most once.
///
/// The slugs registered through a registrar are remembered for its whole
/// lifetime. The host is asked as well, for the types it already knows.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Registrar {
    registered: HashSet<String>,
}

fn check_fields(def: &RecordTypeDefinition) -> Result<(), RegistrationError> {
    let fields = [
        ("slug", &def.slug),
        ("name_plural", &def.name_plural),
        ("name_singular", &def.name_singular),
        ("menu_label", &def.menu_label),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return MissingFieldSnafu { field }.fail();
        }
    }
    Ok(())
}

impl Registrar {
    pub fn new() -> Registrar {
        Registrar::default()
    }

    pub fn is_registered(&self, slug: &str) -> bool {
        self.registered.contains(slug)
    }

    pub fn register<H: RecordTypeHost + ?Sized>(
        &mut self,
        host: &mut H,
        def: &RecordTypeDefinition,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        check_fields(def)?;
        if self.registered.contains(&def.slug) {
            debug!(
                "register: record type {:?} already processed, skipping",
                def.slug
            );
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }
        if host.record_type_exists(&def.slug) {
            info!(
                "register: record type {:?} already exists in the host, skipping",
                def.slug
            );
            return Ok(RegistrationOutcome::ExistsInHost);
        }
        host.register_record_type(def).context(HostRefusedSnafu {
            slug: def.slug.clone(),
        })?;
        self.registered.insert(def.slug.clone());
        info!("register: registered record type {:?}", def.slug);
        Ok(RegistrationOutcome::Registered)
    }

    /// Registers the record types of all the surveys of a configuration.
    ///
    /// A failure is reported for its survey only. Surveys without a record
    /// type definition are skipped.
    pub fn register_all<H: RecordTypeHost + ?Sized>(
        &mut self,
        host: &mut H,
        collection: &[SurveyConfig],
    ) -> Vec<(String, Result<RegistrationOutcome, RegistrationError>)> {
        let mut res = Vec::new();
        for (idx, config) in collection.iter().enumerate() {
            let name = config
                .slug_identifier
                .clone()
                .unwrap_or_else(|| format!("#{}", idx));
            let value = match &config.post_type_definition {
                Some(v) => v,
                None => {
                    warn!(
                        "register_all: no record type definition for survey {:?}, skipping",
                        name
                    );
                    continue;
                }
            };
            let def = match read_post_type(value, &name) {
                Ok(pt) => pt.to_definition(),
                Err(e) => {
                    warn!("register_all: {}, skipping", e);
                    continue;
                }
            };
            let outcome = self.register(host, &def);
            if let Err(e) = &outcome {
                error!("register_all: survey {:?}: {}", name, e);
            }
            let key = if def.slug.is_empty() { name } else { def.slug };
            res.push((key, outcome));
        }
        res
    }
}
