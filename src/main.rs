use clap::Parser;
use log::{debug, error, info, warn};
use snafu::{prelude::*, ErrorCompat};
use std::path::Path;

mod args;
mod survey;

use crate::args::{Args, Command};
use crate::survey::io_common::{parse_form_body, parse_form_json};
use crate::survey::io_json::*;
use crate::survey::store::JsonFileStore;
use crate::survey::*;

fn read_submission(
    data: &Option<String>,
    data_file: &Option<String>,
) -> SurveyResult<survey_tally::RawSubmission> {
    match (data, data_file) {
        (Some(body), None) => Ok(parse_form_body(body)),
        (None, Some(path)) => {
            let js = read_json(path)?;
            match parse_form_json(&js) {
                Some(raw) => Ok(raw),
                None => whatever!("The submission in {} is not a JSON object", path),
            }
        }
        _ => whatever!("Exactly one of --data and --data-file must be provided"),
    }
}

fn run(args: &Args) -> SurveyResult<()> {
    let store = JsonFileStore::open(Path::new(&args.store)).context(StorageSnafu {})?;
    let mut site = SurveySite::new(&args.config, &args.home_url, store)?;

    match &args.command {
        Command::Register => {
            for (slug, outcome) in site.register_all()? {
                match outcome {
                    Ok(o) => println!("{}: {:?}", slug, o),
                    Err(e) => println!("{}: failed: {}", slug, e),
                }
            }
        }
        Command::Form { survey, out } => {
            let schema = site.load(survey)?;
            write_output(&form_to_json(&schema), out.as_deref())?;
        }
        Command::Submit { data, data_file } => {
            let raw = read_submission(data, data_file)?;
            debug!("submission: {:?}", raw);
            let outcome = site.handle_submission(&raw)?;
            write_output(&outcome_to_json(&outcome), None)?;
            if let SubmissionOutcome::Rejected { .. } = outcome {
                whatever!("Please correct the errors of the submission")
            }
        }
        Command::Results {
            survey,
            out,
            reference,
        } => {
            let (schema, report) = site.render_results(survey)?;
            let pretty = write_output(&report_to_json(&schema.identifier, &report), out.as_deref())?;
            // The reference results, if provided for comparison
            if let Some(r) = reference {
                check_reference(&pretty, r)?;
            }
        }
        Command::Entries {
            survey,
            number,
            order,
        } => {
            let order = match ListOrder::parse(order) {
                Some(o) => o,
                None => whatever!("Unknown order {:?}: expected asc or desc", order),
            };
            let entries = site.list_entries(survey, *number, order)?;
            write_output(&entries_to_json(survey, &entries), None)?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }
    info!("args: {:?}", args);

    if let Err(e) = run(&args) {
        error!("Error occured {:?}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            warn!("trace: {}", bt);
        }
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
