use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;

/// Default output path for a pipeline stage: `output/sdg-{stage}-{YYMMDD}.csv`
pub fn generate_default_output_filename(stage: &str) -> PathBuf {
    default_output_filename_for(stage, Local::now().date_naive())
}

fn default_output_filename_for(stage: &str, date: NaiveDate) -> PathBuf {
    let filename = format!(
        "sdg-{}-{:02}{:02}{:02}.csv",
        stage,
        date.year() % 100,
        date.month(),
        date.day()
    );
    PathBuf::from("output").join(filename)
}
