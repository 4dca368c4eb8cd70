//! `vigil record` — print one stored scan record.

use anyhow::{anyhow, Result};

use crate::cli::{output, RecordArgs};
use crate::domain::models::config::Config;
use crate::domain::ports::build_history::{BuildHistoryProvider, BuildRef};
use crate::infrastructure::history::store::FileHistoryStore;

pub fn execute(args: &RecordArgs, json: bool, config: &Config) -> Result<()> {
    let store = FileHistoryStore::new(&config.history.dir);
    let build = BuildRef::new(args.build_number);
    let record = store
        .scan_record(&build)
        .ok_or_else(|| anyhow!("no scan record stored for build {build}"))?;
    output::render_record(&record, json)
}
