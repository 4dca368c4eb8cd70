//! `vigil history` — list stored scan records.

use anyhow::Result;

use crate::cli::output;
use crate::domain::models::config::Config;
use crate::domain::ports::build_history::BuildHistoryProvider;
use crate::infrastructure::history::store::FileHistoryStore;

pub fn execute(json: bool, config: &Config) -> Result<()> {
    let store = FileHistoryStore::new(&config.history.dir);
    let entries: Vec<_> = store
        .recorded_builds()?
        .into_iter()
        .filter_map(|build| store.scan_record(&build).map(|record| (build, record)))
        .collect();
    output::render_history(&entries, json)
}
