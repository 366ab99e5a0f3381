//! Collect command
//!
//! Imports raw CSV extracts from the log directory and regroups their
//! entries into day-sharded JSON. A failed extract is reported and
//! skipped; the batch continues.

use std::path::Path;

use anyhow::Result;
use opswatch_common::{csv_import, json_store};
use tracing::{info, warn};

pub fn run(log_dir: &Path, out_dir: &Path) -> Result<()> {
    let paths = csv_import::list_extract_paths(log_dir)?;
    let mut entries = Vec::new();
    let mut imported = 0usize;
    let mut failed = 0usize;
    for path in &paths {
        match csv_import::import_file(path) {
            Ok(batch) => {
                info!("{}: {} entries", path.display(), batch.len());
                imported += 1;
                entries.extend(batch);
            }
            Err(e) => {
                warn!("{}: failed\n{e:#}", path.display());
                failed += 1;
            }
        }
    }
    json_store::export_by_day(&entries, out_dir)?;
    info!(
        "Collected {imported} extracts ({failed} failed), {} entries.",
        entries.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn test_collect_regroups_by_day() {
        let log_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();

        let mut f = fs::File::create(log_dir.path().join("extract-a.csv")).unwrap();
        writeln!(f, "date,host,service,status,message").unwrap();
        writeln!(f, "2019-01-01T10:00:00Z,h1,s1,error,Foo").unwrap();
        writeln!(f, "2019-01-02T10:00:00Z,h1,s1,error,Foo").unwrap();
        let mut g = fs::File::create(log_dir.path().join("extract-b.csv")).unwrap();
        writeln!(g, "date,host,service,status,message").unwrap();
        writeln!(g, "2019-01-01T11:00:00Z,h2,s1,error,Bar").unwrap();
        // Broken extract: missing columns, skipped without failing the run.
        let mut h = fs::File::create(log_dir.path().join("extract-c.csv")).unwrap();
        writeln!(h, "date,host").unwrap();

        run(log_dir.path(), out_dir.path()).unwrap();

        let shards = json_store::list_log_paths(out_dir.path()).unwrap();
        assert_eq!(shards.len(), 2);
        let day1 = json_store::import_file(&shards[0]).unwrap();
        assert_eq!(day1.len(), 2);
    }
}
