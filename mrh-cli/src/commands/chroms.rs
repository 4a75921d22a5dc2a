//! Chroms command implementation - list what a dataset offers

use anyhow::Result;
use mrh_core::controls::control_specs;
use mrh_core::DataConfig;
use std::path::Path;

use crate::config::Config;
use crate::dataset::Dataset;

/// One line per header, tab separated: name, start, stop, minscore, maxscore.
pub fn format_headers(dataset: &Dataset) -> String {
    dataset
        .headers
        .iter()
        .map(|h| format!("{}\t{}\t{}\t{}\t{}", h.name, h.start, h.stop, h.minscore, h.maxscore))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn execute(config: &Config, dataset: &Path, controls: bool) -> Result<String> {
    let dataset = Dataset::load(dataset)?;
    if !controls {
        return Ok(format_headers(&dataset));
    }
    let data = DataConfig::with_default_view(dataset.source()?, config.viewer.header_policy)?;
    let specs = control_specs(&data);
    Ok(serde_json::to_string_pretty(&specs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrh_core::Header;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dataset_file() -> NamedTempFile {
        let dataset = Dataset {
            dataset_id: "hic".into(),
            headers: vec![Header::new("chr1", 0, 5000, -1.0, 1.0), Header::new("chr2", 0, 800, 0.0, 4.0)],
            data: Vec::new(),
        };
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", serde_json::to_string(&dataset).unwrap()).unwrap();
        f
    }

    #[test]
    fn test_lists_headers() {
        let f = dataset_file();
        let out = execute(&Config::default(), f.path(), false).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["chr1\t0\t5000\t-1\t1", "chr2\t0\t800\t0\t4"]);
    }

    #[test]
    fn test_controls_json() {
        let f = dataset_file();
        let out = execute(&Config::default(), f.path(), true).unwrap();
        let specs: serde_json::Value = serde_json::from_str(&out).unwrap();
        let names: Vec<&str> = specs
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["dataset_id", "chrom1", "start1", "stop1", "chrom2", "start2", "stop2"]);
    }
}
