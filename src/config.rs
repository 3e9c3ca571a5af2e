use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of sections/groups returned per query
pub const DEFAULT_TOP_K: usize = 3;

/// File name of the statutory-section index inside the index directory
pub const SECTION_INDEX_FILE: &str = "us_code.index";

/// File name of the demographic descriptor index inside the index directory
pub const DEMOGRAPHIC_INDEX_FILE: &str = "demographics.index";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BillscopeConfig {
    pub sections: Option<String>,
    pub law_mapping: Option<String>,
    pub bills: Option<String>,
    pub demographics: Option<String>,
    pub index_dir: Option<String>,
    pub top_k: Option<usize>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("billscope.toml")
}

pub fn default_sections_path() -> PathBuf {
    PathBuf::from("data_output/processed_uscode_sections.json")
}

pub fn default_law_mapping_path() -> PathBuf {
    PathBuf::from("data_output/public_law_to_us_code_mapping.json")
}

pub fn default_bills_path() -> PathBuf {
    PathBuf::from("data_output/bill_data_118.json")
}

pub fn default_demographics_path() -> PathBuf {
    PathBuf::from("data/demographic_data.json")
}

pub fn default_index_dir() -> PathBuf {
    PathBuf::from("indexes")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BillscopeConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BillscopeConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_config_is_none() {
        assert!(load_config(Some(Path::new("/nonexistent/billscope.toml")))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "index_dir = \"custom_indexes\"\ntop_k = 5").unwrap();

        let config = load_config(Some(file.path())).unwrap().unwrap();
        assert_eq!(config.index_dir.as_deref(), Some("custom_indexes"));
        assert_eq!(config.top_k, Some(5));
        assert!(config.sections.is_none());
    }
}
