use std::error::Error;
use std::fs;
use regex::Regex;
use crate::config::CacheConfig;

pub const TEST_DATA_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata");

pub struct TestCase {
    pub name: String,
    pub config: CacheConfig,
    pub trace: String,
    pub output: String,
}

/// Collects the bundled trace cases. Each expected output file is named
/// `<trace>-s<s>-E<E>-b<b>.json` and is paired with `traces/<trace>.trace`
pub fn get_configs() -> Result<Vec<TestCase>, Box<dyn Error>> {
    let mut out = Vec::new();
    let expected_directory = fs::read_dir(format!("{TEST_DATA_PATH}/expected"))?;
    let output_pattern = Regex::new(r"^(?P<trace>[0-9a-zA-Z_]+)-s(?P<s>\d+)-E(?P<E>\d+)-b(?P<b>\d+)\.json$")?;
    let mut file_names = Vec::new();
    for entry in expected_directory {
        let file_name = entry?
            .file_name()
            .into_string()
            .map_err(|e| format!("Can't convert OS string ({e:?}) to standard string"))?;
        if output_pattern.is_match(&file_name) {
            file_names.push(file_name);
        }
    }
    file_names.sort();
    for file_name in file_names {
        let tokens = output_pattern.captures(&file_name).ok_or("Couldn't parse the file name".to_string())?;
        let trace = &tokens["trace"];
        let config = CacheConfig::new(tokens["s"].parse()?, tokens["E"].parse()?, tokens["b"].parse()?);
        out.push(TestCase {
            name: file_name.trim_end_matches(".json").to_string(),
            config,
            trace: format!("{TEST_DATA_PATH}/traces/{trace}.trace"),
            output: format!("{TEST_DATA_PATH}/expected/{file_name}"),
        })
    }
    Ok(out)
}
