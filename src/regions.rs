use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RegionRow {
    code: String,
    name: String,
}

/// Immutable region code → display name mapping handed to the loader.
#[derive(Debug, Clone, Default)]
pub struct RegionNames {
    names: HashMap<String, String>,
}

impl RegionNames {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening region names {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("reading region names {}", path.display()))
    }

    /// Reads a `code,name` CSV. Codes are matched case-insensitively.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut names = HashMap::new();
        for row in rdr.deserialize::<RegionRow>() {
            let row = row?;
            names.insert(row.code.to_uppercase(), row.name);
        }
        Ok(RegionNames { names })
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.names.get(&code.trim().to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for RegionNames {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        RegionNames {
            names: iter
                .into_iter()
                .map(|(code, name)| (code.to_uppercase(), name))
                .collect(),
        }
    }
}
