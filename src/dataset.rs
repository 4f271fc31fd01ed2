use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Attributes;

/// A node to seed the graph with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub properties: Attributes,
}

impl NodeSpec {
    fn person(name: &str, city: &str, language: &str, team: &str) -> Self {
        let mut properties = Attributes::new();
        properties.insert("city".to_owned(), city.to_owned());
        properties.insert("language".to_owned(), language.to_owned());
        properties.insert("team".to_owned(), team.to_owned());
        Self {
            name: name.to_owned(),
            properties,
        }
    }
}

const SAMPLE_PEOPLE: [(&str, &str, &str, &str); 24] = [
    ("Alice", "Berlin", "German", "Platform"),
    ("Bruno", "Lisbon", "Portuguese", "Platform"),
    ("Chiara", "Milan", "Italian", "Design"),
    ("Dmitri", "Berlin", "Russian", "Data"),
    ("Elena", "Madrid", "Spanish", "Design"),
    ("Farid", "Paris", "French", "Data"),
    ("Greta", "Berlin", "German", "Design"),
    ("Hiro", "Tokyo", "Japanese", "Platform"),
    ("Ines", "Lisbon", "Portuguese", "Data"),
    ("Jonas", "Berlin", "German", "Data"),
    ("Kenji", "Tokyo", "Japanese", "Mobile"),
    ("Lucia", "Madrid", "Spanish", "Mobile"),
    ("Marc", "Paris", "French", "Platform"),
    ("Nadia", "Paris", "French", "Design"),
    ("Oskar", "Berlin", "German", "Mobile"),
    ("Paula", "Madrid", "Spanish", "Data"),
    ("Quentin", "Paris", "French", "Mobile"),
    ("Rosa", "Milan", "Italian", "Platform"),
    ("Sven", "Berlin", "English", "Platform"),
    ("Tomas", "Lisbon", "Spanish", "Mobile"),
    ("Uma", "Tokyo", "English", "Design"),
    ("Viktor", "Milan", "Russian", "Data"),
    ("Wen", "Tokyo", "English", "Data"),
    ("Ximena", "Madrid", "Spanish", "Platform"),
];

pub fn sample_people() -> Vec<NodeSpec> {
    SAMPLE_PEOPLE
        .iter()
        .map(|(name, city, language, team)| NodeSpec::person(name, city, language, team))
        .collect()
}

/// Reads a JSON array of `{ "name": ..., "properties": { ... } }`.
pub fn load_nodes(path: impl AsRef<Path>) -> Result<Vec<NodeSpec>> {
    let raw = std::fs::read_to_string(path)?;
    let specs: Vec<NodeSpec> = serde_json::from_str(&raw)?;
    if let Some(position) = specs.iter().position(|spec| spec.name.trim().is_empty()) {
        return Err(Error::InvalidDataset(format!(
            "node at index {position} has an empty name"
        )));
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn sample_has_recognized_attributes() {
        let people = sample_people();
        assert_eq!(people.len(), SAMPLE_PEOPLE.len());
        for person in &people {
            for key in crate::model::RECOGNIZED_ATTRIBUTES {
                assert!(person.properties.contains_key(key));
            }
        }
    }

    #[test]
    fn load_nodes_reads_json_array() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{ "name": "Ada", "properties": {{ "city": "London" }} }}, {{ "name": "Linus" }}]"#
        )
        .expect("write");

        let specs = load_nodes(file.path()).expect("load");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].properties.get("city").map(String::as_str), Some("London"));
        assert!(specs[1].properties.is_empty());
    }

    #[test]
    fn load_nodes_rejects_blank_names() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"[{{ "name": "  " }}]"#).expect("write");
        assert!(matches!(load_nodes(file.path()), Err(Error::InvalidDataset(_))));
    }
}
