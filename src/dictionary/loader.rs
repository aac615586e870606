use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::dictionary::install::{DictionaryStore, InstallReport, install_entries};
use crate::error::{DictionaryError, DictionaryResult};

/// Split a dictionary JSON document into raw entries
///
/// Two layouts are accepted:
/// ```json
/// [ {"id": "...", "sourceWord": "..."}, ... ]
/// ```
/// or an object carrying metadata next to an `entries` array:
/// ```json
/// { "@metadata": { ... }, "entries": [ ... ] }
/// ```
///
/// Individual entries are not validated here; that happens at install time so
/// one bad entry does not reject the whole file.
pub fn parse_dictionary_json(content: &str) -> DictionaryResult<Vec<Value>> {
    let json: Value = serde_json::from_str(content)?;
    match json {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut obj) => match obj.remove("entries") {
            Some(Value::Array(entries)) => Ok(entries),
            _ => Err(DictionaryError::Parse(
                "dictionary object must have an 'entries' array".to_string(),
            )),
        },
        _ => Err(DictionaryError::Parse(
            "dictionary root must be an array or an object".to_string(),
        )),
    }
}

/// Load a dictionary file and install its entries into `store`
///
/// # Errors
/// - File not found or unreadable
/// - Invalid JSON or unexpected root layout
///
/// Per-entry problems are reported in the returned [`InstallReport`].
pub fn load_dictionary_file<S: DictionaryStore + ?Sized>(
    path: &Path,
    store: &S,
) -> DictionaryResult<InstallReport> {
    let content = fs::read_to_string(path)
        .map_err(|e| DictionaryError::Io(format!("Failed to read '{}': {}", path.display(), e)))?;

    let raw = parse_dictionary_json(&content).map_err(|e| match e {
        DictionaryError::Parse(msg) => DictionaryError::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;

    Ok(install_entries(store, raw))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::dictionary::InMemoryDictionary;

    const ENTRIES: &str = r#"[
        {"id": "1", "sourceWord": "house", "targetWord": "casa", "sourceLanguage": "en",
         "targetLanguage": "es", "proficiencyLevel": "beginner", "frequencyRank": 10},
        {"id": "2", "sourceWord": "dog"}
    ]"#;

    #[test]
    fn test_parse_array_layout() {
        assert_eq!(parse_dictionary_json(ENTRIES).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_object_layout() {
        let doc = format!(r#"{{"@metadata": {{"name": "test"}}, "entries": {}}}"#, ENTRIES);
        assert_eq!(parse_dictionary_json(&doc).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_rejects_other_roots() {
        assert!(matches!(parse_dictionary_json("42"), Err(DictionaryError::Parse(_))));
        assert!(matches!(parse_dictionary_json("{\"words\": []}"), Err(DictionaryError::Parse(_))));
        assert!(parse_dictionary_json("not json").is_err());
    }

    #[test]
    fn test_load_file_installs_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en-es.json");
        fs::File::create(&path).unwrap().write_all(ENTRIES.as_bytes()).unwrap();

        let dictionary = InMemoryDictionary::new();
        let report = load_dictionary_file(&path, &dictionary).unwrap();
        assert_eq!(report.installed, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(dictionary.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dictionary = InMemoryDictionary::new();
        let result = load_dictionary_file(Path::new("/nonexistent/dict.json"), &dictionary);
        assert!(matches!(result, Err(DictionaryError::Io(_))));
    }
}
