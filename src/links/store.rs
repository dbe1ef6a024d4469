// src/links/store.rs
// =============================================================================
// Reading and writing the friend-link document.
//
// The file is rewritten in the same pretty-printed layout the site build
// produces (2-space indentation, no trailing newline), so that a run's diff
// only ever touches `responseTime` lines.
// =============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use super::FriendLinksDocument;
use crate::checker::CheckResult;

const RESPONSE_TIME_KEY: &str = "responseTime";

// Loads and parses the document at `path`.
pub fn load(path: &Path) -> Result<FriendLinksDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read friend links from {}", path.display()))?;

    let root: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse friend links in {}", path.display()))?;

    FriendLinksDocument::from_value(root)
        .with_context(|| format!("unexpected friend links layout in {}", path.display()))
}

// Serializes the whole document back to `path`.
// Errors are propagated; a failed write aborts the run.
pub fn save(path: &Path, doc: &FriendLinksDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(doc.as_value())
        .context("failed to serialize friend links")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write friend links to {}", path.display()))
}

/// Folds check results back into the document.
///
/// Every link object whose `url` has a result gets its `responseTime`
/// overwritten in place, or appended as the last key when it was absent (0
/// when the result carries no time). Nothing else in the document is touched.
/// Returns the number of link objects updated.
pub fn apply_results(doc: &mut FriendLinksDocument, results: &HashMap<String, CheckResult>) -> usize {
    let mut updated = 0;

    for link in doc.link_objects_mut() {
        let result = link
            .get("url")
            .and_then(Value::as_str)
            .and_then(|url| results.get(url));

        if let Some(result) = result {
            link.insert(
                RESPONSE_TIME_KEY.to_string(),
                Value::from(result.response_time.unwrap_or(0)),
            );
            updated += 1;
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckOutcome;
    use std::io::Write;

    // Keys deliberately not in the order a struct would declare them.
    const SAMPLE: &str = r#"{
  "categories": [
    {
      "id": "c1",
      "code": "friends",
      "name": "Friends",
      "sort_order": 1
    }
  ],
  "links": [
    {
      "id": "1",
      "name": "Alice",
      "url": "https://alice.example",
      "avatar": "https://alice.example/avatar.png",
      "description": "Alice's blog",
      "responseTime": 120,
      "status": "active",
      "category_code": "friends",
      "sort_order": 1
    },
    {
      "id": "2",
      "name": "Bob",
      "url": "https://bob.example",
      "description": "Bob's notes",
      "status": "inactive",
      "category_code": "friends",
      "sort_order": 2
    },
    {
      "sort_order": 3,
      "id": "3",
      "name": "Carol",
      "url": "https://carol.example",
      "description": "",
      "avatar": "",
      "status": "active",
      "category_code": "friends"
    }
  ],
  "updated_by": "hand"
}"#;

    fn write_sample(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    fn result(url: &str, outcome: CheckOutcome, time: Option<u64>) -> CheckResult {
        CheckResult {
            name: "x".to_string(),
            url: url.to_string(),
            outcome,
            http_status: None,
            response_time: time,
            reason: None,
        }
    }

    #[test]
    fn test_load_then_save_keeps_key_order() {
        let file = write_sample(SAMPLE);
        let doc = load(file.path()).unwrap();
        assert_eq!(doc.links().len(), 3);

        save(file.path(), &doc).unwrap();
        let written = fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, SAMPLE);
    }

    #[test]
    fn test_apply_results_only_touches_response_time() {
        let file = write_sample(SAMPLE);
        let mut doc = load(file.path()).unwrap();

        let mut results = HashMap::new();
        results.insert(
            "https://alice.example".to_string(),
            result("https://alice.example", CheckOutcome::Ok, Some(87)),
        );
        results.insert(
            "https://carol.example".to_string(),
            result("https://carol.example", CheckOutcome::Timeout, None),
        );

        let updated = apply_results(&mut doc, &results);
        assert_eq!(updated, 2);

        let links = doc.links();
        assert_eq!(links[0].response_time, Some(87));
        // inactive link: absent stays absent
        assert_eq!(links[1].response_time, None);
        assert_eq!(links[2].response_time, Some(0));

        save(file.path(), &doc).unwrap();
        let expected = SAMPLE
            .replace("\"responseTime\": 120", "\"responseTime\": 87")
            .replace(
                "\"category_code\": \"friends\"\n    }\n  ],",
                "\"category_code\": \"friends\",\n      \"responseTime\": 0\n    }\n  ],",
            );
        assert_eq!(fs::read_to_string(file.path()).unwrap(), expected);
    }

    #[test]
    fn test_record_without_avatar_still_loads() {
        // Bob has no avatar in SAMPLE
        let file = write_sample(SAMPLE);
        let doc = load(file.path()).unwrap();
        let links = doc.links();
        assert_eq!(links[1].name, "Bob");
        assert_eq!(links.iter().filter(|l| l.is_active()).count(), 2);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load(Path::new("/definitely/not/here/friends.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here/friends.json"));
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let file = write_sample("{ not json");
        assert!(load(file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_document_without_links() {
        let file = write_sample(r#"{ "categories": [] }"#);
        let err = load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("missing `links` array"));
    }
}
