//! Label providers for account and media pickers
//!
//! Turn `GET /accounts` and `GET /media` responses into `{name, value}` pairs a host
//! can show in a selection list.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OptionEntry {
    pub name: String,
    pub value: u64,
}

/// `"<name> (<platform>)"` for every account in the response, using the platform text
/// exactly as the server sent it. Accounts without a platform are labelled by name only.
pub fn account_options(response: &Value) -> Vec<OptionEntry> {
    entries(response)
        .filter_map(|account| {
            let value = entry_id(account)?;
            let name = text(account, "name");
            let name = match text(account, "platform") {
                platform if platform.is_empty() => name,
                platform => format!("{name} ({platform})"),
            };
            Some(OptionEntry { name, value })
        })
        .collect()
}

/// Media name for every media item in the response
pub fn media_options(response: &Value) -> Vec<OptionEntry> {
    entries(response)
        .filter_map(|media| {
            Some(OptionEntry {
                value: entry_id(media)?,
                name: text(media, "name"),
            })
        })
        .collect()
}

fn entries(response: &Value) -> impl Iterator<Item = &Value> {
    response
        .get("data")
        .and_then(|d| d.as_array())
        .into_iter()
        .flatten()
}

// An entry is only selectable when it has an ID.
fn entry_id(entry: &Value) -> Option<u64> {
    match entry.get("id")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(entry: &Value, key: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_options_label_includes_platform() {
        let response = json!({"data": [
            {"id": 1, "name": "Acme", "platform": "twitter", "username": "acme"},
            {"id": 2, "name": "Acme EU", "platform": "linkedin"}
        ]});

        let options = account_options(&response);

        assert_eq!(
            options,
            vec![
                OptionEntry { name: "Acme (twitter)".to_string(), value: 1 },
                OptionEntry { name: "Acme EU (linkedin)".to_string(), value: 2 },
            ]
        );
    }

    #[test]
    fn test_media_options() {
        let response = json!({"data": [{"id": 5, "name": "banner.jpg", "mime_type": "image/jpeg"}]});
        assert_eq!(
            media_options(&response),
            vec![OptionEntry { name: "banner.jpg".to_string(), value: 5 }]
        );
    }

    #[test]
    fn test_missing_data_yields_no_options() {
        assert!(account_options(&json!({"message": "oops"})).is_empty());
        assert!(media_options(&json!({"data": "nope"})).is_empty());
        assert!(media_options(&Value::Null).is_empty());
    }

    #[test]
    fn test_account_options_keep_raw_platform_text() {
        let response = json!({"data": [
            {"id": 4, "name": "Acme", "platform": "facebook_page"},
            {"id": 5, "name": "Shop", "platform": "pinterest"},
            {"id": 6, "name": "NoPlatform"}
        ]});

        assert_eq!(
            account_options(&response),
            vec![
                OptionEntry { name: "Acme (facebook_page)".to_string(), value: 4 },
                OptionEntry { name: "Shop (pinterest)".to_string(), value: 5 },
                OptionEntry { name: "NoPlatform".to_string(), value: 6 },
            ]
        );
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let response = json!({"data": [{"id": "x"}, {"id": 3, "name": "ok.png"}]});
        assert_eq!(media_options(&response).len(), 1);
    }
}
