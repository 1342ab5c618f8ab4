use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

/// Returns the body of the first fenced code block, tagged `json` or untagged.
#[must_use]
pub fn first_fenced_block(text: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("Invalid regex")
    });

    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Parses the first fenced block of a model response.
///
/// Yields `None` when the response has no fenced block or the block does not
/// hold valid JSON of the expected shape.
#[must_use]
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    serde_json::from_str(first_fenced_block(text)?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Topic {
        topic: String,
        keywords: Vec<String>,
    }

    #[test]
    fn test_parses_json_tagged_block() {
        let text = "Here you go:\n```json\n{\"topic\": \"Clash\", \"keywords\": [\"a\", \"b\"]}\n```\nDone.";
        let topic: Topic = extract_json(text).unwrap();
        assert_eq!(topic.topic, "Clash");
        assert_eq!(topic.keywords, vec!["a", "b"]);
    }

    #[test]
    fn test_parses_untagged_block() {
        let text = "```\n[1, 2, 3]\n```";
        let value: Vec<i32> = extract_json(text).unwrap();
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn test_takes_first_block_only() {
        let text = "```json\n{\"n\": 1}\n```\nand\n```json\n{\"n\": 2}\n```";
        let value: Value = extract_json(text).unwrap();
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn test_none_without_fenced_block() {
        assert!(extract_json::<Value>("{\"topic\": \"bare json is not accepted\"}").is_none());
        assert!(extract_json::<Value>("no json here at all").is_none());
        assert!(extract_json::<Value>("").is_none());
    }

    #[test]
    fn test_none_for_invalid_json_in_block() {
        assert!(extract_json::<Value>("```json\n{not json}\n```").is_none());
        assert!(extract_json::<Topic>("```json\n{\"topic\": 3}\n```").is_none());
    }

    #[test]
    fn test_handles_crlf_and_inline_fence() {
        let text = "```json\r\n{\"topic\":\"x\",\"keywords\":[]}\r\n```";
        assert!(extract_json::<Topic>(text).is_some());
        let inline = "```{\"topic\":\"y\",\"keywords\":[]}```";
        assert!(extract_json::<Topic>(inline).is_some());
    }
}
