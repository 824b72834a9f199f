use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use url::form_urlencoded;

const SEARCH_BASE: &str = "https://www.ebay.com/sch/i.html";
const SOLD_ONLY: &str = "LH_Sold=1";
const PAGE_SIZE: &str = "_ipg=240";

/// Item condition filter. Each variant selects one fixed group of
/// marketplace condition codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Working,
    New,
    Used,
    Defect,
}

impl Condition {
    pub fn codes(self) -> &'static [u16] {
        match self {
            Condition::Working => &[1500, 2500, 3000, 1000],
            Condition::New => &[1000, 1500],
            Condition::Used => &[3000, 2500],
            Condition::Defect => &[7000],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Working => "working",
            Condition::New => "new",
            Condition::Used => "used",
            Condition::Defect => "defect",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form-encodes the search text: spaces become `+`, and query
/// metacharacters (`&`, `=`, `#`, `+`) are percent-escaped.
pub fn escape_item(item: &str) -> String {
    let collapsed = item.split_whitespace().collect::<Vec<_>>().join(" ");
    form_urlencoded::byte_serialize(collapsed.as_bytes()).collect()
}

/// Builds the sold-listings search URL. `item` must already be escaped.
pub fn build_url(item: &str, condition: Condition) -> String {
    let codes = condition
        .codes()
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("|");

    format!("{SEARCH_BASE}?_nkw={item}&{SOLD_ONLY}&{PAGE_SIZE}&LH_ItemCondition={codes}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Condition; 4] = [
        Condition::Working,
        Condition::New,
        Condition::Used,
        Condition::Defect,
    ];

    fn condition_param(url: &str) -> Vec<&str> {
        url.split('&')
            .filter(|p| p.starts_with("LH_ItemCondition="))
            .collect()
    }

    #[test]
    fn test_every_condition_has_one_code_group_and_fixed_params() {
        for condition in ALL {
            let url = build_url("widget", condition);
            assert!(url.contains("LH_Sold=1"), "{url}");
            assert!(url.contains("_ipg=240"), "{url}");

            let params = condition_param(&url);
            assert_eq!(params.len(), 1, "{url}");
            let expected = condition
                .codes()
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("|");
            assert_eq!(params[0], format!("LH_ItemCondition={expected}"));
        }
    }

    #[test]
    fn test_used_url() {
        let url = build_url("widget", Condition::Used);
        assert_eq!(
            url,
            "https://www.ebay.com/sch/i.html?_nkw=widget&LH_Sold=1&_ipg=240&LH_ItemCondition=3000|2500"
        );
    }

    #[test]
    fn test_escape_item() {
        assert_eq!(escape_item("macbook air m1 8gb"), "macbook+air+m1+8gb");
        assert_eq!(escape_item("  lonely  "), "lonely");
        assert_eq!(escape_item("AT&T phone"), "AT%26T+phone");
        assert_eq!(escape_item("c++ #1 a=b"), "c%2B%2B+%231+a%3Db");
    }

    #[test]
    fn test_item_cannot_inject_query_params() {
        let url = build_url(&escape_item("lens&LH_ItemCondition=7000"), Condition::Used);
        assert_eq!(condition_param(&url), vec!["LH_ItemCondition=3000|2500"]);
        assert!(url.contains("_nkw=lens%26LH_ItemCondition%3D7000&"), "{url}");

        let url = build_url(&escape_item("AT&T phone"), Condition::New);
        assert!(url.contains("_nkw=AT%26T+phone&LH_Sold=1"), "{url}");
        assert!(!url.split('&').any(|p| p.starts_with("T+phone")), "{url}");
    }

    #[test]
    fn test_condition_parses_case_insensitively() {
        assert_eq!(Condition::from_str("USED", true), Ok(Condition::Used));
        assert_eq!(Condition::from_str("Defect", true), Ok(Condition::Defect));
        assert!(Condition::from_str("broken", true).is_err());
    }
}
