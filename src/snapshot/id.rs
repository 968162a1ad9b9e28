//! Snapshot ids: a local timestamp plus a slug of the human name.

use chrono::{DateTime, Local, TimeZone};

const MAX_SLUG_LEN: usize = 120;
const EMPTY_SLUG: &str = "snapshot";

/// Slug of `name`: whitespace runs collapse to `_`, anything outside
/// `[A-Za-z0-9._-]` becomes `_`, at most 120 characters.
pub fn slugify(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join("_");
    let slug: String = collapsed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_SLUG_LEN)
        .collect();
    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}

/// `YYYYMMDD_HHMMSS__<slug>`, sortable by creation time.
pub fn snapshot_id_at<Tz: TimeZone>(name: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}__{}", at.format("%Y%m%d_%H%M%S"), slugify(name))
}

pub fn new_snapshot_id(name: &str) -> String {
    snapshot_id_at(name, &Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use regex::Regex;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Set!"), "My_Set_");
        assert_eq!(slugify("  spaced   out\tname "), "spaced_out_name");
        assert_eq!(slugify("v1.2-final_b"), "v1.2-final_b");
        assert_eq!(slugify("héllo"), "h_llo");
        assert_eq!(slugify("   "), "snapshot");
        assert_eq!(slugify(&"x".repeat(300)).len(), 120);
    }

    #[test]
    fn test_id_format() {
        let at = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .unwrap();
        assert_eq!(snapshot_id_at("My Set!", &at), "20240309_070501__My_Set_");

        let re = Regex::new(r"^\d{8}_\d{6}__My_Set_$").unwrap();
        assert!(re.is_match(&new_snapshot_id("My Set!")));
    }

    #[test]
    fn test_ids_sort_by_time() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        assert!(snapshot_id_at("zzz", &earlier) < snapshot_id_at("aaa", &later));
    }
}
