use log::debug;
use std::collections::HashSet;

use crate::scan::SYSTEM_MARKER;

/// Whether a raw data column belongs to the survey or to the survey platform.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnOrigin {
    Survey,
    System,
}

impl ColumnOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnOrigin::Survey => "Survey",
            ColumnOrigin::System => "System",
        }
    }
}

/// Classifies a raw data header the way the column question map formula does:
/// a header is a system column when its first character changes when
/// upper-cased (survey questions are labelled `Q1`, `S2r3`, ... while the
/// platform uses `record`, `uuid`, ...).
pub fn column_origin(header: &str) -> ColumnOrigin {
    match header.chars().next() {
        Some(c) => {
            let upper: String = c.to_uppercase().collect();
            if upper == c.to_string() {
                ColumnOrigin::Survey
            } else {
                ColumnOrigin::System
            }
        }
        None => ColumnOrigin::Survey,
    }
}

/// The question marker of a raw data header: the header cut before its first
/// `_`, else before its first `none`, else before its first `r`, else the
/// whole header. System columns all map to the system marker.
///
/// Matching is case-sensitive and the header is not trimmed, so that this
/// agrees with the spreadsheet formula on every input.
pub fn question_marker(header: &str) -> String {
    if column_origin(header) == ColumnOrigin::System {
        return SYSTEM_MARKER.to_string();
    }
    let cut = header
        .find('_')
        .or_else(|| header.find("none"))
        .or_else(|| header.find('r'));
    match cut {
        Some(idx) => header[..idx].to_string(),
        None => header.to_string(),
    }
}

/// The distinct question markers of a list of headers, in first-seen order.
/// Empty markers and the system marker are left out.
pub fn unique_markers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut res: Vec<String> = Vec::new();
    for h in headers {
        let m = question_marker(h);
        if m.is_empty() || m == SYSTEM_MARKER {
            continue;
        }
        if seen.insert(m.clone()) {
            res.push(m);
        }
    }
    debug!("unique_markers: {:?}", res);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_follows_first_character() {
        assert_eq!(column_origin("Q1"), ColumnOrigin::Survey);
        assert_eq!(column_origin("record"), ColumnOrigin::System);
        assert_eq!(column_origin("1st"), ColumnOrigin::Survey);
        assert_eq!(column_origin("_x"), ColumnOrigin::Survey);
        assert_eq!(column_origin(""), ColumnOrigin::Survey);
        assert_eq!(ColumnOrigin::System.as_str(), "System");
    }

    #[test]
    fn truncation_order() {
        assert_eq!(question_marker("Q1_2"), "Q1");
        assert_eq!(question_marker("S2r3"), "S2");
        assert_eq!(question_marker("Q4none"), "Q4");
        // "_" wins over an earlier "r".
        assert_eq!(question_marker("Qr1_2"), "Qr1");
        // "none" wins over an earlier "r".
        assert_eq!(question_marker("Qr5none"), "Qr5");
        assert_eq!(question_marker("Q10"), "Q10");
        assert_eq!(question_marker("uuid"), "System");
        // Case-sensitive: an uppercase R is kept.
        assert_eq!(question_marker("QR1"), "QR1");
        assert_eq!(question_marker("_abc"), "");
    }

    #[test]
    fn unique_in_first_seen_order() {
        let headers = [
            "record", "uuid", "S1", "S2r1", "S2r2", "Q1_1", "Q1_2", "_x", "Q3", "S1",
        ];
        assert_eq!(
            unique_markers(headers.iter().copied()),
            vec!["S1", "S2", "Q1", "Q3"]
        );
    }
}
