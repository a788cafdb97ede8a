use std::fmt;

use crate::draw::Draw;

/// Convert a group index (0-based) to a letter label: A..Z, then AA, AB, ...
pub fn group_label(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;
    loop {
        letters.push(char::from(b'A' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Korean text listing of a draw.
pub struct TextReport<'a>(pub &'a Draw);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let draw = self.0;
        writeln!(f, "=== 조 편성 결과 ===")?;
        for (i, group) in draw.groups.iter().enumerate() {
            writeln!(f, "{}조: {} 명", group_label(i), group.len())?;
            for member in &group.members {
                writeln!(f, "  - {}", member)?;
            }
        }

        let requested = draw.honored.len() + draw.deferred.len();
        if requested > 0 {
            writeln!(f, "\n선호 짝 반영: {} / {}", draw.honored.len(), requested)?;
            for pref in &draw.deferred {
                writeln!(f, "  ✗ 함께 배정하지 못함: {} & {}", pref.0, pref.1)?;
            }
        }

        if !draw.unplaced.is_empty() {
            writeln!(
                f,
                "\n⚠️ 자리가 없어 배정되지 못한 인원: {}",
                draw.unplaced.join(", ")
            )?;
        }

        writeln!(
            f,
            "\n조당 이상적인 남학생 수 (참고): {}",
            draw.ideal_males_per_group
        )?;
        writeln!(f, "합계: {} 조", draw.groups.len())
    }
}

pub fn render_text(draw: &Draw) -> String {
    TextReport(draw).to_string()
}

pub fn render_json(draw: &Draw) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(draw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{assign_groups, ParticipantId, Preference};

    fn ids(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_group_labels() {
        assert_eq!(group_label(0), "A");
        assert_eq!(group_label(25), "Z");
        assert_eq!(group_label(26), "AA");
        assert_eq!(group_label(27), "AB");
        assert_eq!(group_label(701), "ZZ");
        assert_eq!(group_label(702), "AAA");
    }

    #[test]
    fn test_render_text_lists_groups() {
        let males = ids(&["M1", "M2"]);
        let females = ids(&["F1", "F2"]);
        let prefs = vec![Preference::new("M1", "F1")];
        let draw = assign_groups(&males, &females, &prefs, 2).unwrap();

        let text = render_text(&draw);
        assert!(text.starts_with("=== 조 편성 결과 ===\nA조: 2 명\n  - M1\n  - F1\n"));
        assert!(text.contains("B조: 2 명"));
        assert!(text.contains("선호 짝 반영: 1 / 1"));
        assert!(text.contains("조당 이상적인 남학생 수 (참고): 1"));
        assert!(text.ends_with("합계: 2 조\n"));
        assert!(!text.contains("배정되지 못한"));
    }

    #[test]
    fn test_text_report_display() {
        let draw = assign_groups(&ids(&["M1", "M2"]), &[], &[], 1).unwrap();
        let shown = format!("{}", TextReport(&draw));
        assert_eq!(shown, render_text(&draw));
        assert!(shown.contains("A조: 1 명"));
        assert!(!shown.contains("선호 짝 반영"));
    }

    #[test]
    fn test_render_text_reports_shortfalls() {
        let males = ids(&["M1"]);
        let females = ids(&["F1"]);
        let prefs = vec![Preference::new("M1", "F1")];
        let draw = assign_groups(&males, &females, &prefs, 1).unwrap();

        let text = render_text(&draw);
        assert!(text.contains("선호 짝 반영: 0 / 1"));
        assert!(text.contains("함께 배정하지 못함: M1 & F1"));

        let draw = assign_groups(&ids(&["A", "B"]), &[], &[Preference::new("A", "X")], 2).unwrap();
        assert!(render_text(&draw).contains("배정되지 못한 인원: B"));
    }

    #[test]
    fn test_render_json() {
        let draw = assign_groups(&ids(&["M1"]), &ids(&["F1"]), &[Preference::new("M1", "F1")], 2)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&render_json(&draw).unwrap()).unwrap();

        assert_eq!(value["groups"][0]["members"], serde_json::json!(["M1", "F1"]));
        assert_eq!(value["honored"], serde_json::json!([["M1", "F1"]]));
        assert_eq!(value["ideal_males_per_group"], 1);
        assert!(value["groups"][0].get("capacity").is_none());
    }
}
