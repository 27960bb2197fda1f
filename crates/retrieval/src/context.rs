//! Rendering retrieved records into prompt context.

use triage_core::{RetrievedRecord, SourceKind, NOT_PROVIDED};

/// Records shown to the model.
pub const CONTEXT_RECORDS: usize = 3;

/// Group names that carry no routing information.
const UNUSABLE_GROUPS: [&str; 2] = [NOT_PROVIDED, "Not Applicable"];

/// `Similar <source> <n>: <text>` lines for the suggestion prompt.
pub fn suggestion_context(records: &[RetrievedRecord]) -> String {
    render(records, "Similar ")
}

/// `<source> <n>: <text>` lines for the assignment-group prompt.
pub fn assignment_context(records: &[RetrievedRecord]) -> String {
    render(records, "")
}

fn render(records: &[RetrievedRecord], prefix: &str) -> String {
    records
        .iter()
        .take(CONTEXT_RECORDS)
        .enumerate()
        .map(|(i, r)| format!("{prefix}{} {}: {}", r.source, i + 1, r.training_text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The top record's assignment group, when it is an incident that names one.
pub fn group_from_top_incident(records: &[RetrievedRecord]) -> Option<&str> {
    let top = records.first()?;
    let group = top.assignment_group.trim();
    if top.source != SourceKind::Incident
        || group.is_empty()
        || UNUSABLE_GROUPS.iter().any(|g| g.eq_ignore_ascii_case(group))
    {
        return None;
    }
    Some(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(rank: usize, source: SourceKind, text: &str, group: &str) -> RetrievedRecord {
        RetrievedRecord {
            rank,
            id: format!("r{rank}"),
            similarity_score: 0.9,
            source,
            training_text: text.into(),
            assignment_group: group.into(),
            configuration_item: NOT_PROVIDED.into(),
            category: NOT_PROVIDED.into(),
        }
    }

    #[test]
    fn renders_top_three_only() {
        let records = vec![
            rec(1, SourceKind::Incident, "vpn reset", "Network"),
            rec(2, SourceKind::KbArticle, "kb steps", "Network"),
            rec(3, SourceKind::Incident, "third", "Network"),
            rec(4, SourceKind::Incident, "fourth", "Network"),
        ];
        assert_eq!(
            suggestion_context(&records),
            concat!(
                "Similar incident 1: vpn reset\n",
                "Similar kb_article 2: kb steps\n",
                "Similar incident 3: third"
            )
        );
        assert_eq!(
            assignment_context(&records[..1]),
            "incident 1: vpn reset"
        );
        assert_eq!(suggestion_context(&[]), "");
    }

    #[test]
    fn top_incident_group() {
        let good = vec![rec(1, SourceKind::Incident, "t", "Network Support")];
        assert_eq!(group_from_top_incident(&good), Some("Network Support"));

        let kb = vec![rec(1, SourceKind::KbArticle, "t", "Network Support")];
        assert_eq!(group_from_top_incident(&kb), None);

        let na = vec![rec(1, SourceKind::Incident, "t", "Not Applicable")];
        assert_eq!(group_from_top_incident(&na), None);

        let missing = vec![rec(1, SourceKind::Incident, "t", NOT_PROVIDED)];
        assert_eq!(group_from_top_incident(&missing), None);
        assert_eq!(group_from_top_incident(&[]), None);
    }
}
