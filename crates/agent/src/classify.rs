use triage_core::IssueCategory;

/// Checked in order; the first keyword found in the lowercased query wins.
const KEYWORDS: &[(&str, IssueCategory)] = &[
    ("vpn", IssueCategory::Network),
    ("connectivity", IssueCategory::Network),
    ("sso", IssueCategory::Network),
    ("login", IssueCategory::Network),
    ("auth", IssueCategory::Network),
    ("internet", IssueCategory::Network),
    ("wifi", IssueCategory::Network),
    ("crm", IssueCategory::Crm),
    ("profile", IssueCategory::Crm),
    ("order", IssueCategory::OrderMgmt),
    ("fallout", IssueCategory::OrderMgmt),
    ("billing", IssueCategory::Billing),
    ("invoice", IssueCategory::Billing),
];

/// Substring keyword match, so "authorization" counts as `auth`.
pub fn classify_issue_type(query: &str) -> IssueCategory {
    let text = query.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or(IssueCategory::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_categories() {
        assert_eq!(classify_issue_type("VPN not connecting"), IssueCategory::Network);
        assert_eq!(classify_issue_type("WiFi drops in building 4"), IssueCategory::Network);
        assert_eq!(classify_issue_type("Customer profile mismatch"), IssueCategory::Crm);
        assert_eq!(classify_issue_type("Order fallout in OSM"), IssueCategory::OrderMgmt);
        assert_eq!(classify_issue_type("Please create invoice for ACME"), IssueCategory::Billing);
        assert_eq!(classify_issue_type("Printer jammed"), IssueCategory::Unknown);
    }

    #[test]
    fn earlier_keywords_win() {
        // "login" precedes "crm" in the table.
        assert_eq!(classify_issue_type("CRM login fails"), IssueCategory::Network);
        // "profile" precedes "order".
        assert_eq!(classify_issue_type("order stuck on profile update"), IssueCategory::Crm);
    }
}
