use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecipient {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub country: String,
    pub investment_goals: String,
    pub risk_tolerance: String,
    pub preferred_industry: String,
}

impl UserPreferences {
    /// Bullet list used in the welcome email prompt. Blank fields render as `N/A`.
    pub fn profile_lines(&self) -> String {
        let or_na = |s: &str| {
            let s = s.trim();
            if s.is_empty() {
                "N/A".to_string()
            } else {
                s.to_string()
            }
        };
        format!(
            "- Country: {}\n- Investment Goals: {}\n- Risk Tolerance: {}\n- Preferred Industry: {}",
            or_na(&self.country),
            or_na(&self.investment_goals),
            or_na(&self.risk_tolerance),
            or_na(&self.preferred_industry),
        )
    }
}
