use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJourney {
    pub persona: String,
    pub goal: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wireframe {
    pub screen: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub components: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub props: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WcagLevel {
    A,
    AA,
    AAA,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityItem {
    /// WCAG success criterion, e.g. "1.4.3".
    pub criterion: String,
    #[serde(default)]
    pub description: String,
    pub level: WcagLevel,
    #[serde(default)]
    pub satisfied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UxRequirements {
    #[serde(default)]
    pub user_journeys: Vec<UserJourney>,
    #[serde(default)]
    pub wireframes: Vec<Wireframe>,
    #[serde(default)]
    pub component_specs: Vec<ComponentSpec>,
    #[serde(default)]
    pub accessibility: Vec<AccessibilityItem>,
}

impl UxRequirements {
    /// Percentage of satisfied checklist items, `None` for an empty checklist.
    pub fn accessibility_score(&self) -> Option<u32> {
        if self.accessibility.is_empty() {
            return None;
        }
        let satisfied = self.accessibility.iter().filter(|i| i.satisfied).count();
        Some((satisfied * 100 / self.accessibility.len()) as u32)
    }

    pub fn wcag_aa_compliant(&self) -> bool {
        self.accessibility
            .iter()
            .filter(|i| i.level <= WcagLevel::AA)
            .all(|i| i.satisfied)
    }

    pub fn unsatisfied(&self, max_level: WcagLevel) -> Vec<&AccessibilityItem> {
        self.accessibility
            .iter()
            .filter(|i| i.level <= max_level && !i.satisfied)
            .collect()
    }

    /// Wireframes referencing a component that has no spec.
    pub fn unspecified_components(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .wireframes
            .iter()
            .flat_map(|w| w.components.iter())
            .map(|c| c.as_str())
            .filter(|c| !self.component_specs.iter().any(|s| s.name == *c))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.user_journeys.is_empty() {
            missing.push("userJourneys[]");
        }
        if self.wireframes.is_empty() {
            missing.push("wireframes[]");
        }
        if self.accessibility.is_empty() {
            missing.push("accessibility[]");
        }
        missing
    }
}
