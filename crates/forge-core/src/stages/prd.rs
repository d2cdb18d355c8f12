use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrdSectionKind {
    Overview,
    Requirements,
    UserStories,
    FeaturePrioritization,
    AcceptanceCriteria,
}

impl PrdSectionKind {
    pub fn all() -> &'static [PrdSectionKind] {
        &[
            PrdSectionKind::Overview,
            PrdSectionKind::Requirements,
            PrdSectionKind::UserStories,
            PrdSectionKind::FeaturePrioritization,
            PrdSectionKind::AcceptanceCriteria,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrdSectionKind::Overview => "overview",
            PrdSectionKind::Requirements => "requirements",
            PrdSectionKind::UserStories => "user_stories",
            PrdSectionKind::FeaturePrioritization => "feature_prioritization",
            PrdSectionKind::AcceptanceCriteria => "acceptance_criteria",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrdSection {
    pub kind: PrdSectionKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Requirements and features
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Functional,
    NonFunctional,
}

/// MoSCoW prioritization, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Moscow {
    Must,
    Should,
    Could,
    Wont,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub description: String,
    pub kind: RequirementKind,
    pub priority: Moscow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub priority: Moscow,
    /// Relative business value, 1-10.
    #[serde(default)]
    pub value: u32,
    /// Relative effort, 1-10.
    #[serde(default)]
    pub effort: u32,
}

// ---------------------------------------------------------------------------
// User stories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: String,
    pub as_a: String,
    pub i_want: String,
    #[serde(default)]
    pub so_that: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    /// Story points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub fixed_scope: bool,
}

/// INVEST checklist, computed for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestCriteria {
    pub independent: bool,
    pub negotiable: bool,
    pub valuable: bool,
    pub estimable: bool,
    pub small: bool,
    pub testable: bool,
}

impl InvestCriteria {
    pub fn satisfied_count(&self) -> usize {
        [
            self.independent,
            self.negotiable,
            self.valuable,
            self.estimable,
            self.small,
            self.testable,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    pub fn all(&self) -> bool {
        self.satisfied_count() == 6
    }
}

const SMALL_STORY_POINTS: u32 = 8;

impl UserStory {
    pub fn invest(&self) -> InvestCriteria {
        InvestCriteria {
            independent: self.depends_on.is_empty(),
            negotiable: !self.fixed_scope,
            valuable: !self.so_that.trim().is_empty(),
            estimable: self.estimate.is_some(),
            small: self.estimate.is_some_and(|p| p <= SMALL_STORY_POINTS),
            testable: !self.acceptance_criteria.is_empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// PrdDocument
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrdDocument {
    #[serde(default = "default_sections")]
    pub sections: Vec<PrdSection>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub user_stories: Vec<UserStory>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

fn default_sections() -> Vec<PrdSection> {
    PrdSectionKind::all()
        .iter()
        .map(|&kind| PrdSection {
            kind,
            content: String::new(),
            completed: false,
        })
        .collect()
}

impl Default for PrdDocument {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            requirements: Vec::new(),
            user_stories: Vec::new(),
            features: Vec::new(),
        }
    }
}

impl PrdDocument {
    pub fn section(&self, kind: PrdSectionKind) -> Option<&PrdSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn is_section_complete(&self, kind: PrdSectionKind) -> bool {
        self.section(kind).map(|s| s.completed).unwrap_or(false)
    }

    /// A section may be worked on only once every earlier section is complete.
    pub fn can_proceed_to(&self, kind: PrdSectionKind) -> bool {
        PrdSectionKind::all()
            .iter()
            .take_while(|&&k| k != kind)
            .all(|&k| self.is_section_complete(k))
    }

    /// First incomplete section in document order.
    pub fn next_section(&self) -> Option<PrdSectionKind> {
        PrdSectionKind::all()
            .iter()
            .copied()
            .find(|&k| !self.is_section_complete(k))
    }

    pub fn complete_section(&mut self, kind: PrdSectionKind, content: impl Into<String>) -> bool {
        if !self.can_proceed_to(kind) {
            return false;
        }
        let content = content.into();
        match self.sections.iter_mut().find(|s| s.kind == kind) {
            Some(section) => {
                section.content = content;
                section.completed = true;
            }
            None => {
                self.sections.push(PrdSection {
                    kind,
                    content,
                    completed: true,
                });
                self.sections.sort_by_key(|s| s.kind);
            }
        }
        true
    }

    /// Features ordered by MoSCoW, then by value-to-effort ratio.
    pub fn prioritized_features(&self) -> Vec<&Feature> {
        let mut features: Vec<&Feature> = self.features.iter().collect();
        features.sort_by(|a, b| {
            a.priority.cmp(&b.priority).then_with(|| {
                let ra = a.value as f64 / a.effort.max(1) as f64;
                let rb = b.value as f64 / b.effort.max(1) as f64;
                rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        features
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing: Vec<&'static str> = PrdSectionKind::all()
            .iter()
            .filter(|&&k| !self.is_section_complete(k))
            .map(|k| k.as_str())
            .collect();
        if self.requirements.is_empty() {
            missing.push("requirements[]");
        }
        if self.user_stories.is_empty() {
            missing.push("userStories[]");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> UserStory {
        UserStory {
            id: "US-1".to_string(),
            as_a: "prompt engineer".to_string(),
            i_want: "to version prompts".to_string(),
            so_that: "I can roll back regressions".to_string(),
            acceptance_criteria: vec!["history shows previous versions".to_string()],
            estimate: Some(5),
            depends_on: vec![],
            fixed_scope: false,
        }
    }

    #[test]
    fn invest_all_satisfied() {
        let criteria = story().invest();
        assert!(criteria.all());
        assert_eq!(criteria.satisfied_count(), 6);
    }

    #[test]
    fn invest_flags_each_gap() {
        let mut s = story();
        s.depends_on.push("US-0".to_string());
        s.estimate = Some(13);
        s.acceptance_criteria.clear();
        let c = s.invest();
        assert!(!c.independent);
        assert!(c.estimable);
        assert!(!c.small);
        assert!(!c.testable);
        assert_eq!(c.satisfied_count(), 3);

        let mut s = story();
        s.estimate = None;
        s.fixed_scope = true;
        s.so_that = " ".to_string();
        let c = s.invest();
        assert!(!c.estimable && !c.small && !c.negotiable && !c.valuable);
    }

    #[test]
    fn sections_gate_in_order() {
        let mut doc = PrdDocument::default();
        assert!(doc.can_proceed_to(PrdSectionKind::Overview));
        assert!(!doc.can_proceed_to(PrdSectionKind::UserStories));
        assert!(!doc.complete_section(PrdSectionKind::Requirements, "R"));

        assert!(doc.complete_section(PrdSectionKind::Overview, "O"));
        assert!(doc.can_proceed_to(PrdSectionKind::Requirements));
        assert!(!doc.can_proceed_to(PrdSectionKind::UserStories));
        assert_eq!(doc.next_section(), Some(PrdSectionKind::Requirements));
    }

    #[test]
    fn complete_document() {
        let mut doc = PrdDocument::default();
        for &kind in PrdSectionKind::all() {
            assert!(doc.complete_section(kind, kind.as_str()));
        }
        assert_eq!(doc.missing_required(), vec!["requirements[]", "userStories[]"]);
        doc.requirements.push(Requirement {
            id: "FR-1".to_string(),
            description: "Store prompts".to_string(),
            kind: RequirementKind::Functional,
            priority: Moscow::Must,
        });
        doc.user_stories.push(story());
        assert!(doc.missing_required().is_empty());
        assert_eq!(doc.next_section(), None);
    }

    #[test]
    fn features_sorted_by_moscow_then_ratio() {
        let doc = PrdDocument {
            features: vec![
                Feature {
                    name: "export".to_string(),
                    description: String::new(),
                    priority: Moscow::Should,
                    value: 9,
                    effort: 1,
                },
                Feature {
                    name: "editor".to_string(),
                    description: String::new(),
                    priority: Moscow::Must,
                    value: 4,
                    effort: 4,
                },
                Feature {
                    name: "auth".to_string(),
                    description: String::new(),
                    priority: Moscow::Must,
                    value: 8,
                    effort: 2,
                },
            ],
            ..Default::default()
        };
        let names: Vec<_> = doc.prioritized_features().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["auth", "editor", "export"]);
    }

    #[test]
    fn missing_sections_default_on_deserialize() {
        let doc: PrdDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.sections.len(), 5);
        assert!(!doc.is_section_complete(PrdSectionKind::Overview));
    }
}
