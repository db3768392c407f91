//! Query types.

use serde::{Deserialize, Serialize};

use vetgraph_store::Template;

/// Coarse purpose of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Usage,
    SideEffects,
    Contraindications,
    Interactions,
    Storage,
    /// Default when no pattern matches.
    General,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::Usage,
        Intent::SideEffects,
        Intent::Contraindications,
        Intent::Interactions,
        Intent::Storage,
        Intent::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::SideEffects => "side_effects",
            Self::Contraindications => "contraindications",
            Self::Interactions => "interactions",
            Self::Storage => "storage",
            Self::General => "general",
        }
    }

    /// Read template answering this intent.
    pub fn template(&self) -> Template {
        match self {
            Self::Usage => Template::Usage,
            Self::SideEffects => Template::SideEffects,
            Self::Contraindications => Template::Contraindications,
            Self::Interactions => Template::Interactions,
            Self::Storage => Template::Storage,
            Self::General => Template::General,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mentions found in a question, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub drugs: Vec<String>,
    pub animals: Vec<String>,
    pub symptoms: Vec<String>,
}

impl Entities {
    pub fn with_drug(name: &str) -> Self {
        Self {
            drugs: vec![name.to_string()],
            ..Default::default()
        }
    }

    /// The drug a question is about. Further mentions are kept but unused.
    pub fn primary_drug(&self) -> Option<&str> {
        self.drugs.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub entities: Entities,
}

/// A fully traced answer, for callers that want more than the text.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub intent: Intent,
    pub entities: Entities,
    pub found: bool,
    pub response: String,
}
