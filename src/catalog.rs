//! Data category catalog and brand-specific display labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Presentation brand, supplied externally through configuration.
///
/// Affects display labels only, never category identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    #[default]
    Suite,
    Builder,
}

impl Brand {
    pub fn name(&self) -> &'static str {
        match self {
            Brand::Suite => "suite",
            Brand::Builder => "builder",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Brand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suite" => Ok(Brand::Suite),
            "builder" => Ok(Brand::Builder),
            other => Err(format!("unknown brand '{other}' (expected suite or builder)")),
        }
    }
}

/// A named subset of workspace data that can be exported independently.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    /// Stable identifier used in request payloads.
    pub key: &'static str,
    pub suite_label: &'static str,
    pub builder_label: &'static str,
}

impl Category {
    pub fn label(&self, brand: Brand) -> &'static str {
        match brand {
            Brand::Suite => self.suite_label,
            Brand::Builder => self.builder_label,
        }
    }
}

/// Exportable data categories. Declaration order is the display order.
pub const CATEGORIES: &[Category] = &[
    Category {
        key: "agentflow",
        suite_label: "Flow Agents",
        builder_label: "Agentflows",
    },
    Category {
        key: "agentflowv2",
        suite_label: "Flow Agents V2",
        builder_label: "Agentflows V2",
    },
    Category {
        key: "assistantCustom",
        suite_label: "Assistants Custom",
        builder_label: "Assistants Custom",
    },
    Category {
        key: "assistantOpenAI",
        suite_label: "Assistants OpenAI",
        builder_label: "Assistants OpenAI",
    },
    Category {
        key: "assistantAzure",
        suite_label: "Assistants Azure",
        builder_label: "Assistants Azure",
    },
    Category {
        key: "chatflow",
        suite_label: "Assist Flows",
        builder_label: "Chatflows",
    },
    Category {
        key: "chat_message",
        suite_label: "Chat Messages",
        builder_label: "Chat Messages",
    },
    Category {
        key: "chat_feedback",
        suite_label: "Chat Feedbacks",
        builder_label: "Chat Feedbacks",
    },
    Category {
        key: "custom_template",
        suite_label: "Custom Templates",
        builder_label: "Custom Templates",
    },
    Category {
        key: "document_store",
        suite_label: "Knowledge Stores",
        builder_label: "Document Stores",
    },
    Category {
        key: "execution",
        suite_label: "Executions",
        builder_label: "Executions",
    },
    Category {
        key: "tool",
        suite_label: "Tools",
        builder_label: "Tools",
    },
    Category {
        key: "variable",
        suite_label: "Variables",
        builder_label: "Variables",
    },
];

/// Display labels for a brand, in catalog declaration order.
pub fn labels_for(brand: Brand) -> Vec<&'static str> {
    CATEGORIES.iter().map(|c| c.label(brand)).collect()
}

/// Map a display label back to its category key under a brand.
///
/// Unknown labels yield `None`; callers drop them from the payload rather
/// than failing the whole request over a stale selection.
pub fn key_for_label(label: &str, brand: Brand) -> Option<&'static str> {
    CATEGORIES.iter().find(|c| c.label(brand) == label).map(|c| c.key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels_unique_within_each_brand() {
        for brand in [Brand::Suite, Brand::Builder] {
            let labels = labels_for(brand);
            let unique: HashSet<_> = labels.iter().collect();
            assert_eq!(unique.len(), labels.len(), "duplicate label under {brand}");
        }
    }

    #[test]
    fn test_one_label_per_brand_per_category() {
        for category in CATEGORIES {
            assert!(!category.label(Brand::Suite).is_empty());
            assert!(!category.label(Brand::Builder).is_empty());
        }
    }

    #[test]
    fn test_labels_follow_declaration_order() {
        let labels = labels_for(Brand::Builder);
        assert_eq!(labels.first(), Some(&"Agentflows"));
        assert_eq!(labels.last(), Some(&"Variables"));
        assert_eq!(labels.len(), CATEGORIES.len());
    }

    #[test]
    fn test_key_for_label_resolves_per_brand() {
        assert_eq!(key_for_label("Chatflows", Brand::Builder), Some("chatflow"));
        assert_eq!(key_for_label("Assist Flows", Brand::Suite), Some("chatflow"));
        assert_eq!(key_for_label("Tools", Brand::Suite), Some("tool"));
    }

    #[test]
    fn test_key_for_label_misses_cross_brand_labels() {
        // A label that only exists under the other brand resolves to nothing.
        assert_eq!(key_for_label("Assist Flows", Brand::Builder), None);
        assert_eq!(key_for_label("Chatflows", Brand::Suite), None);
        assert_eq!(key_for_label("Nonsense", Brand::Builder), None);
    }

    #[test]
    fn test_brand_from_str() {
        assert_eq!("suite".parse::<Brand>().unwrap(), Brand::Suite);
        assert_eq!("builder".parse::<Brand>().unwrap(), Brand::Builder);
        assert!("neither".parse::<Brand>().is_err());
    }
}
