use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::utils::constants::{AFFILIATION_OWNER, AFFILIATION_PUBLISHER, WMO_AGENT_SLUG};

/// An organization or person that operates, owns or funds stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub label: String,
    pub slug: String,
    pub sector_type: String,
    pub url: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
}

impl Agent {
    pub fn is_wmo(&self) -> bool {
        self.slug == WMO_AGENT_SLUG
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationKind {
    Creator,
    Publisher,
    Contributor,
}

impl AffiliationKind {
    pub fn classify(affiliation_type: &str) -> Self {
        if affiliation_type.eq_ignore_ascii_case(AFFILIATION_OWNER) {
            AffiliationKind::Creator
        } else if affiliation_type.eq_ignore_ascii_case(AFFILIATION_PUBLISHER) {
            AffiliationKind::Publisher
        } else {
            AffiliationKind::Contributor
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentAffiliation {
    /// Raw relationship type, e.g. "owner", "publisher", "sponsor".
    pub affiliation_type: String,
    pub role: String,
    pub agent: Arc<Agent>,
    /// Identifier of the station in the agent's own system.
    pub foreign_name: Option<String>,
    pub foreign_url: Option<String>,
}

impl AgentAffiliation {
    pub fn kind(&self) -> AffiliationKind {
        AffiliationKind::classify(&self.affiliation_type)
    }

    pub fn foreign_url(&self) -> Option<&str> {
        self.foreign_url.as_deref().filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_affiliation_types() {
        assert_eq!(AffiliationKind::classify("owner"), AffiliationKind::Creator);
        assert_eq!(AffiliationKind::classify("Owner"), AffiliationKind::Creator);
        assert_eq!(
            AffiliationKind::classify("PUBLISHER"),
            AffiliationKind::Publisher
        );
        assert_eq!(
            AffiliationKind::classify("sponsor"),
            AffiliationKind::Contributor
        );
        assert_eq!(
            AffiliationKind::classify("operator"),
            AffiliationKind::Contributor
        );
    }

    #[test]
    fn test_empty_foreign_url_is_absent() {
        let agent = Arc::new(Agent {
            id: 1,
            label: "World Meteorological Organization".to_string(),
            slug: "un.wmo".to_string(),
            sector_type: "government".to_string(),
            url: None,
            email: None,
            country: None,
        });
        let affiliation = AgentAffiliation {
            affiliation_type: "sponsor".to_string(),
            role: "sponsor".to_string(),
            agent,
            foreign_name: Some("42013".to_string()),
            foreign_url: Some(String::new()),
        };

        assert!(affiliation.agent.is_wmo());
        assert_eq!(affiliation.foreign_url(), None);
    }
}
