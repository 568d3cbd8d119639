use crate::error::CrmError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Position of a lead or deal in the sales pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStage {
    New,
    Contacted,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl LeadStage {
    /// Every stage, in pipeline order
    pub const ALL: [LeadStage; 6] = [
        Self::New,
        Self::Contacted,
        Self::Proposal,
        Self::Negotiation,
        Self::Won,
        Self::Lost,
    ];

    /// Stages shown on the deals board
    pub const DEAL_STAGES: [LeadStage; 4] =
        [Self::Proposal, Self::Negotiation, Self::Won, Self::Lost];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    /// Index in pipeline order, used for sorting
    pub fn position(&self) -> u8 {
        match self {
            Self::New => 0,
            Self::Contacted => 1,
            Self::Proposal => 2,
            Self::Negotiation => 3,
            Self::Won => 4,
            Self::Lost => 5,
        }
    }

    /// Won or lost; no further pipeline movement expected
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl fmt::Display for LeadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LeadStage {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CrmError::InvalidStage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parsing() {
        assert_eq!("Won".parse::<LeadStage>().unwrap(), LeadStage::Won);
        assert_eq!("negotiation".parse::<LeadStage>().unwrap(), LeadStage::Negotiation);
        assert!("Qualified".parse::<LeadStage>().is_err());
    }

    #[test]
    fn test_stage_wire_format() {
        assert_eq!(serde_json::to_string(&LeadStage::Contacted).unwrap(), "\"Contacted\"");
        let stage: LeadStage = serde_json::from_str("\"Lost\"").unwrap();
        assert_eq!(stage, LeadStage::Lost);
        assert!(serde_json::from_str::<LeadStage>("\"Unknown\"").is_err());
    }

    #[test]
    fn test_deal_stages_are_ordered_subset() {
        let positions: Vec<u8> = LeadStage::DEAL_STAGES.iter().map(|s| s.position()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(LeadStage::Won.is_closed());
        assert!(!LeadStage::Proposal.is_closed());
    }
}
