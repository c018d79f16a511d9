use super::Participant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RewardTier {
    TravelKit,
    CarbonOffset,
    TreePlanting,
    WildlifeExperience,
}

impl RewardTier {
    pub const ALL: [RewardTier; 4] = [
        RewardTier::TravelKit,
        RewardTier::CarbonOffset,
        RewardTier::TreePlanting,
        RewardTier::WildlifeExperience,
    ];

    pub fn for_score(score: u32) -> Self {
        match score {
            150.. => RewardTier::WildlifeExperience,
            100..=149 => RewardTier::TreePlanting,
            50..=99 => RewardTier::CarbonOffset,
            _ => RewardTier::TravelKit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RewardTier::TravelKit => "Eco-friendly travel kit",
            RewardTier::CarbonOffset => "Carbon offset certificate",
            RewardTier::TreePlanting => "Tree planting donation",
            RewardTier::WildlifeExperience => "Wildlife conservation experience",
        }
    }

    pub fn range(self) -> &'static str {
        match self {
            RewardTier::TravelKit => "0-49 points",
            RewardTier::CarbonOffset => "50-99 points",
            RewardTier::TreePlanting => "100-149 points",
            RewardTier::WildlifeExperience => "150+ points",
        }
    }
}

/// Highest score first; equal scores keep their seating order.
pub fn standings(participants: &[Participant]) -> Vec<&Participant> {
    let mut ranked = participants.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

pub fn winner_index(participants: &[Participant]) -> Option<usize> {
    let mut order = (0..participants.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| participants[b].score.cmp(&participants[a].score));
    order.first().copied()
}
