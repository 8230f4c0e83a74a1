//! Enumeration types shared across the Gridlock workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A collectible placed on an open grid cell, picked up on arrival.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum Collectible {
    /// An ordinary pellet.
    Pellet,
    /// A high-value power pellet.
    PowerPellet,
}

impl Collectible {
    /// Score awarded when this collectible is picked up.
    pub const fn score(self) -> u32 {
        match self {
            Self::Pellet => 10,
            Self::PowerPellet => 50,
        }
    }
}

/// Why an agent's desired move was refused for one tick.
///
/// Every variant degrades to the same outcome for the agent: it keeps its
/// old position, records one wait event, and pays the stall penalty.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum DenialReason {
    /// The desired resource already has a holder this tick.
    ResourceHeld,
    /// Lost the uniform lottery among equal-priority contenders, or held a
    /// higher (worse) priority key than the winner.
    LostLottery,
    /// The move was half of an illegal in-place position swap.
    SwapCancelled,
    /// The destination is occupied by a live agent that is not moving.
    DestinationOccupied,
    /// The planner produced a non-adjacent, out-of-bounds, or wall cell.
    MalformedDesire,
}

impl core::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::ResourceHeld => "resource_held",
            Self::LostLottery => "lost_lottery",
            Self::SwapCancelled => "swap_cancelled",
            Self::DestinationOccupied => "destination_occupied",
            Self::MalformedDesire => "malformed_desire",
        };
        write!(f, "{name}")
    }
}

/// Why a simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EndReason {
    /// Every collectible has been picked up.
    CollectiblesExhausted,
    /// No live agents remain.
    Extinction,
    /// The configured tick bound was reached.
    TickLimitReached,
    /// An external stop request was honored between ticks.
    OperatorStop,
}

impl core::fmt::Display for EndReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::CollectiblesExhausted => "collectibles_exhausted",
            Self::Extinction => "extinction",
            Self::TickLimitReached => "tick_limit_reached",
            Self::OperatorStop => "operator_stop",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collectible_scores_match_the_classic_values() {
        assert_eq!(Collectible::Pellet.score(), 10);
        assert_eq!(Collectible::PowerPellet.score(), 50);
    }

    #[test]
    fn denial_reasons_display_as_snake_case() {
        assert_eq!(DenialReason::ResourceHeld.to_string(), "resource_held");
        assert_eq!(DenialReason::SwapCancelled.to_string(), "swap_cancelled");
        assert_eq!(
            DenialReason::MalformedDesire.to_string(),
            "malformed_desire"
        );
    }

    #[test]
    fn end_reason_serializes_as_variant_name() {
        let json = serde_json::to_string(&EndReason::CollectiblesExhausted).ok();
        assert_eq!(json.as_deref(), Some("\"CollectiblesExhausted\""));
    }
}
