use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

/// Installation scenario a product can be checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    BathroomFloor,
    ShowerFloor,
    ShowerWall,
    FireplaceSurround,
    RadiantHeat,
    OutdoorPatio,
    PoolDeck,
    KitchenBacksplash,
    CommercialHeavyFloor,
    LaundryRoomFloor,
    BasementFloor,
    SteamShowerEnclosure,
    OutdoorKitchenCounter,
    GarageWorkshopFloor,
    DrivewayPaver,
    StairTread,
    CommercialKitchenFloor,
    PoolInterior,
    ExteriorWallCladding,
}

impl UseCase {
    pub const ALL: [UseCase; 19] = [
        Self::BathroomFloor,
        Self::ShowerFloor,
        Self::ShowerWall,
        Self::FireplaceSurround,
        Self::RadiantHeat,
        Self::OutdoorPatio,
        Self::PoolDeck,
        Self::KitchenBacksplash,
        Self::CommercialHeavyFloor,
        Self::LaundryRoomFloor,
        Self::BasementFloor,
        Self::SteamShowerEnclosure,
        Self::OutdoorKitchenCounter,
        Self::GarageWorkshopFloor,
        Self::DrivewayPaver,
        Self::StairTread,
        Self::CommercialKitchenFloor,
        Self::PoolInterior,
        Self::ExteriorWallCladding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BathroomFloor => "bathroom_floor",
            Self::ShowerFloor => "shower_floor",
            Self::ShowerWall => "shower_wall",
            Self::FireplaceSurround => "fireplace_surround",
            Self::RadiantHeat => "radiant_heat",
            Self::OutdoorPatio => "outdoor_patio",
            Self::PoolDeck => "pool_deck",
            Self::KitchenBacksplash => "kitchen_backsplash",
            Self::CommercialHeavyFloor => "commercial_heavy_floor",
            Self::LaundryRoomFloor => "laundry_room_floor",
            Self::BasementFloor => "basement_floor",
            Self::SteamShowerEnclosure => "steam_shower_enclosure",
            Self::OutdoorKitchenCounter => "outdoor_kitchen_counter",
            Self::GarageWorkshopFloor => "garage_workshop_floor",
            Self::DrivewayPaver => "driveway_paver",
            Self::StairTread => "stair_tread",
            Self::CommercialKitchenFloor => "commercial_kitchen_floor",
            Self::PoolInterior => "pool_interior",
            Self::ExteriorWallCladding => "exterior_wall_cladding",
        }
    }
}

impl std::fmt::Display for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UseCase {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|use_case| use_case.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownUseCase(value.trim().to_string()))
    }
}

/// Tri-state outcome of one rule evaluation. `ok` is `None` when the
/// attribute data is inconclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageVerdict {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub use_case: UseCase,
    pub ok: Option<bool>,
    pub confidence: f64,
    pub reason: String,
    pub evidence: BTreeMap<String, String>,
}

impl UsageVerdict {
    pub fn is_unknown(&self) -> bool {
        self.ok.is_none()
    }
}
