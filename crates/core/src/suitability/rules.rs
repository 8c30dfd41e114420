use crate::domain::usage::UseCase;
use crate::suitability::cascade::{Attr, Cascade, Decision, Facts, Rule};
use crate::suitability::evidence::{
    contains_any, contains_word, extract_length_inches, extract_number,
};

const DCOF_WET_FLOOR_MIN: f64 = 0.42;
const DCOF_COMMERCIAL_KITCHEN_MIN: f64 = 0.50;
const PEI_HEAVY_TRAFFIC_MIN: f64 = 4.0;
const PEI_LIGHT_DUTY_MAX: f64 = 2.0;
const DENSE_BODY_ABSORPTION_MAX: f64 = 0.5;
const SUBMERSION_ABSORPTION_MAX: f64 = 3.0;
const DRIVEWAY_THICKNESS_MIN_IN: f64 = 1.0;
const DRIVEWAY_THICKNESS_ACCEPT_IN: f64 = 1.25;
const STAIR_NOSING_THICKNESS_MIN_IN: f64 = 0.3;

const BATHROOM_FLOOR_USE: Attr = Attr { label: "bathroom floor use", keys: &["bathroom floor use"] };
const SHOWER_SURFACE: Attr = Attr { label: "shower surface", keys: &["shower surface"] };
const FIREPLACE_SURROUND_USE: Attr =
    Attr { label: "fireplace surround use", keys: &["fireplace surround use"] };
const RADIANT_HEAT: Attr = Attr {
    label: "radiant heat compatible",
    keys: &["radiant heat compatible", "radiant heat compatibility"],
};
const PLACEMENT: Attr = Attr { label: "placement location", keys: &["placement location"] };
const WATER_RESISTANCE: Attr = Attr { label: "water resistance", keys: &["water resistance"] };
const FROST_RESISTANCE: Attr = Attr { label: "frost resistance", keys: &["frost resistance"] };
const WATER_ABSORPTION: Attr =
    Attr { label: "water absorption", keys: &["water absorption", "absorption"] };
const DCOF: Attr = Attr { label: "dcof", keys: &["dcof value", "dcof"] };
const PEI: Attr = Attr { label: "pei rating", keys: &["pei rating", "pei"] };
const THICKNESS: Attr = Attr { label: "product thickness", keys: &["product thickness", "thickness"] };
const FLOOR_RATING: Attr =
    Attr { label: "floor suitability rating", keys: &["floor suitability rating"] };
const INSTALLATION_OPTIONS: Attr =
    Attr { label: "installation options", keys: &["installation options"] };
const INSTALLATION_TYPE: Attr = Attr { label: "installation type", keys: &["installation type"] };
const MATERIAL: Attr = Attr { label: "material", keys: &["material"] };

const SOFT_MATERIALS: &[&str] = &["wood", "bamboo", "vinyl", "laminate", "cork"];
const SHOWER_WALL_NEGATIVE: &[&str] =
    &["not suitable for shower wall", "unsuitable for shower wall"];

pub(crate) fn cascade_for(use_case: UseCase) -> Cascade {
    match use_case {
        UseCase::BathroomFloor => bathroom_floor(),
        UseCase::ShowerFloor => shower_floor(),
        UseCase::ShowerWall => shower_wall(),
        UseCase::FireplaceSurround => fireplace_surround(),
        UseCase::RadiantHeat => radiant_heat(),
        UseCase::OutdoorPatio => outdoor_patio(),
        UseCase::PoolDeck => pool_deck(),
        UseCase::KitchenBacksplash => kitchen_backsplash(),
        UseCase::CommercialHeavyFloor => commercial_heavy_floor(),
        UseCase::LaundryRoomFloor => laundry_room_floor(),
        UseCase::BasementFloor => basement_floor(),
        UseCase::SteamShowerEnclosure => steam_shower_enclosure(),
        UseCase::OutdoorKitchenCounter => outdoor_kitchen_counter(),
        UseCase::GarageWorkshopFloor => garage_workshop_floor(),
        UseCase::DrivewayPaver => driveway_paver(),
        UseCase::StairTread => stair_tread(),
        UseCase::CommercialKitchenFloor => commercial_kitchen_floor(),
        UseCase::PoolInterior => pool_interior(),
        UseCase::ExteriorWallCladding => exterior_wall_cladding(),
    }
}

// ---------------------------------------------------------------------------
// Shared signals
// ---------------------------------------------------------------------------

fn restricted_to(facts: &mut Facts<'_>, phrase: &str) -> bool {
    let placement = facts.mentions(&PLACEMENT, &[phrase]);
    let options = facts.mentions(&INSTALLATION_OPTIONS, &[phrase]);
    let kind = facts.mentions(&INSTALLATION_TYPE, &[phrase]);
    placement || options || kind
}

fn installation_mentions(facts: &mut Facts<'_>, keywords: &[&str]) -> bool {
    let options = facts.mentions(&INSTALLATION_OPTIONS, keywords);
    let kind = facts.mentions(&INSTALLATION_TYPE, keywords);
    options || kind
}

fn is_outdoor(facts: &mut Facts<'_>) -> bool {
    facts.mentions(&PLACEMENT, &["outdoor", "exterior"])
}

fn water_negative(facts: &mut Facts<'_>) -> bool {
    facts.mentions(
        &WATER_RESISTANCE,
        &["not water", "not waterproof", "not resistant", "not suitable"],
    )
}

fn water_positive(facts: &mut Facts<'_>) -> bool {
    !water_negative(facts)
        && facts.mentions(
            &WATER_RESISTANCE,
            &["water resistant", "water-resistant", "waterproof", "impervious"],
        )
}

fn frost_negative(facts: &mut Facts<'_>) -> bool {
    facts.mentions(&FROST_RESISTANCE, &["not frost", "not resistant", "not suitable"])
}

fn frost_positive(facts: &mut Facts<'_>) -> bool {
    if frost_negative(facts) {
        return false;
    }
    facts.text(&FROST_RESISTANCE).is_some_and(|value| {
        contains_any(value, &["frost resistant", "frost-resistant", "frost proof", "freeze"])
            || contains_word(value, "yes")
    })
}

fn absorption_pct(facts: &mut Facts<'_>) -> Option<f64> {
    let text = facts.text(&WATER_ABSORPTION)?;
    extract_number(text)
        .or_else(|| contains_any(text, &["impervious"]).then_some(DENSE_BODY_ABSORPTION_MAX))
}

fn dense_body(facts: &mut Facts<'_>) -> bool {
    absorption_pct(facts).is_some_and(|pct| pct <= DENSE_BODY_ABSORPTION_MAX)
}

fn thickness_inches(facts: &mut Facts<'_>) -> Option<f64> {
    extract_length_inches(facts.text(&THICKNESS)?)
}

/// "Suitable" or "yes" as a whole word, so "Unsuitable" stays out. Callers
/// check the negative phrasing first.
fn affirmative(value: &str) -> bool {
    contains_word(value, "suitable") || contains_word(value, "yes")
}

fn shower_wall_rated(facts: &mut Facts<'_>) -> bool {
    facts.mentions(&SHOWER_SURFACE, &["suitable for shower wall"])
        && !facts.mentions(&SHOWER_SURFACE, SHOWER_WALL_NEGATIVE)
}

fn commercial_rating(facts: &mut Facts<'_>) -> bool {
    facts.mentions(&FLOOR_RATING, &["commercial"])
        && !facts.mentions(&FLOOR_RATING, &["light commercial"])
}

// ---------------------------------------------------------------------------
// Shared rules
// ---------------------------------------------------------------------------

fn reject_wall_only(confidence: f64, subject: &'static str) -> Rule {
    Rule::new("wall_only", move |facts| {
        restricted_to(facts, "wall only").then(|| {
            Decision::unsuitable(
                confidence,
                format!("Product data says wall only, so it cannot be used for {subject}."),
            )
        })
    })
}

fn reject_floor_only(confidence: f64, subject: &'static str) -> Rule {
    Rule::new("floor_only", move |facts| {
        restricted_to(facts, "floor only").then(|| {
            Decision::unsuitable(
                confidence,
                format!("Product data says floor only, so it cannot be used for {subject}."),
            )
        })
    })
}

/// Explicit "indoor only" wins at `explicit`; a placement value that never
/// mentions outdoor or exterior use is rejected at `implied`.
fn reject_indoor_placement(explicit: f64, implied: f64, subject: &'static str) -> Rule {
    Rule::new("indoor_placement", move |facts| {
        if restricted_to(facts, "indoor only") {
            return Some(Decision::unsuitable(
                explicit,
                format!("Product data says indoor only, so it cannot be used for {subject}."),
            ));
        }
        let placement = facts.text(&PLACEMENT)?;
        (!contains_any(placement, &["outdoor", "exterior"])).then(|| {
            Decision::unsuitable(
                implied,
                format!(
                    "Placement location '{placement}' does not include outdoor use, which {subject} require."
                ),
            )
        })
    })
}

fn reject_water_negative(confidence: f64, subject: &'static str) -> Rule {
    Rule::new("water_negative", move |facts| {
        water_negative(facts).then(|| {
            Decision::unsuitable(
                confidence,
                format!("Water resistance data says the product is not water resistant; not for {subject}."),
            )
        })
    })
}

fn reject_frost_negative(confidence: f64, subject: &'static str) -> Rule {
    Rule::new("frost_negative", move |facts| {
        frost_negative(facts).then(|| {
            Decision::unsuitable(
                confidence,
                format!("Frost resistance data says the product is not frost resistant; not for {subject}."),
            )
        })
    })
}

fn reject_soft_material(confidence: f64, subject: &'static str) -> Rule {
    Rule::new("soft_material", move |facts| {
        let material = facts.text(&MATERIAL)?;
        contains_any(material, SOFT_MATERIALS).then(|| {
            Decision::unsuitable(
                confidence,
                format!("Material '{material}' is not recommended for {subject}."),
            )
        })
    })
}

fn missing(subject: &str, confidence: f64, what: &str) -> Decision {
    Decision::inconclusive(
        confidence,
        format!("No {what} found for {subject}. Verify with manufacturer documentation."),
    )
}

// ---------------------------------------------------------------------------
// Evaluators
//
// Where a use case has an explicit label, its negative phrasing is checked
// before the positive one. A label such as "Not Suitable for Shower Wall"
// also contains the positive phrase, so the order is deliberate.
// ---------------------------------------------------------------------------

fn bathroom_floor() -> Cascade {
    Cascade::new(
        vec![
            Rule::new("bathroom_floor_use_negative", |facts| {
                facts.mentions(&BATHROOM_FLOOR_USE, &["not suitable", "unsuitable"]).then(|| {
                    Decision::unsuitable(
                        0.95,
                        "Bathroom Floor Use says the product is not suitable for bathroom floors.",
                    )
                })
            }),
            Rule::new("bathroom_floor_use_positive", |facts| {
                let value = facts.text(&BATHROOM_FLOOR_USE)?;
                affirmative(value).then(|| {
                    Decision::suitable(0.9, "Bathroom Floor Use indicates bathroom floor use is allowed.")
                })
            }),
            Rule::new("water_or_placement_present", |facts| {
                let water = facts.has(&WATER_RESISTANCE);
                let placement = facts.has(&PLACEMENT);
                (water || placement).then(|| {
                    Decision::inconclusive(
                        0.6,
                        "No explicit Bathroom Floor Use value. The product has water resistance or placement data, but bathroom floor suitability is not guaranteed.",
                    )
                })
            }),
        ],
        |_| Decision::inconclusive(0.0, "No relevant product data found for bathroom floor usage."),
    )
}

fn shower_floor() -> Cascade {
    Cascade::new(
        vec![
            Rule::new("shower_surface_negative", |facts| {
                facts.mentions(
                    &SHOWER_SURFACE,
                    &["not suitable for shower floor", "unsuitable for shower floor"],
                ).then(|| {
                    Decision::unsuitable(
                        0.95,
                        "Shower Surface explicitly says it is not suitable for shower floors.",
                    )
                })
            }),
            Rule::new("shower_surface_positive", |facts| {
                facts.mentions(&SHOWER_SURFACE, &["suitable for shower floor"]).then(|| {
                    Decision::suitable(0.9, "Shower Surface indicates it is suitable for shower floors.")
                })
            }),
            reject_wall_only(0.9, "shower floors"),
            Rule::new("dcof_threshold", |facts| {
                let dcof = facts.number(&DCOF)?;
                Some(if dcof >= DCOF_WET_FLOOR_MIN {
                    Decision::suitable(
                        0.75,
                        format!("DCOF {dcof} meets the {DCOF_WET_FLOOR_MIN} minimum for wet floors."),
                    )
                } else {
                    Decision::unsuitable(
                        0.8,
                        format!("DCOF {dcof} is below the {DCOF_WET_FLOOR_MIN} minimum for wet floors."),
                    )
                })
            }),
        ],
        |_| {
            Decision::inconclusive(
                0.4,
                "No explicit shower floor data. Check DCOF and manufacturer guidelines before using on a shower floor.",
            )
        },
    )
}

fn shower_wall() -> Cascade {
    Cascade::new(
        vec![
            Rule::new("shower_surface_negative", |facts| {
                facts.mentions(&SHOWER_SURFACE, SHOWER_WALL_NEGATIVE).then(|| {
                    Decision::unsuitable(
                        0.95,
                        "Shower Surface explicitly says it is not suitable for shower walls.",
                    )
                })
            }),
            Rule::new("shower_surface_positive", |facts| {
                facts.mentions(&SHOWER_SURFACE, &["suitable for shower wall"]).then(|| {
                    Decision::suitable(0.9, "Shower Surface indicates it is suitable for shower walls.")
                })
            }),
            reject_floor_only(0.9, "shower walls"),
        ],
        |_| {
            Decision::inconclusive(
                0.4,
                "No explicit shower wall data found. Many tiles rated for wet walls qualify, but verify with full product data.",
            )
        },
    )
}

fn fireplace_surround() -> Cascade {
    Cascade::new(
        vec![
            Rule::new("fireplace_use_negative", |facts| {
                let value = facts.text(&FIREPLACE_SURROUND_USE)?;
                (contains_any(value, &["not suitable", "unsuitable", "not recommended"])
                    || contains_word(value, "no"))
                .then(|| {
                    Decision::unsuitable(
                        0.95,
                        "Fireplace Surround Use indicates it is not suitable around fireplaces.",
                    )
                })
            }),
            Rule::new("fireplace_use_positive", |facts| {
                let value = facts.text(&FIREPLACE_SURROUND_USE)?;
                affirmative(value).then(|| {
                    Decision::suitable(
                        0.9,
                        "Fireplace Surround Use indicates it is suitable around fireplaces.",
                    )
                })
            }),
        ],
        |_| {
            Decision::inconclusive(
                0.3,
                "No explicit fireplace surround data found. Check heat tolerance and manufacturer documentation.",
            )
        },
    )
}

fn radiant_heat() -> Cascade {
    Cascade::new(
        vec![
            Rule::new("radiant_heat_negative", |facts| {
                let value = facts.text(&RADIANT_HEAT)?;
                (contains_any(value, &["not compatible", "incompatible", "not suitable"])
                    || contains_word(value, "no"))
                .then(|| {
                    Decision::unsuitable(
                        0.95,
                        "Product data indicates it is not compatible with radiant heat.",
                    )
                })
            }),
            Rule::new("radiant_heat_positive", |facts| {
                let value = facts.text(&RADIANT_HEAT)?;
                (contains_any(value, &["compatible"]) || contains_word(value, "yes")).then(|| {
                    Decision::suitable(0.9, "Product data indicates compatibility with radiant heat.")
                })
            }),
        ],
        |_| {
            Decision::inconclusive(
                0.3,
                "No explicit radiant heat data found. Check the heating system and manufacturer guidelines.",
            )
        },
    )
}

fn outdoor_patio() -> Cascade {
    Cascade::new(
        vec![
            reject_indoor_placement(0.95, 0.9, "outdoor patios"),
            reject_wall_only(0.9, "patio floors"),
            reject_frost_negative(0.9, "outdoor patios"),
            Rule::new("outdoor_and_frost_resistant", |facts| {
                (is_outdoor(facts) && frost_positive(facts)).then(|| {
                    Decision::suitable(0.9, "Rated for outdoor placement and frost resistant.")
                })
            }),
            Rule::new("outdoor_placement", |facts| {
                is_outdoor(facts).then(|| {
                    Decision::suitable(
                        0.75,
                        "Placement location includes outdoor use; frost resistance is not stated.",
                    )
                })
            }),
            Rule::new("frost_resistant", |facts| {
                frost_positive(facts).then(|| {
                    Decision::suitable(
                        0.7,
                        "Frost resistant, which suggests outdoor suitability, but placement is not stated.",
                    )
                })
            }),
            Rule::new("dense_body", |facts| {
                dense_body(facts).then(|| {
                    Decision::suitable(
                        0.6,
                        "Water absorption of 0.5% or less indicates a dense body that tolerates outdoor exposure.",
                    )
                })
            }),
        ],
        |_| missing("outdoor patios", 0.3, "placement, frost resistance or absorption data"),
    )
}

fn pool_deck() -> Cascade {
    Cascade::new(
        vec![
            reject_indoor_placement(0.9, 0.9, "pool decks"),
            reject_water_negative(0.9, "pool decks"),
            Rule::new("dcof_threshold", |facts| {
                let dcof = facts.number(&DCOF)?;
                Some(if dcof >= DCOF_WET_FLOOR_MIN {
                    Decision::suitable(
                        0.8,
                        format!("DCOF {dcof} meets the {DCOF_WET_FLOOR_MIN} minimum for wet walkways."),
                    )
                } else {
                    Decision::unsuitable(
                        0.85,
                        format!(
                            "DCOF {dcof} is below the {DCOF_WET_FLOOR_MIN} minimum for wet walkways."
                        ),
                    )
                })
            }),
        ],
        |_| missing("pool decks", 0.3, "DCOF (slip resistance) data"),
    )
}

fn kitchen_backsplash() -> Cascade {
    Cascade::new(
        vec![
            reject_floor_only(0.9, "backsplashes"),
            Rule::new("wall_installation", |facts| {
                installation_mentions(facts, &["wall"]).then(|| {
                    Decision::suitable(0.85, "Installation options include wall installation.")
                })
            }),
            Rule::new("shower_wall_rated", |facts| {
                shower_wall_rated(facts).then(|| {
                    Decision::suitable(
                        0.75,
                        "Rated for shower walls, which covers splash zones behind a counter.",
                    )
                })
            }),
            Rule::new("wall_friendly_material", |facts| {
                let material = facts.text(&MATERIAL)?;
                contains_any(
                    material,
                    &["ceramic", "porcelain", "glass", "stone", "marble", "travertine", "slate", "granite"],
                )
                .then(|| {
                    Decision::suitable(
                        0.6,
                        format!("Material '{material}' is commonly installed as a backsplash."),
                    )
                })
            }),
        ],
        |_| missing("kitchen backsplashes", 0.3, "installation or material data"),
    )
}

fn commercial_heavy_floor() -> Cascade {
    Cascade::new(
        vec![
            reject_wall_only(0.95, "commercial floors"),
            Rule::new("commercial_rating", |facts| {
                commercial_rating(facts).then(|| {
                    Decision::suitable(0.9, "Floor suitability rating covers commercial traffic.")
                })
            }),
            Rule::new("residential_rating", |facts| {
                facts.mentions(&FLOOR_RATING, &["residential", "light"]).then(|| {
                    Decision::unsuitable(
                        0.85,
                        "Floor suitability rating is residential or light duty only.",
                    )
                })
            }),
            Rule::new("pei_threshold", |facts| {
                let pei = facts.number(&PEI)?;
                if pei >= PEI_HEAVY_TRAFFIC_MIN {
                    Some(Decision::suitable(
                        0.85,
                        format!("PEI {pei} supports heavy and commercial foot traffic."),
                    ))
                } else if pei <= PEI_LIGHT_DUTY_MAX {
                    Some(Decision::unsuitable(
                        0.85,
                        format!("PEI {pei} is rated for light duty only."),
                    ))
                } else {
                    None
                }
            }),
        ],
        |_| missing("commercial heavy-traffic floors", 0.35, "floor rating or conclusive PEI data"),
    )
}

fn laundry_room_floor() -> Cascade {
    Cascade::new(
        vec![
            reject_wall_only(0.9, "laundry room floors"),
            reject_water_negative(0.9, "laundry room floors"),
            Rule::new("bathroom_floor_negative", |facts| {
                facts.mentions(&BATHROOM_FLOOR_USE, &["not suitable", "unsuitable"]).then(|| {
                    Decision::unsuitable(
                        0.75,
                        "Not suitable for bathroom floors, so wet laundry areas are also unsuitable.",
                    )
                })
            }),
            Rule::new("bathroom_floor_positive", |facts| {
                let value = facts.text(&BATHROOM_FLOOR_USE)?;
                affirmative(value).then(|| {
                    Decision::suitable(
                        0.75,
                        "Suitable for bathroom floors, which have similar moisture exposure.",
                    )
                })
            }),
            Rule::new("water_resistant", |facts| {
                water_positive(facts)
                    .then(|| Decision::suitable(0.7, "Product is rated water resistant."))
            }),
            Rule::new("wet_floor_dcof", |facts| {
                let dcof = facts.number(&DCOF)?;
                (dcof >= DCOF_WET_FLOOR_MIN).then(|| {
                    Decision::suitable(
                        0.6,
                        format!("DCOF {dcof} meets the wet-floor minimum of {DCOF_WET_FLOOR_MIN}."),
                    )
                })
            }),
        ],
        |_| missing("laundry room floors", 0.3, "water resistance or bathroom floor data"),
    )
}

fn basement_floor() -> Cascade {
    Cascade::new(
        vec![
            reject_wall_only(0.9, "basement floors"),
            reject_water_negative(0.9, "below-grade floors"),
            reject_soft_material(0.75, "below-grade installation"),
            Rule::new("dense_body", |facts| {
                dense_body(facts).then(|| {
                    Decision::suitable(
                        0.8,
                        "Water absorption of 0.5% or less indicates a dense body suited to below-grade use.",
                    )
                })
            }),
            Rule::new("water_resistant", |facts| {
                water_positive(facts).then(|| {
                    Decision::suitable(0.75, "Product is rated water resistant for damp areas.")
                })
            }),
        ],
        |_| missing("basement floors", 0.3, "absorption, water resistance or material data"),
    )
}

fn steam_shower_enclosure() -> Cascade {
    Cascade::new(
        vec![
            Rule::new("shower_wall_negative", |facts| {
                facts.mentions(&SHOWER_SURFACE, SHOWER_WALL_NEGATIVE).then(|| {
                    Decision::unsuitable(
                        0.95,
                        "Shower Surface says it is not suitable for shower walls.",
                    )
                })
            }),
            reject_floor_only(0.9, "steam shower walls"),
            reject_water_negative(0.9, "steam showers"),
            Rule::new("high_absorption", |facts| {
                let pct = absorption_pct(facts)?;
                (pct > SUBMERSION_ABSORPTION_MAX).then(|| {
                    Decision::unsuitable(
                        0.85,
                        format!("Water absorption of {pct}% is too high for constant steam exposure."),
                    )
                })
            }),
            Rule::new("wall_dense_and_water_resistant", |facts| {
                let wall = wall_suitable(facts);
                let dense = dense_body(facts);
                let water = water_positive(facts);
                (wall && dense && water).then(|| {
                    Decision::suitable(
                        0.85,
                        "Wall rated, dense body (absorption 0.5% or less) and water resistant.",
                    )
                })
            }),
        ],
        |facts| {
            let mut absent = Vec::new();
            if !wall_suitable(facts) {
                absent.push("wall suitability");
            }
            if !dense_body(facts) {
                absent.push("absorption of 0.5% or less");
            }
            if !water_positive(facts) {
                absent.push("water resistance");
            }
            Decision::inconclusive(
                0.35,
                format!(
                    "Steam enclosures need wall suitability, low absorption and water resistance together. Not confirmed: {}.",
                    absent.join(", ")
                ),
            )
        },
    )
}

fn wall_suitable(facts: &mut Facts<'_>) -> bool {
    shower_wall_rated(facts) || installation_mentions(facts, &["wall"])
}

fn outdoor_kitchen_counter() -> Cascade {
    Cascade::new(
        vec![
            reject_indoor_placement(0.9, 0.9, "outdoor kitchens"),
            reject_frost_negative(0.85, "outdoor kitchens"),
            reject_soft_material(0.8, "outdoor counters"),
            Rule::new("outdoor_and_frost_resistant", |facts| {
                (is_outdoor(facts) && frost_positive(facts)).then(|| {
                    Decision::suitable(0.8, "Rated for outdoor placement and frost resistant.")
                })
            }),
            Rule::new("outdoor_counter_material", |facts| {
                if !is_outdoor(facts) {
                    return None;
                }
                let material = facts.text(&MATERIAL)?;
                contains_any(material, &["granite", "quartzite", "porcelain", "concrete"]).then(|| {
                    Decision::suitable(
                        0.7,
                        format!("Outdoor rated and '{material}' holds up as an exterior counter surface."),
                    )
                })
            }),
        ],
        |_| missing("outdoor kitchen counters", 0.3, "placement, frost or material data"),
    )
}

fn garage_workshop_floor() -> Cascade {
    Cascade::new(
        vec![
            reject_wall_only(0.95, "garage floors"),
            Rule::new("heavy_commercial_rating", |facts| {
                facts.mentions(&FLOOR_RATING, &["heavy commercial", "heavy duty", "industrial"]).then(
                    || Decision::suitable(0.85, "Floor suitability rating covers heavy duty use."),
                )
            }),
            Rule::new("pei_threshold", |facts| {
                let pei = facts.number(&PEI)?;
                if pei >= PEI_HEAVY_TRAFFIC_MIN {
                    Some(Decision::suitable(0.85, format!("PEI {pei} withstands heavy wear.")))
                } else if pei <= PEI_LIGHT_DUTY_MAX {
                    Some(Decision::unsuitable(
                        0.8,
                        format!("PEI {pei} is rated for light duty only."),
                    ))
                } else {
                    None
                }
            }),
            reject_soft_material(0.7, "garage and workshop floors"),
        ],
        |_| missing("garage or workshop floors", 0.3, "floor rating or conclusive PEI data"),
    )
}

fn driveway_paver() -> Cascade {
    Cascade::new(
        vec![
            reject_indoor_placement(0.95, 0.95, "driveways"),
            reject_wall_only(0.9, "driveways"),
            Rule::new("too_thin_for_vehicles", |facts| {
                let inches = thickness_inches(facts)?;
                (inches < DRIVEWAY_THICKNESS_MIN_IN).then(|| {
                    Decision::unsuitable(
                        0.9,
                        format!(
                            "Thickness of {inches:.2} in. is under {DRIVEWAY_THICKNESS_MIN_IN} in., too thin for vehicle loads."
                        ),
                    )
                })
            }),
            Rule::new("thick_outdoor_and_durable", |facts| {
                let inches = thickness_inches(facts)?;
                if inches < DRIVEWAY_THICKNESS_ACCEPT_IN || !is_outdoor(facts) {
                    return None;
                }
                let frost = frost_positive(facts);
                let dense = dense_body(facts);
                (frost || dense).then(|| {
                    Decision::suitable(
                        0.85,
                        format!(
                            "Thickness of {inches:.2} in., outdoor rated and frost resistant or dense bodied."
                        ),
                    )
                })
            }),
        ],
        |_| missing("driveways", 0.35, "thickness, outdoor placement and frost or density data together"),
    )
}

fn stair_tread() -> Cascade {
    Cascade::new(
        vec![
            reject_wall_only(0.9, "stairs"),
            Rule::new("stair_installation", |facts| {
                installation_mentions(facts, &["stair", "nosing", "step"]).then(|| {
                    Decision::suitable(0.85, "Installation options include stair treads or nosings.")
                })
            }),
            Rule::new("too_thin_for_nosing", |facts| {
                let inches = thickness_inches(facts)?;
                (inches < STAIR_NOSING_THICKNESS_MIN_IN).then(|| {
                    Decision::unsuitable(
                        0.8,
                        format!(
                            "Thickness of {inches:.2} in. is under {STAIR_NOSING_THICKNESS_MIN_IN} in., too thin for a stair nosing."
                        ),
                    )
                })
            }),
            Rule::new("slippery_tread", |facts| {
                let dcof = facts.number(&DCOF)?;
                (dcof < DCOF_WET_FLOOR_MIN).then(|| {
                    Decision::unsuitable(
                        0.75,
                        format!("DCOF {dcof} is below {DCOF_WET_FLOOR_MIN}, too slippery for treads."),
                    )
                })
            }),
            Rule::new("thick_and_durable", |facts| {
                let inches = thickness_inches(facts)?;
                if inches < STAIR_NOSING_THICKNESS_MIN_IN {
                    return None;
                }
                let pei_ok = facts.number(&PEI).is_some_and(|pei| pei >= 3.0);
                let dcof_ok = facts.number(&DCOF).is_some_and(|dcof| dcof >= DCOF_WET_FLOOR_MIN);
                (pei_ok || dcof_ok).then(|| {
                    Decision::suitable(
                        0.7,
                        format!("Thickness of {inches:.2} in. with adequate wear or slip rating."),
                    )
                })
            }),
        ],
        |_| missing("stair treads", 0.3, "installation, thickness or slip data"),
    )
}

fn commercial_kitchen_floor() -> Cascade {
    Cascade::new(
        vec![
            reject_wall_only(0.95, "commercial kitchen floors"),
            Rule::new("dcof_below_commercial_minimum", |facts| {
                let dcof = facts.number(&DCOF)?;
                (dcof < DCOF_COMMERCIAL_KITCHEN_MIN).then(|| {
                    Decision::unsuitable(
                        0.9,
                        format!(
                            "DCOF {dcof} is below the {DCOF_COMMERCIAL_KITCHEN_MIN} minimum for commercial kitchens."
                        ),
                    )
                })
            }),
            reject_water_negative(0.85, "commercial kitchens"),
            Rule::new("dcof_and_heavy_duty", |facts| {
                let dcof = facts.number(&DCOF)?;
                if dcof < DCOF_COMMERCIAL_KITCHEN_MIN {
                    return None;
                }
                let pei_ok = facts.number(&PEI).is_some_and(|pei| pei >= PEI_HEAVY_TRAFFIC_MIN);
                let rating_ok = commercial_rating(facts);
                (pei_ok || rating_ok).then(|| {
                    Decision::suitable(
                        0.9,
                        format!("DCOF {dcof} and a heavy-traffic rating meet commercial kitchen needs."),
                    )
                })
            }),
            Rule::new("dcof_meets_minimum", |facts| {
                let dcof = facts.number(&DCOF)?;
                (dcof >= DCOF_COMMERCIAL_KITCHEN_MIN).then(|| {
                    Decision::suitable(
                        0.75,
                        format!(
                            "DCOF {dcof} meets the {DCOF_COMMERCIAL_KITCHEN_MIN} minimum; traffic rating not stated."
                        ),
                    )
                })
            }),
        ],
        |_| missing("commercial kitchen floors", 0.3, "DCOF (slip resistance) data"),
    )
}

fn pool_interior() -> Cascade {
    Cascade::new(
        vec![
            Rule::new("pool_use_negative", |facts| {
                let placement = facts.mentions(
                    &PLACEMENT,
                    &["not suitable for pool", "not for pool", "not for submerged"],
                );
                let installation = installation_mentions(
                    facts,
                    &["not suitable for pool", "not for pool", "not for submerged"],
                );
                (placement || installation).then(|| {
                    Decision::unsuitable(0.95, "Product data excludes pool or submerged use.")
                })
            }),
            reject_soft_material(0.9, "submerged installation"),
            reject_water_negative(0.9, "pool interiors"),
            Rule::new("high_absorption", |facts| {
                let pct = absorption_pct(facts)?;
                (pct > SUBMERSION_ABSORPTION_MAX).then(|| {
                    Decision::unsuitable(
                        0.9,
                        format!("Water absorption of {pct}% is too high for constant submersion."),
                    )
                })
            }),
            Rule::new("pool_use_positive", |facts| {
                let placement = facts.mentions(&PLACEMENT, &["pool", "submerged"]);
                let installation = installation_mentions(facts, &["pool", "submerged"]);
                (placement || installation)
                    .then(|| Decision::suitable(0.9, "Product data lists pool or submerged use."))
            }),
            Rule::new("dense_porcelain_or_glass", |facts| {
                if !dense_body(facts) {
                    return None;
                }
                facts.mentions(&MATERIAL, &["porcelain", "glass"]).then(|| {
                    Decision::suitable(
                        0.8,
                        "Dense porcelain or glass body (absorption 0.5% or less) tolerates submersion.",
                    )
                })
            }),
            Rule::new("dense_body", |facts| {
                dense_body(facts).then(|| {
                    Decision::suitable(
                        0.75,
                        "Water absorption of 0.5% or less supports submerged installation.",
                    )
                })
            }),
        ],
        |_| missing("pool interiors", 0.3, "absorption or pool rating data"),
    )
}

fn exterior_wall_cladding() -> Cascade {
    Cascade::new(
        vec![
            reject_indoor_placement(0.95, 0.95, "exterior walls"),
            reject_floor_only(0.9, "wall cladding"),
            reject_frost_negative(0.85, "exterior walls"),
            Rule::new("outdoor_wall_installation", |facts| {
                (is_outdoor(facts) && installation_mentions(facts, &["wall"])).then(|| {
                    Decision::suitable(0.85, "Outdoor rated with wall installation listed.")
                })
            }),
            Rule::new("outdoor_and_frost_resistant", |facts| {
                (is_outdoor(facts) && frost_positive(facts)).then(|| {
                    Decision::suitable(0.8, "Outdoor rated and frost resistant.")
                })
            }),
        ],
        |_| missing("exterior wall cladding", 0.3, "placement, installation or frost data"),
    )
}
