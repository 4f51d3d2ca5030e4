use crate::domain::id;
use crate::domain::lifecycle::Lifecycle;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg_attr(test, derive(Default))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rarity {
    pub id: String,
    pub name: String,
    pub alias: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Rarity {
    #[must_use]
    pub fn new(name: &str, alias: &str) -> Self {
        Self {
            id: id::rarity_id(name),
            name: name.to_string(),
            alias: alias.to_string(),
            lifecycle: Lifecycle::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RarityKind {
    Common,
    Uncommon,
    Rare,
    MythicRare,
    Special,
    Land,
    Promo,
    Bonus,
}

impl RarityKind {
    pub const ALL: [RarityKind; 8] = [
        RarityKind::Common,
        RarityKind::Uncommon,
        RarityKind::Rare,
        RarityKind::MythicRare,
        RarityKind::Special,
        RarityKind::Land,
        RarityKind::Promo,
        RarityKind::Bonus,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RarityKind::Common => "Common",
            RarityKind::Uncommon => "Uncommon",
            RarityKind::Rare => "Rare",
            RarityKind::MythicRare => "Mythic Rare",
            RarityKind::Special => "Special",
            RarityKind::Land => "Land",
            RarityKind::Promo => "Promo",
            RarityKind::Bonus => "Bonus",
        }
    }

    #[must_use]
    pub fn alias(self) -> &'static str {
        match self {
            RarityKind::Common => "C",
            RarityKind::Uncommon => "U",
            RarityKind::Rare => "R",
            RarityKind::MythicRare => "M",
            RarityKind::Special => "S",
            RarityKind::Land => "L",
            RarityKind::Promo => "P",
            RarityKind::Bonus => "B",
        }
    }
}

/// The closed set of canonical rarities, indexed by id, alias and name.
pub struct RarityRegistry {
    rarities: Vec<Rarity>,
    by_id: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

pub static RARITIES: Lazy<RarityRegistry> = Lazy::new(RarityRegistry::canonical);

impl RarityRegistry {
    fn canonical() -> Self {
        let rarities: Vec<Rarity> = RarityKind::ALL
            .iter()
            .map(|kind| Rarity::new(kind.name(), kind.alias()))
            .collect();

        let mut by_id = HashMap::with_capacity(rarities.len());
        let mut by_alias = HashMap::with_capacity(rarities.len());
        let mut by_name = HashMap::with_capacity(rarities.len());
        for (index, rarity) in rarities.iter().enumerate() {
            by_id.insert(rarity.id.clone(), index);
            by_alias.insert(rarity.alias.to_uppercase(), index);
            by_name.insert(rarity.name.to_lowercase(), index);
        }

        Self {
            rarities,
            by_id,
            by_alias,
            by_name,
        }
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Rarity> {
        self.by_id.get(id).map(|&index| &self.rarities[index])
    }

    /// Case-insensitive.
    #[must_use]
    pub fn by_alias(&self, alias: &str) -> Option<&Rarity> {
        self.by_alias
            .get(&alias.trim().to_uppercase())
            .map(|&index| &self.rarities[index])
    }

    /// Case-insensitive.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Rarity> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&index| &self.rarities[index])
    }

    #[must_use]
    pub fn of(&self, kind: RarityKind) -> &Rarity {
        &self.rarities[kind as usize]
    }

    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rarity> {
        self.rarities.iter()
    }
}
