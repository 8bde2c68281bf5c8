//! Garden shop and planted items.
//!
//! Items are cosmetic: buying one spends currency and adds a plant, nothing
//! else in the app reads them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::rewards::Currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GardenItemKind {
    Sapling,
    Flower,
}

impl GardenItemKind {
    pub const ALL: [GardenItemKind; 2] = [GardenItemKind::Sapling, GardenItemKind::Flower];

    pub fn icon(self) -> &'static str {
        match self {
            GardenItemKind::Sapling => "🌱",
            GardenItemKind::Flower => "🌸",
        }
    }

    pub fn offer(self) -> ShopOffer {
        match self {
            GardenItemKind::Sapling => ShopOffer {
                kind: self,
                cost: 5,
                currency: Currency::Water,
                icon: self.icon(),
            },
            GardenItemKind::Flower => ShopOffer {
                kind: self,
                cost: 3,
                currency: Currency::Sunlight,
                icon: self.icon(),
            },
        }
    }
}

impl fmt::Display for GardenItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GardenItemKind::Sapling => "sapling",
            GardenItemKind::Flower => "flower",
        })
    }
}

impl FromStr for GardenItemKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sapling" => Ok(GardenItemKind::Sapling),
            "flower" => Ok(GardenItemKind::Flower),
            _ => Err(CoreError::invalid_input(
                "item",
                format!("the shop does not sell '{s}'"),
            )),
        }
    }
}

/// A shop catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShopOffer {
    pub kind: GardenItemKind,
    pub cost: u64,
    pub currency: Currency,
    pub icon: &'static str,
}

pub fn shop() -> Vec<ShopOffer> {
    GardenItemKind::ALL.iter().map(|k| k.offer()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: GardenItemKind,
    pub icon: String,
    pub planted_at: DateTime<Utc>,
}

impl GardenItem {
    pub fn plant(kind: GardenItemKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            icon: kind.icon().to_string(),
            planted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Garden {
    items: Vec<GardenItem>,
}

impl Garden {
    pub fn items(&self) -> &[GardenItem] {
        &self.items
    }

    pub fn count(&self, kind: GardenItemKind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }

    pub(crate) fn push(&mut self, item: GardenItem) {
        self.items.push(item);
    }
}
