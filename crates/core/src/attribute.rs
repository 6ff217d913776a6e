//! Attribute modifiers carried by items, keyed by equipment slot.

use crate::tag::TagCompound;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Equipment slot an item can be held or worn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentSlot {
    /// Main hand.
    MainHand,
    /// Off hand.
    OffHand,
    /// Boots slot.
    Feet,
    /// Leggings slot.
    Legs,
    /// Chestplate slot.
    Chest,
    /// Helmet slot.
    Head,
}

impl EquipmentSlot {
    /// Every slot.
    pub const ALL: [EquipmentSlot; 6] = [
        EquipmentSlot::MainHand,
        EquipmentSlot::OffHand,
        EquipmentSlot::Feet,
        EquipmentSlot::Legs,
        EquipmentSlot::Chest,
        EquipmentSlot::Head,
    ];

    /// Name persisted in the `Slot` field.
    pub const fn name(self) -> &'static str {
        match self {
            EquipmentSlot::MainHand => "mainhand",
            EquipmentSlot::OffHand => "offhand",
            EquipmentSlot::Feet => "feet",
            EquipmentSlot::Legs => "legs",
            EquipmentSlot::Chest => "chest",
            EquipmentSlot::Head => "head",
        }
    }
}

/// How a modifier combines with the attribute's base value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Added to the base value.
    #[default]
    Add,
    /// Base value multiplied by `1 + amount`.
    MultiplyBase,
    /// Final value multiplied by `1 + amount`.
    MultiplyTotal,
}

impl Operation {
    /// Persisted numeric form.
    pub const fn id(self) -> i32 {
        match self {
            Operation::Add => 0,
            Operation::MultiplyBase => 1,
            Operation::MultiplyTotal => 2,
        }
    }

    /// Parse the persisted numeric form.
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Operation::Add),
            1 => Some(Operation::MultiplyBase),
            2 => Some(Operation::MultiplyTotal),
            _ => None,
        }
    }
}

/// A named, identified change to an entity attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeModifier {
    /// Unique modifier id.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Magnitude.
    pub amount: f64,
    /// Combination rule.
    pub operation: Operation,
}

/// Modifiers are identified by id alone.
impl PartialEq for AttributeModifier {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl AttributeModifier {
    /// Create a modifier.
    pub fn new(id: Uuid, name: impl Into<String>, amount: f64, operation: Operation) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
            operation,
        }
    }

    /// Read a modifier from its persisted fields.
    ///
    /// Returns `None` for an empty name or an unknown operation.
    pub fn from_tag(tag: &TagCompound) -> Option<Self> {
        let name = tag.get_string("Name");
        if name.is_empty() {
            return None;
        }
        let operation = Operation::from_id(tag.get_int("Operation"))?;
        let id = Uuid::from_u64_pair(tag.get_long("UUIDMost") as u64, tag.get_long("UUIDLeast") as u64);
        Some(Self::new(id, name, tag.get_double("Amount"), operation))
    }

    /// Write the persisted fields.
    pub fn to_tag(&self) -> TagCompound {
        let (most, least) = self.id.as_u64_pair();
        let mut tag = TagCompound::new();
        tag.put_string("Name", self.name.clone());
        tag.put_double("Amount", self.amount);
        tag.put_int("Operation", self.operation.id());
        tag.put_long("UUIDMost", most as i64);
        tag.put_long("UUIDLeast", least as i64);
        tag
    }

    /// True when both 64-bit halves of the id are non-zero.
    pub fn has_valid_id(&self) -> bool {
        let (most, least) = self.id.as_u64_pair();
        most != 0 && least != 0
    }
}

/// Attribute name to modifiers; one attribute may carry several modifiers,
/// but never two with the same id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeMultimap {
    entries: BTreeMap<String, Vec<AttributeModifier>>,
}

impl AttributeMultimap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a modifier; returns false when one with the same id is already
    /// present for that attribute.
    pub fn put(&mut self, attribute: impl Into<String>, modifier: AttributeModifier) -> bool {
        let modifiers = self.entries.entry(attribute.into()).or_default();
        if modifiers.contains(&modifier) {
            return false;
        }
        modifiers.push(modifier);
        true
    }

    /// Modifiers for one attribute.
    pub fn get(&self, attribute: &str) -> &[AttributeModifier] {
        self.entries.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate `(attribute, modifier)` pairs in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeModifier)> {
        self.entries
            .iter()
            .flat_map(|(name, mods)| mods.iter().map(move |m| (name.as_str(), m)))
    }

    /// Total modifier count.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// True when no modifiers are present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
