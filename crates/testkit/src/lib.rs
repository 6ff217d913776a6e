#![warn(missing_docs)]
//! Deterministic test fixtures for stacks, ingredients and recipes.
//!
//! Provides a fixed item and block registry, a seeded RNG, an item holder
//! that records callbacks, a JSONL event sink and golden-file snapshots.

mod scenario;
mod snapshot;

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use stackcraft_core::stack::keys;
use stackcraft_core::tag::{TagCompound, TAG_STRING};
use stackcraft_core::{
    BlockRegistry, ItemHolder, ItemKind, ItemRegistry, RecipeBook, RegistryKey, Stack,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub use scenario::*;
pub use snapshot::*;

/// Item definitions shared by the integration tests.
pub const FIXTURE_ITEMS: &str = r#"
[
  { "key": "minecraft:stone" },
  { "key": "minecraft:wool", "has_subtypes": true },
  { "key": "minecraft:planks", "has_subtypes": true },
  { "key": "minecraft:stick" },
  {
    "key": "minecraft:diamond_pickaxe",
    "max_stack_size": 1,
    "max_damage": 1561,
    "attributes": [
      {
        "slot": "mainhand",
        "attribute": "generic.attackDamage",
        "name": "Tool modifier",
        "amount": 4.0,
        "uuid": "cb3f55d3-645c-4f38-a497-9c13a33db5cf"
      },
      {
        "slot": "mainhand",
        "attribute": "generic.attackSpeed",
        "name": "Tool modifier",
        "amount": -2.8,
        "uuid": "fa233e1c-4180-4865-b01b-bcce9785aca3"
      }
    ]
  },
  { "key": "minecraft:iron_chestplate", "max_stack_size": 1, "max_damage": 240, "armor": true },
  { "key": "minecraft:shears", "max_stack_size": 1, "max_damage": 238 },
  { "key": "minecraft:bucket", "max_stack_size": 16 },
  { "key": "minecraft:water_bucket", "max_stack_size": 1, "container": "minecraft:bucket" },
  {
    "key": "minecraft:milk_bucket",
    "max_stack_size": 1,
    "container": "minecraft:bucket",
    "use_duration": 32,
    "use_action": "drink"
  },
  { "key": "minecraft:sugar" },
  { "key": "minecraft:egg", "max_stack_size": 16 },
  { "key": "minecraft:wheat" },
  { "key": "minecraft:cake", "max_stack_size": 1 },
  { "key": "minecraft:golden_apple", "has_subtypes": true, "rarity": "rare", "use_duration": 32, "use_action": "eat" }
]
"#;

/// Recipes over [`FIXTURE_ITEMS`].
pub const FIXTURE_RECIPES: &str = r####"
[
  {
    "type": "shaped",
    "name": "stick",
    "pattern": ["#", "#"],
    "key": { "#": { "item": "minecraft:planks", "data": 32767 } },
    "result": { "item": "minecraft:stick", "count": 4 }
  },
  {
    "type": "shaped",
    "name": "diamond_pickaxe",
    "pattern": ["###", " | ", " | "],
    "key": { "#": { "item": "minecraft:stone" }, "|": { "item": "minecraft:stick" } },
    "result": { "item": "minecraft:diamond_pickaxe" }
  },
  {
    "type": "shapeless",
    "name": "cake",
    "ingredients": [
      { "item": "minecraft:milk_bucket" },
      { "item": "minecraft:sugar" },
      { "item": "minecraft:egg" },
      { "item": "minecraft:wheat" }
    ],
    "result": { "item": "minecraft:cake" }
  },
  {
    "type": "shapeless",
    "name": "white_wool",
    "ingredients": [
      [{ "item": "minecraft:wool", "data": 1 }, { "item": "minecraft:wool", "data": 14 }],
      { "item": "minecraft:sugar" }
    ],
    "result": { "item": "minecraft:wool", "data": 0 }
  }
]
"####;

/// Skull item whose older documents stored `SkullOwner` as a plain name.
///
/// Decoding upgrades the name into a `{Name: ...}` compound.
#[derive(Debug)]
pub struct SkullItem {
    key: RegistryKey,
}

impl Default for SkullItem {
    fn default() -> Self {
        Self {
            key: RegistryKey::parse("minecraft:skull").expect("static key is valid"),
        }
    }
}

impl ItemKind for SkullItem {
    fn key(&self) -> &RegistryKey {
        &self.key
    }

    fn has_subtypes(&self) -> bool {
        true
    }

    fn translation_key(&self, stack: &Stack) -> String {
        format!("item.skull.{}", stack.metadata())
    }

    fn upgrade_persisted(&self, document: &mut TagCompound) {
        let Some(tag) = document.get_compound_mut(keys::TAG) else {
            return;
        };
        if !tag.contains("SkullOwner", TAG_STRING) {
            return;
        }
        let name = tag.get_string("SkullOwner").to_string();
        if name.is_empty() {
            tag.remove("SkullOwner");
        } else {
            tag.compound_mut("SkullOwner").put_string("Name", name);
        }
    }
}

/// Registry holding [`FIXTURE_ITEMS`] plus [`SkullItem`].
pub fn fixture_items() -> ItemRegistry {
    let mut registry = ItemRegistry::load_from_str(FIXTURE_ITEMS).expect("fixture items are valid");
    registry
        .register(Arc::new(SkullItem::default()))
        .expect("skull registers once");
    registry
}

/// Recipe book built from [`FIXTURE_RECIPES`].
pub fn fixture_recipes(items: &ItemRegistry) -> RecipeBook {
    RecipeBook::load_from_str(FIXTURE_RECIPES, items).expect("fixture recipes are valid")
}

/// Block registry: air 0, stone 1, dirt 2, grass 3, obsidian 4.
pub fn fixture_blocks() -> BlockRegistry {
    BlockRegistry::from_names(["air", "stone", "dirt", "grass", "obsidian"])
}

/// Reproducible random source.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Stack of a fixture item.
pub fn stack(items: &ItemRegistry, name: &str, count: i32, damage: i32) -> Stack {
    Stack::new(
        items.get(name).unwrap_or_else(|| panic!("unknown fixture item {name}")),
        count,
        damage,
    )
}

/// Callback observed by a [`RecordingHolder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HolderEvent {
    /// Durability is about to change.
    DurabilityChanged {
        /// Translation key of the stack.
        item: String,
        /// Damage value after the change.
        new_damage: i32,
    },
    /// A stack broke.
    ItemBroken {
        /// Translation key of the stack.
        item: String,
    },
}

/// Item holder that remembers every callback.
#[derive(Debug, Default)]
pub struct RecordingHolder {
    /// Callbacks in arrival order.
    pub events: Vec<HolderEvent>,
}

impl RecordingHolder {
    /// Number of break callbacks.
    pub fn broken_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HolderEvent::ItemBroken { .. }))
            .count()
    }

    /// Write every event to `sink`, numbered from 0.
    pub fn write_to(&self, sink: &mut JsonlSink) -> Result<()> {
        for (step, event) in self.events.iter().enumerate() {
            let payload = serde_json::to_string(event)?;
            sink.write(&EventRecord {
                step: step as u64,
                kind: match event {
                    HolderEvent::DurabilityChanged { .. } => "durability_changed",
                    HolderEvent::ItemBroken { .. } => "item_broken",
                },
                payload: &payload,
            })?;
        }
        Ok(())
    }
}

impl ItemHolder for RecordingHolder {
    fn on_item_broken(&mut self, stack: &Stack) {
        self.events.push(HolderEvent::ItemBroken {
            item: stack.translation_key(),
        });
    }

    fn on_durability_changed(&mut self, stack: &Stack, new_damage: i32) {
        self.events.push(HolderEvent::DurabilityChanged {
            item: stack.translation_key(),
            new_damage,
        });
    }
}

/// Primary event record captured by headless tests.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Sequence number.
    pub step: u64,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Free-form payload.
    pub payload: &'a str,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent directories if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}
