//! Subcommand bodies, kept free of argument parsing so tests can call them.

use anyhow::{bail, Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use stackcraft_core::tag::TagCompound;
use stackcraft_core::{
    BlockRegistry, CraftingGrid, DamageOutcome, EquipmentSlot, ItemHolder, ItemRegistry, Rarity,
    RawKeys, RecipeBook, Stack,
};
use std::{fs, path::Path};
use tracing::{debug, info};

use crate::config::StackcraftConfig;

/// Registries loaded from the configured files.
pub struct Workspace {
    /// Known items.
    pub items: ItemRegistry,
    /// Known recipes.
    pub recipes: RecipeBook,
    /// Block ids by position in the configured list.
    pub blocks: BlockRegistry,
    /// Default damage seed.
    pub seed: u64,
}

impl Workspace {
    /// Load items, recipes and blocks named by `config`.
    pub fn load(config: &StackcraftConfig) -> Result<Self> {
        let items = ItemRegistry::load_from_file(&config.items_path)?;
        let recipes = RecipeBook::load_from_file(&config.recipes_path, &items)?;
        let blocks = BlockRegistry::from_names(config.blocks.iter().map(String::as_str));
        info!(
            items = items.len(),
            recipes = recipes.len(),
            blocks = blocks.len(),
            "Loaded registries"
        );
        Ok(Self {
            items,
            recipes,
            blocks,
            seed: config.seed,
        })
    }
}

/// Read a persisted stack document.
pub fn read_document(path: &Path) -> Result<TagCompound> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read stack document {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse stack document {}", path.display()))
}

/// Summary printed by `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackReport {
    pub empty: bool,
    pub item: Option<String>,
    pub count: i32,
    pub damage: i32,
    pub max_damage: i32,
    pub display_name: String,
    pub custom_name: bool,
    pub rarity: Rarity,
    pub repair_cost: i32,
    pub enchantments: Vec<String>,
    pub modifiers: Vec<ModifierReport>,
    pub can_destroy: Vec<String>,
    pub can_place_on: Vec<String>,
}

/// One attribute modifier in a [`StackReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifierReport {
    pub slot: EquipmentSlot,
    pub attribute: String,
    pub name: String,
    pub amount: f64,
}

/// Describe a decoded stack.
pub fn inspect(stack: &Stack, blocks: &BlockRegistry) -> StackReport {
    let mut modifiers = Vec::new();
    for slot in EquipmentSlot::ALL {
        for (attribute, modifier) in stack.attribute_modifiers(slot).iter() {
            modifiers.push(ModifierReport {
                slot,
                attribute: attribute.to_string(),
                name: modifier.name.clone(),
                amount: modifier.amount,
            });
        }
    }

    let block_names = |allowed: &dyn Fn(u16) -> bool| -> Vec<String> {
        (0..blocks.len())
            .filter_map(|id| u16::try_from(id).ok())
            .filter(|id| allowed(*id))
            .filter_map(|id| blocks.key(id).map(ToString::to_string))
            .collect()
    };

    StackReport {
        empty: stack.is_empty(),
        item: stack.item().map(|item| item.key().to_string()),
        count: stack.count(),
        damage: stack.damage(),
        max_damage: stack.max_damage(),
        display_name: stack.display_name(&RawKeys),
        custom_name: stack.has_custom_name(),
        rarity: stack.rarity(),
        repair_cost: stack.repair_cost(),
        enchantments: stack
            .enchantments()
            .iter()
            .map(|e| format!("{:?} {}", e.enchantment_type, e.level))
            .collect(),
        modifiers,
        can_destroy: block_names(&|id| stack.can_destroy(id, blocks)),
        can_place_on: block_names(&|id| stack.can_place_on(id, blocks)),
    }
}

/// Holder that reports callbacks through `tracing`.
#[derive(Debug, Default)]
pub struct LoggingHolder {
    /// Whether a break was reported.
    pub broke: bool,
}

impl ItemHolder for LoggingHolder {
    fn on_item_broken(&mut self, stack: &Stack) {
        info!(item = %stack.translation_key(), "Item broke");
        self.broke = true;
    }

    fn on_durability_changed(&mut self, stack: &Stack, new_damage: i32) {
        debug!(item = %stack.translation_key(), new_damage, "Durability changed");
    }
}

/// Result of `damage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageReport {
    pub outcome: &'static str,
    pub damage: i32,
    pub broke: bool,
    pub document: TagCompound,
}

/// Apply `amount` damage with a seeded roll.
pub fn damage(stack: &mut Stack, amount: i32, seed: u64) -> DamageReport {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut holder = LoggingHolder::default();
    let outcome = stack.damage_item(amount, &mut rng, &mut holder);
    DamageReport {
        outcome: match outcome {
            DamageOutcome::Unchanged => "unchanged",
            DamageOutcome::Damaged => "damaged",
            DamageOutcome::Broken => "broken",
        },
        damage: stack.damage(),
        broke: holder.broke,
        document: stack.encode(),
    }
}

/// Result of `split`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitReport {
    pub taken: TagCompound,
    pub remaining: TagCompound,
}

/// Move up to `amount` items into a new stack.
pub fn split(stack: &mut Stack, amount: i32) -> SplitReport {
    let taken = stack.split(amount);
    SplitReport {
        taken: taken.encode(),
        remaining: stack.encode(),
    }
}

/// Grid file read by `craft`: row-major cells, `null` for an empty slot.
#[derive(Debug, Clone, Deserialize)]
pub struct GridFile {
    pub width: usize,
    pub cells: Vec<Option<TagCompound>>,
}

impl GridFile {
    /// Read a grid file from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read grid {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse grid {}", path.display()))
    }

    /// Decode every cell against `items`.
    pub fn decode(&self, items: &ItemRegistry) -> Result<CraftingGrid> {
        if self.width == 0 || self.cells.is_empty() || self.cells.len() % self.width != 0 {
            bail!(
                "Grid of {} cells cannot have width {}",
                self.cells.len(),
                self.width
            );
        }
        let cells = self
            .cells
            .iter()
            .map(|cell| match cell {
                Some(document) => Stack::decode(document, items),
                None => Stack::empty(),
            })
            .collect();
        Ok(CraftingGrid::from_cells(
            self.width,
            self.cells.len() / self.width,
            cells,
        ))
    }
}

/// Result of `craft`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CraftReport {
    pub recipe: String,
    pub result: TagCompound,
    pub grid: Vec<Option<TagCompound>>,
    pub leftovers: Vec<TagCompound>,
}

/// Craft once from `grid`, or fail when no recipe matches.
pub fn craft(recipes: &RecipeBook, grid: &mut CraftingGrid) -> Result<CraftReport> {
    let Some(outcome) = recipes.craft(grid) else {
        bail!("No recipe matches the grid");
    };
    Ok(CraftReport {
        recipe: outcome.recipe,
        result: outcome.result.encode(),
        grid: grid
            .cells()
            .iter()
            .map(|cell| (!cell.is_empty()).then(|| cell.encode()))
            .collect(),
        leftovers: outcome.leftovers.iter().map(Stack::encode).collect(),
    })
}
