#![warn(missing_docs)]
//! Item stacks, ingredient predicates and crafting recipes.
//!
//! [`Stack`] is the value type: an item kind, a count, a damage value and an
//! optional [`TagCompound`] of extended state. [`Ingredient`] decides whether
//! a stack fits a recipe slot, and [`Recipe`] implementations combine
//! ingredients into crafting rules.

pub mod attribute;
pub mod enchantment;
pub mod ingredient;
pub mod item;
pub mod recipe;
pub mod registry;
pub mod stack;
pub mod tag;

pub use attribute::{AttributeModifier, AttributeMultimap, EquipmentSlot, Operation};
pub use enchantment::{Enchantment, EnchantmentType};
pub use ingredient::{Ingredient, Matcher, WILDCARD_VARIANT};
pub use item::{
    DefinedItem, EntityId, ItemDefinition, ItemHolder, ItemId, ItemKind, ItemRef, ItemRegistry,
    Localizer, NoHolder, Rarity, RawKeys, RegistryError, UseAction,
};
pub use recipe::{
    container_remainders, CraftOutcome, CraftingGrid, Recipe, RecipeBook, RecipeDefinition,
    RecipeError, ShapedRecipe, ShapelessRecipe,
};
pub use registry::{BlockId, BlockLookup, BlockRegistry, RegistryKey, RegistryKeyError};
pub use stack::{DamageOutcome, Stack};
pub use tag::{Tag, TagCompound};
