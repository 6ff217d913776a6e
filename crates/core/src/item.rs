//! Item kinds: the pluggable behavior behind every stack.
//!
//! A stack never owns its item's behavior; it holds an [`ItemRef`], a cheap
//! handle (numeric id plus shared [`ItemKind`]) handed out by an
//! [`ItemRegistry`]. Concrete behaviors implement [`ItemKind`] and override
//! only the hooks they care about; [`DefinedItem`] covers data-driven items
//! loaded from JSON.

use crate::attribute::{AttributeModifier, AttributeMultimap, EquipmentSlot, Operation};
use crate::registry::{BlockId, RegistryKey, RegistryKeyError};
use crate::stack::Stack;
use crate::tag::TagCompound;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Numeric item identifier assigned by the registry.
pub type ItemId = u16;

/// Default maximum stack size.
pub const DEFAULT_STACK_SIZE: i32 = 64;

/// Handle to an entity that lives outside this crate (e.g., an item frame).
///
/// Stacks only remember the handle; whoever owns the entity resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Animation shown while an item is being used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseAction {
    /// No use animation.
    #[default]
    None,
    /// Eating.
    Eat,
    /// Drinking.
    Drink,
    /// Raising a shield.
    Block,
    /// Drawing a bow.
    Bow,
}

/// Rarity tier, used for name coloring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// White.
    #[default]
    Common,
    /// Yellow.
    Uncommon,
    /// Aqua.
    Rare,
    /// Purple.
    Epic,
}

/// Translates localization keys to display text.
pub trait Localizer {
    /// Translate `key`; unknown keys come back unchanged.
    fn translate(&self, key: &str) -> String;
}

/// Localizer that returns keys untranslated.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawKeys;

impl Localizer for RawKeys {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

impl Localizer for HashMap<String, String> {
    fn translate(&self, key: &str) -> String {
        self.get(key).cloned().unwrap_or_else(|| key.to_string())
    }
}

/// The entity holding or using a stack.
///
/// Every hook defaults to a no-op so callers only implement what they track.
pub trait ItemHolder {
    /// A stack in this holder's possession broke.
    fn on_item_broken(&mut self, _stack: &Stack) {}

    /// Durability damage is about to be applied; `new_damage` is the value
    /// the stack will hold afterwards.
    fn on_durability_changed(&mut self, _stack: &Stack, _new_damage: i32) {}

    /// A hit or block break counted as a use of the stack's item.
    fn on_item_used(&mut self, _stack: &Stack) {}

    /// `amount` items were crafted into this holder's hands.
    fn on_item_crafted(&mut self, _stack: &Stack, _amount: i32) {}
}

/// Holder that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolder;

impl ItemHolder for NoHolder {}

/// Behavior of one item kind.
///
/// Implementations are shared between threads through [`ItemRef`] and must
/// not hold per-stack state.
pub trait ItemKind: fmt::Debug + Send + Sync {
    /// Persisted identifier.
    fn key(&self) -> &RegistryKey;

    /// Largest count a single stack may hold.
    fn max_stack_size(&self) -> i32 {
        DEFAULT_STACK_SIZE
    }

    /// Durability; `<= 0` means the item cannot be damaged.
    fn max_damage(&self) -> i32 {
        0
    }

    /// True when the damage value selects a sub-kind instead of durability.
    fn has_subtypes(&self) -> bool {
        false
    }

    /// True only for the "no item" kind.
    fn is_air(&self) -> bool {
        false
    }

    /// Armor gets fewer Unbreaking negation rolls.
    fn is_armor(&self) -> bool {
        false
    }

    /// Localization key for `stack`.
    fn translation_key(&self, _stack: &Stack) -> String {
        format!("item.{}", self.key().path())
    }

    /// Default display name when the stack carries no custom name.
    fn display_name(&self, stack: &Stack, localizer: &dyn Localizer) -> String {
        localizer
            .translate(&format!("{}.name", self.translation_key(stack)))
            .trim()
            .to_string()
    }

    /// Ticks a use takes to complete (0 for instant items).
    fn max_use_duration(&self, _stack: &Stack) -> i32 {
        0
    }

    /// Animation while in use.
    fn use_action(&self, _stack: &Stack) -> UseAction {
        UseAction::None
    }

    /// Rarity of `stack`.
    fn rarity(&self, stack: &Stack) -> Rarity {
        if stack.is_enchanted() {
            Rarity::Rare
        } else {
            Rarity::Common
        }
    }

    /// Whether an enchanting table accepts this item.
    fn is_enchantable(&self, _stack: &Stack) -> bool {
        self.max_stack_size() == 1 && self.max_damage() > 0
    }

    /// Modifiers applied when no explicit `AttributeModifiers` list exists.
    fn default_attribute_modifiers(&self, _slot: EquipmentSlot) -> AttributeMultimap {
        AttributeMultimap::new()
    }

    /// Migrate an older persisted stack document in place. Called during
    /// decoding, before the `tag` entry is adopted.
    fn upgrade_persisted(&self, _document: &mut TagCompound) {}

    /// Item left behind in a crafting grid when this item is consumed.
    fn container_item(&self) -> Option<ItemRef> {
        None
    }

    /// Called every tick while the stack sits in a holder's inventory.
    fn on_update(&self, _stack: &mut Stack, _holder: &mut dyn ItemHolder) {}

    /// Called when a timed use completes; returns the stack to keep.
    fn on_use_finish(&self, stack: Stack, _holder: &mut dyn ItemHolder) -> Stack {
        stack
    }

    /// Called when the holder lets go of a timed use early.
    fn on_stopped_using(
        &self,
        _stack: &mut Stack,
        _holder: &mut dyn ItemHolder,
        _time_left: i32,
    ) {
    }

    /// Called once the stack comes out of a crafting grid.
    fn on_crafted(&self, _stack: &mut Stack, _holder: &mut dyn ItemHolder) {}

    /// Called after the holder hits `target` with the stack. Returns true
    /// when the hit counts as a use.
    fn hit_entity(
        &self,
        _stack: &mut Stack,
        _target: EntityId,
        _attacker: &mut dyn ItemHolder,
    ) -> bool {
        false
    }

    /// Called after the holder breaks `block` with the stack. Returns true
    /// when the break counts as a use.
    fn on_block_destroyed(
        &self,
        _stack: &mut Stack,
        _block: BlockId,
        _holder: &mut dyn ItemHolder,
    ) -> bool {
        false
    }

    /// Mining speed multiplier against `block`.
    fn destroy_speed(&self, _stack: &Stack, _block: BlockId) -> f32 {
        1.0
    }

    /// Whether `block` drops its item when broken with this kind.
    fn can_harvest_block(&self, _block: BlockId) -> bool {
        false
    }

    /// Whether holders may edit blocks (signs, command blocks) with this kind.
    fn can_edit_blocks(&self) -> bool {
        false
    }
}

/// Registered item kind with its numeric id.
///
/// Equality and hashing use the id only.
#[derive(Clone)]
pub struct ItemRef {
    id: ItemId,
    kind: Arc<dyn ItemKind>,
}

impl ItemRef {
    /// Bind a kind to an id. Normally done by [`ItemRegistry::register`].
    pub fn new(id: ItemId, kind: Arc<dyn ItemKind>) -> Self {
        Self { id, kind }
    }

    /// Numeric id.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Behavior.
    pub fn kind(&self) -> &dyn ItemKind {
        self.kind.as_ref()
    }

    /// Persisted identifier.
    pub fn key(&self) -> &RegistryKey {
        self.kind.key()
    }

    /// True for the "no item" kind.
    pub fn is_air(&self) -> bool {
        self.kind.is_air()
    }
}

impl PartialEq for ItemRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ItemRef {}

impl Hash for ItemRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.key(), self.id)
    }
}

/// The "no item" kind, always registered with id 0.
#[derive(Debug)]
pub struct AirItem {
    key: RegistryKey,
}

impl Default for AirItem {
    fn default() -> Self {
        Self {
            key: RegistryKey::air(),
        }
    }
}

impl ItemKind for AirItem {
    fn key(&self) -> &RegistryKey {
        &self.key
    }

    fn is_air(&self) -> bool {
        true
    }

    fn translation_key(&self, _stack: &Stack) -> String {
        "tile.air".to_string()
    }
}

/// Default attribute modifier declared by an item definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultModifier {
    /// Slot the modifier applies in.
    pub slot: EquipmentSlot,
    /// Attribute name (e.g., `generic.attackDamage`).
    pub attribute: String,
    /// Modifier name.
    pub name: String,
    /// Magnitude.
    pub amount: f64,
    /// Combination rule.
    #[serde(default)]
    pub operation: Operation,
    /// Modifier id.
    pub uuid: Uuid,
}

fn default_stack_size() -> i32 {
    DEFAULT_STACK_SIZE
}

/// Data-driven item definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Persisted identifier.
    pub key: RegistryKey,
    /// Largest stack count.
    #[serde(default = "default_stack_size")]
    pub max_stack_size: i32,
    /// Durability (0 = not damageable).
    #[serde(default)]
    pub max_damage: i32,
    /// Damage value selects sub-kinds.
    #[serde(default)]
    pub has_subtypes: bool,
    /// Worn armor piece.
    #[serde(default)]
    pub armor: bool,
    /// Use duration in ticks.
    #[serde(default)]
    pub use_duration: i32,
    /// Use animation.
    #[serde(default)]
    pub use_action: UseAction,
    /// Base rarity.
    #[serde(default)]
    pub rarity: Rarity,
    /// Item left behind after crafting or use (must already be registered).
    #[serde(default)]
    pub container: Option<RegistryKey>,
    /// Default attribute modifiers.
    #[serde(default)]
    pub attributes: Vec<DefaultModifier>,
}

impl ItemDefinition {
    /// Minimal definition with defaults for everything but the key.
    pub fn new(key: RegistryKey) -> Self {
        Self {
            key,
            max_stack_size: DEFAULT_STACK_SIZE,
            max_damage: 0,
            has_subtypes: false,
            armor: false,
            use_duration: 0,
            use_action: UseAction::None,
            rarity: Rarity::Common,
            container: None,
            attributes: Vec::new(),
        }
    }
}

/// [`ItemKind`] backed by an [`ItemDefinition`].
#[derive(Debug)]
pub struct DefinedItem {
    definition: ItemDefinition,
    container: Option<ItemRef>,
}

impl DefinedItem {
    /// Build from a definition whose container (if any) is already resolved.
    pub fn new(definition: ItemDefinition, container: Option<ItemRef>) -> Self {
        Self {
            definition,
            container,
        }
    }

    /// Underlying definition.
    pub fn definition(&self) -> &ItemDefinition {
        &self.definition
    }
}

impl ItemKind for DefinedItem {
    fn key(&self) -> &RegistryKey {
        &self.definition.key
    }

    fn max_stack_size(&self) -> i32 {
        self.definition.max_stack_size
    }

    fn max_damage(&self) -> i32 {
        self.definition.max_damage
    }

    fn has_subtypes(&self) -> bool {
        self.definition.has_subtypes
    }

    fn is_armor(&self) -> bool {
        self.definition.armor
    }

    fn translation_key(&self, stack: &Stack) -> String {
        if self.definition.has_subtypes {
            format!("item.{}.{}", self.definition.key.path(), stack.metadata())
        } else {
            format!("item.{}", self.definition.key.path())
        }
    }

    fn max_use_duration(&self, _stack: &Stack) -> i32 {
        self.definition.use_duration
    }

    fn use_action(&self, _stack: &Stack) -> UseAction {
        self.definition.use_action
    }

    fn rarity(&self, stack: &Stack) -> Rarity {
        let base = self.definition.rarity;
        if stack.is_enchanted() && base < Rarity::Rare {
            Rarity::Rare
        } else {
            base
        }
    }

    fn default_attribute_modifiers(&self, slot: EquipmentSlot) -> AttributeMultimap {
        let mut map = AttributeMultimap::new();
        for entry in self.definition.attributes.iter().filter(|e| e.slot == slot) {
            map.put(
                entry.attribute.clone(),
                AttributeModifier::new(entry.uuid, entry.name.clone(), entry.amount, entry.operation),
            );
        }
        map
    }

    fn container_item(&self) -> Option<ItemRef> {
        self.container.clone()
    }

    fn on_use_finish(&self, mut stack: Stack, _holder: &mut dyn ItemHolder) -> Stack {
        if self.definition.use_duration <= 0 {
            return stack;
        }
        stack.shrink(1);
        match (&self.container, stack.is_empty()) {
            (Some(container), true) => Stack::of(container.clone()),
            _ => stack,
        }
    }
}

/// Errors raised while building an [`ItemRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two kinds share a key.
    #[error("item {0} is already registered")]
    DuplicateKey(RegistryKey),
    /// A definition names a container that is not registered yet.
    #[error("item {item} names unknown container {container}")]
    UnknownContainer {
        /// Item being registered.
        item: RegistryKey,
        /// Unresolved container key.
        container: RegistryKey,
    },
    /// A required item is not registered.
    #[error("unknown item {0}")]
    UnknownItem(RegistryKey),
    /// The registry ran out of numeric ids.
    #[error("item registry is full")]
    Full,
    /// A lookup key failed to parse.
    #[error(transparent)]
    InvalidKey(#[from] RegistryKeyError),
}

/// Identifier → kind registry. Id 0 is always [`AirItem`].
#[derive(Debug, Clone)]
pub struct ItemRegistry {
    items: Vec<ItemRef>,
    by_key: HashMap<RegistryKey, ItemId>,
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemRegistry {
    /// Create a registry holding only air.
    pub fn new() -> Self {
        let air = ItemRef::new(0, Arc::new(AirItem::default()));
        let mut by_key = HashMap::new();
        by_key.insert(air.key().clone(), 0);
        Self {
            items: vec![air],
            by_key,
        }
    }

    /// Register a kind under the next free id.
    pub fn register(&mut self, kind: Arc<dyn ItemKind>) -> Result<ItemRef, RegistryError> {
        if self.by_key.contains_key(kind.key()) {
            return Err(RegistryError::DuplicateKey(kind.key().clone()));
        }
        let id = ItemId::try_from(self.items.len()).map_err(|_| RegistryError::Full)?;
        let item = ItemRef::new(id, kind);
        self.by_key.insert(item.key().clone(), id);
        self.items.push(item.clone());
        Ok(item)
    }

    /// Register a data-driven definition, resolving its container.
    pub fn register_definition(
        &mut self,
        definition: ItemDefinition,
    ) -> Result<ItemRef, RegistryError> {
        let container = match &definition.container {
            Some(key) => Some(self.get_by_key(key).ok_or_else(|| {
                RegistryError::UnknownContainer {
                    item: definition.key.clone(),
                    container: key.clone(),
                }
            })?),
            None => None,
        };
        self.register(Arc::new(DefinedItem::new(definition, container)))
    }

    /// Load definitions from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read item file {}", path.display()))?;
        Self::load_from_str(&content)
    }

    /// Load definitions from a JSON array.
    pub fn load_from_str(content: &str) -> Result<Self> {
        let definitions: Vec<ItemDefinition> =
            serde_json::from_str(content).context("Failed to parse item JSON")?;

        let mut registry = Self::new();
        for definition in definitions {
            let key = definition.key.clone();
            registry
                .register_definition(definition)
                .with_context(|| format!("Failed to register item {key}"))?;
        }
        tracing::debug!(items = registry.len(), "loaded item registry");
        Ok(registry)
    }

    /// Resolve a persisted identifier; malformed identifiers resolve to `None`.
    pub fn get(&self, name: &str) -> Option<ItemRef> {
        RegistryKey::parse(name)
            .ok()
            .and_then(|key| self.get_by_key(&key))
    }

    /// Resolve an identifier, falling back to a decimal numeric id.
    pub fn get_by_name_or_id(&self, name: &str) -> Option<ItemRef> {
        self.get(name)
            .or_else(|| name.parse::<ItemId>().ok().and_then(|id| self.get_by_id(id)))
    }

    /// Resolve a parsed key.
    pub fn get_by_key(&self, key: &RegistryKey) -> Option<ItemRef> {
        self.by_key.get(key).and_then(|id| self.get_by_id(*id))
    }

    /// Resolve a numeric id.
    pub fn get_by_id(&self, id: ItemId) -> Option<ItemRef> {
        self.items.get(id as usize).cloned()
    }

    /// Resolve a key that must exist.
    pub fn require(&self, name: &str) -> Result<ItemRef, RegistryError> {
        let key = RegistryKey::parse(name)?;
        self.get_by_key(&key).ok_or(RegistryError::UnknownItem(key))
    }

    /// The air kind.
    pub fn air(&self) -> ItemRef {
        self.items[0].clone()
    }

    /// Registered kinds in id order (air first).
    pub fn iter(&self) -> impl Iterator<Item = &ItemRef> {
        self.items.iter()
    }

    /// Number of registered kinds, air included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false: air is always registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
