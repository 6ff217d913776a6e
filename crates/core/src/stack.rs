//! Item stacks: an item kind, a count, a damage value and optional extended
//! state.
//!
//! Several raw states mean "no item": no kind, the air kind, a count of zero
//! or less, or a damage value outside `[-32768, 65535]`. They all collapse
//! to one canonical empty state, exposed through [`Stack::is_empty`]; never
//! inspect the raw fields to decide emptiness.
//!
//! The emptiness flag is recomputed whenever the count changes. Damage and
//! tag changes do not touch it.

use crate::attribute::{AttributeModifier, AttributeMultimap, EquipmentSlot};
use crate::enchantment::{self, Enchantment, EnchantmentType};
use crate::item::{
    EntityId, ItemHolder, ItemRef, ItemRegistry, Localizer, Rarity, UseAction, DEFAULT_STACK_SIZE,
};
use crate::registry::{BlockId, BlockLookup, AIR_KEY};
use crate::tag::{Tag, TagCompound, TAG_COMPOUND, TAG_INT, TAG_LIST, TAG_STRING};
use rand::Rng;
use std::cell::Cell;
use std::fmt;
use tracing::debug;

/// Smallest damage value a non-empty stack may carry.
pub const MIN_DAMAGE: i32 = -32768;
/// Largest damage value a non-empty stack may carry.
pub const MAX_DAMAGE: i32 = 65535;

/// Keys of the persisted stack document and its `tag` entry.
pub mod keys {
    /// Item identifier.
    pub const ID: &str = "id";
    /// Count (byte).
    pub const COUNT: &str = "Count";
    /// Damage (short).
    pub const DAMAGE: &str = "Damage";
    /// Extended state.
    pub const TAG: &str = "tag";
    /// Display sub-compound.
    pub const DISPLAY: &str = "display";
    /// Custom name inside `display`.
    pub const NAME: &str = "Name";
    /// Localization key inside `display`.
    pub const LOC_NAME: &str = "LocName";
    /// Enchantment list.
    pub const ENCHANTMENTS: &str = "ench";
    /// Enchantment id inside an `ench` entry.
    pub const ENCHANTMENT_ID: &str = "id";
    /// Enchantment level inside an `ench` entry.
    pub const ENCHANTMENT_LEVEL: &str = "lvl";
    /// Attribute modifier list.
    pub const ATTRIBUTE_MODIFIERS: &str = "AttributeModifiers";
    /// Attribute name inside a modifier entry.
    pub const ATTRIBUTE_NAME: &str = "AttributeName";
    /// Equipment slot inside a modifier entry.
    pub const SLOT: &str = "Slot";
    /// Anvil repair cost.
    pub const REPAIR_COST: &str = "RepairCost";
    /// Blocks this stack may break.
    pub const CAN_DESTROY: &str = "CanDestroy";
    /// Blocks this stack may be placed on.
    pub const CAN_PLACE_ON: &str = "CanPlaceOn";
    /// Disables durability damage.
    pub const UNBREAKABLE: &str = "Unbreakable";
    /// Block entity data carried by placeable items.
    pub const BLOCK_ENTITY_TAG: &str = "BlockEntityTag";
}

/// Result of applying durability damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Nothing happened: the item is not damageable or every point was negated.
    Unchanged,
    /// Damage was applied and the item survived.
    Damaged,
    /// Damage pushed the item past its durability.
    Broken,
}

impl DamageOutcome {
    /// True for [`DamageOutcome::Broken`].
    pub fn is_broken(self) -> bool {
        self == DamageOutcome::Broken
    }
}

/// One-slot memo for a block permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PermissionCache {
    block: BlockId,
    allowed: bool,
}

/// A quantity of one item kind plus its damage value and extended state.
///
/// `Clone` deep-copies the extended state; the clone starts with cold
/// permission caches and no item-frame handle.
#[derive(Debug)]
pub struct Stack {
    item: Option<ItemRef>,
    count: i32,
    damage: i32,
    tag: Option<TagCompound>,
    empty: bool,
    animations_to_go: i32,
    item_frame: Option<EntityId>,
    can_destroy_cache: Cell<Option<PermissionCache>>,
    can_place_on_cache: Cell<Option<PermissionCache>>,
}

impl Stack {
    /// Create a stack. Negative damage is clamped to 0.
    pub fn new(item: ItemRef, count: i32, damage: i32) -> Self {
        Self::from_parts(Some(item), count, damage)
    }

    /// A single item with no damage.
    pub fn of(item: ItemRef) -> Self {
        Self::new(item, 1, 0)
    }

    /// `count` items with no damage.
    pub fn with_count(item: ItemRef, count: i32) -> Self {
        Self::new(item, count, 0)
    }

    /// The canonical empty stack.
    pub fn empty() -> Self {
        Self::from_parts(None, 0, 0)
    }

    fn from_parts(item: Option<ItemRef>, count: i32, damage: i32) -> Self {
        let mut stack = Self {
            item,
            count,
            damage: damage.max(0),
            tag: None,
            empty: true,
            animations_to_go: 0,
            item_frame: None,
            can_destroy_cache: Cell::new(None),
            can_place_on_cache: Cell::new(None),
        };
        stack.update_empty_state();
        stack
    }

    fn update_empty_state(&mut self) {
        let empty = match &self.item {
            Some(item) if !item.is_air() => {
                self.count <= 0 || self.damage < MIN_DAMAGE || self.damage > MAX_DAMAGE
            }
            _ => true,
        };
        if empty != self.empty {
            self.invalidate_permission_caches();
        }
        self.empty = empty;
    }

    /// Decode a persisted stack document.
    ///
    /// Unknown identifiers (and `minecraft:air`) decode to an empty stack
    /// rather than an error so that data written by other versions still
    /// loads.
    pub fn decode(document: &TagCompound, registry: &ItemRegistry) -> Self {
        let name = document.get_string(keys::ID);
        let item = registry
            .get_by_name_or_id(name)
            .filter(|item| !item.is_air());
        if item.is_none() && !name.is_empty() && name != AIR_KEY {
            debug!(id = name, "unresolved item id, decoding as empty stack");
        }

        let count = i32::from(document.get_byte(keys::COUNT));
        let damage = i32::from(document.get_short(keys::DAMAGE));
        let mut stack = Self::from_parts(item, count, damage);

        if document.contains(keys::TAG, TAG_COMPOUND) {
            let mut upgraded = document.clone();
            if let Some(item) = &stack.item {
                item.kind().upgrade_persisted(&mut upgraded);
            }
            stack.tag = match upgraded.remove(keys::TAG) {
                Some(Tag::Compound(tag)) => Some(tag),
                _ => None,
            };
        }
        stack
    }

    /// Encode into a persisted stack document.
    ///
    /// Empty stacks are written under `minecraft:air` with their stored
    /// count and damage; count and damage are truncated to byte and short.
    pub fn encode(&self) -> TagCompound {
        let mut document = TagCompound::new();
        let id = match self.item() {
            Some(item) => item.key().to_string(),
            None => AIR_KEY.to_string(),
        };
        document.put_string(keys::ID, id);
        document.put_byte(keys::COUNT, self.count as i8);
        document.put_short(keys::DAMAGE, self.damage as i16);
        if let Some(tag) = &self.tag {
            document.insert(keys::TAG, Tag::Compound(tag.clone()));
        }
        document
    }

    /// True when this stack represents "no item".
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// The item kind, or `None` when empty.
    pub fn item(&self) -> Option<&ItemRef> {
        if self.empty {
            None
        } else {
            self.item.as_ref()
        }
    }

    /// Item count; always 0 for an empty stack.
    pub fn count(&self) -> i32 {
        if self.empty {
            0
        } else {
            self.count
        }
    }

    /// Set the count.
    pub fn set_count(&mut self, count: i32) {
        self.count = count;
        self.update_empty_state();
    }

    /// Add to the count.
    pub fn grow(&mut self, amount: i32) {
        self.set_count(self.count.saturating_add(amount));
    }

    /// Subtract from the count.
    pub fn shrink(&mut self, amount: i32) {
        self.set_count(self.count.saturating_sub(amount));
    }

    /// Take up to `amount` items into a new stack, removing them from this
    /// one. The two stacks never share extended state.
    pub fn split(&mut self, amount: i32) -> Stack {
        let taken = amount.min(self.count);
        let mut split = self.clone();
        split.set_count(taken);
        self.shrink(taken);
        split
    }

    /// Damage value (durability used, or sub-kind selector).
    pub fn damage(&self) -> i32 {
        self.damage
    }

    /// Alias of [`Stack::damage`] for items with subtypes.
    pub fn metadata(&self) -> i32 {
        self.damage
    }

    /// Set the damage value; negative values become 0.
    pub fn set_damage(&mut self, damage: i32) {
        self.damage = damage.max(0);
    }

    /// Largest count this stack's kind allows.
    pub fn max_stack_size(&self) -> i32 {
        self.item()
            .map_or(DEFAULT_STACK_SIZE, |item| item.kind().max_stack_size())
    }

    /// Durability of the kind.
    pub fn max_damage(&self) -> i32 {
        self.item().map_or(0, |item| item.kind().max_damage())
    }

    /// True when the kind uses damage as a sub-kind selector.
    pub fn has_subtypes(&self) -> bool {
        self.item().map_or(false, |item| item.kind().has_subtypes())
    }

    /// True when the stack can hold more than one item.
    pub fn is_stackable(&self) -> bool {
        self.max_stack_size() > 1 && (!self.is_damageable() || !self.is_damaged())
    }

    /// True when durability damage applies: the kind has durability and the
    /// stack is not flagged `Unbreakable`.
    pub fn is_damageable(&self) -> bool {
        match self.item() {
            Some(item) if item.kind().max_damage() > 0 => !self
                .tag
                .as_ref()
                .map_or(false, |tag| tag.get_bool(keys::UNBREAKABLE)),
            _ => false,
        }
    }

    /// True when a damageable stack has taken damage.
    pub fn is_damaged(&self) -> bool {
        self.is_damageable() && self.damage > 0
    }

    /// Apply `amount` points of durability damage.
    ///
    /// Each point may be negated by Unbreaking, rolled on `rng`. `damager`
    /// is told about the new damage value only when damage is applied.
    pub fn attempt_damage<R: Rng + ?Sized>(
        &mut self,
        amount: i32,
        rng: &mut R,
        damager: Option<&mut dyn ItemHolder>,
    ) -> DamageOutcome {
        if !self.is_damageable() {
            return DamageOutcome::Unchanged;
        }

        let level = self.enchantment_level(EnchantmentType::Unbreaking);
        let negated = if level > 0 && amount > 0 {
            let is_armor = self.item().map_or(false, |item| item.kind().is_armor());
            (0..amount)
                .filter(|_| enchantment::negate_damage(is_armor, level, rng))
                .count() as i32
        } else {
            0
        };
        let effective = amount - negated;
        if effective <= 0 {
            return DamageOutcome::Unchanged;
        }

        let new_damage = self.damage.saturating_add(effective);
        if let Some(damager) = damager {
            damager.on_durability_changed(self, new_damage);
        }
        self.damage = new_damage;
        if self.damage > self.max_damage() {
            DamageOutcome::Broken
        } else {
            DamageOutcome::Damaged
        }
    }

    /// Damage from use by `holder`. A broken item notifies the holder, loses
    /// one from its count and starts over at zero damage.
    ///
    /// Callers exempt from durability (creative mode) should not call this.
    pub fn damage_item<R: Rng + ?Sized>(
        &mut self,
        amount: i32,
        rng: &mut R,
        holder: &mut dyn ItemHolder,
    ) -> DamageOutcome {
        let outcome = self.attempt_damage(amount, rng, Some(&mut *holder));
        if outcome.is_broken() {
            holder.on_item_broken(self);
            self.shrink(1);
            self.damage = 0;
        }
        outcome
    }

    /// Extended-state equality: two empty stacks are equal, an empty and a
    /// non-empty stack never are, and a missing tag only equals a missing
    /// tag.
    pub fn tags_equal(a: &Stack, b: &Stack) -> bool {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => true,
            (false, false) => a.tag == b.tag,
            _ => false,
        }
    }

    /// Full equality: kind, count, damage and extended state.
    pub fn stacks_equal(a: &Stack, b: &Stack) -> bool {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => true,
            (false, false) => {
                a.count == b.count && a.item == b.item && a.damage == b.damage && a.tag == b.tag
            }
            _ => false,
        }
    }

    /// Kind and damage equality; count and extended state are ignored.
    pub fn items_equal(a: &Stack, b: &Stack) -> bool {
        std::ptr::eq(a, b) || (!a.is_empty() && !b.is_empty() && a.is_item_equal(b))
    }

    /// Like [`Stack::items_equal`], but every damage value of a damageable
    /// kind counts as the same item.
    pub fn items_equal_ignore_durability(a: &Stack, b: &Stack) -> bool {
        std::ptr::eq(a, b)
            || (!a.is_empty() && !b.is_empty() && a.is_item_equal_ignore_durability(b))
    }

    /// Kind and damage match `other`, which must not be empty.
    pub fn is_item_equal(&self, other: &Stack) -> bool {
        !other.is_empty() && self.item == other.item && self.damage == other.damage
    }

    /// Kind matches `other`; damage only matters for non-damageable kinds.
    pub fn is_item_equal_ignore_durability(&self, other: &Stack) -> bool {
        if !self.is_damageable() {
            return self.is_item_equal(other);
        }
        !other.is_empty() && self.item == other.item
    }

    /// True when a non-empty stack carries extended state.
    pub fn has_tag(&self) -> bool {
        !self.empty && self.tag.is_some()
    }

    /// Extended state, if any.
    pub fn tag(&self) -> Option<&TagCompound> {
        self.tag.as_ref()
    }

    /// Mutable extended state, if any.
    pub fn tag_mut(&mut self) -> Option<&mut TagCompound> {
        self.invalidate_permission_caches();
        self.tag.as_mut()
    }

    /// Replace the extended state.
    pub fn set_tag(&mut self, tag: Option<TagCompound>) {
        self.invalidate_permission_caches();
        self.tag = tag;
    }

    fn tag_or_insert(&mut self) -> &mut TagCompound {
        self.invalidate_permission_caches();
        self.tag.get_or_insert_with(TagCompound::new)
    }

    /// Store one entry in the extended state, creating it if needed.
    pub fn set_tag_info(&mut self, key: &str, value: Tag) {
        self.tag_or_insert().insert(key, value);
    }

    /// Borrow a nested compound of the extended state.
    pub fn sub_compound(&self, key: &str) -> Option<&TagCompound> {
        self.tag.as_ref().and_then(|tag| tag.get_compound(key))
    }

    /// Borrow a nested compound, creating it (and the extended state) if needed.
    pub fn get_or_create_sub_compound(&mut self, key: &str) -> &mut TagCompound {
        self.tag_or_insert().compound_mut(key)
    }

    /// Remove a nested compound.
    pub fn remove_sub_compound(&mut self, key: &str) {
        if let Some(tag) = self.tag.as_mut() {
            if tag.contains(key, TAG_COMPOUND) {
                tag.remove(key);
            }
        }
    }

    /// Name shown to players: the custom name, else the localized
    /// `LocName`, else the kind's own name.
    pub fn display_name(&self, localizer: &dyn Localizer) -> String {
        if let Some(display) = self.sub_compound(keys::DISPLAY) {
            if display.contains(keys::NAME, TAG_STRING) {
                return display.get_string(keys::NAME).to_string();
            }
            if display.contains(keys::LOC_NAME, TAG_STRING) {
                return localizer.translate(display.get_string(keys::LOC_NAME));
            }
        }
        match self.item() {
            Some(item) => item.kind().display_name(self, localizer),
            None => localizer
                .translate(&format!("{}.name", self.translation_key()))
                .trim()
                .to_string(),
        }
    }

    /// Give this stack a custom name.
    pub fn set_custom_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.get_or_create_sub_compound(keys::DISPLAY)
            .put_string(keys::NAME, name);
        self
    }

    /// Name this stack by localization key.
    pub fn set_translatable_name(&mut self, key: impl Into<String>) -> &mut Self {
        self.get_or_create_sub_compound(keys::DISPLAY)
            .put_string(keys::LOC_NAME, key);
        self
    }

    /// Remove the custom name, dropping the `display` compound and the
    /// extended state itself when they end up empty.
    pub fn clear_custom_name(&mut self) {
        let Some(tag) = self.tag.as_mut() else {
            return;
        };
        if let Some(display) = tag.get_compound_mut(keys::DISPLAY) {
            display.remove(keys::NAME);
            if display.is_empty() {
                tag.remove(keys::DISPLAY);
            }
        }
        if tag.is_empty() {
            self.tag = None;
        }
    }

    /// True when a custom name is set.
    pub fn has_custom_name(&self) -> bool {
        self.sub_compound(keys::DISPLAY)
            .map_or(false, |display| display.contains(keys::NAME, TAG_STRING))
    }

    /// Localization key of the kind.
    pub fn translation_key(&self) -> String {
        match self.item() {
            Some(item) => item.kind().translation_key(self),
            None => "tile.air".to_string(),
        }
    }

    /// Rarity tier.
    pub fn rarity(&self) -> Rarity {
        self.item()
            .map_or(Rarity::Common, |item| item.kind().rarity(self))
    }

    /// Raw `ench` entries.
    pub fn enchantment_tags(&self) -> &[Tag] {
        match &self.tag {
            Some(tag) => tag.get_list(keys::ENCHANTMENTS, TAG_COMPOUND),
            None => &[],
        }
    }

    /// Known enchantments, in stored order. Unknown ids are skipped.
    pub fn enchantments(&self) -> Vec<Enchantment> {
        self.enchantment_tags()
            .iter()
            .filter_map(Tag::as_compound)
            .filter_map(|entry| {
                let kind = EnchantmentType::from_id(entry.get_short(keys::ENCHANTMENT_ID))?;
                let level = entry.get_short(keys::ENCHANTMENT_LEVEL).clamp(0, 255) as u8;
                Some(Enchantment {
                    enchantment_type: kind,
                    level,
                })
            })
            .collect()
    }

    /// Level of `kind` on this stack, 0 when absent or when the stack is empty.
    pub fn enchantment_level(&self, kind: EnchantmentType) -> i32 {
        if self.empty {
            return 0;
        }
        self.enchantment_tags()
            .iter()
            .filter_map(Tag::as_compound)
            .find(|entry| entry.get_short(keys::ENCHANTMENT_ID) == kind.id())
            .map_or(0, |entry| i32::from(entry.get_short(keys::ENCHANTMENT_LEVEL)))
    }

    /// Append an enchantment entry.
    pub fn add_enchantment(&mut self, enchantment: Enchantment) {
        let mut entry = TagCompound::new();
        entry.put_short(keys::ENCHANTMENT_ID, enchantment.enchantment_type.id());
        entry.put_short(keys::ENCHANTMENT_LEVEL, i16::from(enchantment.level));
        self.tag_or_insert()
            .list_mut(keys::ENCHANTMENTS)
            .push(Tag::Compound(entry));
    }

    /// True when at least one enchantment entry is present.
    pub fn is_enchanted(&self) -> bool {
        self.tag.as_ref().map_or(false, |tag| {
            tag.contains(keys::ENCHANTMENTS, TAG_LIST)
                && !tag.get_list(keys::ENCHANTMENTS, TAG_COMPOUND).is_empty()
        })
    }

    /// True when the kind accepts enchanting and nothing is enchanted yet.
    pub fn is_enchantable(&self) -> bool {
        self.item()
            .map_or(false, |item| item.kind().is_enchantable(self))
            && !self.is_enchanted()
    }

    /// Anvil repair cost, 0 when unset.
    pub fn repair_cost(&self) -> i32 {
        match &self.tag {
            Some(tag) if self.has_tag() && tag.contains(keys::REPAIR_COST, TAG_INT) => {
                tag.get_int(keys::REPAIR_COST)
            }
            _ => 0,
        }
    }

    /// Set the anvil repair cost.
    pub fn set_repair_cost(&mut self, cost: i32) {
        self.tag_or_insert().put_int(keys::REPAIR_COST, cost);
    }

    /// Attribute modifiers active in `slot`.
    ///
    /// An explicit `AttributeModifiers` list replaces the kind's defaults.
    /// Entries without a `Slot` apply to every slot; entries that fail to
    /// parse, name no attribute, or whose id has a zero half are skipped.
    pub fn attribute_modifiers(&self, slot: EquipmentSlot) -> AttributeMultimap {
        let explicit = self
            .tag
            .as_ref()
            .filter(|tag| self.has_tag() && tag.contains(keys::ATTRIBUTE_MODIFIERS, TAG_LIST));

        let Some(tag) = explicit else {
            return self
                .item()
                .map(|item| item.kind().default_attribute_modifiers(slot))
                .unwrap_or_default();
        };

        let mut modifiers = AttributeMultimap::new();
        for entry in tag
            .get_list(keys::ATTRIBUTE_MODIFIERS, TAG_COMPOUND)
            .iter()
            .filter_map(Tag::as_compound)
        {
            if entry.contains(keys::SLOT, TAG_STRING) && entry.get_string(keys::SLOT) != slot.name()
            {
                continue;
            }
            let attribute = entry.get_string(keys::ATTRIBUTE_NAME);
            match AttributeModifier::from_tag(entry) {
                Some(modifier) if modifier.has_valid_id() && !attribute.is_empty() => {
                    modifiers.put(attribute, modifier);
                }
                _ => debug!(attribute, "skipping invalid attribute modifier"),
            }
        }
        modifiers
    }

    /// Append an explicit attribute modifier, optionally limited to one slot.
    pub fn add_attribute_modifier(
        &mut self,
        attribute: &str,
        modifier: &AttributeModifier,
        slot: Option<EquipmentSlot>,
    ) {
        let mut entry = modifier.to_tag();
        entry.put_string(keys::ATTRIBUTE_NAME, attribute);
        if let Some(slot) = slot {
            entry.put_string(keys::SLOT, slot.name());
        }
        self.tag_or_insert()
            .list_mut(keys::ATTRIBUTE_MODIFIERS)
            .push(Tag::Compound(entry));
    }

    /// True when the `CanDestroy` list names `block`.
    pub fn can_destroy(&self, block: BlockId, blocks: &dyn BlockLookup) -> bool {
        self.check_permission(&self.can_destroy_cache, keys::CAN_DESTROY, block, blocks)
    }

    /// True when the `CanPlaceOn` list names `block`.
    pub fn can_place_on(&self, block: BlockId, blocks: &dyn BlockLookup) -> bool {
        self.check_permission(&self.can_place_on_cache, keys::CAN_PLACE_ON, block, blocks)
    }

    // Remembers only the last block asked about.
    fn check_permission(
        &self,
        cache: &Cell<Option<PermissionCache>>,
        key: &str,
        block: BlockId,
        blocks: &dyn BlockLookup,
    ) -> bool {
        if let Some(hit) = cache.get().filter(|hit| hit.block == block) {
            return hit.allowed;
        }

        let allowed = self.has_tag()
            && self.tag.as_ref().map_or(false, |tag| {
                tag.get_list(key, TAG_STRING)
                    .iter()
                    .filter_map(Tag::as_str)
                    .any(|name| blocks.block_by_name(name) == Some(block))
            });
        cache.set(Some(PermissionCache { block, allowed }));
        allowed
    }

    fn invalidate_permission_caches(&self) {
        self.can_destroy_cache.set(None);
        self.can_place_on_cache.set(None);
    }

    /// Remember the item frame displaying this stack.
    pub fn set_item_frame(&mut self, frame: Option<EntityId>) {
        self.item_frame = frame;
    }

    /// Item frame displaying this stack; `None` when empty.
    pub fn item_frame(&self) -> Option<EntityId> {
        if self.empty {
            None
        } else {
            self.item_frame
        }
    }

    /// True when an item frame handle is set.
    pub fn is_on_item_frame(&self) -> bool {
        self.item_frame.is_some()
    }

    /// Remaining pickup animation ticks.
    pub fn animations_to_go(&self) -> i32 {
        self.animations_to_go
    }

    /// Set the pickup animation ticks.
    pub fn set_animations_to_go(&mut self, ticks: i32) {
        self.animations_to_go = ticks;
    }

    /// Per-tick inventory update: advances the pickup animation and runs the
    /// kind's update hook.
    pub fn update_animation(&mut self, holder: &mut dyn ItemHolder) {
        if self.animations_to_go > 0 {
            self.animations_to_go -= 1;
        }
        if let Some(item) = self.item.clone() {
            item.kind().on_update(self, holder);
        }
    }

    /// Ticks a timed use takes.
    pub fn max_use_duration(&self) -> i32 {
        self.item()
            .map_or(0, |item| item.kind().max_use_duration(self))
    }

    /// Animation while in use.
    pub fn use_action(&self) -> UseAction {
        self.item()
            .map_or(UseAction::None, |item| item.kind().use_action(self))
    }

    /// Complete a timed use, returning the stack the holder keeps.
    pub fn on_use_finish(self, holder: &mut dyn ItemHolder) -> Stack {
        let Some(item) = self.item().cloned() else {
            return self;
        };
        item.kind().on_use_finish(self, holder)
    }

    /// The holder released a timed use with `time_left` ticks remaining.
    pub fn on_stopped_using(&mut self, holder: &mut dyn ItemHolder, time_left: i32) {
        if let Some(item) = self.item().cloned() {
            item.kind().on_stopped_using(self, holder, time_left);
        }
    }

    /// The stack was just crafted as `amount` items by `holder`.
    pub fn on_crafting(&mut self, holder: &mut dyn ItemHolder, amount: i32) {
        let Some(item) = self.item().cloned() else {
            return;
        };
        holder.on_item_crafted(self, amount);
        item.kind().on_crafted(self, holder);
    }

    /// `attacker` hit `target` with this stack.
    pub fn hit_entity(&mut self, target: EntityId, attacker: &mut dyn ItemHolder) {
        let Some(item) = self.item().cloned() else {
            return;
        };
        if item.kind().hit_entity(self, target, attacker) {
            attacker.on_item_used(self);
        }
    }

    /// `holder` broke `block` with this stack.
    pub fn on_block_destroyed(&mut self, block: BlockId, holder: &mut dyn ItemHolder) {
        let Some(item) = self.item().cloned() else {
            return;
        };
        if item.kind().on_block_destroyed(self, block, holder) {
            holder.on_item_used(self);
        }
    }

    /// Mining speed multiplier against `block`; 1.0 for an empty stack.
    pub fn destroy_speed(&self, block: BlockId) -> f32 {
        self.item()
            .map_or(1.0, |item| item.kind().destroy_speed(self, block))
    }

    /// Whether breaking `block` with this stack drops the block's item.
    pub fn can_harvest_block(&self, block: BlockId) -> bool {
        self.item()
            .map_or(false, |item| item.kind().can_harvest_block(block))
    }

    /// Whether the holder may edit blocks with this stack in hand.
    pub fn can_edit_blocks(&self) -> bool {
        self.item().map_or(false, |item| item.kind().can_edit_blocks())
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::empty()
    }
}

impl Clone for Stack {
    fn clone(&self) -> Self {
        let mut copy = Self::from_parts(self.item.clone(), self.count, self.damage);
        copy.animations_to_go = self.animations_to_go;
        copy.tag = self.tag.clone();
        copy
    }
}

/// Full equality, see [`Stack::stacks_equal`].
impl PartialEq for Stack {
    fn eq(&self, other: &Self) -> bool {
        Stack::stacks_equal(self, other)
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}", self.count(), self.translation_key(), self.damage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Operation;
    use crate::item::NoHolder;
    use crate::registry::BlockRegistry;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashMap;
    use uuid::Uuid;

    const ITEMS: &str = r#"
    [
      { "key": "minecraft:stone" },
      { "key": "minecraft:wool", "has_subtypes": true },
      { "key": "minecraft:shears", "max_stack_size": 1, "max_damage": 10 },
      { "key": "minecraft:diamond_chestplate", "max_stack_size": 1, "max_damage": 528, "armor": true },
      {
        "key": "minecraft:diamond_sword",
        "max_stack_size": 1,
        "max_damage": 1561,
        "attributes": [
          {
            "slot": "mainhand",
            "attribute": "generic.attackDamage",
            "name": "Weapon modifier",
            "amount": 7.0,
            "uuid": "cb3f55d3-645c-4f38-a497-9c13a33db5cf"
          }
        ]
      }
    ]
    "#;

    fn items() -> ItemRegistry {
        ItemRegistry::load_from_str(ITEMS).expect("fixture items")
    }

    fn item(registry: &ItemRegistry, name: &str) -> ItemRef {
        registry.get(name).expect("fixture item")
    }

    #[derive(Default)]
    struct Recorder {
        broken: Vec<String>,
        durability: Vec<i32>,
    }

    impl ItemHolder for Recorder {
        fn on_item_broken(&mut self, stack: &Stack) {
            self.broken.push(stack.translation_key());
        }

        fn on_durability_changed(&mut self, _stack: &Stack, new_damage: i32) {
            self.durability.push(new_damage);
        }
    }

    #[test]
    fn emptiness_collapses_every_raw_state() {
        let registry = items();
        let stone = item(&registry, "stone");

        assert!(Stack::empty().is_empty());
        assert!(Stack::new(registry.air(), 5, 0).is_empty());
        assert!(Stack::new(stone.clone(), 0, 0).is_empty());
        assert!(Stack::new(stone.clone(), -3, 0).is_empty());
        assert!(Stack::new(stone.clone(), 1, MAX_DAMAGE + 1).is_empty());
        assert!(!Stack::new(stone.clone(), 1, MAX_DAMAGE).is_empty());

        let empty = Stack::new(stone, -3, 0);
        assert_eq!(empty.count(), 0);
        assert!(empty.item().is_none());
    }

    #[test]
    fn negative_damage_is_clamped() {
        let registry = items();
        let mut stack = Stack::new(item(&registry, "wool"), 1, -7);
        assert_eq!(stack.damage(), 0);
        stack.set_damage(-1);
        assert_eq!(stack.damage(), 0);
        stack.set_damage(14);
        assert_eq!(stack.metadata(), 14);
    }

    #[test]
    fn split_grow_shrink_scenario() {
        let registry = items();
        let mut original = Stack::with_count(item(&registry, "stone"), 5);

        let split = original.split(3);
        assert_eq!(split.count(), 3);
        assert_eq!(original.count(), 2);

        original.grow(10);
        assert_eq!(original.count(), 12);

        original.shrink(20);
        assert!(original.is_empty());
        assert_eq!(original.count(), 0);
    }

    #[test]
    fn split_takes_at_most_count_and_detaches_tags() {
        let registry = items();
        let mut original = Stack::with_count(item(&registry, "stone"), 4);
        original.set_custom_name("Rock");

        let mut split = original.split(10);
        assert_eq!(split.count(), 4);
        assert!(original.is_empty());

        split.set_custom_name("Pebble");
        assert_eq!(original.display_name(&RawKeysForTest), "Rock");
        assert_eq!(split.display_name(&RawKeysForTest), "Pebble");
    }

    struct RawKeysForTest;

    impl Localizer for RawKeysForTest {
        fn translate(&self, key: &str) -> String {
            format!("<{key}>")
        }
    }

    #[test]
    fn display_name_prefers_custom_then_localized_then_kind() {
        let registry = items();
        let mut stack = Stack::of(item(&registry, "stone"));
        assert_eq!(stack.display_name(&RawKeysForTest), "<item.stone.name>");

        stack.set_translatable_name("custom.rock");
        assert_eq!(stack.display_name(&RawKeysForTest), "<custom.rock>");

        stack.set_custom_name("Rock");
        assert!(stack.has_custom_name());
        assert_eq!(stack.display_name(&RawKeysForTest), "Rock");

        stack.clear_custom_name();
        assert!(!stack.has_custom_name());
        assert_eq!(stack.display_name(&RawKeysForTest), "<custom.rock>");
    }

    #[test]
    fn clear_custom_name_drops_empty_tag() {
        let registry = items();
        let mut stack = Stack::of(item(&registry, "stone"));
        stack.set_custom_name("Rock");
        stack.clear_custom_name();
        assert!(stack.tag().is_none());
    }

    #[test]
    fn tag_equality_distinguishes_absent_from_empty() {
        let registry = items();
        let stone = item(&registry, "stone");
        let plain = Stack::of(stone.clone());
        let mut with_empty_tag = Stack::of(stone.clone());
        with_empty_tag.set_tag(Some(TagCompound::new()));

        assert!(Stack::tags_equal(&plain, &plain.clone()));
        assert!(!Stack::tags_equal(&plain, &with_empty_tag));
        assert!(!Stack::tags_equal(&with_empty_tag, &plain));
        assert!(Stack::tags_equal(&Stack::empty(), &Stack::new(stone.clone(), 0, 0)));
        assert!(!Stack::tags_equal(&Stack::empty(), &plain));
    }

    #[test]
    fn full_equality_checks_count_kind_damage_and_tag() {
        let registry = items();
        let wool = item(&registry, "wool");
        let a = Stack::new(wool.clone(), 2, 3);

        assert_eq!(a, Stack::new(wool.clone(), 2, 3));
        assert_ne!(a, Stack::new(wool.clone(), 1, 3));
        assert_ne!(a, Stack::new(wool.clone(), 2, 4));
        assert_ne!(a, Stack::new(item(&registry, "stone"), 2, 3));

        let mut named = a.clone();
        named.set_custom_name("Red");
        assert_ne!(a, named);
        assert_eq!(Stack::empty(), Stack::new(wool, 0, 9));
    }

    #[test]
    fn items_equal_ignores_count_and_tag() {
        let registry = items();
        let wool = item(&registry, "wool");
        let mut a = Stack::new(wool.clone(), 2, 3);
        a.set_custom_name("Red");
        let b = Stack::new(wool.clone(), 9, 3);

        assert!(Stack::items_equal(&a, &b));
        assert!(!Stack::items_equal(&a, &Stack::new(wool, 2, 4)));
        assert!(!Stack::items_equal(&a, &Stack::empty()));

        let empty = Stack::empty();
        assert!(Stack::items_equal(&empty, &empty));
        assert!(!Stack::items_equal(&empty, &Stack::empty()));
    }

    #[test]
    fn ignore_durability_only_for_damageable_kinds() {
        let registry = items();
        let shears = item(&registry, "shears");
        let wool = item(&registry, "wool");

        assert!(Stack::items_equal_ignore_durability(
            &Stack::new(shears.clone(), 1, 2),
            &Stack::new(shears.clone(), 1, 8)
        ));
        assert!(!Stack::items_equal_ignore_durability(
            &Stack::new(wool.clone(), 1, 2),
            &Stack::new(wool, 1, 8)
        ));

        let mut unbreakable = Stack::new(shears.clone(), 1, 2);
        unbreakable.set_tag_info(keys::UNBREAKABLE, Tag::Byte(1));
        assert!(!unbreakable.is_damageable());
        assert!(!Stack::items_equal_ignore_durability(
            &unbreakable,
            &Stack::new(shears, 1, 8)
        ));
    }

    #[test]
    fn zero_damage_is_a_no_op() {
        let registry = items();
        let mut shears = Stack::new(item(&registry, "shears"), 1, 4);
        let mut rng = StdRng::seed_from_u64(1);
        let mut recorder = Recorder::default();

        assert_eq!(
            shears.attempt_damage(0, &mut rng, Some(&mut recorder)),
            DamageOutcome::Unchanged
        );
        assert_eq!(shears.damage(), 4);
        assert!(recorder.durability.is_empty());
    }

    #[test]
    fn damage_past_durability_breaks() {
        let registry = items();
        let mut shears = Stack::new(item(&registry, "shears"), 1, 9);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(shears.attempt_damage(2, &mut rng, None), DamageOutcome::Broken);
        assert_eq!(shears.damage(), 11);
    }

    #[test]
    fn huge_damage_saturates_instead_of_wrapping() {
        let registry = items();
        let mut shears = Stack::new(item(&registry, "shears"), 1, MAX_DAMAGE);
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = shears.attempt_damage(i32::MAX, &mut rng, None);
        assert_eq!(outcome, DamageOutcome::Broken);
        assert_eq!(shears.damage(), i32::MAX);
    }

    #[test]
    fn count_arithmetic_saturates() {
        let registry = items();
        let mut stone = Stack::with_count(item(&registry, "stone"), 64);
        stone.grow(i32::MAX);
        assert_eq!(stone.count(), i32::MAX);

        stone.shrink(i32::MIN);
        assert_eq!(stone.count(), i32::MAX);

        let mut few = Stack::with_count(item(&registry, "stone"), -5);
        few.shrink(i32::MAX);
        assert!(few.is_empty());
        assert_eq!(few.count(), 0);
    }

    #[test]
    fn damage_within_durability_reports_damaged() {
        let registry = items();
        let mut shears = Stack::new(item(&registry, "shears"), 1, 0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut recorder = Recorder::default();

        assert_eq!(
            shears.attempt_damage(3, &mut rng, Some(&mut recorder)),
            DamageOutcome::Damaged
        );
        assert_eq!(recorder.durability, vec![3]);
    }

    #[test]
    fn non_damageable_items_ignore_damage() {
        let registry = items();
        let mut stone = Stack::of(item(&registry, "stone"));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(stone.attempt_damage(5, &mut rng, None), DamageOutcome::Unchanged);
        assert_eq!(stone.damage(), 0);
    }

    #[test]
    fn unbreaking_negation_is_reproducible_and_bounded() {
        let registry = items();
        let make = || {
            let mut shears = Stack::new(item(&registry, "shears"), 1, 0);
            shears.add_enchantment(Enchantment::new(EnchantmentType::Unbreaking, 3));
            shears
        };

        let mut a = make();
        let mut b = make();
        let outcome_a = a.attempt_damage(8, &mut StdRng::seed_from_u64(77), None);
        let outcome_b = b.attempt_damage(8, &mut StdRng::seed_from_u64(77), None);

        assert_eq!(outcome_a, outcome_b);
        assert_eq!(a.damage(), b.damage());
        assert!(a.damage() <= 8);
    }

    #[test]
    fn broken_tool_shrinks_and_resets() {
        let registry = items();
        let mut shears = Stack::new(item(&registry, "shears"), 1, 10);
        let mut rng = StdRng::seed_from_u64(3);
        let mut recorder = Recorder::default();

        let outcome = shears.damage_item(1, &mut rng, &mut recorder);
        assert!(outcome.is_broken());
        assert!(shears.is_empty());
        assert_eq!(shears.damage(), 0);
        assert_eq!(recorder.broken, vec!["item.shears".to_string()]);
        assert_eq!(recorder.durability, vec![11]);
    }

    #[test]
    fn encode_writes_air_for_empty_stacks() {
        let registry = items();
        let empty = Stack::new(item(&registry, "stone"), 0, 3);
        let document = empty.encode();
        assert_eq!(document.get_string(keys::ID), AIR_KEY);
        assert_eq!(document.get_byte(keys::COUNT), 0);
        assert_eq!(document.get_short(keys::DAMAGE), 3);
        assert!(!document.contains_key(keys::TAG));
    }

    #[test]
    fn decode_round_trips_full_equality() {
        let registry = items();
        let mut stack = Stack::new(item(&registry, "wool"), 12, 5);
        stack.set_custom_name("Blue");
        stack.set_repair_cost(3);

        let back = Stack::decode(&stack.encode(), &registry);
        assert_eq!(back, stack);
        assert_eq!(back.repair_cost(), 3);
    }

    #[test]
    fn decode_unknown_id_yields_empty() {
        let registry = items();
        let mut document = TagCompound::new();
        document.put_string(keys::ID, "minecraft:emerald");
        document.put_byte(keys::COUNT, 4);
        document.put_short(keys::DAMAGE, -2);

        let stack = Stack::decode(&document, &registry);
        assert!(stack.is_empty());
        assert_eq!(stack.damage(), 0);
    }

    #[test]
    fn decode_clamps_negative_damage() {
        let registry = items();
        let mut document = TagCompound::new();
        document.put_string(keys::ID, "minecraft:wool");
        document.put_byte(keys::COUNT, 2);
        document.put_short(keys::DAMAGE, -5);

        let stack = Stack::decode(&document, &registry);
        assert_eq!(stack.count(), 2);
        assert_eq!(stack.damage(), 0);
    }

    #[test]
    fn encode_truncates_count_and_damage() {
        let registry = items();
        let stack = Stack::new(item(&registry, "wool"), 300, 70_000);
        let document = stack.encode();
        assert_eq!(document.get_byte(keys::COUNT), 300i32 as i8);
        assert_eq!(document.get_short(keys::DAMAGE), 70_000i32 as i16);
    }

    #[test]
    fn explicit_modifiers_replace_defaults_and_respect_slots() {
        let registry = items();
        let mut sword = Stack::of(item(&registry, "diamond_sword"));
        assert_eq!(
            sword
                .attribute_modifiers(EquipmentSlot::MainHand)
                .get("generic.attackDamage")
                .len(),
            1
        );

        let speed = AttributeModifier::new(
            Uuid::from_u64_pair(11, 12),
            "Speed",
            0.1,
            Operation::MultiplyTotal,
        );
        let armor = AttributeModifier::new(Uuid::from_u64_pair(21, 22), "Armor", 2.0, Operation::Add);
        sword.add_attribute_modifier("generic.movementSpeed", &speed, None);
        sword.add_attribute_modifier("generic.armor", &armor, Some(EquipmentSlot::Head));

        let main = sword.attribute_modifiers(EquipmentSlot::MainHand);
        assert!(main.get("generic.attackDamage").is_empty());
        assert_eq!(main.get("generic.movementSpeed").len(), 1);
        assert!(main.get("generic.armor").is_empty());

        let head = sword.attribute_modifiers(EquipmentSlot::Head);
        assert_eq!(head.len(), 2);
    }

    #[test]
    fn modifiers_with_zero_id_half_are_skipped() {
        let registry = items();
        let mut stone = Stack::of(item(&registry, "stone"));
        let bad = AttributeModifier::new(Uuid::from_u64_pair(0, 5), "Bad", 1.0, Operation::Add);
        stone.add_attribute_modifier("generic.luck", &bad, None);
        assert!(stone.attribute_modifiers(EquipmentSlot::MainHand).is_empty());
    }

    #[test]
    fn modifiers_without_attribute_name_are_skipped() {
        let registry = items();
        let mut stone = Stack::of(item(&registry, "stone"));
        let unnamed =
            AttributeModifier::new(Uuid::from_u64_pair(3, 4), "Unnamed", 2.0, Operation::Add);
        stone.set_tag_info(
            keys::ATTRIBUTE_MODIFIERS,
            Tag::List(vec![Tag::Compound(unnamed.to_tag())]),
        );

        let modifiers = stone.attribute_modifiers(EquipmentSlot::MainHand);
        assert!(modifiers.is_empty());
        assert!(modifiers.get("").is_empty());
    }

    struct CountingBlocks {
        inner: BlockRegistry,
        lookups: Cell<usize>,
    }

    impl BlockLookup for CountingBlocks {
        fn block_by_name(&self, name: &str) -> Option<BlockId> {
            self.lookups.set(self.lookups.get() + 1);
            self.inner.block_by_name(name)
        }
    }

    #[test]
    fn permission_cache_holds_one_block() {
        let registry = items();
        let blocks = CountingBlocks {
            inner: BlockRegistry::from_names(["air", "stone", "dirt"]),
            lookups: Cell::new(0),
        };
        let mut pick = Stack::of(item(&registry, "shears"));
        pick.set_tag_info(
            keys::CAN_DESTROY,
            Tag::List(vec![Tag::from("minecraft:stone")]),
        );

        assert!(pick.can_destroy(1, &blocks));
        let after_first = blocks.lookups.get();
        assert!(pick.can_destroy(1, &blocks));
        assert_eq!(blocks.lookups.get(), after_first);

        assert!(!pick.can_destroy(2, &blocks));
        assert_eq!(
            pick.can_destroy_cache.get(),
            Some(PermissionCache {
                block: 2,
                allowed: false
            })
        );
        assert!(pick.can_destroy(1, &blocks));
        assert!(blocks.lookups.get() > after_first);
        assert!(!pick.can_place_on(1, &blocks));
    }

    #[test]
    fn tag_mutation_invalidates_permission_caches() {
        let registry = items();
        let blocks = BlockRegistry::from_names(["air", "stone"]);
        let mut stack = Stack::of(item(&registry, "stone"));
        assert!(!stack.can_place_on(1, &blocks));

        stack.set_tag_info(keys::CAN_PLACE_ON, Tag::List(vec![Tag::from("stone")]));
        assert!(stack.can_place_on(1, &blocks));
    }

    #[test]
    fn emptying_a_stack_clears_permission_caches() {
        let registry = items();
        let blocks = BlockRegistry::from_names(["air", "stone"]);
        let mut stack = Stack::with_count(item(&registry, "stone"), 2);
        stack.set_tag_info(keys::CAN_DESTROY, Tag::List(vec![Tag::from("stone")]));
        assert!(stack.can_destroy(1, &blocks));

        stack.shrink(2);
        assert!(stack.is_empty());
        assert_eq!(stack.can_destroy_cache.get(), None);
        assert!(!stack.can_destroy(1, &blocks));
    }

    #[test]
    fn clone_deep_copies_and_resets_transients() {
        let registry = items();
        let mut stack = Stack::with_count(item(&registry, "stone"), 3);
        stack.set_custom_name("Rock");
        stack.set_animations_to_go(5);
        stack.set_item_frame(Some(EntityId(9)));

        let mut copy = stack.clone();
        assert_eq!(copy.animations_to_go(), 5);
        assert!(!copy.is_on_item_frame());
        assert_eq!(stack.item_frame(), Some(EntityId(9)));

        copy.set_custom_name("Other");
        assert!(!Stack::tags_equal(&stack, &copy));
    }

    #[test]
    fn item_frame_hidden_when_empty() {
        let registry = items();
        let mut stack = Stack::of(item(&registry, "stone"));
        stack.set_item_frame(Some(EntityId(4)));
        stack.shrink(1);
        assert!(stack.is_on_item_frame());
        assert_eq!(stack.item_frame(), None);
    }

    #[test]
    fn enchantments_round_trip_through_tag() {
        let registry = items();
        let mut sword = Stack::of(item(&registry, "diamond_sword"));
        assert!(sword.is_enchantable());
        assert_eq!(sword.rarity(), Rarity::Common);

        sword.add_enchantment(Enchantment::new(EnchantmentType::Sharpness, 4));
        assert!(sword.is_enchanted());
        assert!(!sword.is_enchantable());
        assert_eq!(sword.enchantment_level(EnchantmentType::Sharpness), 4);
        assert_eq!(sword.enchantment_level(EnchantmentType::Unbreaking), 0);
        assert_eq!(sword.rarity(), Rarity::Rare);
        assert_eq!(
            sword.enchantments(),
            vec![Enchantment::new(EnchantmentType::Sharpness, 4)]
        );
    }

    #[test]
    fn stackability_follows_kind_and_damage() {
        let registry = items();
        assert!(Stack::of(item(&registry, "stone")).is_stackable());
        assert!(!Stack::of(item(&registry, "shears")).is_stackable());
        assert_eq!(Stack::empty().max_stack_size(), DEFAULT_STACK_SIZE);
    }

    #[test]
    fn animation_counts_down_to_zero() {
        let registry = items();
        let mut stack = Stack::of(item(&registry, "stone"));
        stack.set_animations_to_go(2);
        let mut holder = NoHolder;
        for _ in 0..4 {
            stack.update_animation(&mut holder);
        }
        assert_eq!(stack.animations_to_go(), 0);
    }

    #[test]
    fn display_formats_count_key_and_damage() {
        let registry = items();
        let stack = Stack::new(item(&registry, "wool"), 3, 14);
        assert_eq!(stack.to_string(), "3xitem.wool.14@14");
        assert_eq!(Stack::empty().to_string(), "0xtile.air@0");
    }

    #[test]
    fn localized_names_use_hash_map_localizer() {
        let registry = items();
        let mut names = HashMap::new();
        names.insert("item.stone.name".to_string(), "Stone".to_string());
        assert_eq!(Stack::of(item(&registry, "stone")).display_name(&names), "Stone");
    }

    #[derive(Debug)]
    struct Sword {
        key: crate::registry::RegistryKey,
    }

    impl crate::item::ItemKind for Sword {
        fn key(&self) -> &crate::registry::RegistryKey {
            &self.key
        }

        fn max_damage(&self) -> i32 {
            59
        }

        fn hit_entity(
            &self,
            stack: &mut Stack,
            _target: EntityId,
            attacker: &mut dyn ItemHolder,
        ) -> bool {
            stack.damage_item(1, &mut StdRng::seed_from_u64(0), attacker);
            true
        }

        fn on_block_destroyed(
            &self,
            _stack: &mut Stack,
            block: BlockId,
            _holder: &mut dyn ItemHolder,
        ) -> bool {
            block != 0
        }

        fn on_crafted(&self, stack: &mut Stack, _holder: &mut dyn ItemHolder) {
            stack.set_custom_name("Fresh");
        }

        fn on_stopped_using(
            &self,
            stack: &mut Stack,
            _holder: &mut dyn ItemHolder,
            time_left: i32,
        ) {
            stack.set_animations_to_go(time_left);
        }

        fn destroy_speed(&self, _stack: &Stack, block: BlockId) -> f32 {
            if block == 1 {
                1.5
            } else {
                1.0
            }
        }

        fn can_harvest_block(&self, block: BlockId) -> bool {
            block == 1
        }
    }

    #[derive(Default)]
    struct UseCounter {
        used: usize,
        crafted: i32,
        durability: Vec<i32>,
    }

    impl ItemHolder for UseCounter {
        fn on_item_used(&mut self, _stack: &Stack) {
            self.used += 1;
        }

        fn on_item_crafted(&mut self, _stack: &Stack, amount: i32) {
            self.crafted += amount;
        }

        fn on_durability_changed(&mut self, _stack: &Stack, new_damage: i32) {
            self.durability.push(new_damage);
        }
    }

    fn sword() -> Stack {
        let mut registry = ItemRegistry::new();
        let kind = Sword {
            key: crate::registry::RegistryKey::parse("test:sword").unwrap(),
        };
        Stack::of(registry.register(std::sync::Arc::new(kind)).unwrap())
    }

    #[test]
    fn use_hooks_forward_to_the_kind() {
        let mut holder = UseCounter::default();
        let mut blade = sword();

        blade.hit_entity(EntityId(7), &mut holder);
        assert_eq!(blade.damage(), 1);
        assert_eq!(holder.durability, vec![1]);
        assert_eq!(holder.used, 1);

        blade.on_block_destroyed(0, &mut holder);
        assert_eq!(holder.used, 1);
        blade.on_block_destroyed(2, &mut holder);
        assert_eq!(holder.used, 2);

        blade.on_crafting(&mut holder, 1);
        assert_eq!(holder.crafted, 1);
        assert_eq!(blade.display_name(&crate::item::RawKeys), "Fresh");

        blade.on_stopped_using(&mut holder, 12);
        assert_eq!(blade.animations_to_go(), 12);

        assert_eq!(blade.destroy_speed(1), 1.5);
        assert!(blade.can_harvest_block(1));
        assert!(!blade.can_harvest_block(2));
        assert!(!blade.can_edit_blocks());
    }

    #[test]
    fn use_hooks_default_to_no_ops() {
        let registry = items();
        let mut holder = UseCounter::default();
        let mut stone = Stack::of(item(&registry, "stone"));

        stone.hit_entity(EntityId(1), &mut holder);
        stone.on_block_destroyed(1, &mut holder);
        stone.on_crafting(&mut holder, 3);
        assert_eq!(holder.used, 0);
        assert_eq!(holder.crafted, 3);
        assert!(!stone.has_tag());
        assert_eq!(stone.destroy_speed(1), 1.0);
        assert!(!stone.can_harvest_block(1));

        let mut empty = Stack::empty();
        empty.on_crafting(&mut holder, 5);
        assert_eq!(holder.crafted, 3);
        assert_eq!(empty.destroy_speed(1), 1.0);
    }
}
