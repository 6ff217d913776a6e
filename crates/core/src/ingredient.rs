//! Recipe-slot predicates over stacks.
//!
//! An [`Ingredient`] is an immutable set of `(item, variant)` matchers. A
//! matcher whose variant is [`WILDCARD_VARIANT`] accepts every variant of its
//! item. Each ingredient also exposes a sorted list of packed integer keys
//! that recipe indexes intersect to find candidate recipes quickly.

use crate::item::ItemRef;
use crate::stack::Stack;
use std::fmt;
use std::sync::OnceLock;

/// Variant value that matches any variant of an item.
pub const WILDCARD_VARIANT: i32 = 32767;

/// One accepted `(item, variant)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matcher {
    /// Accepted item.
    pub item: ItemRef,
    /// Accepted variant, or [`WILDCARD_VARIANT`].
    pub variant: i32,
}

impl Matcher {
    /// True when `item` at `variant` satisfies this matcher.
    pub fn accepts(&self, item: &ItemRef, variant: i32) -> bool {
        self.item == *item && (self.variant == WILDCARD_VARIANT || self.variant == variant)
    }

    /// Index key of this matcher, see [`pack`].
    pub fn packed(&self) -> i32 {
        pack(&self.item, self.variant)
    }
}

/// Fold an item id and variant into one index key: `id << 16 | variant`.
/// Items without subtypes always pack with variant 0.
pub fn pack(item: &ItemRef, variant: i32) -> i32 {
    let variant = if item.kind().has_subtypes() { variant } else { 0 };
    (i32::from(item.id()) << 16) | (variant & 0xFFFF)
}

/// Index key of a candidate stack; `None` for empty stacks.
pub fn pack_stack(stack: &Stack) -> Option<i32> {
    stack.item().map(|item| pack(item, stack.metadata()))
}

/// Immutable predicate deciding whether a stack fits a recipe slot.
///
/// Safe to share between threads; the packed key list is computed on first
/// use and published once.
pub struct Ingredient {
    matchers: Vec<Matcher>,
    packed: OnceLock<Vec<i32>>,
}

static EMPTY: Ingredient = Ingredient {
    matchers: Vec::new(),
    packed: OnceLock::new(),
};

impl Ingredient {
    /// The shared predicate that only accepts empty stacks.
    pub fn empty() -> &'static Ingredient {
        &EMPTY
    }

    /// Build from matchers directly. No matchers yields a predicate equal
    /// to [`Ingredient::empty`].
    pub fn from_matchers(matchers: Vec<Matcher>) -> Self {
        Self {
            matchers,
            packed: OnceLock::new(),
        }
    }

    /// Build from example stacks, each contributing its item and variant.
    /// Empty stacks are ignored.
    pub fn from_stacks<'a>(stacks: impl IntoIterator<Item = &'a Stack>) -> Self {
        Self::from_matchers(
            stacks
                .into_iter()
                .filter_map(|stack| {
                    stack.item().map(|item| Matcher {
                        item: item.clone(),
                        variant: stack.metadata(),
                    })
                })
                .collect(),
        )
    }

    /// Accept `item` at any variant.
    pub fn from_item(item: ItemRef) -> Self {
        Self::from_matchers(vec![Matcher {
            item,
            variant: WILDCARD_VARIANT,
        }])
    }

    /// Accept each of `items` at variant 0.
    pub fn from_items(items: impl IntoIterator<Item = ItemRef>) -> Self {
        Self::from_matchers(
            items
                .into_iter()
                .filter(|item| !item.is_air())
                .map(|item| Matcher { item, variant: 0 })
                .collect(),
        )
    }

    /// True for the predicate that only accepts empty stacks.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Matchers in construction order.
    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// Test a candidate. `None` never matches; the empty predicate accepts
    /// exactly the empty stacks.
    pub fn matches(&self, candidate: Option<&Stack>) -> bool {
        let Some(stack) = candidate else {
            return false;
        };
        if self.is_empty() {
            return stack.is_empty();
        }
        match stack.item() {
            Some(item) => self
                .matchers
                .iter()
                .any(|matcher| matcher.accepts(item, stack.metadata())),
            None => false,
        }
    }

    /// Ascending packed keys, one per matcher.
    pub fn packed_keys(&self) -> &[i32] {
        self.packed.get_or_init(|| {
            let mut keys: Vec<i32> = self.matchers.iter().map(Matcher::packed).collect();
            keys.sort_unstable();
            keys
        })
    }

    /// One count-1 stack per matcher, for previews.
    pub fn matching_stacks(&self) -> Vec<Stack> {
        self.matchers
            .iter()
            .map(|matcher| Stack::new(matcher.item.clone(), 1, matcher.variant))
            .collect()
    }
}

impl Clone for Ingredient {
    fn clone(&self) -> Self {
        Self::from_matchers(self.matchers.clone())
    }
}

/// Ingredients compare by their matcher lists.
impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.matchers == other.matchers
    }
}

impl Eq for Ingredient {}

impl fmt::Debug for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Ingredient(empty)");
        }
        f.debug_list()
            .entries(self.matchers.iter().map(|m| (&m.item, m.variant)))
            .finish()
    }
}

impl Default for Ingredient {
    fn default() -> Self {
        Self::empty().clone()
    }
}
