//! Crafting recipes over a grid of stacks.
//!
//! [`Recipe`] is the contract a crafting rule satisfies. Two concrete shapes
//! ship with the crate: [`ShapedRecipe`] (fixed pattern, optionally
//! mirrored) and [`ShapelessRecipe`] (any arrangement). [`RecipeBook`] holds
//! named recipes and uses ingredient packed keys to skip recipes that cannot
//! possibly match a grid.

use crate::ingredient::{self, Ingredient, Matcher, WILDCARD_VARIANT};
use crate::item::{ItemHolder, ItemRef, ItemRegistry, NoHolder};
use crate::stack::Stack;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Rectangular grid of stacks, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftingGrid {
    width: usize,
    height: usize,
    cells: Vec<Stack>,
}

impl CraftingGrid {
    /// Grid of empty cells.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: (0..width * height).map(|_| Stack::empty()).collect(),
        }
    }

    /// Grid from row-major cells. Missing cells are empty; extra cells are
    /// dropped.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Stack>) -> Self {
        let mut grid = Self::new(width, height);
        for (slot, stack) in grid.cells.iter_mut().zip(cells) {
            *slot = stack;
        }
        grid
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Stack::is_empty)
    }

    /// Cell at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> &Stack {
        &self.cells[y * self.width + x]
    }

    /// Replace the cell at column `x`, row `y`.
    pub fn set(&mut self, x: usize, y: usize, stack: Stack) {
        self.cells[y * self.width + x] = stack;
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[Stack] {
        &self.cells
    }

    /// Mutable cells in row-major order.
    pub fn cells_mut(&mut self) -> &mut [Stack] {
        &mut self.cells
    }

    /// Take one item from every occupied cell and put `remaining[i]` back
    /// into cell `i`. Remainders that do not fit are returned.
    pub fn consume(&mut self, remaining: Vec<Stack>) -> Vec<Stack> {
        let mut leftovers = Vec::new();
        for (cell, remainder) in self.cells.iter_mut().zip(remaining) {
            if !cell.is_empty() {
                cell.shrink(1);
            }
            if remainder.is_empty() {
                continue;
            }
            if cell.is_empty() {
                *cell = remainder;
            } else if Stack::items_equal(cell, &remainder) && Stack::tags_equal(cell, &remainder) {
                cell.grow(remainder.count());
            } else {
                leftovers.push(remainder);
            }
        }
        leftovers
    }
}

/// Container item left behind by each cell (an empty bucket for a water
/// bucket); empty where the cell's item has none.
pub fn container_remainders(grid: &CraftingGrid) -> Vec<Stack> {
    grid.cells()
        .iter()
        .map(|cell| {
            cell.item()
                .and_then(|item| item.kind().container_item())
                .map_or_else(Stack::empty, Stack::of)
        })
        .collect()
}

/// A crafting rule.
pub trait Recipe: fmt::Debug {
    /// True when the grid satisfies this recipe.
    fn matches(&self, grid: &CraftingGrid) -> bool;

    /// Output for a matching grid.
    fn crafting_result(&self, grid: &CraftingGrid) -> Stack;

    /// Representative output for previews; empty when there is none.
    fn display_result(&self) -> Stack;

    /// What stays in each cell after crafting, one entry per cell.
    fn remaining_items(&self, grid: &CraftingGrid) -> Vec<Stack> {
        container_remainders(grid)
    }

    /// Per-slot ingredients, when the recipe exposes them.
    fn ingredients(&self) -> &[Ingredient] {
        &[]
    }

    /// True when the output cannot be previewed statically.
    fn is_dynamic(&self) -> bool {
        false
    }
}

/// Recipe with a fixed pattern that may sit anywhere in the grid.
#[derive(Debug, Clone)]
pub struct ShapedRecipe {
    width: usize,
    height: usize,
    ingredients: Vec<Ingredient>,
    result: Stack,
    mirrored: bool,
}

impl ShapedRecipe {
    /// Build from a row-major pattern of `width * height` ingredients.
    ///
    /// With `mirrored` set, the horizontally flipped pattern matches too.
    pub fn new(
        width: usize,
        height: usize,
        ingredients: Vec<Ingredient>,
        result: Stack,
        mirrored: bool,
    ) -> Result<Self, RecipeError> {
        if width == 0 || height == 0 || ingredients.len() != width * height {
            return Err(RecipeError::InvalidPattern(format!(
                "{} ingredients do not fill a {width}x{height} pattern",
                ingredients.len()
            )));
        }
        Ok(Self {
            width,
            height,
            ingredients,
            result,
            mirrored,
        })
    }

    /// Pattern width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Pattern height.
    pub fn height(&self) -> usize {
        self.height
    }

    fn matches_at(&self, grid: &CraftingGrid, left: usize, top: usize, mirror: bool) -> bool {
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let inside = x >= left && y >= top && x - left < self.width && y - top < self.height;
                let ingredient = if inside {
                    let (px, py) = (x - left, y - top);
                    let px = if mirror { self.width - px - 1 } else { px };
                    &self.ingredients[py * self.width + px]
                } else {
                    Ingredient::empty()
                };
                if !ingredient.matches(Some(grid.get(x, y))) {
                    return false;
                }
            }
        }
        true
    }
}

impl Recipe for ShapedRecipe {
    fn matches(&self, grid: &CraftingGrid) -> bool {
        if self.width > grid.width() || self.height > grid.height() {
            return false;
        }
        for top in 0..=grid.height() - self.height {
            for left in 0..=grid.width() - self.width {
                if self.matches_at(grid, left, top, false) {
                    return true;
                }
                if self.mirrored && self.matches_at(grid, left, top, true) {
                    return true;
                }
            }
        }
        false
    }

    fn crafting_result(&self, _grid: &CraftingGrid) -> Stack {
        self.result.clone()
    }

    fn display_result(&self) -> Stack {
        self.result.clone()
    }

    fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }
}

/// Recipe whose ingredients may be placed in any cells.
#[derive(Debug, Clone)]
pub struct ShapelessRecipe {
    ingredients: Vec<Ingredient>,
    result: Stack,
}

impl ShapelessRecipe {
    /// Build from a non-empty ingredient list.
    pub fn new(ingredients: Vec<Ingredient>, result: Stack) -> Result<Self, RecipeError> {
        if ingredients.is_empty() || ingredients.iter().any(Ingredient::is_empty) {
            return Err(RecipeError::InvalidPattern(
                "shapeless recipes need at least one non-empty ingredient".to_string(),
            ));
        }
        Ok(Self {
            ingredients,
            result,
        })
    }
}

impl Recipe for ShapelessRecipe {
    fn matches(&self, grid: &CraftingGrid) -> bool {
        let occupied: Vec<&Stack> = grid.cells().iter().filter(|c| !c.is_empty()).collect();
        occupied.len() == self.ingredients.len() && assign(&occupied, &self.ingredients).is_some()
    }

    fn crafting_result(&self, _grid: &CraftingGrid) -> Stack {
        self.result.clone()
    }

    fn display_result(&self) -> Stack {
        self.result.clone()
    }

    fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }
}

/// Pair every stack with a distinct ingredient that accepts it.
///
/// Returns `owner[i]`, the stack index assigned to ingredient `i`. Uses
/// augmenting paths, so an early greedy choice never blocks a valid
/// assignment.
fn assign(stacks: &[&Stack], ingredients: &[Ingredient]) -> Option<Vec<usize>> {
    fn augment(
        stack: usize,
        stacks: &[&Stack],
        ingredients: &[Ingredient],
        owner: &mut [Option<usize>],
        visited: &mut [bool],
    ) -> bool {
        for (slot, ingredient) in ingredients.iter().enumerate() {
            if visited[slot] || !ingredient.matches(Some(stacks[stack])) {
                continue;
            }
            visited[slot] = true;
            let free = match owner[slot] {
                None => true,
                Some(other) => augment(other, stacks, ingredients, owner, visited),
            };
            if free {
                owner[slot] = Some(stack);
                return true;
            }
        }
        false
    }

    let mut owner = vec![None; ingredients.len()];
    for stack in 0..stacks.len() {
        let mut visited = vec![false; ingredients.len()];
        if !augment(stack, stacks, ingredients, &mut owner, &mut visited) {
            return None;
        }
    }
    owner.into_iter().collect()
}

/// Errors raised while building recipes.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// A definition names an item that is not registered.
    #[error("recipe {recipe} references unknown item {item}")]
    UnknownItem {
        /// Recipe name.
        recipe: String,
        /// Unresolved identifier.
        item: String,
    },
    /// A pattern uses a symbol missing from the key.
    #[error("recipe {recipe} uses undefined symbol '{symbol}'")]
    UndefinedSymbol {
        /// Recipe name.
        recipe: String,
        /// Offending symbol.
        symbol: char,
    },
    /// Pattern or ingredient list has the wrong shape.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    /// Two recipes share a name.
    #[error("recipe {0} is already registered")]
    DuplicateName(String),
}

/// One `(item, data)` entry of a recipe definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemChoice {
    /// Item identifier.
    pub item: String,
    /// Variant; `32767` accepts any.
    #[serde(default)]
    pub data: i32,
}

/// A slot accepting one item or any of several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngredientDefinition {
    /// Single choice.
    One(ItemChoice),
    /// Any of these choices.
    AnyOf(Vec<ItemChoice>),
}

/// Recipe output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDefinition {
    /// Item identifier.
    pub item: String,
    /// Output count.
    #[serde(default = "default_result_count")]
    pub count: i32,
    /// Output damage value.
    #[serde(default)]
    pub data: i32,
}

fn default_result_count() -> i32 {
    1
}

/// Data-driven recipe, as stored in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecipeDefinition {
    /// Pattern recipe; rows are strings of key symbols, space is an empty cell.
    Shaped {
        /// Unique name.
        name: String,
        /// Pattern rows.
        pattern: Vec<String>,
        /// Symbol to ingredient.
        key: BTreeMap<char, IngredientDefinition>,
        /// Output.
        result: ResultDefinition,
        /// Also match the horizontally flipped pattern.
        #[serde(default = "default_mirrored")]
        mirrored: bool,
    },
    /// Order-independent recipe.
    Shapeless {
        /// Unique name.
        name: String,
        /// Required ingredients.
        ingredients: Vec<IngredientDefinition>,
        /// Output.
        result: ResultDefinition,
    },
}

fn default_mirrored() -> bool {
    true
}

impl RecipeDefinition {
    /// Recipe name.
    pub fn name(&self) -> &str {
        match self {
            RecipeDefinition::Shaped { name, .. } | RecipeDefinition::Shapeless { name, .. } => name,
        }
    }

    /// Resolve items and build the recipe.
    pub fn build(&self, items: &ItemRegistry) -> Result<Box<dyn Recipe>, RecipeError> {
        let name = self.name();
        match self {
            RecipeDefinition::Shaped {
                pattern,
                key,
                result,
                mirrored,
                ..
            } => {
                let declared = pattern.first().map_or(0, |row| row.chars().count());
                if pattern.iter().any(|row| row.chars().count() != declared) {
                    return Err(RecipeError::InvalidPattern(format!(
                        "rows of recipe {name} differ in length"
                    )));
                }
                let rows = trim_pattern(pattern);
                let width = rows.first().map_or(0, |row| row.chars().count());
                let mut ingredients = Vec::with_capacity(width * rows.len());
                for symbol in rows.iter().flat_map(|row| row.chars()) {
                    if symbol == ' ' {
                        ingredients.push(Ingredient::empty().clone());
                        continue;
                    }
                    let definition = key.get(&symbol).ok_or_else(|| RecipeError::UndefinedSymbol {
                        recipe: name.to_string(),
                        symbol,
                    })?;
                    ingredients.push(resolve_ingredient(name, definition, items)?);
                }
                let result = resolve_result(name, result, items)?;
                Ok(Box::new(ShapedRecipe::new(
                    width,
                    rows.len(),
                    ingredients,
                    result,
                    *mirrored,
                )?))
            }
            RecipeDefinition::Shapeless {
                ingredients,
                result,
                ..
            } => {
                let ingredients = ingredients
                    .iter()
                    .map(|definition| resolve_ingredient(name, definition, items))
                    .collect::<Result<Vec<_>, _>>()?;
                let result = resolve_result(name, result, items)?;
                Ok(Box::new(ShapelessRecipe::new(ingredients, result)?))
            }
        }
    }
}

// Drops blank rows and columns around the pattern.
fn trim_pattern(pattern: &[String]) -> Vec<String> {
    let rows: Vec<Vec<char>> = pattern
        .iter()
        .filter(|row| !row.trim().is_empty())
        .map(|row| row.chars().collect())
        .collect();
    let used = |col: usize| rows.iter().any(|row| row.get(col).is_some_and(|c| *c != ' '));
    let longest = rows.iter().map(Vec::len).max().unwrap_or(0);
    let Some(first) = (0..longest).find(|col| used(*col)) else {
        return Vec::new();
    };
    let last = (0..longest).rev().find(|col| used(*col)).unwrap_or(first);
    rows.iter()
        .map(|row| {
            (first..=last)
                .map(|col| row.get(col).copied().unwrap_or(' '))
                .collect()
        })
        .collect()
}

fn resolve_item(recipe: &str, name: &str, items: &ItemRegistry) -> Result<ItemRef, RecipeError> {
    items
        .get(name)
        .filter(|item| !item.is_air())
        .ok_or_else(|| RecipeError::UnknownItem {
            recipe: recipe.to_string(),
            item: name.to_string(),
        })
}

fn resolve_ingredient(
    recipe: &str,
    definition: &IngredientDefinition,
    items: &ItemRegistry,
) -> Result<Ingredient, RecipeError> {
    let choices = match definition {
        IngredientDefinition::One(choice) => std::slice::from_ref(choice),
        IngredientDefinition::AnyOf(choices) => choices.as_slice(),
    };
    let matchers = choices
        .iter()
        .map(|choice| -> Result<Matcher, RecipeError> {
            Ok(Matcher {
                item: resolve_item(recipe, &choice.item, items)?,
                variant: choice.data,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if matchers.is_empty() {
        return Err(RecipeError::InvalidPattern(format!(
            "recipe {recipe} has an ingredient with no choices"
        )));
    }
    Ok(Ingredient::from_matchers(matchers))
}

fn resolve_result(
    recipe: &str,
    result: &ResultDefinition,
    items: &ItemRegistry,
) -> Result<Stack, RecipeError> {
    let item = resolve_item(recipe, &result.item, items)?;
    Ok(Stack::new(item, result.count, result.data))
}

/// Result of crafting from a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftOutcome {
    /// Name of the recipe used.
    pub recipe: String,
    /// Crafted stack.
    pub result: Stack,
    /// Remainders that did not fit back into the grid.
    pub leftovers: Vec<Stack>,
}

#[derive(Debug)]
struct Entry {
    name: String,
    recipe: Box<dyn Recipe>,
}

/// Named recipes plus a packed-key index for fast lookup.
#[derive(Debug, Default)]
pub struct RecipeBook {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
    by_key: HashMap<i32, Vec<usize>>,
    unindexed: Vec<usize>,
}

impl RecipeBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load recipe definitions from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P, items: &ItemRegistry) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe file {}", path.display()))?;
        Self::load_from_str(&content, items)
    }

    /// Load recipe definitions from a JSON array.
    pub fn load_from_str(content: &str, items: &ItemRegistry) -> Result<Self> {
        let definitions: Vec<RecipeDefinition> =
            serde_json::from_str(content).context("Failed to parse recipe JSON")?;

        let mut book = Self::new();
        for definition in definitions {
            let recipe = definition
                .build(items)
                .with_context(|| format!("Failed to build recipe {}", definition.name()))?;
            book.register(definition.name(), recipe)?;
        }
        debug!(recipes = book.len(), "loaded recipe book");
        Ok(book)
    }

    /// Add a recipe under a unique name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        recipe: Box<dyn Recipe>,
    ) -> Result<(), RecipeError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RecipeError::DuplicateName(name));
        }
        let index = self.entries.len();

        let mut keys: Vec<i32> = recipe
            .ingredients()
            .iter()
            .flat_map(|ingredient| ingredient.packed_keys().iter().copied())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        if keys.is_empty() || recipe.is_dynamic() {
            self.unindexed.push(index);
        } else {
            for key in keys {
                self.by_key.entry(key).or_default().push(index);
            }
        }

        self.by_name.insert(name.clone(), index);
        self.entries.push(Entry { name, recipe });
        Ok(())
    }

    /// Look up a recipe by name.
    pub fn get(&self, name: &str) -> Option<&dyn Recipe> {
        self.by_name
            .get(name)
            .map(|index| self.entries[*index].recipe.as_ref())
    }

    /// Recipes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Recipe)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.recipe.as_ref()))
    }

    /// Number of recipes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no recipes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Every recipe that matches a grid accepts its first occupied cell, so
    // only recipes indexed under that cell's keys (or not indexed at all)
    // need a full check.
    fn candidates(&self, grid: &CraftingGrid) -> Vec<usize> {
        let mut candidates = self.unindexed.clone();
        if let Some(first) = grid.cells().iter().find(|cell| !cell.is_empty()) {
            if let (Some(key), Some(item)) = (ingredient::pack_stack(first), first.item()) {
                let wildcard = ingredient::pack(item, WILDCARD_VARIANT);
                for key in [key, wildcard] {
                    if let Some(indices) = self.by_key.get(&key) {
                        candidates.extend_from_slice(indices);
                    }
                }
            }
        }
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    /// Every recipe matching the grid, in registration order.
    pub fn matching(&self, grid: &CraftingGrid) -> Vec<(&str, &dyn Recipe)> {
        self.candidates(grid)
            .into_iter()
            .map(|index| &self.entries[index])
            .filter(|entry| entry.recipe.matches(grid))
            .map(|entry| (entry.name.as_str(), entry.recipe.as_ref()))
            .collect()
    }

    /// First recipe matching the grid.
    pub fn find(&self, grid: &CraftingGrid) -> Option<(&str, &dyn Recipe)> {
        self.candidates(grid)
            .into_iter()
            .map(|index| &self.entries[index])
            .find(|entry| entry.recipe.matches(grid))
            .map(|entry| (entry.name.as_str(), entry.recipe.as_ref()))
    }

    /// Craft once: consume one item per occupied cell, put remainders back
    /// and return the output. `None` when nothing matches.
    pub fn craft(&self, grid: &mut CraftingGrid) -> Option<CraftOutcome> {
        self.craft_by(grid, &mut NoHolder)
    }

    /// [`craft`](Self::craft) on behalf of `crafter`, which is told about
    /// the new stack before it is returned.
    pub fn craft_by(
        &self,
        grid: &mut CraftingGrid,
        crafter: &mut dyn ItemHolder,
    ) -> Option<CraftOutcome> {
        let (name, recipe) = self.find(grid)?;
        let mut result = recipe.crafting_result(grid);
        let amount = result.count();
        result.on_crafting(crafter, amount);
        let remaining = recipe.remaining_items(grid);
        let leftovers = grid.consume(remaining);
        debug!(recipe = name, result = %result, "crafted");
        Some(CraftOutcome {
            recipe: name.to_string(),
            result,
            leftovers,
        })
    }
}
