//! Crafting against the shared fixture registry and recipe book.

use proptest::prelude::*;
use stackcraft_core::{CraftingGrid, Recipe, Stack};
use stackcraft_testkit::{fixture_items, fixture_recipes, stack};

#[test]
fn pickaxe_pattern_crafts_a_fresh_tool() {
    let items = fixture_items();
    let book = fixture_recipes(&items);
    let mut grid = CraftingGrid::new(3, 3);
    for x in 0..3 {
        grid.set(x, 0, stack(&items, "stone", 2, 0));
    }
    grid.set(1, 1, stack(&items, "stick", 1, 0));
    grid.set(1, 2, stack(&items, "stick", 1, 0));

    let outcome = book.craft(&mut grid).expect("pickaxe recipe");
    assert_eq!(outcome.recipe, "diamond_pickaxe");
    assert_eq!(outcome.result.translation_key(), "item.diamond_pickaxe");
    assert!(!outcome.result.is_damaged());

    for x in 0..3 {
        assert_eq!(grid.get(x, 0).count(), 1);
    }
    assert!(grid.get(1, 1).is_empty());
    assert!(grid.get(1, 2).is_empty());
}

#[test]
fn stick_recipe_accepts_any_plank_variant() {
    let items = fixture_items();
    let book = fixture_recipes(&items);
    let grid = CraftingGrid::from_cells(
        1,
        2,
        vec![stack(&items, "planks", 1, 2), stack(&items, "planks", 1, 5)],
    );
    let (name, recipe) = book.find(&grid).expect("stick recipe");
    assert_eq!(name, "stick");
    assert_eq!(recipe.crafting_result(&grid).count(), 4);
}

#[test]
fn cake_leaves_an_empty_bucket() {
    let items = fixture_items();
    let book = fixture_recipes(&items);
    let mut grid = CraftingGrid::from_cells(
        3,
        3,
        vec![
            Stack::empty(),
            stack(&items, "wheat", 1, 0),
            Stack::empty(),
            stack(&items, "egg", 3, 0),
            Stack::empty(),
            stack(&items, "sugar", 1, 0),
            Stack::empty(),
            Stack::empty(),
            stack(&items, "milk_bucket", 1, 0),
        ],
    );

    let outcome = book.craft(&mut grid).expect("cake recipe");
    assert_eq!(outcome.recipe, "cake");
    assert!(outcome.leftovers.is_empty());
    assert_eq!(grid.get(2, 2).translation_key(), "item.bucket");
    assert_eq!(grid.get(0, 1).count(), 2);
}

#[test]
fn any_of_ingredient_takes_either_variant() {
    let items = fixture_items();
    let book = fixture_recipes(&items);
    for variant in [1, 14] {
        let grid = CraftingGrid::from_cells(
            2,
            1,
            vec![stack(&items, "sugar", 1, 0), stack(&items, "wool", 1, variant)],
        );
        let (name, recipe) = book.find(&grid).expect("white wool recipe");
        assert_eq!(name, "white_wool");
        assert_eq!(recipe.display_result().metadata(), 0);
    }

    let grid = CraftingGrid::from_cells(
        2,
        1,
        vec![stack(&items, "sugar", 1, 0), stack(&items, "wool", 1, 4)],
    );
    assert!(book.find(&grid).is_none());
}

fn cell() -> impl Strategy<Value = Option<(&'static str, i32)>> {
    prop_oneof![
        3 => Just(None::<(&'static str, i32)>),
        1 => Just(Some(("stone", 0))),
        1 => Just(Some(("stick", 0))),
        1 => (0i32..6).prop_map(|v| Some(("planks", v))),
        1 => (0i32..16).prop_map(|v| Some(("wool", v))),
        1 => Just(Some(("sugar", 0))),
        1 => Just(Some(("egg", 0))),
        1 => Just(Some(("wheat", 0))),
        1 => Just(Some(("milk_bucket", 0))),
    ]
}

proptest! {
    /// Property: Indexed lookup agrees with checking every recipe
    #[test]
    fn index_agrees_with_linear_scan(cells in proptest::collection::vec(cell(), 9)) {
        let items = fixture_items();
        let book = fixture_recipes(&items);
        let grid = CraftingGrid::from_cells(
            3,
            3,
            cells
                .iter()
                .map(|c| match c {
                    Some((name, variant)) => stack(&items, name, 1, *variant),
                    None => Stack::empty(),
                })
                .collect(),
        );

        let indexed: Vec<&str> = book.matching(&grid).into_iter().map(|(n, _)| n).collect();
        let scanned: Vec<&str> = book
            .iter()
            .filter(|(_, recipe)| recipe.matches(&grid))
            .map(|(n, _)| n)
            .collect();
        prop_assert_eq!(indexed, scanned);
    }
}
