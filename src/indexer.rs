//! Cross-reference index over the harvested recipes.
//!
//! Recipe ids are assigned here and nowhere else: a recipe's id is its
//! 1-based position in the input, so the input order must be stable.

use crate::model::{Catalog, Dataset, Item, ItemId, Recipe, RecipeId, NO_ITEM};
use log::{info, warn};
use std::collections::BTreeMap;

/// Number recipes, index every directly referenced item and drop the rest
///
/// Ids are `RecipeId`s, so recipes past `RecipeId::MAX` cannot be numbered;
/// they are dropped with a warning rather than given colliding ids.
pub fn index(recipes: Vec<Recipe>, catalog: &Catalog) -> Dataset {
    let total = recipes.len();
    let recipes: Vec<Recipe> = (1..=RecipeId::MAX)
        .zip(recipes)
        .map(|(id, mut recipe)| {
            recipe.id = id;
            recipe
        })
        .collect();
    if recipes.len() < total {
        warn!("Dropped {} recipes past the last assignable id", total - recipes.len());
    }

    let mut item_index: BTreeMap<ItemId, Item> = BTreeMap::new();
    let mut relations: BTreeMap<ItemId, Vec<RecipeId>> = BTreeMap::new();

    for recipe in &recipes {
        let referenced = std::iter::once(&recipe.product).chain(&recipe.ingredients);
        for ingredient in referenced {
            item_index
                .entry(ingredient.item)
                .or_insert_with(|| catalog_item(catalog, ingredient.item));
            relations.entry(ingredient.item).or_default().push(recipe.id);
        }
    }

    item_index.remove(&NO_ITEM);
    relations.remove(&NO_ITEM);

    let recipe_index = recipes.iter().map(|recipe| (recipe.id, recipe.clone())).collect();
    let items = item_index.values().cloned().collect();

    info!(
        "Indexed {} recipes over {} items ({} catalog items unreferenced)",
        recipes.len(),
        item_index.len(),
        catalog.len().saturating_sub(item_index.len())
    );

    Dataset {
        items,
        recipes,
        item_index,
        recipe_index,
        relations,
    }
}

fn catalog_item(catalog: &Catalog, id: ItemId) -> Item {
    match catalog.get(id) {
        Some(item) => item.clone(),
        None => {
            if id != NO_ITEM {
                warn!("Item {} is referenced by a recipe but missing from the catalog", id);
            }
            Item {
                id,
                name: String::new(),
                image: String::new(),
            }
        }
    }
}
