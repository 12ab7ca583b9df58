use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Item identifier, assigned by the wiki's item listing
pub type ItemId = u32;

/// Recipe identifier, assigned by the indexer
pub type RecipeId = u32;

/// Reserved id meaning "no item"; never present in an indexed dataset
pub const NO_ITEM: ItemId = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(rename = "label")]
    pub name: String,
    pub image: String,
}

/// A quantity of an item consumed or produced by a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub item: ItemId,
    pub count: u32,
}

impl Ingredient {
    pub fn new(item: ItemId, count: u32) -> Self {
        Self { item, count }
    }
}

/// Where a recipe is crafted: either a known item or a free-text label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Workstation {
    Item(ItemId),
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    /// Zero until the indexer assigns the final position-based id
    pub id: RecipeId,
    pub workstations: Vec<Workstation>,
    pub ingredients: Vec<Ingredient>,
    pub product: Ingredient,
}

/// Indexed item/recipe graph, the final output of a harvest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub items: Vec<Item>,
    pub recipes: Vec<Recipe>,
    #[serde(rename = "itemindex")]
    pub item_index: BTreeMap<ItemId, Item>,
    #[serde(rename = "recipeindex")]
    pub recipe_index: BTreeMap<RecipeId, Recipe>,
    pub relations: BTreeMap<ItemId, Vec<RecipeId>>,
}

/// Immutable lookup tables over the parsed item listing
///
/// Serves both as the name → id table used while parsing recipes and as the
/// id → item catalog used by the indexer. Later entries win on duplicates.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: HashMap<ItemId, Item>,
    ids: HashMap<String, ItemId>,
}

impl Catalog {
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut catalog = Catalog::default();
        for item in items {
            if let Some(previous) = catalog.ids.insert(item.name.clone(), item.id) {
                debug!("Item name '{}' reassigned from {} to {}", item.name, previous, item.id);
            }
            if catalog.items.contains_key(&item.id) {
                debug!("Item id {} listed more than once", item.id);
            }
            catalog.items.insert(item.id, item);
        }
        catalog
    }

    /// Resolve a display name to its item id
    pub fn resolve(&self, name: &str) -> Option<ItemId> {
        self.ids.get(name).copied()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
