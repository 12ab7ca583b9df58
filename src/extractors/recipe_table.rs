use super::patterns::{self, CELL_MARKER, RECORD_MARKER};
use super::{pattern_not_found, Extraction, Page, PageParser};
use crate::cursor::LineCursor;
use crate::error::ParseError;
use crate::model::{Catalog, Ingredient, ItemId, Recipe, Workstation, NO_ITEM};
use log::{debug, warn};
use serde::Deserialize;

const ROW_START: &str = "<tr";

/// What to do with a product or ingredient name missing from the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Abort the page with `UnresolvedReference`
    #[default]
    Fail,
    /// Substitute the "no item" id and let the indexer drop it
    Sentinel,
}

/// Extracts the recipes listed on one workstation's sub-page
///
/// A record is a centered result cell followed by the product line, which
/// carries the name, an optional `(N)` quantity and a `rowspan` giving the
/// number of ingredient rows. Every ingredient row spans two lines and the
/// second one holds the ingredient. Any line without a `title` attribute where
/// a cell is expected is a formatting line and is skipped once.
pub struct RecipeTableParser<'c> {
    catalog: &'c Catalog,
    workstations: Vec<Workstation>,
    policy: UnresolvedPolicy,
}

enum Phase {
    RecordStart,
    ProductCell,
    IngredientCell {
        product: Ingredient,
        remaining: usize,
        ingredients: Vec<Ingredient>,
    },
}

impl<'c> RecipeTableParser<'c> {
    pub fn new(catalog: &'c Catalog, workstations: Vec<Workstation>) -> Self {
        Self {
            catalog,
            workstations,
            policy: UnresolvedPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn product_cell(
        &self,
        page: &Page,
        cursor: &mut LineCursor<'_>,
    ) -> Result<(Ingredient, usize), ParseError> {
        let line = cursor
            .advance_to_marked(CELL_MARKER)
            .ok_or_else(|| pattern_not_found(page, cursor, None, "a product cell"))?;
        let product = self.cell(page, cursor, line)?;
        let rows = patterns::rowspan(line)
            .ok_or_else(|| pattern_not_found(page, cursor, Some(line), "a rowspan=\"N\" ingredient count"))?;
        Ok((product, rows))
    }

    fn ingredient_cell(&self, page: &Page, cursor: &mut LineCursor<'_>) -> Result<Ingredient, ParseError> {
        let line = cursor
            .advance_to_marked(CELL_MARKER)
            .and_then(|_| cursor.advance_to_marked(CELL_MARKER))
            .ok_or_else(|| pattern_not_found(page, cursor, None, "an ingredient cell"))?;
        self.cell(page, cursor, line)
    }

    fn cell(&self, page: &Page, cursor: &LineCursor<'_>, line: &str) -> Result<Ingredient, ParseError> {
        let name = patterns::title(line)
            .ok_or_else(|| pattern_not_found(page, cursor, Some(line), "a title=\"…\" item name"))?;
        let count = patterns::quantity(line)
            .ok_or_else(|| pattern_not_found(page, cursor, Some(line), "a positive (N) quantity"))?;
        let item = self.resolve(page, cursor, name)?;
        Ok(Ingredient::new(item, count))
    }

    fn resolve(&self, page: &Page, cursor: &LineCursor<'_>, name: String) -> Result<ItemId, ParseError> {
        if let Some(id) = self.catalog.resolve(&name) {
            return Ok(id);
        }
        match self.policy {
            UnresolvedPolicy::Fail => Err(ParseError::UnresolvedReference {
                page: page.id.clone(),
                line_number: cursor.line_number(),
                name,
            }),
            UnresolvedPolicy::Sentinel => {
                warn!("{}:{}: unknown item '{}'", page.id, cursor.line_number(), name);
                Ok(NO_ITEM)
            }
        }
    }
}

impl PageParser for RecipeTableParser<'_> {
    type Record = Recipe;

    fn parse(&self, page: &Page) -> Extraction<Recipe> {
        let content = split_rows(&page.content);
        let mut cursor = LineCursor::new(&content);
        let mut recipes = Vec::new();
        let mut phase = Phase::RecordStart;

        loop {
            phase = match phase {
                Phase::RecordStart if !cursor.has_next() => break,
                Phase::RecordStart => match cursor.advance() {
                    Some(line) if line.contains(RECORD_MARKER) => Phase::ProductCell,
                    _ => Phase::RecordStart,
                },
                Phase::ProductCell => match self.product_cell(page, &mut cursor) {
                    // rowspan is page input; the list grows only as cells are read
                    Ok((product, rows)) => Phase::IngredientCell {
                        product,
                        remaining: rows,
                        ingredients: Vec::new(),
                    },
                    Err(err) => return Extraction::partial(recipes, err),
                },
                Phase::IngredientCell {
                    product,
                    remaining: 0,
                    ingredients,
                } => {
                    recipes.push(Recipe {
                        id: 0,
                        workstations: self.workstations.clone(),
                        ingredients,
                        product,
                    });
                    Phase::RecordStart
                }
                Phase::IngredientCell {
                    product,
                    remaining,
                    mut ingredients,
                } => match self.ingredient_cell(page, &mut cursor) {
                    Ok(ingredient) => {
                        ingredients.push(ingredient);
                        Phase::IngredientCell {
                            product,
                            remaining: remaining - 1,
                            ingredients,
                        }
                    }
                    Err(err) => return Extraction::partial(recipes, err),
                },
            };
        }

        debug!("Parsed {} recipes from {}", recipes.len(), page.id);
        Extraction::complete(recipes)
    }
}

/// Put every table row on its own line
///
/// Rows are sometimes concatenated (`</tr><tr>`); a line break is inserted
/// before each `<tr>` that has markup in front of it on the same line.
pub fn split_rows(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 32);
    for line in raw.lines() {
        let mut start = 0;
        for (idx, _) in line.match_indices(ROW_START) {
            let is_row = line[idx + ROW_START.len()..].starts_with(|c: char| c == '>' || c.is_whitespace());
            if is_row && !line[start..idx].trim().is_empty() {
                out.push_str(&line[start..idx]);
                out.push('\n');
                start = idx;
            }
        }
        out.push_str(&line[start..]);
        out.push('\n');
    }
    out
}
