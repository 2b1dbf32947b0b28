use anyhow::Result;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::Database;

/// Stray page numbers end up as a digit run at the very end of the name.
static TRAILING_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+$").expect("trailing-digit regex is valid"));

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub scanned: usize,
    pub renamed: usize,
}

/// Trim surrounding whitespace and strip one trailing run of decimal
/// digits. Trimming happens first so "Roast 7 " cleans to "Roast" and the
/// transform is a no-op on an already-clean name.
pub fn clean_name(name: &str) -> String {
    let trimmed = name.trim();
    TRAILING_DIGITS.replace(trimmed, "").trim_end().to_string()
}

/// Only recipes from books below the threshold carry stray page numbers.
fn eligible(book_id: Option<i64>, threshold: i64) -> bool {
    matches!(book_id, Some(id) if id < threshold)
}

/// Single linear pass over the recipe table: stage a rename for every
/// eligible row whose cleaned name differs, then commit once at the end.
/// With `dry_run` the staged renames are reported but never written.
pub fn run(db: &mut Database, threshold: i64, dry_run: bool) -> Result<CleanupReport> {
    let recipes = db.recipes()?;
    let scanned = recipes.len();

    let mut renames = Vec::new();
    for recipe in recipes {
        if !eligible(recipe.book_id, threshold) {
            continue;
        }
        let cleaned = clean_name(&recipe.recipe_name);
        if cleaned != recipe.recipe_name {
            debug!(
                "recipe {}: {:?} -> {:?}",
                recipe.recipe_id, recipe.recipe_name, cleaned
            );
            renames.push((recipe.recipe_id, cleaned));
        }
    }

    if !dry_run {
        db.apply_renames(&renames)?;
    }
    info!(
        "scanned {} recipes, {} renamed{}",
        scanned,
        renames.len(),
        if dry_run { " (dry run)" } else { "" }
    );

    Ok(CleanupReport {
        scanned,
        renamed: renames.len(),
    })
}
