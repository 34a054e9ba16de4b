use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::api::{Difficulty, Recipe, RecipeApi, RecipeFields, RecipePatch};
use crate::app::form::{clean_entries, prepare_fields};
use crate::query::{total_pages, QueryKey, RecipeQuery};
use crate::ui::card::star_string;
use crate::ui::detail::numbered_steps;

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Page to print, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search terms, joined with spaces
    #[arg()]
    pub query: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Recipe identifier
    pub id: u64,
}

#[derive(Args, Debug, Clone)]
pub struct TagArgs {
    /// Tag name, matched exactly
    pub tag: String,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Read the recipe JSON from this file. If omitted, reads from stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Recipe identifier
    pub id: u64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub cuisine: Option<String>,
    /// Easy, Medium or Hard
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub servings: Option<u32>,
    /// Tag to append (repeatable); existing tags are kept
    #[arg(long = "add-tag")]
    pub add_tag: Vec<String>,
}

pub fn list_recipes(api: &dyn RecipeApi, args: &ListArgs) -> Result<String> {
    let key = QueryKey::new("", None, args.page);
    let page = key.request().run(api).context("fetching recipe page")?;
    let pages = total_pages(page.total);
    let mut out = format_recipe_rows(&page.recipes);
    if pages > 0 && args.page > pages {
        let _ = writeln!(&mut out, "Page {} is past the end.", args.page);
    }
    let _ = writeln!(
        &mut out,
        "\nPage {} of {} ({} recipes)",
        args.page,
        pages.max(1),
        page.total
    );
    Ok(out)
}

pub fn search_recipes(api: &dyn RecipeApi, args: &SearchArgs) -> Result<String> {
    let raw_query = args.query.join(" ");
    let RecipeQuery::Search(query) = QueryKey::new(&raw_query, None, 1).request() else {
        bail!("search query cannot be empty");
    };
    let page = api
        .search_recipes(&query)
        .with_context(|| format!("searching for '{query}'"))?;
    Ok(format_recipe_rows(&page.recipes))
}

pub fn show_recipe(api: &dyn RecipeApi, args: &ShowArgs) -> Result<String> {
    let recipe = api
        .get_recipe(args.id)
        .with_context(|| format!("fetching recipe #{}", args.id))?;
    Ok(format_recipe_detail(&recipe))
}

pub fn list_tags(api: &dyn RecipeApi) -> Result<String> {
    let tags = api.get_tags().context("loading tags")?;
    let mut out = String::new();
    for tag in tags {
        let _ = writeln!(&mut out, "{tag}");
    }
    Ok(out)
}

pub fn recipes_by_tag(api: &dyn RecipeApi, args: &TagArgs) -> Result<String> {
    let tag = args.tag.trim();
    if tag.is_empty() {
        bail!("tag cannot be empty");
    }
    let page = api
        .get_recipes_by_tag(tag)
        .with_context(|| format!("fetching recipes tagged '{tag}'"))?;
    Ok(format_recipe_rows(&page.recipes))
}

pub fn create_recipe(api: &dyn RecipeApi, args: &CreateArgs) -> Result<String> {
    let raw = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading recipe from {}", path.display()))?,
        None => match read_stdin()? {
            Some(raw) => raw,
            None => bail!("pipe recipe JSON on stdin or pass --file"),
        },
    };
    create_from_json(api, &raw)
}

fn create_from_json(api: &dyn RecipeApi, raw: &str) -> Result<String> {
    let fields: RecipeFields = serde_json::from_str(raw).context("parsing recipe JSON")?;
    let fields = prepare_fields(fields)?;
    let created = api.create_recipe(&fields).context("creating recipe")?;
    Ok(format!("Created recipe #{}  {}\n", created.id, created.name))
}

pub fn update_recipe(api: &dyn RecipeApi, args: &UpdateArgs) -> Result<String> {
    let mut patch = RecipePatch {
        name: non_blank(args.name.as_deref()),
        cuisine: non_blank(args.cuisine.as_deref()),
        difficulty: args.difficulty,
        servings: args.servings,
        ..RecipePatch::default()
    };
    let extra = clean_entries(&args.add_tag);
    if !extra.is_empty() {
        let current = api
            .get_recipe(args.id)
            .with_context(|| format!("fetching recipe #{}", args.id))?;
        let mut tags = current.tags;
        for tag in extra {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        patch.tags = Some(tags);
    }
    if patch.is_empty() {
        bail!("nothing to update; pass at least one field");
    }
    let updated = api
        .update_recipe(args.id, &patch)
        .with_context(|| format!("updating recipe #{}", args.id))?;
    Ok(format!("Updated recipe #{}  {}\n", updated.id, updated.name))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(Some(buf))
}

fn format_recipe_rows(recipes: &[Recipe]) -> String {
    if recipes.is_empty() {
        return "No recipes found.\n".to_string();
    }
    let mut out = String::new();
    for recipe in recipes {
        let _ = writeln!(&mut out, "#{}  {}", recipe.id, recipe.name);
        let _ = writeln!(
            &mut out,
            "    {} · {} · {} min · {} {:.1}",
            recipe.cuisine,
            recipe.difficulty,
            recipe.total_minutes(),
            star_string(recipe.rating),
            recipe.rating
        );
        if !recipe.tags.is_empty() {
            let _ = writeln!(&mut out, "    tags    {}", recipe.tags.join(", "));
        }
    }
    out
}

fn format_recipe_detail(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(&mut out, "#{}  {}", recipe.id, recipe.name);
    let _ = writeln!(
        &mut out,
        "{} · {} · {} {:.1} ({} reviews)",
        recipe.cuisine,
        recipe.difficulty,
        star_string(recipe.rating),
        recipe.rating,
        recipe.review_count
    );
    let _ = writeln!(
        &mut out,
        "Prep {} min · Cook {} min · Total {} min",
        recipe.prep_time_minutes,
        recipe.cook_time_minutes,
        recipe.total_minutes()
    );
    let _ = writeln!(
        &mut out,
        "Serves {} · {} kcal per serving",
        recipe.servings, recipe.calories_per_serving
    );
    if !recipe.meal_type.is_empty() {
        let _ = writeln!(&mut out, "Meal    {}", recipe.meal_type.join(", "));
    }
    if !recipe.tags.is_empty() {
        let _ = writeln!(&mut out, "Tags    {}", recipe.tags.join(", "));
    }
    out.push_str("\nIngredients\n");
    for ingredient in &recipe.ingredients {
        let _ = writeln!(&mut out, "  - {ingredient}");
    }
    out.push_str("\nInstructions\n");
    for step in numbered_steps(&recipe.instructions) {
        let _ = writeln!(&mut out, "  {step}");
    }
    out
}
