use clap::{Args, Subcommand, ValueEnum};
use std::collections::BTreeSet;

use cookplan_core::{Event, RecipesSnapshot, Target};

use crate::config::Config;

use super::App;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// List all recipes
    List {
        /// Only show recipes carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a new recipe
    Add {
        /// Recipe title
        title: String,

        /// Source URL
        #[arg(long)]
        url: Option<String>,

        /// Tags (can be repeated)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Put the new recipe straight onto the plan
        #[arg(long, conflicts_with = "shop")]
        plan: bool,

        /// Put the new recipe straight onto the shopping list
        #[arg(long)]
        shop: bool,
    },

    /// Update a recipe's title, url or tags
    Update {
        /// Recipe id
        id: i64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New source URL
        #[arg(long)]
        url: Option<String>,

        /// Replacement tags (can be repeated; omitting keeps current tags)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },

    /// Delete a recipe
    Delete {
        /// Recipe id
        id: i64,
    },
}

impl RecipeCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let app = App::open(config).await?;

        match &self.command {
            RecipeSubcommand::List { tag, format } => {
                let snapshot = app.sync().await?;
                print_recipes(&snapshot, tag.as_deref(), format)?;
            }
            RecipeSubcommand::Add {
                title,
                url,
                tags,
                plan,
                shop,
            } => {
                let target = if *plan {
                    Target::Plan
                } else if *shop {
                    Target::Shop
                } else {
                    Target::Recipes
                };
                let snapshot = app
                    .dispatch(Event::Add {
                        title: title.clone(),
                        url: url.clone(),
                        tags: tags.iter().cloned().collect(),
                        target,
                    })
                    .await?;
                let added = snapshot.recipes.iter().rev().find(|r| r.title == title.trim());
                match added {
                    Some(recipe) => println!("Added recipe {}: {}", recipe.id, recipe),
                    None => println!("Added recipe: {}", title),
                }
            }
            RecipeSubcommand::Update { id, title, url, tags } => {
                let current = app.sync().await?;
                let existing = current
                    .recipe(*id)
                    .ok_or_else(|| format!("no recipe with id {}", id))?;

                let new_tags: BTreeSet<String> = if tags.is_empty() {
                    existing.tags.clone()
                } else {
                    tags.iter().cloned().collect()
                };
                let snapshot = app
                    .dispatch(Event::Update {
                        id: *id,
                        title: title.clone().unwrap_or_else(|| existing.title.clone()),
                        url: url.clone().or_else(|| existing.url.clone()),
                        tags: new_tags,
                    })
                    .await?;
                if let Some(recipe) = snapshot.recipe(*id) {
                    println!("Updated recipe {}: {}", id, recipe);
                }
            }
            RecipeSubcommand::Delete { id } => {
                app.dispatch(Event::Delete { id: *id }).await?;
                println!("Deleted recipe {}", id);
            }
        }

        Ok(())
    }
}

fn print_recipes(
    snapshot: &RecipesSnapshot,
    tag: Option<&str>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let recipes: Vec<_> = snapshot
        .recipes
        .iter()
        .filter(|r| tag.map_or(true, |t| r.tags.contains(t)))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recipes)?),
        OutputFormat::Text => {
            if recipes.is_empty() {
                println!("No recipes.");
                return Ok(());
            }
            for recipe in recipes {
                let mut markers = String::new();
                if snapshot.plan.contains(&recipe.id) {
                    markers.push_str(" [plan]");
                }
                if snapshot.shop.contains(&recipe.id) {
                    markers.push_str(" [shop]");
                }
                println!("{:>4}. {}{} (cooked {}x)", recipe.id, recipe, markers, recipe.counter);
            }
        }
    }
    Ok(())
}
