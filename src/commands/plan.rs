use clap::{Args, Subcommand};

use cookplan_core::{Event, RecipesSnapshot};

use crate::config::Config;

use super::App;

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Show the cooking plan
    List,

    /// Put a recipe on the plan (taking it off the shopping list)
    Add {
        /// Recipe id
        id: i64,
    },

    /// Take a recipe off the plan
    Remove {
        /// Recipe id
        id: i64,

        /// Count the recipe as cooked, bumping its counter
        #[arg(long)]
        cooked: bool,
    },
}

impl PlanCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let app = App::open(config).await?;

        match &self.command {
            PlanSubcommand::List => {
                let snapshot = app.sync().await?;
                print_list("plan", &snapshot.plan, &snapshot);
            }
            PlanSubcommand::Add { id } => {
                let snapshot = app.dispatch(Event::AddToPlan { id: *id }).await?;
                print_list("plan", &snapshot.plan, &snapshot);
            }
            PlanSubcommand::Remove { id, cooked } => {
                let snapshot = app
                    .dispatch(Event::RemoveFromPlan {
                        id: *id,
                        increment_counter: *cooked,
                    })
                    .await?;
                if *cooked {
                    if let Some(recipe) = snapshot.recipe(*id) {
                        println!("Cooked {} ({}x so far)", recipe.title, recipe.counter);
                    }
                }
                print_list("plan", &snapshot.plan, &snapshot);
            }
        }

        Ok(())
    }
}

#[derive(Args)]
pub struct ShopCommand {
    #[command(subcommand)]
    pub command: ShopSubcommand,
}

#[derive(Subcommand)]
pub enum ShopSubcommand {
    /// Show the shopping list
    List,

    /// Put a recipe on the shopping list
    Add {
        /// Recipe id
        id: i64,
    },

    /// Take a recipe off the shopping list
    Remove {
        /// Recipe id
        id: i64,
    },
}

impl ShopCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let app = App::open(config).await?;

        match &self.command {
            ShopSubcommand::List => {
                let snapshot = app.sync().await?;
                print_list("shopping list", &snapshot.shop, &snapshot);
            }
            ShopSubcommand::Add { id } => {
                let snapshot = app.dispatch(Event::AddToShop { id: *id }).await?;
                print_list("shopping list", &snapshot.shop, &snapshot);
            }
            ShopSubcommand::Remove { id } => {
                let snapshot = app.dispatch(Event::RemoveFromShop { id: *id }).await?;
                print_list("shopping list", &snapshot.shop, &snapshot);
            }
        }

        Ok(())
    }
}

fn print_list(label: &str, ids: &[i64], snapshot: &RecipesSnapshot) {
    if ids.is_empty() {
        println!("The {} is empty.", label);
        return;
    }
    println!("On the {}:", label);
    let by_id = snapshot.by_id();
    for id in ids {
        match by_id.get(id) {
            Some(recipe) => println!("{:>4}. {}", id, recipe),
            None => println!("{:>4}. (unknown recipe)", id),
        }
    }
}
