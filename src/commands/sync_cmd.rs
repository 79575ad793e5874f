use clap::Args;

use crate::config::Config;

use super::App;

#[derive(Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let app = App::open(config).await?;
        let snapshot = app.sync().await?;

        println!(
            "Synced: {} recipes, {} planned, {} on the shopping list.",
            snapshot.recipes.len(),
            snapshot.plan.len(),
            snapshot.shop.len()
        );
        Ok(())
    }
}
