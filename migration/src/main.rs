use sea_orm_migration::prelude::*;

// `fresh` drops every table and re-applies all migrations.
#[async_std::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
