use crate::commands::price_data::write_json;
use crate::strategy::list_strategies;
use anyhow::Result;
use log::info;

pub fn run() -> Result<()> {
    let catalog = list_strategies();
    info!("Listing {} strategies", catalog.len());
    write_json(&catalog, None)
}
