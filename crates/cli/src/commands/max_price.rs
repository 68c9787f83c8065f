//! Print the catalogue's maximum price.
//!
//! # Usage
//!
//! ```bash
//! wb-dash max-price
//! ```

use wb_dashboard::render::format_price;
use wb_dashboard::{DashboardConfig, ProductsClient};

use super::{CliError, say};

pub async fn run(config: &DashboardConfig) -> Result<(), CliError> {
    let client = ProductsClient::new(&config.api)?;
    let max_price = client.fetch_max_price().await?;
    say(format_price(max_price))?;
    Ok(())
}
