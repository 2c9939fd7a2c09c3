// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Example to print the bot's own user. Runnable as:
//!
//! ```sh
//! cargo run --example get_me -- BOT_TOKEN
//! ```
use std::env;
use tgbotapi_client::{Client, Configuration};

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> Result {
    simple_logger::init_with_level(log::Level::Debug).expect("failed to setup logging");

    let token = env::args().nth(1).expect("token missing");
    let client = Client::new(Configuration::new(token))?;

    let me = client.get_me().await?;
    println!(
        "Logged in as @{} ({})",
        me["username"].as_str().unwrap_or("?"),
        me["id"]
    );
    Ok(())
}
