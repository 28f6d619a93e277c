// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Authentication command: login, manual token set, refresh

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use ekacare_sdk::EkaCareClient;

use crate::output::{display_token, section};

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Print tokens in full instead of masked
    #[arg(long)]
    pub show_tokens: bool,

    /// Stop after login
    #[arg(long)]
    pub skip_refresh: bool,
}

pub async fn handle(args: AuthArgs, client: &EkaCareClient) -> Result<()> {
    section("Authentication");

    let tokens = client.auth().login().await.context("Login failed")?;
    println!(
        "Access Token: {}",
        display_token(&tokens.access_token, args.show_tokens)
    );
    match &tokens.refresh_token {
        Some(refresh) => println!("Refresh Token: {}", display_token(refresh, args.show_tokens)),
        None => println!("Refresh Token: {}", "(not issued)".dimmed()),
    }

    client.set_access_token(tokens.access_token.clone());

    if args.skip_refresh {
        return Ok(());
    }

    let Some(refresh) = tokens.refresh_token else {
        println!("{}", "No refresh token issued, skipping refresh".yellow());
        return Ok(());
    };

    let refreshed = client
        .auth()
        .refresh_token(&refresh)
        .await
        .context("Token refresh failed")?;
    println!(
        "New Access Token: {}",
        display_token(&refreshed.access_token, args.show_tokens)
    );

    Ok(())
}
