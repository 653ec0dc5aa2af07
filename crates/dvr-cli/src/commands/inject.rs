//! `dvr inject` — post a hand-written routing update to a node.
//!
//! Useful for exercising relaxation and summarization without running the
//! neighbor: the node accepts the update as long as `--sender` is one of its
//! configured neighbors.

use clap::Args;
use serde::Deserialize;

use dvr_routing::{Cost, UpdateMessage, WireRoute, WireTable};

#[derive(Args, Debug)]
pub struct InjectArgs {
    /// Address of the neighbor the update claims to come from.
    #[arg(short, long)]
    pub sender: String,

    /// Routes as `<destination>=<cost>`, e.g. `10.0.1.0/24=1`. Repeatable.
    #[arg(short, long = "route", value_parser = parse_route, required = true)]
    pub routes: Vec<(String, Cost)>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct UpdateResponse {
    changed: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

fn parse_route(s: &str) -> Result<(String, Cost), String> {
    let (dest, cost) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <destination>=<cost>, got {s:?}"))?;
    let cost = cost
        .trim()
        .parse::<Cost>()
        .map_err(|e| format!("invalid cost in {s:?}: {e}"))?;
    Ok((dest.trim().to_string(), cost))
}

/// Build the payload. Each route names the sender as its next hop, as a real
/// neighbor's advertisement would.
fn build_message(args: &InjectArgs) -> UpdateMessage {
    let routing_table: WireTable = args
        .routes
        .iter()
        .map(|(dest, cost)| {
            (
                dest.clone(),
                WireRoute {
                    cost: *cost,
                    next_hop: args.sender.clone(),
                },
            )
        })
        .collect();
    UpdateMessage {
        sender_address: args.sender.clone(),
        routing_table,
    }
}

pub async fn run(args: &InjectArgs) -> anyhow::Result<()> {
    let url = format!("{}/receive_update", args.endpoint.trim_end_matches('/'));
    let message = build_message(args);

    println!("Injecting {} route(s) as {}", message.routing_table.len(), args.sender);

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&message).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: UpdateResponse = r.json().await?;
            if data.changed {
                println!("Update accepted; routing table changed.");
            } else {
                println!("Update accepted; no change.");
            }
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("update rejected (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("update rejected (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
            println!();
            println!("Is the node running? Start it with: dvr-node");
        }
    }

    Ok(())
}
