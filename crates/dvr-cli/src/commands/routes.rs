//! `dvr routes` — print a node's routing table.

use clap::Args;

use dvr_routing::RouterSnapshot;

#[derive(Args, Debug)]
pub struct RoutesArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    pub endpoint: String,

    /// Print the raw JSON snapshot.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: &RoutesArgs) -> anyhow::Result<()> {
    let url = format!("{}/routes", args.endpoint.trim_end_matches('/'));

    let resp = match reqwest::get(&url).await {
        Ok(r) => r,
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
            println!();
            println!("Is the node running? Start it with: dvr-node");
            return Ok(());
        }
    };
    if !resp.status().is_success() {
        anyhow::bail!("query failed (HTTP {})", resp.status());
    }
    let snapshot: RouterSnapshot = resp.json().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print!("{}", render(&snapshot));
    Ok(())
}

fn render(snapshot: &RouterSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("Router {} ({})\n", snapshot.my_address, snapshot.my_network));
    out.push_str(&format!("  Update interval: {}s\n", snapshot.update_interval));
    out.push_str("  Neighbors:\n");
    for (addr, cost) in &snapshot.neighbors {
        out.push_str(&format!("    {addr:<24} cost {cost}\n"));
    }
    out.push('\n');
    out.push_str(&format!("  {:<24} {:>10}  {}\n", "DESTINATION", "COST", "NEXT HOP"));
    for (dest, route) in &snapshot.routing_table {
        out.push_str(&format!(
            "  {dest:<24} {:>10}  {}\n",
            route.cost, route.next_hop
        ));
    }
    out
}
