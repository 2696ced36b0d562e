use clap::Parser;

/// Operator inputs for one search run
#[derive(Debug, Parser)]
#[command(name = "vlan-mac-search")]
#[command(about = "Find locally connected MAC addresses in a set of VLANs across switches")]
pub struct Args {
    /// Device inventory: a .json array or a CSV file with a header row
    #[arg(short, long, env = "INVENTORY_PATH")]
    pub inventory: String,

    /// VLANs to search, e.g. "10,20,100-110"
    #[arg(short, long, env = "VLAN_RANGE", default_value = "")]
    pub vlans: String,

    /// Log at debug level
    #[arg(short, long)]
    pub debug: bool,
}
