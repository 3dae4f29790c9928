use crate::services::{self, DataStore};

pub fn run() {
    let store = DataStore::from_env();

    match services::resync(&store) {
        Ok(stats) => {
            println!(
                "✅ Market summary rebuilt from {} archive(s)",
                stats.instruments
            );
            println!("   Issuer names refreshed: {}", stats.issuers_renamed);
        }
        Err(e) => {
            eprintln!("❌ Resync failed: {}", e);
            std::process::exit(1);
        }
    }
}
