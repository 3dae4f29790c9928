use crate::error::AppError;
use crate::services::DataStore;

pub fn run(codes: Vec<String>) {
    println!("📊 Archive Status\n");

    match show_status(&codes) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_status(codes: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let store = DataStore::from_env();
    println!("📂 Data directory: {}", store.root().display());

    let archived = store.list_archive_codes()?;
    if archived.is_empty() {
        println!("⚠️  No archives found. Run 'backfill' first.");
        return Ok(());
    }

    let summary = store.load_summary()?;
    let issuer_count = store.load_issuers()?.map(|i| i.len()).unwrap_or(0);
    println!("📈 Instruments archived: {}", archived.len());
    println!("🗒  Summary rows: {}", summary.len());
    println!("🏢 Issuer entries: {}", issuer_count);

    if codes.is_empty() {
        println!("\n💡 Tip: pass instrument codes for per-archive detail");
        return Ok(());
    }

    for code in codes {
        let code = code.trim().to_uppercase();
        println!();
        if let Err(e) = show_archive(&store, &code) {
            println!("⚠️  {}: {}", code, e);
        }
    }

    Ok(())
}

fn show_archive(store: &DataStore, code: &str) -> Result<(), AppError> {
    let archive = store
        .load_archive(code)?
        .ok_or_else(|| AppError::NotFound("no archive on disk".to_string()))?;

    println!("🔹 {} ({})", archive.company_code, archive.company_name);
    println!("   Records: {:>8}", format_number(archive.history.len()));
    match (archive.first_trade_date, archive.last_date()) {
        (Some(first), Some(last)) => println!("   Range:   {} → {}", first, last),
        _ => println!("   Range:   (no trades archived)"),
    }
    if let Some(latest) = archive.latest() {
        println!(
            "   Latest:  {:.2} MKD, volume {}",
            latest.last_transaction_price,
            format_number(latest.quantity as usize)
        );
    }
    Ok(())
}

fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}
