//! `lexline categories`: List the legal categories.

use lexline_advisor::PROFILES;

pub fn run() {
    println!("📚 Legal Categories");
    println!("===================\n");
    for profile in &PROFILES {
        println!("  {:<15} {}", profile.category.as_str(), profile.label);
    }
    println!("\n  Pass one with `lexline ask --category <id>`.");
}
