//! # Golden Path
//!
//! Renders the sample wiki under each configuration and replays hovers
//! through the client runtime.
//!
//! Run with: `cargo run --bin golden_path`

use linktip::golden_path::GoldenPath;

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         LINKTIP - GOLDEN PATH                                    ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  Flow: render → annotate → export → hover → query → display      ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");

    let mut golden = GoldenPath::new();
    golden.run_all();
    golden.print_results();

    if golden.all_passed() {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
