//! Interactive fiction in the terminal with an AI storyteller.
//!
//! Each turn prints the current scene with a numbered menu of actions:
//! type a number to choose, or `quit` to end the story.
//!
//! ```bash
//! cargo run -p tale -- --name "Aria"
//! ```

mod logging;
mod play;

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    logging::init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Check for --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    // Check for API key
    if std::env::var("ANTHROPIC_API_KEY").is_err() {
        eprintln!("Error: ANTHROPIC_API_KEY environment variable not set.");
        eprintln!("Please set it in .env file or with: export ANTHROPIC_API_KEY=your_key_here");
        std::process::exit(1);
    }

    let options = play::parse_options(&args);

    if let Err(e) = play::run(options).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn print_help() {
    println!("tale - interactive fiction with an AI storyteller");
    println!();
    println!("USAGE:");
    println!("  tale [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help        Show this help message");
    println!("  --name <NAME>     Character name (prompted when omitted)");
    println!("  --scene <SCENE>   Opening scene (generated when omitted)");
    println!("  --model <MODEL>   Model to use for the storyteller");
    println!("  --journal <PATH>  Scene journal path (default: scenes.json)");
    println!();
    println!("Each turn shows the current scene and a numbered list of actions.");
    println!("Enter a number to act, or quit/q to end the story.");
    println!();
    println!("EXAMPLES:");
    println!("  tale                                  # Prompted setup");
    println!("  tale --name Aria                      # Named character");
    println!("  tale --name Aria --journal aria.json  # Custom journal path");
}
