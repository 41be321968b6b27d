// Utility to submit an email to a running intake service, the way the landing page does

use std::{env, io, process};

use comingsoon::signup_form::{FormState, SignupForm};
use comingsoon::telemetry::{get_subscriber, init_subscriber};
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 || args.iter().skip(1).any(|arg| arg.starts_with('-')) {
        usage(&args[0]);
    }

    // Only warnings and errors, unless RUST_LOG says otherwise
    init_subscriber(get_subscriber("subscribe".into(), "warn".into(), io::stderr));

    let base_url = Url::parse(&args[1])?;
    let mut form = SignupForm::new();
    match form
        .submit(&reqwest::Client::new(), &base_url, &args[2])
        .await?
    {
        FormState::Succeeded => println!("Thank you, you're on the list."),
        FormState::Failed(reason) => {
            eprintln!("Subscription failed: {reason}");
            process::exit(1);
        }
        state => anyhow::bail!("Submission left the form in an unexpected state: {state:?}"),
    }

    Ok(())
}

/// Print usage information and exit
fn usage(prog: &str) {
    println!("Usage:");
    println!("{prog} <base_url> <email>");
    println!("\nExamples:");
    println!("{prog} http://127.0.0.1:8000 ursula@example.com");

    process::exit(1);
}
