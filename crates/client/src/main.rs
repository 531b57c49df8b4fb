use clap::{Parser, Subcommand};
use qr_attendance_client::AttendanceClient;

#[derive(Parser)]
#[command(name = "attendance-client")]
#[command(about = "Request and redeem QR attendance codes")]
struct Args {
    #[clap(long, env = "ATTENDANCE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the QR content for a member's check-in
    Sign {
        #[clap(long)]
        user_id: String,
        #[clap(long)]
        activity_id: String,
    },
    /// Redeem scanned QR content
    Verify {
        #[clap(long)]
        content: String,
    },
    /// List recorded attendance for an activity
    List {
        #[clap(long)]
        activity_id: String,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();
    let client = AttendanceClient::new(args.base_url);

    match args.command {
        Command::Sign { user_id, activity_id } => {
            let payload = client.sign(&user_id, &activity_id).await?;
            println!("{}", payload.to_qr_content().map_err(|e| eyre::eyre!("{e:#}"))?);
        }
        Command::Verify { content } => {
            let record = client.verify_content(&content).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::List { activity_id } => {
            let records = client.list(&activity_id).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
