use smokefree::{Dashboard, DashboardView, Notification, ChatRoom, SystemClock,
    backend::JsonStore,
    record::parse_day,
    config::parse_price,
    money::DEFAULT_CURRENCY};

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Context;
use chrono::NaiveDate;
use colored::Colorize;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(version, about, propagate_version = true)]
struct Cli {
   /// Path to the store file to operate on
   #[clap(value_parser)]
    path: PathBuf,

   /// Currency symbol used for savings
   #[clap(long, value_parser, default_value = DEFAULT_CURRENCY)]
    currency: String,

   /// Action to perform
   #[clap(subcommand)]
   action: Subcommands,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Show streak and savings
    Status,
    /// Record a day's outcome
    Mark(Mark),
    /// Set the quit date, clearing records on or after it
    QuitDate(QuitDate),
    /// Set the price of one pack
    Price(SetPrice),
    /// Read or post community chat messages
    #[clap(subcommand)]
    Chat(ChatCommand)
}

#[derive(Args, Debug)]
struct Mark {
    /// Record the day as smoked
    #[clap(short, long)]
    smoked: bool,

    /// Day to mark, defaults to today
    #[clap(short, long, value_parser = parse_day)]
    date: Option<NaiveDate>
}

#[derive(Args, Debug)]
struct QuitDate {
    #[clap(value_parser = parse_day)]
    date: NaiveDate
}

#[derive(Args, Debug)]
struct SetPrice {
    #[clap(value_parser = parse_price)]
    price: f64
}

#[derive(Debug, Subcommand)]
enum ChatCommand {
    /// List all messages, oldest first
    List,
    /// Post a message
    Send {
        #[clap(value_parser)]
        text: String
    }
}

fn print_status(view: &DashboardView) {
    let quit_date = view.quit_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "not set".to_string());
    println!("{}: {}", "Quit date".bold(), quit_date);
    println!("{}: {}", "Pack price".bold(), view.price);

    let today = match view.today_record {
        Some(record) if record.success => record.to_string().green(),
        Some(record) => record.to_string().bright_red(),
        None => "not recorded".normal()
    };
    println!("{}: {}", "Today".bold(), today);

    let streak = format!("{} days", view.streak_days);
    let streak = if view.streak_days > 0 { streak.green() } else { streak.normal() };
    println!("{}: {}", "Streak".bold(), streak);
    println!("{}: {}", "Saved".bold(), view.money_display.green());
}

fn print_notification(notification: &Notification) {
    match notification {
        Notification::Success(msg) => println!("{}", msg.green()),
        Notification::Error(msg) => eprintln!("{}", msg.bright_red())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Cli::parse();

    let store = Arc::new(JsonStore::new(&args.path));

    if let Subcommands::Chat(command) = &args.action {
        let chat = ChatRoom::new(store);
        match command {
            ChatCommand::List => {
                for message in chat.messages().context("failed to read messages")? {
                    println!("{}", message);
                }
            },
            ChatCommand::Send { text } => {
                match chat.send(text).context("failed to post message")? {
                    Some(message) => println!("{}", message),
                    None => eprintln!("{}", "Nothing to send".yellow())
                }
            }
        }
        return Ok(());
    }

    let mut dashboard = Dashboard::new(store, SystemClock).with_currency(&args.currency);
    if let Some(notification) = dashboard.load() {
        print_notification(&notification);
    }

    let notification = match args.action {
        Subcommands::Status => None,
        Subcommands::Mark(mark) => {
            let date = mark.date.unwrap_or_else(|| dashboard.view().today);
            Some(dashboard.record_outcome(date, mark.smoked))
        },
        Subcommands::QuitDate(quit) => Some(dashboard.set_quit_date(quit.date)),
        Subcommands::Price(price) => Some(dashboard.set_price(price.price)),
        Subcommands::Chat(_) => None
    };

    if let Some(notification) = &notification {
        print_notification(notification);
    }
    print_status(&dashboard.view());

    if notification.map_or(false, |n| n.is_error()) {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smokefree::DailyRecord;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_mark_with_date() {
        let cli = Cli::try_parse_from(["smokefree-cli", "ledger.json", "mark", "--smoked", "--date", "2024-01-02"]).unwrap();
        match cli.action {
            Subcommands::Mark(mark) => {
                assert!(mark.smoked);
                assert_eq!(mark.date, NaiveDate::from_ymd_opt(2024, 1, 2));
            },
            other => panic!("unexpected action {:?}", other)
        }
    }

    #[test]
    fn rejects_bad_price() {
        assert!(Cli::try_parse_from(["smokefree-cli", "ledger.json", "price", "-3"]).is_err());
        assert!(Cli::try_parse_from(["smokefree-cli", "ledger.json", "price", "cheap"]).is_err());
    }

    #[test]
    fn record_display_is_plain_without_color() {
        colored::control::set_override(false);
        assert_eq!(DailyRecord::abstained().to_string().green().to_string(), "smoke-free");
    }
}
