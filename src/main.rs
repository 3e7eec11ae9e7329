mod config;
mod contact;
mod directory;
mod search;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use config::Config;
use contact::Contact;
use directory::Directory;

#[derive(Parser, Debug)]
#[command(name = "rolo")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Contacts seed file: a JSON array of contact records
    #[arg(long)]
    contacts: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the sectioned projection for a query (for scripts and tests)
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Search term (substring of "<first> <last>", case-insensitive)
    query: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let contacts = load_contacts(cli.contacts.as_deref(), &config)?;

    if let Some(Command::Query(args)) = cli.command {
        return handle_query(&contacts, &args);
    }

    let mut app = ui::app::App::new(Directory::new(contacts), &config);
    app.run()
}

fn load_contacts(flag: Option<&Path>, config: &Config) -> Result<Vec<Contact>> {
    let path = flag
        .map(Path::to_path_buf)
        .or_else(|| config.contacts_path.clone());
    match path {
        Some(path) => Ok(contact::load_seed(&path)?),
        None => Ok(contact::builtin_contacts()),
    }
}

fn handle_query(contacts: &[Contact], args: &QueryArgs) -> Result<()> {
    let sections = directory::project(contacts, &args.query);
    let total: usize = sections.iter().map(|s| s.data.len()).sum();

    if total == 0 {
        println!("No matches for \"{}\"", args.query);
        return Ok(());
    }
    println!("Found {} contact(s) matching \"{}\"", total, args.query);

    for section in &sections {
        println!("# {}", section.title);
        for contact in &section.data {
            match contact.primary_number() {
                Some(number) => println!("{}\t{}", contact.full_name(), number),
                None => println!("{}", contact.full_name()),
            }
        }
    }

    Ok(())
}
