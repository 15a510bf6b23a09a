use crate::demo::{run_demo, DemoArgs};
use crate::infra::{language_store, parse_language};
use crate::server;
use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::i18n::{Dictionaries, Language};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "HOPn Admissions",
    about = "Run the HOPn admissions service or exercise it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk a scripted application through all five steps and submit it
    Demo(DemoArgs),
    /// Look up a dot-path key in a locale dictionary
    Translate(TranslateArgs),
    /// Show the persisted site language, or select a new one
    Language(LanguageArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct TranslateArgs {
    /// Dot-path key, e.g. `nav.home`
    pub(crate) key: String,
    /// Language to translate into (defaults to the persisted selection)
    #[arg(long, value_parser = parse_language)]
    pub(crate) language: Option<Language>,
}

#[derive(Args, Debug)]
pub(crate) struct LanguageArgs {
    /// Language code to persist (`en`, `de`, `ar`)
    #[arg(value_parser = parse_language)]
    pub(crate) code: Option<Language>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
        Command::Translate(args) => run_translate(args),
        Command::Language(args) => run_language(args),
    }
}

fn run_translate(args: TranslateArgs) -> Result<(), AppError> {
    let language = match args.language {
        Some(language) => language,
        None => language_store(&AppConfig::load()?.language).current(),
    };
    println!("{}", Dictionaries::embedded().translate(language, &args.key));
    Ok(())
}

fn run_language(args: LanguageArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = language_store(&config.language);

    let attributes = match args.code {
        Some(language) => store.set_language(language)?,
        None => store.attributes(),
    };
    let language = attributes.lang;
    println!(
        "{} {} ({}, {})",
        language.flag(),
        language.name(),
        language.code(),
        attributes.dir.as_str()
    );
    Ok(())
}
