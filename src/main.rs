use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::json;
use xenolexia::dictionary::load_dictionary_file;
use xenolexia::{AppConfig, ContentProcessor, ProficiencyLevel, RenderMode, VocabularyService};

fn cli() -> Command {
    Command::new("xenolexia")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read in your language, learn another")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON configuration file")
                .env("XENOLEXIA_CONFIG")
                .default_value("xenolexia.json")
                .global(true),
        )
        .arg(
            Arg::new("dictionary")
                .long("dictionary")
                .help("Dictionary JSON file (overrides the configuration)")
                .global(true),
        )
        .arg(
            Arg::new("vocabulary")
                .long("vocabulary")
                .help("Vocabulary JSON file (overrides the configuration)")
                .global(true),
        )
        .arg(
            Arg::new("source-language")
                .long("source")
                .short('s')
                .help("Language of the text being read (e.g. en)")
                .global(true),
        )
        .arg(
            Arg::new("target-language")
                .long("target")
                .short('t')
                .help("Language being learned (e.g. es)")
                .global(true),
        )
        .subcommand(
            Command::new("process")
                .about("Substitute words in a text file")
                .arg(Arg::new("file").help("Text or HTML file to process").required(true))
                .arg(
                    Arg::new("density")
                        .long("density")
                        .short('d')
                        .help("Fraction of eligible words to substitute (0.0 - 1.0)")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("level")
                        .long("level")
                        .short('l')
                        .help("Proficiency level: beginner, intermediate or advanced"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .help("Output style")
                        .value_parser(["markup", "plain", "bracketed"]),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print content, substitutions and stats as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("install")
                .about("Install dictionary entries into the configured dictionary file")
                .arg(Arg::new("file").help("Dictionary JSON file to install").required(true)),
        )
        .subcommand(
            Command::new("save")
                .about("Save a word to the vocabulary")
                .arg(Arg::new("original").help("Word in the source language").required(true))
                .arg(Arg::new("foreign").help("Word in the target language").required(true))
                .arg(Arg::new("context").long("context").help("Sentence the word appeared in")),
        )
        .subcommand(
            Command::new("review")
                .about("Grade a review of a saved word")
                .arg(Arg::new("id").help("Vocabulary item id").required(true))
                .arg(
                    Arg::new("quality")
                        .help("Recall quality from 0 (blackout) to 5 (perfect)")
                        .required(true)
                        .value_parser(clap::value_parser!(u8)),
                ),
        )
        .subcommand(
            Command::new("due").about("List words due for review").arg(
                Arg::new("limit")
                    .long("limit")
                    .short('n')
                    .help("Maximum number of words")
                    .default_value("20")
                    .value_parser(clap::value_parser!(usize)),
            ),
        )
        .subcommand(Command::new("stats").about("Show vocabulary statistics"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let matches = cli().get_matches();
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("process", args)) => process(config, args).await,
        Some(("install", args)) => install(&config, args),
        Some(("save", args)) => save(&config, args).await,
        Some(("review", args)) => review(&config, args).await,
        Some(("due", args)) => due(&config, args).await,
        Some(("stats", _)) => stats(&config).await,
        _ => Ok(()),
    }
}

/// Configuration file, then environment, then global flags
fn load_config(matches: &ArgMatches) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = matches.get_one::<String>("config").map(PathBuf::from);
    let mut config = AppConfig::load(path.as_deref())?;

    if let Some(dictionary) = matches.get_one::<String>("dictionary") {
        config.dictionary_path = Some(PathBuf::from(dictionary));
    }
    if let Some(vocabulary) = matches.get_one::<String>("vocabulary") {
        config.vocabulary_path = Some(PathBuf::from(vocabulary));
    }
    if config.vocabulary_path.is_none() {
        config.vocabulary_path = Some(PathBuf::from("xenolexia-vocabulary.json"));
    }
    if let Some(source) = matches.get_one::<String>("source-language") {
        config.processing.source_language = source.clone();
    }
    if let Some(target) = matches.get_one::<String>("target-language") {
        config.processing.target_language = target.clone();
    }
    Ok(config)
}

async fn process(mut config: AppConfig, args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(density) = args.get_one::<f64>("density") {
        config.processing.density = *density;
    }
    if let Some(level) = args.get_one::<String>("level") {
        config.processing.proficiency_level = level.parse::<ProficiencyLevel>()?;
    }
    if let Some(mode) = args.get_one::<String>("mode") {
        config.processing.render_mode = match mode.as_str() {
            "plain" => RenderMode::Plain,
            "bracketed" => RenderMode::Bracketed,
            _ => RenderMode::Markup,
        };
    }

    let Some(file) = args.get_one::<String>("file") else {
        return Err("missing input file".into());
    };
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| format!("Failed to read '{}': {}", file, e))?;

    let dictionary = config.build_dictionary().await?;
    let processor = ContentProcessor::new(dictionary, &config.processing)?;
    let outcome = processor.process_content(&content).await;

    if let Some(reason) = outcome.degradation_reason() {
        eprintln!("⚠️  Dictionary unavailable, text left unchanged: {}", reason);
    }

    if args.get_flag("json") {
        let degraded = outcome.is_degraded();
        let processed = outcome.into_processed();
        let body = json!({
            "content": processed.content,
            "foreignWords": processed.foreign_words,
            "stats": processed.stats,
            "degraded": degraded,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        let stats = outcome.stats();
        println!("{}", outcome.content());
        eprintln!(
            "🌍 {}: replaced {} of {} eligible words ({} words total, {} ms)",
            processor.languages(),
            stats.replaced_words,
            stats.eligible_words,
            stats.total_words,
            stats.processing_time.as_millis()
        );
    }
    Ok(())
}

fn install(config: &AppConfig, args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let Some(file) = args.get_one::<String>("file") else {
        return Err("missing dictionary file".into());
    };

    let dictionary = config.load_local_dictionary()?;
    let before = dictionary.len();
    let report = load_dictionary_file(Path::new(file), &dictionary)?;

    println!(
        "📦 {} installed, {} skipped, {} failed",
        report.installed,
        report.skipped.len(),
        report.errors.len()
    );
    for issue in &report.skipped {
        println!("   skipped #{} ({}): {}", issue.index, issue.id.as_deref().unwrap_or("-"), issue.reason);
    }
    for issue in &report.errors {
        eprintln!("   ❌ #{} ({}): {}", issue.index, issue.id.as_deref().unwrap_or("-"), issue.reason);
    }

    match &config.dictionary_path {
        Some(path) if dictionary.len() > before => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(&dictionary.entries())?)?;
            println!("✅ Dictionary saved to {} ({} entries)", path.display(), dictionary.len());
        }
        Some(_) => {}
        None => {
            println!("ℹ️  No dictionary path configured; pass --dictionary to keep these entries");
        }
    }
    Ok(())
}

async fn save(config: &AppConfig, args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(original), Some(foreign)) =
        (args.get_one::<String>("original"), args.get_one::<String>("foreign"))
    else {
        return Err("missing word".into());
    };

    let service = VocabularyService::new(config.open_vocabulary().await?);
    let item = service
        .save_pair(original, foreign, &config.languages()?, args.get_one::<String>("context").cloned())
        .await?;
    println!("✅ {} → {} saved as {}", item.source_word, item.target_word, item.id);
    Ok(())
}

async fn review(config: &AppConfig, args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(id), Some(quality)) = (args.get_one::<String>("id"), args.get_one::<u8>("quality")) else {
        return Err("missing id or quality".into());
    };

    let service = VocabularyService::new(config.open_vocabulary().await?);
    let item = service.record_review(id, i64::from(*quality)).await?;
    println!(
        "📝 {} → {}: {} (interval {} days, ease {:.2}, {} reviews)",
        item.source_word, item.target_word, item.status, item.interval, item.ease_factor, item.review_count
    );
    Ok(())
}

async fn due(config: &AppConfig, args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let limit = args.get_one::<usize>("limit").copied().unwrap_or(20);
    let service = VocabularyService::new(config.open_vocabulary().await?);
    let items = service.due_for_review(limit).await?;

    if items.is_empty() {
        println!("🎉 Nothing due for review");
        return Ok(());
    }
    for item in items {
        println!("{}  {:<9} {} → {}", item.id, item.status, item.source_word, item.target_word);
    }
    Ok(())
}

async fn stats(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let service = VocabularyService::new(config.open_vocabulary().await?);
    let stats = service.stats().await?;
    println!("📚 {} words, {} due", stats.total, stats.due);
    println!("   new {}  learning {}  review {}  learned {}", stats.new, stats.learning, stats.review, stats.learned);
    Ok(())
}
