use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use cv_forge::generator::ResumeGenerator;
use cv_forge::parser::{AiParser, AiSettings, DocumentParser};
use cv_forge::validation::{InputSanitizer, ResumeValidator};
use cv_forge::{parse_resume_file, start_web_server, AppConfig, ResumeFields};

#[derive(Parser)]
#[command(name = "cvforge")]
#[command(about = "Resume parsing, validation and document generation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API server
    Serve {
        /// Listen port, overriding CVFORGE_PORT and the default
        #[arg(long)]
        port: Option<u16>,
    },
    /// Parse a PDF or Word resume into labeled sections
    Parse {
        file: PathBuf,
        /// Use the configured AI provider instead of pattern matching
        #[arg(long)]
        ai: bool,
    },
    /// Validate a resume JSON file and print the report
    Validate { file: PathBuf },
    /// Configure the AI provider used by `parse --ai` and the API
    AiSetup {
        /// gemini, huggingface, ollama, lmstudio, openai or custom
        provider: String,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Render a resume JSON file to PDF and/or DOCX
    Export {
        file: PathBuf,
        /// pdf, docx or all
        #[arg(long, default_value = "pdf")]
        format: String,
        #[arg(long, default_value = "classic")]
        template: String,
        /// Output filename without extension
        #[arg(long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or(EnvFilter::new("cv_forge=info,rocket::server=off")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            start_web_server(config).await
        }
        Command::Parse { file, ai } => parse_command(&file, ai).await,
        Command::Validate { file } => validate_command(&file),
        Command::AiSetup {
            provider,
            api_key,
            model,
            endpoint,
        } => ai_setup_command(&provider, api_key, model, endpoint),
        Command::Export {
            file,
            format,
            template,
            output,
        } => export_command(&config, &file, &format, &template, output.as_deref()),
    }
}

async fn parse_command(file: &PathBuf, ai: bool) -> Result<()> {
    let fields = if ai {
        let text = DocumentParser::parse_document(file)?;
        let text = InputSanitizer::sanitize_text(&text, 100_000);
        let parser = AiParser::new(AiSettings::load())?;
        info!("Parsing with {} provider", parser.settings().provider);
        parser.parse_resume(&text).await?
    } else {
        parse_resume_file(file)?
    };

    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

fn ai_setup_command(
    provider: &str,
    api_key: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
) -> Result<()> {
    let mut settings = AiSettings::new(provider.parse()?);
    if let Some(key) = api_key {
        settings.api_key = key;
    }
    if let Some(model) = model {
        settings.model = model;
    }
    if let Some(endpoint) = endpoint {
        settings.endpoint = endpoint;
    }

    settings.save()?;
    println!(
        "AI provider set to {} (model: {})",
        settings.provider, settings.model
    );
    Ok(())
}

fn validate_command(file: &PathBuf) -> Result<()> {
    let fields = read_fields(file)?;
    let report = ResumeValidator::report(&fields);

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.is_valid {
        Ok(())
    } else {
        anyhow::bail!(
            "Validation failed with {} error(s)",
            report.error_count
        )
    }
}

fn export_command(
    config: &AppConfig,
    file: &PathBuf,
    format: &str,
    template: &str,
    name: Option<&str>,
) -> Result<()> {
    let fields = read_fields(file)?;

    if let Err(reason) = ResumeValidator::can_export(&fields) {
        anyhow::bail!("Cannot export: {}", reason);
    }

    let generator = ResumeGenerator::new(&config.output_path);

    match format {
        "pdf" => {
            let path = generator.generate_pdf(&fields, name, template)?;
            println!("Wrote {}", path.display());
        }
        "docx" => {
            let path = generator.generate_docx(&fields, name, template)?;
            println!("Wrote {}", path.display());
        }
        "all" => {
            for (_, path) in generator.generate_all_formats(&fields, name, template)? {
                println!("Wrote {}", path.display());
            }
        }
        other => anyhow::bail!("Unsupported format: {}. Use pdf, docx or all", other),
    }

    Ok(())
}

fn read_fields(file: &PathBuf) -> Result<ResumeFields> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Malformed resume JSON: {}", file.display()))
}
