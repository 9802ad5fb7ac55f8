//! skills CLI - PDF editing, image generation, voice calls and email

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pi_skills::edit::PageTarget;
use pi_skills::image::{ImageOptions, ImagesClient};
use pi_skills::pdf::{self, external, EditOptions, NanoPdf, PageOutcome, PageRanges};
use pi_skills::voice::{CallRequest, CallStatus, Provider, VoiceConfig, VoiceProvider};
use pi_skills::EmailConfig;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "skills")]
#[command(version)]
#[command(about = "Agent skills: PDF edits, image generation, voice calls and email", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit and manipulate PDF files
    #[command(subcommand)]
    Pdf(PdfCommand),

    /// Generate images via the OpenAI Images API
    Image(ImageArgs),

    /// Place and manage outbound voice calls
    #[command(subcommand)]
    Call(CallCommand),

    /// Send a plain-text email over SMTP
    Email(EmailArgs),

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum PdfCommand {
    /// Edit a PDF with a natural language instruction
    Edit {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page number (0-based) or 'all'
        #[arg(value_name = "PAGE")]
        page: String,

        /// Natural language instruction, e.g. "replace 'Draft' with 'Final'"
        #[arg(value_name = "INSTRUCTION")]
        instruction: String,

        /// Output file (overwrites the input if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Delegate to an installed nano-pdf CLI
        #[arg(long)]
        external: bool,

        /// Print the edit report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List pages with their first line of text
    Pages {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Merge PDFs in order
    Merge {
        /// Input PDF files
        #[arg(value_name = "FILE", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, value_name = "FILE", default_value = "merged.pdf")]
        output: PathBuf,
    },

    /// Split a PDF into one file per page
    Split {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short = 'd', long, value_name = "DIR", default_value = "./pages/")]
        output_dir: PathBuf,
    },

    /// Copy selected pages into a new PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page ranges, 1-based (e.g., "1-5,7,9-10")
        #[arg(value_name = "PAGES")]
        pages: String,

        /// Output file
        #[arg(short, long, value_name = "FILE", default_value = "extracted.pdf")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct ImageArgs {
    /// Image generation prompt
    #[arg(long)]
    prompt: String,

    /// Number of images to generate
    #[arg(long, default_value_t = 1)]
    count: usize,

    /// Image model id (dall-e-2, dall-e-3, gpt-image-1)
    #[arg(long, default_value = pi_skills::image::DEFAULT_MODEL)]
    model: String,

    /// Image size (e.g., 1024x1024, 1792x1024)
    #[arg(long, default_value = "")]
    size: String,

    /// Image quality (standard, hd, low, medium, high)
    #[arg(long, default_value = "")]
    quality: String,

    /// Background (GPT models): transparent, opaque, auto
    #[arg(long, default_value = "")]
    background: String,

    /// Output format (GPT models): png, jpeg, webp
    #[arg(long, default_value = "")]
    output_format: String,

    /// Image style (DALL-E 3): vivid, natural
    #[arg(long, default_value = "")]
    style: String,

    /// Output directory
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,
}

#[derive(Subcommand)]
enum CallCommand {
    /// Start a call
    Start {
        /// Destination phone number (e.g., +15555550123)
        #[arg(short, long)]
        to: String,

        /// Text message for TTS
        #[arg(short, long, required_unless_present = "ssml", conflicts_with = "ssml")]
        message: Option<String>,

        /// SSML for custom voice synthesis
        #[arg(short, long)]
        ssml: Option<String>,

        /// Webhook URL for call events
        #[arg(short, long)]
        webhook_url: Option<String>,
    },

    /// Get call status
    Status {
        /// Call id returned by `call start`
        #[arg(short, long)]
        call_id: String,
    },

    /// End an active call
    Hangup {
        /// Call id returned by `call start`
        #[arg(short, long)]
        call_id: String,
    },
}

#[derive(Args)]
struct EmailArgs {
    /// Recipient address
    to: String,

    /// Subject line
    subject: String,

    /// Message body
    body: String,

    /// SMTP user (sender address)
    #[arg(long, env = "POPEBOT_EMAIL_USER", default_value = "")]
    user: String,

    /// SMTP password (for Gmail, an App Password)
    #[arg(long, env = "POPEBOT_EMAIL_PASS", hide_env_values = true, default_value = "")]
    password: String,

    /// SMTP server
    #[arg(long, default_value = pi_skills::email::DEFAULT_SMTP_HOST)]
    host: String,

    /// SMTP port (implicit TLS)
    #[arg(long, default_value_t = pi_skills::email::DEFAULT_SMTP_PORT)]
    port: u16,

    /// Display name in the From header
    #[arg(long, default_value = pi_skills::email::DEFAULT_SENDER_NAME)]
    sender_name: String,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pdf(cmd) => cmd_pdf(cmd),
        Commands::Image(args) => cmd_image(args),
        Commands::Call(cmd) => cmd_call(cmd),
        Commands::Email(args) => cmd_email(args),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(exit_code(e.as_ref()));
    }
}

/// 2 for missing credentials, 1 for everything else.
fn exit_code(e: &(dyn std::error::Error + 'static)) -> i32 {
    match e.downcast_ref::<pi_skills::Error>() {
        Some(err) if err.is_config() => 2,
        _ => 1,
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn cmd_pdf(cmd: PdfCommand) -> CmdResult {
    match cmd {
        PdfCommand::Edit {
            input,
            page,
            instruction,
            output,
            external,
            json,
        } => {
            if external {
                cmd_edit_external(&input, &page, &instruction, output)
            } else {
                cmd_edit(&input, &page, &instruction, output, json)
            }
        }
        PdfCommand::Info { input, json } => cmd_info(&input, json),
        PdfCommand::Pages { input } => cmd_pages(&input),
        PdfCommand::Merge { inputs, output } => cmd_merge(&inputs, &output),
        PdfCommand::Split { input, output_dir } => cmd_split(&input, &output_dir),
        PdfCommand::Extract {
            input,
            pages,
            output,
        } => cmd_extract(&input, &pages, &output),
    }
}

fn cmd_edit(
    input: &Path,
    page: &str,
    instruction: &str,
    output: Option<PathBuf>,
    json: bool,
) -> CmdResult {
    let mut options = EditOptions::new(PageTarget::parse(page)?);
    if let Some(path) = output {
        options = options.with_output(path);
    }

    let report = pdf::edit_file(input, instruction, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for outcome in &report.pages {
        match outcome {
            PageOutcome::Replaced { .. } => println!("{}", outcome.to_string().green()),
            PageOutcome::NoMatch { .. } => println!("{}", outcome.to_string().yellow()),
            PageOutcome::Unsupported { .. } => println!("{}", outcome.to_string().yellow()),
            PageOutcome::Listing { .. } => println!("{}", outcome),
        }
    }
    println!("\n{} {}", "Saved to:".green(), report.output.display());
    Ok(())
}

fn cmd_edit_external(
    input: &Path,
    page: &str,
    instruction: &str,
    output: Option<PathBuf>,
) -> CmdResult {
    let tool = NanoPdf::detect().ok_or(
        "nano-pdf CLI not found. For simple edits, drop --external. Install with: pip install nano-pdf",
    )?;
    let output = output.unwrap_or_else(|| external::default_output(input));

    tool.edit(input, page, instruction, &output)?;
    println!("{} {}", "Successfully edited PDF:".green(), output.display());
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> CmdResult {
    let info = pdf::info(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), info.path.display());
    println!("{}: PDF {}", "Format".bold(), info.version);
    println!("{}: {}", "Pages".bold(), info.page_count);

    if !info.metadata.is_empty() {
        println!();
        println!("{}", "Metadata".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (key, value) in &info.metadata {
            println!("{}: {}", key.bold(), value);
        }
    }
    Ok(())
}

fn cmd_pages(input: &Path) -> CmdResult {
    let pages = pdf::list_pages(input)?;
    println!("{} {}\n", "Total pages:".bold(), pages.len());

    for page in pages {
        println!("{}", format!("Page {}:", page.index).cyan());
        if let Some(line) = page.first_line {
            println!("  First line: {}", line);
        }
        println!();
    }
    Ok(())
}

fn cmd_merge(inputs: &[PathBuf], output: &Path) -> CmdResult {
    let report = pdf::merge(inputs, output)?;
    for skipped in &report.skipped {
        println!("{} {}", "Skipped (not found):".yellow(), skipped.display());
    }
    println!(
        "{} {} files ({} pages) into: {}",
        "Merged".green().bold(),
        report.added.len(),
        report.page_count,
        output.display()
    );
    Ok(())
}

fn cmd_split(input: &Path, output_dir: &Path) -> CmdResult {
    let pb = progress_bar(0);
    pb.set_message("Splitting...");
    let written = pdf::split_with_progress(input, output_dir, |done, total| {
        pb.set_length(u64::from(total));
        pb.set_position(u64::from(done));
    })?;
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} pages into: {}",
        "Split".green().bold(),
        written.len(),
        output_dir.display()
    );
    Ok(())
}

fn cmd_extract(input: &Path, pages: &str, output: &Path) -> CmdResult {
    let ranges = PageRanges::parse(pages)?;
    let extracted = pdf::extract(input, &ranges, output)?;
    println!(
        "{} {} pages to: {}",
        "Extracted".green().bold(),
        extracted.len(),
        output.display()
    );
    Ok(())
}

fn cmd_image(args: ImageArgs) -> CmdResult {
    let client = ImagesClient::new(args.api_key.as_str())?;

    let mut options = ImageOptions::new(args.prompt)
        .with_count(args.count)
        .with_model(args.model)
        .with_size(args.size)
        .with_quality(args.quality)
        .with_background(args.background)
        .with_output_format(args.output_format)
        .with_style(args.style);
    if let Some(dir) = args.out_dir {
        options = options.with_out_dir(dir);
    }

    let pb = progress_bar(options.count as u64);
    let run = pi_skills::image::generate(&client, &options, |done, total| {
        pb.set_position(done as u64);
        if done < total {
            pb.set_message(format!("Generating image {}/{}...", done + 1, total));
        }
    })?;
    pb.finish_with_message("Done!");

    println!("\n{} {} image(s)", "Generated".green().bold(), run.items.len());
    println!("{}: {}", "Output".bold(), run.out_dir.display());
    println!("{}: {}", "Gallery".bold(), run.gallery.display());
    Ok(())
}

fn print_call(label: &str, status: &CallStatus) {
    println!("{} {}", label.cyan().bold(), status.call_id);
    println!("   Status: {}", status.status);
    if let Some(to) = &status.to {
        println!("   To: {}", to);
    }
    if let Some(duration) = status.duration {
        println!("   Duration: {}s", duration);
    }
}

fn cmd_call(cmd: CallCommand) -> CmdResult {
    let config = VoiceConfig::from_env();
    let mut provider = Provider::from_config(&config)?;
    log::debug!("using voice provider {}", provider.name());

    match cmd {
        CallCommand::Start {
            to,
            message,
            ssml,
            webhook_url,
        } => {
            let mut request = match (message, ssml) {
                (Some(message), _) => CallRequest::text(to, message),
                (None, Some(ssml)) => CallRequest::ssml(to, ssml),
                (None, None) => return Err("--message or --ssml required".into()),
            };
            if let Some(url) = webhook_url {
                request = request.with_webhook(url);
            }
            let status = provider.initiate_call(&request)?;
            print_call(&format!("Call initiated via {}:", provider.name()), &status);
            println!("   From: {}", config.from_number);
        }
        CallCommand::Status { call_id } => {
            let status = provider.get_status(&call_id)?;
            print_call("Call status:", &status);
        }
        CallCommand::Hangup { call_id } => {
            let status = provider.hangup(&call_id)?;
            println!("{} {}", "Call ended:".cyan().bold(), status.call_id);
        }
    }
    Ok(())
}

fn cmd_email(args: EmailArgs) -> CmdResult {
    let config = EmailConfig::new(args.user, args.password)?
        .with_host(args.host)
        .with_port(args.port)
        .with_sender_name(args.sender_name);

    pi_skills::send_email(&config, &args.to, &args.subject, &args.body)?;
    println!("{} {}", "Email sent successfully to".green(), args.to);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "skills".cyan().bold(), pi_skills::VERSION);
    println!("Agent skills toolkit");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_call_status_requires_call_id() {
        assert!(Cli::try_parse_from(["skills", "call", "status"]).is_err());
        assert!(Cli::try_parse_from(["skills", "call", "status", "--call-id", "MOCK_1"]).is_ok());
    }

    #[test]
    fn test_call_start_requires_content() {
        assert!(Cli::try_parse_from(["skills", "call", "start", "--to", "+1"]).is_err());
        assert!(Cli::try_parse_from(["skills", "call", "start", "--to", "+1", "-m", "hi"]).is_ok());
        assert!(Cli::try_parse_from(["skills", "call", "start", "--to", "+1", "-s", "<speak/>"]).is_ok());
        assert!(Cli::try_parse_from([
            "skills", "call", "start", "--to", "+1", "-m", "hi", "-s", "<speak/>"
        ])
        .is_err());
    }

    #[test]
    fn test_pdf_defaults() {
        let cli = Cli::try_parse_from(["skills", "pdf", "merge", "a.pdf", "b.pdf"]).unwrap();
        match cli.command {
            Commands::Pdf(PdfCommand::Merge { inputs, output }) => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(output, PathBuf::from("merged.pdf"));
            }
            _ => panic!("expected pdf merge"),
        }
    }

    #[test]
    fn test_exit_code() {
        let config: Box<dyn std::error::Error> = Box::new(pi_skills::Error::Config("x".into()));
        assert_eq!(exit_code(config.as_ref()), 2);
        let other: Box<dyn std::error::Error> = "boom".into();
        assert_eq!(exit_code(other.as_ref()), 1);
    }
}
