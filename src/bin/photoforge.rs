//! CLI for PhotoForge - AI photo editing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use photoforge::view::{color_options, tool_options, ResultPanel};
use photoforge::{
    BackgroundColor, GeminiModel, GeminiTransformer, Outcome, Session, SessionState, Tool,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Notice shown when the 720p export cannot be produced.
const SD_FAILURE_NOTICE: &str =
    "Failed to load image for resizing. Please try downloading the HD version.";

#[derive(Parser)]
#[command(name = "photoforge")]
#[command(about = "Remove backgrounds, enhance photos and create passport photos via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove the background, leaving the subject on transparency
    RemoveBackground(EditArgs),

    /// Enhance lighting, color and sharpness
    Enhance(EditArgs),

    /// Turn a portrait into a passport photo
    Passport(PassportArgs),

    /// List tools and background colors
    Tools,
}

#[derive(Args)]
struct EditArgs {
    /// Photo to edit (PNG, JPEG or WEBP)
    input: PathBuf,

    /// Where to write the full-resolution result
    /// [default: <input name>_8K_HD.png]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a copy scaled to 720 pixels on the longer edge
    #[arg(long, value_name = "PATH")]
    sd: Option<PathBuf>,

    /// Gemini model to use
    #[arg(short, long, value_enum, default_value = "flash")]
    model: ModelArg,
}

#[derive(Args)]
struct PassportArgs {
    #[command(flatten)]
    edit: EditArgs,

    /// Background of the passport photo
    #[arg(short, long, value_enum, default_value = "white")]
    background: BackgroundArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    /// gemini-2.5-flash-image
    Flash,
    /// nano-banana-pro-preview
    Pro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => GeminiModel::NanoBanana,
            ModelArg::Pro => GeminiModel::NanoBananaPro,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackgroundArg {
    Original,
    White,
    Black,
    Grey,
    Blue,
    Red,
}

impl From<BackgroundArg> for BackgroundColor {
    fn from(arg: BackgroundArg) -> Self {
        match arg {
            BackgroundArg::Original => BackgroundColor::Original,
            BackgroundArg::White => BackgroundColor::White,
            BackgroundArg::Black => BackgroundColor::Black,
            BackgroundArg::Grey => BackgroundColor::Grey,
            BackgroundArg::Blue => BackgroundColor::Blue,
            BackgroundArg::Red => BackgroundColor::Red,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RemoveBackground(args) => {
            run_tool(Tool::RemoveBackground, None, args, cli.json).await?;
        }
        Commands::Enhance(args) => {
            run_tool(Tool::Enhance, None, args, cli.json).await?;
        }
        Commands::Passport(args) => {
            run_tool(
                Tool::PassportPhoto,
                Some(args.background.into()),
                args.edit,
                cli.json,
            )
            .await?;
        }
        Commands::Tools => {
            list_tools(cli.json)?;
        }
    }

    Ok(())
}

async fn run_tool(
    tool: Tool,
    background: Option<BackgroundColor>,
    args: EditArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let transformer = GeminiTransformer::builder()
        .model(args.model.into())
        .build()?;
    let session = Session::new(transformer);

    session.select_tool(tool).await;
    if let Some(color) = background {
        session.set_background(color).await;
    }

    if !json_output {
        println!("{}", tool.title());
        println!("{}\n", tool.description());
        if let Some(color) = background {
            println!("Background: {}", color.label());
        }
        eprintln!("{}", tool.loading_text());
    }

    match session.upload_path(&args.input).await {
        Outcome::Ready(_) => {}
        Outcome::Failed(message) => {
            if json_output {
                let result = serde_json::json!({
                    "success": false,
                    "tool": tool.as_str(),
                    "error": message,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                render_panel(&session.snapshot().await);
            }
            anyhow::bail!("{message}");
        }
        Outcome::Superseded => anyhow::bail!("request was superseded"),
    }

    let state = session.snapshot().await;
    if !json_output {
        render_panel(&state);
    }

    let hd = session
        .hd_download()
        .await
        .ok_or_else(|| anyhow::anyhow!("no result to download"))?;
    let hd_path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input, &hd.file_name));
    std::fs::write(&hd_path, &hd.data)?;

    let mut sd_path = None;
    if let Some(path) = args.sd {
        match session.sd_download().await {
            Ok(Some(sd)) => {
                std::fs::write(&path, &sd.data)?;
                sd_path = Some(path);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("720p export failed: {e}");
                eprintln!("{SD_FAILURE_NOTICE}");
            }
        }
    }

    let image = state.status.result();
    if json_output {
        let result = serde_json::json!({
            "success": true,
            "tool": tool.as_str(),
            "background": background.filter(|_| tool.uses_background_color()).map(|c| c.as_str()),
            "output": hd_path.display().to_string(),
            "sd_output": sd_path.as_ref().map(|p| p.display().to_string()),
            "size_bytes": hd.data.len(),
            "model": image.and_then(|i| i.metadata.model.clone()),
            "duration_ms": image.and_then(|i| i.metadata.duration_ms),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Saved: {} ({} bytes)",
            hd_path.display(),
            hd.data.len()
        );
        if let Some(path) = sd_path {
            println!("Saved 720p: {}", path.display());
        }
        if let Some(duration) = image.and_then(|i| i.metadata.duration_ms) {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}

/// Places a download next to the input photo.
fn default_output_path(input: &Path, file_name: &str) -> PathBuf {
    match input.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn render_panel(state: &SessionState) {
    match ResultPanel::from_state(state) {
        ResultPanel::Loading { text } => println!("{text}"),
        ResultPanel::Error { message } => {
            println!("An Error Occurred");
            println!("  {message}");
        }
        ResultPanel::Result {
            hd_file_name,
            sd_file_name,
            ..
        } => {
            println!("Result ready");
            println!("  Download 8K:   {hd_file_name}");
            println!("  Download 720p: {sd_file_name} (use --sd)");
        }
        ResultPanel::Placeholder => println!("Your processed image will appear here."),
    }
}

fn list_tools(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ToolInfo {
        id: &'static str,
        name: &'static str,
        description: &'static str,
        backgrounds: Option<Vec<&'static str>>,
    }

    let state = SessionState::default();
    let tools: Vec<ToolInfo> = tool_options(&state)
        .into_iter()
        .map(|option| {
            let state = SessionState::new(option.tool);
            ToolInfo {
                id: option.tool.as_str(),
                name: option.tool.label(),
                description: option.tool.description(),
                backgrounds: color_options(&state)
                    .map(|colors| colors.into_iter().map(|c| c.color.as_str()).collect()),
            }
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&tools)?);
    } else {
        println!("Available tools:\n");
        for t in &tools {
            println!("  {} ({})", t.name, t.id);
            println!("    {}", t.description);
            if let Some(ref colors) = t.backgrounds {
                println!("    Backgrounds: {}", colors.join(", "));
            }
        }
        println!("\nAPI key: GOOGLE_API_KEY (or API_KEY)");
    }

    Ok(())
}
