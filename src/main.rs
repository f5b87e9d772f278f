// idcard-designer: design, preview and print student ID cards

use chrono::Local;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use idcard_designer::editor::Command;
use idcard_designer::store::{find_template, FileAuditSink, JsonFileStore, LogAuditSink};
use idcard_designer::student::{load_roster, sample_student};
use idcard_designer::template::TemplatePatch;
use idcard_designer::{
    images, pdf, render, save, AuditSink, DesignerConfig, DesignerError, Editor, Orientation, Result, Scale, Side,
    Student, Template, TemplateStore,
};
use log::debug;
use std::sync::Arc;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(author, version, about = "Design, preview and print student ID cards")]
struct Args {
    /// Editor settings file (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(ClapArgs, Debug)]
struct StoreArgs {
    /// Template store file (JSON)
    #[arg(short, long, default_value = "templates.json")]
    store: String,
}

#[derive(ClapArgs, Debug)]
struct SaveArgs {
    /// Name recorded in the audit log
    #[arg(long, default_value = "admin")]
    actor: String,

    /// Append audit entries to this file instead of the log
    #[arg(long)]
    audit_log: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a template from the standard layout and save it
    New {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        audit: SaveArgs,

        /// Template name
        #[arg(short, long)]
        name: String,

        #[arg(long, value_enum, default_value = "horizontal")]
        orientation: OrientationArg,
    },
    /// List saved templates
    List {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Apply a JSON array of editor commands to a template and save it
    Edit {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        audit: SaveArgs,

        /// Template id or name
        #[arg(short, long)]
        template: String,

        /// Commands file
        #[arg(short, long)]
        commands: String,
    },
    /// Load an image (file path or URL) into a template slot
    SetImage {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        audit: SaveArgs,

        /// Template id or name
        #[arg(short, long)]
        template: String,

        #[arg(long, value_enum)]
        slot: SlotArg,

        /// File path or URL
        #[arg(long)]
        source: String,
    },
    /// Print the visual tree of one card side as JSON
    Preview {
        #[command(flatten)]
        store: StoreArgs,

        /// Template id or name
        #[arg(short, long)]
        template: String,

        /// Student roster file (JSON array); the first student is shown
        #[arg(long)]
        roster: Option<String>,

        #[arg(long, value_enum, default_value = "front")]
        side: SideArg,

        /// Zoom percentage (1-50), defaults to the configured zoom
        #[arg(long)]
        zoom: Option<u32>,
    },
    /// Print cards for every student in the roster to a PDF
    Print {
        #[command(flatten)]
        store: StoreArgs,

        /// Template id or name
        #[arg(short, long)]
        template: String,

        /// Student roster file (JSON array); a sample card is printed without one
        #[arg(long)]
        roster: Option<String>,

        /// Output filename (defaults to idcards-{date}-{template}.pdf)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OrientationArg {
    Horizontal,
    Vertical,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Horizontal => Orientation::Horizontal,
            OrientationArg::Vertical => Orientation::Vertical,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SideArg {
    Front,
    Back,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Front => Side::Front,
            SideArg::Back => Side::Back,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SlotArg {
    Logo,
    Sign,
    Background,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = DesignerConfig::load_or_default(&args.config)?;
    debug!("config: {:?}", config);

    match args.command {
        Cmd::New {
            store,
            audit,
            name,
            orientation,
        } => {
            let template = Template {
                name,
                ..Template::standard()
            };
            let mut editor = Editor::new(template, config);
            editor.set_orientation(orientation.into());
            let saved = save_editor(&mut editor, &store, &audit)?;
            println!("✓ Created: {}", saved.name);
            print_saved(&saved);
        }
        Cmd::List { store } => {
            let templates = JsonFileStore::new(&store.store).get_templates()?;
            if templates.is_empty() {
                println!("No templates in {}", store.store);
            }
            for t in templates {
                println!(
                    "{}  {}  {:?}  {} fields",
                    t.id.as_deref().unwrap_or("-"),
                    t.name,
                    t.orientation,
                    t.fields.len()
                );
            }
        }
        Cmd::Edit {
            store,
            audit,
            template,
            commands,
        } => {
            let commands = load_commands(&commands)?;
            let mut editor = Editor::new(load_template(&store, &template)?, config);
            editor.execute_all(&commands)?;
            let saved = save_editor(&mut editor, &store, &audit)?;
            println!("✓ Applied {} commands to {}", commands.len(), saved.name);
            print_saved(&saved);
        }
        Cmd::SetImage {
            store,
            audit,
            template,
            slot,
            source,
        } => {
            let payload = images::load_payload(&source)?;
            let mut editor = Editor::new(load_template(&store, &template)?, config);
            editor.update_template(image_patch(slot, payload));
            let saved = save_editor(&mut editor, &store, &audit)?;
            println!("✓ Updated {:?} image of {}", slot, saved.name);
            print_saved(&saved);
        }
        Cmd::Preview {
            store,
            template,
            roster,
            side,
            zoom,
        } => {
            let template = load_template(&store, &template)?;
            let student = sample_student(&load_students(&roster)?);
            let scale = Scale::from_zoom(zoom.unwrap_or(config.zoom));
            let tree = render(&template, &student, side.into(), scale);
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Cmd::Print {
            store,
            template,
            roster,
            output,
        } => {
            let template = load_template(&store, &template)?;
            let students = load_students(&roster)?;
            let output_file = output.unwrap_or_else(|| default_output_name(&template));
            pdf::write_cards(&template, &students, &output_file)?;

            println!("✓ Generated: {}", output_file);
            println!("  Template: {}", template.name);
            println!("  Cards: {}", students.len().max(1));
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn load_template(store: &StoreArgs, id_or_name: &str) -> Result<Template> {
    let templates = JsonFileStore::new(&store.store).get_templates()?;
    find_template(&templates, id_or_name)
}

fn load_students(path: &Option<String>) -> Result<Vec<Student>> {
    match path {
        Some(p) => load_roster(p),
        None => Ok(Vec::new()),
    }
}

fn load_commands(path: &str) -> Result<Vec<Command>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DesignerError::Commands(format!("{}: {}", path, e)))?;
    serde_json::from_str(&content).map_err(|e| DesignerError::Commands(format!("Invalid JSON: {}", e)))
}

fn save_editor(editor: &mut Editor, store: &StoreArgs, args: &SaveArgs) -> Result<Template> {
    let mut templates = JsonFileStore::new(&store.store);
    let audit: Box<dyn AuditSink> = match &args.audit_log {
        Some(path) => Box::new(FileAuditSink::new(path)),
        None => Box::new(LogAuditSink),
    };
    save(editor, &mut templates, audit.as_ref(), &args.actor)
}

fn image_patch(slot: SlotArg, payload: Arc<str>) -> TemplatePatch {
    match slot {
        SlotArg::Logo => TemplatePatch {
            show_logo: Some(true),
            logo_image: Some(payload),
            ..Default::default()
        },
        SlotArg::Sign => TemplatePatch {
            sign_image: Some(payload),
            ..Default::default()
        },
        SlotArg::Background => TemplatePatch {
            background_kind: Some(idcard_designer::template::BackgroundKind::Image),
            background_image: Some(payload),
            ..Default::default()
        },
    }
}

fn print_saved(template: &Template) {
    println!("  ID: {}", template.id.as_deref().unwrap_or("-"));
    println!("  Orientation: {:?}", template.orientation);
    println!("  Fields: {}", template.fields.len());
}

fn default_output_name(template: &Template) -> String {
    let sanitized_name = template
        .name
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect::<String>();
    format!("idcards-{}-{}.pdf", Local::now().format("%Y-%m-%d"), sanitized_name)
}
