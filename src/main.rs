// memwalk: bounded pretty-printers for pointer structures

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info, warn};

use memwalk::constants::DEFAULT_MAX_DEPTH;
use memwalk::demo::{self, Scene, SCENE_NAMES};
use memwalk::registry::{self, Registry};
use memwalk::render::{render, RenderOptions};
use memwalk::ui::{App, RenderedScene};

/// Parsed command line
struct Options {
    scene: String,
    plain: bool,
    verbose: bool,
    max_depth: usize,
    printers: Vec<String>,
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] [SCENE]", program_name);
    eprintln!();
    eprintln!("Scenes: {}, all (default)", SCENE_NAMES.join(", "));
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --plain              Print to stdout instead of opening the viewer");
    eprintln!(
        "  --max-depth N        Nesting depth before values are elided (default {})",
        DEFAULT_MAX_DEPTH
    );
    eprintln!("  --printer SPEC       Register TYPE=KIND[:key=value,...] (repeatable)");
    eprintln!("  -v, --verbose        Debug logging on stderr");
    eprintln!("  -h, --help           Show this message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --plain cyclic-tree", program_name);
    eprintln!(
        "  {} --printer 'struct Node=list:limit=3' long-list",
        program_name
    );
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        scene: "all".to_string(),
        plain: false,
        verbose: false,
        max_depth: DEFAULT_MAX_DEPTH,
        printers: Vec::new(),
    };
    let mut scene = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--plain" => options.plain = true,
            "-v" | "--verbose" => options.verbose = true,
            "--max-depth" => {
                let value = iter.next().ok_or("--max-depth needs a value")?;
                options.max_depth = value
                    .parse()
                    .map_err(|_| format!("invalid depth '{}'", value))?;
            }
            "--printer" => {
                let value = iter.next().ok_or("--printer needs a value")?;
                options.printers.push(value.clone());
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
            name => {
                if scene.replace(name.to_string()).is_some() {
                    return Err("only one scene may be given".to_string());
                }
            }
        }
    }

    if let Some(scene) = scene {
        options.scene = scene;
    }
    Ok(options)
}

fn render_scene(scene: &Scene, options: RenderOptions) -> RenderedScene {
    let mut lines = Vec::new();
    for (label, addr) in &scene.roots {
        lines.extend(render(
            registry::global(),
            label,
            scene.heap.root(*addr),
            options,
        ));
    }
    debug!(scene = scene.name, lines = lines.len(), "scene rendered");
    RenderedScene {
        name: scene.name.to_string(),
        description: scene.description.to_string(),
        lines,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("memwalk");

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage(program_name);
        return Ok(());
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage(program_name);
            std::process::exit(1);
        }
    };

    // Logs go to stderr so they never mix with --plain output
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if options.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Printer registrations are fixed before anything is rendered
    let mut printers = Registry::with_defaults();
    for spec in &options.printers {
        if let Err(e) = printers.register_spec(spec) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    if registry::init(printers).is_err() {
        warn!("printer registry was already initialized");
    }

    let scenes = if options.scene == "all" {
        demo::build_all()?
    } else {
        match demo::build(&options.scene) {
            Some(scene) => vec![scene?],
            None => {
                eprintln!("Error: unknown scene '{}'", options.scene);
                eprintln!("Available scenes: {}", SCENE_NAMES.join(", "));
                std::process::exit(1);
            }
        }
    };
    info!(count = scenes.len(), "scenes built");

    let render_options = RenderOptions {
        max_depth: options.max_depth,
    };
    let rendered: Vec<RenderedScene> = scenes
        .iter()
        .map(|scene| render_scene(scene, render_options))
        .collect();

    if options.plain {
        for scene in &rendered {
            println!("== {}: {} ==", scene.name, scene.description);
            for line in &scene.lines {
                println!("{}", line);
            }
            println!();
        }
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(rendered);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
