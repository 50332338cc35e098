//! Planogram Editor CLI
//!
//! Usage:
//!   planogram-editor [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>       Editor configuration (TOML format)
//!   -r, --resize <SPEC>       Resize a shape: NAME=LEFT,TOP,WIDTH,HEIGHT (repeatable)
//!   -u, --undo <N>            Undo N steps after applying resizes
//!   -d, --debug               Print shape geometry to stderr
//!   --snapshot                Print the full scene snapshot instead of the hierarchy
//!   -h, --help                Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use planogram_editor::{
    load, Editor, EditorConfig, Geometry, GestureKind, GestureOutcome, HierarchyTag,
};

#[derive(Parser)]
#[command(name = "planogram-editor")]
#[command(about = "Load a planogram layout, apply block resizes, and print the result")]
struct Cli {
    /// Layout fixture (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Editor configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resize a shape: NAME=LEFT,TOP,WIDTH,HEIGHT
    #[arg(short, long, value_parser = parse_resize)]
    resize: Vec<ResizeArg>,

    /// Undo this many steps after applying resizes
    #[arg(short, long, default_value_t = 0)]
    undo: usize,

    /// Print shape geometry to stderr
    #[arg(short, long)]
    debug: bool,

    /// Print the full scene snapshot instead of the hierarchy
    #[arg(long)]
    snapshot: bool,
}

#[derive(Debug, Clone)]
struct ResizeArg {
    name: String,
    geometry: Geometry,
}

fn parse_resize(arg: &str) -> Result<ResizeArg, String> {
    let (name, coords) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=LEFT,TOP,WIDTH,HEIGHT, got '{}'", arg))?;
    let values = coords
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in '{}': {}", coords, e))?;
    match values.as_slice() {
        [left, top, width, height] => Ok(ResizeArg {
            name: name.trim().to_string(),
            geometry: Geometry::new(*left, *top, *width, *height),
        }),
        _ => Err(format!("expected 4 values, got {}", values.len())),
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => match EditorConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => EditorConfig::default(),
    };

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    let mut editor = match load(&source, config) {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    for resize in &cli.resize {
        match apply_resize(&mut editor, resize) {
            Ok(GestureOutcome::Reverted(reason)) => {
                eprintln!("Resize of '{}' rejected: {}", resize.name, reason)
            }
            Ok(outcome) => eprintln!("Resize of '{}': {:?}", resize.name, outcome),
            Err(e) => {
                eprintln!("Error resizing '{}': {}", resize.name, e);
                process::exit(1);
            }
        }
    }

    for _ in 0..cli.undo {
        match editor.undo() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }

    if cli.debug {
        print_scene(&editor);
    }

    let output = if cli.snapshot {
        editor.snapshot().to_json().map_err(|e| e.to_string())
    } else {
        serde_json::to_string_pretty(&editor.hierarchy()).map_err(|e| e.to_string())
    };
    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn apply_resize(
    editor: &mut Editor,
    resize: &ResizeArg,
) -> Result<GestureOutcome, planogram_editor::EditorError> {
    editor.begin_gesture(&resize.name, GestureKind::Scale)?;
    if let Err(e) = editor.update_gesture(resize.geometry) {
        editor.cancel_gesture();
        return Err(e);
    }
    editor.finish_gesture()
}

fn print_scene(editor: &Editor) {
    eprintln!("=== Scene ===");
    let index = editor.scene().index();
    for &tag in HierarchyTag::all() {
        for shape in index.tagged(tag) {
            let b = shape.bounds();
            eprintln!(
                "[{}] {} left={:.1} top={:.1} w={:.1} h={:.1}",
                tag, shape.name, b.left, b.top, b.width, b.height
            );
        }
    }
    eprintln!(
        "undo={} redo={}",
        editor.history().undo_len(),
        editor.history().redo_len()
    );
    eprintln!("=============");
}
