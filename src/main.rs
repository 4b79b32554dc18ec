//! Command-line driver: files or stdin in, HTML or a tree dump out.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as CliParser, ValueEnum};

use penmark::{AstRenderer, Context, HtmlRenderer, Parser};

#[derive(CliParser)]
#[command(version, about = "Process penmark documents")]
struct Cli {
    /// Input files; reads stdin when none are given.
    files: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Output::Html)]
    output: Output,

    /// Built-in extensions to register, comma-separated.
    #[arg(long, value_delimiter = ',', value_name = "NAME")]
    extension: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    /// An HTML fragment.
    Html,
    /// The tree as pretty-printed JSON.
    Ast,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("penmark: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, String> {
    let mut context = Context::with_defaults();
    for name in &cli.extension {
        context.add_builtin(name).map_err(|e| e.to_string())?;
    }

    let mut parser = Parser::new(&mut context);
    if cli.files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| e.to_string())?;
        parser
            .parse(&input)
            .map_err(|e| format!("line {}: {e}", parser.line()))?;
    } else {
        for path in &cli.files {
            let input = std::fs::read_to_string(path)
                .map_err(|e| format!("{}: {e}", path.display()))?;
            parser
                .parse(&input)
                .map_err(|e| format!("{}:{}: {e}", path.display(), parser.line()))?;
        }
    }
    let root = parser.finish();

    match cli.output {
        Output::Html => HtmlRenderer::new(&context).render(&root),
        Output::Ast => AstRenderer::new().render(&root),
    }
    .map_err(|e| e.to_string())
}
