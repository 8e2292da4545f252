use esc::tracing_config::init_tracing;
use esc::{
    lex_file, load_options, parse_expr_source, parse_target, render_diagnostics, EscError,
    ParseOptions, Reduction,
};
use std::env;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(EscError::Diagnostics) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), EscError> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "parse" => cmd_parse(&rest),
        "expr" => cmd_expr(&rest),
        "lex" => cmd_lex(&rest),
        _ => Err(EscError::InvalidCommand(command)),
    }
}

fn print_help() {
    println!(
        "esc\n\nUSAGE:\n  esc <COMMAND>\n\nCOMMANDS:\n  parse <path|dir/...> [--reduction single-step|cascading]\n  expr <source> [--reduction single-step|cascading]\n  lex <path>\n\n  -h, --help"
    );
}

struct CommandArgs {
    positional: Option<String>,
    reduction: Option<Reduction>,
}

fn parse_command_args(command: &str, args: &[String]) -> Result<CommandArgs, EscError> {
    let mut positional = None;
    let mut reduction = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--reduction" => {
                let Some(value) = iter.next() else {
                    return Err(EscError::InvalidCommand(format!(
                        "{command}: --reduction expects a mode"
                    )));
                };
                let Some(mode) = Reduction::parse(value) else {
                    return Err(EscError::InvalidCommand(format!(
                        "{command}: unknown reduction mode {value}"
                    )));
                };
                reduction = Some(mode);
            }
            flag if flag.starts_with("--") => {
                return Err(EscError::InvalidCommand(format!(
                    "{command}: unknown flag {flag}"
                )));
            }
            value => {
                if positional.replace(value.to_string()).is_some() {
                    return Err(EscError::InvalidCommand(format!(
                        "{command}: unexpected argument {value}"
                    )));
                }
            }
        }
    }
    Ok(CommandArgs {
        positional,
        reduction,
    })
}

/// `esc.toml` settings for `start`, overridden by the command line.
fn resolve_options(start: &Path, reduction: Option<Reduction>) -> Result<ParseOptions, EscError> {
    let mut options = load_options(start)?;
    if let Some(reduction) = reduction {
        options.reduction = reduction;
    }
    Ok(options)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, EscError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn cmd_parse(args: &[String]) -> Result<(), EscError> {
    let CommandArgs {
        positional,
        reduction,
    } = parse_command_args("parse", args)?;
    let Some(target) = positional else {
        print_help();
        return Ok(());
    };
    let base = target.strip_suffix("/...").unwrap_or(&target);
    let base = if base.is_empty() { "." } else { base };
    let options = resolve_options(Path::new(base), reduction)?;

    let bundle = parse_target(&target, options)?;
    println!("{}", to_json(&bundle)?);
    for file in &bundle.files {
        if !file.diagnostics.is_empty() {
            eprintln!("{}", file.render_diagnostics());
        }
    }
    if bundle.has_errors() {
        return Err(EscError::Diagnostics);
    }
    Ok(())
}

fn cmd_expr(args: &[String]) -> Result<(), EscError> {
    let CommandArgs {
        positional,
        reduction,
    } = parse_command_args("expr", args)?;
    let Some(source) = positional else {
        print_help();
        return Ok(());
    };
    let options = resolve_options(&env::current_dir()?, reduction)?;

    let (expr, diagnostics) = parse_expr_source(&source, options);
    println!("{}", to_json(&expr)?);
    if diagnostics.is_empty() {
        return Ok(());
    }
    eprintln!("{}", render_diagnostics("<expr>", &source, &diagnostics));
    Err(EscError::Diagnostics)
}

fn cmd_lex(args: &[String]) -> Result<(), EscError> {
    let CommandArgs {
        positional,
        reduction,
    } = parse_command_args("lex", args)?;
    if reduction.is_some() {
        return Err(EscError::InvalidCommand(
            "lex: --reduction only applies to parse and expr".to_string(),
        ));
    }
    let Some(path) = positional else {
        print_help();
        return Ok(());
    };
    let file = lex_file(Path::new(&path))?;
    println!("{}", to_json(&file)?);
    if file.diagnostics.is_empty() {
        return Ok(());
    }
    eprintln!(
        "{}",
        render_diagnostics(&file.path, &file.source, &file.diagnostics)
    );
    Err(EscError::Diagnostics)
}
