//! Scrollscape viewer: renders the page profile (or a preview, or a TOML
//! preset) in a window, with the mouse wheel standing in for page scroll.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

use std::path::Path;

use scrollscape::{options::Options, Viewer};

const USAGE: &str =
    "Usage: scrollscape [--preview] [--assets <root>] [--write-schema <path>] [options.toml]";

#[derive(Debug)]
enum Command {
    /// Write the options JSON schema and exit.
    WriteSchema(String),
    /// Open the viewer window.
    View {
        options: Options,
        asset_root: Option<String>,
    },
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut preview = false;
    let mut asset_root = None;
    let mut options_path = None;
    let mut schema_path = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--preview" => preview = true,
            "--assets" => {
                asset_root = Some(args.next().ok_or("--assets needs a value")?);
            }
            "--write-schema" => {
                schema_path = Some(args.next().ok_or("--write-schema needs a path")?);
            }
            "-h" | "--help" => return Err(USAGE.into()),
            _ if arg.starts_with('-') => return Err(format!("unknown flag {arg}\n{USAGE}")),
            _ => options_path = Some(arg),
        }
    }

    if let Some(path) = schema_path {
        return Ok(Command::WriteSchema(path));
    }
    let options = match options_path {
        Some(path) => Options::load(Path::new(&path)).map_err(|e| e.to_string())?,
        None if preview => Options::preview(),
        None => Options::page(),
    };
    Ok(Command::View {
        options,
        asset_root,
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (options, asset_root) = match parse_args(std::env::args().skip(1)) {
        Ok(Command::WriteSchema(path)) => {
            if let Err(e) = Options::write_json_schema(Path::new(&path)) {
                log::error!("{e}");
                std::process::exit(1);
            }
            log::info!("Wrote options schema to {path}");
            return;
        }
        Ok(Command::View {
            options,
            asset_root,
        }) => (options, asset_root),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };

    let mut builder = Viewer::builder().with_options(options);
    if let Some(root) = asset_root {
        builder = builder.with_asset_root(root);
    }
    if let Err(e) = builder.build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn write_schema_does_not_open_the_viewer() {
        let command = parse_args(args(&["--preview", "--write-schema", "out.json"])).unwrap();
        assert!(matches!(command, Command::WriteSchema(ref path) if path == "out.json"));
    }

    #[test]
    fn preview_flag_selects_preview_profile() {
        let Command::View {
            options,
            asset_root,
        } = parse_args(args(&["--preview", "--assets", "/srv/assets"])).unwrap()
        else {
            panic!("expected the viewer");
        };
        assert_eq!(options, Options::preview());
        assert_eq!(asset_root.as_deref(), Some("/srv/assets"));
    }

    #[test]
    fn missing_flag_value_is_an_error() {
        assert!(parse_args(args(&["--write-schema"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }
}
