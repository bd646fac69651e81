//! Command-line arguments: `ccc [options] <input.c>`.

use std::env;
use std::path::PathBuf;
use std::process::exit;

pub struct Args {
    pub input: PathBuf,
    pub output: PathBuf,
    pub opt_level: u8,
    pub include_dirs: Vec<String>,
    pub defines: Vec<String>,
    pub verbose: bool,
}

impl Args {
    pub fn parse() -> Self {
        let mut env_args = env::args().skip(1);

        let mut input = None;
        let mut output = PathBuf::from("a.coil");
        let mut opt_level = 0;
        let mut include_dirs = Vec::new();
        let mut defines = Vec::new();
        let mut verbose = false;

        while let Some(arg) = env_args.next() {
            match arg.as_str() {
                "-h" | "--help" => Self::usage(0),
                "-v" => verbose = true,
                "-o" => {
                    let Some(path) = env_args.next() else {
                        eprintln!("Option -o requires a value");
                        Self::usage(1)
                    };
                    output = PathBuf::from(path);
                }
                "-I" => {
                    let Some(dir) = env_args.next() else {
                        eprintln!("Option -I requires a value");
                        Self::usage(1)
                    };
                    include_dirs.push(dir);
                }
                "-D" => {
                    let Some(define) = env_args.next() else {
                        eprintln!("Option -D requires a value");
                        Self::usage(1)
                    };
                    defines.push(define);
                }
                s if s.starts_with("-O") => match s[2..].parse() {
                    Ok(level @ 0..=3) => opt_level = level,
                    _ => {
                        eprintln!("Invalid optimization level: {s}");
                        exit(1);
                    }
                },
                s if s.starts_with('-') => {
                    eprintln!("Unknown option: {s}");
                    Self::usage(1)
                }
                _ => {
                    if input.is_some() {
                        eprintln!("Only one input file is supported");
                        Self::usage(1)
                    }
                    input = Some(PathBuf::from(arg));
                }
            }
        }

        let Some(input) = input else {
            eprintln!("Error: No input file specified");
            Self::usage(1)
        };

        Self {
            input,
            output,
            opt_level,
            include_dirs,
            defines,
            verbose,
        }
    }

    fn usage(code: i32) -> ! {
        let cmd0 = env::args().next().unwrap_or_else(|| "ccc".to_owned());
        let usage_msg = format!("Usage: {cmd0} [options] input.c -o output.coil\n");
        static OPTIONS: &str = concat!(
            "Options:\n",
            "  -o <file>          Specify output file (default: a.coil)\n",
            "  -O<level>          Optimization level (0-3)\n",
            "  -I <dir>           Add include directory\n",
            "  -D <name>[=value]  Define macro\n",
            "  -v                 Verbose output\n",
            "  -h, --help         Display help\n",
        );
        print!("{usage_msg}{OPTIONS}");
        exit(code)
    }
}
