//! cilgen CLI.

use std::path::PathBuf;

use cilgen::commands::{compare_command, emit_command};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "emit" => {
            if args.len() < 3 {
                eprintln!("Usage: cilgen emit <meta|build|src> [out_dir]");
                std::process::exit(1);
            }
            let out_dir = out_dir_arg(args.get(3));
            match emit_command(&args[2], &out_dir) {
                Ok(path) => println!("{}", path.display()),
                Err(message) => {
                    eprintln!("error: {message}");
                    std::process::exit(1);
                }
            }
        }
        "compare" => {
            let out_dir = out_dir_arg(args.get(2));
            if let Err(message) = compare_command(&out_dir) {
                eprintln!("error: {message}");
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn out_dir_arg(arg: Option<&String>) -> PathBuf {
    match arg {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from("out"),
    }
}

fn print_usage() {
    println!("cilgen - multi-backend managed-module emission");
    println!();
    println!("Usage:");
    println!("  cilgen emit <meta|build|src> [out_dir]   Emit the demo module once");
    println!("  cilgen compare [out_dir]                 Emit with all backends and diff");
    println!("  cilgen help                              Show this help");
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set.
    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .init();
    }
}
