use std::path::PathBuf;

use anyhow::Result;
use clap::{arg, crate_authors, crate_name, crate_version, ArgAction, ArgMatches, Command};
use tscan::{
    error::ScanError,
    interrupt, logger,
    port::PortRange,
    report::{self, ScanHeader},
    resolver,
    scan::{ScanResult, Scanner, MAX_WORKERS},
};

struct ParsedArgs {
    debug: bool,
    ports: PortRange,
    workers: usize,
    output: Option<PathBuf>,
    target: String,
}

fn parse_args(matches: ArgMatches) -> Result<ParsedArgs, ScanError> {
    let debug = matches.get_flag("debug");

    let ports = matches.get_one::<String>("ports").unwrap().parse()?;

    let workers = match matches.get_one::<String>("workers") {
        Some(rw) => match rw.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => Err(ScanError::InvalidWorkerCount(rw.to_owned()))?,
        },
        None => MAX_WORKERS,
    };

    let output = matches.get_one::<String>("file").map(PathBuf::from);

    let target = matches.get_one::<String>("target").unwrap().to_owned();

    Ok(ParsedArgs {
        debug,
        ports,
        workers,
        output,
        target,
    })
}

fn print_results(result: &ScanResult) {
    let mut out = String::new();
    if result.interrupted {
        out.push_str("\n[!] Interrupted by user\n");
    }

    out.push_str(&format!(
        "\n--- RESULTS ({}/{} ports probed in {:.2}s) ---\n",
        result.probed,
        result.total,
        result.elapsed.as_secs_f32()
    ));
    out.push_str(&report::render_ports(&result.ports));

    print!("{}", out);
}

fn main() -> Result<()> {
    let arg_matches = Command::new(crate_name!())
        .about("TCP connect scanner for a range of ports on a single host.")
        .version(crate_version!())
        .arg_required_else_help(true)
        .author(crate_authors!())
        .args([
            arg!(-d --debug "Turns on debugging information").action(ArgAction::SetTrue),
            arg!(-p --ports <PORTS> "Port range to scan (e.g. 1-100) or a single port")
                .default_value("1-1024"),
            arg!(-f --file <FILE> "Also write the results to this file"),
            arg!(-w --workers <N> "Maximum number of concurrent workers [default: 100]"),
            arg!([target] "Address or hostname to scan").required(true),
        ])
        .get_matches();

    // Extract arguments.
    let parsed = parse_args(arg_matches)?;

    // Set debug if desired.
    if parsed.debug {
        logger::init();
    }

    // Parse target.
    let ip = resolver::lookup(&parsed.target)?;

    let header = ScanHeader::now(&parsed.target, ip);
    header.lines().iter().for_each(|line| println!("{}", line));

    interrupt::install()?;

    let scanner = Scanner::new(ip, parsed.ports).max_workers(parsed.workers);
    println!(
        "[i] Launching {} workers to scan {} ports...",
        scanner.worker_count(),
        scanner.range().len()
    );

    // Start scanner.
    let result = scanner.start(interrupt::flag())?;

    // Show result.
    print_results(&result);

    if let Some(path) = parsed.output {
        match report::save(&path, &header, &result.ports) {
            Ok(()) => println!("\n[i] Results saved to {}", path.display()),
            Err(e) => eprintln!("[-] Warning: {}", e),
        }
    }

    Ok(())
}
