use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dolbin_core::{DolBinary, DolError, DolHeader, Header, PluginRegistry};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Simple DOL introspection CLI
#[derive(Parser)]
#[command(
    name = "dolbin",
    about = "Inspect GameCube/Wii DOL executables (header, sections, entry point)",
    version,
    author
)]
struct Cli {
    /// Path to DOL file
    #[arg(required = true)]
    path: std::path::PathBuf,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Load even when the signature check does not recognise the file
    #[arg(long)]
    force: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report whether the file looks like a DOL image
    Check,
    /// Dump the raw header fields
    Header,
    /// List all sections
    Sections,
    /// Show entry point of binary
    Entry,
    /// Show static image information and load base
    Info,
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Section")]
    name: String,
    #[tabled(rename = "VMA")]
    vma: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Perm")]
    perm: String,
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Address")]
    addr: String,
    #[tabled(rename = "Size")]
    size: String,
}

#[derive(Serialize)]
struct InfoReport {
    #[serde(flatten)]
    info: dolbin_core::BinInfo,
    base_address: u64,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn hex(value: impl std::fmt::LowerHex) -> String {
    format!("0x{value:x}")
}

/// Runs detection through the registry, then parses the header once.
fn load(registry: &PluginRegistry, buf: &[u8], name: &str, force: bool) -> Result<DolBinary> {
    match registry.detect(buf) {
        Some(handler) if handler.descriptor().name == "dol" => {}
        Some(handler) => {
            anyhow::bail!("{name} is a {} image, not DOL", handler.descriptor().name)
        }
        None if force => {
            log::warn!("{name} does not look like a DOL image; loading anyway");
        }
        None => {
            return Err(DolError::SignatureMismatch)
                .with_context(|| format!("{name} (use --force to load anyway)"));
        }
    }

    DolBinary::load(buf, name).with_context(|| format!("loading {name}"))
}

fn print_header(header: &DolHeader) {
    println!(
        "{} {} image, {}-bit, {} endian, entry 0x{:x}",
        "Format:".bold(),
        header.format_name(),
        if header.is_64() { 64 } else { 32 },
        if header.is_big_endian() { "big" } else { "little" },
        header.entry_point()
    );

    let text = header.text_slots().map(|s| ("text", s));
    let data = header.data_slots().map(|s| ("data", s));
    let rows: Vec<SlotRow> = text
        .chain(data)
        .map(|(class, s)| SlotRow {
            slot: if s.is_present() {
                format!("{class}_{}", s.index)
            } else {
                format!("{class}_{} (unused)", s.index).dimmed().to_string()
            },
            offset: hex(s.file_offset),
            addr: hex(s.load_addr),
            size: hex(s.size),
        })
        .collect();
    println!("{}", Table::new(rows));
    println!(
        "{} 0x{:x} + 0x{:x}",
        "BSS:".bold(),
        header.bss_addr,
        header.bss_size
    );
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let buf = std::fs::read(&cli.path)
        .with_context(|| format!("reading {}", cli.path.display()))?;
    let name = cli.path.display().to_string();
    let registry = PluginRegistry::with_builtin();

    match cli.command {
        Command::Check => {
            let detected = registry.detect(&buf).map(|h| h.descriptor().name);
            if cli.json {
                print_json(&serde_json::json!({ "file": name, "format": detected }))?;
            } else {
                match detected {
                    Some(format) => println!("{name}: {}", format.green()),
                    None => println!("{name}: {}", "not recognised".red()),
                }
            }
        }

        Command::Header => {
            let header = load(&registry, &buf, &name, cli.force)?.header;
            if cli.json {
                print_json(&header)?;
            } else {
                print_header(&header);
            }
        }

        Command::Sections => {
            let sections = load(&registry, &buf, &name, cli.force)?.sections();
            if cli.json {
                print_json(&sections)?;
            } else {
                let rows: Vec<SectionRow> = sections
                    .iter()
                    .map(|s| SectionRow {
                        name: s.name.clone(),
                        vma: hex(s.vma),
                        size: hex(s.size),
                        offset: hex(s.file_offset),
                        perm: s.perm.to_string(),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
        }

        Command::Entry => {
            let entries = load(&registry, &buf, &name, cli.force)?.entries();
            if cli.json {
                print_json(&entries)?;
            } else {
                for entry in &entries {
                    println!(
                        "Entry point: 0x{:x} (paddr 0x{:x})",
                        entry.vaddr, entry.paddr
                    );
                }
            }
        }

        Command::Info => {
            let image = load(&registry, &buf, &name, cli.force)?;
            let report = InfoReport {
                info: image.info(),
                base_address: image.base_address(),
            };
            if cli.json {
                print_json(&report)?;
            } else {
                let info = &report.info;
                println!("{:<10} {}", "file".bold(), info.file);
                println!("{:<10} {}", "type".bold(), info.bin_type);
                println!("{:<10} {}", "machine".bold(), info.machine);
                println!("{:<10} {}", "os".bold(), info.os);
                println!("{:<10} {}", "arch".bold(), info.arch);
                println!("{:<10} {}", "bits".bold(), info.bits);
                println!(
                    "{:<10} {}",
                    "endian".bold(),
                    if info.is_big_endian() { "big" } else { "little" }
                );
                println!("{:<10} {}", "va".bold(), info.has_va);
                println!("{:<10} 0x{:x}", "baddr".bold(), report.base_address);
            }
        }
    }

    Ok(())
}
